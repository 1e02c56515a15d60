//! Decoded 2D texture images ready for upload.
//!
//! Images are decoded with the `image` crate and converted to 8 bits per
//! channel. The channel count selects the texel format; one- and two-channel
//! images also carry a swizzle so that sampling yields grey (and grey+alpha)
//! colours instead of red (and red+green).

use image::{DynamicImage, GenericImageView};

use crate::error::ResourceError;

/// 8-bit-per-channel texel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8,
    Rg8,
    Rgb8,
    Rgba8,
}

impl TextureFormat {
    pub fn channels(self) -> usize {
        match self {
            TextureFormat::R8 => 1,
            TextureFormat::Rg8 => 2,
            TextureFormat::Rgb8 => 3,
            TextureFormat::Rgba8 => 4,
        }
    }

    /// Swizzle applied when sampling, if the format needs one.
    ///
    /// `R8` samples as `(R, R, R, 1)` and `Rg8` as `(R, R, R, G)`.
    pub fn swizzle(self) -> Option<[Swizzle; 4]> {
        match self {
            TextureFormat::R8 => Some([Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::One]),
            TextureFormat::Rg8 => Some([Swizzle::Red, Swizzle::Red, Swizzle::Red, Swizzle::Green]),
            TextureFormat::Rgb8 | TextureFormat::Rgba8 => None,
        }
    }
}

/// Source of one sampled component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swizzle {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

/// A decoded image: tightly packed rows, top row first.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub pixels: Vec<u8>,
}

impl TextureImage {
    /// Decode an encoded image (PNG, JPEG, BMP, TGA).
    ///
    /// # Errors
    ///
    /// [`ResourceError::Invalid`] carrying the decoder message if the bytes
    /// cannot be decoded or the channel count is unsupported.
    pub fn decode(name: &str, bytes: &[u8]) -> Result<Self, ResourceError> {
        let img = image::load_from_memory(bytes)
            .map_err(|err| ResourceError::invalid(name, err.to_string()))?;
        Self::from_dynamic(name, img)
    }

    /// Convert an already decoded image.
    pub fn from_dynamic(name: &str, img: DynamicImage) -> Result<Self, ResourceError> {
        let (width, height) = img.dimensions();
        let (format, pixels) = match img.color().channel_count() {
            1 => (TextureFormat::R8, img.into_luma8().into_raw()),
            2 => (TextureFormat::Rg8, img.into_luma_alpha8().into_raw()),
            3 => (TextureFormat::Rgb8, img.into_rgb8().into_raw()),
            4 => (TextureFormat::Rgba8, img.into_rgba8().into_raw()),
            n => {
                return Err(ResourceError::invalid(
                    name,
                    format!("unsupported channel count {n}"),
                ));
            },
        };
        Ok(Self {
            width,
            height,
            format,
            pixels,
        })
    }

    pub fn swizzle(&self) -> Option<[Swizzle; 4]> {
        self.format.swizzle()
    }

    /// Bytes per row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.format.channels()
    }
}

impl std::fmt::Debug for TextureImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}
