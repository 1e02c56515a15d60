use std::fmt;

use crate::error::ResourceError;

/// Pipeline stage of a shader, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEvaluation,
}

impl ShaderStage {
    pub const ALL: [ShaderStage; 5] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::Geometry,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
    ];

    /// Determine the stage from the extension of `name`.
    ///
    /// | Extension | Stage            |
    /// |-----------|------------------|
    /// | `.vert`   | `Vertex`         |
    /// | `.frag`   | `Fragment`       |
    /// | `.geom`   | `Geometry`       |
    /// | `.tcs`    | `TessControl`    |
    /// | `.tes`    | `TessEvaluation` |
    ///
    /// # Errors
    ///
    /// Any other extension (or none) is [`ResourceError::Invalid`].
    pub fn from_path(name: &str) -> Result<Self, ResourceError> {
        let file = name.rsplit('/').next().unwrap_or(name);
        let ext = match file.rfind('.') {
            Some(pos) => &file[pos + 1..],
            None => "",
        };
        ShaderStage::ALL
            .into_iter()
            .find(|stage| stage.extension() == ext)
            .ok_or_else(|| {
                ResourceError::invalid(name, format!("unknown shader stage for extension {ext:?}"))
            })
    }

    /// File extension (without the dot) for this stage.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::Geometry => "geom",
            ShaderStage::TessControl => "tcs",
            ShaderStage::TessEvaluation => "tes",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Geometry => "geometry",
            ShaderStage::TessControl => "tessellation control",
            ShaderStage::TessEvaluation => "tessellation evaluation",
        };
        f.write_str(name)
    }
}
