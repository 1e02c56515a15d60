//! Shader programs and textures loaded by name.
//!
//! This is the façade the caches are usually used through. A
//! [`ResourceLibrary`] owns a [`ResourceStore`](crate::store::ResourceStore)
//! and a [`GraphicsBackend`] and caches programs and textures separately.
//!
//! Programs are described by a [`Manifest`]: a text file listing one shader
//! file per line. Shader stages come from file extensions ([`ShaderStage`]).
//! Textures are decoded into a [`TextureImage`] before upload.

pub mod backend;
pub mod headless;
pub mod library;
pub mod manifest;
pub mod shader;
pub mod texture;

pub use backend::GraphicsBackend;
pub use headless::{HeadlessBackend, HeadlessProgram, HeadlessShader, HeadlessTexture};
pub use library::{
    LibraryConfig, ProgramCache, ProgramLoader, ResourceLibrary, TextureCache, TextureLoader,
};
pub use manifest::Manifest;
pub use shader::ShaderStage;
pub use texture::{Swizzle, TextureFormat, TextureImage};
