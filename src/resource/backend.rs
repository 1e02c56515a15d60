use crate::resource::shader::ShaderStage;
use crate::resource::texture::TextureImage;

/// GPU object construction used by [`ResourceLibrary`](crate::resource::ResourceLibrary).
///
/// Implementations wrap a graphics API. Errors are the driver's diagnostic
/// text (compiler or linker info log, upload failure); the library turns them
/// into [`ResourceError::Invalid`](crate::error::ResourceError::Invalid).
///
/// Methods take `&self` and may be called from several threads at once for
/// different resources. Backends bound to a single-threaded context should
/// serialize internally, or be used with the default serialized load mode.
pub trait GraphicsBackend: Send + Sync + 'static {
    type Shader: Send + Sync + 'static;
    type Program: Send + Sync + 'static;
    type Texture: Send + Sync + 'static;

    /// Compile one shader stage from source.
    fn compile_shader(
        &self,
        name: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<Self::Shader, String>;

    /// Attach `shaders` to a new program and link it.
    fn link_program(&self, name: &str, shaders: Vec<Self::Shader>)
    -> Result<Self::Program, String>;

    /// Validate a linked program against the current pipeline state.
    ///
    /// Only called when program validation is enabled in
    /// [`LibraryConfig`](crate::resource::LibraryConfig).
    fn validate_program(&self, _name: &str, _program: &Self::Program) -> Result<(), String> {
        Ok(())
    }

    /// Create a 2D texture from a decoded image, applying its swizzle.
    fn upload_texture(&self, name: &str, image: &TextureImage) -> Result<Self::Texture, String>;
}
