//! Named resource loading with cached programs and textures.
//!
//! [`ResourceLibrary`] resolves resource names against a [`ResourceStore`],
//! builds GPU objects through a [`GraphicsBackend`], and keeps two
//! independently configured [`ResourceCache`]s: one for linked programs and
//! one for uploaded textures. Cache keys are normalized names, so
//! `"/shaders/basic.prog"` and `"shaders//basic.prog"` share one entry.
//!
//! ## Error translation
//!
//! | Failure                                   | Error                         |
//! |-------------------------------------------|-------------------------------|
//! | resource (or manifest) cannot be read     | `NotFound { name }`           |
//! | shader listed in a manifest is missing    | `Invalid { program }` wrapping the `NotFound` |
//! | non-UTF-8 text, bad image, unknown stage  | `Invalid`                     |
//! | compile / link / validate diagnostics     | `Invalid` with the info log   |

use std::fmt;
use std::sync::Arc;

use crate::builder::CacheBuilder;
use crate::cache::{LoadMode, ResourceCache};
use crate::error::ResourceError;
use crate::handle::ResourceHandle;
use crate::resource::backend::GraphicsBackend;
use crate::resource::manifest::Manifest;
use crate::resource::shader::ShaderStage;
use crate::resource::texture::TextureImage;
use crate::store::path::normalize;
use crate::store::traits::ResourceStore;
use crate::traits::Loader;

/// Cache of linked programs keyed by normalized manifest name.
pub type ProgramCache<S, B> =
    ResourceCache<String, <B as GraphicsBackend>::Program, ProgramLoader<S, B>>;

/// Cache of uploaded textures keyed by normalized image name.
pub type TextureCache<S, B> =
    ResourceCache<String, <B as GraphicsBackend>::Texture, TextureLoader<S, B>>;

/// Load modes and validation policy for a [`ResourceLibrary`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryConfig {
    pub program_load_mode: LoadMode,
    pub texture_load_mode: LoadMode,
    /// Whether linked programs are validated before they are handed out.
    pub validate_programs: bool,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            program_load_mode: LoadMode::Serialized,
            texture_load_mode: LoadMode::Serialized,
            validate_programs: cfg!(debug_assertions),
        }
    }
}

impl LibraryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program_load_mode(mut self, mode: LoadMode) -> Self {
        self.program_load_mode = mode;
        self
    }

    pub fn texture_load_mode(mut self, mode: LoadMode) -> Self {
        self.texture_load_mode = mode;
        self
    }

    /// Run [`GraphicsBackend::validate_program`] after linking.
    ///
    /// Defaults to on in debug builds and off in release builds.
    pub fn validate_programs(mut self, validate: bool) -> Self {
        self.validate_programs = validate;
        self
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

struct Context<S, B> {
    store: S,
    backend: B,
}

impl<S: ResourceStore, B: GraphicsBackend> Context<S, B> {
    fn resolve(name: &str) -> Result<String, ResourceError> {
        normalize(name).map_err(|err| ResourceError::not_found_with(name, err))
    }

    fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.store
            .read(name)
            .map_err(|err| ResourceError::not_found_with(name, err))
    }

    fn read_to_string(&self, name: &str) -> Result<String, ResourceError> {
        let bytes = self.read(name)?;
        String::from_utf8(bytes).map_err(|err| ResourceError::invalid(name, err.to_string()))
    }

    fn load_shader(&self, name: &str) -> Result<B::Shader, ResourceError> {
        let name = Self::resolve(name)?;
        // a missing file is NotFound whatever its extension
        let source = self.read_to_string(&name)?;
        let stage = ShaderStage::from_path(&name)?;
        log::debug!("compiling {stage} shader {name}");
        self.backend
            .compile_shader(&name, stage, &source)
            .map_err(|info_log| {
                log::error!("failed to compile {name}:\n{info_log}");
                ResourceError::invalid(name.as_str(), info_log)
            })
    }

    fn load_program(&self, name: &str, validate: bool) -> Result<B::Program, ResourceError> {
        let name = Self::resolve(name)?;
        let manifest = Manifest::parse(&name, &self.read_to_string(&name)?);
        log::debug!(
            "linking program {name} from {} shader(s)",
            manifest.shaders().len()
        );

        let shaders = manifest
            .shaders()
            .iter()
            .map(|reference| {
                self.load_shader(reference).map_err(|err| {
                    if err.is_not_found() {
                        ResourceError::invalid_caused_by(
                            name.as_str(),
                            format!("missing shader: {err}"),
                            err,
                        )
                    } else {
                        err
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let program = self.backend.link_program(&name, shaders).map_err(|info_log| {
            log::error!("failed to link {name}:\n{info_log}");
            ResourceError::invalid(name.as_str(), info_log)
        })?;

        if validate {
            self.backend
                .validate_program(&name, &program)
                .map_err(|info_log| {
                    log::error!("program {name} failed validation:\n{info_log}");
                    ResourceError::invalid(name.as_str(), info_log)
                })?;
        }
        Ok(program)
    }

    fn load_texture(&self, name: &str) -> Result<B::Texture, ResourceError> {
        let name = Self::resolve(name)?;
        let image = TextureImage::decode(&name, &self.read(&name)?)?;
        log::debug!(
            "uploading texture {name} ({}x{} {:?})",
            image.width,
            image.height,
            image.format
        );
        self.backend
            .upload_texture(&name, &image)
            .map_err(|message| ResourceError::invalid(name.as_str(), message))
    }
}

/// [`Loader`] behind [`ProgramCache`].
pub struct ProgramLoader<S, B> {
    context: Arc<Context<S, B>>,
    validate: bool,
}

impl<S: ResourceStore, B: GraphicsBackend> Loader<String, B::Program> for ProgramLoader<S, B> {
    type Error = ResourceError;

    fn load(&self, name: &String) -> Result<B::Program, ResourceError> {
        self.context.load_program(name, self.validate)
    }
}

/// [`Loader`] behind [`TextureCache`].
pub struct TextureLoader<S, B> {
    context: Arc<Context<S, B>>,
}

impl<S: ResourceStore, B: GraphicsBackend> Loader<String, B::Texture> for TextureLoader<S, B> {
    type Error = ResourceError;

    fn load(&self, name: &String) -> Result<B::Texture, ResourceError> {
        self.context.load_texture(name)
    }
}

// ---------------------------------------------------------------------------
// ResourceLibrary
// ---------------------------------------------------------------------------

/// Loads shaders, programs and textures by name.
///
/// `load_*` methods always build a new object. [`program`](Self::program) and
/// [`texture`](Self::texture) go through the caches and share one instance
/// per name while any handle to it is alive.
///
/// All handles obtained from the caches must be dropped before the library.
///
/// # Example
///
/// ```
/// use rescache::resource::{HeadlessBackend, ResourceLibrary};
/// use rescache::store::MemoryStore;
///
/// let store = MemoryStore::new();
/// store.insert("shaders/basic.prog", "basic.vert\nbasic.frag\n");
/// store.insert("shaders/basic.vert", "void main() {}");
/// store.insert("shaders/basic.frag", "void main() {}");
///
/// let library = ResourceLibrary::new(store, HeadlessBackend::new());
/// let program = library.program("shaders/basic.prog")?;
/// assert_eq!(program.shaders.len(), 2);
/// assert!(library.programs().contains("shaders/basic.prog"));
///
/// drop(program);
/// assert!(library.programs().is_empty());
/// # Ok::<(), rescache::error::ResourceError>(())
/// ```
pub struct ResourceLibrary<S: ResourceStore, B: GraphicsBackend> {
    context: Arc<Context<S, B>>,
    config: LibraryConfig,
    programs: ProgramCache<S, B>,
    textures: TextureCache<S, B>,
}

impl<S: ResourceStore, B: GraphicsBackend> ResourceLibrary<S, B> {
    /// Create a library with [`LibraryConfig::default`].
    pub fn new(store: S, backend: B) -> Self {
        Self::with_config(store, backend, LibraryConfig::default())
    }

    pub fn with_config(store: S, backend: B, config: LibraryConfig) -> Self {
        let context = Arc::new(Context { store, backend });
        let programs: ProgramCache<S, B> = CacheBuilder::new()
            .label("programs")
            .load_mode(config.program_load_mode)
            .build(ProgramLoader {
                context: Arc::clone(&context),
                validate: config.validate_programs,
            });
        let textures: TextureCache<S, B> = CacheBuilder::new()
            .label("textures")
            .load_mode(config.texture_load_mode)
            .build(TextureLoader {
                context: Arc::clone(&context),
            });
        Self {
            context,
            config,
            programs,
            textures,
        }
    }

    pub fn store(&self) -> &S {
        &self.context.store
    }

    pub fn backend(&self) -> &B {
        &self.context.backend
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    /// Check whether a resource exists in the store.
    pub fn exists(&self, name: &str) -> bool {
        self.context.store.exists(name)
    }

    /// Read the raw bytes of a resource.
    pub fn read(&self, name: &str) -> Result<Vec<u8>, ResourceError> {
        self.context.read(name)
    }

    /// Read a UTF-8 text resource.
    pub fn read_to_string(&self, name: &str) -> Result<String, ResourceError> {
        self.context.read_to_string(name)
    }

    /// Compile a shader. The stage comes from the file extension.
    pub fn load_shader(&self, name: &str) -> Result<B::Shader, ResourceError> {
        self.context.load_shader(name)
    }

    /// Compile a shader into a handle of its own. Shaders are not cached.
    pub fn shader(&self, name: &str) -> Result<ResourceHandle<B::Shader>, ResourceError> {
        self.load_shader(name).map(ResourceHandle::detached)
    }

    /// Build a program from its manifest, bypassing the cache.
    pub fn load_program(&self, name: &str) -> Result<B::Program, ResourceError> {
        self.context.load_program(name, self.config.validate_programs)
    }

    /// Get the shared program for `name`, building it if no handle is alive.
    pub fn program(&self, name: &str) -> Result<ResourceHandle<B::Program>, ResourceError> {
        let key = Context::<S, B>::resolve(name)?;
        self.programs.get(&key)
    }

    /// Decode and upload a texture, bypassing the cache.
    pub fn load_texture(&self, name: &str) -> Result<B::Texture, ResourceError> {
        self.context.load_texture(name)
    }

    /// Get the shared texture for `name`, uploading it if no handle is alive.
    pub fn texture(&self, name: &str) -> Result<ResourceHandle<B::Texture>, ResourceError> {
        let key = Context::<S, B>::resolve(name)?;
        self.textures.get(&key)
    }

    pub fn programs(&self) -> &ProgramCache<S, B> {
        &self.programs
    }

    pub fn textures(&self) -> &TextureCache<S, B> {
        &self.textures
    }
}

impl<S: ResourceStore, B: GraphicsBackend> fmt::Debug for ResourceLibrary<S, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceLibrary")
            .field("config", &self.config)
            .field("programs", &self.programs.len())
            .field("textures", &self.textures.len())
            .finish()
    }
}
