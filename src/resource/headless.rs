//! A [`GraphicsBackend`] that needs no GPU.
//!
//! Objects are plain descriptions of what was compiled, linked or uploaded.
//! Used by tests, tools that only validate resources, and the demo.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::resource::backend::GraphicsBackend;
use crate::resource::shader::ShaderStage;
use crate::resource::texture::{Swizzle, TextureFormat, TextureImage};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessShader {
    pub id: u64,
    pub name: String,
    pub stage: ShaderStage,
    pub source_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessProgram {
    pub id: u64,
    pub name: String,
    pub shaders: Vec<HeadlessShader>,
}

impl HeadlessProgram {
    pub fn has_stage(&self, stage: ShaderStage) -> bool {
        self.shaders.iter().any(|shader| shader.stage == stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlessTexture {
    pub id: u64,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    pub swizzle: Option<[Swizzle; 4]>,
}

/// Deterministic backend for environments without a graphics context.
///
/// - Compilation fails for empty sources and for sources containing an
///   `#error` directive; the diagnostic names the line.
/// - Linking fails when no shaders are attached, or two share a stage.
/// - Validation fails when the program has no vertex stage.
///
/// Every created object gets a fresh id, and per-kind counters record how
/// many objects were made, which makes cache hits observable.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: AtomicU64,
    compiled: AtomicUsize,
    linked: AtomicUsize,
    uploaded: AtomicUsize,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shaders_compiled(&self) -> usize {
        self.compiled.load(Ordering::Relaxed)
    }

    pub fn programs_linked(&self) -> usize {
        self.linked.load(Ordering::Relaxed)
    }

    pub fn textures_uploaded(&self) -> usize {
        self.uploaded.load(Ordering::Relaxed)
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Shader = HeadlessShader;
    type Program = HeadlessProgram;
    type Texture = HeadlessTexture;

    fn compile_shader(
        &self,
        name: &str,
        stage: ShaderStage,
        source: &str,
    ) -> Result<HeadlessShader, String> {
        if source.trim().is_empty() {
            return Err(format!("{name}: empty {stage} shader source"));
        }
        for (index, line) in source.lines().enumerate() {
            if let Some(message) = line.trim_start().strip_prefix("#error") {
                return Err(format!("{name}:{}: error:{message}", index + 1));
            }
        }
        self.compiled.fetch_add(1, Ordering::Relaxed);
        Ok(HeadlessShader {
            id: self.next_id(),
            name: name.to_owned(),
            stage,
            source_len: source.len(),
        })
    }

    fn link_program(
        &self,
        name: &str,
        shaders: Vec<HeadlessShader>,
    ) -> Result<HeadlessProgram, String> {
        if shaders.is_empty() {
            return Err(format!("{name}: no shaders attached"));
        }
        for (i, shader) in shaders.iter().enumerate() {
            if let Some(other) = shaders[..i].iter().find(|s| s.stage == shader.stage) {
                return Err(format!(
                    "{name}: {} and {} are both {} shaders",
                    other.name, shader.name, shader.stage
                ));
            }
        }
        self.linked.fetch_add(1, Ordering::Relaxed);
        Ok(HeadlessProgram {
            id: self.next_id(),
            name: name.to_owned(),
            shaders,
        })
    }

    fn validate_program(&self, name: &str, program: &HeadlessProgram) -> Result<(), String> {
        if program.has_stage(ShaderStage::Vertex) {
            Ok(())
        } else {
            Err(format!("{name}: program has no vertex stage"))
        }
    }

    fn upload_texture(&self, name: &str, image: &TextureImage) -> Result<HeadlessTexture, String> {
        let expected = image.row_len() * image.height as usize;
        if image.pixels.len() != expected {
            return Err(format!(
                "{name}: expected {expected} bytes of pixel data, got {}",
                image.pixels.len()
            ));
        }
        self.uploaded.fetch_add(1, Ordering::Relaxed);
        Ok(HeadlessTexture {
            id: self.next_id(),
            name: name.to_owned(),
            width: image.width,
            height: image.height,
            format: image.format,
            swizzle: image.swizzle(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_reports_error_directive_line() {
        let backend = HeadlessBackend::new();
        let err = backend
            .compile_shader("a.frag", ShaderStage::Fragment, "void main() {}\n#error broken\n")
            .unwrap_err();
        assert_eq!(err, "a.frag:2: error: broken");
        assert_eq!(backend.shaders_compiled(), 0);
    }

    #[test]
    fn compile_rejects_empty_source() {
        let backend = HeadlessBackend::new();
        assert!(backend.compile_shader("a.vert", ShaderStage::Vertex, "  \n").is_err());
    }

    #[test]
    fn link_requires_distinct_stages() {
        let backend = HeadlessBackend::new();
        let vert = || {
            backend
                .compile_shader("a.vert", ShaderStage::Vertex, "void main() {}")
                .unwrap()
        };
        assert!(backend.link_program("empty", Vec::new()).is_err());
        let err = backend.link_program("dup", vec![vert(), vert()]).unwrap_err();
        assert!(err.contains("both vertex shaders"));

        let program = backend.link_program("ok", vec![vert()]).unwrap();
        assert!(backend.validate_program("ok", &program).is_ok());
        assert_eq!(backend.programs_linked(), 1);
    }

    #[test]
    fn validate_requires_vertex_stage() {
        let backend = HeadlessBackend::new();
        let frag = backend
            .compile_shader("a.frag", ShaderStage::Fragment, "void main() {}")
            .unwrap();
        let program = backend.link_program("p", vec![frag]).unwrap();
        assert!(backend.validate_program("p", &program).is_err());
    }

    #[test]
    fn upload_checks_pixel_length_and_keeps_swizzle() {
        let backend = HeadlessBackend::new();
        let image = TextureImage {
            width: 2,
            height: 1,
            format: TextureFormat::R8,
            pixels: vec![0, 1],
        };
        let tex = backend.upload_texture("t.png", &image).unwrap();
        assert_eq!(tex.swizzle, TextureFormat::R8.swizzle());

        let short = TextureImage {
            pixels: vec![0],
            ..image
        };
        assert!(backend.upload_texture("t.png", &short).is_err());
        assert_eq!(backend.textures_uploaded(), 1);
    }

    #[test]
    fn ids_are_unique() {
        let backend = HeadlessBackend::new();
        let a = backend.compile_shader("a.vert", ShaderStage::Vertex, "x").unwrap();
        let b = backend.compile_shader("a.vert", ShaderStage::Vertex, "x").unwrap();
        assert_ne!(a.id, b.id);
    }
}
