use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use thiserror::Error;

use crate::state::ShadingMode;

/// Failures while loading or building a shader program.
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read shader '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("shader program '{name}' failed validation: {message}")]
    Invalid { name: String, message: String },
}

/// A shader source that can be hot-reloaded from disk.
pub struct HotShader {
    path: PathBuf,
    last_modified: SystemTime,
    source: String,
}

impl HotShader {
    /// Load a shader from the given file path.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let path = path.as_ref().to_path_buf();
        let io_err = |source| ShaderError::Io {
            path: path.clone(),
            source,
        };
        let source = fs::read_to_string(&path).map_err(io_err)?;
        let last_modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(io_err)?;

        Ok(Self {
            path,
            last_modified,
            source,
        })
    }

    /// Check if the shader file has been modified and reload if so.
    /// Returns `true` if the shader was reloaded.
    pub fn check_reload(&mut self) -> bool {
        let Ok(metadata) = fs::metadata(&self.path) else {
            return false;
        };

        let Ok(modified) = metadata.modified() else {
            return false;
        };

        if modified > self.last_modified {
            if let Ok(source) = fs::read_to_string(&self.path) {
                self.source = source;
                self.last_modified = modified;
                return true;
            }
        }

        false
    }

    /// Get the current shader source.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Get the shader file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// The vertex and fragment files of one shading model.
pub struct ProgramSource {
    name: &'static str,
    pub vertex: HotShader,
    pub fragment: HotShader,
}

impl ProgramSource {
    /// File names of the vertex and fragment stage for `mode`.
    pub fn file_names(mode: ShadingMode) -> (&'static str, &'static str) {
        match mode {
            ShadingMode::Phong => ("box.vs", "box.frag"),
            ShadingMode::Gouraud => ("box_gouraud.vs", "box_gouraud.frag"),
        }
    }

    /// Load both stages of `mode` from `dir`.
    pub fn load(dir: impl AsRef<Path>, mode: ShadingMode) -> Result<Self, ShaderError> {
        let dir = dir.as_ref();
        let (vertex, fragment) = Self::file_names(mode);
        Ok(Self {
            name: vertex.trim_end_matches(".vs"),
            vertex: HotShader::new(dir.join(vertex))?,
            fragment: HotShader::new(dir.join(fragment))?,
        })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Poll both stages. Returns `true` if either changed on disk.
    pub fn check_reload(&mut self) -> bool {
        // Both stages are polled even when the first already changed.
        let vertex = self.vertex.check_reload();
        let fragment = self.fragment.check_reload();
        vertex || fragment
    }
}

/// Locate the shader directory: relative to the working directory first, then
/// next to the crate manifest so `cargo run` works from anywhere.
pub fn shader_dir(name: &str) -> PathBuf {
    let local = PathBuf::from(name);
    if local.is_dir() {
        return local;
    }
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

/// Compile one WGSL stage, reporting validation failures as [`ShaderError`].
pub fn compile_module(
    device: &wgpu::Device,
    program: &str,
    shader: &HotShader,
) -> Result<wgpu::ShaderModule, ShaderError> {
    let label = shader.path().display().to_string();
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&label),
        source: wgpu::ShaderSource::Wgsl(shader.source().into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(ShaderError::Invalid {
            name: program.to_string(),
            message: err.to_string(),
        }),
        None => Ok(module),
    }
}
