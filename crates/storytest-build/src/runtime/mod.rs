//! Source access for the build service
//!
//! Story modules are read through a [`Runtime`] so the same pipeline serves files
//! on disk ([`native::NativeRuntime`]) and virtual modules held in memory
//! ([`memory::MemoryRuntime`]).

#[cfg(not(target_family = "wasm"))]
pub mod native;

pub mod memory;

use async_trait::async_trait;
use path_clean::PathClean;
use std::path::{Path, PathBuf};

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("no such module: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Module sources must be UTF-8
    #[error("{} is not UTF-8 text", .0.display())]
    NotUtf8(PathBuf),

    /// The blocking read task was cancelled or panicked
    #[error("read task failed: {0}")]
    Task(String),
}

/// Where module sources come from
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    fn exists(&self, path: &Path) -> bool;

    /// Directory relative module paths are taken from
    fn cwd(&self) -> RuntimeResult<PathBuf>;

    /// `path` made absolute against [`Runtime::cwd`] and cleaned
    fn absolute(&self, path: &Path) -> RuntimeResult<PathBuf> {
        if path.is_absolute() {
            return Ok(path.clean());
        }
        Ok(self.cwd()?.join(path).clean())
    }

    async fn read_to_string(&self, path: &Path) -> RuntimeResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes).map_err(|_| RuntimeError::NotUtf8(path.to_path_buf()))
    }
}
