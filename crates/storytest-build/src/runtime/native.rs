//! Disk-backed runtime

#![allow(clippy::disallowed_methods)]

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{Runtime, RuntimeError, RuntimeResult};

/// Reads story modules from the local filesystem.
///
/// Reads run on tokio's blocking pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeRuntime;

impl NativeRuntime {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let owned = path.to_path_buf();
        let read = tokio::task::spawn_blocking(move || {
            std::fs::read(&owned).map_err(|source| match source.kind() {
                ErrorKind::NotFound => RuntimeError::NotFound(owned),
                _ => RuntimeError::Io {
                    path: owned,
                    source,
                },
            })
        });
        read.await
            .map_err(|join| RuntimeError::Task(join.to_string()))?
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        std::env::current_dir().map_err(|source| RuntimeError::Io {
            path: PathBuf::from("."),
            source,
        })
    }
}
