//! Virtual story modules
//!
//! `MemoryRuntime` keeps module sources in a table keyed by cleaned absolute
//! path. Editor buffers and generated fixtures go through it, as do the build
//! tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{Runtime, RuntimeError, RuntimeResult};

/// In-memory module table rooted at a fixed directory
#[derive(Debug, Clone)]
pub struct MemoryRuntime {
    modules: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
    root: PathBuf,
}

impl MemoryRuntime {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            modules: Arc::default(),
            root: root.into(),
        }
    }

    /// Store `content` under `path`, replacing any earlier module there
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let key = self.key(path.as_ref());
        self.modules.write().insert(key, content.into());
    }

    pub fn with_file(self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.read().is_empty()
    }

    // "./a/../b.js" and "<root>/b.js" name the same module
    fn key(&self, path: &Path) -> PathBuf {
        match self.absolute(path) {
            Ok(key) => key,
            Err(_) => path.to_path_buf(),
        }
    }
}

#[async_trait]
impl Runtime for MemoryRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let key = self.key(path);
        let found = self.modules.read().get(&key).cloned();
        found.ok_or(RuntimeError::NotFound(key))
    }

    fn exists(&self, path: &Path) -> bool {
        self.modules.read().contains_key(&self.key(path))
    }

    fn cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn equivalent_paths_share_one_module() {
        let runtime = MemoryRuntime::new("/project")
            .with_file("src/Button.stories.jsx", "export default {};");

        assert!(runtime.exists(Path::new("/project/src/Button.stories.jsx")));
        assert!(runtime.exists(Path::new("/project/src/../src/Button.stories.jsx")));
        assert_eq!(
            runtime
                .read_to_string(Path::new("/project/src/Button.stories.jsx"))
                .await
                .unwrap(),
            "export default {};"
        );

        runtime.add_file("/project/src/Button.stories.jsx", "export const A = 1;");
        assert_eq!(runtime.len(), 1);
    }

    #[tokio::test]
    async fn unknown_module_reports_cleaned_path() {
        let runtime = MemoryRuntime::new("/project");
        assert!(runtime.is_empty());

        let err = runtime.read_file(Path::new("./a/b.js")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotFound(path) if path == Path::new("/project/a/b.js")));
    }

    #[tokio::test]
    async fn binary_content_is_rejected_as_source() {
        let runtime = MemoryRuntime::new("/").with_file("/bin.js", vec![0xff, 0xfe]);
        let err = runtime.read_to_string(Path::new("/bin.js")).await.unwrap_err();
        assert!(matches!(err, RuntimeError::NotUtf8(_)));
    }
}
