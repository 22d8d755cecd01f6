use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::mime;

/// Read access to attachment sources.
///
/// Reads are scoped to each call; implementations must not keep handles open.
pub trait FileStorage: Send + Sync {
    /// Whether `path` resolves to a file in this storage.
    fn exists(&self, path: &str) -> bool;

    /// MIME type of the file at `path`, if it can be determined.
    fn mime_type(&self, path: &str) -> Option<String>;

    /// Raw contents of the file at `path`, `None` if it cannot be read.
    fn get(&self, path: &str) -> Option<Vec<u8>>;
}

/// Filesystem storage rooted at a directory.
///
/// Paths are relative to the root; absolute paths and `..` components never
/// resolve.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Option<PathBuf> {
        let relative = Path::new(path);
        let confined = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !confined {
            debug!(path, "refusing path outside storage root");
            return None;
        }
        Some(self.root.join(relative))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileStorage for LocalStorage {
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|p| p.is_file())
    }

    fn mime_type(&self, path: &str) -> Option<String> {
        self.resolve(path)?;
        mime::from_path(path).map(str::to_string)
    }

    fn get(&self, path: &str) -> Option<Vec<u8>> {
        let full = self.resolve(path)?;
        match std::fs::read(&full) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(path = %full.display(), error = %e, "failed to read file");
                None
            },
        }
    }
}
