//! Filesystem image source for native platforms.

use super::{BoxFuture, ImageSource, LoadError, LoadResult};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Reads images from local paths or `file://` URLs.
///
/// Relative paths resolve against the base directory when one is set.
/// Network URLs are rejected with [`LoadError::UnsupportedSource`].
#[derive(Debug, Clone, Default)]
pub struct FileImageSource {
    base_path: Option<PathBuf>,
}

impl FileImageSource {
    /// Create a source resolving relative paths against the working directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source resolving relative paths against `base_path`.
    pub fn with_base(base_path: PathBuf) -> Self {
        Self {
            base_path: Some(base_path),
        }
    }

    /// Get the base path.
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.as_deref()
    }

    /// Resolve a reference into a filesystem path.
    pub fn resolve(&self, reference: &str) -> LoadResult<PathBuf> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(LoadError::NotFound("empty image reference".to_string()));
        }

        // Windows drive letters parse as URL schemes, so only treat multi-letter schemes as URLs
        if let Ok(url) = Url::parse(reference) {
            if url.scheme().len() > 1 {
                return match url.scheme() {
                    "file" => url
                        .to_file_path()
                        .map_err(|_| LoadError::UnsupportedSource(reference.to_string())),
                    _ => Err(LoadError::UnsupportedSource(reference.to_string())),
                };
            }
        }

        let path = PathBuf::from(reference);
        Ok(match &self.base_path {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        })
    }
}

impl ImageSource for FileImageSource {
    fn fetch(&self, reference: &str) -> BoxFuture<'_, LoadResult<Vec<u8>>> {
        let path = self.resolve(reference);

        Box::pin(async move {
            let path = path?;
            if !path.exists() {
                return Err(LoadError::NotFound(path.display().to_string()));
            }
            fs::read(&path)
                .map_err(|e| LoadError::Io(format!("Failed to read {}: {}", path.display(), e)))
        })
    }
}
