//! In-memory image source.

use super::{BoxFuture, ImageSource, LoadError, LoadResult};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory image source for bundled assets and tests.
#[derive(Default)]
pub struct MemoryImageSource {
    images: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryImageSource {
    /// Create a new empty memory source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes under `reference`, replacing any previous entry.
    pub fn insert(&self, reference: impl Into<String>, bytes: Vec<u8>) -> LoadResult<()> {
        let mut images = self
            .images
            .write()
            .map_err(|e| LoadError::Io(format!("Lock error: {}", e)))?;
        images.insert(reference.into(), bytes);
        Ok(())
    }

    /// Builder-style variant of [`insert`](Self::insert).
    pub fn with_image(self, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        if let Ok(mut images) = self.images.write() {
            images.insert(reference.into(), bytes);
        }
        self
    }

    /// Number of registered images.
    pub fn len(&self) -> usize {
        self.images.read().map(|images| images.len()).unwrap_or(0)
    }

    /// Whether no images are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ImageSource for MemoryImageSource {
    fn fetch(&self, reference: &str) -> BoxFuture<'_, LoadResult<Vec<u8>>> {
        let reference = reference.to_string();
        Box::pin(async move {
            let images = self
                .images
                .read()
                .map_err(|e| LoadError::Io(format!("Lock error: {}", e)))?;
            images
                .get(&reference)
                .cloned()
                .ok_or(LoadError::NotFound(reference))
        })
    }
}
