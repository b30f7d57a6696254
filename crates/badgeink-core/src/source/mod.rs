//! Image source abstraction for fetching encoded image bytes.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryImageSource;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileImageSource;

use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors raised while fetching or decoding a subject or badge image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("Image not found: {0}")]
    NotFound(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Unsupported image source: {0}")]
    UnsupportedSource(String),
}

/// Result type for image loading.
pub type LoadResult<T> = Result<T, LoadError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Fetches the encoded bytes behind an image reference.
///
/// Implementations can read from memory, the filesystem or the network.
///
/// Note: On native platforms, implementations must be Send + Sync.
/// On WASM, these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait ImageSource: Send + Sync {
    /// Fetch the raw (still encoded) bytes of `reference`.
    fn fetch(&self, reference: &str) -> BoxFuture<'_, LoadResult<Vec<u8>>>;
}

/// Fetches the encoded bytes behind an image reference (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait ImageSource {
    /// Fetch the raw (still encoded) bytes of `reference`.
    fn fetch(&self, reference: &str) -> BoxFuture<'_, LoadResult<Vec<u8>>>;
}

/// Simple blocking executor for tests.
#[cfg(test)]
pub(crate) fn block_on<F: Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        if let Poll::Ready(result) = f.as_mut().poll(&mut cx) {
            return result;
        }
    }
}
