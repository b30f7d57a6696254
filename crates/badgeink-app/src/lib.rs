//! BadgeInk Application
//!
//! The badge editor engine plus its hosts: a command-line tool on native
//! platforms and a `wasm-bindgen` handle for the browser.

mod editor;
mod export;
mod host;
mod notify;

pub use editor::{BadgeEditor, EditorError};
pub use export::{
    DownloadTarget, ExportError, ExportFile, ExportOutcome, ExportRequest, ExportService, PNG_MIME,
    ShareResult, ShareTarget,
};
pub use host::{Route, Screen, open_editor, resolve_route};
pub use notify::{Notification, NotificationLevel};

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub mod cli;
#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
mod native;

#[cfg(all(feature = "native", not(target_arch = "wasm32")))]
pub use native::{ClipboardShare, DirectoryDownload};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{BadgeEditorHandle, run_wasm};
