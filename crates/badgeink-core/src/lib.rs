//! BadgeInk Core Library
//!
//! Platform-agnostic data structures and logic for placing a badge on a photo:
//! coordinate mapping, drag tracking, load sequencing and configuration.

pub mod config;
pub mod input;
pub mod loader;
pub mod position;
pub mod source;
pub mod subject;

pub use config::{ConfigError, EditorConfig};
pub use input::{DragState, DragTracker, InputEvent, InputKind, InputModality};
pub use loader::{LoadPhase, LoadStep, LoadSynchronizer, LoadTicket};
pub use position::{
    BadgePosition, ClampBounds, badge_rect, container_contains, display_badge_rect, map_client_point,
    raster_badge_rect,
};
pub use source::{BoxFuture, ImageSource, LoadError, LoadResult, MemoryImageSource};
pub use subject::Subject;

#[cfg(not(target_arch = "wasm32"))]
pub use source::FileImageSource;
