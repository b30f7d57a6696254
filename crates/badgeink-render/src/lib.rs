//! BadgeInk Render Library
//!
//! Renderer abstraction and the CPU raster compositor for BadgeInk.
//! Decodes subject/badge images, paints them onto a fixed-size surface and
//! encodes the result as PNG.

mod compositor;
mod decode;
mod renderer;
mod surface;

pub use compositor::{RasterCompositor, badge_origin, fit_to, paint};
pub use decode::decode_image;
pub use renderer::{PaintContext, RenderError, RenderResult, Renderer};
pub use surface::{CLEAR_COLOR, RasterSurface};

/// Re-exported so hosts can name the decoded image type.
pub use image::RgbaImage;
