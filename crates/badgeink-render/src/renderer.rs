//! Renderer trait abstraction.

use badgeink_core::BadgePosition;
use image::RgbaImage;
use thiserror::Error;

use crate::surface::RasterSurface;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
    #[error("Invalid surface: {0}")]
    InvalidSurface(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Everything one paint pass needs.
#[derive(Debug, Clone, Copy)]
pub struct PaintContext<'a> {
    /// Decoded background photo.
    pub subject: &'a RgbaImage,
    /// Decoded badge image.
    pub badge: &'a RgbaImage,
    /// Badge centre in percent of the surface.
    pub position: BadgePosition,
    /// Badge edge length in surface pixels.
    pub badge_size: u32,
}

impl<'a> PaintContext<'a> {
    /// Create a new paint context.
    pub fn new(subject: &'a RgbaImage, badge: &'a RgbaImage, position: BadgePosition, badge_size: u32) -> Self {
        Self {
            subject,
            badge,
            position,
            badge_size,
        }
    }
}

/// Trait for rendering backends.
///
/// A paint always redraws the whole surface, so calling it twice with the same
/// context leaves identical pixels.
pub trait Renderer {
    /// Clear and fully repaint the surface.
    fn paint(&mut self, ctx: &PaintContext);

    /// The surface painted so far.
    fn surface(&self) -> &RasterSurface;
}
