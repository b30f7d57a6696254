//! Fixed-resolution RGBA raster surface.

use crate::renderer::{RenderError, RenderResult};
use image::{Rgba, RgbaImage};
use kurbo::Size;

/// Colour a cleared surface holds: fully transparent.
pub const CLEAR_COLOR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Off-screen pixel buffer the composite is painted into and exported from.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterSurface {
    pixels: RgbaImage,
}

impl RasterSurface {
    /// Create a cleared surface. Both dimensions must be non-zero.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSurface(format!("{}x{}", width, height)));
        }
        Ok(Self {
            pixels: RgbaImage::from_pixel(width, height, CLEAR_COLOR),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn size(&self) -> Size {
        Size::new(self.width() as f64, self.height() as f64)
    }

    /// Reset every pixel to [`CLEAR_COLOR`].
    pub fn clear(&mut self) {
        for pixel in self.pixels.pixels_mut() {
            *pixel = CLEAR_COLOR;
        }
    }

    /// Read-only pixel access.
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub(crate) fn pixels_mut(&mut self) -> &mut RgbaImage {
        &mut self.pixels
    }

    /// Raw RGBA bytes, row-major, 4 bytes per pixel.
    pub fn as_rgba(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Encode the surface as an 8-bit RGBA PNG.
    pub fn encode_png(&self) -> RenderResult<Vec<u8>> {
        let mut png_data = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut png_data, self.width(), self.height());
            encoder.set_color(png::ColorType::Rgba);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder
                .write_header()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer
                .write_image_data(self.as_rgba())
                .map_err(|e| RenderError::Encode(e.to_string()))?;
            writer
                .finish()
                .map_err(|e| RenderError::Encode(e.to_string()))?;
        }
        log::debug!(
            "Encoded {}x{} surface to {} PNG bytes",
            self.width(),
            self.height(),
            png_data.len()
        );
        Ok(png_data)
    }
}
