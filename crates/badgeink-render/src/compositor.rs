//! CPU raster compositor: background photo plus one positioned badge.

use crate::renderer::{PaintContext, RenderResult, Renderer};
use crate::surface::RasterSurface;
use badgeink_core::{BadgePosition, raster_badge_rect};
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::borrow::Cow;

/// Resampling filter used for both layers.
const FILTER: FilterType = FilterType::Triangle;

/// Scale `image` to exactly `width` x `height`, borrowing when it already fits.
pub fn fit_to(image: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if image.dimensions() == (width, height) {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(imageops::resize(image, width, height, FILTER))
    }
}

/// Top-left pixel of the badge on `surface`.
///
/// Fractional origins are floored, so a badge never shifts right or down by
/// a pixel it does not cover.
pub fn badge_origin(surface: &RasterSurface, position: BadgePosition, size: u32) -> (i64, i64) {
    let rect = raster_badge_rect(surface.size(), position, size);
    (rect.x0.floor() as i64, rect.y0.floor() as i64)
}

/// Clear `surface` and draw the subject stretched to fill it, then the badge
/// centred on `position` at `size` x `size`. Badge pixels falling outside the
/// surface are clipped.
pub fn paint(
    surface: &mut RasterSurface,
    subject: &RgbaImage,
    badge: &RgbaImage,
    position: BadgePosition,
    size: u32,
) {
    let (width, height) = surface.dimensions();
    surface.clear();

    let background = fit_to(subject, width, height);
    imageops::replace(surface.pixels_mut(), background.as_ref(), 0, 0);

    if size > 0 {
        let (x, y) = badge_origin(surface, position, size);
        let badge = fit_to(badge, size, size);
        imageops::overlay(surface.pixels_mut(), badge.as_ref(), x, y);
    }

    log::trace!(
        "Painted {}x{} surface, badge at ({:.2}%, {:.2}%)",
        width,
        height,
        position.x(),
        position.y()
    );
}

/// Renderer owning its raster surface exclusively.
#[derive(Debug, Clone)]
pub struct RasterCompositor {
    surface: RasterSurface,
    paint_count: u64,
}

impl RasterCompositor {
    /// Create a compositor with a cleared `width` x `height` surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        Ok(Self {
            surface: RasterSurface::new(width, height)?,
            paint_count: 0,
        })
    }

    /// Number of full paints performed.
    pub fn paint_count(&self) -> u64 {
        self.paint_count
    }

    /// Clear the surface without painting.
    pub fn clear(&mut self) {
        self.surface.clear();
    }
}

impl Renderer for RasterCompositor {
    fn paint(&mut self, ctx: &PaintContext) {
        paint(&mut self.surface, ctx.subject, ctx.badge, ctx.position, ctx.badge_size);
        self.paint_count += 1;
    }

    fn surface(&self) -> &RasterSurface {
        &self.surface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn solid(width: u32, height: u32, color: Rgba<u8>) -> RgbaImage {
        RgbaImage::from_pixel(width, height, color)
    }

    #[test]
    fn test_center_badge_pixels() {
        let mut surface = RasterSurface::new(800, 600).unwrap();
        let subject = solid(800, 600, RED);
        let badge = solid(100, 100, BLUE);

        paint(&mut surface, &subject, &badge, BadgePosition::new(50.0, 50.0), 100);

        let px = surface.pixels();
        assert_eq!(px.get_pixel(350, 250), &BLUE);
        assert_eq!(px.get_pixel(449, 349), &BLUE);
        assert_eq!(px.get_pixel(349, 250), &RED);
        assert_eq!(px.get_pixel(350, 249), &RED);
        assert_eq!(px.get_pixel(450, 349), &RED);
        assert_eq!(px.get_pixel(449, 350), &RED);
    }

    #[test]
    fn test_badge_origin_scenario() {
        let surface = RasterSurface::new(800, 600).unwrap();
        assert_eq!(badge_origin(&surface, BadgePosition::new(50.0, 50.0), 100), (350, 250));
        assert_eq!(badge_origin(&surface, BadgePosition::new(10.0, 90.0), 100), (30, 490));
    }

    #[test]
    fn test_badge_origin_floors_fractions() {
        let surface = RasterSurface::new(800, 600).unwrap();
        // Centre at 400.5 x 300.9, top-left at 350.5 x 250.9
        let origin = badge_origin(&surface, BadgePosition::new(50.0625, 50.15), 100);
        assert_eq!(origin, (350, 250));
    }

    #[test]
    fn test_repaint_is_idempotent() {
        let subject = solid(64, 48, RED);
        let badge = solid(20, 20, BLUE);
        let pos = BadgePosition::new(33.3, 71.0);

        let mut first = RasterSurface::new(800, 600).unwrap();
        paint(&mut first, &subject, &badge, pos, 100);
        let mut second = first.clone();
        paint(&mut second, &subject, &badge, pos, 100);
        paint(&mut second, &subject, &badge, pos, 100);

        assert_eq!(first, second);
    }

    #[test]
    fn test_repaint_erases_previous_badge() {
        let subject = solid(800, 600, RED);
        let badge = solid(100, 100, BLUE);
        let mut surface = RasterSurface::new(800, 600).unwrap();

        paint(&mut surface, &subject, &badge, BadgePosition::new(10.0, 10.0), 100);
        assert_eq!(surface.pixels().get_pixel(80, 60), &BLUE);

        paint(&mut surface, &subject, &badge, BadgePosition::new(90.0, 90.0), 100);
        assert_eq!(surface.pixels().get_pixel(80, 60), &RED);
        assert_eq!(surface.pixels().get_pixel(720, 540), &BLUE);
    }

    #[test]
    fn test_subject_scaled_to_fill() {
        let subject = solid(10, 10, RED);
        let badge = solid(1, 1, BLUE);
        let mut surface = RasterSurface::new(800, 600).unwrap();

        paint(&mut surface, &subject, &badge, BadgePosition::new(90.0, 90.0), 10);

        // Corners are covered by the stretched subject
        for (x, y) in [(0, 0), (799, 0), (0, 599), (799, 599)] {
            let p = surface.pixels().get_pixel(x, y);
            assert_eq!(p[3], 255, "pixel ({}, {}) not painted", x, y);
            assert!(p[0] > 250 && p[2] < 5);
        }
    }

    #[test]
    fn test_transparent_badge_keeps_subject() {
        let subject = solid(800, 600, RED);
        let mut badge = solid(100, 100, BLUE);
        badge.put_pixel(0, 0, Rgba([0, 0, 0, 0]));
        let mut surface = RasterSurface::new(800, 600).unwrap();

        paint(&mut surface, &subject, &badge, BadgePosition::new(50.0, 50.0), 100);

        assert_eq!(surface.pixels().get_pixel(350, 250), &RED);
        assert_eq!(surface.pixels().get_pixel(351, 251), &BLUE);
    }

    #[test]
    fn test_badge_clipped_at_edge() {
        let subject = solid(200, 100, RED);
        let badge = solid(100, 100, BLUE);
        let mut surface = RasterSurface::new(200, 100).unwrap();

        // Badge larger than the allowed margin hangs over the edge
        paint(&mut surface, &subject, &badge, BadgePosition::new(90.0, 90.0), 100);

        assert_eq!(surface.pixels().get_pixel(199, 99), &BLUE);
        assert_eq!(surface.pixels().get_pixel(129, 39), &RED);
        assert_eq!(surface.dimensions(), (200, 100));
    }

    #[test]
    fn test_compositor_counts_paints() {
        let subject = solid(8, 6, RED);
        let badge = solid(2, 2, BLUE);
        let mut compositor = RasterCompositor::new(8, 6).unwrap();
        assert_eq!(compositor.paint_count(), 0);

        compositor.paint(&PaintContext::new(&subject, &badge, BadgePosition::default(), 2));
        compositor.paint(&PaintContext::new(&subject, &badge, BadgePosition::default(), 2));

        assert_eq!(compositor.paint_count(), 2);
        assert_eq!(compositor.surface().pixels().get_pixel(4, 3), &BLUE);
    }
}
