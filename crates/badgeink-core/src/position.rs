//! Badge placement in container-relative percent space.
//!
//! The badge position is always carried as a percentage of whatever frame it is
//! shown in, never as absolute pixels. The same position maps onto the on-screen
//! container (any size) and onto the fixed-size export raster.

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Lowest percent a badge centre may take on either axis.
pub const POSITION_MIN: f64 = 10.0;
/// Highest percent a badge centre may take on either axis.
pub const POSITION_MAX: f64 = 90.0;
/// Default badge edge length in pixels.
pub const DEFAULT_BADGE_SIZE: u32 = 100;

/// Closed interval that badge coordinates are clamped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClampBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for ClampBounds {
    fn default() -> Self {
        Self {
            min: POSITION_MIN,
            max: POSITION_MAX,
        }
    }
}

impl ClampBounds {
    /// The whole container, `[0, 100]`.
    pub const FULL: ClampBounds = ClampBounds { min: 0.0, max: 100.0 };

    /// Create bounds, returning `None` unless `0 <= min <= max <= 100`.
    pub fn new(min: f64, max: f64) -> Option<Self> {
        let bounds = Self { min, max };
        bounds.is_valid().then_some(bounds)
    }

    /// Whether these bounds describe a usable interval inside `[0, 100]`.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.max <= 100.0
            && self.min <= self.max
    }

    /// Clamp a single percent value. NaN collapses to the lower bound.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    /// Check whether a value lies inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Badge centre as percent of the container, each axis inside the clamp bounds.
///
/// Deserialized values are clamped into the default bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPosition")]
pub struct BadgePosition {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct RawPosition {
    x: f64,
    y: f64,
}

impl From<RawPosition> for BadgePosition {
    fn from(raw: RawPosition) -> Self {
        Self::new(raw.x, raw.y)
    }
}

/// Deserialize a position clamped only into `[0, 100]`.
///
/// For positions that are re-clamped later against bounds read from the same
/// document, where clamping into the defaults first would lose information.
pub(crate) fn deserialize_unbounded<'de, D>(deserializer: D) -> Result<BadgePosition, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = RawPosition::deserialize(deserializer)?;
    Ok(BadgePosition::clamped(raw.x, raw.y, &ClampBounds::FULL))
}

impl Default for BadgePosition {
    fn default() -> Self {
        Self { x: 50.0, y: 50.0 }
    }
}

impl BadgePosition {
    /// Create a position clamped into the default `[10, 90]` bounds.
    pub fn new(x: f64, y: f64) -> Self {
        Self::clamped(x, y, &ClampBounds::default())
    }

    /// Create a position clamped into `bounds`.
    pub fn clamped(x: f64, y: f64, bounds: &ClampBounds) -> Self {
        Self {
            x: bounds.clamp(x),
            y: bounds.clamp(y),
        }
    }

    /// Horizontal percent.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Vertical percent.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Re-clamp into different bounds.
    pub fn within(self, bounds: &ClampBounds) -> Self {
        Self::clamped(self.x, self.y, bounds)
    }

    /// The badge centre expressed in `frame` coordinates.
    pub fn to_point_in(&self, frame: Rect) -> Point {
        Point::new(
            frame.x0 + self.x / 100.0 * frame.width(),
            frame.y0 + self.y / 100.0 * frame.height(),
        )
    }
}

/// Convert a client coordinate into a clamped badge position.
///
/// `container` is the bounding rectangle of the reference element in the same
/// client space as `client`. Points outside the container are clamped, never
/// rejected.
pub fn map_client_point(client: Point, container: Rect, bounds: &ClampBounds) -> BadgePosition {
    let x = axis_percent(client.x - container.x0, container.width());
    let y = axis_percent(client.y - container.y0, container.height());
    BadgePosition::clamped(x, y, bounds)
}

/// Whether `point` lies inside `container`, edges included.
///
/// `Rect::contains` excludes the far edges, so a press on the border would
/// otherwise be lost.
pub fn container_contains(container: Rect, point: Point) -> bool {
    point.x >= container.x0
        && point.x <= container.x1
        && point.y >= container.y0
        && point.y <= container.y1
}

/// Percent along one axis. A collapsed axis snaps to whichever edge the offset
/// points at.
fn axis_percent(offset: f64, extent: f64) -> f64 {
    if !extent.is_finite() || extent <= 0.0 {
        return if offset > 0.0 { 100.0 } else { 0.0 };
    }
    offset / extent * 100.0
}

/// Square badge rectangle centred on `position` inside `frame`.
///
/// The badge keeps its pixel `size` whatever the frame dimensions are.
pub fn badge_rect(frame: Rect, position: BadgePosition, size: u32) -> Rect {
    let center = position.to_point_in(frame);
    let half = size as f64 / 2.0;
    Rect::new(center.x - half, center.y - half, center.x + half, center.y + half)
}

/// Badge rectangle on a raster surface of `surface` pixels with origin at zero.
pub fn raster_badge_rect(surface: Size, position: BadgePosition, size: u32) -> Rect {
    badge_rect(Rect::from_origin_size(Point::ZERO, surface), position, size)
}

/// Badge overlay rectangle for the on-screen container.
pub fn display_badge_rect(container: Rect, position: BadgePosition, size: u32) -> Rect {
    badge_rect(container, position, size)
}
