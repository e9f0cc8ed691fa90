//! Points, sizes and rectangles in PDF-page and scene space.
//!
//! PDF-page space uses PDF points with the origin at the top-left of the page.
//! Scene space uses pixels of the rendered bitmap, also top-left origin.

use serde::{Deserialize, Serialize};

/// Slack in points for [`PdfRect::covers`]; coordinates read back from a saved
/// PDF drift by a few thousandths of a point.
pub const COVER_TOLERANCE: f32 = 0.01;

/// A position on a page in PDF points (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfPoint {
    pub x: f32,
    pub y: f32,
}

impl PdfPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A position in the rendered scene, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScenePoint {
    pub x: f32,
    pub y: f32,
}

impl ScenePoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Page dimensions in points (1/72 inch)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Scene dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneSize {
    pub width: f32,
    pub height: f32,
}

impl SceneSize {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero, negative or not a number.
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// Axis-aligned rectangle in PDF points, `(x0, y0)` top-left and `(x1, y1)` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PdfRect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl PdfRect {
    pub const fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    pub fn top_left(&self) -> PdfPoint {
        PdfPoint::new(self.x0, self.y0)
    }

    pub fn bottom_right(&self) -> PdfPoint {
        PdfPoint::new(self.x1, self.y1)
    }

    /// Point-in-rectangle test with inclusive bounds.
    pub fn contains(&self, point: PdfPoint) -> bool {
        point.x >= self.x0 && point.x <= self.x1 && point.y >= self.y0 && point.y <= self.y1
    }

    /// True when `other` lies inside this rectangle, give or take [`COVER_TOLERANCE`].
    pub fn covers(&self, other: &PdfRect) -> bool {
        let t = COVER_TOLERANCE;
        other.x0 >= self.x0 - t
            && other.x1 <= self.x1 + t
            && other.y0 >= self.y0 - t
            && other.y1 <= self.y1 + t
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &PdfRect) -> PdfRect {
        PdfRect {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }

    /// Whether the horizontal extents of the two rectangles overlap.
    pub fn overlaps_horizontally(&self, other: &PdfRect) -> bool {
        self.x0 <= other.x1 && other.x0 <= self.x1
    }
}

/// Axis-aligned rectangle in scene pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneRect {
    pub min: ScenePoint,
    pub max: ScenePoint,
}

impl SceneRect {
    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn contains(&self, point: ScenePoint) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }
}

/// RGB color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
