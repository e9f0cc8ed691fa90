//! PDF backend abstraction
//!
//! The editor never talks to a PDF library directly. Everything it needs from
//! a document (page geometry, rasterisation, text extraction, the font table and
//! the handful of mutations used by the rewrite) goes through [`PdfSource`].

use crate::error::SourceResult;
use crate::font::FontHandle;
use crate::geometry::{PageSize, PdfPoint, PdfRect, Rgb};
use crate::text_block::TextBlock;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// RGBA raster of a rendered page. Its pixel dimensions are the scene size.
pub type Bitmap = image::RgbaImage;

/// Handle of an object created on a page by [`PdfSource::fill_rect`] or
/// [`PdfSource::insert_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub usize);

/// Size field of a font-table entry
///
/// Backends do not always report a clean number here, so the raw value is kept
/// and interpreted by the rewrite engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawFontSize {
    Numeric(f32),
    Text(String),
}

impl RawFontSize {
    /// Interpret the field as a size in points, if possible.
    pub fn to_points(&self) -> Option<f32> {
        let value = match self {
            RawFontSize::Numeric(value) => *value,
            RawFontSize::Text(text) => text.trim().parse::<f32>().ok()?,
        };
        (value.is_finite() && value > 0.0).then_some(value)
    }
}

/// One entry of a page's font table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontTableEntry {
    /// Font family (e.g., "Helvetica", "Times-Roman", "ArialMT")
    pub family: String,
    pub size: RawFontSize,
}

impl FontTableEntry {
    pub fn new(family: impl Into<String>, size: RawFontSize) -> Self {
        Self {
            family: family.into(),
            size,
        }
    }
}

/// A single line of text to place on a page
#[derive(Debug, Clone)]
pub struct TextInsertion<'a> {
    /// Top-left corner of the line's glyph box, page coordinates
    pub origin: PdfPoint,
    pub text: &'a str,
    pub font: &'a FontHandle,
    /// Font size in points
    pub size: f32,
    pub color: Rgb,
}

/// A PDF document as seen by the editor
///
/// All page indices are zero-based. Implementations report an out-of-range index
/// as [`SourceError::PageIndex`](crate::error::SourceError::PageIndex).
pub trait PdfSource {
    fn page_count(&self) -> usize;

    fn page_size(&self, index: usize) -> SourceResult<PageSize>;

    /// Rasterise a page. A scale of 1.0 yields one pixel per PDF point.
    fn render_page(&self, index: usize, scale: f32) -> SourceResult<Bitmap>;

    fn text_blocks(&self, index: usize) -> SourceResult<Vec<TextBlock>>;

    /// The page's font table, in the order the backend reports it
    fn fonts(&self, index: usize) -> SourceResult<Vec<FontTableEntry>>;

    /// Paint a filled rectangle without stroke.
    fn fill_rect(&mut self, index: usize, rect: PdfRect, color: Rgb) -> SourceResult<ObjectId>;

    fn insert_text(&mut self, index: usize, insertion: TextInsertion<'_>) -> SourceResult<ObjectId>;

    /// Remove an object created by this source. Objects must be removed in the
    /// reverse order of their creation.
    fn remove_object(&mut self, index: usize, object: ObjectId) -> SourceResult<()>;

    fn save(&self, path: &Path) -> SourceResult<()>;
}
