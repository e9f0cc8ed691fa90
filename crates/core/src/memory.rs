//! In-memory document backend
//!
//! A display-list model of a PDF: each page holds an ordered list of filled
//! rectangles and text runs. Rasterisation paints every item in order (text runs
//! as solid glyph boxes), and extraction reports the text runs that are still
//! visible, i.e. not entirely covered by a later fill. Documents persist as JSON.
//!
//! Used for headless operation and throughout the test suite.

use crate::error::{SourceError, SourceResult};
use crate::font::STANDARD_FONTS;
use crate::geometry::{PageSize, PdfRect, Rgb};
use crate::source::{Bitmap, FontTableEntry, ObjectId, PdfSource, TextInsertion};
use crate::text_block::TextBlock;
use image::Rgba;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Horizontal advance of one glyph as a fraction of the font size
const GLYPH_ADVANCE: f32 = 0.5;

/// Something drawn on a page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PageItem {
    Fill {
        rect: PdfRect,
        color: Rgb,
    },
    Text {
        rect: PdfRect,
        text: String,
        family: String,
        size: f32,
        color: Rgb,
    },
}

impl PageItem {
    fn rect(&self) -> &PdfRect {
        match self {
            PageItem::Fill { rect, .. } | PageItem::Text { rect, .. } => rect,
        }
    }

    fn color(&self) -> Rgb {
        match self {
            PageItem::Fill { color, .. } | PageItem::Text { color, .. } => *color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPage {
    pub size: PageSize,
    pub fonts: Vec<FontTableEntry>,
    pub items: Vec<PageItem>,
}

impl MemoryPage {
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            fonts: Vec::new(),
            items: Vec::new(),
        }
    }

    /// Place a run of black Helvetica text occupying exactly `rect`.
    pub fn push_text(&mut self, rect: PdfRect, text: impl Into<String>) {
        self.items.push(PageItem::Text {
            rect,
            text: text.into(),
            family: "Helvetica".to_string(),
            size: rect.height(),
            color: Rgb::BLACK,
        });
    }
}

/// A document held entirely in memory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pages: Vec<MemoryPage>,
    /// Families that can be drawn without a font file
    builtin_fonts: Vec<String>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self {
            pages: Vec::new(),
            builtin_fonts: STANDARD_FONTS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the set of families usable without a font file.
    pub fn with_builtin_fonts<I, S>(mut self, fonts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtin_fonts = fonts.into_iter().map(Into::into).collect();
        self
    }

    /// Append a blank page and return its index.
    pub fn add_page(&mut self, size: PageSize) -> usize {
        self.pages.push(MemoryPage::new(size));
        self.pages.len() - 1
    }

    pub fn page(&self, index: usize) -> Option<&MemoryPage> {
        self.pages.get(index)
    }

    pub fn page_mut(&mut self, index: usize) -> Option<&mut MemoryPage> {
        self.pages.get_mut(index)
    }

    /// Load a document previously written by [`PdfSource::save`].
    pub fn load(path: &Path) -> SourceResult<Self> {
        let bytes = fs::read(path)?;
        serde_json::from_slice(&bytes).map_err(|e| SourceError::Load(e.to_string()))
    }

    /// Serialized form, as written by `save`
    pub fn to_bytes(&self) -> SourceResult<Vec<u8>> {
        serde_json::to_vec_pretty(self).map_err(|e| SourceError::Mutation(e.to_string()))
    }

    fn checked_page(&self, index: usize) -> SourceResult<&MemoryPage> {
        self.pages.get(index).ok_or(SourceError::PageIndex {
            index,
            page_count: self.pages.len(),
        })
    }

    fn checked_page_mut(&mut self, index: usize) -> SourceResult<&mut MemoryPage> {
        let page_count = self.pages.len();
        self.pages
            .get_mut(index)
            .ok_or(SourceError::PageIndex { index, page_count })
    }

    fn font_available(&self, insertion: &TextInsertion<'_>) -> bool {
        if self.builtin_fonts.iter().any(|f| *f == insertion.font.family) {
            return true;
        }
        insertion
            .font
            .file
            .as_deref()
            .and_then(|path| fs::metadata(path).ok())
            .is_some_and(|meta| meta.is_file() && meta.len() > 0)
    }
}

fn paint_rect(bitmap: &mut Bitmap, rect: &PdfRect, scale: f32, color: Rgb) {
    let (width, height) = bitmap.dimensions();
    let to_px = |v: f32, limit: u32| ((v * scale).max(0.0) as u32).min(limit);

    let x_start = to_px(rect.x0.floor(), width);
    let x_end = to_px(rect.x1.ceil(), width);
    let y_start = to_px(rect.y0.floor(), height);
    let y_end = to_px(rect.y1.ceil(), height);

    for y in y_start..y_end {
        for x in x_start..x_end {
            bitmap.put_pixel(x, y, Rgba([color.r, color.g, color.b, 255]));
        }
    }
}

impl PdfSource for MemoryDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page_size(&self, index: usize) -> SourceResult<PageSize> {
        Ok(self.checked_page(index)?.size)
    }

    fn render_page(&self, index: usize, scale: f32) -> SourceResult<Bitmap> {
        let page = self.checked_page(index)?;
        let width = (page.size.width * scale).round().max(1.0) as u32;
        let height = (page.size.height * scale).round().max(1.0) as u32;

        let mut bitmap = Bitmap::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        for item in &page.items {
            paint_rect(&mut bitmap, item.rect(), scale, item.color());
        }
        Ok(bitmap)
    }

    fn text_blocks(&self, index: usize) -> SourceResult<Vec<TextBlock>> {
        let page = self.checked_page(index)?;
        let blocks = page
            .items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match item {
                PageItem::Text { rect, text, .. } => {
                    let hidden = page.items[i + 1..].iter().any(|later| {
                        matches!(later, PageItem::Fill { rect: cover, .. } if cover.covers(rect))
                    });
                    (!hidden).then(|| TextBlock::new(*rect, text.clone()))
                }
                PageItem::Fill { .. } => None,
            })
            .collect();
        Ok(blocks)
    }

    fn fonts(&self, index: usize) -> SourceResult<Vec<FontTableEntry>> {
        Ok(self.checked_page(index)?.fonts.clone())
    }

    fn fill_rect(&mut self, index: usize, rect: PdfRect, color: Rgb) -> SourceResult<ObjectId> {
        let page = self.checked_page_mut(index)?;
        page.items.push(PageItem::Fill { rect, color });
        Ok(ObjectId(page.items.len() - 1))
    }

    fn insert_text(&mut self, index: usize, insertion: TextInsertion<'_>) -> SourceResult<ObjectId> {
        self.checked_page(index)?;
        if !self.font_available(&insertion) {
            return Err(SourceError::Font(format!(
                "font '{}' cannot be embedded",
                insertion.font.family
            )));
        }

        let advance = insertion.text.chars().count() as f32 * insertion.size * GLYPH_ADVANCE;
        let rect = PdfRect::new(
            insertion.origin.x,
            insertion.origin.y,
            insertion.origin.x + advance,
            insertion.origin.y + insertion.size,
        );

        let page = self.checked_page_mut(index)?;
        page.items.push(PageItem::Text {
            rect,
            text: insertion.text.to_string(),
            family: insertion.font.family.clone(),
            size: insertion.size,
            color: insertion.color,
        });
        Ok(ObjectId(page.items.len() - 1))
    }

    fn remove_object(&mut self, index: usize, object: ObjectId) -> SourceResult<()> {
        let page = self.checked_page_mut(index)?;
        if page.items.is_empty() || object.0 != page.items.len() - 1 {
            return Err(SourceError::Mutation(format!(
                "object {} is not the most recent object on page {}",
                object.0, index
            )));
        }
        page.items.pop();
        Ok(())
    }

    fn save(&self, path: &Path) -> SourceResult<()> {
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|e| SourceError::Save {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
