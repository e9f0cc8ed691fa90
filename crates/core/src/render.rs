//! Page rendering with editable overlays
//!
//! Produces the bitmap of a page plus one overlay region per non-blank text
//! block, positioned in scene space. Overlays are rebuilt from scratch on
//! every call.

use crate::coords;
use crate::error::{EditorError, EditorResult};
use crate::geometry::{PageSize, SceneRect, SceneSize};
use crate::source::{Bitmap, PdfSource};
use crate::text_block::{BlockKey, TextBlock};

/// An editable area over the rendered bitmap
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRegion {
    /// Position in scene pixels
    pub scene_rect: SceneRect,
    /// Block text with surrounding whitespace removed
    pub original_text: String,
    pub source_block: TextBlock,
}

impl OverlayRegion {
    pub fn key(&self) -> BlockKey {
        self.source_block.key()
    }
}

/// Output of a single render pass
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page_index: usize,
    pub page_size: PageSize,
    pub bitmap: Bitmap,
    pub overlays: Vec<OverlayRegion>,
}

impl RenderedPage {
    /// Scene extent, equal to the bitmap's pixel dimensions
    pub fn scene_size(&self) -> SceneSize {
        let (width, height) = self.bitmap.dimensions();
        SceneSize::new(width as f32, height as f32)
    }

    pub fn blocks(&self) -> impl Iterator<Item = &TextBlock> {
        self.overlays.iter().map(|overlay| &overlay.source_block)
    }

    pub fn overlay(&self, key: BlockKey) -> Option<&OverlayRegion> {
        self.overlays.iter().find(|overlay| overlay.key() == key)
    }
}

/// Renders pages at a fixed scale
#[derive(Debug, Clone, Copy)]
pub struct PageRenderer {
    scale: f32,
}

impl PageRenderer {
    pub fn new(scale: f32) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Render `page_index` of `document` and lay out its overlays.
    pub fn render<S: PdfSource>(
        &self,
        document: Option<&S>,
        page_index: usize,
    ) -> EditorResult<RenderedPage> {
        let document = document.ok_or(EditorError::NoDocumentLoaded)?;

        let page_count = document.page_count();
        if page_index >= page_count {
            return Err(EditorError::PageIndexOutOfRange {
                index: page_index,
                page_count,
            });
        }

        let page_size = document.page_size(page_index)?;
        let bitmap = document.render_page(page_index, self.scale)?;
        let (width, height) = bitmap.dimensions();
        let scene_size = SceneSize::new(width as f32, height as f32);

        let mut overlays = Vec::new();
        for block in document.text_blocks(page_index)? {
            if block.is_blank() {
                continue;
            }
            overlays.push(OverlayRegion {
                scene_rect: coords::to_scene_rect(block.rect, page_size, scene_size)?,
                original_text: block.text.trim().to_string(),
                source_block: block,
            });
        }

        log::debug!(
            "Rendered page {} at {}x{} with {} overlays",
            page_index,
            width,
            height,
            overlays.len()
        );

        Ok(RenderedPage {
            page_index,
            page_size,
            bitmap,
            overlays,
        })
    }
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::new(1.0)
    }
}
