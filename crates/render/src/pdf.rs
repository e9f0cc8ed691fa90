//! PDFium document backend
//!
//! Implements [`PdfSource`] on top of `pdfium-render`. Page coordinates in the
//! editor have a top-left origin; PDFium uses bottom-left, so every rectangle
//! and text origin is flipped against the page height on the way in and out.

use crate::extract::{merge_runs_into_lines, visible_runs, PageObjectSummary, TextRun};
use crate::font_info::{builtin_font, page_font_table};
use image::RgbaImage;
use pdf_text_editor_core::{
    group_lines_into_blocks, Bitmap, FontTableEntry, ObjectId, PageSize, PdfRect as PageRect,
    PdfSource, Rgb, SourceError, SourceResult, TextBlock, TextInsertion,
};
use pdfium_render::prelude::*;
use std::path::Path;
use std::sync::OnceLock;

static PDFIUM: OnceLock<Pdfium> = OnceLock::new();

/// A PDF document opened with PDFium
pub struct PdfiumSource {
    document: PdfDocument<'static>,
}

impl PdfiumSource {
    /// Initialize PDFium library (helper function)
    ///
    /// Search order:
    /// 1. Executable's directory (for app bundles: .app/Contents/MacOS/)
    /// 2. Current working directory
    /// 3. System library paths
    fn init_pdfium() -> SourceResult<Pdfium> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        if let Some(ref dir) = exe_dir {
            if let Ok(bindings) =
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
            {
                return Ok(Pdfium::new(bindings));
            }
        }

        Ok(Pdfium::new(
            Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                .or_else(|_| Pdfium::bind_to_system_library())
                .map_err(|e| SourceError::Load(format!("cannot bind PDFium: {}", e)))?,
        ))
    }

    /// Process-wide PDFium instance, bound on first use
    fn pdfium() -> SourceResult<&'static Pdfium> {
        if let Some(pdfium) = PDFIUM.get() {
            return Ok(pdfium);
        }
        let pdfium = Self::init_pdfium()?;
        Ok(PDFIUM.get_or_init(|| pdfium))
    }

    /// Load a PDF document from a file path
    pub fn open<P: AsRef<Path>>(path: P) -> SourceResult<Self> {
        let path = path.as_ref();
        let document = Self::pdfium()?
            .load_pdf_from_file(path, None)
            .map_err(|e| SourceError::Load(format!("{}: {}", path.display(), e)))?;

        log::info!(
            "Loaded {} ({} pages)",
            path.display(),
            document.pages().len()
        );
        Ok(Self { document })
    }

    fn page(&self, index: usize) -> SourceResult<PdfPage<'_>> {
        let page_count = self.page_count();
        let out_of_range = || SourceError::PageIndex { index, page_count };

        let index = u16::try_from(index).map_err(|_| out_of_range())?;
        self.document.pages().get(index).map_err(|_| out_of_range())
    }

    fn page_height(&self, index: usize) -> SourceResult<f32> {
        Ok(self.page(index)?.height().value)
    }

    /// Id of the most recently added object on `page`
    fn last_object(page: &PdfPage) -> SourceResult<ObjectId> {
        page.objects()
            .len()
            .checked_sub(1)
            .map(ObjectId)
            .ok_or_else(|| SourceError::Mutation("page has no objects".to_string()))
    }

    /// Font for an insertion: the font file when there is one, else a built-in font.
    fn font_token(&mut self, insertion: &TextInsertion<'_>) -> SourceResult<PdfFontToken> {
        let family = insertion.font.family.as_str();

        if let Some(file) = &insertion.font.file {
            return self
                .document
                .fonts_mut()
                .load_true_type_from_file(file, false)
                .map_err(|e| {
                    SourceError::Font(format!("cannot load '{}' from {}: {}", family, file.display(), e))
                });
        }

        match builtin_font(family) {
            Some(builtin) => Ok(self.document.fonts_mut().new_built_in(builtin)),
            None => Err(SourceError::Font(format!(
                "font '{}' has no file and is not a built-in font",
                family
            ))),
        }
    }
}

fn pdf_color(color: Rgb) -> PdfColor {
    PdfColor::new(color.r, color.g, color.b, 255)
}

fn mutation_error(e: PdfiumError) -> SourceError {
    SourceError::Mutation(e.to_string())
}

/// Summaries of the page's text and path objects, top-left coordinates.
fn summarize_objects(page: &PdfPage, page_height: f32) -> Vec<PageObjectSummary> {
    let mut summaries = Vec::new();

    for object in page.objects().iter() {
        let bounds = match object.bounds() {
            Ok(bounds) => bounds,
            Err(_) => continue,
        };
        // Convert bounds - PDFium returns bounds with Y from bottom-left
        let rect = PageRect::new(
            bounds.left().value,
            page_height - bounds.top().value,
            bounds.right().value,
            page_height - bounds.bottom().value,
        );

        match object {
            PdfPageObject::Text(ref text_obj) => {
                summaries.push(PageObjectSummary::Text(TextRun {
                    rect,
                    text: text_obj.text(),
                }));
            }
            PdfPageObject::Path(_) => {
                if let Ok(fill) = object.fill_color() {
                    if fill.alpha() == 255 {
                        summaries.push(PageObjectSummary::Fill {
                            rect,
                            color: Rgb::new(fill.red(), fill.green(), fill.blue()),
                        });
                    }
                }
            }
            _ => {}
        }
    }

    summaries
}

impl PdfSource for PdfiumSource {
    fn page_count(&self) -> usize {
        self.document.pages().len() as usize
    }

    fn page_size(&self, index: usize) -> SourceResult<PageSize> {
        let page = self.page(index)?;
        Ok(PageSize::new(page.width().value, page.height().value))
    }

    fn render_page(&self, index: usize, scale: f32) -> SourceResult<Bitmap> {
        let page = self.page(index)?;
        let width = (page.width().value * scale).round().max(1.0) as i32;
        let height = (page.height().value * scale).round().max(1.0) as i32;

        let config = PdfRenderConfig::new()
            .set_target_width(width)
            .set_target_height(height);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|e| SourceError::Render(e.to_string()))?;

        RgbaImage::from_raw(width as u32, height as u32, bitmap.as_rgba_bytes()).ok_or_else(|| {
            SourceError::Render(format!(
                "bitmap size does not match {}x{} target",
                width, height
            ))
        })
    }

    fn text_blocks(&self, index: usize) -> SourceResult<Vec<TextBlock>> {
        let page = self.page(index)?;
        let objects = summarize_objects(&page, page.height().value);
        let lines = merge_runs_into_lines(visible_runs(&objects));
        let blocks = group_lines_into_blocks(&lines);

        log::debug!(
            "Page {}: {} objects, {} lines, {} blocks",
            index,
            objects.len(),
            lines.len(),
            blocks.len()
        );
        Ok(blocks)
    }

    fn fonts(&self, index: usize) -> SourceResult<Vec<FontTableEntry>> {
        Ok(page_font_table(&self.page(index)?))
    }

    fn fill_rect(&mut self, index: usize, rect: PageRect, color: Rgb) -> SourceResult<ObjectId> {
        let page_height = self.page_height(index)?;
        let mut page = self.page(index)?;

        let area = to_pdfium_rect(rect, page_height);
        page.objects_mut()
            .create_path_object_rect(area, None, None, Some(pdf_color(color)))
            .map_err(mutation_error)?;
        page.regenerate_content().map_err(mutation_error)?;

        Self::last_object(&page)
    }

    fn insert_text(&mut self, index: usize, insertion: TextInsertion<'_>) -> SourceResult<ObjectId> {
        let page_height = self.page_height(index)?;
        let token = self.font_token(&insertion)?;
        let mut page = self.page(index)?;

        // The origin is the top of the glyph box; PDFium places text by baseline
        let baseline = page_height - (insertion.origin.y + insertion.size);

        let mut object = page
            .objects_mut()
            .create_text_object(
                PdfPoints::new(insertion.origin.x),
                PdfPoints::new(baseline),
                insertion.text,
                token,
                PdfPoints::new(insertion.size),
            )
            .map_err(|e| SourceError::Font(e.to_string()))?;
        object
            .set_fill_color(pdf_color(insertion.color))
            .map_err(mutation_error)?;
        page.regenerate_content().map_err(mutation_error)?;

        Self::last_object(&page)
    }

    fn remove_object(&mut self, index: usize, object: ObjectId) -> SourceResult<()> {
        let mut page = self.page(index)?;
        if Self::last_object(&page)? != object {
            return Err(SourceError::Mutation(format!(
                "object {} is not the most recent object on page {}",
                object.0, index
            )));
        }

        page.objects_mut()
            .remove_object_at_index(object.0)
            .map_err(mutation_error)?;
        page.regenerate_content().map_err(mutation_error)?;
        Ok(())
    }

    fn save(&self, path: &Path) -> SourceResult<()> {
        self.document
            .save_to_file(path)
            .map_err(|e| SourceError::Save {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}

/// Flip a top-left page rectangle into PDFium's bottom-left coordinates.
fn to_pdfium_rect(rect: PageRect, page_height: f32) -> PdfRect {
    PdfRect::new_from_values(
        page_height - rect.y1, // bottom
        rect.x0,               // left
        page_height - rect.y0, // top
        rect.x1,               // right
    )
}
