//! Writing edited text back into a page
//!
//! A commit paints a white rectangle over the block's bounding box and inserts
//! the replacement text at the block's top-left corner. The background under
//! the block is assumed to be white; other fills or graphics underneath are
//! painted over.
//!
//! Erase and insert are applied together: if the text cannot be inserted even
//! with the fallback font, every object created by the commit is removed again
//! and the page is left as it was.

use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult, SourceResult};
use crate::font::{FontFetcher, FontHandle, FontResolver};
use crate::geometry::{PdfPoint, Rgb};
use crate::source::{ObjectId, PdfSource, TextInsertion};
use crate::text_block::TextBlock;

/// Font family and size used for inserted text
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFont {
    pub handle: FontHandle,
    /// Size in points
    pub size: f32,
}

impl ResolvedFont {
    pub fn family(&self) -> &str {
        &self.handle.family
    }
}

/// Result of a successful commit
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The replacement text was blank; the page was not touched
    Skipped,
    Written {
        font: ResolvedFont,
        /// Whether the first insertion attempt failed and the fallback font was used
        used_fallback: bool,
    },
}

/// Applies text edits to pages
#[derive(Debug, Clone)]
pub struct RewriteEngine<F> {
    resolver: FontResolver<F>,
    fallback_family: String,
    fallback_size: f32,
    line_spacing: f32,
}

impl<F: FontFetcher> RewriteEngine<F> {
    pub fn new(config: &EditorConfig, fetcher: F) -> Self {
        Self {
            resolver: FontResolver::new(config.font_dir.clone(), fetcher),
            fallback_family: config.fallback_family.clone(),
            fallback_size: config.fallback_size,
            line_spacing: config.line_spacing,
        }
    }

    pub fn resolver(&self) -> &FontResolver<F> {
        &self.resolver
    }

    pub fn fallback_font(&self) -> ResolvedFont {
        ResolvedFont {
            handle: FontHandle::named(self.fallback_family.clone()),
            size: self.fallback_size,
        }
    }

    fn degraded(&self, reason: String) -> ResolvedFont {
        log::warn!("{}", EditorError::FontResolutionDegraded(reason));
        self.fallback_font()
    }

    /// Pick the font for text inserted on `page_index`.
    ///
    /// Uses the first entry of the page's font table. A size that is not a
    /// usable number becomes the fallback size; an unreadable or empty table
    /// yields the fallback font.
    pub fn resolve_font<S: PdfSource>(&self, document: &S, page_index: usize) -> ResolvedFont {
        let fonts = match document.fonts(page_index) {
            Ok(fonts) => fonts,
            Err(e) => return self.degraded(format!("cannot read font table: {e}")),
        };
        let Some(entry) = fonts.into_iter().next() else {
            return self.degraded(format!("page {page_index} has no fonts"));
        };

        let size = entry.size.to_points().unwrap_or_else(|| {
            log::warn!(
                "{}",
                EditorError::FontResolutionDegraded(format!(
                    "font size {:?} of '{}' is not numeric",
                    entry.size, entry.family
                ))
            );
            self.fallback_size
        });

        ResolvedFont {
            handle: self.resolver.resolve(&entry.family),
            size,
        }
    }

    /// Replace `block` on `page_index` with `new_text`.
    ///
    /// The caller is responsible for re-rendering the page afterwards.
    pub fn commit<S: PdfSource>(
        &self,
        document: &mut S,
        page_index: usize,
        block: &TextBlock,
        new_text: &str,
    ) -> EditorResult<CommitOutcome> {
        if new_text.trim().is_empty() {
            log::debug!("Skipping blank replacement for block at {:?}", block.rect);
            return Ok(CommitOutcome::Skipped);
        }

        let page_count = document.page_count();
        if page_index >= page_count {
            return Err(EditorError::PageIndexOutOfRange {
                index: page_index,
                page_count,
            });
        }

        let font = self.resolve_font(document, page_index);
        let erase = document.fill_rect(page_index, block.rect, Rgb::WHITE)?;
        let origin = block.rect.top_left();

        match self.insert_lines(document, page_index, origin, new_text, &font) {
            Ok(()) => {
                log::info!(
                    "Rewrote block at {:?} on page {} using {} {}pt",
                    block.rect,
                    page_index,
                    font.family(),
                    font.size
                );
                return Ok(CommitOutcome::Written {
                    font,
                    used_fallback: false,
                });
            }
            Err(e) => log::warn!(
                "Inserting text with '{}' failed ({}), retrying with '{}'",
                font.family(),
                e,
                self.fallback_family
            ),
        }

        let fallback = self.fallback_font();
        match self.insert_lines(document, page_index, origin, new_text, &fallback) {
            Ok(()) => Ok(CommitOutcome::Written {
                font: fallback,
                used_fallback: true,
            }),
            Err(e) => {
                if let Err(undo) = document.remove_object(page_index, erase) {
                    log::error!("Could not remove erase rectangle: {}", undo);
                }
                log::error!("Commit on page {} failed: {}", page_index, e);
                Err(EditorError::InsertTextFailed(e.to_string()))
            }
        }
    }

    /// Insert `text` line by line. On failure, lines inserted so far are removed.
    fn insert_lines<S: PdfSource>(
        &self,
        document: &mut S,
        page_index: usize,
        origin: PdfPoint,
        text: &str,
        font: &ResolvedFont,
    ) -> SourceResult<()> {
        let pitch = font.size * self.line_spacing;
        let mut created: Vec<ObjectId> = Vec::new();

        for (row, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let insertion = TextInsertion {
                origin: PdfPoint::new(origin.x, origin.y + row as f32 * pitch),
                text: line,
                font: &font.handle,
                size: font.size,
                color: Rgb::BLACK,
            };
            match document.insert_text(page_index, insertion) {
                Ok(id) => created.push(id),
                Err(e) => {
                    for id in created.into_iter().rev() {
                        if let Err(undo) = document.remove_object(page_index, id) {
                            log::error!("Could not remove partially inserted line: {}", undo);
                        }
                    }
                    return Err(e);
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFetchError;
    use crate::geometry::{PageSize, PdfRect};
    use crate::memory::{MemoryDocument, PageItem};
    use crate::source::{FontTableEntry, RawFontSize};

    struct OfflineFetcher;

    impl FontFetcher for OfflineFetcher {
        fn fetch(&self, _family: &str) -> Result<Vec<u8>, FontFetchError> {
            Err(FontFetchError::Network("offline".to_string()))
        }
    }

    fn engine(dir: &std::path::Path) -> RewriteEngine<OfflineFetcher> {
        RewriteEngine::new(&EditorConfig::default().with_font_dir(dir), OfflineFetcher)
    }

    fn hello_doc(fonts: Vec<FontTableEntry>) -> (MemoryDocument, TextBlock) {
        let mut doc = MemoryDocument::new();
        let index = doc.add_page(PageSize::new(200.0, 100.0));
        let rect = PdfRect::new(10.0, 10.0, 110.0, 30.0);
        let page = doc.page_mut(index).unwrap();
        page.push_text(rect, "Hello");
        page.fonts = fonts;
        (doc, TextBlock::new(rect, "Hello"))
    }

    fn texts(doc: &MemoryDocument) -> Vec<String> {
        doc.text_blocks(0)
            .unwrap()
            .into_iter()
            .map(|b| b.text)
            .collect()
    }

    #[test]
    fn test_resolve_font_from_table() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, _) = hello_doc(vec![
            FontTableEntry::new("Times-Roman", RawFontSize::Numeric(10.0)),
            FontTableEntry::new("Courier", RawFontSize::Numeric(8.0)),
        ]);

        let font = engine(dir.path()).resolve_font(&doc, 0);
        assert_eq!(font.family(), "Times-Roman");
        assert_eq!(font.size, 10.0);
    }

    #[test]
    fn test_resolve_font_parses_text_size() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, _) = hello_doc(vec![FontTableEntry::new(
            "Courier",
            RawFontSize::Text("9.5".to_string()),
        )]);
        assert_eq!(engine(dir.path()).resolve_font(&doc, 0).size, 9.5);
    }

    #[test]
    fn test_resolve_font_empty_table_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, _) = hello_doc(Vec::new());
        let font = engine(dir.path()).resolve_font(&doc, 0);
        assert_eq!(font.family(), "Helvetica");
        assert_eq!(font.size, 12.0);
    }

    #[test]
    fn test_commit_erases_and_inserts() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(vec![FontTableEntry::new(
            "Helvetica",
            RawFontSize::Numeric(12.0),
        )]);

        let outcome = engine(dir.path())
            .commit(&mut doc, 0, &block, "Goodbye")
            .unwrap();
        assert!(matches!(
            outcome,
            CommitOutcome::Written {
                used_fallback: false,
                ..
            }
        ));

        let items = &doc.page(0).unwrap().items;
        assert_eq!(
            items[1],
            PageItem::Fill {
                rect: block.rect,
                color: Rgb::WHITE
            }
        );
        assert_eq!(texts(&doc), vec!["Goodbye".to_string()]);
    }

    #[test]
    fn test_non_numeric_size_uses_twelve() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(vec![FontTableEntry::new(
            "Helvetica",
            RawFontSize::Text("twelve".to_string()),
        )]);

        let outcome = engine(dir.path())
            .commit(&mut doc, 0, &block, "Goodbye")
            .unwrap();
        match outcome {
            CommitOutcome::Written { font, .. } => assert_eq!(font.size, 12.0),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_unavailable_font_retries_with_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(vec![FontTableEntry::new(
            "Fancy Serif",
            RawFontSize::Numeric(18.0),
        )]);

        let outcome = engine(dir.path())
            .commit(&mut doc, 0, &block, "Goodbye")
            .unwrap();
        match outcome {
            CommitOutcome::Written {
                font,
                used_fallback,
            } => {
                assert!(used_fallback);
                assert_eq!(font.family(), "Helvetica");
                assert_eq!(font.size, 12.0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(texts(&doc), vec!["Goodbye".to_string()]);
    }

    #[test]
    fn test_second_failure_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        let (doc, block) = hello_doc(vec![FontTableEntry::new(
            "Fancy Serif",
            RawFontSize::Numeric(18.0),
        )]);
        let mut doc = doc.with_builtin_fonts(Vec::<String>::new());
        let before = doc.clone();

        let err = engine(dir.path())
            .commit(&mut doc, 0, &block, "Line one\nLine two")
            .unwrap_err();
        assert!(matches!(err, EditorError::InsertTextFailed(_)));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_multiline_text_is_stacked() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(vec![FontTableEntry::new(
            "Helvetica",
            RawFontSize::Numeric(10.0),
        )]);

        engine(dir.path())
            .commit(&mut doc, 0, &block, "first\n\nthird")
            .unwrap();

        let blocks = doc.text_blocks(0).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].rect.y0, 10.0);
        assert!((blocks[1].rect.y0 - 34.0).abs() < 1e-4);
    }

    #[test]
    fn test_blank_text_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(Vec::new());
        let before = doc.clone();

        let outcome = engine(dir.path()).commit(&mut doc, 0, &block, " \n ").unwrap();
        assert_eq!(outcome, CommitOutcome::Skipped);
        assert_eq!(doc, before);
    }

    #[test]
    fn test_commit_out_of_range_page() {
        let dir = tempfile::tempdir().unwrap();
        let (mut doc, block) = hello_doc(Vec::new());
        let err = engine(dir.path())
            .commit(&mut doc, 4, &block, "x")
            .unwrap_err();
        assert!(matches!(err, EditorError::PageIndexOutOfRange { .. }));
    }
}
