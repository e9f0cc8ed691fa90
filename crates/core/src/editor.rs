//! Editor state for one open document
//!
//! Ties the pieces together: the open [`PdfSource`], page navigation, the edit
//! session, overlay listeners, the last rendered page and the rewrite engine.
//! UI layers drive it with pointer and overlay events and read back the
//! rendered page.

use crate::config::EditorConfig;
use crate::coords;
use crate::error::{EditorError, EditorResult};
use crate::font::{FontFetcher, HttpFontFetcher};
use crate::geometry::ScenePoint;
use crate::navigation::PageNavigator;
use crate::render::{PageRenderer, RenderedPage};
use crate::rewrite::{CommitOutcome, RewriteEngine};
use crate::session::{ClickOutcome, EditSession, OverlayEvent, OverlayListeners, PendingEdit};
use crate::source::PdfSource;
use crate::text_block::{BlockKey, TextBlock};
use std::path::{Path, PathBuf};

pub struct Editor<S, F = HttpFontFetcher> {
    config: EditorConfig,
    document: Option<S>,
    file_path: Option<PathBuf>,
    navigator: PageNavigator,
    session: EditSession,
    listeners: OverlayListeners,
    renderer: PageRenderer,
    engine: RewriteEngine<F>,
    rendered: Option<RenderedPage>,
    /// Bumped on every render so views know when to rebuild textures
    revision: u64,
}

impl<S: PdfSource> Editor<S, HttpFontFetcher> {
    /// Editor downloading missing fonts from `config.font_service_url`
    pub fn new(config: EditorConfig) -> Self {
        let fetcher = HttpFontFetcher::new(config.font_service_url.clone());
        Self::with_fetcher(config, fetcher)
    }
}

impl<S: PdfSource, F: FontFetcher> Editor<S, F> {
    pub fn with_fetcher(config: EditorConfig, fetcher: F) -> Self {
        Self {
            renderer: PageRenderer::new(config.render_scale),
            engine: RewriteEngine::new(&config, fetcher),
            config,
            document: None,
            file_path: None,
            navigator: PageNavigator::default(),
            session: EditSession::Idle,
            listeners: OverlayListeners::new(),
            rendered: None,
            revision: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.document.is_some()
    }

    pub fn document(&self) -> Option<&S> {
        self.document.as_ref()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn navigator(&self) -> &PageNavigator {
        &self.navigator
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn rendered(&self) -> Option<&RenderedPage> {
        self.rendered.as_ref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace the open document and show its first page.
    pub fn open(&mut self, document: S, path: Option<PathBuf>) -> EditorResult<()> {
        let page_count = document.page_count();
        if page_count == 0 {
            return Err(EditorError::InvalidState(
                "document has no pages".to_string(),
            ));
        }

        log::info!("Opened document with {} pages", page_count);
        self.document = Some(document);
        self.file_path = path;
        self.navigator = PageNavigator::new(page_count);
        self.session.cancel();
        self.refresh()?;
        Ok(())
    }

    pub fn close(&mut self) {
        self.document = None;
        self.file_path = None;
        self.navigator = PageNavigator::default();
        self.session.cancel();
        self.listeners.clear();
        self.rendered = None;
        self.revision += 1;
    }

    /// Re-render the current page and re-register its overlays.
    pub fn refresh(&mut self) -> EditorResult<&RenderedPage> {
        let page = self
            .renderer
            .render(self.document.as_ref(), self.navigator.current())?;
        self.listeners.register_all(page.blocks());
        self.revision += 1;
        Ok(&*self.rendered.insert(page))
    }

    /// Go to the next page. Returns `false` at the last page.
    pub fn next_page(&mut self) -> EditorResult<bool> {
        self.require_document()?;
        if !self.navigator.next() {
            return Ok(false);
        }
        self.session.cancel();
        self.refresh()?;
        Ok(true)
    }

    /// Go to the previous page. Returns `false` at the first page.
    pub fn prev_page(&mut self) -> EditorResult<bool> {
        self.require_document()?;
        if !self.navigator.prev() {
            return Ok(false);
        }
        self.session.cancel();
        self.refresh()?;
        Ok(true)
    }

    /// Route a click at `point` (scene pixels) to the edit session.
    pub fn click_scene(&mut self, point: ScenePoint) -> EditorResult<ClickOutcome> {
        self.require_document()?;
        let rendered = self.rendered.as_ref().ok_or_else(|| {
            EditorError::InvalidState("no page has been rendered".to_string())
        })?;

        let pdf_point = coords::to_pdf(point, rendered.page_size, rendered.scene_size())?;
        let blocks: Vec<TextBlock> = rendered.blocks().cloned().collect();
        Ok(self.session.click(pdf_point, &blocks))
    }

    /// Replace the draft of the active session. Returns `false` while idle.
    pub fn edit_draft(&mut self, text: impl Into<String>) -> bool {
        self.session.edit(text)
    }

    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Commit the active session, if any, and re-render on success.
    pub fn commit(&mut self) -> EditorResult<CommitOutcome> {
        match self.session.commit() {
            Some(pending) => self.apply(pending),
            None => Ok(CommitOutcome::Skipped),
        }
    }

    /// Feed an event from the overlay widget registered for `key`.
    pub fn handle_overlay_event(
        &mut self,
        key: BlockKey,
        event: OverlayEvent,
    ) -> EditorResult<Option<CommitOutcome>> {
        match self.listeners.dispatch(&mut self.session, key, event) {
            Some(pending) => self.apply(pending).map(Some),
            None => Ok(None),
        }
    }

    /// Write the open document to `path` and remember it as the current file.
    pub fn save(&mut self, path: &Path) -> EditorResult<()> {
        let document = self.require_document()?;
        document.save(path)?;
        log::info!("Saved document to {}", path.display());
        self.file_path = Some(path.to_path_buf());
        Ok(())
    }

    fn apply(&mut self, pending: PendingEdit) -> EditorResult<CommitOutcome> {
        let page_index = self.navigator.current();
        let document = self.document.as_mut().ok_or(EditorError::NoDocumentLoaded)?;

        let outcome = self
            .engine
            .commit(document, page_index, &pending.block, &pending.text)?;
        if matches!(outcome, CommitOutcome::Written { .. }) {
            self.refresh()?;
        }
        Ok(outcome)
    }

    fn require_document(&self) -> EditorResult<&S> {
        self.document.as_ref().ok_or(EditorError::NoDocumentLoaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontFetchError;
    use crate::geometry::{PageSize, PdfRect};
    use crate::memory::MemoryDocument;

    struct OfflineFetcher;

    impl FontFetcher for OfflineFetcher {
        fn fetch(&self, _family: &str) -> Result<Vec<u8>, FontFetchError> {
            Err(FontFetchError::Network("offline".to_string()))
        }
    }

    fn editor() -> Editor<MemoryDocument, OfflineFetcher> {
        Editor::with_fetcher(EditorConfig::default(), OfflineFetcher)
    }

    fn three_pages() -> MemoryDocument {
        let mut doc = MemoryDocument::new();
        for i in 0..3 {
            let page = doc.add_page(PageSize::new(200.0, 100.0));
            doc.page_mut(page)
                .unwrap()
                .push_text(PdfRect::new(10.0, 10.0, 110.0, 30.0), format!("Page {}", i + 1));
        }
        doc
    }

    #[test]
    fn test_operations_without_document() {
        let mut editor = editor();
        assert!(matches!(
            editor.next_page(),
            Err(EditorError::NoDocumentLoaded)
        ));
        assert!(matches!(
            editor.click_scene(ScenePoint::new(1.0, 1.0)),
            Err(EditorError::NoDocumentLoaded)
        ));
        assert!(matches!(
            editor.save(Path::new("/tmp/never.pdf")),
            Err(EditorError::NoDocumentLoaded)
        ));
        assert!(matches!(
            editor.refresh(),
            Err(EditorError::NoDocumentLoaded)
        ));
        assert_eq!(editor.commit().unwrap(), CommitOutcome::Skipped);
    }

    #[test]
    fn test_open_rejects_empty_document() {
        let mut editor = editor();
        let err = editor.open(MemoryDocument::new(), None).unwrap_err();
        assert!(matches!(err, EditorError::InvalidState(_)));
        assert!(!editor.is_open());
    }

    #[test]
    fn test_navigation_cancels_session() {
        let mut editor = editor();
        editor.open(three_pages(), None).unwrap();

        editor.click_scene(ScenePoint::new(20.0, 20.0)).unwrap();
        assert!(editor.session().is_editing());

        assert!(editor.next_page().unwrap());
        assert!(!editor.session().is_editing());
        assert_eq!(editor.rendered().unwrap().overlays[0].original_text, "Page 2");
    }

    #[test]
    fn test_boundary_navigation() {
        let mut editor = editor();
        editor.open(three_pages(), None).unwrap();

        assert!(!editor.prev_page().unwrap());
        assert_eq!(editor.navigator().current(), 0);

        editor.next_page().unwrap();
        editor.next_page().unwrap();
        let revision = editor.revision();
        assert!(!editor.next_page().unwrap());
        assert_eq!(editor.navigator().current(), 2);
        assert_eq!(editor.revision(), revision);
    }

    #[test]
    fn test_overlay_event_commit() {
        let mut editor = editor();
        editor.open(three_pages(), None).unwrap();
        let key = editor.rendered().unwrap().overlays[0].key();

        editor
            .handle_overlay_event(key, OverlayEvent::Changed("Edited".to_string()))
            .unwrap();
        let outcome = editor
            .handle_overlay_event(key, OverlayEvent::CommitRequested)
            .unwrap();
        assert!(matches!(outcome, Some(CommitOutcome::Written { .. })));

        let texts: Vec<&str> = editor
            .rendered()
            .unwrap()
            .overlays
            .iter()
            .map(|o| o.original_text.as_str())
            .collect();
        assert_eq!(texts, vec!["Edited"]);
    }

    #[test]
    fn test_close_resets_state() {
        let mut editor = editor();
        editor.open(three_pages(), Some(PathBuf::from("a.pdf"))).unwrap();
        editor.close();
        assert!(!editor.is_open());
        assert!(editor.rendered().is_none());
        assert!(editor.file_path().is_none());
        assert_eq!(editor.navigator().page_count(), 0);
    }
}
