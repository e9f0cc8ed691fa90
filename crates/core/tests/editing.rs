//! End-to-end editing against the in-memory backend.

use pdf_text_editor_core::{
    ClickOutcome, CommitOutcome, Editor, EditorConfig, EditorError, FontFetchError, FontFetcher,
    FontTableEntry, MemoryDocument, PageSize, PdfRect, PdfSource, RawFontSize, ScenePoint,
};
use std::cell::Cell;
use std::path::Path;

/// Fetcher that never reaches the network
#[derive(Default)]
struct CountingFetcher {
    calls: Cell<usize>,
}

impl FontFetcher for &CountingFetcher {
    fn fetch(&self, _family: &str) -> Result<Vec<u8>, FontFetchError> {
        self.calls.set(self.calls.get() + 1);
        Err(FontFetchError::Status(404))
    }
}

const HELLO_RECT: PdfRect = PdfRect::new(10.0, 10.0, 110.0, 30.0);

fn hello_document(size: RawFontSize) -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    let index = doc.add_page(PageSize::new(612.0, 792.0));
    let page = doc.page_mut(index).unwrap();
    page.push_text(HELLO_RECT, "Hello");
    page.fonts = vec![FontTableEntry::new("Helvetica", size)];
    doc
}

fn editor_in<'a>(
    font_dir: &Path,
    fetcher: &'a CountingFetcher,
) -> Editor<MemoryDocument, &'a CountingFetcher> {
    Editor::with_fetcher(
        EditorConfig::default()
            .with_font_dir(font_dir)
            .with_render_scale(2.0),
        fetcher,
    )
}

/// Scene point at the centre of a page rectangle, at render scale 2.0
fn scene_center(rect: PdfRect) -> ScenePoint {
    ScenePoint::new(rect.x0 + rect.x1, rect.y0 + rect.y1)
}

#[test]
fn hello_becomes_goodbye() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);
    editor
        .open(hello_document(RawFontSize::Numeric(12.0)), None)
        .unwrap();

    assert_eq!(
        editor.click_scene(scene_center(HELLO_RECT)).unwrap(),
        ClickOutcome::Activated
    );
    assert_eq!(editor.session().draft(), Some("Hello"));
    assert!(editor.edit_draft("Goodbye"));

    let outcome = editor.commit().unwrap();
    match outcome {
        CommitOutcome::Written { font, used_fallback } => {
            assert!(!used_fallback);
            assert_eq!(font.family(), "Helvetica");
            assert_eq!(font.size, 12.0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    assert_eq!(fetcher.calls.get(), 0);

    let rendered = editor.rendered().unwrap();
    assert_eq!(rendered.overlays.len(), 1);
    let overlay = &rendered.overlays[0];
    assert_eq!(overlay.original_text, "Goodbye");
    assert_eq!(overlay.source_block.rect.x0, 10.0);
    assert_eq!(overlay.source_block.rect.y0, 10.0);

    // Old glyph box is painted white outside the new text
    let pixel = rendered.bitmap.get_pixel(200, 50);
    assert_eq!(pixel.0, [255, 255, 255, 255]);
}

#[test]
fn saved_edit_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);
    editor
        .open(hello_document(RawFontSize::Numeric(12.0)), None)
        .unwrap();

    editor.click_scene(scene_center(HELLO_RECT)).unwrap();
    editor.edit_draft("Goodbye");
    editor.commit().unwrap();

    let path = dir.path().join("edited.json");
    editor.save(&path).unwrap();
    assert_eq!(editor.file_path(), Some(path.as_path()));

    let reloaded = MemoryDocument::load(&path).unwrap();
    let blocks = reloaded.text_blocks(0).unwrap();
    let edited: Vec<_> = blocks
        .iter()
        .filter(|b| HELLO_RECT.contains(b.rect.top_left()))
        .collect();
    assert_eq!(edited.len(), 1);
    assert_eq!(edited[0].text, "Goodbye");
}

#[test]
fn blank_edit_leaves_document_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();

    for blank in ["", "    ", "\t\n"] {
        let original = hello_document(RawFontSize::Numeric(12.0));
        let before = original.to_bytes().unwrap();

        let mut editor = editor_in(dir.path(), &fetcher);
        editor.open(original, None).unwrap();
        editor.click_scene(scene_center(HELLO_RECT)).unwrap();
        editor.edit_draft(blank);

        assert_eq!(editor.commit().unwrap(), CommitOutcome::Skipped);
        assert!(!editor.session().is_editing());
        assert_eq!(editor.document().unwrap().to_bytes().unwrap(), before);
    }
}

#[test]
fn non_numeric_font_size_falls_back_to_twelve() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);
    editor
        .open(hello_document(RawFontSize::Text("twelve".to_string())), None)
        .unwrap();

    editor.click_scene(scene_center(HELLO_RECT)).unwrap();
    editor.edit_draft("Goodbye");
    match editor.commit().unwrap() {
        CommitOutcome::Written { font, .. } => assert_eq!(font.size, 12.0),
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn render_twice_is_identical() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);
    editor
        .open(hello_document(RawFontSize::Numeric(12.0)), None)
        .unwrap();

    let first = editor.refresh().unwrap().clone();
    let second = editor.refresh().unwrap();
    assert_eq!(first.bitmap.as_raw(), second.bitmap.as_raw());
    assert_eq!(first.overlays, second.overlays);
}

#[test]
fn failed_insert_keeps_page_intact() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);

    let mut doc = hello_document(RawFontSize::Numeric(12.0))
        .with_builtin_fonts(Vec::<String>::new());
    doc.page_mut(0).unwrap().fonts = vec![FontTableEntry::new(
        "Nonexistent Grotesk",
        RawFontSize::Numeric(14.0),
    )];
    let before = doc.to_bytes().unwrap();
    editor.open(doc, None).unwrap();

    editor.click_scene(scene_center(HELLO_RECT)).unwrap();
    editor.edit_draft("Goodbye");
    let err = editor.commit().unwrap_err();
    assert!(matches!(err, EditorError::InsertTextFailed(_)));
    assert_eq!(fetcher.calls.get(), 1);

    assert_eq!(editor.document().unwrap().to_bytes().unwrap(), before);
    assert!(!editor.session().is_editing());

    // The editor stays usable after the failed commit
    assert_eq!(
        editor.click_scene(scene_center(HELLO_RECT)).unwrap(),
        ClickOutcome::Activated
    );
}

#[test]
fn switching_blocks_does_not_commit() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = CountingFetcher::default();
    let mut editor = editor_in(dir.path(), &fetcher);

    let mut doc = hello_document(RawFontSize::Numeric(12.0));
    let world = PdfRect::new(10.0, 100.0, 110.0, 120.0);
    doc.page_mut(0).unwrap().push_text(world, "World");
    let before = doc.to_bytes().unwrap();
    editor.open(doc, None).unwrap();

    editor.click_scene(scene_center(HELLO_RECT)).unwrap();
    editor.edit_draft("Changed");
    editor.click_scene(scene_center(world)).unwrap();
    assert_eq!(editor.session().draft(), Some("World"));

    // Clicking empty space cancels
    assert_eq!(
        editor.click_scene(ScenePoint::new(1000.0, 1000.0)).unwrap(),
        ClickOutcome::Cancelled
    );
    assert_eq!(editor.document().unwrap().to_bytes().unwrap(), before);
}
