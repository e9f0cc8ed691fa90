//! PDF Text Editor Core Library
//!
//! Toolkit-free core of the editor: page rendering with editable overlays,
//! the edit session, and the rewrite that paints over a text block and inserts
//! replacement text. PDF access goes through the [`PdfSource`] trait.

pub mod config;
pub mod coords;
pub mod editor;
pub mod error;
pub mod font;
pub mod geometry;
pub mod memory;
pub mod navigation;
pub mod render;
pub mod rewrite;
pub mod session;
pub mod source;
pub mod text_block;

pub use config::EditorConfig;
pub use editor::Editor;
pub use error::{EditorError, EditorResult, SourceError, SourceResult};
pub use font::{
    is_standard_font, FontFetchError, FontFetcher, FontHandle, FontResolver, HttpFontFetcher,
};
pub use geometry::{PageSize, PdfPoint, PdfRect, Rgb, SceneRect, ScenePoint, SceneSize};
pub use memory::MemoryDocument;
pub use navigation::PageNavigator;
pub use render::{OverlayRegion, PageRenderer, RenderedPage};
pub use rewrite::{CommitOutcome, ResolvedFont, RewriteEngine};
pub use session::{ClickOutcome, EditSession, OverlayEvent, OverlayListeners, PendingEdit};
pub use source::{
    Bitmap, FontTableEntry, ObjectId, PdfSource, RawFontSize, TextInsertion,
};
pub use text_block::{group_lines_into_blocks, BlockKey, TextBlock, TextLine};
