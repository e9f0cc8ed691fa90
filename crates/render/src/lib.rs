//! PDF Text Editor Render Library
//!
//! PDFium backend for the editor core: rasterisation, text block extraction,
//! the page font table, and the object mutations used to rewrite text.

pub mod extract;
pub mod font_info;
pub mod pdf;

pub use extract::{merge_runs_into_lines, visible_runs, PageObjectSummary, TextRun};
pub use font_info::{builtin_font, strip_subset_prefix};
pub use pdf::PdfiumSource;
