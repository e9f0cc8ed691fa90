//! Error types shared across the editor core.

use std::path::PathBuf;

/// Failures reported by a [`PdfSource`](crate::source::PdfSource) backend.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("PDF load error: {0}")]
    Load(String),
    #[error("invalid page index {index} (page_count={page_count})")]
    PageIndex { index: usize, page_count: usize },
    #[error("PDF render error: {0}")]
    Render(String),
    #[error("text extraction failed: {0}")]
    Extract(String),
    #[error("font error: {0}")]
    Font(String),
    #[error("page mutation failed: {0}")]
    Mutation(String),
    #[error("failed to save PDF to {path}: {message}")]
    Save { path: PathBuf, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by editor operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// An operation needing an open document ran with none open.
    #[error("no document loaded")]
    NoDocumentLoaded,

    #[error("page index {index} out of range (page_count={page_count})")]
    PageIndexOutOfRange { index: usize, page_count: usize },

    /// Programming-contract violation, e.g. mapping before anything was rendered.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Font lookup fell back to the default font. Logged, never returned to callers.
    #[error("font resolution degraded: {0}")]
    FontResolutionDegraded(String),

    /// Text insertion failed with the resolved font and with the fallback font.
    #[error("failed to insert text: {0}")]
    InsertTextFailed(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Result type for editor operations
pub type EditorResult<T> = Result<T, EditorError>;

/// Result type for backend operations
pub type SourceResult<T> = Result<T, SourceError>;
