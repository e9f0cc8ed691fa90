//! Editor configuration.
//!
//! Settings are built programmatically; nothing is read from the environment or
//! persisted between runs.

use std::path::{Path, PathBuf};

/// Default font distribution endpoint, queried as `<url>?family=<family>`
pub const DEFAULT_FONT_SERVICE_URL: &str = "https://fonts.google.com/download";

/// Configuration for rendering and text rewriting.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorConfig {
    /// Pixels per PDF point when rasterising pages (1.0 = 72 dpi)
    pub render_scale: f32,
    /// Base URL of the font download service
    pub font_service_url: String,
    /// Directory holding `<family>.ttf` files, downloaded or user-provided
    pub font_dir: PathBuf,
    /// Family used when the page's font cannot be used
    pub fallback_family: String,
    /// Size in points used alongside the fallback family
    pub fallback_size: f32,
    /// Line pitch for multi-line replacement text, as a multiple of the font size
    pub line_spacing: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            render_scale: 1.0,
            font_service_url: DEFAULT_FONT_SERVICE_URL.to_string(),
            font_dir: PathBuf::from("."),
            fallback_family: "Helvetica".to_string(),
            fallback_size: 12.0,
            line_spacing: 1.2,
        }
    }
}

impl EditorConfig {
    /// Sets the render scale. Non-positive values are clamped to 0.1.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale.max(0.1);
        self
    }

    pub fn with_font_service_url(mut self, url: impl Into<String>) -> Self {
        self.font_service_url = url.into();
        self
    }

    /// Sets the directory used to look up and store font files.
    pub fn with_font_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.font_dir = path.as_ref().to_path_buf();
        self
    }

    pub fn with_fallback_font(mut self, family: impl Into<String>, size: f32) -> Self {
        self.fallback_family = family.into();
        self.fallback_size = size;
        self
    }

    pub fn with_line_spacing(mut self, spacing: f32) -> Self {
        self.line_spacing = spacing;
        self
    }
}
