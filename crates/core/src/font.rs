//! Font lookup for inserted text
//!
//! A family resolves to a local `<family>.ttf` when one exists. Otherwise the file
//! is downloaded from a font distribution service and kept next to the others;
//! there is no eviction. Resolution never fails: when nothing can be found the
//! handle simply names the family and the backend decides whether it can use it.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// The 14 standard PDF fonts every backend can draw without a font file.
pub const STANDARD_FONTS: [&str; 14] = [
    "Courier",
    "Courier-Bold",
    "Courier-Oblique",
    "Courier-BoldOblique",
    "Helvetica",
    "Helvetica-Bold",
    "Helvetica-Oblique",
    "Helvetica-BoldOblique",
    "Times-Roman",
    "Times-Bold",
    "Times-Italic",
    "Times-BoldItalic",
    "Symbol",
    "ZapfDingbats",
];

/// Check if a family is one of the 14 standard PDF fonts
pub fn is_standard_font(family: &str) -> bool {
    STANDARD_FONTS.contains(&family)
}

/// A font ready to be handed to a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontHandle {
    pub family: String,

    /// Local TrueType file, when one was found or downloaded
    pub file: Option<PathBuf>,
}

impl FontHandle {
    /// A handle with no file, for built-in or unresolved families
    pub fn named(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            file: None,
        }
    }

    pub fn is_standard(&self) -> bool {
        is_standard_font(&self.family)
    }
}

/// Errors from a font download
#[derive(Debug, thiserror::Error)]
pub enum FontFetchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("unexpected HTTP status {0}")]
    Status(u16),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of font files by family name
pub trait FontFetcher {
    fn fetch(&self, family: &str) -> Result<Vec<u8>, FontFetchError>;
}

/// Downloads fonts with a blocking `GET <base_url>?family=<family>`.
///
/// No timeout is configured; the call blocks until the server answers.
#[derive(Debug, Clone)]
pub struct HttpFontFetcher {
    base_url: String,
}

impl HttpFontFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl FontFetcher for HttpFontFetcher {
    fn fetch(&self, family: &str) -> Result<Vec<u8>, FontFetchError> {
        let response = ureq::get(&self.base_url)
            .query("family", family)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => FontFetchError::Status(code),
                ureq::Error::Transport(transport) => FontFetchError::Network(transport.to_string()),
            })?;

        if response.status() != 200 {
            return Err(FontFetchError::Status(response.status()));
        }

        let mut bytes = Vec::new();
        response.into_reader().read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Resolves families to local font files, downloading missing ones.
#[derive(Debug, Clone)]
pub struct FontResolver<F> {
    font_dir: PathBuf,
    fetcher: F,
}

impl<F: FontFetcher> FontResolver<F> {
    pub fn new(font_dir: impl Into<PathBuf>, fetcher: F) -> Self {
        Self {
            font_dir: font_dir.into(),
            fetcher,
        }
    }

    pub fn font_dir(&self) -> &Path {
        &self.font_dir
    }

    /// Path where the file for `family` lives (or would be stored)
    pub fn local_path(&self, family: &str) -> PathBuf {
        let file_stem: String = family
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.font_dir.join(format!("{file_stem}.ttf"))
    }

    /// Resolve a family. Never fails; see the module docs.
    pub fn resolve(&self, family: &str) -> FontHandle {
        if is_standard_font(family) {
            return FontHandle::named(family);
        }

        let path = self.local_path(family);
        if path.is_file() {
            log::debug!("Using local font file {}", path.display());
            return FontHandle {
                family: family.to_string(),
                file: Some(path),
            };
        }

        log::info!("Font '{}' not found locally, downloading", family);
        match self.download(family, &path) {
            Ok(()) => FontHandle {
                family: family.to_string(),
                file: Some(path),
            },
            Err(e) => {
                log::warn!("Could not download font '{}': {}", family, e);
                FontHandle::named(family)
            }
        }
    }

    fn download(&self, family: &str, path: &Path) -> Result<(), FontFetchError> {
        let bytes = self.fetcher.fetch(family)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
        log::debug!("Stored font '{}' at {}", family, path.display());
        Ok(())
    }
}
