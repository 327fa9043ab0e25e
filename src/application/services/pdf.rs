use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::ports::{OcrEngine, TextLayer};
use crate::domain::DomainError;

pub const DEFAULT_MIN_NATIVE_CHARS: usize = 100;

/// Reads a PDF's text layer and falls back to OCR when it is too thin to be
/// a real text layer (scanned documents).
#[derive(Clone)]
pub struct PdfTextExtractor {
    text_layer: Arc<dyn TextLayer>,
    ocr: Arc<dyn OcrEngine>,
    min_native_chars: usize,
}

impl PdfTextExtractor {
    pub fn new(text_layer: Arc<dyn TextLayer>, ocr: Arc<dyn OcrEngine>) -> Self {
        Self {
            text_layer,
            ocr,
            min_native_chars: DEFAULT_MIN_NATIVE_CHARS,
        }
    }

    pub fn with_min_native_chars(mut self, min_native_chars: usize) -> Self {
        self.min_native_chars = min_native_chars;
        self
    }

    /// Blocking.
    pub fn extract(&self, path: &Path) -> Result<String, DomainError> {
        let native = match self.text_layer.extract_pages(path) {
            Ok(pages) => pages
                .iter()
                .filter(|page| !page.text.trim().is_empty())
                .map(|page| page.text.as_str())
                .collect::<String>()
                .trim()
                .to_string(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "text layer unreadable");
                String::new()
            }
        };

        let native_chars = native.chars().count();
        if native_chars >= self.min_native_chars {
            debug!(path = %path.display(), chars = native_chars, "using native text layer");
            return Ok(native);
        }

        info!(path = %path.display(), chars = native_chars, "falling back to OCR");
        self.ocr.recognize(path)
    }
}
