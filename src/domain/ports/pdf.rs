use std::path::Path;

use crate::domain::errors::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub number: u32,
    pub text: String,
}

/// Reads the embedded text layer of a PDF.
pub trait TextLayer: Send + Sync {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DomainError>;
}

/// Recognizes text from rendered page images. Blocking.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, path: &Path) -> Result<String, DomainError>;
}
