use lopdf::Document;
use std::path::Path;
use tracing::warn;

use crate::domain::ports::{PageText, TextLayer};
use crate::domain::DomainError;

/// Native text layer via lopdf. Pages that fail to decode are logged and
/// skipped so one bad page does not hide the rest.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfTextLayer;

impl TextLayer for LopdfTextLayer {
    fn extract_pages(&self, path: &Path) -> Result<Vec<PageText>, DomainError> {
        let document = Document::load(path)
            .map_err(|e| DomainError::pdf(format!("{}: {e}", path.display())))?;

        let mut pages = Vec::new();
        for page_no in document.get_pages().into_keys() {
            match document.extract_text(&[page_no]) {
                Ok(text) => pages.push(PageText {
                    number: page_no,
                    text,
                }),
                Err(e) => warn!(path = %path.display(), page = page_no, error = %e, "page text unreadable"),
            }
        }

        Ok(pages)
    }
}
