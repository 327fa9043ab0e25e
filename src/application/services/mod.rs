mod ingestion;
mod pdf;
mod rag;

pub use ingestion::{IngestRun, IngestionOptions, IngestionService, SourceSpec};
pub use pdf::{PdfTextExtractor, DEFAULT_MIN_NATIVE_CHARS};
pub use rag::{RagService, RagSettings};
