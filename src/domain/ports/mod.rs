mod embedding;
mod llm;
mod pdf;
mod vector_store;

pub use embedding::EmbeddingService;
pub use llm::LlmService;
pub use pdf::{OcrEngine, PageText, TextLayer};
pub use vector_store::VectorStore;
