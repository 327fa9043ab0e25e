mod answer;
mod document;
mod embedding;
mod report;

pub use answer::{truncate_chars, Answer, Source};
pub use document::{
    index_chunks, slug_for, Chunk, Document, Metadata, PointIdStrategy, ScoredPoint,
    SourceKind, StoredPoint, CHUNK_INDEX_KEY, CONTENT_KEY, INGESTED_AT_KEY,
};
pub use embedding::{DistanceMetric, Embedding};
pub use report::{DocumentFailure, DocumentReport, IngestSummary};
