//! Application layer - Use cases and orchestration.
//!
//! This module contains application services that orchestrate domain logic
//! and infrastructure. Services depend on domain ports (traits) rather than
//! concrete implementations.

pub mod observer;
pub mod prompt;
pub mod services;

pub use observer::{IngestObserver, TracingObserver};
pub use services::{
    IngestRun, IngestionOptions, IngestionService, PdfTextExtractor, RagService, RagSettings, SourceSpec,
};
