use std::path::Path;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::domain::{DocumentReport, DomainError, IngestSummary};

/// Receives ingestion progress. Every method defaults to a no-op.
pub trait IngestObserver: Send + Sync {
    fn document_started(&self, _path: &Path) {}
    fn document_finished(&self, _report: &DocumentReport, _elapsed: Duration) {}
    fn document_failed(&self, _path: &Path, _error: &DomainError) {}
    fn chunk_skipped(&self, _path: &Path, _index: usize) {}
    fn chunk_failed(&self, _path: &Path, _index: usize, _error: &str) {}
    fn run_finished(&self, _summary: &IngestSummary) {}
}

/// Reports progress through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl IngestObserver for TracingObserver {
    fn document_started(&self, path: &Path) {
        debug!(path = %path.display(), "ingesting document");
    }

    fn document_finished(&self, report: &DocumentReport, elapsed: Duration) {
        info!(
            path = %report.path.display(),
            chunks = report.chunks_total,
            stored = report.chunks_stored,
            skipped = report.chunks_skipped,
            failed = report.chunks_failed,
            elapsed_ms = elapsed.as_millis() as u64,
            "document ingested"
        );
    }

    fn document_failed(&self, path: &Path, error: &DomainError) {
        error!(path = %path.display(), error = %error, "document failed");
    }

    fn chunk_skipped(&self, path: &Path, index: usize) {
        warn!(path = %path.display(), chunk_index = index, "no embedding returned, chunk skipped");
    }

    fn chunk_failed(&self, path: &Path, index: usize, error: &str) {
        warn!(path = %path.display(), chunk_index = index, error, "chunk failed");
    }

    fn run_finished(&self, summary: &IngestSummary) {
        info!(
            documents = summary.documents_ingested,
            documents_failed = summary.documents_failed,
            stored = summary.chunks_stored,
            skipped = summary.chunks_skipped,
            failed = summary.chunks_failed,
            "ingestion finished"
        );
    }
}
