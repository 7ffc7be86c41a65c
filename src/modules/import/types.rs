use crate::shared::errors::AppError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One product the backend created from an uploaded row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedProduct {
    pub id: i64,
    pub name: String,
}

/// One row the backend rejected, with its reason.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedProduct {
    pub name: String,
    pub error: String,
}

/// Per-chunk outcome reported by the import endpoint. Produced once per
/// backend call, never mutated afterwards.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkReport {
    #[serde(default, rename = "productos_creados")]
    pub created: Vec<CreatedProduct>,
    #[serde(default, rename = "productos_fallidos")]
    pub failed: Vec<FailedProduct>,
    #[serde(default, rename = "total_intentados")]
    pub attempted: u32,
    #[serde(default, rename = "total_creados")]
    pub created_count: u32,
    #[serde(default, rename = "total_fallidos")]
    pub failed_count: u32,
}

/// Running totals and concatenated created/failed lists across all chunks
/// of one import run. Totals always equal the sum of the absorbed reports.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportSummary {
    pub attempted: u32,
    pub created_count: u32,
    pub failed_count: u32,
    pub created: Vec<CreatedProduct>,
    pub failed: Vec<FailedProduct>,
    /// Chunks absorbed so far; the exhaustion report is not counted.
    pub chunks: u32,
}

impl ImportSummary {
    pub fn absorb(&mut self, report: &ChunkReport) {
        self.attempted += report.attempted;
        self.created_count += report.created_count;
        self.failed_count += report.failed_count;
        self.created.extend(report.created.iter().cloned());
        self.failed.extend(report.failed.iter().cloned());
        self.chunks += 1;
    }
}

/// Where an import run currently is, and how it ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Authenticating,
    UploadingChunk,
    Waiting,
    Completed,
    Failed,
    Aborted,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RunPhase::Idle => "idle",
            RunPhase::Authenticating => "authenticating",
            RunPhase::UploadingChunk => "uploading chunk",
            RunPhase::Waiting => "waiting",
            RunPhase::Completed => "completed",
            RunPhase::Failed => "failed",
            RunPhase::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

/// Tuning for an import run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub endpoint: String,
    /// Rows per backend batch
    pub chunk_size: u32,
    /// Fixed delay between chunk uploads
    pub pacing: Duration,
    /// Upper bound on chunks per run, in case the backend never reports
    /// zero attempted rows
    pub max_chunks: u32,
    pub only_first_sheet: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            endpoint: "/api/v1/mistral-llm/process-excel".to_string(),
            chunk_size: 25,
            // The downstream processor allows 5 requests/minute
            pacing: Duration::from_secs(12),
            max_chunks: 400,
            only_first_sheet: true,
        }
    }
}

/// The dataset one run uploads.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub file_name: String,
    pub payload: Vec<u8>,
    pub provider_name: String,
}

/// Terminal state of a run: the phase it ended in, everything accumulated
/// before it ended, and for failed runs the error that ended it.
#[derive(Debug)]
pub struct ImportOutcome {
    pub phase: RunPhase,
    pub summary: ImportSummary,
    pub error: Option<AppError>,
}

/// Progress seam for callers that want to surface run state.
pub trait ImportObserver: Send + Sync {
    fn on_phase(&self, _phase: RunPhase) {}
    fn on_upload_progress(&self, _percent: u8) {}
    fn on_chunk(&self, _report: &ChunkReport, _summary: &ImportSummary) {}
}

/// Observer that ignores everything.
pub struct NoopObserver;

impl ImportObserver for NoopObserver {}
