use crate::infrastructure::http::ApiClient;
use crate::modules::auth::AuthManager;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::utils::logger::{LogContext, TimedOperation};
use crate::shared::utils::{PacingLimiter, Validator};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use super::types::{
    ChunkReport, ImportObserver, ImportOptions, ImportOutcome, ImportRequest, ImportSummary,
    RunPhase,
};

/// Drives one spreadsheet upload against the chunked import endpoint.
///
/// Chunks are strictly sequential: the backend reports the continuation
/// point and the downstream processor is rate limited globally, so chunk
/// n+1 is never sent before chunk n's response is processed and the pacing
/// delay has elapsed. The run ends when the backend reports zero attempted
/// rows, when the chunk cap is hit, on the first error, or on cancellation.
pub struct ChunkedImportDriver {
    api: Arc<ApiClient>,
    auth: Arc<AuthManager>,
    pacing: PacingLimiter,
    options: ImportOptions,
}

impl ChunkedImportDriver {
    pub fn new(
        api: Arc<ApiClient>,
        auth: Arc<AuthManager>,
        options: ImportOptions,
    ) -> AppResult<Self> {
        Validator::validate_chunk_size(options.chunk_size)?;
        let pacing = PacingLimiter::new(options.pacing);

        Ok(Self {
            api,
            auth,
            pacing,
            options,
        })
    }

    pub async fn run(
        &self,
        request: ImportRequest,
        cancel: CancellationToken,
        observer: Arc<dyn ImportObserver>,
    ) -> AppResult<ImportOutcome> {
        // Preconditions abort before any network call, one distinct
        // message per violation.
        if request.payload.is_empty() {
            return Err(AppError::ValidationError(
                "Select an Excel file before starting an import".to_string(),
            ));
        }
        Validator::validate_provider_name(&request.provider_name)?;

        let timer = TimedOperation::new("chunked import");
        let mut summary = ImportSummary::default();

        observer.on_phase(RunPhase::Authenticating);
        if let Err(e) = self.auth.ensure_valid().await {
            observer.on_phase(RunPhase::Failed);
            return Ok(ImportOutcome {
                phase: RunPhase::Failed,
                summary,
                error: Some(e),
            });
        }

        let mut start_row: u32 = 0;
        let phase = loop {
            if cancel.is_cancelled() {
                break RunPhase::Aborted;
            }
            if summary.chunks >= self.options.max_chunks {
                observer.on_phase(RunPhase::Failed);
                timer.finish();
                return Ok(ImportOutcome {
                    phase: RunPhase::Failed,
                    summary,
                    error: Some(AppError::ImportError(format!(
                        "Backend never signaled completion after {} chunks; stopping",
                        self.options.max_chunks
                    ))),
                });
            }

            if summary.chunks > 0 {
                observer.on_phase(RunPhase::Waiting);
            }
            // The pacing wait stays cancellable so an abort does not sit
            // out the full delay; the loop top turns it into Aborted.
            tokio::select! {
                _ = cancel.cancelled() => continue,
                _ = self.pacing.until_ready() => {}
            }

            observer.on_phase(RunPhase::UploadingChunk);
            let report = match self.post_chunk(&request, start_row, &observer).await {
                Ok(report) => report,
                Err(e) => {
                    observer.on_phase(RunPhase::Failed);
                    timer.finish();
                    return Ok(ImportOutcome {
                        phase: RunPhase::Failed,
                        summary,
                        error: Some(e),
                    });
                }
            };

            // Zero attempted rows is the backend's exhaustion signal: the
            // run completes without this report touching totals or
            // advancing the continuation point.
            if report.attempted == 0 {
                break RunPhase::Completed;
            }

            summary.absorb(&report);
            observer.on_chunk(&report, &summary);
            LogContext::import_progress(summary.chunks, summary.created_count, summary.failed_count);
            start_row += self.options.chunk_size;
        };

        observer.on_phase(phase);
        timer.finish();
        Ok(ImportOutcome {
            phase,
            summary,
            error: None,
        })
    }

    async fn post_chunk(
        &self,
        request: &ImportRequest,
        start_row: u32,
        observer: &Arc<dyn ImportObserver>,
    ) -> AppResult<ChunkReport> {
        let options = &self.options;
        self.api
            .post_multipart(&options.endpoint, || {
                let part =
                    Self::progress_part(&request.payload, &request.file_name, observer.clone());
                Form::new()
                    .part("file", part)
                    .text("start_row", start_row.to_string())
                    .text("chunk_size", options.chunk_size.to_string())
                    .text("proveedor_nombre", request.provider_name.trim().to_string())
                    .text("only_first_sheet", options.only_first_sheet.to_string())
            })
            .await
    }

    /// File part wrapped in a counting stream so upload progress reaches
    /// the observer as a percentage while the body is consumed.
    fn progress_part(
        payload: &[u8],
        file_name: &str,
        observer: Arc<dyn ImportObserver>,
    ) -> Part {
        let total = payload.len() as u64;
        let pieces: Vec<Vec<u8>> = payload.chunks(64 * 1024).map(|c| c.to_vec()).collect();
        let sent = AtomicU64::new(0);

        let stream = futures::stream::iter(pieces.into_iter().map(move |bytes| {
            let done = sent.fetch_add(bytes.len() as u64, Ordering::Relaxed) + bytes.len() as u64;
            observer.on_upload_progress(((done * 100) / total.max(1)) as u8);
            Ok::<Vec<u8>, std::io::Error>(bytes)
        }));

        Part::stream_with_length(Body::wrap_stream(stream), total).file_name(file_name.to_string())
    }
}
