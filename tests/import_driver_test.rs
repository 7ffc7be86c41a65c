//! Chunked import driver tests: accumulation, pacing, preconditions,
//! cancellation, and the chunk cap.

mod utils;

use electroerp::{
    AppError, ChunkReport, ChunkedImportDriver, ImportObserver, ImportOptions, ImportRequest,
    ImportSummary, NoopObserver, RunPhase,
};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn import_request() -> ImportRequest {
    ImportRequest {
        file_name: "productos.xlsx".to_string(),
        // enough bytes to exercise the streamed upload
        payload: vec![0x50; 4096],
        provider_name: "Cecotec".to_string(),
    }
}

fn driver_for(server: &utils::MockErp, pacing: Duration, max_chunks: u32) -> ChunkedImportDriver {
    let (auth, api) = utils::client_stack(&server.base_url);
    let options = ImportOptions {
        pacing,
        max_chunks,
        ..ImportOptions::default()
    };
    ChunkedImportDriver::new(api, auth, options).unwrap()
}

/// Records every phase transition and the upload percentages.
#[derive(Default)]
struct RecordingObserver {
    phases: Mutex<Vec<RunPhase>>,
    max_upload: AtomicU32,
}

impl ImportObserver for RecordingObserver {
    fn on_phase(&self, phase: RunPhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_upload_progress(&self, percent: u8) {
        self.max_upload.fetch_max(percent as u32, Ordering::SeqCst);
    }
}

#[tokio::test]
async fn test_run_accumulates_until_backend_reports_exhaustion() {
    let server = utils::spawn().await;
    server.state.push_chunk_reply(50, 48, 2);
    // the next, unscripted reply reports zero attempted rows

    let driver = driver_for(&server, Duration::from_millis(250), 400);
    let observer = Arc::new(RecordingObserver::default());
    let outcome = driver
        .run(import_request(), CancellationToken::new(), observer.clone())
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Completed);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.summary.attempted, 50);
    assert_eq!(outcome.summary.created_count, 48);
    assert_eq!(outcome.summary.failed_count, 2);
    assert_eq!(outcome.summary.created.len(), 48);
    assert_eq!(outcome.summary.failed.len(), 2);
    assert_eq!(outcome.summary.chunks, 1);

    let calls = server.state.chunk_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].start_row, 0);
    assert_eq!(calls[1].start_row, 25);
    assert_eq!(calls[0].provider, "Cecotec");
    assert!(calls[0].file_len > 0);

    // exactly one pacing delay between the two uploads
    let gap = calls[1].at.duration_since(calls[0].at);
    assert!(gap >= Duration::from_millis(200), "gap was {:?}", gap);

    let phases = observer.phases.lock().unwrap().clone();
    assert_eq!(phases.first(), Some(&RunPhase::Authenticating));
    assert!(phases.contains(&RunPhase::Waiting));
    assert_eq!(phases.last(), Some(&RunPhase::Completed));
    assert_eq!(observer.max_upload.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_empty_provider_name_aborts_before_any_network_call() {
    let server = utils::spawn().await;
    let driver = driver_for(&server, Duration::from_millis(10), 400);

    let mut request = import_request();
    request.provider_name = "   ".to_string();
    let err = driver
        .run(request, CancellationToken::new(), Arc::new(NoopObserver))
        .await
        .unwrap_err();

    match err {
        AppError::ValidationError(message) => assert!(message.contains("Provider name")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(server.state.token_requests.load(Ordering::SeqCst), 0);
    assert!(server.state.chunk_calls().is_empty());
}

#[tokio::test]
async fn test_missing_file_aborts_before_any_network_call() {
    let server = utils::spawn().await;
    let driver = driver_for(&server, Duration::from_millis(10), 400);

    let mut request = import_request();
    request.payload.clear();
    let err = driver
        .run(request, CancellationToken::new(), Arc::new(NoopObserver))
        .await
        .unwrap_err();

    match err {
        AppError::ValidationError(message) => assert!(message.contains("Excel")),
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(server.state.token_requests.load(Ordering::SeqCst), 0);
    assert!(server.state.chunk_calls().is_empty());
}

#[tokio::test]
async fn test_failed_authentication_ends_run_as_failed() {
    let server = utils::spawn().await;
    server.state.reject_logins.store(true, Ordering::SeqCst);
    let driver = driver_for(&server, Duration::from_millis(10), 400);

    let outcome = driver
        .run(import_request(), CancellationToken::new(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Failed);
    assert!(matches!(outcome.error, Some(AppError::AuthenticationError(_))));
    assert!(server.state.chunk_calls().is_empty());
}

#[tokio::test]
async fn test_pre_cancelled_run_aborts_without_uploading() {
    let server = utils::spawn().await;
    let driver = driver_for(&server, Duration::from_millis(10), 400);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let outcome = driver
        .run(import_request(), cancel, Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Aborted);
    assert!(outcome.error.is_none());
    assert!(server.state.chunk_calls().is_empty());
}

/// Cancels the run as soon as the first chunk result arrives.
struct CancelAfterFirstChunk(CancellationToken);

impl ImportObserver for CancelAfterFirstChunk {
    fn on_chunk(&self, _report: &ChunkReport, _summary: &ImportSummary) {
        self.0.cancel();
    }
}

#[tokio::test]
async fn test_cancellation_between_chunks_keeps_partial_results() {
    let server = utils::spawn().await;
    server.state.push_chunk_reply(25, 23, 2);
    server.state.push_chunk_reply(25, 25, 0);

    // A long pacing delay would stall the run for seconds if cancellation
    // were only observed after the wait.
    let driver = driver_for(&server, Duration::from_secs(30), 400);
    let cancel = CancellationToken::new();
    let outcome = driver
        .run(
            import_request(),
            cancel.clone(),
            Arc::new(CancelAfterFirstChunk(cancel)),
        )
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Aborted);
    assert!(outcome.error.is_none());
    assert_eq!(outcome.summary.chunks, 1);
    assert_eq!(outcome.summary.created_count, 23);
    assert_eq!(outcome.summary.failed_count, 2);
    assert_eq!(server.state.chunk_calls().len(), 1);
}

#[tokio::test]
async fn test_chunk_cap_stops_a_backend_that_never_finishes() {
    let server = utils::spawn().await;
    server.state.push_chunk_reply(25, 25, 0);
    server.state.push_chunk_reply(25, 24, 1);
    server.state.push_chunk_reply(25, 25, 0);

    let driver = driver_for(&server, Duration::from_millis(10), 2);
    let outcome = driver
        .run(import_request(), CancellationToken::new(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Failed);
    assert!(matches!(outcome.error, Some(AppError::ImportError(_))));
    assert_eq!(outcome.summary.chunks, 2);
    assert_eq!(outcome.summary.created_count, 49);
    assert_eq!(outcome.summary.failed_count, 1);
    assert_eq!(server.state.chunk_calls().len(), 2);
}

#[tokio::test]
async fn test_server_validation_error_fails_run_but_keeps_partials() {
    let server = utils::spawn().await;
    server.state.push_chunk_reply(25, 25, 0);
    server.state.fail_after_scripted.store(true, Ordering::SeqCst);

    let driver = driver_for(&server, Duration::from_millis(10), 400);
    let outcome = driver
        .run(import_request(), CancellationToken::new(), Arc::new(NoopObserver))
        .await
        .unwrap();

    assert_eq!(outcome.phase, RunPhase::Failed);
    match outcome.error {
        Some(AppError::ValidationError(message)) => {
            assert!(message.contains("invalid spreadsheet"))
        }
        other => panic!("expected validation error, got {:?}", other),
    }
    assert_eq!(outcome.summary.created_count, 25);
    assert_eq!(server.state.chunk_calls().len(), 2);
}
