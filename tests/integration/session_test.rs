//! Analysis Session Integration Tests
//!
//! - Poll loop starts on a processing snapshot and stops on a terminal one
//! - Switching jobs never leaves two loops running
//! - Late responses for a superseded job are discarded

use std::sync::Arc;
use std::time::Duration;

use quality_lens::services::session::{AnalysisSession, PollConfig, SessionPhase};
use quality_lens_core::{ErrorCategory, JobId, StartAnalysisRequest};

use crate::support::{completed, processing, settle, FakeEngine};

fn session_for(engine: &Arc<FakeEngine>) -> AnalysisSession {
    AnalysisSession::new(engine.clone(), PollConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_processing_then_completed_stops_polling() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a"), completed("job-a")]);
    let session = session_for(&engine);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    assert_eq!(session.view().phase, SessionPhase::Processing);
    assert!(session.is_polling());

    tokio::time::sleep(Duration::from_millis(3100)).await;
    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Completed);
    assert!(view.last_updated.is_some());
    assert!(!session.is_polling());

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.status_calls("job-a"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_switching_jobs_keeps_one_loop() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a")]);
    engine.script("job-b", vec![processing("job-b")]);
    let session = session_for(&engine);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.set_current_job(Some(JobId::new("job-b"))).await;

    // B ticks at 4s, 7s, 10s, 13s; A never ticks.
    tokio::time::sleep(Duration::from_millis(12_100)).await;
    assert_eq!(engine.status_calls("job-a"), 1);
    assert_eq!(engine.status_calls("job-b"), 5);
    assert!(session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_late_response_for_superseded_job_is_discarded() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a")]);
    engine.script("job-b", vec![completed("job-b")]);
    engine.delay("job-a", Duration::from_secs(2));
    let session = session_for(&engine);

    let first = {
        let session = session.clone();
        tokio::spawn(async move {
            session.set_current_job(Some(JobId::new("job-a"))).await;
        })
    };
    settle().await;
    session.set_current_job(Some(JobId::new("job-b"))).await;
    assert_eq!(session.view().phase, SessionPhase::Completed);

    first.await.unwrap();
    let view = session.view();
    assert_eq!(view.job_id, Some(JobId::new("job-b")));
    assert_eq!(view.data.map(|d| d.id), Some(JobId::new("job-b")));
    assert_eq!(view.phase, SessionPhase::Completed);
    assert!(!session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_tick_is_abandoned_on_switch() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a")]);
    engine.script("job-b", vec![completed("job-b")]);
    let session = session_for(&engine);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    // The tick at 3s takes 2s to answer.
    engine.delay("job-a", Duration::from_secs(2));
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(engine.status_calls("job-a"), 2);

    session.set_current_job(Some(JobId::new("job-b"))).await;
    tokio::time::sleep(Duration::from_secs(10)).await;

    let view = session.view();
    assert_eq!(view.data.map(|d| d.id), Some(JobId::new("job-b")));
    assert_eq!(engine.status_calls("job-a"), 2);
}

#[tokio::test(start_paused = true)]
async fn test_fault_keeps_stale_data_visible() {
    let engine = FakeEngine::new();
    engine.script(
        "job-a",
        vec![processing("job-a"), Err(quality_lens_core::Fault::transport(502, "bad gateway"))],
    );
    let session = AnalysisSession::new(
        engine.clone(),
        PollConfig {
            interval: Duration::from_secs(3),
            max_failures: 1,
        },
    );

    session.set_current_job(Some(JobId::new("job-a"))).await;
    tokio::time::sleep(Duration::from_millis(3100)).await;

    let view = session.view();
    assert!(view.data.is_some());
    assert_eq!(view.error.category, ErrorCategory::Server);
    assert_eq!(view.phase, SessionPhase::Processing);
    assert!(session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_start_analysis_selects_returned_job() {
    let engine = FakeEngine::new();
    engine.script("job-started", vec![processing("job-started")]);
    let session = session_for(&engine);

    let job = session
        .start_analysis(StartAnalysisRequest::new("https://github.com/acme/shop"))
        .await;
    assert_eq!(job, Some(JobId::new("job-started")));
    assert_eq!(session.current_job(), Some(JobId::new("job-started")));
    assert!(session.form_state().submitted);
    assert!(session.is_polling());

    session.clear_job();
    assert!(!session.form_state().submitted);
    assert_eq!(session.view().phase, SessionPhase::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_unknown_job_fails_initial_load() {
    let engine = FakeEngine::new();
    let session = session_for(&engine);

    session.set_current_job(Some(JobId::new("missing"))).await;
    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(view.error.category, ErrorCategory::NotFound);
    assert!(!view.loading);
    assert!(view.data.is_none());
    assert!(!session.is_polling());
}
