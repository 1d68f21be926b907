//! Connectivity Integration Tests
//!
//! The reconnect coordinator refreshes the session once per offline-to-online
//! transition, which resumes a job whose initial load failed while offline.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quality_lens::services::network::{
    FnAction, ManualConnectivity, NetworkRetry, NetworkStatusObserver,
};
use quality_lens::services::session::{AnalysisSession, PollConfig, SessionPhase};
use quality_lens_core::{ErrorCategory, Fault, JobId};

use crate::support::{completed, processing, settle, FakeEngine};

#[tokio::test(start_paused = true)]
async fn test_offline_online_triggers_once_per_cycle() {
    let platform = Arc::new(ManualConnectivity::new(true));
    let observer = NetworkStatusObserver::start(platform.clone());
    let runs = Arc::new(AtomicUsize::new(0));
    let counter = runs.clone();
    let retry = NetworkRetry::spawn(
        &observer,
        Arc::new(FnAction(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok::<(), Fault>(())
            }
        })),
        true,
    );

    platform.set_online(false);
    settle().await;
    assert!(retry.is_offline());
    assert_eq!(runs.load(Ordering::SeqCst), 0);

    platform.set_online(true);
    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    // Staying online does not re-trigger.
    platform.set_online(true);
    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 1);

    platform.set_online(false);
    platform.set_online(true);
    settle().await;
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    retry.shutdown().await;
    observer.shutdown().await;
    assert_eq!(platform.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_resumes_stalled_session() {
    let engine = FakeEngine::new();
    engine.script(
        "job-a",
        vec![
            Err(Fault::transport(0, "network unreachable")),
            processing("job-a"),
            completed("job-a"),
        ],
    );
    let session = AnalysisSession::new(engine.clone(), PollConfig::default());
    let platform = Arc::new(ManualConnectivity::new(true));
    let observer = NetworkStatusObserver::start(platform.clone());
    let retry = NetworkRetry::spawn(&observer, Arc::new(session.clone()), true);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Failed);
    assert_eq!(view.error.category, ErrorCategory::Network);

    platform.set_online(false);
    settle().await;
    platform.set_online(true);
    settle().await;

    let view = session.view();
    assert_eq!(view.phase, SessionPhase::Processing);
    assert!(!view.error.is_error);
    assert!(session.is_polling());
    assert_eq!(retry.trigger_count(), 1);

    tokio::time::sleep(std::time::Duration::from_millis(3100)).await;
    assert_eq!(session.view().phase, SessionPhase::Completed);
    assert_eq!(engine.status_calls("job-a"), 3);

    retry.shutdown().await;
    observer.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_disabled_retry_leaves_session_alone() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![Err(Fault::transport(0, "offline")), processing("job-a")]);
    let session = AnalysisSession::new(engine.clone(), PollConfig::default());
    let platform = Arc::new(ManualConnectivity::new(false));
    let observer = NetworkStatusObserver::start(platform.clone());
    let retry = NetworkRetry::spawn(&observer, Arc::new(session.clone()), false);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    platform.set_online(true);
    settle().await;

    assert_eq!(engine.status_calls("job-a"), 1);
    assert_eq!(session.view().phase, SessionPhase::Failed);
    assert_eq!(retry.trigger_count(), 0);

    retry.shutdown().await;
    observer.shutdown().await;
}
