//! Derived View Integration Tests
//!
//! Metrics, issues and trends follow the session's current job on their own
//! tasks; question answering always resolves to an answer.

use std::sync::Arc;
use std::time::Duration;

use quality_lens::services::session::{AnalysisSession, PollConfig};
use quality_lens::services::views::{
    IssuesView, MetricsView, QuestionAnswerer, TrendsView, FALLBACK_ANSWER, NO_JOB_ANSWER,
};
use quality_lens_core::{ErrorCategory, Fault, JobId, LifecycleState};

use crate::support::{completed_with_issues, processing, settle, FakeEngine};

fn session_for(engine: &Arc<FakeEngine>) -> AnalysisSession {
    AnalysisSession::new(engine.clone(), PollConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_metrics_synthesized_once_job_completes() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a"), completed_with_issues("job-a")]);
    let session = session_for(&engine);
    let metrics = MetricsView::spawn(&session);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;
    let state = metrics.state();
    assert_eq!(state.key.map(|k| k.state), Some(LifecycleState::Processing));
    assert!(state.value.is_none());
    assert!(!state.loading);

    tokio::time::sleep(Duration::from_millis(3100)).await;
    let projection = metrics.metrics().expect("completed job has metrics");
    assert_eq!(projection.technical_debt_hours, 5.0);
    assert_eq!(projection.complexity_distribution.low, 33);
    assert_eq!(projection.complexity_distribution.medium, 33);
    assert_eq!(projection.complexity_distribution.high, 33);
    assert_eq!(projection.test_coverage_pct, 78.0);
    assert_eq!(projection.duplication_pct, 9.0);
}

#[tokio::test(start_paused = true)]
async fn test_views_reset_when_job_cleared() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    let session = session_for(&engine);
    let metrics = MetricsView::spawn(&session);
    let issues = IssuesView::spawn(&session);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;
    assert_eq!(issues.issues().len(), 6);
    assert!(metrics.metrics().is_some());

    session.clear_job();
    settle().await;
    assert!(issues.state().key.is_none());
    assert!(issues.issues().is_empty());
    assert!(metrics.metrics().is_none());
    assert!(!metrics.state().error.is_error);
}

#[tokio::test(start_paused = true)]
async fn test_issue_failure_falls_back_to_empty_list() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    engine.fail_issues(Fault::transport(0, "connection refused"));
    let session = session_for(&engine);
    let issues = IssuesView::spawn(&session);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;

    let state = issues.state();
    assert!(state.value.is_empty());
    assert!(!state.loading);
    assert_eq!(state.error.category, ErrorCategory::Network);

    // The session itself is unaffected.
    assert!(!session.view().error.is_error);
}

#[tokio::test(start_paused = true)]
async fn test_trends_use_related_project_and_follow_horizon() {
    let engine = FakeEngine::new();
    let mut snapshot = completed_with_issues("job-a").unwrap();
    snapshot.related_project_id = Some("proj-7".to_string());
    engine.script("job-a", vec![Ok(snapshot)]);
    engine.script("job-b", vec![completed_with_issues("job-b")]);
    let session = session_for(&engine);
    let trends = TrendsView::spawn(&session, 30);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;
    assert_eq!(trends.trends().len(), 3);

    trends.set_days(2);
    settle().await;
    assert_eq!(trends.days(), 2);
    assert_eq!(trends.trends().len(), 2);

    // Without a related project the job id is the project key.
    session.set_current_job(Some(JobId::new("job-b"))).await;
    settle().await;

    assert_eq!(
        engine.trend_calls(),
        vec![
            ("proj-7".to_string(), 30),
            ("proj-7".to_string(), 2),
            ("job-b".to_string(), 2),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_refetch_repeats_current_key() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    let session = session_for(&engine);
    let trends = TrendsView::spawn(&session, 14);

    session.set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;
    trends.refetch().await;

    assert_eq!(engine.trend_calls().len(), 2);
    assert_eq!(trends.state().key.map(|k| k.days), Some(14));
}

#[tokio::test(start_paused = true)]
async fn test_question_without_job_skips_engine() {
    let engine = FakeEngine::new();
    let session = session_for(&engine);
    let answerer = QuestionAnswerer::new(&session);

    let answer = answerer.ask_question("Is this code secure?").await;
    assert_eq!(answer, NO_JOB_ANSWER);
    assert!(engine.question_calls().is_empty());
    assert!(!answerer.state().error.is_error);
}

#[tokio::test(start_paused = true)]
async fn test_question_failure_returns_fallback_and_raw_error() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    engine.answer_with(Err(Fault::transport(503, "model overloaded")));
    let session = session_for(&engine);
    let answerer = QuestionAnswerer::new(&session);
    session.set_current_job(Some(JobId::new("job-a"))).await;

    let answer = answerer.ask_question("What should I fix first?").await;
    assert_eq!(answer, FALLBACK_ANSWER);

    let state = answerer.state();
    assert!(!state.loading);
    assert!(state.error.is_error);
    assert_eq!(state.error.message.as_deref(), Some("model overloaded"));
    assert_eq!(
        engine.question_calls(),
        vec![("What should I fix first?".to_string(), "job-a".to_string())]
    );
}

#[tokio::test(start_paused = true)]
async fn test_question_success_clears_previous_error() {
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    engine.answer_with(Err(Fault::generic("timeout while generating")));
    let session = session_for(&engine);
    let answerer = QuestionAnswerer::new(&session);
    session.set_current_job(Some(JobId::new("job-a"))).await;

    answerer.ask_question("first").await;
    assert_eq!(answerer.state().error.category, ErrorCategory::Timeout);

    engine.answer_with(Ok("Start with the high severity issues.".to_string()));
    let answer = answerer.ask_question("second").await;
    assert_eq!(answer, "Start with the high severity issues.");
    assert!(!answerer.state().error.is_error);
}
