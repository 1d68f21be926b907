//! Application State Integration Tests
//!
//! Wiring from a config file on disk through to the session and views.

use std::time::Duration;

use tempfile::TempDir;

use quality_lens::services::session::SessionPhase;
use quality_lens::storage::ConfigService;
use quality_lens::{AppState, SettingsUpdate};
use quality_lens_core::JobId;

use crate::support::{completed_with_issues, processing, settle, FakeEngine};

fn config_in(dir: &TempDir) -> ConfigService {
    ConfigService::at(dir.path().join("config.json")).unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_state_wires_session_and_views() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::new();
    engine.script("job-a", vec![completed_with_issues("job-a")]);
    let state = AppState::with_api(config_in(&dir), engine.clone(), true);

    state.session().set_current_job(Some(JobId::new("job-a"))).await;
    settle().await;

    assert_eq!(state.session().view().phase, SessionPhase::Completed);
    assert_eq!(state.issues().issues().len(), 6);
    assert!(state.metrics().metrics().is_some());
    assert_eq!(state.trends().days(), 30);
    assert_eq!(state.trends().trends().len(), 3);
    assert!(state.network_status().is_online);

    state.shutdown().await;
    assert_eq!(state.connectivity().listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_settings_update_toggles_reconnect() {
    let dir = TempDir::new().unwrap();
    let state = AppState::with_api(config_in(&dir), FakeEngine::new(), true);
    assert!(state.retry().is_enabled());

    let updated = state
        .update_settings(SettingsUpdate {
            network_retry_enabled: Some(false),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!updated.network_retry_enabled);
    assert!(!state.retry().is_enabled());

    // Persisted for the next start
    let reloaded = config_in(&dir);
    assert!(!reloaded.settings().network_retry_enabled);

    state.shutdown().await;
}

#[tokio::test]
async fn test_invalid_settings_update_is_rejected() {
    let dir = TempDir::new().unwrap();
    let state = AppState::with_api(config_in(&dir), FakeEngine::new(), true);

    let result = state
        .update_settings(SettingsUpdate {
            poll_interval_ms: Some(0),
            ..Default::default()
        })
        .await;
    assert!(result.is_err());
    assert_eq!(state.settings().await.poll_interval_ms, 3000);

    state.shutdown().await;
}

#[tokio::test]
async fn test_from_config_builds_http_client() {
    let dir = TempDir::new().unwrap();
    let state = AppState::from_config(config_in(&dir), false).unwrap();
    assert!(state.network_status().is_offline);
    assert!(state.session().current_job().is_none());
    // Defaults stay in memory until settings change
    assert!(!dir.path().join("config.json").exists());
    state.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_session_for_good() {
    let dir = TempDir::new().unwrap();
    let engine = FakeEngine::new();
    engine.script("job-a", vec![processing("job-a")]);
    let state = AppState::with_api(config_in(&dir), engine.clone(), true);

    state.session().set_current_job(Some(JobId::new("job-a"))).await;
    assert!(state.session().is_polling());
    state.shutdown().await;

    state.connectivity().set_online(false);
    state.connectivity().set_online(true);
    state.session().refresh().await;
    tokio::time::sleep(Duration::from_secs(30)).await;

    assert!(!state.session().is_polling());
    assert_eq!(engine.status_calls("job-a"), 1);
}
