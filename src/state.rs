//! Application State
//!
//! Application-scoped wiring of every service: settings, the analysis engine
//! client, connectivity, the session and its derived views. Construct it once
//! inside a tokio runtime and share it.

use std::sync::Arc;
use tokio::sync::RwLock;

use quality_lens_client::{AnalysisApi, HttpAnalysisClient};

use crate::models::settings::{ClientSettings, SettingsUpdate};
use crate::services::network::{
    ManualConnectivity, NetworkRetry, NetworkStatus, NetworkStatusObserver,
};
use crate::services::session::{AnalysisSession, PollConfig};
use crate::services::views::{IssuesView, MetricsView, QuestionAnswerer, TrendsView};
use crate::storage::ConfigService;
use crate::utils::error::AppResult;

pub struct AppState {
    /// Configuration service for client settings
    config: RwLock<ConfigService>,
    /// Adapter the host feeds OS connectivity notifications into
    connectivity: Arc<ManualConnectivity>,
    network: NetworkStatusObserver,
    retry: NetworkRetry,
    session: AnalysisSession,
    metrics: MetricsView,
    issues: IssuesView,
    trends: TrendsView,
    questions: QuestionAnswerer,
}

impl AppState {
    /// Load settings from the default location and connect over HTTP
    pub fn initialize(online: bool) -> AppResult<Self> {
        Self::from_config(ConfigService::new()?, online)
    }

    /// Build the HTTP client from `config`'s settings
    pub fn from_config(config: ConfigService, online: bool) -> AppResult<Self> {
        let client = HttpAnalysisClient::new(config.settings().client_config())?;
        tracing::info!(base_url = %client.base_url(), "analysis engine client ready");
        Ok(Self::with_api(config, Arc::new(client), online))
    }

    /// Wire every service around an explicit engine implementation
    pub fn with_api(config: ConfigService, api: Arc<dyn AnalysisApi>, online: bool) -> Self {
        let settings = config.settings().clone();

        let connectivity = Arc::new(ManualConnectivity::new(online));
        let network = NetworkStatusObserver::start(connectivity.clone());

        let session = AnalysisSession::new(
            api,
            PollConfig {
                interval: settings.poll_interval(),
                max_failures: settings.max_consecutive_poll_failures,
            },
        );
        let retry = NetworkRetry::spawn(
            &network,
            Arc::new(session.clone()),
            settings.network_retry_enabled,
        );

        let metrics = MetricsView::spawn(&session);
        let issues = IssuesView::spawn(&session);
        let trends = TrendsView::spawn(&session, settings.default_trend_days);
        let questions = QuestionAnswerer::new(&session);

        Self {
            config: RwLock::new(config),
            connectivity,
            network,
            retry,
            session,
            metrics,
            issues,
            trends,
            questions,
        }
    }

    pub fn session(&self) -> &AnalysisSession {
        &self.session
    }

    pub fn metrics(&self) -> &MetricsView {
        &self.metrics
    }

    pub fn issues(&self) -> &IssuesView {
        &self.issues
    }

    pub fn trends(&self) -> &TrendsView {
        &self.trends
    }

    pub fn questions(&self) -> &QuestionAnswerer {
        &self.questions
    }

    pub fn connectivity(&self) -> &Arc<ManualConnectivity> {
        &self.connectivity
    }

    pub fn network(&self) -> &NetworkStatusObserver {
        &self.network
    }

    pub fn network_status(&self) -> NetworkStatus {
        self.network.status()
    }

    pub fn retry(&self) -> &NetworkRetry {
        &self.retry
    }

    /// Get the current settings
    pub async fn settings(&self) -> ClientSettings {
        self.config.read().await.settings().clone()
    }

    /// Update and persist settings.
    ///
    /// The reconnect flag applies immediately. Connection and polling settings
    /// apply the next time the state is built.
    pub async fn update_settings(&self, update: SettingsUpdate) -> AppResult<ClientSettings> {
        let settings = self.config.write().await.update_config(update)?;
        self.retry.set_enabled(settings.network_retry_enabled);
        Ok(settings)
    }

    /// Stop background tasks and the poll loop
    pub async fn shutdown(&self) {
        self.retry.shutdown().await;
        self.session.dispose();
        self.network.shutdown().await;
        tracing::info!("application state shut down");
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("online", &self.network.is_online())
            .field("job", &self.session.current_job())
            .finish()
    }
}
