//! Quality metrics view.

use std::sync::Arc;

use futures_util::FutureExt;
use quality_lens_core::QualityMetrics;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::keyed::{Fetcher, KeyedView, Resource};
use super::JobKey;
use crate::services::session::AnalysisSession;

pub type MetricsState = Resource<JobKey, Option<QualityMetrics>>;

/// Metrics projection of the current job; `None` until the job completes.
pub struct MetricsView {
    view: KeyedView<JobKey, Option<QualityMetrics>>,
    cancel: CancellationToken,
}

impl MetricsView {
    pub fn spawn(session: &AnalysisSession) -> Self {
        let api = session.api();
        let fetch: Fetcher<JobKey, Option<QualityMetrics>> = Arc::new(move |key: JobKey| {
            let api = api.clone();
            async move { api.quality_metrics(&key.job_id).await }.boxed()
        });

        let view = KeyedView::new("metrics", fetch);
        let cancel = CancellationToken::new();
        view.drive(session.subscribe(), cancel.clone(), JobKey::of);
        Self { view, cancel }
    }

    pub fn state(&self) -> MetricsState {
        self.view.state()
    }

    pub fn metrics(&self) -> Option<QualityMetrics> {
        self.view.state().value
    }

    pub fn subscribe(&self) -> watch::Receiver<MetricsState> {
        self.view.subscribe()
    }

    pub async fn refetch(&self) {
        self.view.refetch().await;
    }
}

impl Drop for MetricsView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
