//! Quality trend view.

use std::sync::Arc;

use futures_util::FutureExt;
use quality_lens_core::{JobId, TrendPoint};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::keyed::{Fetcher, KeyedView, Resource};
use crate::services::session::{AnalysisSession, SessionView};

/// Trend lookup key: the job, the project it belongs to, and the horizon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendKey {
    pub job_id: JobId,
    pub project_id: String,
    pub days: u32,
}

impl TrendKey {
    fn of(view: &SessionView, days: u32) -> Option<Self> {
        Some(Self {
            job_id: view.job_id.clone()?,
            project_id: view.project_id()?,
            days,
        })
    }
}

pub type TrendsState = Resource<TrendKey, Vec<TrendPoint>>;

pub struct TrendsView {
    view: KeyedView<TrendKey, Vec<TrendPoint>>,
    session: AnalysisSession,
    days: watch::Sender<u32>,
    cancel: CancellationToken,
}

impl TrendsView {
    pub fn spawn(session: &AnalysisSession, days: u32) -> Self {
        let api = session.api();
        let fetch: Fetcher<TrendKey, Vec<TrendPoint>> = Arc::new(move |key: TrendKey| {
            let api = api.clone();
            async move { api.quality_trends(&key.project_id, key.days).await }.boxed()
        });

        let view = KeyedView::new("trends", fetch);
        let (days, days_rx) = watch::channel(days);
        let cancel = CancellationToken::new();
        view.drive(session.subscribe(), cancel.clone(), move |session_view| {
            TrendKey::of(session_view, *days_rx.borrow())
        });

        Self {
            view,
            session: session.clone(),
            days,
            cancel,
        }
    }

    pub fn days(&self) -> u32 {
        *self.days.borrow()
    }

    /// Change the horizon and fetch for it.
    pub fn set_days(&self, days: u32) {
        self.days.send_replace(days);
        self.view.follow(TrendKey::of(&self.session.view(), days));
    }

    pub fn state(&self) -> TrendsState {
        self.view.state()
    }

    pub fn trends(&self) -> Vec<TrendPoint> {
        self.view.state().value
    }

    pub fn subscribe(&self) -> watch::Receiver<TrendsState> {
        self.view.subscribe()
    }

    pub async fn refetch(&self) {
        self.view.refetch().await;
    }
}

impl Drop for TrendsView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
