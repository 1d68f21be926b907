//! Issue list view.

use std::sync::Arc;

use futures_util::FutureExt;
use quality_lens_core::Issue;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use super::keyed::{Fetcher, KeyedView, Resource};
use super::JobKey;
use crate::services::session::AnalysisSession;

pub type IssuesState = Resource<JobKey, Vec<Issue>>;

/// Issues of the current job. Replaced wholesale on each fetch; empty on failure.
pub struct IssuesView {
    view: KeyedView<JobKey, Vec<Issue>>,
    cancel: CancellationToken,
}

impl IssuesView {
    pub fn spawn(session: &AnalysisSession) -> Self {
        let api = session.api();
        let fetch: Fetcher<JobKey, Vec<Issue>> = Arc::new(move |key: JobKey| {
            let api = api.clone();
            async move { api.issues(&key.job_id).await }.boxed()
        });

        let view = KeyedView::new("issues", fetch);
        let cancel = CancellationToken::new();
        view.drive(session.subscribe(), cancel.clone(), JobKey::of);
        Self { view, cancel }
    }

    pub fn state(&self) -> IssuesState {
        self.view.state()
    }

    pub fn issues(&self) -> Vec<Issue> {
        self.view.state().value
    }

    pub fn subscribe(&self) -> watch::Receiver<IssuesState> {
        self.view.subscribe()
    }

    pub async fn refetch(&self) {
        self.view.refetch().await;
    }
}

impl Drop for IssuesView {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
