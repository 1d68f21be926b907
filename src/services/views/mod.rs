//! Derived Views
//!
//! Independently keyed projections of the session's current job. Each view
//! follows the session on its own task and never writes back to it.

mod keyed;
pub mod issues;
pub mod metrics;
pub mod qa;
pub mod trends;

pub use issues::{IssuesState, IssuesView};
pub use keyed::Resource;
pub use metrics::{MetricsState, MetricsView};
pub use qa::{QuestionAnswerer, FALLBACK_ANSWER, NO_JOB_ANSWER};
pub use trends::{TrendKey, TrendsState, TrendsView};

use quality_lens_core::{JobId, LifecycleState};

use crate::services::session::SessionView;

/// Key for per-job projections.
///
/// Includes the lifecycle state so a projection is fetched again when the job
/// completes. `None` until a snapshot for the current job has arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobKey {
    pub job_id: JobId,
    pub state: LifecycleState,
}

impl JobKey {
    pub(crate) fn of(view: &SessionView) -> Option<Self> {
        Some(Self {
            job_id: view.job_id.clone()?,
            state: view.data.as_ref()?.state,
        })
    }
}
