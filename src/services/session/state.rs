//! Session State
//!
//! Read-only view published by [`AnalysisSession`](super::AnalysisSession).

use std::time::Duration;

use chrono::{DateTime, Utc};
use quality_lens_core::{ErrorState, JobId, JobStatusSnapshot};
use serde::Serialize;

/// Lifecycle of the session's current job.
///
/// `Failed` means the status fetch itself failed. A snapshot whose lifecycle
/// state is `error` is terminal too but lands in `Completed` with `data` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Loading,
    Processing,
    Completed,
    Failed,
}

impl SessionPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub job_id: Option<JobId>,
    pub data: Option<JobStatusSnapshot>,
    pub loading: bool,
    pub error: ErrorState,
    pub phase: SessionPhase,
    /// Consecutive failed poll ticks
    pub poll_failures: u32,
    pub last_updated: Option<DateTime<Utc>>,
}

impl SessionView {
    pub(crate) fn loading(job_id: JobId) -> Self {
        Self {
            job_id: Some(job_id),
            loading: true,
            phase: SessionPhase::Loading,
            ..Self::default()
        }
    }

    /// Project id used for trend lookups.
    pub fn project_id(&self) -> Option<String> {
        let data = self.data.as_ref()?;
        Some(
            data.related_project_id
                .clone()
                .unwrap_or_else(|| data.id.as_str().to_string()),
        )
    }
}

/// Poll cadence and mid-poll failure tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    /// Consecutive failed ticks before the error is surfaced
    pub max_failures: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(3000),
            max_failures: 3,
        }
    }
}
