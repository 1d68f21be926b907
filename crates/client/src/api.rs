//! Analysis Engine Contract
//!
//! Defines the interface this layer expects from the remote analysis engine.

use async_trait::async_trait;

use quality_lens_core::{
    project_metrics, Fault, Issue, JobId, JobStatusSnapshot, QualityMetrics,
    StartAnalysisRequest, StartAnalysisResponse, TrendPoint,
};

/// Trait every analysis engine backend implements.
///
/// `job_status` must be idempotent: it is called repeatedly while polling.
/// The narrower projections default to being derived from `job_status`;
/// backends with dedicated endpoints may override them.
#[async_trait]
pub trait AnalysisApi: Send + Sync {
    /// Submit a new analysis run.
    async fn start_analysis(
        &self,
        request: &StartAnalysisRequest,
    ) -> Result<StartAnalysisResponse, Fault>;

    /// Fetch the current status snapshot of a job.
    async fn job_status(&self, job_id: &JobId) -> Result<JobStatusSnapshot, Fault>;

    /// Metrics projection; `None` while the job is not completed.
    async fn quality_metrics(&self, job_id: &JobId) -> Result<Option<QualityMetrics>, Fault> {
        let snapshot = self.job_status(job_id).await?;
        Ok(project_metrics(&snapshot))
    }

    /// Issues reported for a job so far.
    async fn issues(&self, job_id: &JobId) -> Result<Vec<Issue>, Fault> {
        let snapshot = self.job_status(job_id).await?;
        Ok(snapshot.issues.unwrap_or_default())
    }

    /// Quality trend of a project over the last `days` days.
    async fn quality_trends(&self, project_id: &str, days: u32) -> Result<Vec<TrendPoint>, Fault>;

    /// Ask a free-form question about a job's results.
    async fn ask_question(&self, question: &str, job_id: &JobId) -> Result<String, Fault>;
}

/// Turn a non-success HTTP response into a transport fault.
///
/// The message is taken from a JSON `detail`/`message`/`error` field when the
/// body has one, else the trimmed body text, else the status reason phrase.
pub fn parse_http_fault(status: u16, body: &str) -> Fault {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["detail", "message", "error"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_string())
            })
        });

    let message = match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Request failed")
            .to_string(),
    };

    Fault::transport(status, message)
}
