//! HTTP Analysis Client
//!
//! Implementation of [`AnalysisApi`] over the engine's JSON HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use url::Url;

use super::api::{parse_http_fault, AnalysisApi};
use crate::http_client::{build_http_client, fault_from_reqwest};
use quality_lens_core::{
    AnswerResponse, CoreError, CoreResult, Fault, JobId, JobStatusSnapshot, ProxyConfig,
    QuestionRequest, StartAnalysisRequest, StartAnalysisResponse, TrendPoint,
};

/// Connection settings for [`HttpAnalysisClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub proxy: Option<ProxyConfig>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(30),
            proxy: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = Some(proxy);
        self
    }
}

/// Analysis engine client speaking JSON over HTTP.
pub struct HttpAnalysisClient {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new(config: ClientConfig) -> CoreResult<Self> {
        let base_url = Url::parse(config.base_url.trim()).map_err(|e| {
            CoreError::config(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(CoreError::config(format!(
                "Base URL '{}' cannot carry paths",
                config.base_url
            )));
        }
        let client = build_http_client(config.timeout, config.proxy.as_ref())?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, Fault> {
        let response = request.send().await.map_err(|e| fault_from_reqwest(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| fault_from_reqwest(&e))?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "analysis engine returned an error status");
            return Err(parse_http_fault(status.as_u16(), &body));
        }

        serde_json::from_str(&body)
            .map_err(|e| Fault::generic(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl AnalysisApi for HttpAnalysisClient {
    async fn start_analysis(
        &self,
        request: &StartAnalysisRequest,
    ) -> Result<StartAnalysisResponse, Fault> {
        let url = self.endpoint(&["analyze"]);
        tracing::info!(repository = %request.repository_url, "starting analysis");
        self.send_json(self.client.post(url).json(request)).await
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobStatusSnapshot, Fault> {
        let url = self.endpoint(&["status", job_id.as_str()]);
        self.send_json(self.client.get(url)).await
    }

    async fn quality_trends(&self, project_id: &str, days: u32) -> Result<Vec<TrendPoint>, Fault> {
        let mut url = self.endpoint(&["quality-trends", project_id]);
        url.query_pairs_mut().append_pair("days", &days.to_string());
        self.send_json(self.client.get(url)).await
    }

    async fn ask_question(&self, question: &str, job_id: &JobId) -> Result<String, Fault> {
        let url = self.endpoint(&["ask"]);
        let body = QuestionRequest {
            question: question.to_string(),
            job_id: job_id.clone(),
        };
        let response: AnswerResponse = self.send_json(self.client.post(url).json(&body)).await?;
        Ok(response.answer)
    }
}
