//! Quality Lens Core
//!
//! Foundational types for the Quality Lens client workspace. This crate has no
//! knowledge of transports, runtimes, or the UI layer.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `fault` - Collaborator faults, the error classifier, and `ErrorState`
//! - `models` - Job identifiers, status snapshots, issues, metrics, trends
//! - `metrics` - Local synthesis of the quality metrics projection
//! - `proxy` - Proxy configuration shared with the HTTP client crate
//!
//! ## Design Principles
//!
//! 1. **Only serde/thiserror/chrono** - keeps build times minimal
//! 2. **Pure functions** - classification and synthesis never touch I/O
//! 3. **Unidirectional dependency** - this crate depends on nothing else in the workspace

pub mod error;
pub mod fault;
pub mod metrics;
pub mod models;
pub mod proxy;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Faults & Classification ────────────────────────────────────────────
pub use fault::{classify, Classification, ErrorCategory, ErrorState, Fault};

// ── Domain Models ──────────────────────────────────────────────────────
pub use models::{
    AnswerResponse, ComplexityDistribution, Issue, IssueCategory, JobId, JobStatusSnapshot,
    LifecycleState, QualityMetrics, QuestionRequest, Severity, StartAnalysisRequest,
    StartAnalysisResponse, TrendPoint,
};

// ── Metrics Synthesis ──────────────────────────────────────────────────
pub use metrics::{project_metrics, synthesize_metrics};

// ── Proxy Types ────────────────────────────────────────────────────────
pub use proxy::{ProxyConfig, ProxyProtocol};
