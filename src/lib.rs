//! Quality Lens
//!
//! Client-side orchestration of long-running, server-executed code analysis
//! jobs. It includes:
//! - The analysis session: current job, status snapshots, the poll loop
//! - Derived views: metrics, issues, trends, question answering
//! - Connectivity observation and refresh-on-reconnect
//! - Async operation wrappers with classified error state
//! - Client settings, config storage and logging setup
//!
//! Nothing here renders UI; consumers subscribe to `watch` channels and call
//! the operations exposed by [`AppState`] and the services it wires.

pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use models::settings::{ClientSettings, SettingsUpdate};
pub use services::network::{NetworkRetry, NetworkStatus, NetworkStatusObserver};
pub use services::operation::{AsyncOperation, FormSubmission};
pub use services::session::{AnalysisSession, PollConfig, SessionPhase, SessionView};
pub use services::views::{IssuesView, MetricsView, QuestionAnswerer, TrendsView};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
