//! Services
//!
//! Stateful services of the orchestration layer.

pub mod network;
pub mod operation;
pub mod session;
pub mod views;

pub use network::{ManualConnectivity, NetworkRetry, NetworkStatusObserver};
pub use operation::{AsyncOperation, FormSubmission};
pub use session::AnalysisSession;
