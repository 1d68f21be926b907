//! Quality Lens Client
//!
//! The contract this layer consumes from the remote analysis engine
//! ([`AnalysisApi`]) and its HTTP implementation ([`HttpAnalysisClient`]).
//! Every failure surfaces as a [`quality_lens_core::Fault`].

pub mod api;
pub mod http;
pub mod http_client;

pub use api::{parse_http_fault, AnalysisApi};
pub use http::{ClientConfig, HttpAnalysisClient};
pub use http_client::{build_http_client, fault_from_reqwest};
