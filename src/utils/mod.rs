//! Utilities
//!
//! Common utilities used throughout the crate.

pub mod error;
pub mod logging;
pub mod paths;

pub use error::*;
pub use logging::init_tracing;
pub use paths::*;
