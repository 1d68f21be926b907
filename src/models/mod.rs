//! Data Models
//!
//! Application-side models. Wire and domain types live in `quality_lens_core`.

pub mod settings;

pub use settings::*;
