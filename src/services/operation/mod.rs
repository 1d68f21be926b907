//! Async Operation Wrapper
//!
//! Runs one asynchronous unit of work at a time, tracks `loading`, and turns
//! failures into a classified [`ErrorState`](quality_lens_core::ErrorState)
//! instead of propagating them.

mod executor;
mod form;

pub use executor::{AsyncOperation, Callbacks, OperationState};
pub use form::{FormState, FormSubmission};
