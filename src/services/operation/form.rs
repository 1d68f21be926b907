//! Form Submission
//!
//! [`AsyncOperation`] plus a `submitted` flag that only a successful
//! completion sets and only [`FormSubmission::reset`] clears.

use std::future::Future;

use quality_lens_core::{ErrorState, Fault};
use tokio::sync::watch;

use super::executor::{AsyncOperation, Callbacks, OperationState};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    pub loading: bool,
    pub error: ErrorState,
    pub submitted: bool,
}

#[derive(Debug)]
pub struct FormSubmission {
    operation: AsyncOperation,
    submitted: watch::Sender<bool>,
}

impl FormSubmission {
    pub fn new() -> Self {
        let (submitted, _) = watch::channel(false);
        Self {
            operation: AsyncOperation::new(),
            submitted,
        }
    }

    pub fn state(&self) -> FormState {
        let OperationState { loading, error } = self.operation.state();
        FormState {
            loading,
            error,
            submitted: *self.submitted.borrow(),
        }
    }

    pub fn is_submitted(&self) -> bool {
        *self.submitted.borrow()
    }

    pub fn subscribe_operation(&self) -> watch::Receiver<OperationState> {
        self.operation.subscribe()
    }

    pub fn subscribe_submitted(&self) -> watch::Receiver<bool> {
        self.submitted.subscribe()
    }

    /// Run the submission. A failure leaves `submitted` as it was.
    pub async fn submit<T, F, Fut>(&self, operation: F, callbacks: Callbacks<'_, T>) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Fault>>,
    {
        let result = self.operation.execute_with(operation, callbacks).await;
        if result.is_some() {
            self.submitted.send_replace(true);
        }
        result
    }

    /// Clear `submitted` and any error.
    pub fn reset(&self) {
        self.submitted.send_replace(false);
        self.operation.clear_error();
    }
}

impl Default for FormSubmission {
    fn default() -> Self {
        Self::new()
    }
}
