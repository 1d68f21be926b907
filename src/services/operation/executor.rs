//! Operation Executor
//!
//! `execute` never returns an error: a failed operation yields `None` and the
//! classified failure is readable from [`AsyncOperation::state`].

use std::future::Future;

use quality_lens_core::{ErrorState, Fault};
use tokio::sync::watch;

/// Observable state of an [`AsyncOperation`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationState {
    pub loading: bool,
    pub error: ErrorState,
}

type SuccessFn<'a, T> = Box<dyn FnOnce(&T) + Send + 'a>;
type ErrorFn<'a> = Box<dyn FnOnce(&Fault) + Send + 'a>;

/// Optional success/failure hooks for one execution.
pub struct Callbacks<'a, T> {
    on_success: Option<SuccessFn<'a, T>>,
    on_error: Option<ErrorFn<'a>>,
}

impl<'a, T> Callbacks<'a, T> {
    pub fn new() -> Self {
        Self {
            on_success: None,
            on_error: None,
        }
    }

    pub fn on_success(mut self, f: impl FnOnce(&T) + Send + 'a) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&Fault) + Send + 'a) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }
}

impl<T> Default for Callbacks<'_, T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Generic wrapper around a fallible async unit of work.
#[derive(Debug)]
pub struct AsyncOperation {
    state: watch::Sender<OperationState>,
}

impl AsyncOperation {
    pub fn new() -> Self {
        let (state, _) = watch::channel(OperationState::default());
        Self { state }
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> OperationState {
        self.state.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> ErrorState {
        self.state.borrow().error.clone()
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|s| s.error.clear());
    }

    /// Run `operation` without callbacks.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Fault>>,
    {
        self.execute_with(operation, Callbacks::new()).await
    }

    /// Run `operation`, invoking the matching callback once it settles.
    pub async fn execute_with<T, F, Fut>(
        &self,
        operation: F,
        callbacks: Callbacks<'_, T>,
    ) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Fault>>,
    {
        self.state.send_modify(|s| {
            s.loading = true;
            s.error.clear();
        });

        match operation().await {
            Ok(value) => {
                self.state.send_modify(|s| s.loading = false);
                if let Some(on_success) = callbacks.on_success {
                    on_success(&value);
                }
                Some(value)
            }
            Err(fault) => {
                tracing::debug!(error = %fault, "operation failed");
                let error = ErrorState::from_fault(&fault);
                self.state.send_modify(|s| {
                    s.error = error;
                    s.loading = false;
                });
                if let Some(on_error) = callbacks.on_error {
                    on_error(&fault);
                }
                None
            }
        }
    }

    /// Same as [`execute_with`](Self::execute_with); reads better at retry call sites.
    pub async fn retry<T, F, Fut>(&self, operation: F, callbacks: Callbacks<'_, T>) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Fault>>,
    {
        self.execute_with(operation, callbacks).await
    }
}

impl Default for AsyncOperation {
    fn default() -> Self {
        Self::new()
    }
}
