//! Poll Loop
//!
//! A repeating task that sleeps, runs one tick, and stops when cancelled or
//! when the tick says so. Owned by a single [`PollHandle`].

use std::future::Future;
use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a running poll loop. Dropping it cancels the loop.
#[derive(Debug)]
pub struct PollHandle {
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Spawn a loop that waits `interval` before every tick.
    ///
    /// The tick receives the loop's token so it can abandon in-flight work
    /// once cancelled.
    pub fn spawn<F, Fut>(interval: Duration, mut tick: F) -> Self
    where
        F: FnMut(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = ControlFlow<()>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let loop_token = token.clone();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = loop_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {}
                }

                if tick(loop_token.clone()).await.is_break() || loop_token.is_cancelled() {
                    break;
                }
            }
            tracing::debug!("poll loop stopped");
        });

        Self { token, task }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// True until cancelled or the loop has finished on its own.
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled() && !self.task.is_finished()
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
