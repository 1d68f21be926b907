//! Retry on Reconnect
//!
//! Runs a caller-supplied action once per offline-to-online transition while
//! enabled. The action's outcome is logged and otherwise ignored.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use quality_lens_core::Fault;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::status::{NetworkStatus, NetworkStatusObserver};

/// Work to run after connectivity returns.
#[async_trait]
pub trait ReconnectAction: Send + Sync {
    async fn run(&self) -> Result<(), Fault>;
}

/// Adapts an async closure into a [`ReconnectAction`].
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F, Fut> ReconnectAction for FnAction<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Fault>> + Send,
{
    async fn run(&self) -> Result<(), Fault> {
        (self.0)().await
    }
}

/// Reconnect coordinator bound to one [`NetworkStatusObserver`].
pub struct NetworkRetry {
    status: watch::Receiver<NetworkStatus>,
    enabled: watch::Sender<bool>,
    triggered: Arc<AtomicUsize>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkRetry {
    pub fn spawn(
        observer: &NetworkStatusObserver,
        action: Arc<dyn ReconnectAction>,
        enabled: bool,
    ) -> Self {
        // Transitions first, so nothing between the snapshot and the loop is lost.
        let transitions = observer.transitions();
        let status = observer.subscribe();
        let (enabled_tx, enabled_rx) = watch::channel(enabled);
        let triggered = Arc::new(AtomicUsize::new(0));
        let cancel = CancellationToken::new();

        let task = tokio::spawn(watch_reconnects(
            transitions,
            status.clone(),
            enabled_rx,
            action,
            triggered.clone(),
            cancel.clone(),
        ));

        Self {
            status,
            enabled: enabled_tx,
            triggered,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    pub fn is_online(&self) -> bool {
        self.status.borrow().is_online
    }

    pub fn is_offline(&self) -> bool {
        self.status.borrow().is_offline
    }

    pub fn is_enabled(&self) -> bool {
        *self.enabled.borrow()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.send_replace(enabled);
    }

    /// How many times the action has been started.
    pub fn trigger_count(&self) -> usize {
        self.triggered.load(Ordering::SeqCst)
    }

    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for NetworkRetry {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn watch_reconnects(
    mut transitions: broadcast::Receiver<NetworkStatus>,
    status: watch::Receiver<NetworkStatus>,
    mut enabled: watch::Receiver<bool>,
    action: Arc<dyn ReconnectAction>,
    triggered: Arc<AtomicUsize>,
    cancel: CancellationToken,
) {
    let mut current = status.borrow().clone();
    let mut was_offline = current.is_offline;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            next = transitions.recv() => match next {
                Ok(next) => current = next,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "missed network transitions");
                    was_offline = true;
                    current = status.borrow().clone();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            changed = enabled.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }

        if current.is_offline {
            was_offline = true;
        }

        if *enabled.borrow_and_update() && current.is_online && was_offline {
            was_offline = false;
            triggered.fetch_add(1, Ordering::SeqCst);
            tracing::info!("connection restored; running reconnect action");
            let action = action.clone();
            tokio::spawn(async move {
                if let Err(e) = action.run().await {
                    tracing::warn!(error = %e, "reconnect action failed");
                }
            });
        }
    }
}
