//! Network Status Observer
//!
//! Event-driven view of connectivity. The observer reads the platform's
//! current flag synchronously at construction, then follows platform
//! connectivity events until shut down.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Capacity of the per-subscriber transition queue
const TRANSITION_CAPACITY: usize = 64;

/// Connectivity as seen by consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub is_online: bool,
    pub is_offline: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_type: Option<String>,
}

impl NetworkStatus {
    fn new(is_online: bool, info: ConnectionInfo) -> Self {
        Self {
            is_online,
            is_offline: !is_online,
            connection_type: info.connection_type,
            effective_type: info.effective_type,
        }
    }

    fn set_online(&mut self, online: bool) {
        self.is_online = online;
        self.is_offline = !online;
    }
}

/// Connection-quality hint reported by the platform (e.g. `wifi` / `4g`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub connection_type: Option<String>,
    pub effective_type: Option<String>,
}

/// Signal emitted by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
    ConnectionChanged(ConnectionInfo),
}

/// Source of connectivity signals.
pub trait ConnectivityPlatform: Send + Sync {
    /// Current connectivity flag, read synchronously.
    fn is_online(&self) -> bool;

    fn connection_info(&self) -> ConnectionInfo {
        ConnectionInfo::default()
    }

    /// Register a listener for connectivity events. Dropping the receiver unregisters it.
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}

/// Platform adapter fed explicitly by the host application (or by tests).
pub struct ManualConnectivity {
    online: AtomicBool,
    info: Mutex<ConnectionInfo>,
    events: broadcast::Sender<ConnectivityEvent>,
}

impl ManualConnectivity {
    pub fn new(online: bool) -> Self {
        let (events, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            online: AtomicBool::new(online),
            info: Mutex::new(ConnectionInfo::default()),
            events,
        }
    }

    /// Record a connectivity flip and notify listeners.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
        let event = if online {
            ConnectivityEvent::Online
        } else {
            ConnectivityEvent::Offline
        };
        let _ = self.events.send(event);
    }

    /// Record a connection-quality change and notify listeners.
    pub fn set_connection(&self, info: ConnectionInfo) {
        if let Ok(mut current) = self.info.lock() {
            *current = info.clone();
        }
        let _ = self.events.send(ConnectivityEvent::ConnectionChanged(info));
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.events.receiver_count()
    }
}

impl ConnectivityPlatform for ManualConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }

    fn connection_info(&self) -> ConnectionInfo {
        self.info.lock().map(|i| i.clone()).unwrap_or_default()
    }

    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent> {
        self.events.subscribe()
    }
}

/// Application-scoped connectivity observer.
///
/// Must be started inside a tokio runtime.
pub struct NetworkStatusObserver {
    status: watch::Sender<NetworkStatus>,
    transitions: broadcast::Sender<NetworkStatus>,
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl NetworkStatusObserver {
    pub fn start(platform: Arc<dyn ConnectivityPlatform>) -> Self {
        // Register before reading the flag so no event slips between the two.
        let events = platform.subscribe();
        let initial = NetworkStatus::new(platform.is_online(), platform.connection_info());
        tracing::debug!(online = initial.is_online, "network observer started");

        let (status, _) = watch::channel(initial);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(Self::follow_events(
            platform,
            events,
            status.clone(),
            transitions.clone(),
            cancel.clone(),
        ));

        Self {
            status,
            transitions,
            cancel,
            task: Mutex::new(Some(task)),
        }
    }

    async fn follow_events(
        platform: Arc<dyn ConnectivityPlatform>,
        mut events: broadcast::Receiver<ConnectivityEvent>,
        status: watch::Sender<NetworkStatus>,
        transitions: broadcast::Sender<NetworkStatus>,
        cancel: CancellationToken,
    ) {
        loop {
            let event = tokio::select! {
                _ = cancel.cancelled() => break,
                event = events.recv() => event,
            };

            let changed = match event {
                Ok(ConnectivityEvent::Online) => status.send_if_modified(|s| {
                    let changed = !s.is_online;
                    s.set_online(true);
                    changed
                }),
                Ok(ConnectivityEvent::Offline) => status.send_if_modified(|s| {
                    let changed = s.is_online;
                    s.set_online(false);
                    changed
                }),
                Ok(ConnectivityEvent::ConnectionChanged(info)) => status.send_if_modified(|s| {
                    let changed = s.connection_type != info.connection_type
                        || s.effective_type != info.effective_type;
                    s.connection_type = info.connection_type;
                    s.effective_type = info.effective_type;
                    changed
                }),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "missed connectivity events; resyncing");
                    let fresh = NetworkStatus::new(platform.is_online(), platform.connection_info());
                    status.send_if_modified(|s| {
                        let changed = *s != fresh;
                        *s = fresh;
                        changed
                    })
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };

            if changed {
                let current = status.borrow().clone();
                tracing::info!(online = current.is_online, "network status changed");
                let _ = transitions.send(current);
            }
        }
        // `events` drops here, unregistering from the platform.
    }

    pub fn status(&self) -> NetworkStatus {
        self.status.borrow().clone()
    }

    pub fn is_online(&self) -> bool {
        self.status.borrow().is_online
    }

    /// Latest-value subscription.
    pub fn subscribe(&self) -> watch::Receiver<NetworkStatus> {
        self.status.subscribe()
    }

    /// Every status change, in order.
    pub fn transitions(&self) -> broadcast::Receiver<NetworkStatus> {
        self.transitions.subscribe()
    }

    /// Stop following the platform and release its listener.
    pub async fn shutdown(&self) {
        self.cancel.cancel();
        let task = self.task.lock().ok().and_then(|mut t| t.take());
        if let Some(task) = task {
            let _ = task.await;
        }
    }
}

impl Drop for NetworkStatusObserver {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
