//! Network Services
//!
//! Connectivity observation and retry-on-reconnect.

pub mod retry;
pub mod status;

pub use retry::{FnAction, NetworkRetry, ReconnectAction};
pub use status::{
    ConnectionInfo, ConnectivityEvent, ConnectivityPlatform, ManualConnectivity, NetworkStatus,
    NetworkStatusObserver,
};
