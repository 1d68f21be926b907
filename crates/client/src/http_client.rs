//! HTTP Client Factory
//!
//! Builds the reqwest client used to reach the analysis engine and maps
//! reqwest transport errors onto faults.

use std::time::Duration;

use quality_lens_core::{CoreError, CoreResult, Fault, ProxyConfig};

/// Build a `reqwest::Client` with the given timeout and proxy.
///
/// - `Some(proxy)` -> route all requests through the proxy
/// - `None` -> explicitly disable proxies, ignoring env vars
pub fn build_http_client(
    timeout: Duration,
    proxy: Option<&ProxyConfig>,
) -> CoreResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().timeout(timeout);
    match proxy {
        Some(cfg) => {
            let mut p = reqwest::Proxy::all(cfg.url())
                .map_err(|e| CoreError::config(format!("Invalid proxy {}: {}", cfg.url(), e)))?;
            if let Some((user, password)) = cfg.credentials() {
                p = p.basic_auth(user, password);
            }
            builder = builder.proxy(p);
        }
        None => {
            builder = builder.no_proxy();
        }
    }
    builder
        .build()
        .map_err(|e| CoreError::config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a reqwest error onto a fault.
///
/// Requests that never produced a response become status-`0` transport
/// faults; client-side timeouts become generic timeout faults.
pub fn fault_from_reqwest(err: &reqwest::Error) -> Fault {
    if err.is_timeout() {
        Fault::generic(format!("Request timeout: {}", err))
    } else if err.is_connect() || err.is_request() {
        Fault::transport(0, err.to_string())
    } else if let Some(status) = err.status() {
        Fault::transport(status.as_u16(), err.to_string())
    } else if err.is_decode() || err.is_body() {
        Fault::generic(format!("Invalid response body: {}", err))
    } else {
        Fault::generic(err.to_string())
    }
}
