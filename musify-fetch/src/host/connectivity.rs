//! Network availability checks.
//!
//! Repository facades consult a [`ConnectivityProbe`] before issuing a
//! provider call so that an offline device fails fast.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// Default host used by [`TcpConnectivityProbe`].
pub const DEFAULT_PROBE_ADDR: &str = "api.jamendo.com:443";

/// Reports whether the network is currently reachable.
#[async_trait]
pub trait ConnectivityProbe: Send + Sync {
    /// Returns true if a provider call can be attempted.
    async fn is_online(&self) -> bool;
}

// ============================================================================
// TCP Probe
// ============================================================================

/// Probe that opens a TCP connection to a well-known host.
#[derive(Debug, Clone)]
pub struct TcpConnectivityProbe {
    addr: String,
    timeout: Duration,
}

impl TcpConnectivityProbe {
    /// Creates a probe for `addr` (`host:port`).
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self {
            addr: addr.into(),
            timeout,
        }
    }
}

impl Default for TcpConnectivityProbe {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_ADDR, Duration::from_secs(3))
    }
}

#[async_trait]
impl ConnectivityProbe for TcpConnectivityProbe {
    async fn is_online(&self) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.addr)).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!(addr = %self.addr, error = %e, "Connectivity probe failed");
                false
            }
            Err(_) => {
                debug!(addr = %self.addr, "Connectivity probe timed out");
                false
            }
        }
    }
}

// ============================================================================
// Static Probe
// ============================================================================

/// Probe with a settable answer. Used for tests and forced-offline mode.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    /// Creates a probe with the given initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Always online.
    pub fn online() -> Self {
        Self::new(true)
    }

    /// Always offline.
    pub fn offline() -> Self {
        Self::new(false)
    }

    /// Changes the reported state.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConnectivityProbe for StaticConnectivity {
    async fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
