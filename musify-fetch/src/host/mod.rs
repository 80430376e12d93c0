//! Host APIs for Musify fetches.
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`connectivity`] - Network availability probes

pub mod connectivity;
pub mod http;

pub use connectivity::{ConnectivityProbe, StaticConnectivity, TcpConnectivityProbe};
pub use http::{HttpClient, host_of};
