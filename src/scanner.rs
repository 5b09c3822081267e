use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Result of a single bounded network check.
///
/// Probes never return `Err`: every failure path is one of the non-success
/// variants, so callers match on the outcome instead of wrapping calls.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome<T> {
    Success(T),
    Timeout,
    ConnectionRefused,
    OtherError(ProbeError),
}

impl<T> ProbeOutcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success(_))
    }

    /// Short label used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            ProbeOutcome::Success(_) => "success",
            ProbeOutcome::Timeout => "timeout",
            ProbeOutcome::ConnectionRefused => "refused",
            ProbeOutcome::OtherError(ProbeError::Resolution(_)) => "resolution_failure",
            ProbeOutcome::OtherError(ProbeError::Network(_)) => "network_error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProbeError {
    /// The name did not resolve to any address
    #[error("resolution failure: {0}")]
    Resolution(String),
    /// Host unreachable, reset, protocol error, ...
    #[error("network error: {0}")]
    Network(String),
}

/// Successful HTTP liveness check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HttpProbe {
    pub status_code: u16,
    pub response_time: Duration,
}

/// Successful TCP connect
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TcpProbe {
    pub connect_time: Duration,
}

#[async_trait]
pub trait Prober: Send + Sync {
    /// Issue one HTTP GET against `http://<target>` within the HTTP bound
    async fn probe_http(&self, target: &str) -> ProbeOutcome<HttpProbe>;

    /// Attempt one TCP connect to `target:port` within the TCP bound
    async fn probe_tcp(&self, target: &str, port: u16) -> ProbeOutcome<TcpProbe>;
}
