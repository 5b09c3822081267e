use crate::config::DEFAULT_STATUS_CEILING;
use crate::scanner::{ProbeOutcome, Prober};
use crate::target::Target;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Outcome of one enumeration pass, both lists in wordlist order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Enumeration {
    pub discovered: Vec<String>,
    pub timed_out: Vec<String>,
    pub interrupted: bool,
}

/// Probes `<label>.<domain>` for each wordlist label, one at a time.
pub struct SubdomainEnumerator {
    prober: Arc<dyn Prober>,
    status_ceiling: u16,
    cancel: CancellationToken,
}

impl SubdomainEnumerator {
    pub fn new(prober: Arc<dyn Prober>) -> Self {
        Self {
            prober,
            status_ceiling: DEFAULT_STATUS_CEILING,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_status_ceiling(mut self, ceiling: u16) -> Self {
        self.status_ceiling = ceiling;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub async fn enumerate(&self, domain: &Target, wordlist: &[String]) -> Enumeration {
        log::info!("[scan::subdomain] enumerate: domain={} candidates={} status_ceiling={}",
            domain, wordlist.len(), self.status_ceiling);

        let start = Instant::now();
        let mut result = Enumeration::default();
        let mut seen = HashSet::new();

        for label in wordlist {
            if self.cancel.is_cancelled() {
                log::warn!("[scan::subdomain] cancelled: domain={} discovered_so_far={}",
                    domain, result.discovered.len());
                result.interrupted = true;
                break;
            }

            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            let candidate = domain.subdomain(label);
            if !seen.insert(candidate.clone()) {
                continue;
            }

            match self.prober.probe_http(&candidate).await {
                ProbeOutcome::Success(probe) if probe.status_code < self.status_ceiling => {
                    log::info!("[scan::subdomain] found: candidate={} status={} response_time={}ms",
                        candidate, probe.status_code, probe.response_time.as_millis());
                    result.discovered.push(candidate);
                }
                ProbeOutcome::Success(probe) => {
                    log::debug!("[scan::subdomain] server_error: candidate={} status={}",
                        candidate, probe.status_code);
                }
                ProbeOutcome::Timeout => {
                    log::info!("[scan::subdomain] timeout: candidate={}", candidate);
                    result.timed_out.push(candidate);
                }
                ProbeOutcome::ConnectionRefused => {
                    log::trace!("[scan::subdomain] refused: candidate={}", candidate);
                }
                ProbeOutcome::OtherError(e) => {
                    log::debug!("[scan::subdomain] unreachable: candidate={} error={}", candidate, e);
                }
            }
        }

        log::info!("[scan::subdomain] enumerate_completed: domain={} duration={}ms discovered={} timed_out={}",
            domain, start.elapsed().as_millis(), result.discovered.len(), result.timed_out.len());
        result
    }
}
