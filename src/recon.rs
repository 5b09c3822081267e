use crate::config::ReconConfig;
use crate::scan::{Enumeration, NetworkProber, PortScanner, ServiceTable, SubdomainEnumerator};
use crate::scanner::Prober;
use crate::target::Target;
use crate::types::{OpenPortMap, ScanResult};
use chrono::Utc;
use eyre::Result;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconMode {
    #[default]
    Full,
    SubdomainsOnly,
    PortsOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconPhase {
    Idle,
    Enumerating,
    Scanning,
    Done,
}

/// What to look at. At least one of `domain`/`host` is expected to be set;
/// the CLI validates that before a request is built.
#[derive(Debug, Clone, Default)]
pub struct ReconRequest {
    pub domain: Option<Target>,
    pub host: Option<Target>,
    /// Falls back to the configured wordlist
    pub wordlist: Option<Vec<String>>,
    /// Falls back to the configured port list
    pub ports: Option<Vec<u16>>,
    pub mode: ReconMode,
}

/// Runs subdomain enumeration, then port scans the host and every
/// discovered subdomain, and folds both into one `ScanResult`.
pub struct Recon {
    config: ReconConfig,
    prober: Arc<dyn Prober>,
    services: Arc<ServiceTable>,
    cancel: CancellationToken,
}

impl Recon {
    pub fn new(config: ReconConfig, prober: Arc<dyn Prober>, services: Arc<ServiceTable>) -> Self {
        Self {
            config,
            prober,
            services,
            cancel: CancellationToken::new(),
        }
    }

    /// Network prober plus the host's service table
    pub fn from_config(config: ReconConfig) -> Result<Self> {
        let prober = NetworkProber::new(&config)?;
        Ok(Self::new(config, Arc::new(prober), Arc::new(ServiceTable::system())))
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Cancelling this token stops the run at the next checkpoint
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run(&self, request: &ReconRequest) -> ScanResult {
        let started_at = Utc::now();
        let mut phase = ReconPhase::Idle;
        log::info!("[recon] run: domain={:?} host={:?} mode={:?}",
            request.domain.as_ref().map(Target::as_str),
            request.host.as_ref().map(Target::as_str),
            request.mode);

        let mut enumeration = Enumeration::default();
        if let Some(domain) = request.domain.as_ref().filter(|_| request.mode != ReconMode::PortsOnly) {
            if self.interrupted(phase) {
                return self.finish(request, enumeration, BTreeMap::new(), true, started_at);
            }
            phase = transition(phase, ReconPhase::Enumerating);

            let wordlist = request.wordlist.as_deref().unwrap_or(&self.config.wordlist);
            let enumerator = SubdomainEnumerator::new(Arc::clone(&self.prober))
                .with_status_ceiling(self.config.status_ceiling)
                .with_cancellation(self.cancel.clone());
            enumeration = enumerator.enumerate(domain, wordlist).await;
        }
        let mut interrupted = enumeration.interrupted;

        let mut ports = BTreeMap::new();
        if request.mode != ReconMode::SubdomainsOnly && !interrupted {
            let targets = scan_targets(request.host.as_ref(), &enumeration.discovered);
            if !targets.is_empty() {
                if self.interrupted(phase) {
                    interrupted = true;
                } else {
                    phase = transition(phase, ReconPhase::Scanning);
                    let (scanned, cut_short) = self.scan_all(&targets, request.ports.as_deref()).await;
                    ports = scanned;
                    interrupted = cut_short;
                }
            }
        }

        transition(phase, ReconPhase::Done);
        self.finish(request, enumeration, ports, interrupted, started_at)
    }

    /// Scans each target in turn. The flag is set when cancellation cut the pass short.
    async fn scan_all(&self, targets: &[String], ports: Option<&[u16]>) -> (BTreeMap<String, OpenPortMap>, bool) {
        let port_list = ports.unwrap_or(&self.config.ports);
        let scanner = PortScanner::new(Arc::clone(&self.prober), Arc::clone(&self.services))
            .with_concurrency(self.config.max_workers)
            .with_cancellation(self.cancel.clone());

        let mut results = BTreeMap::new();
        for (index, target) in targets.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::warn!("[recon] scan_cancelled: scanned={} remaining={}", index, targets.len() - index);
                return (results, true);
            }

            log::info!("[recon] scanning: target={} ({}/{})", target, index + 1, targets.len());
            let report = scanner.scan_report(target, port_list).await;
            if report.total_failure() {
                log::warn!("[recon] target_unreachable: target={} errored={} - recording no open ports",
                    report.target, report.errored);
            }
            let skipped = report.skipped > 0;
            results.insert(report.target, report.open_ports);
            if skipped {
                return (results, true);
            }
        }
        (results, false)
    }

    fn interrupted(&self, phase: ReconPhase) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            log::warn!("[recon] interrupted: phase={:?}", phase);
        }
        cancelled
    }

    fn finish(
        &self,
        request: &ReconRequest,
        enumeration: Enumeration,
        ports: BTreeMap<String, OpenPortMap>,
        interrupted: bool,
        started_at: chrono::DateTime<Utc>,
    ) -> ScanResult {
        let finished_at = Utc::now();
        let result = ScanResult::new(
            request.domain.as_ref().map(|t| t.as_str().to_string()),
            request.host.as_ref().map(|t| t.as_str().to_string()),
            enumeration.discovered,
            enumeration.timed_out,
            ports,
            started_at,
            finished_at,
            interrupted,
        );
        debug_assert!(result.targets_are_known());

        log::info!("[recon] completed: duration={:.2}s subdomains={} targets={} open_ports={} interrupted={}",
            result.duration().as_secs_f64(), result.subdomains().len(), result.ports().len(),
            result.total_open_ports(), result.interrupted());
        result
    }
}

fn transition(from: ReconPhase, to: ReconPhase) -> ReconPhase {
    log::debug!("[recon] phase: {:?} -> {:?}", from, to);
    to
}

/// Explicit host first, then discovered subdomains. Hostnames are
/// case-insensitive, so the first spelling seen wins.
fn scan_targets(host: Option<&Target>, discovered: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    host.map(|h| h.as_str().to_string())
        .into_iter()
        .chain(discovered.iter().cloned())
        .filter(|target| seen.insert(target.to_ascii_lowercase()))
        .collect()
}
