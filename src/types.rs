use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

/// Open port -> service name for one target
pub type OpenPortMap = BTreeMap<u16, String>;

/// Aggregate output of one orchestrated run. Built once, read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    domain: Option<String>,
    host: Option<String>,
    subdomains: Vec<String>,
    timed_out: Vec<String>,
    ports: BTreeMap<String, OpenPortMap>,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    duration_secs: f64,
    interrupted: bool,
}

impl ScanResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        domain: Option<String>,
        host: Option<String>,
        subdomains: Vec<String>,
        timed_out: Vec<String>,
        ports: BTreeMap<String, OpenPortMap>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        interrupted: bool,
    ) -> Self {
        let duration_secs = (finished_at - started_at)
            .to_std()
            .unwrap_or_default()
            .as_secs_f64();

        Self {
            domain,
            host,
            subdomains,
            timed_out,
            ports,
            started_at,
            finished_at,
            duration_secs,
            interrupted,
        }
    }

    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Live subdomains in wordlist order
    pub fn subdomains(&self) -> &[String] {
        &self.subdomains
    }

    /// Candidates whose HTTP probe timed out
    pub fn timed_out(&self) -> &[String] {
        &self.timed_out
    }

    pub fn ports(&self) -> &BTreeMap<String, OpenPortMap> {
        &self.ports
    }

    pub fn open_ports(&self, target: &str) -> Option<&OpenPortMap> {
        self.ports.get(target)
    }

    pub fn total_open_ports(&self) -> usize {
        self.ports.values().map(|ports| ports.len()).sum()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs)
    }

    pub fn interrupted(&self) -> bool {
        self.interrupted
    }

    /// Every scanned target is the explicit host or a discovered subdomain
    pub fn targets_are_known(&self) -> bool {
        self.ports.keys().all(|target| {
            self.host.as_deref() == Some(target.as_str()) || self.subdomains.contains(target)
        })
    }
}

/// Per-target port scan accounting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortScanReport {
    pub target: String,
    pub open_ports: OpenPortMap,
    /// Actively refused
    pub closed: usize,
    /// Timed out, possibly filtered
    pub filtered: usize,
    pub errored: usize,
    /// Never probed because the scan was cancelled
    pub skipped: usize,
    pub scan_duration: Duration,
}

impl PortScanReport {
    pub fn probed(&self) -> usize {
        self.open_ports.len() + self.closed + self.filtered + self.errored
    }

    /// Every probe that ran ended in an error (e.g. the name never resolved)
    pub fn total_failure(&self) -> bool {
        self.probed() > 0 && self.errored == self.probed()
    }
}
