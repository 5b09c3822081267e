use crate::config::DEFAULT_MAX_WORKERS;
use crate::scan::service::ServiceTable;
use crate::scanner::{ProbeOutcome, Prober};
use crate::types::{OpenPortMap, PortScanReport};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq)]
enum PortState {
    Open(String),
    Closed,
    Filtered,
    Errored,
    Skipped,
}

/// TCP connect scanner over a bounded pool of concurrent probes.
pub struct PortScanner {
    prober: Arc<dyn Prober>,
    services: Arc<ServiceTable>,
    max_concurrent: usize,
    cancel: CancellationToken,
}

impl PortScanner {
    pub fn new(prober: Arc<dyn Prober>, services: Arc<ServiceTable>) -> Self {
        log::debug!("[scan::port] new: concurrency={} services={}", DEFAULT_MAX_WORKERS, services.len());
        Self {
            prober,
            services,
            max_concurrent: DEFAULT_MAX_WORKERS,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_concurrency(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Open ports on `target` mapped to their service names
    pub async fn scan(&self, target: &str, ports: &[u16]) -> OpenPortMap {
        self.scan_report(target, ports).await.open_ports
    }

    pub async fn scan_report(&self, target: &str, ports: &[u16]) -> PortScanReport {
        let ports = normalize_ports(ports);
        log::debug!("[scan::port] scan: target={} port_count={} concurrency={} ports={}",
            target, ports.len(), self.max_concurrent,
            if ports.len() <= 10 { format!("{:?}", ports) } else { format!("{:?}...", &ports[..10]) });

        let scan_start = Instant::now();
        let mut report = PortScanReport {
            target: target.to_string(),
            ..Default::default()
        };

        // Completions arrive in any order; the fold into a sorted map makes that irrelevant
        let mut completions = stream::iter(ports)
            .map(|port| self.scan_port(target, port))
            .buffer_unordered(self.max_concurrent);

        while let Some((port, state)) = completions.next().await {
            match state {
                PortState::Open(service) => {
                    report.open_ports.insert(port, service);
                }
                PortState::Closed => report.closed += 1,
                PortState::Filtered => report.filtered += 1,
                PortState::Errored => report.errored += 1,
                PortState::Skipped => report.skipped += 1,
            }
        }

        report.scan_duration = scan_start.elapsed();

        log::info!("[scan::port] scan_completed: target={} duration={}ms open={} closed={} filtered={} errored={} skipped={}",
            target, report.scan_duration.as_millis(), report.open_ports.len(),
            report.closed, report.filtered, report.errored, report.skipped);

        if !report.open_ports.is_empty() {
            let open_port_numbers: Vec<u16> = report.open_ports.keys().copied().collect();
            log::debug!("[scan::port] open_ports_found: target={} ports={:?}", target, open_port_numbers);
        }

        report
    }

    async fn scan_port(&self, target: &str, port: u16) -> (u16, PortState) {
        // In-flight probes run to their timeout; only unstarted ones are skipped
        if self.cancel.is_cancelled() {
            return (port, PortState::Skipped);
        }

        let state = match self.prober.probe_tcp(target, port).await {
            ProbeOutcome::Success(probe) => {
                let service = self.services.lookup(port);
                log::trace!("[scan::port] open: target={} port={} service={} connect_time={}ms",
                    target, port, service, probe.connect_time.as_millis());
                PortState::Open(service)
            }
            ProbeOutcome::ConnectionRefused => PortState::Closed,
            ProbeOutcome::Timeout => PortState::Filtered,
            ProbeOutcome::OtherError(e) => {
                log::debug!("[scan::port] probe_error: target={} port={} error={}", target, port, e);
                PortState::Errored
            }
        };

        (port, state)
    }
}

/// Sorted, de-duplicated, without port 0
fn normalize_ports(ports: &[u16]) -> Vec<u16> {
    let mut ports: Vec<u16> = ports.iter().copied().filter(|&p| p != 0).collect();
    ports.sort_unstable();
    ports.dedup();
    ports
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_PORTS;
    use crate::scanner::testing::StaticProber;
    use crate::scanner::{ProbeError, TcpProbe};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn scanner(prober: impl Prober + 'static) -> PortScanner {
        PortScanner::new(Arc::new(prober), Arc::new(ServiceTable::builtin()))
    }

    #[test]
    fn test_port_scanner_creation() {
        let scanner = scanner(StaticProber::new());
        assert_eq!(scanner.max_concurrent, 50);

        let scanner = scanner.with_concurrency(0);
        assert_eq!(scanner.max_concurrent, 1);
    }

    #[test]
    fn test_normalize_ports() {
        assert_eq!(normalize_ports(&[443, 22, 0, 80, 22]), vec![22, 80, 443]);
    }

    #[tokio::test]
    async fn test_only_successful_ports_reported() {
        let prober = StaticProber::new()
            .open("host1", 22)
            .open("host1", 80)
            .tcp_outcome("host1", 443, ProbeOutcome::Timeout)
            .tcp_outcome("host1", 8080, ProbeOutcome::OtherError(ProbeError::Network("reset".into())));

        let report = scanner(prober).scan_report("host1", DEFAULT_PORTS).await;

        let expected: OpenPortMap = [(22, "ssh".to_string()), (80, "http".to_string())].into_iter().collect();
        assert_eq!(report.open_ports, expected);
        assert_eq!(report.filtered, 1);
        assert_eq!(report.errored, 1);
        assert_eq!(report.closed, DEFAULT_PORTS.len() - 4);
        assert_eq!(report.skipped, 0);
    }

    #[tokio::test]
    async fn test_unknown_service_name() {
        let prober = StaticProber::new().open("host1", 31337);
        let result = scanner(prober).scan("host1", &[31337]).await;

        assert_eq!(result.get(&31337).map(String::as_str), Some("unknown"));
        assert!(result.values().all(|service| !service.is_empty()));
    }

    #[tokio::test]
    async fn test_result_independent_of_worker_count() {
        let ports: Vec<u16> = (1..=40).collect();
        let build = || {
            let mut prober = StaticProber::new().with_delay(Duration::from_millis(2));
            for port in ports.iter().copied().filter(|p| p % 3 == 0) {
                prober = prober.open("target", port);
            }
            for port in ports.iter().copied().filter(|p| p % 7 == 0) {
                prober = prober.tcp_outcome("target", port, ProbeOutcome::Timeout);
            }
            prober
        };

        let sequential = scanner(build()).with_concurrency(1).scan("target", &ports).await;
        let small_pool = scanner(build()).with_concurrency(3).scan("target", &ports).await;
        let wide_pool = scanner(build()).with_concurrency(50).scan("target", &ports).await;

        assert_eq!(sequential, small_pool);
        assert_eq!(sequential, wide_pool);
        // multiples of 3 except 21, which times out
        assert_eq!(sequential.len(), 12);
        assert!(!sequential.contains_key(&21));
    }

    struct InFlightProber {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
    }

    #[async_trait]
    impl Prober for InFlightProber {
        async fn probe_http(&self, _target: &str) -> ProbeOutcome<crate::scanner::HttpProbe> {
            ProbeOutcome::ConnectionRefused
        }

        async fn probe_tcp(&self, _target: &str, _port: u16) -> ProbeOutcome<TcpProbe> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeOutcome::Success(TcpProbe {
                connect_time: Duration::from_millis(10),
            })
        }
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let prober = Arc::new(InFlightProber {
            in_flight: AtomicUsize::new(0),
            max_seen: AtomicUsize::new(0),
        });
        let scanner = PortScanner::new(prober.clone(), Arc::new(ServiceTable::builtin())).with_concurrency(4);

        let ports: Vec<u16> = (1000..1020).collect();
        let result = scanner.scan("target", &ports).await;

        assert_eq!(result.len(), 20);
        let max_seen = prober.max_seen.load(Ordering::SeqCst);
        assert!(max_seen <= 4, "max in flight was {}", max_seen);
        assert!(max_seen > 1);
    }

    #[tokio::test]
    async fn test_cancelled_scan_skips_ports() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let prober = Arc::new(StaticProber::new().open_on_all(22));
        let scanner = PortScanner::new(prober.clone(), Arc::new(ServiceTable::builtin()))
            .with_cancellation(cancel);

        let report = scanner.scan_report("host1", DEFAULT_PORTS).await;

        assert!(report.open_ports.is_empty());
        assert_eq!(report.skipped, DEFAULT_PORTS.len());
        assert!(prober.tcp_calls.lock().unwrap().is_empty());
    }

    struct CancelOnFirstProbe {
        cancel: CancellationToken,
    }

    #[async_trait]
    impl Prober for CancelOnFirstProbe {
        async fn probe_http(&self, _target: &str) -> ProbeOutcome<crate::scanner::HttpProbe> {
            ProbeOutcome::ConnectionRefused
        }

        async fn probe_tcp(&self, _target: &str, _port: u16) -> ProbeOutcome<TcpProbe> {
            self.cancel.cancel();
            ProbeOutcome::Success(TcpProbe {
                connect_time: Duration::from_millis(1),
            })
        }
    }

    #[tokio::test]
    async fn test_cancellation_mid_scan_keeps_partial_results() {
        let cancel = CancellationToken::new();
        let prober = CancelOnFirstProbe { cancel: cancel.clone() };
        let scanner = scanner(prober).with_concurrency(1).with_cancellation(cancel);

        let report = scanner.scan_report("host1", &[22, 80, 443]).await;

        assert_eq!(report.open_ports.keys().copied().collect::<Vec<_>>(), vec![22]);
        assert_eq!(report.skipped, 2);
    }
}
