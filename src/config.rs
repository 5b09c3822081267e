use std::time::Duration;

pub const DEFAULT_PORTS: &[u16] = &[21, 22, 23, 25, 53, 80, 110, 139, 443, 445, 3389, 8080];
pub const DEFAULT_WORDLIST: &[&str] = &["mail", "ftp", "blog", "api"];
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_TCP_TIMEOUT_SECS: u64 = 2;
pub const DEFAULT_MAX_WORKERS: usize = 50;
/// Candidates answering with a status below this are considered live
pub const DEFAULT_STATUS_CEILING: u16 = 500;
pub const DEFAULT_USER_AGENT: &str = "recon/0.1";

/// Immutable run configuration, built once and handed to each component.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconConfig {
    pub ports: Vec<u16>,
    pub wordlist: Vec<String>,
    pub http_timeout: Duration,
    pub tcp_timeout: Duration,
    pub max_workers: usize,
    pub status_ceiling: u16,
    pub user_agent: String,
}

impl Default for ReconConfig {
    fn default() -> Self {
        Self {
            ports: DEFAULT_PORTS.to_vec(),
            wordlist: DEFAULT_WORDLIST.iter().map(|s| s.to_string()).collect(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            tcp_timeout: Duration::from_secs(DEFAULT_TCP_TIMEOUT_SECS),
            max_workers: DEFAULT_MAX_WORKERS,
            status_ceiling: DEFAULT_STATUS_CEILING,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ReconConfig {
    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    pub fn with_tcp_timeout(mut self, timeout: Duration) -> Self {
        self.tcp_timeout = timeout;
        self
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }

    pub fn with_status_ceiling(mut self, ceiling: u16) -> Self {
        self.status_ceiling = ceiling;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReconConfig::default();
        assert_eq!(config.ports.len(), 12);
        assert_eq!(config.wordlist, vec!["mail", "ftp", "blog", "api"]);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
        assert_eq!(config.tcp_timeout, Duration::from_secs(2));
        assert_eq!(config.max_workers, 50);
        assert_eq!(config.status_ceiling, 500);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ReconConfig::default()
            .with_ports(vec![22, 443])
            .with_tcp_timeout(Duration::from_millis(250))
            .with_max_workers(0)
            .with_status_ceiling(400);

        assert_eq!(config.ports, vec![22, 443]);
        assert_eq!(config.tcp_timeout, Duration::from_millis(250));
        assert_eq!(config.max_workers, 1);
        assert_eq!(config.status_ceiling, 400);
    }
}
