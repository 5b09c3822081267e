use crate::config::ReconConfig;
use crate::scanner::{HttpProbe, ProbeError, ProbeOutcome, Prober, TcpProbe};
use async_trait::async_trait;
use eyre::{Result, WrapErr};
use reqwest::Client;
use std::error::Error as StdError;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{TcpStream, lookup_host};
use tokio::time::timeout;
use url::Url;

const MAX_REDIRECTS: usize = 10;

/// Real network prober: reqwest for HTTP liveness, tokio for TCP connects.
#[derive(Debug, Clone)]
pub struct NetworkProber {
    client: Client,
    http_timeout: Duration,
    tcp_timeout: Duration,
}

impl NetworkProber {
    pub fn new(config: &ReconConfig) -> Result<Self> {
        log::debug!("[scan::probe] new: http_timeout={}ms tcp_timeout={}ms user_agent={}",
            config.http_timeout.as_millis(), config.tcp_timeout.as_millis(), config.user_agent);

        let client = Client::builder()
            .timeout(config.http_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .wrap_err("Failed to create HTTP client")?;

        Ok(Self {
            client,
            http_timeout: config.http_timeout,
            tcp_timeout: config.tcp_timeout,
        })
    }

    async fn connect(&self, target: &str, port: u16, start: Instant) -> ProbeOutcome<TcpProbe> {
        let addr = match resolve(target, port).await {
            Ok(addr) => addr,
            Err(e) => return ProbeOutcome::OtherError(e),
        };

        match TcpStream::connect(addr).await {
            Ok(_stream) => ProbeOutcome::Success(TcpProbe {
                connect_time: start.elapsed(),
            }),
            Err(e) => classify_io_error(&e),
        }
    }
}

#[async_trait]
impl Prober for NetworkProber {
    async fn probe_http(&self, target: &str) -> ProbeOutcome<HttpProbe> {
        let url = match Url::parse(&format!("http://{}/", target)) {
            Ok(url) => url,
            Err(e) => {
                log::warn!("[scan::probe] invalid_url: target={} error={}", target, e);
                return ProbeOutcome::OtherError(ProbeError::Network(format!("invalid url: {}", e)));
            }
        };

        let start = Instant::now();
        let outcome = match self.client.get(url).send().await {
            Ok(response) => ProbeOutcome::Success(HttpProbe {
                status_code: response.status().as_u16(),
                response_time: start.elapsed(),
            }),
            Err(e) => classify_http_error(&e),
        };

        log::trace!("[scan::probe] probe_http: target={} outcome={} elapsed={}ms bound={}ms",
            target, outcome.kind(), start.elapsed().as_millis(), self.http_timeout.as_millis());
        outcome
    }

    async fn probe_tcp(&self, target: &str, port: u16) -> ProbeOutcome<TcpProbe> {
        let start = Instant::now();
        let outcome = match timeout(self.tcp_timeout, self.connect(target, port, start)).await {
            Ok(outcome) => outcome,
            Err(_) => ProbeOutcome::Timeout,
        };

        log::trace!("[scan::probe] probe_tcp: target={} port={} outcome={} elapsed={}ms",
            target, port, outcome.kind(), start.elapsed().as_millis());
        outcome
    }
}

/// Resolve `target`, preferring an IPv4 address
async fn resolve(target: &str, port: u16) -> Result<SocketAddr, ProbeError> {
    let addrs: Vec<SocketAddr> = lookup_host((target, port))
        .await
        .map_err(|e| ProbeError::Resolution(e.to_string()))?
        .collect();

    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| ProbeError::Resolution(format!("no addresses found for {}", target)))
}

fn classify_io_error<T>(error: &io::Error) -> ProbeOutcome<T> {
    match error.kind() {
        io::ErrorKind::ConnectionRefused => ProbeOutcome::ConnectionRefused,
        io::ErrorKind::TimedOut => ProbeOutcome::Timeout,
        _ => ProbeOutcome::OtherError(ProbeError::Network(error.to_string())),
    }
}

fn classify_http_error<T>(error: &reqwest::Error) -> ProbeOutcome<T> {
    if error.is_timeout() {
        return ProbeOutcome::Timeout;
    }

    // reqwest buries the io::Error a few sources deep
    let mut chain = error.to_string();
    let mut source: Option<&(dyn StdError + 'static)> = error.source();
    while let Some(cause) = source {
        if let Some(io_error) = cause.downcast_ref::<io::Error>() {
            match io_error.kind() {
                io::ErrorKind::ConnectionRefused => return ProbeOutcome::ConnectionRefused,
                io::ErrorKind::TimedOut => return ProbeOutcome::Timeout,
                _ => {}
            }
        }
        chain.push_str(": ");
        chain.push_str(&cause.to_string());
        source = cause.source();
    }

    if is_resolution_failure(&chain) {
        ProbeOutcome::OtherError(ProbeError::Resolution(chain))
    } else {
        ProbeOutcome::OtherError(ProbeError::Network(chain))
    }
}

fn is_resolution_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("dns error")
        || lower.contains("failed to lookup address")
        || lower.contains("name or service not known")
        || lower.contains("no such host")
}
