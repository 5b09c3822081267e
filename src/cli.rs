use crate::config::{
    DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_MAX_WORKERS, DEFAULT_STATUS_CEILING, DEFAULT_TCP_TIMEOUT_SECS, ReconConfig,
};
use crate::recon::{ReconMode, ReconRequest};
use crate::report::OutputFormat;
use crate::target::Target;
use clap::Parser;
use eyre::{Result, WrapErr};
use std::path::PathBuf;
use std::time::Duration;

const MIN_DOMAIN_LEN: usize = 4;

#[derive(Parser, Debug)]
#[command(name = "recon")]
#[command(about = "Subdomain enumeration and port scanning in one pass")]
pub struct Cli {
    /// Target domain for subdomain enumeration (e.g. example.com)
    #[arg(short, long)]
    pub domain: Option<String>,

    /// Target IP or hostname for port scan
    #[arg(short, long)]
    pub target: Option<String>,

    /// Save results to <OUTPUT>.<format> (recon_results_<timestamp> when no name is given)
    #[arg(short, long, num_args = 0..=1, value_name = "OUTPUT")]
    pub output: Option<Option<PathBuf>>,

    /// Output format for --output
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Only run subdomain enumeration
    #[arg(long)]
    pub subdomains_only: bool,

    /// Only run port scanning
    #[arg(long)]
    pub ports_only: bool,

    /// Path to subdomain wordlist file (one label per line)
    #[arg(short, long)]
    pub wordlist: Option<PathBuf>,

    /// Ports to scan, e.g. 22,80,8000-8010
    #[arg(short, long)]
    pub ports: Option<String>,

    /// Maximum concurrent port probes per target
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    pub workers: usize,

    /// HTTP probe timeout in seconds
    #[arg(long, default_value_t = DEFAULT_HTTP_TIMEOUT_SECS)]
    pub http_timeout: u64,

    /// TCP connect timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TCP_TIMEOUT_SECS)]
    pub tcp_timeout: u64,

    /// Subdomains answering below this HTTP status count as live
    #[arg(long, default_value_t = DEFAULT_STATUS_CEILING)]
    pub status_ceiling: u16,
}

pub fn parse() -> Cli {
    Cli::parse()
}

impl Cli {
    /// Every problem with the arguments, empty when they make sense
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.domain.is_none() && self.target.is_none() {
            errors.push("Must specify either --domain or --target (or both)".to_string());
        }

        if let Some(domain) = &self.domain {
            if domain.trim().len() < MIN_DOMAIN_LEN {
                errors.push(format!("Domain '{}' seems too short", domain));
            }
            match Target::parse(domain) {
                Ok(target) if !target.is_domain() => {
                    errors.push(format!("Domain '{}' is an IP address; use --target to scan it", domain));
                }
                Ok(_) => {}
                Err(e) => errors.push(e.to_string()),
            }
        }

        if let Some(target) = &self.target {
            if let Err(e) = Target::parse(target) {
                errors.push(e.to_string());
            }
        }

        if self.subdomains_only && self.ports_only {
            errors.push("Cannot use both --subdomains-only and --ports-only".to_string());
        }
        if self.ports_only && self.target.is_none() {
            errors.push("--ports-only requires --target".to_string());
        }

        if let Some(ports) = &self.ports {
            if let Err(e) = parse_ports(ports) {
                errors.push(format!("{:#}", e));
            }
        }
        if self.workers == 0 {
            errors.push("--workers must be at least 1".to_string());
        }
        if self.http_timeout == 0 || self.tcp_timeout == 0 {
            errors.push("Timeouts must be at least 1 second".to_string());
        }

        errors
    }

    pub fn mode(&self) -> ReconMode {
        if self.subdomains_only {
            ReconMode::SubdomainsOnly
        } else if self.ports_only {
            ReconMode::PortsOnly
        } else {
            ReconMode::Full
        }
    }

    /// Whether a wordlist is needed at all
    pub fn enumerates(&self) -> bool {
        self.domain.is_some() && self.mode() != ReconMode::PortsOnly
    }

    pub fn to_config(&self) -> Result<ReconConfig> {
        let mut config = ReconConfig::default()
            .with_max_workers(self.workers)
            .with_http_timeout(Duration::from_secs(self.http_timeout))
            .with_tcp_timeout(Duration::from_secs(self.tcp_timeout))
            .with_status_ceiling(self.status_ceiling);

        if let Some(ports) = &self.ports {
            config = config.with_ports(parse_ports(ports)?);
        }
        Ok(config)
    }

    pub fn to_request(&self, wordlist: Option<Vec<String>>) -> Result<ReconRequest> {
        let domain = self.domain.as_deref().map(Target::parse).transpose()?;
        let host = self.target.as_deref().map(Target::parse).transpose()?;

        Ok(ReconRequest {
            domain,
            host,
            wordlist,
            ports: None,
            mode: self.mode(),
        })
    }
}

/// Comma separated ports and inclusive ranges: `22,80,8000-8010`
pub fn parse_ports(list: &str) -> Result<Vec<u16>> {
    let mut ports = Vec::new();

    for part in list.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((start, end)) = part.split_once('-') {
            let start = parse_port(start)?;
            let end = parse_port(end)?;
            if start > end {
                eyre::bail!("Invalid port range '{}': start is greater than end", part);
            }
            ports.extend(start..=end);
        } else {
            ports.push(parse_port(part)?);
        }
    }

    if ports.is_empty() {
        eyre::bail!("Port list '{}' is empty", list);
    }

    ports.sort_unstable();
    ports.dedup();
    Ok(ports)
}

fn parse_port(value: &str) -> Result<u16> {
    let value = value.trim();
    let port = value
        .parse::<u16>()
        .wrap_err_with(|| format!("Invalid port '{}': must be between 1 and 65535", value))?;
    if port == 0 {
        eyre::bail!("Invalid port '0': must be between 1 and 65535");
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("recon").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let cli = cli(&["-d", "example.com"]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.workers, 50);
        assert_eq!(cli.mode(), ReconMode::Full);
        assert!(cli.validate().is_empty());
        assert!(cli.enumerates());
    }

    #[test]
    fn test_requires_a_target() {
        let errors = cli(&[]).validate();
        assert_eq!(errors, vec!["Must specify either --domain or --target (or both)"]);
    }

    #[test]
    fn test_collects_every_error() {
        let errors = cli(&["-d", "a.b", "-t", "http://host", "--subdomains-only", "--ports-only"]).validate();
        assert!(errors.iter().any(|e| e.contains("too short")));
        assert!(errors.iter().any(|e| e.contains("URL scheme")));
        assert!(errors.iter().any(|e| e.contains("Cannot use both")));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_domain_must_not_be_ip() {
        let errors = cli(&["-d", "192.168.1.10"]).validate();
        assert_eq!(errors, vec!["Domain '192.168.1.10' is an IP address; use --target to scan it"]);

        assert!(cli(&["-d", "example.com", "-t", "192.168.1.10"]).validate().is_empty());
    }

    #[test]
    fn test_ports_only_requires_target() {
        let errors = cli(&["-d", "example.com", "--ports-only"]).validate();
        assert_eq!(errors, vec!["--ports-only requires --target"]);
    }

    #[test]
    fn test_format_and_output() {
        let cli = cli(&["-t", "10.0.0.1", "-o", "out", "--format", "csv", "--ports-only"]);
        assert_eq!(cli.format, OutputFormat::Csv);
        assert_eq!(cli.output, Some(Some(PathBuf::from("out"))));
        assert_eq!(cli.mode(), ReconMode::PortsOnly);
        assert!(!cli.enumerates());
    }

    #[test]
    fn test_bare_output_flag() {
        let bare = cli(&["-t", "10.0.0.1", "-o"]);
        assert_eq!(bare.output, Some(None));

        let absent = cli(&["-t", "10.0.0.1"]);
        assert_eq!(absent.output, None);
    }

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("80,22, 443").unwrap(), vec![22, 80, 443]);
        assert_eq!(parse_ports("8000-8003,8001").unwrap(), vec![8000, 8001, 8002, 8003]);
        assert!(parse_ports("0").is_err());
        assert!(parse_ports("70000").is_err());
        assert!(parse_ports("90-80").is_err());
        assert!(parse_ports("http").is_err());
        assert!(parse_ports(" , ").is_err());
    }

    #[test]
    fn test_invalid_ports_reported() {
        let errors = cli(&["-t", "host1", "-p", "22,0"]).validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("Invalid port '0'"));
    }

    #[test]
    fn test_to_config_and_request() {
        let cli = cli(&["-d", "example.com", "-t", "host1", "-p", "22,80", "--workers", "8", "--tcp-timeout", "1"]);
        let config = cli.to_config().unwrap();
        assert_eq!(config.ports, vec![22, 80]);
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.tcp_timeout, Duration::from_secs(1));

        let request = cli.to_request(Some(vec!["mail".to_string()])).unwrap();
        assert_eq!(request.domain.unwrap().as_str(), "example.com");
        assert_eq!(request.host.unwrap().as_str(), "host1");
        assert_eq!(request.wordlist, Some(vec!["mail".to_string()]));
        assert_eq!(request.mode, ReconMode::Full);
    }
}
