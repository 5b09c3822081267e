use eyre::Result;
use std::fmt;
use std::net::IpAddr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    pub original: String,
    pub target_type: TargetType,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetType {
    Domain(String),
    IpAddress(IpAddr),
}

impl Target {
    /// Accepts a bare hostname or IP address. URLs are rejected so the same
    /// string can be used both as a probe host and as a report key.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            eyre::bail!("Target must not be empty");
        }
        if input.chars().any(char::is_whitespace) {
            eyre::bail!("Target '{}' contains spaces (invalid)", input);
        }
        if input.contains("://") {
            eyre::bail!("Target '{}' should not include a URL scheme, just hostname or IP", input);
        }

        if let Ok(ip) = input.parse::<IpAddr>() {
            return Ok(Self {
                original: input.to_string(),
                target_type: TargetType::IpAddress(ip),
            });
        }

        Ok(Self {
            original: input.to_string(),
            target_type: TargetType::Domain(input.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.original
    }

    pub fn is_domain(&self) -> bool {
        matches!(self.target_type, TargetType::Domain(_))
    }

    /// `<label>.<domain>`
    pub fn subdomain(&self, label: &str) -> String {
        format!("{}.{}", label, self.original)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_parse_ip_address() {
        let target = Target::parse("192.168.1.1").unwrap();
        assert_eq!(target.target_type, TargetType::IpAddress(IpAddr::V4(Ipv4Addr::new(192, 168, 1, 1))));
        assert!(!target.is_domain());
    }

    #[test]
    fn test_parse_ipv6() {
        let target = Target::parse("2001:db8::1").unwrap();
        assert_eq!(
            target.target_type,
            TargetType::IpAddress(IpAddr::V6(Ipv6Addr::new(0x2001, 0xdb8, 0, 0, 0, 0, 0, 1)))
        );
    }

    #[test]
    fn test_parse_domain() {
        let target = Target::parse(" example.com ").unwrap();
        assert!(target.is_domain());
        assert_eq!(target.as_str(), "example.com");
        assert_eq!(target.subdomain("mail"), "mail.example.com");
    }

    #[test]
    fn test_reject_invalid() {
        assert!(Target::parse("").is_err());
        assert!(Target::parse("   ").is_err());
        assert!(Target::parse("exa mple.com").is_err());
        assert!(Target::parse("http://example.com").is_err());
        assert!(Target::parse("https://example.com").is_err());
    }
}
