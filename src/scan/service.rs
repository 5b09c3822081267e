use eyre::{Result, WrapErr};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const UNKNOWN_SERVICE: &str = "unknown";
const SYSTEM_SERVICES_PATH: &str = "/etc/services";

/// Best-effort port -> service name lookup for TCP ports.
#[derive(Debug, Clone, Default)]
pub struct ServiceTable {
    names: HashMap<u16, String>,
}

impl ServiceTable {
    /// Host table when readable, otherwise the built-in names
    pub fn system() -> Self {
        match Self::from_file(SYSTEM_SERVICES_PATH) {
            Ok(table) if !table.is_empty() => {
                log::debug!("[scan::service] system: loaded {} tcp entries from {}",
                    table.len(), SYSTEM_SERVICES_PATH);
                table
            }
            Ok(_) => {
                log::debug!("[scan::service] system: {} has no tcp entries, using built-in table",
                    SYSTEM_SERVICES_PATH);
                Self::builtin()
            }
            Err(e) => {
                log::debug!("[scan::service] system: falling back to built-in table: {:#}", e);
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        let names = [
            (21, "ftp"),
            (22, "ssh"),
            (23, "telnet"),
            (25, "smtp"),
            (53, "domain"),
            (80, "http"),
            (110, "pop3"),
            (139, "netbios-ssn"),
            (143, "imap"),
            (443, "https"),
            (445, "microsoft-ds"),
            (993, "imaps"),
            (995, "pop3s"),
            (3306, "mysql"),
            (3389, "ms-wbt-server"),
            (5432, "postgresql"),
            (6379, "redis"),
            (8080, "http-alt"),
            (27017, "mongodb"),
        ]
        .into_iter()
        .map(|(port, name)| (port, name.to_string()))
        .collect();

        Self { names }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read services table {}", path.display()))?;
        Ok(Self::parse(&content))
    }

    /// Parse `services(5)` format, keeping the first tcp name per port
    pub fn parse(content: &str) -> Self {
        let mut names = HashMap::new();

        for line in content.lines() {
            let line = line.split('#').next().unwrap_or("").trim();
            let mut fields = line.split_whitespace();
            let (Some(name), Some(port_proto)) = (fields.next(), fields.next()) else {
                continue;
            };
            let Some((port, proto)) = port_proto.split_once('/') else {
                continue;
            };
            if proto != "tcp" {
                continue;
            }
            if let Ok(port) = port.parse::<u16>() {
                names.entry(port).or_insert_with(|| name.to_string());
            }
        }

        Self { names }
    }

    pub fn lookup(&self, port: u16) -> String {
        self.names
            .get(&port)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_SERVICE.to_string())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
# Network services, Internet style
tcpmux          1/tcp                           # TCP port service multiplexer
ssh             22/tcp                          # SSH Remote Login Protocol
domain          53/tcp                          # Domain Name Server
domain          53/udp
http            80/tcp          www             # WorldWideWeb HTTP
snmp            161/udp
";

    #[test]
    fn test_parse_services() {
        let table = ServiceTable::parse(SAMPLE);
        assert_eq!(table.lookup(22), "ssh");
        assert_eq!(table.lookup(53), "domain");
        assert_eq!(table.lookup(80), "http");
        assert_eq!(table.lookup(161), UNKNOWN_SERVICE);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_builtin_lookup() {
        let table = ServiceTable::builtin();
        assert_eq!(table.lookup(22), "ssh");
        assert_eq!(table.lookup(443), "https");
        assert_eq!(table.lookup(12345), "unknown");
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let table = ServiceTable::from_file(file.path()).unwrap();
        assert_eq!(table.lookup(1), "tcpmux");
    }

    #[test]
    fn test_from_missing_file() {
        assert!(ServiceTable::from_file("/nonexistent/services").is_err());
    }

    #[test]
    fn test_system_table_never_empty() {
        let table = ServiceTable::system();
        assert!(!table.is_empty());
        assert!(!table.lookup(22).is_empty());
    }
}
