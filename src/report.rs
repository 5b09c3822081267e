use crate::types::ScanResult;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use csv::Writer;
use eyre::{Result, WrapErr};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

const RULE_WIDTH: usize = 60;
const SECTION_RULE_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Txt => "txt",
        }
    }
}

pub fn render(result: &ScanResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => render_json(result),
        OutputFormat::Csv => render_csv(result),
        OutputFormat::Txt => Ok(render_text(result)),
    }
}

/// `recon_results_<YYYYmmdd_HHMMSS>`
pub fn default_basename(now: DateTime<Utc>) -> String {
    format!("recon_results_{}", now.format("%Y%m%d_%H%M%S"))
}

/// Writes `<base>.<ext>` and returns the path written. Without a base the
/// file lands in the working directory under [`default_basename`].
pub fn save(result: &ScanResult, base: Option<&Path>, format: OutputFormat) -> Result<PathBuf> {
    let base = match base {
        Some(base) => base.to_path_buf(),
        None => PathBuf::from(default_basename(Utc::now())),
    };
    let mut file_name = base.into_os_string();
    file_name.push(".");
    file_name.push(format.extension());
    let path = PathBuf::from(file_name);

    let content = render(result, format)?;
    fs::write(&path, content).wrap_err_with(|| format!("Failed to write results to {}", path.display()))?;

    log::info!("[report] saved: path={} format={:?}", path.display(), format);
    Ok(path)
}

fn render_json(result: &ScanResult) -> Result<String> {
    serde_json::to_string_pretty(result).wrap_err("Failed to serialize results as JSON")
}

/// Sections are separated by an empty line
fn render_csv(result: &ScanResult) -> Result<String> {
    let subdomains = csv_section(|wtr| {
        wtr.write_record(["SUBDOMAINS FOUND"])?;
        wtr.write_record(["Domain", "URL"])?;
        for subdomain in result.subdomains() {
            let url = format!("http://{}", subdomain);
            wtr.write_record([subdomain.as_str(), url.as_str()])?;
        }
        Ok(())
    })?;

    let ports = csv_section(|wtr| {
        wtr.write_record(["OPEN PORTS"])?;
        wtr.write_record(["Target", "Port", "Service"])?;
        for (target, ports) in result.ports() {
            for (port, service) in ports {
                let port = port.to_string();
                wtr.write_record([target.as_str(), port.as_str(), service.as_str()])?;
            }
        }
        Ok(())
    })?;

    let summary = csv_section(|wtr| {
        let subdomain_count = result.subdomains().len().to_string();
        let target_count = result.ports().len().to_string();
        wtr.write_record(["SUMMARY"])?;
        wtr.write_record(["Subdomains found:", subdomain_count.as_str()])?;
        wtr.write_record(["Targets scanned:", target_count.as_str()])?;
        Ok(())
    })?;

    Ok([subdomains, ports, summary].join("\n"))
}

/// One CSV block. Rows within a section have different widths.
fn csv_section<F>(write: F) -> Result<String>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> csv::Result<()>,
{
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(vec![]);
    write(&mut wtr).wrap_err("Failed to write CSV row")?;

    let data = wtr
        .into_inner()
        .map_err(|e| eyre::eyre!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(data).wrap_err("CSV output was not valid UTF-8")
}

fn render_text(result: &ScanResult) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let section_rule = "-".repeat(SECTION_RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", rule);
    let _ = writeln!(out, "RECONNAISSANCE REPORT");
    if let Some(domain) = result.domain() {
        let _ = writeln!(out, "Domain: {}", domain);
    }
    if let Some(host) = result.host() {
        let _ = writeln!(out, "Host: {}", host);
    }
    let _ = writeln!(out, "{}\n", rule);

    let _ = writeln!(out, "SUBDOMAINS:");
    let _ = writeln!(out, "{}", section_rule);
    if result.subdomains().is_empty() {
        let _ = writeln!(out, "No subdomains found");
    } else {
        for (i, subdomain) in result.subdomains().iter().enumerate() {
            let _ = writeln!(out, "{:3}. {}", i + 1, subdomain);
        }
    }
    if !result.timed_out().is_empty() {
        let _ = writeln!(out, "\nTimed out: {}", result.timed_out().join(", "));
    }

    let _ = writeln!(out, "\n");
    let _ = writeln!(out, "OPEN PORTS:");
    let _ = writeln!(out, "{}", section_rule);
    for (target, ports) in result.ports() {
        let _ = writeln!(out, "\nTarget: {}", target);
        if ports.is_empty() {
            let _ = writeln!(out, "  No open ports found");
        }
        for (port, service) in ports {
            let _ = writeln!(out, "  Port {:5} : {}", port, service);
        }
    }

    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "SUMMARY:");
    let _ = writeln!(out, "Subdomains found: {}", result.subdomains().len());
    let _ = writeln!(out, "Open ports found: {}", result.total_open_ports());
    let _ = writeln!(out, "Duration: {:.2} seconds", result.duration().as_secs_f64());
    if result.interrupted() {
        let _ = writeln!(out, "Scan interrupted: partial results");
    }
    let _ = writeln!(out, "{}", rule);

    out
}
