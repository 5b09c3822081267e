use crate::types::ScanResult;
use std::fmt::Write as _;

const MAX_SUBDOMAINS_DISPLAY: usize = 10;
const SEPARATOR_WIDTH: usize = 60;
const TIME_FORMAT: &str = "%H:%M:%S";

pub fn print_results(result: &ScanResult) {
    print!("{}", format_results(result));
}

pub fn format_results(result: &ScanResult) -> String {
    let separator = "=".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "\n{}", separator);
    let _ = writeln!(out, "RESULTS SUMMARY");
    let _ = writeln!(out, "{}", separator);
    if let Some(domain) = result.domain() {
        let _ = writeln!(out, "[*] Domain: {}", domain);
    }
    if let Some(host) = result.host() {
        let _ = writeln!(out, "[*] Host:   {}", host);
    }

    let subdomains = result.subdomains();
    let _ = writeln!(out, "\n📁 SUBDOMAINS: {} found", subdomains.len());
    for subdomain in subdomains.iter().take(MAX_SUBDOMAINS_DISPLAY) {
        let _ = writeln!(out, "   • {}", subdomain);
    }
    if subdomains.len() > MAX_SUBDOMAINS_DISPLAY {
        let _ = writeln!(out, "   ... and {} more", subdomains.len() - MAX_SUBDOMAINS_DISPLAY);
    }
    if !result.timed_out().is_empty() {
        let _ = writeln!(out, "   ⏱  {} timed out: {}", result.timed_out().len(), result.timed_out().join(", "));
    }

    let _ = writeln!(out, "\n🔓 OPEN PORTS:");
    for (target, ports) in result.ports() {
        let _ = writeln!(out, "\n   Target: {}", target);
        if ports.is_empty() {
            let _ = writeln!(out, "     No open ports");
        }
        for (port, service) in ports {
            let _ = writeln!(out, "     Port {:5} → {}", port, service);
        }
    }

    let _ = writeln!(out, "\n{}", separator);
    let _ = writeln!(out, "[*] Recon completed in {:.2} seconds", result.duration().as_secs_f64());
    let _ = writeln!(out, "[*] Started: {}", result.started_at().format(TIME_FORMAT));
    let _ = writeln!(out, "[*] Ended:   {}", result.finished_at().format(TIME_FORMAT));
    if result.interrupted() {
        let _ = writeln!(out, "[!] Scan interrupted by user, results are partial");
    }

    out
}
