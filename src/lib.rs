pub mod cli;
pub mod config;
pub mod logging;
pub mod pretty;
pub mod recon;
pub mod report;
pub mod scan;
pub mod scanner;
pub mod target;
pub mod types;
pub mod wordlist;

// Re-export key types and functions at the crate root
pub use config::ReconConfig;
pub use logging::{get_log_file_path, init_logging};
pub use recon::{Recon, ReconMode, ReconPhase, ReconRequest};
pub use scan::{NetworkProber, PortScanner, ServiceTable, SubdomainEnumerator};
pub use scanner::{ProbeError, ProbeOutcome, Prober};
pub use target::Target;
pub use types::{OpenPortMap, PortScanReport, ScanResult};
