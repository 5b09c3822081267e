pub mod port;
pub mod probe;
pub mod service;
pub mod subdomain;

pub use port::PortScanner;
pub use probe::NetworkProber;
pub use service::{ServiceTable, UNKNOWN_SERVICE};
pub use subdomain::{Enumeration, SubdomainEnumerator};
