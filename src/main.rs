use eyre::{Result, WrapErr};
use recon::cli::{self, Cli};
use recon::wordlist::{Wordlist, WordlistSource};
use recon::{Recon, pretty, report};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

const EXIT_INTERRUPTED: u8 = 130;

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging first
    if let Err(e) = recon::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    log::info!("================================================================================");
    log::info!("NEW RECON SESSION STARTING");
    log::info!("================================================================================");

    let cli = cli::parse();

    println!("[*] Starting security reconnaissance tool");
    println!("[*] Note: Only scan targets you own or have permission to test\n");

    let errors = cli.validate();
    if !errors.is_empty() {
        log::warn!("[main] invalid_arguments: count={}", errors.len());
        eprintln!("[!] Argument errors:");
        for error in &errors {
            eprintln!("    • {}", error);
        }
        eprintln!("\n[*] Use --help for usage information");
        return ExitCode::FAILURE;
    }

    let wordlist = match load_wordlist(&cli) {
        Ok(wordlist) => wordlist,
        Err(e) => {
            eprintln!("[!] {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, wordlist).await {
        Ok(code) => code,
        Err(e) => {
            log::error!("[main] unexpected_error: {:#}", e);
            eprintln!("\n[!] Unexpected error: {:?}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_wordlist(cli: &Cli) -> Result<Option<Vec<String>>> {
    if !cli.enumerates() {
        return Ok(None);
    }

    let dir = std::env::current_dir().wrap_err("Failed to read working directory")?;
    let wordlist = Wordlist::resolve(cli.wordlist.as_deref(), &dir)?;
    match &wordlist.source {
        WordlistSource::File(path) => {
            println!("[*] Loaded {} subdomains from: {}", wordlist.labels.len(), path.display())
        }
        WordlistSource::AutoDetected(path) => {
            println!("[*] Auto-detected local wordlist: {} ({} subdomains)", path.display(), wordlist.labels.len())
        }
        WordlistSource::BuiltIn => println!("[*] Using built-in list of {} subdomains", wordlist.labels.len()),
    }
    Ok(Some(wordlist.labels))
}

async fn run(cli: &Cli, wordlist: Option<Vec<String>>) -> Result<ExitCode> {
    let config = cli.to_config()?;
    let request = cli.to_request(wordlist)?;
    let recon = Recon::from_config(config)?;

    tokio::spawn(watch_interrupt(recon.cancellation_token()));

    println!("[*] Recon started at {}", chrono::Local::now().format("%H:%M:%S"));
    println!("{}", "-".repeat(50));

    let result = recon.run(&request).await;

    pretty::print_results(&result);

    if let Some(base) = &cli.output {
        match report::save(&result, base.as_deref(), cli.format) {
            Ok(path) => println!("[*] Results saved to {} ({} format)",
                path.display(), cli.format.extension().to_uppercase()),
            Err(e) => {
                log::error!("[main] save_failed: {:#}", e);
                eprintln!("[!] Failed to save results: {:#}", e);
            }
        }
    }

    if result.interrupted() {
        println!("\n[!] Scan interrupted by user (Ctrl+C)");
        println!("[*] Partial results shown above");
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }

    Ok(ExitCode::SUCCESS)
}

/// First Ctrl+C cancels the run and lets in-flight probes finish; a second one exits immediately
async fn watch_interrupt(cancel: CancellationToken) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("[main] ctrl_c_handler_failed: {}", e);
        return;
    }
    log::warn!("[main] interrupt_received: cancelling scan");
    eprintln!("\n[!] Interrupt received, finishing in-flight probes (Ctrl+C again to abort)");
    cancel.cancel();

    if tokio::signal::ctrl_c().await.is_ok() {
        log::warn!("[main] second_interrupt: aborting");
        std::process::exit(EXIT_INTERRUPTED.into());
    }
}
