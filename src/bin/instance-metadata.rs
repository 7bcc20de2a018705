//! CLI binary for the instance-metadata crate.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use instance_metadata::{MetadataFetcher, Report};
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

/// Log filter used when `RUST_LOG` is unset. Logs go to stderr only.
const DEFAULT_LOG_DIRECTIVES: &str = "warn";

#[derive(Parser)]
#[command(name = "instance-metadata")]
#[command(
    author,
    version,
    about = "Print EC2 instance metadata as JSON, one key or the whole tree"
)]
struct Cli {
    /// Metadata key relative to /latest/meta-data/ (whole tree when omitted)
    key: Option<String>,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVES));
    registry()
        .with(filter)
        .with(fmt::layer().with_writer(io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let report = match MetadataFetcher::new() {
        Ok(fetcher) => Report::from(fetcher.fetch(cli.key.as_deref()).await),
        Err(err) => Report::from(Err(err)),
    };
    if let Report::Failure(message) = &report {
        warn!(key = ?cli.key, "{}", message);
    }

    // Fetch failures are part of the printed report and still exit 0.
    match print_report(&report) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_report(report: &Report) -> Result<(), Box<dyn std::error::Error>> {
    let json = report.to_json_pretty()?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", json)?;
    stdout.flush()?;
    Ok(())
}
