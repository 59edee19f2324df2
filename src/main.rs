use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use dbusdump::{Cli, DumpOptions, run_blocking};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help/version are a successful exit; every usage error is fatal
            // with exit code 1.
            let ok = matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
            let _ = e.print();
            return if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE };
        }
    };

    // Diagnostics go to stderr only; the document owns its output file.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let bus = cli.bus();
    let output = cli.output_path();
    let opts = DumpOptions::default();

    match run_blocking(bus, cli.service.as_deref(), &opts) {
        Ok(doc) => {
            if let Err(e) = doc.write_to(&output, bus) {
                error!(error = %e, "failed to write dump");
                return ExitCode::FAILURE;
            }
            info!(
                services = doc.dump.len(),
                output = %output.display(),
                bus = %bus,
                "dump complete"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "dump failed");
            ExitCode::FAILURE
        }
    }
}
