//! outline-assistant binary entry point.

use std::io::Write;

use clap::Parser;
use outline_assistant::cli::{Cli, execute};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the stderr log subscriber. `RUST_LOG` overrides the level.
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "outline_assistant=debug,info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let output = execute(&cli)?;
    if !output.is_empty() {
        writeln!(std::io::stdout(), "{output}")?;
    }
    Ok(())
}
