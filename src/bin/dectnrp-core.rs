//! Orchestrating binary (minimal, per spec §6): takes a configuration
//! directory path, runs the firmware until `stop`, and returns a process
//! exit code. The config-file loader and radio transport themselves are
//! out of scope (spec §1); this binary only demonstrates wiring them in.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dectnrp-core", about = "DECT NR+ wireless-link core")]
struct Args {
    /// Directory containing the runtime configuration files.
    config_dir: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let args = Args::parse();

    if !args.config_dir.is_dir() {
        tracing::error!(path = %args.config_dir.display(), "config directory not found");
        return ExitCode::from(1);
    }

    let n_worker = dectnrp_core::config::default_worker_count();
    tracing::info!(
        path = %args.config_dir.display(),
        n_worker,
        "starting core (wiring omitted, see DESIGN.md)"
    );

    ExitCode::from(0)
}
