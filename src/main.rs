use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{error, info};

use pocker::config::{self, Config};
use pocker::error::Result;
use pocker::{app, logging};

/// Terminal dashboard for local Docker containers.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Path to the TOML configuration file. Created with defaults if missing.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show stopped containers too (overrides `show_all_containers`).
    #[arg(short, long)]
    all: bool,

    /// Where to write the log file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pocker: {}", e);
            for line in e.help() {
                eprintln!("  {}", line);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(config::default_config_path);
    let mut config = Config::load_or_create(&config_path)?;
    if cli.all {
        config.show_all_containers = true;
    }

    let log_file = cli
        .log_file
        .unwrap_or_else(|| config::data_dir().join("pocker.log"));
    let _guard = logging::init(&log_file, &config.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path.display(),
        "pocker starting"
    );

    // Second signal of either kind while the first is pending kills the process.
    let should_quit = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGTERM] {
        signal_hook::flag::register_conditional_shutdown(signal, 1, Arc::clone(&should_quit))?;
        signal_hook::flag::register(signal, Arc::clone(&should_quit))?;
    }

    let result = app::run(&config, &config_path, should_quit);
    if let Err(ref e) = result {
        error!(error = %e, "pocker exited with error");
    }
    result
}
