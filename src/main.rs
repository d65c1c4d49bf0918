//! MV Director - music-video concept wizard
//!
#![doc = "Main entry point for the MV Director command-line application."]

use colored::Colorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mvdirector::cli::Cli;
use mvdirector::commands;
use mvdirector::config::Config;
use mvdirector::error::user_message;

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        tracing::debug!("Command failed: {:#}", e);
        eprintln!("{} {}", "Error:".red().bold(), user_message(&e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> mvdirector::Result<()> {
    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    commands::run(cli, config).await
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "mvdirector=debug"
    } else {
        "mvdirector=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
