use clap::Parser;

use propwatch::Settings;
use propwatch::cli::commands::{demo, init};
use propwatch::cli::{Cli, Commands};
use propwatch::logging;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        eprintln!("Using default configuration.");
        Settings::default()
    });

    logging::init_with_config(&settings.logging);
    tracing::debug!("[cli] settings loaded: {settings:?}");

    match cli.command {
        Commands::Init { force } => init::run_init(force),
        Commands::Config => init::run_config(&settings),
        Commands::Demo(args) => demo::run_demo(&args, settings.dispatch.clone()),
    }
}
