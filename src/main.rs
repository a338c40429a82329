//! wavdeck CLI
//!
//! Command-line entry point for the wavdeck player.

use clap::Parser;
use env_logger::Env;
use log::{debug, error};

use wavdeck::cli::{commands, Cli, Commands};
use wavdeck::{PlayerConfig, Result};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level)).init();

    debug!("wavdeck v{}", env!("CARGO_PKG_VERSION"));

    let config = PlayerConfig::load_or_default(cli.config.as_deref())?;

    let result = match cli.command {
        Some(cmd) => handle_command(cmd, &config),
        None => {
            println!("wavdeck v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = &result {
        error!("{} [{}]", e, e.error_code());
        for hint in e.recovery_suggestions() {
            error!("  - {}", hint);
        }
    }
    result
}

fn handle_command(cmd: Commands, config: &PlayerConfig) -> Result<()> {
    match cmd {
        Commands::Gui => commands::gui(config),
        Commands::Play { file, seconds } => commands::play(&file, seconds, config),
        Commands::Info { file } => commands::info(&file),
        Commands::Tone {
            output,
            frequency,
            duration,
            sample_rate,
            channels,
            bits,
        } => commands::tone(&output, frequency, duration, sample_rate, channels, bits),
    }
}
