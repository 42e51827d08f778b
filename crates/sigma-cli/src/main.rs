//! Sigma CLI - Command-line interface for the sigma synth engine.

mod commands;
mod script;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sigma")]
#[command(author, version, about = "Sigma synth engine CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a note or a MIDI script to a WAV file
    Render(commands::render::RenderArgs),

    /// List, show and export factory presets
    Presets(commands::presets::PresetsArgs),

    /// Inspect, validate and convert patch files
    Patch(commands::patch::PatchArgs),

    /// Inspect and reset an emulated EEPROM image
    Config(commands::config::ConfigArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Presets(args) => commands::presets::run(args),
        Commands::Patch(args) => commands::patch::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
