//! Factory preset commands.
//!
//! Provides commands to list, show and export the factory preset table.

use crate::commands::common::{factory_presets, load_patch, slug};
use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Args)]
pub struct PresetsArgs {
    #[command(subcommand)]
    command: PresetsCommand,
}

#[derive(Subcommand)]
enum PresetsCommand {
    /// List the factory presets
    List,

    /// Show a preset as TOML
    Show {
        /// Preset index, name, or TOML file
        name: String,
    },

    /// Export one preset, or the whole table, to TOML files
    Export {
        /// Preset index or name (all presets when omitted)
        name: Option<String>,

        /// Output file for one preset, or directory for all
        #[arg(short, long, default_value = ".")]
        output: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: PresetsArgs) -> anyhow::Result<()> {
    match args.command {
        PresetsCommand::List => list_presets(),
        PresetsCommand::Show { name } => show_preset(&name),
        PresetsCommand::Export {
            name,
            output,
            force,
        } => export_presets(name.as_deref(), output, force),
    }
}

fn list_presets() -> anyhow::Result<()> {
    println!("Factory Presets:");
    println!("================");
    for (index, preset) in factory_presets() {
        let active = preset
            .mixer_input_step
            .iter()
            .filter(|&&step| step > 0)
            .count();
        println!(
            "  {:2}  {:22}  {:?}, {} oscillator(s)",
            index, preset.name, preset.amp_control_mode, active
        );
    }
    println!();
    Ok(())
}

fn show_preset(name: &str) -> anyhow::Result<()> {
    let resolved = load_patch(name)?;
    match resolved.index {
        Some(index) => println!("# Factory preset {}", index),
        None => println!("# Patch file {}", name),
    }
    print!("{}", resolved.patch.to_toml()?);
    Ok(())
}

fn export_presets(name: Option<&str>, output: PathBuf, force: bool) -> anyhow::Result<()> {
    let targets: Vec<(PathBuf, sigma_config::PatchParams)> = match name {
        Some(name) => {
            let patch = load_patch(name)?.patch;
            let path = if output.is_dir() {
                output.join(format!("{}.toml", slug(patch.name.as_str())))
            } else {
                output
            };
            vec![(path, patch)]
        }
        None => factory_presets()
            .map(|(index, patch)| {
                let file = format!("{:02}_{}.toml", index, slug(patch.name.as_str()));
                (output.join(file), *patch)
            })
            .collect(),
    };

    for (path, patch) in &targets {
        if path.exists() && !force {
            anyhow::bail!(
                "'{}' already exists. Use --force to overwrite.",
                path.display()
            );
        }
        patch.save(path)?;
        println!("Exported '{}' to {}", patch.name, path.display());
    }
    Ok(())
}
