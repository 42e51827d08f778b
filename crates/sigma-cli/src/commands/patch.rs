//! Patch file commands: inspect, validate, and convert between TOML and
//! the persisted binary layout.

use anyhow::Context;
use clap::{Args, Subcommand};
use sigma_config::{
    OSC_COUNT, PATCH_LAYOUT_SIZE, PatchParams, decode_patch, encode_patch,
};
use std::path::{Path, PathBuf};

use crate::commands::common::load_patch;

#[derive(Args)]
pub struct PatchArgs {
    #[command(subcommand)]
    command: PatchCommand,
}

#[derive(Subcommand)]
enum PatchCommand {
    /// Show a patch in a readable table
    Show {
        /// Preset index, name, or TOML file
        name: String,
    },

    /// Check a TOML patch against the parameter ranges
    Validate {
        /// TOML patch file
        file: PathBuf,
    },

    /// Write a patch in the persisted binary layout
    Encode {
        /// Preset index, name, or TOML file
        name: String,

        /// Output binary file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Read a patch from the persisted binary layout
    Decode {
        /// Binary patch image
        file: PathBuf,

        /// Write the decoded patch to this TOML file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub fn run(args: PatchArgs) -> anyhow::Result<()> {
    match args.command {
        PatchCommand::Show { name } => show_patch(&load_patch(&name)?.patch),
        PatchCommand::Validate { file } => validate_file(&file),
        PatchCommand::Encode { name, output } => encode_file(&name, &output),
        PatchCommand::Decode { file, output } => decode_file(&file, output.as_deref()),
    }
}

fn show_patch(patch: &PatchParams) -> anyhow::Result<()> {
    println!("Patch: {}", patch.name);
    println!("{}", "=".repeat(7 + patch.name.len()));
    println!();

    println!("Oscillators:");
    println!("  #  mult          mod source      detune  step");
    for i in 0..OSC_COUNT {
        println!(
            "  {}  {:12}  {:14}  {:6}  {:4}",
            i + 1,
            format!("{:?}", patch.osc_freq_mult[i]),
            format!("{:?}", patch.osc_ampld_mod_source[i]),
            patch.osc_detune[i],
            patch.mixer_input_step[i]
        );
    }
    println!();

    println!(
        "ENV1:     attack {} hold {} decay {} sustain {} release {}",
        patch.env_attack_time,
        patch.env_hold_time,
        patch.env_decay_time,
        patch.env_sustain_level,
        patch.env_release_time
    );
    println!(
        "Contour:  start {} delay {} ramp {} hold {}",
        patch.contour_start_level,
        patch.contour_delay_time,
        patch.contour_ramp_time,
        patch.contour_hold_level
    );
    println!(
        "ENV2:     decay {} sustain {}",
        patch.env2_decay_time, patch.env2_sustain_level
    );
    println!(
        "LFO:      {:.1} Hz, ramp {}, FM {} cents, AM {}",
        f32::from(patch.lfo_freq_x10) / 10.0,
        patch.lfo_ramp_time,
        patch.lfo_fm_depth,
        patch.lfo_am_depth
    );
    println!(
        "Mixer:    gain {:.1}, limiter {}%, amplitude {:?}",
        f32::from(patch.mixer_out_gain_x10) / 10.0,
        patch.limiter_level_pc,
        patch.amp_control_mode
    );
    Ok(())
}

fn validate_file(file: &Path) -> anyhow::Result<()> {
    let patch = PatchParams::load(file)
        .with_context(|| format!("'{}' is not a valid patch", file.display()))?;
    println!("{}: OK ({})", file.display(), patch.name);
    Ok(())
}

fn encode_file(name: &str, output: &Path) -> anyhow::Result<()> {
    let patch = load_patch(name)?.patch;
    let image = encode_patch(&patch);
    std::fs::write(output, image)
        .with_context(|| format!("failed to write '{}'", output.display()))?;
    println!(
        "Encoded '{}' to {} ({} bytes)",
        patch.name,
        output.display(),
        PATCH_LAYOUT_SIZE
    );
    Ok(())
}

fn decode_file(file: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let image =
        std::fs::read(file).with_context(|| format!("failed to read '{}'", file.display()))?;
    let patch = decode_patch(&image)
        .with_context(|| format!("'{}' is not a patch image", file.display()))?;
    match output {
        Some(path) => {
            patch.save(path)?;
            println!("Decoded '{}' to {}", patch.name, path.display());
        }
        None => print!("{}", patch.to_toml()?),
    }
    Ok(())
}
