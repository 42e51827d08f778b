//! Offline rendering through the full MIDI control path.

use crate::commands::common::{load_patch, parse_note};
use crate::script::{ScriptEvent, parse_script};
use anyhow::Context;
use clap::{Args, ValueEnum};
use sigma_config::{
    CONFIG_STORAGE_OFFSET, ConfigParams, ConfigStorage, FileStorage, MemoryStorage, encode_config,
};
use sigma_io::WavOutput;
use sigma_platform::{ControllerSetup, MidiMode, SynthController};
use sigma_synth::{DEFAULT_SAMPLE_RATE, EngineOptions, LfoWaveform, ResponseCurve};
use std::path::PathBuf;

/// Response curves for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliCurve {
    #[default]
    Linear,
    Exponential,
}

impl From<CliCurve> for ResponseCurve {
    fn from(c: CliCurve) -> Self {
        match c {
            CliCurve::Linear => ResponseCurve::Linear,
            CliCurve::Exponential => ResponseCurve::Exponential,
        }
    }
}

/// LFO shapes for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliLfo {
    #[default]
    Triangle,
    Sine,
}

impl From<CliLfo> for LfoWaveform {
    fn from(w: CliLfo) -> Self {
        match w {
            CliLfo::Triangle => LfoWaveform::Triangle,
            CliLfo::Sine => LfoWaveform::Sine,
        }
    }
}

/// MIDI modes for CLI
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum CliMode {
    OmniOnPoly,
    #[default]
    OmniOnMono,
    OmniOffPoly,
    OmniOffMono,
}

impl From<CliMode> for MidiMode {
    fn from(m: CliMode) -> Self {
        match m {
            CliMode::OmniOnPoly => MidiMode::OmniOnPoly,
            CliMode::OmniOnMono => MidiMode::OmniOnMono,
            CliMode::OmniOffPoly => MidiMode::OmniOffPoly,
            CliMode::OmniOffMono => MidiMode::OmniOffMono,
        }
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Output WAV file
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Preset index, factory name, or TOML patch file
    #[arg(short, long)]
    preset: Option<String>,

    /// Note to play (MIDI number or name such as C4)
    #[arg(short, long, default_value = "60", value_parser = parse_note)]
    note: u8,

    /// Note-on velocity (1-127)
    #[arg(long, default_value = "100", value_parser = clap::value_parser!(u8).range(1..=127))]
    velocity: u8,

    /// Time the note is held, in seconds
    #[arg(short, long, default_value = "1.0")]
    duration: f32,

    /// Time rendered after the last event, in seconds
    #[arg(long, default_value = "1.0")]
    tail: f32,

    /// MIDI script to play instead of a single note
    #[arg(short, long, conflicts_with = "note")]
    script: Option<PathBuf>,

    /// Engine tick rate in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Configuration TOML (ignored when --eeprom is given)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// EEPROM image to start from; stores requested during the render are written back
    #[arg(long)]
    eeprom: Option<PathBuf>,

    /// MIDI receive channel (1-16)
    #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=16))]
    channel: u8,

    /// MIDI receive mode
    #[arg(long, value_enum, default_value_t = CliMode::default())]
    mode: CliMode,

    /// Velocity response curve
    #[arg(long, value_enum, default_value_t = CliCurve::default())]
    velocity_curve: CliCurve,

    /// Expression response curve
    #[arg(long, value_enum, default_value_t = CliCurve::default())]
    expression_curve: CliCurve,

    /// Legato on overlapping notes without the footswitch
    #[arg(long)]
    legato: bool,

    /// Vibrato/tremolo LFO shape
    #[arg(long, value_enum, default_value_t = CliLfo::default())]
    lfo_waveform: CliLfo,
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    if !(args.duration >= 0.0 && args.tail >= 0.0) {
        anyhow::bail!("--duration and --tail must be non-negative");
    }

    let events = match &args.script {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read script '{}'", path.display()))?;
            parse_script(&text)?
        }
        None => note_events(&args),
    };

    let setup = ControllerSetup {
        sample_rate: args.sample_rate,
        channel: args.channel,
        mode: args.mode.into(),
        engine: EngineOptions {
            velocity_curve: args.velocity_curve.into(),
            expression_curve: args.expression_curve.into(),
            legato_always: args.legato,
            lfo_waveform: args.lfo_waveform.into(),
        },
    };

    let out = match &args.eeprom {
        Some(path) => {
            let storage = FileStorage::new(path);
            render(storage, setup, &args, &events)?
        }
        None => {
            let config = match &args.config {
                Some(path) => ConfigParams::load(path)?,
                None => ConfigParams::DEFAULT,
            };
            let mut storage = MemoryStorage::<256>::new();
            storage.write(CONFIG_STORAGE_OFFSET, &encode_config(&config))?;
            render(storage, setup, &args, &events)?
        }
    };

    out.write(&args.output)?;
    println!(
        "Rendered {:.2}s at {} Hz to {} (peak {:.3})",
        out.duration_secs(),
        out.sample_rate(),
        args.output.display(),
        out.peak()
    );
    Ok(())
}

/// Note on at zero, note off after the hold time, on the receive channel.
fn note_events(args: &RenderArgs) -> Vec<ScriptEvent> {
    let status = args.channel - 1;
    let hold_ms = (args.duration * 1000.0).round() as u32;
    vec![
        ScriptEvent {
            time_ms: 0,
            bytes: vec![0x90 | status, args.note, args.velocity],
        },
        ScriptEvent {
            time_ms: hold_ms,
            bytes: vec![0x80 | status, args.note, 0],
        },
    ]
}

fn render<S: ConfigStorage>(
    storage: S,
    setup: ControllerSetup,
    args: &RenderArgs,
    events: &[ScriptEvent],
) -> anyhow::Result<WavOutput> {
    let sample_rate = setup.sample_rate;
    let last = events.last().map_or(0, |e| e.sample_at(sample_rate));
    let total = last + (f64::from(args.tail) * f64::from(sample_rate)) as u64;

    let mut out = WavOutput::with_capacity(total as usize);
    let mut synth = SynthController::new(storage, setup, &mut out);
    if synth.settings().is_eeprom_faulty() {
        tracing::warn!("no usable stored configuration, rendering with defaults");
    }

    let patch_name = match &args.preset {
        Some(name) => {
            let resolved = load_patch(name)?;
            match resolved.index {
                Some(index) => synth.preset_select(index)?,
                None => synth.engine_mut().staged_patch_mut().stage(&resolved.patch),
            }
            resolved.patch.name
        }
        None => synth.engine().active_patch().name,
    };
    tracing::info!(
        preset = %patch_name,
        events = events.len(),
        samples = total,
        "rendering"
    );

    let mut pending = events.iter().peekable();
    for n in 0..total {
        while let Some(event) = pending.next_if(|e| e.sample_at(sample_rate) <= n) {
            let handled = synth.midi_input_service(&mut event.bytes.iter().copied());
            tracing::debug!(time_ms = event.time_ms, handled, "script event");
        }
        synth.tick(&mut out);
    }

    if synth.service_storage()? {
        tracing::info!("configuration stored");
    }
    Ok(out)
}
