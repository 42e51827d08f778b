//! Property-based tests for the sigma-synth engine.
//!
//! Randomized patches and performance input must never push the output past
//! the clipping level, and ENV1 must always come back to exactly zero.

use proptest::prelude::*;
use sigma_config::{
    AmpControlMode, AudioAmpldCtrlMode, ConfigParams, OscFreqMult, OscModSource,
    PatchParams, VibratoMode,
};
use sigma_core::{Fixed, MAX_CLIPPING_LEVEL};
use sigma_synth::{
    EngineOptions, EnvPhase, EnvelopeGenerator, LfoWaveform, ResponseCurve, SynthEngine,
};

const RATE: u32 = 32_000;

fn mult() -> impl Strategy<Value = OscFreqMult> {
    prop::sample::select(OscFreqMult::ALL.to_vec())
}

fn source() -> impl Strategy<Value = OscModSource> {
    prop::sample::select(OscModSource::ALL.to_vec())
}

fn amp_mode() -> impl Strategy<Value = AmpControlMode> {
    prop::sample::select(AmpControlMode::ALL.to_vec())
}

prop_compose! {
    fn patch()(
        osc_freq_mult in prop::array::uniform6(mult()),
        osc_ampld_mod_source in prop::array::uniform6(source()),
        osc_detune in prop::array::uniform6(-600i16..=600),
        mixer_input_step in prop::array::uniform6(0u16..=16),
        amp_control_mode in amp_mode(),
        lfo_freq_x10 in 5u16..=250,
        lfo_fm_depth in 0u16..=600,
        lfo_am_depth in 0u16..=100,
        mixer_out_gain_x10 in 0u16..=100,
        limiter_level_pc in 0u16..=100,
    ) -> PatchParams {
        PatchParams {
            osc_freq_mult,
            osc_ampld_mod_source,
            osc_detune,
            mixer_input_step,
            amp_control_mode,
            env_attack_time: 5,
            env_decay_time: 50,
            lfo_freq_x10,
            lfo_ramp_time: 5,
            lfo_fm_depth,
            lfo_am_depth,
            mixer_out_gain_x10,
            limiter_level_pc,
            ..PatchParams::INIT
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Whatever the patch, controllers and notes, no output sample reaches
    /// past MAX_CLIPPING_LEVEL.
    #[test]
    fn output_bounded(
        patch in patch(),
        note in 0u8..=127,
        velocity in 1u8..=127,
        bend in -8192i16..=8191,
        expression in 0u16..=0x3FFF,
        modulation in 0u16..=0x3FFF,
        reverb_mix_pc in 0u8..=100,
        exponential in any::<bool>(),
    ) {
        let config = ConfigParams {
            reverb_mix_pc,
            vibrato_ctrl_mode: VibratoMode::ModulationCc,
            audio_ampld_ctrl_mode: AudioAmpldCtrlMode::ByPatch,
            pitch_bend_range: 12,
            ..ConfigParams::DEFAULT
        };
        let curve = if exponential { ResponseCurve::Exponential } else { ResponseCurve::Linear };
        let options = EngineOptions {
            velocity_curve: curve,
            expression_curve: curve,
            legato_always: false,
            lfo_waveform: if exponential { LfoWaveform::Sine } else { LfoWaveform::Triangle },
        };
        let mut engine = SynthEngine::new(RATE, &config, &patch, options);
        engine.expression(expression);
        engine.modulation(modulation);
        engine.pitch_bend(bend);
        engine.note_on(note, velocity);

        for _ in 0..2048 {
            let sample = engine.process();
            prop_assert!(sample.abs() <= MAX_CLIPPING_LEVEL, "sample {}", sample);
        }
    }

    /// For any ENV1 timing, a trigger followed by a release ends idle at
    /// exactly zero.
    #[test]
    fn envelope_returns_to_zero(
        attack in 0u16..=200,
        hold in 0u16..=50,
        decay in 0u16..=200,
        sustain in 0u16..=100,
        release in 0u16..=200,
        gate_ticks in 0usize..4000,
    ) {
        let mut env = EnvelopeGenerator::new(RATE);
        env.apply_patch(&PatchParams {
            env_attack_time: attack,
            env_hold_time: hold,
            env_decay_time: decay,
            env_sustain_level: sustain,
            env_release_time: release,
            ..PatchParams::INIT
        });
        env.trigger_attack();
        for _ in 0..gate_ticks {
            env.advance();
            if hold == 0 {
                prop_assert_ne!(env.phase(), EnvPhase::PeakHold);
            }
        }
        env.trigger_release();
        let mut ticks = 0;
        while env.phase() != EnvPhase::Idle {
            env.advance();
            ticks += 1;
            prop_assert!(ticks < 50_000, "release never finished");
        }
        prop_assert_eq!(env.level(), Fixed::ZERO);
    }
}
