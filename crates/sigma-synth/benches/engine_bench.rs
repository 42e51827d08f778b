//! Criterion benchmarks for the sigma-synth sample pump
//!
//! Run with: cargo bench -p sigma-synth

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use sigma_config::{ConfigParams, FACTORY_PRESETS, OSC_COUNT, PatchParams, VibratoMode};
use sigma_core::{FIXED_MAX_LEVEL, FIXED_ONE, Fixed};
use sigma_synth::{
    EngineOptions, EnvelopeGenerator, OscillatorBank, Reverb, SynthEngine, hz_to_phase_step,
};

const SAMPLE_RATE: u32 = 32_000;
const BLOCK_SIZES: &[usize] = &[32, 128, 512];

fn bench_engine_presets(c: &mut Criterion) {
    let mut group = c.benchmark_group("SynthEngine");
    let config = ConfigParams {
        vibrato_ctrl_mode: VibratoMode::Automatic,
        ..ConfigParams::DEFAULT
    };

    for preset in FACTORY_PRESETS.iter().take(4) {
        for &block_size in BLOCK_SIZES {
            let mut engine =
                SynthEngine::new(SAMPLE_RATE, &config, preset, EngineOptions::default());
            engine.note_on(60, 100);

            group.bench_with_input(
                BenchmarkId::new(preset.name.as_str(), block_size),
                &block_size,
                |b, &size| {
                    b.iter(|| {
                        let mut acc = Fixed::ZERO;
                        for _ in 0..size {
                            acc = acc.saturating_add(engine.process());
                        }
                        black_box(acc)
                    })
                },
            );
        }
    }

    group.finish();
}

fn bench_components(c: &mut Criterion) {
    let mut group = c.benchmark_group("Components");

    group.bench_function("OscillatorBank/6", |b| {
        let mut bank = OscillatorBank::new(SAMPLE_RATE);
        bank.set_pitch(hz_to_phase_step(220.0, SAMPLE_RATE), &PatchParams::INIT, 0);
        let amplitude = [FIXED_MAX_LEVEL; OSC_COUNT];
        b.iter(|| black_box(bank.advance(black_box(FIXED_ONE), &amplitude)))
    });

    group.bench_function("EnvelopeGenerator", |b| {
        let mut env = EnvelopeGenerator::new(SAMPLE_RATE);
        env.trigger_attack();
        b.iter(|| black_box(env.advance()))
    });

    group.bench_function("Reverb", |b| {
        let mut reverb = Reverb::new(SAMPLE_RATE);
        reverb.set_mix_pc(30);
        b.iter(|| black_box(reverb.process(black_box(Fixed::from_num(0.25)))))
    });

    group.finish();
}

criterion_group!(benches, bench_engine_presets, bench_components);
criterion_main!(benches);
