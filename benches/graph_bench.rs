//! Criterion benchmarks for the audio graph tick.
//!
//! Measures `update_all` throughput over representative topologies.
//! Each tick moves one 128-sample block through every node, so the
//! real-time budget at 44.1 kHz is about 2.9 ms per tick; these numbers
//! show the scheduling and routing margin on the host, not on target
//! hardware.
//!
//! Run with: `cargo bench -- graph/`
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pico_audio::block::AudioBlockPool;
use pico_audio::graph::AudioGraph;
use pico_audio::nodes::{
    AudioAmplifier, AudioAnalyzePeak, AudioEffectBitcrusher, AudioMixer, AudioSynthWaveform,
    WaveformShape,
};

fn leak_pool(capacity: usize) -> &'static AudioBlockPool {
    Box::leak(Box::new(AudioBlockPool::new(capacity)))
}

/// Oscillator through a chain of `n` amplifiers into a peak meter.
fn make_chain(n: usize) -> AudioGraph {
    let mut g = AudioGraph::new(leak_pool(16));
    let osc = g.add_node(AudioSynthWaveform::new()).unwrap();
    g.node_mut(osc).begin(0.8, 440.0, WaveformShape::Sine);

    let mut prev = g.add_node(AudioAmplifier::new()).unwrap();
    g.connect(osc, 0, prev, 0).unwrap();
    for _ in 1..n {
        let amp = g.add_node(AudioAmplifier::new()).unwrap();
        g.node_mut(amp).gain(0.9);
        g.connect(prev, 0, amp, 0).unwrap();
        prev = amp;
    }
    let peak = g.add_node(AudioAnalyzePeak::new()).unwrap();
    g.connect(prev, 0, peak, 0).unwrap();
    g
}

/// Four detuned oscillators summed on one mixer port, crushed, metered.
/// Exercises fan-in accumulation and the copy-on-write path every tick.
fn make_summing() -> AudioGraph {
    let mut g = AudioGraph::new(leak_pool(16));
    let mixer = g.add_node(AudioMixer::<4>::new()).unwrap();
    for i in 0..4 {
        let osc = g.add_node(AudioSynthWaveform::new()).unwrap();
        g.node_mut(osc)
            .begin(0.2, 220.0 * (i + 1) as f32, WaveformShape::Sawtooth);
        g.connect(osc, 0, mixer, 0).unwrap();
    }
    let crush = g.add_node(AudioEffectBitcrusher::new()).unwrap();
    g.node_mut(crush).bits(8).unwrap();
    let peak = g.add_node(AudioAnalyzePeak::new()).unwrap();
    g.connect(mixer, 0, crush, 0).unwrap();
    g.connect(crush, 0, peak, 0).unwrap();
    g
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/tick");

    for n in [2usize, 8, 24] {
        let mut g = make_chain(n);
        group.bench_function(format!("chain_{n}"), |b| {
            b.iter(|| {
                black_box(g.update_all().unwrap());
            });
        });
    }

    let mut g = make_summing();
    group.bench_function("summing_fan_in", |b| {
        b.iter(|| {
            black_box(g.update_all().unwrap());
        });
    });

    group.finish();
}

fn bench_configure(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/configure");

    // Connection cost is dominated by the topological re-sort.
    group.bench_function("build_chain_24", |b| {
        b.iter(|| black_box(make_chain(24)));
    });

    group.finish();
}

criterion_group!(benches, bench_tick, bench_configure);
criterion_main!(benches);
