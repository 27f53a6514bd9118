//! DSP audio processing nodes.
//!
//! This module contains the built-in audio nodes: synthesizers, effects,
//! filters, and analyzers. Each implements the
//! [`AudioNode`](crate::node::AudioNode) trait.

mod amplifier;
mod analyze_fft;
mod analyze_peak;
mod analyze_rms;
mod effect_bitcrusher;
mod effect_chorus;
mod effect_flange;
mod filter_fir;
mod mixer;
mod synth_dc;
mod synth_noise;
mod synth_waveform;

pub use amplifier::AudioAmplifier;
pub use analyze_fft::{AudioAnalyzeFft1024, FftBuffers, WindowKind, FFT_SIZE};
pub use analyze_peak::AudioAnalyzePeak;
pub use analyze_rms::AudioAnalyzeRms;
pub use effect_bitcrusher::AudioEffectBitcrusher;
pub use effect_chorus::AudioEffectChorus;
pub use effect_flange::AudioEffectFlange;
pub use filter_fir::AudioFilterFir;
pub use mixer::AudioMixer;
pub use synth_dc::AudioSynthWaveformDc;
pub use synth_noise::AudioSynthNoiseWhite;
pub use synth_waveform::{AudioSynthWaveform, WaveformShape};
