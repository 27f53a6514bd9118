//! Multi-shape waveform oscillator using a 32-bit phase accumulator.
//!
//! All shapes share the same accumulator scheme: the top bits of a wrapping
//! `u32` phase select the waveform position, so frequency resolution is
//! uniform and cycle boundaries are exact. Sine uses a 257-entry wavetable
//! with linear interpolation; the geometric shapes are derived directly from
//! the phase word.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};
use crate::dsp::intrinsics::mul_32x32_rshift32;
use crate::dsp::wavetables::SINE_TABLE;
use crate::node::AudioNode;

/// Oscillator output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveformShape {
    Sine,
    Sawtooth,
    SawtoothReverse,
    Square,
    Triangle,
    /// Square with adjustable duty cycle, see
    /// [`pulse_width`](AudioSynthWaveform::pulse_width).
    Pulse,
}

/// Waveform synthesizer. Source node: 0 inputs, 1 output.
///
/// Starts silent; call [`begin`](Self::begin) or the individual setters.
/// While the amplitude is zero no output block is produced (the phase still
/// advances, so raising the amplitude later does not restart the cycle).
///
/// # Example
/// ```ignore
/// let mut osc = AudioSynthWaveform::new();
/// osc.begin(0.8, 440.0, WaveformShape::Sawtooth);
/// ```
pub struct AudioSynthWaveform {
    /// Phase accumulator (wraps naturally at 32 bits = one cycle).
    phase_accumulator: u32,
    /// Phase increment per sample: `freq / AUDIO_SAMPLE_RATE * 2^32`.
    phase_increment: u32,
    /// Output magnitude in Q16.16 format. 0 = silent, 65536 = full scale.
    magnitude: i32,
    /// Phase threshold below which a pulse outputs its high level.
    pulse_threshold: u32,
    shape: WaveformShape,
}

impl AudioSynthWaveform {
    /// Create a new oscillator: sine shape, silent.
    pub const fn new() -> Self {
        AudioSynthWaveform {
            phase_accumulator: 0,
            phase_increment: 0,
            magnitude: 0,
            pulse_threshold: 0x8000_0000, // 50% duty
            shape: WaveformShape::Sine,
        }
    }

    /// Configure amplitude, frequency and shape in one call.
    pub fn begin(&mut self, level: f32, freq: f32, shape: WaveformShape) {
        self.shape = shape;
        self.frequency(freq);
        self.amplitude(level);
    }

    /// Set the oscillator frequency in Hz.
    pub fn frequency(&mut self, hz: f32) {
        let inc = hz * (4_294_967_296.0 / AUDIO_SAMPLE_RATE);
        self.phase_increment = inc as u32;
    }

    /// Set the output amplitude (0.0 = silent, 1.0 = full scale).
    pub fn amplitude(&mut self, level: f32) {
        let clamped = if level < 0.0 {
            0.0
        } else if level > 1.0 {
            1.0
        } else {
            level
        };
        self.magnitude = (clamped * 65536.0) as i32;
    }

    /// Set the waveform shape. Takes effect at the next block.
    pub fn shape(&mut self, shape: WaveformShape) {
        self.shape = shape;
    }

    /// Set the phase offset in degrees (0–360).
    pub fn phase(&mut self, angle: f32) {
        self.phase_accumulator = (angle * (4_294_967_296.0 / 360.0)) as u32;
    }

    /// Set the pulse duty cycle (0.0–1.0). Only affects [`WaveformShape::Pulse`].
    pub fn pulse_width(&mut self, duty: f32) {
        let clamped = if duty < 0.0 {
            0.0
        } else if duty > 1.0 {
            1.0
        } else {
            duty
        };
        self.pulse_threshold = (clamped * 4_294_967_296.0) as u32;
    }

    /// Full-scale 32-bit waveform value for the given phase word.
    fn raw_sample(&self, ph: u32) -> i32 {
        match self.shape {
            WaveformShape::Sine => {
                // Upper 8 bits = table index, bits 8-23 = interpolation weight
                let index = (ph >> 24) as usize;
                let val1 = SINE_TABLE[index] as i32;
                let val2 = SINE_TABLE[index + 1] as i32;
                let scale = ((ph >> 8) & 0xFFFF) as i32;
                val1 * (0x10000 - scale) + val2 * scale
            }
            WaveformShape::Sawtooth => (ph ^ 0x8000_0000) as i32,
            WaveformShape::SawtoothReverse => !((ph ^ 0x8000_0000) as i32),
            WaveformShape::Square => {
                if ph & 0x8000_0000 != 0 {
                    -0x7FFF_FFFF
                } else {
                    0x7FFF_FFFF
                }
            }
            WaveformShape::Triangle => {
                // Quarter-cycle offset so the wave starts at zero rising,
                // matching the sine shape's phase convention.
                let mut tp = ph.wrapping_add(0x4000_0000);
                if tp & 0x8000_0000 != 0 {
                    tp = !tp;
                }
                ((tp << 1) ^ 0x8000_0000) as i32
            }
            WaveformShape::Pulse => {
                if ph < self.pulse_threshold {
                    0x7FFF_FFFF
                } else {
                    -0x7FFF_FFFF
                }
            }
        }
    }
}

impl AudioNode for AudioSynthWaveform {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn update(
        &mut self,
        _inputs: &mut [Option<AudioBlockRef>],
        outputs: &mut [Option<AudioBlockMut>],
    ) {
        if self.magnitude == 0 {
            // Silent: advance phase but emit no block
            self.phase_accumulator = self
                .phase_accumulator
                .wrapping_add(self.phase_increment.wrapping_mul(AUDIO_BLOCK_SAMPLES as u32));
            outputs[0] = None;
            return;
        }

        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => {
                self.phase_accumulator = self
                    .phase_accumulator
                    .wrapping_add(self.phase_increment.wrapping_mul(AUDIO_BLOCK_SAMPLES as u32));
                return;
            }
        };

        let mut ph = self.phase_accumulator;
        let inc = self.phase_increment;
        let mag = self.magnitude;

        for sample in out.iter_mut() {
            *sample = mul_32x32_rshift32(self.raw_sample(ph), mag) as i16;
            ph = ph.wrapping_add(inc);
        }

        self.phase_accumulator = ph;
        outputs[0] = Some(out);
    }
}
