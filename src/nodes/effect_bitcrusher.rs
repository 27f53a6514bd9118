//! Bitcrusher — bit-depth and sample-rate reduction.
//!
//! Two independent degradations, each settable on its own:
//! quantization to a reduced number of significant bits, and a zero-order
//! hold that repeats each retained sample to emulate a lower sample rate.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};
use crate::error::ConfigError;
use crate::node::AudioNode;

/// Lo-fi quantization effect. One input, one output.
///
/// Defaults pass audio through unchanged (16 bits, native rate). Parameter
/// changes take effect at the start of the next processed block; the hold
/// counter persists across blocks so the reduced rate stays phase-continuous.
///
/// # Example
/// ```ignore
/// let mut crush = AudioEffectBitcrusher::new();
/// crush.bits(8)?;
/// crush.sample_rate(11025.0); // hold each sample for 4 ticks
/// ```
pub struct AudioEffectBitcrusher {
    /// Significant bits kept per sample, 1–16.
    crush_bits: u8,
    /// Output samples per retained input sample (1 = native rate).
    hold: u32,
    /// Samples remaining before the next input sample is retained.
    hold_remaining: u32,
    /// Last retained (and quantized) sample.
    held_sample: i16,
}

impl AudioEffectBitcrusher {
    /// Create a new bitcrusher configured for clean passthrough.
    pub const fn new() -> Self {
        AudioEffectBitcrusher {
            crush_bits: 16,
            hold: 1,
            hold_remaining: 0,
            held_sample: 0,
        }
    }

    /// Set the number of significant bits kept per sample (1–16).
    ///
    /// 16 disables quantization. Values outside the range are rejected.
    pub fn bits(&mut self, bits: u8) -> Result<(), ConfigError> {
        if bits < 1 || bits > 16 {
            return Err(ConfigError::InvalidParameter);
        }
        self.crush_bits = bits;
        Ok(())
    }

    /// Set the emulated sample rate in Hz.
    ///
    /// Each retained input sample is held for `ceil(native / rate)` output
    /// samples. Rates at or above the native rate disable the hold.
    pub fn sample_rate(&mut self, rate: f32) {
        if rate >= AUDIO_SAMPLE_RATE || rate <= 0.0 {
            self.hold = 1;
        } else {
            self.hold = libm::ceilf(AUDIO_SAMPLE_RATE / rate) as u32;
        }
        self.hold_remaining = 0;
    }

    /// Quantize a sample to `crush_bits` significant bits.
    ///
    /// Arithmetic shift right/left clears the low bits while preserving the
    /// sign, so quantization steps line up across zero.
    #[inline(always)]
    fn crush(&self, sample: i16) -> i16 {
        let discard = 16 - self.crush_bits as u32;
        (sample >> discard) << discard
    }
}

impl AudioNode for AudioEffectBitcrusher {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn update(
        &mut self,
        inputs: &mut [Option<AudioBlockRef>],
        outputs: &mut [Option<AudioBlockMut>],
    ) {
        let input = match inputs[0].take() {
            Some(b) => b,
            None => {
                outputs[0] = None;
                return;
            }
        };

        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        if self.crush_bits == 16 && self.hold == 1 {
            // Passthrough
            out.copy_from_slice(&input[..]);
        } else {
            for i in 0..AUDIO_BLOCK_SAMPLES {
                if self.hold_remaining == 0 {
                    self.held_sample = self.crush(input[i]);
                    self.hold_remaining = self.hold;
                }
                out[i] = self.held_sample;
                self.hold_remaining -= 1;
            }
        }

        outputs[0] = Some(out);
    }
}
