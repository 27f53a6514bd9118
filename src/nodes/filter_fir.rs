//! FIR filter with Q15 coefficients.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, FIR_MAX_TAPS};
use crate::dsp::intrinsics::saturate16;
use crate::error::ConfigError;
use crate::node::AudioNode;

/// Finite impulse response filter. One input, one output.
///
/// Each output sample is the dot product of the coefficient set with the
/// most recent input samples. The history ring persists across blocks, so
/// the convolution window slides seamlessly over block boundaries.
///
/// A freshly created filter passes audio through unchanged until `begin`
/// loads coefficients. Swapping coefficient sets is only possible between
/// blocks; `update` holds the node exclusively while it runs.
pub struct AudioFilterFir {
    coeffs: Option<&'static [i16]>,
    history: [i16; FIR_MAX_TAPS],
    pos: usize,
}

impl AudioFilterFir {
    /// Create a filter in passthrough mode.
    pub const fn new() -> Self {
        AudioFilterFir {
            coeffs: None,
            history: [0; FIR_MAX_TAPS],
            pos: 0,
        }
    }

    /// Load a Q15 coefficient set and clear the sample history.
    ///
    /// Rejects empty sets and sets longer than [`FIR_MAX_TAPS`].
    pub fn begin(&mut self, coeffs: &'static [i16]) -> Result<(), ConfigError> {
        if coeffs.is_empty() {
            return Err(ConfigError::InvalidParameter);
        }
        if coeffs.len() > FIR_MAX_TAPS {
            return Err(ConfigError::TooManyTaps);
        }
        self.coeffs = Some(coeffs);
        self.history = [0; FIR_MAX_TAPS];
        self.pos = 0;
        Ok(())
    }
}

impl AudioNode for AudioFilterFir {
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

        match self.coeffs {
            None => out.copy_from_slice(&input[..]),
            Some(coeffs) => {
                for i in 0..AUDIO_BLOCK_SAMPLES {
                    self.pos += 1;
                    if self.pos >= FIR_MAX_TAPS {
                        self.pos = 0;
                    }
                    self.history[self.pos] = input[i];

                    // Newest sample pairs with coeffs[0], walking back
                    // through the ring for the older taps.
                    let mut acc: i64 = 0;
                    let mut idx = self.pos;
                    for &c in coeffs {
                        acc += c as i64 * self.history[idx] as i64;
                        idx = if idx == 0 { FIR_MAX_TAPS - 1 } else { idx - 1 };
                    }
                    out[i] = saturate16((acc >> 15) as i32);
                }
            }
        }

        outputs[0] = Some(out);
    }
}
