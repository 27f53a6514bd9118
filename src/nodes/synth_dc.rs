//! DC level source — fills output with a constant value.
//!
//! Supports immediate amplitude changes and smooth ramping over a specified
//! duration, which callers use for click-free gain staging (e.g. feeding a
//! multiplier input or testing a chain with a known constant).

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};
use crate::node::AudioNode;

/// DC level source. Outputs a constant value every block.
///
/// Source node: 0 inputs, 1 output. While the level is zero and no ramp is
/// in progress, no output block is produced.
///
/// # Example
/// ```ignore
/// let mut dc = AudioSynthWaveformDc::new();
/// dc.amplitude(0.5);  // 50% positive DC
/// ```
pub struct AudioSynthWaveformDc {
    /// Current magnitude as Q16.16 (upper 16 bits are the i16 sample value).
    magnitude: i32,
    /// Target magnitude for ramping.
    target: i32,
    /// Increment per sample for ramping.
    increment: i32,
    /// true = currently ramping toward `target`.
    transitioning: bool,
}

impl AudioSynthWaveformDc {
    /// Create a new DC source at zero output.
    pub const fn new() -> Self {
        AudioSynthWaveformDc {
            magnitude: 0,
            target: 0,
            increment: 0,
            transitioning: false,
        }
    }

    /// Set DC level immediately (-1.0 to 1.0).
    pub fn amplitude(&mut self, level: f32) {
        let clamped = if level > 1.0 {
            1.0
        } else if level < -1.0 {
            -1.0
        } else {
            level
        };
        // 1.0 maps to 0x7FFF0000, whose upper 16 bits are 32767
        self.magnitude = (clamped * 2_147_418_112.0) as i32;
        self.transitioning = false;
    }

    /// Set DC level with a smooth ramp over the specified duration.
    pub fn amplitude_ramp(&mut self, level: f32, milliseconds: f32) {
        let clamped = if level > 1.0 {
            1.0
        } else if level < -1.0 {
            -1.0
        } else {
            level
        };
        let new_target = (clamped * 2_147_418_112.0) as i32;

        if milliseconds <= 0.0 {
            self.magnitude = new_target;
            self.transitioning = false;
            return;
        }

        let samples = (milliseconds * AUDIO_SAMPLE_RATE / 1000.0) as i32;
        if samples <= 0 {
            self.magnitude = new_target;
            self.transitioning = false;
            return;
        }

        self.target = new_target;
        let diff = (new_target as i64) - (self.magnitude as i64);
        self.increment = (diff / samples as i64) as i32;
        if self.increment == 0 {
            // Difference too small for the given duration; snap to target
            self.magnitude = new_target;
            self.transitioning = false;
        } else {
            self.transitioning = true;
        }
    }
}

/// Extract the upper 16 bits of a Q16.16 value as an i16 sample.
#[inline(always)]
fn magnitude_to_sample(mag: i32) -> i16 {
    (mag >> 16) as i16
}

impl AudioNode for AudioSynthWaveformDc {
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
        if self.magnitude == 0 && !self.transitioning {
            outputs[0] = None;
            return;
        }

        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        if !self.transitioning {
            // Steady: fill with constant value
            let sample = magnitude_to_sample(self.magnitude);
            out.fill(sample);
        } else {
            // Ramping toward target
            for i in 0..AUDIO_BLOCK_SAMPLES {
                self.magnitude = self.magnitude.wrapping_add(self.increment);

                // Check if we've reached or passed the target
                if (self.increment > 0 && self.magnitude >= self.target)
                    || (self.increment < 0 && self.magnitude <= self.target)
                {
                    self.magnitude = self.target;
                    self.transitioning = false;
                    // Fill remainder with target value
                    let sample = magnitude_to_sample(self.magnitude);
                    for s in out.iter_mut().skip(i) {
                        *s = sample;
                    }
                    break;
                }

                out[i] = magnitude_to_sample(self.magnitude);
            }
        }

        outputs[0] = Some(out);
    }
}
