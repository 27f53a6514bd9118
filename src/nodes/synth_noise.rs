//! White noise generator.
//!
//! Uses a 32-bit linear congruential generator (Numerical Recipes constants)
//! and takes the upper 16 bits of the state as the sample value, which are
//! the best-distributed bits of an LCG.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::dsp::helpers::saturating_multiply_q15;
use crate::node::AudioNode;

/// White noise source. 0 inputs, 1 output.
///
/// Starts silent; set a level with [`amplitude`](Self::amplitude). While the
/// level is zero no output block is produced.
///
/// # Example
/// ```ignore
/// let mut noise = AudioSynthNoiseWhite::new();
/// noise.amplitude(0.3);
/// ```
pub struct AudioSynthNoiseWhite {
    /// LCG state. Advanced once per generated sample.
    state: u32,
    /// Output level in Q15. 0 = silent, 32767 = full scale.
    level: i16,
}

impl AudioSynthNoiseWhite {
    /// Create a new noise source, initially silent.
    pub const fn new() -> Self {
        AudioSynthNoiseWhite {
            state: 0x5EED_1234,
            level: 0,
        }
    }

    /// Set the output level (0.0 = silent, 1.0 = full scale).
    pub fn amplitude(&mut self, level: f32) {
        let clamped = if level < 0.0 {
            0.0
        } else if level > 1.0 {
            1.0
        } else {
            level
        };
        self.level = (clamped * 32767.0) as i16;
    }
}

impl AudioNode for AudioSynthNoiseWhite {
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
        if self.level == 0 {
            outputs[0] = None;
            return;
        }

        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        let mut state = self.state;
        let level = self.level;
        for sample in out.iter_mut() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            *sample = saturating_multiply_q15((state >> 16) as i16, level);
        }
        self.state = state;

        outputs[0] = Some(out);
    }
}
