//! Flange — single swept delay tap mixed with the dry signal.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};
use crate::dsp::wavetables::SINE_TABLE;
use crate::error::ConfigError;
use crate::node::AudioNode;

/// Flanger effect. One input, one output.
///
/// A single tap reads a caller-provided delay line at `offset` samples
/// behind the write position, swept sinusoidally by up to `depth / 2`
/// samples either way at `rate` Hz. The output is the average of the dry
/// and delayed signals, which gives the characteristic comb-filter sweep.
///
/// Until `begin` is called the node emits silence.
pub struct AudioEffectFlange {
    delay_line: Option<&'static mut [i16]>,
    write_pos: usize,
    delay_offset: usize,
    half_depth: usize,
    lfo_phase: u32,
    lfo_increment: u32,
}

impl AudioEffectFlange {
    /// Create an unconfigured flanger.
    pub const fn new() -> Self {
        AudioEffectFlange {
            delay_line: None,
            write_pos: 0,
            delay_offset: 0,
            half_depth: 0,
            lfo_phase: 0,
            lfo_increment: 0,
        }
    }

    /// Attach delay line storage and set the sweep geometry.
    ///
    /// The tap position ranges over `offset ± depth / 2` and the whole
    /// range must fall inside the line, otherwise the call is rejected.
    /// `rate` is the sweep frequency in Hz; zero freezes the tap at
    /// whatever position the oscillator last reached. Reconfiguring
    /// clears the line and restarts the sweep.
    pub fn begin(
        &mut self,
        delay_line: &'static mut [i16],
        offset: usize,
        depth: usize,
        rate: f32,
    ) -> Result<(), ConfigError> {
        let half_depth = depth / 2;
        if delay_line.is_empty()
            || half_depth > offset
            || offset + half_depth >= delay_line.len()
        {
            return Err(ConfigError::InvalidParameter);
        }
        delay_line.fill(0);
        self.delay_line = Some(delay_line);
        self.write_pos = 0;
        self.delay_offset = offset;
        self.half_depth = half_depth;
        self.lfo_phase = 0;
        self.lfo_increment = if rate > 0.0 {
            (rate * (4_294_967_296.0 / AUDIO_SAMPLE_RATE)) as u32
        } else {
            0
        };
        Ok(())
    }
}

impl AudioNode for AudioEffectFlange {
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
        let line: &mut [i16] = match self.delay_line.as_deref_mut() {
            Some(l) => l,
            None => {
                outputs[0] = None;
                return;
            }
        };
        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        let len = line.len();
        for i in 0..AUDIO_BLOCK_SAMPLES {
            self.write_pos += 1;
            if self.write_pos >= len {
                self.write_pos = 0;
            }
            line[self.write_pos] = input[i];

            let sine = SINE_TABLE[(self.lfo_phase >> 24) as usize] as i64;
            self.lfo_phase = self.lfo_phase.wrapping_add(self.lfo_increment);

            // Swept tap, guaranteed inside [0, len) by the begin checks.
            let delay = (self.delay_offset as i64
                + ((sine * self.half_depth as i64) >> 15)) as usize;
            let tap = line[(self.write_pos + len - delay) % len] as i32;

            out[i] = ((input[i] as i32 + tap) >> 1) as i16;
        }

        outputs[0] = Some(out);
    }
}
