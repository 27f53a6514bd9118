//! Chorus — multi-voice modulated delay.
//!
//! Up to four fractional-delay taps read a shared delay line fed by the
//! input. Each tap sweeps slowly around its own nominal position, with the
//! four low-frequency oscillators a quarter turn apart, so the voices
//! detune independently.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::{AUDIO_BLOCK_SAMPLES, AUDIO_SAMPLE_RATE};
use crate::dsp::wavetables::SINE_TABLE;
use crate::error::ConfigError;
use crate::node::AudioNode;

/// Default sweep oscillator increment: a 0.5 Hz cycle at 44.1 kHz.
const DEFAULT_LFO_INCREMENT: u32 = 48_696;

/// Shortest usable delay line, in samples.
const MIN_DELAY_SAMPLES: usize = 16;

/// Multi-voice chorus effect. One input, one output.
///
/// The caller supplies the delay line storage to `begin`; the node never
/// allocates. Taps for `n` voices sit at multiples of `len / (n + 1)`
/// samples and sweep by up to a quarter of that spacing, so they never
/// collide or run off either end of the line. The output is the dry
/// signal plus all taps, scaled by `1 / (n + 1)`.
///
/// Until `begin` is called the node emits silence.
pub struct AudioEffectChorus {
    delay_line: Option<&'static mut [i16]>,
    write_pos: usize,
    num_voices: u8,
    lfo_phase: [u32; 4],
    lfo_increment: u32,
}

impl AudioEffectChorus {
    /// Create an unconfigured chorus with the default 0.5 Hz sweep.
    pub const fn new() -> Self {
        AudioEffectChorus {
            delay_line: None,
            write_pos: 0,
            num_voices: 2,
            lfo_phase: [0, 0x4000_0000, 0x8000_0000, 0xC000_0000],
            lfo_increment: DEFAULT_LFO_INCREMENT,
        }
    }

    /// Attach delay line storage and set the voice count (1–4).
    ///
    /// The line must hold at least 16 samples so every tap has a usable
    /// nominal delay. Contents are cleared and the write position reset.
    pub fn begin(
        &mut self,
        delay_line: &'static mut [i16],
        voices: u8,
    ) -> Result<(), ConfigError> {
        if voices < 1 || voices > 4 {
            return Err(ConfigError::InvalidParameter);
        }
        if delay_line.len() < MIN_DELAY_SAMPLES {
            return Err(ConfigError::InvalidParameter);
        }
        delay_line.fill(0);
        self.delay_line = Some(delay_line);
        self.write_pos = 0;
        self.num_voices = voices;
        Ok(())
    }

    /// Change the voice count (1–4) without clearing the delay line.
    ///
    /// Takes effect at the next processed block.
    pub fn voices(&mut self, voices: u8) -> Result<(), ConfigError> {
        if voices < 1 || voices > 4 {
            return Err(ConfigError::InvalidParameter);
        }
        self.num_voices = voices;
        Ok(())
    }

    /// Set the sweep rate in Hz (default 0.5). Zero freezes every tap at
    /// whatever position its oscillator last reached.
    pub fn rate(&mut self, hz: f32) {
        self.lfo_increment = if hz > 0.0 {
            (hz * (4_294_967_296.0 / AUDIO_SAMPLE_RATE)) as u32
        } else {
            0
        };
    }
}

impl AudioNode for AudioEffectChorus {
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
        let voices = self.num_voices as usize;
        let spacing = len / (voices + 1);
        let sweep = (spacing / 4) as i64;
        let divisor = voices as i32 + 1;

        for i in 0..AUDIO_BLOCK_SAMPLES {
            self.write_pos += 1;
            if self.write_pos >= len {
                self.write_pos = 0;
            }
            line[self.write_pos] = input[i];

            let mut sum = input[i] as i32;
            for v in 0..voices {
                let sine = SINE_TABLE[(self.lfo_phase[v] >> 24) as usize] as i64;
                self.lfo_phase[v] = self.lfo_phase[v].wrapping_add(self.lfo_increment);

                // Tap position in Q8, swept around the nominal delay. The
                // sweep never exceeds spacing/4 so the position stays
                // strictly inside [0, len).
                let nominal_q8 = ((spacing * (v + 1)) as i32) << 8;
                let delay_q8 = nominal_q8 + ((sine * (sweep << 8)) >> 15) as i32;

                let int_delay = (delay_q8 >> 8) as usize;
                let frac = (delay_q8 & 0xFF) as i32;
                let r0 = (self.write_pos + len - int_delay) % len;
                let r1 = if r0 == 0 { len - 1 } else { r0 - 1 };
                let s0 = line[r0] as i32;
                let s1 = line[r1] as i32;
                sum += s0 + (((s1 - s0) * frac) >> 8);
            }
            out[i] = (sum / divisor) as i16;
        }

        outputs[0] = Some(out);
    }
}
