//! Single-channel amplifier (volume control).

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::dsp::intrinsics::saturate16;
use crate::node::AudioNode;

/// Fixed-point unity gain: 1.0 in Q16.16 format.
const MULTI_UNITYGAIN: i32 = 65536;

/// Single-channel amplifier. One input, one output.
///
/// Gain changes apply at the next block; there is no built-in ramping, so
/// callers that need click-free changes spread them across ticks.
///
/// # Example
/// ```ignore
/// let mut amp = AudioAmplifier::new();
/// amp.gain(0.75); // 75% volume
/// ```
pub struct AudioAmplifier {
    /// Gain in Q16.16 fixed-point. 65536 = unity (1.0).
    multiplier: i32,
}

impl AudioAmplifier {
    /// Create a new amplifier at unity gain.
    pub const fn new() -> Self {
        AudioAmplifier {
            multiplier: MULTI_UNITYGAIN,
        }
    }

    /// Set amplification level.
    ///
    /// 0.0 = silence, 1.0 = unity, >1.0 = boost. Clamped to ±32767.0;
    /// results that exceed the sample range saturate instead of wrapping.
    pub fn gain(&mut self, level: f32) {
        let clamped = if level > 32767.0 {
            32767.0
        } else if level < -32767.0 {
            -32767.0
        } else {
            level
        };
        self.multiplier = (clamped * 65536.0) as i32;
    }
}

impl AudioNode for AudioAmplifier {
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
                // Silence in, silence out
                outputs[0] = None;
                return;
            }
        };

        let mult = self.multiplier;
        if mult == 0 {
            // Zero gain: emit silence
            outputs[0] = None;
            return;
        }

        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        if mult == MULTI_UNITYGAIN {
            // Unity gain: pass through (copy)
            out.copy_from_slice(&input[..]);
        } else {
            // Q16.16 multiply with saturation
            for i in 0..AUDIO_BLOCK_SAMPLES {
                let val = ((input[i] as i64) * (mult as i64)) >> 16;
                out[i] = saturate16(val as i32);
            }
        }

        outputs[0] = Some(out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AudioBlockPool;

    fn alloc_block_with(pool: &'static AudioBlockPool, values: &[i16]) -> AudioBlockMut {
        let mut block = pool.try_allocate().unwrap();
        for (i, &v) in values.iter().enumerate() {
            if i < AUDIO_BLOCK_SAMPLES {
                block[i] = v;
            }
        }
        block
    }

    fn run(amp: &mut AudioAmplifier, input: Option<AudioBlockRef>) -> Option<AudioBlockMut> {
        let pool = AudioBlockPool::new_leaked(4);
        let mut inputs = [input];
        let mut outputs = [pool.try_allocate()];
        amp.update(&mut inputs, &mut outputs);
        outputs[0].take()
    }

    #[test]
    fn amplifier_unity_gain() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();

        let input = alloc_block_with(pool, &[1000, -2000, 32767, -32768]);
        let out = run(&mut amp, Some(input.into_shared())).unwrap();

        assert_eq!(out[0], 1000);
        assert_eq!(out[1], -2000);
        assert_eq!(out[2], 32767);
        assert_eq!(out[3], -32768);
    }

    #[test]
    fn amplifier_half_gain() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();
        amp.gain(0.5);

        let input = alloc_block_with(pool, &[10000, -10000]);
        let out = run(&mut amp, Some(input.into_shared())).unwrap();

        assert!((out[0] - 5000).abs() <= 1);
        assert!((out[1] - (-5000)).abs() <= 1);
    }

    #[test]
    fn amplifier_zero_gain_produces_silence() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();
        amp.gain(0.0);

        let input = alloc_block_with(pool, &[1000, 2000]);
        assert!(run(&mut amp, Some(input.into_shared())).is_none());
    }

    #[test]
    fn amplifier_boost() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();
        amp.gain(2.0);

        let input = alloc_block_with(pool, &[10000, -10000]);
        let out = run(&mut amp, Some(input.into_shared())).unwrap();

        assert!((out[0] - 20000).abs() <= 1);
        assert!((out[1] - (-20000)).abs() <= 1);
    }

    #[test]
    fn amplifier_saturates_instead_of_wrapping() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();
        amp.gain(2.0);

        let input = alloc_block_with(pool, &[20000, -20000]);
        let out = run(&mut amp, Some(input.into_shared())).unwrap();

        assert_eq!(out[0], 32767);
        assert_eq!(out[1], -32768);
    }

    #[test]
    fn amplifier_no_input_emits_silence() {
        let mut amp = AudioAmplifier::new();
        assert!(run(&mut amp, None).is_none());
    }

    #[test]
    fn amplifier_releases_consumed_input() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut amp = AudioAmplifier::new();

        let input = alloc_block_with(pool, &[123]);
        let out = run(&mut amp, Some(input.into_shared()));
        assert!(out.is_some());
        drop(out);
        // Only the leaked run() pool retains anything; this pool is drained
        assert_eq!(pool.usage(), 0);
    }
}
