//! N-channel audio mixer with per-channel gain.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::dsp::intrinsics::saturate16;
use crate::node::AudioNode;

/// Fixed-point unity gain: 1.0 in Q16.16 format = 65536.
const MULTI_UNITYGAIN: i32 = 65536;

/// N-channel mixer. Mixes N input channels into a single mono output with
/// per-channel gain.
///
/// Every input port is a summing port: the router may deliver several
/// connections to one channel and accumulates them before `update()` runs.
/// When no channel has a block for the tick, no output is produced.
///
/// # Example
/// ```ignore
/// let mut mixer = AudioMixer::<4>::new();
/// mixer.gain(0, 1.0);  // channel 0 at unity
/// mixer.gain(1, 0.5);  // channel 1 at half volume
/// ```
pub struct AudioMixer<const N: usize> {
    /// Per-channel gain in Q16.16 fixed-point. 65536 = unity (1.0).
    multiplier: [i32; N],
}

impl<const N: usize> AudioMixer<N> {
    /// Create a new mixer with all channels at unity gain.
    pub const fn new() -> Self {
        AudioMixer {
            multiplier: [MULTI_UNITYGAIN; N],
        }
    }

    /// Set the gain for a specific channel.
    ///
    /// `level` is a floating-point gain: 0.0 = silence, 1.0 = unity,
    /// >1.0 = boost. Clamped to ±32767.0. Out-of-range channels are ignored.
    pub fn gain(&mut self, channel: usize, level: f32) {
        if channel >= N {
            return;
        }
        let clamped = if level > 32767.0 {
            32767.0
        } else if level < -32767.0 {
            -32767.0
        } else {
            level
        };
        self.multiplier[channel] = (clamped * 65536.0) as i32;
    }
}

/// Apply gain to a block in-place: `data[i] = saturate16((data[i] * mult) >> 16)`.
fn apply_gain(data: &mut [i16; AUDIO_BLOCK_SAMPLES], mult: i32) {
    for sample in data.iter_mut() {
        let val = ((*sample as i64) * (mult as i64)) >> 16;
        *sample = saturate16(val as i32);
    }
}

/// Apply gain to `src` and saturating-add into `dst`.
fn apply_gain_then_add(
    dst: &mut [i16; AUDIO_BLOCK_SAMPLES],
    src: &[i16; AUDIO_BLOCK_SAMPLES],
    mult: i32,
) {
    if mult == MULTI_UNITYGAIN {
        // Fast path: just saturating-add
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            *d = saturate16(*d as i32 + s as i32);
        }
    } else {
        for (d, &s) in dst.iter_mut().zip(src.iter()) {
            let gained = ((s as i64) * (mult as i64)) >> 16;
            let gained_sat = saturate16(gained as i32);
            *d = saturate16(*d as i32 + gained_sat as i32);
        }
    }
}

impl<const N: usize> AudioNode for AudioMixer<N> {
    fn num_inputs(&self) -> usize {
        N
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn sums_input(&self, _port: usize) -> bool {
        true
    }

    fn update(
        &mut self,
        inputs: &mut [Option<AudioBlockRef>],
        outputs: &mut [Option<AudioBlockMut>],
    ) {
        let mut out = match outputs[0].take() {
            Some(b) => b,
            None => return,
        };

        let mut initialized = false;

        for ch in 0..N {
            if let Some(ref input) = inputs[ch] {
                let mult = self.multiplier[ch];
                if !initialized {
                    // First active channel: copy (with gain) into output
                    out.copy_from_slice(&input[..]);
                    if mult != MULTI_UNITYGAIN {
                        apply_gain(&mut out, mult);
                    }
                    initialized = true;
                } else {
                    // Subsequent channels: gain + accumulate
                    apply_gain_then_add(&mut out, input, mult);
                }
            }
        }

        if initialized {
            outputs[0] = Some(out);
        }
        // No active inputs: out drops here and silence propagates
    }
}
