//! Block-level DSP helper functions and Q15 arithmetic.

use crate::constants::AUDIO_BLOCK_SAMPLES;
use super::intrinsics::saturate16;

/// Saturating multiply of two Q15 values.
///
/// Computes `(a * b) >> 15`, saturated to `i16` range.
#[inline(always)]
pub fn saturating_multiply_q15(a: i16, b: i16) -> i16 {
    saturate16(((a as i32 * b as i32) >> 15) as i32)
}

/// Saturating-add `src` into `dst` sample-by-sample.
///
/// Used by the connection router when several sources feed one summing
/// input port.
pub fn block_accumulate(
    dst: &mut [i16; AUDIO_BLOCK_SAMPLES],
    src: &[i16; AUDIO_BLOCK_SAMPLES],
) {
    for (d, &s) in dst.iter_mut().zip(src.iter()) {
        *d = saturate16(*d as i32 + s as i32);
    }
}
