//! ARM DSP instruction wrappers with pure-Rust fallbacks.
//!
//! On Cortex-M cores with the DSP extension these compile to single-cycle
//! saturation/multiply instructions. On other targets (host tests,
//! Cortex-M0+), equivalent pure-Rust implementations are used.

/// Signed saturate with arithmetic right shift.
///
/// Computes `saturate(val >> RSHIFT, -(2^(BITS-1))..2^(BITS-1)-1)`.
///
/// Maps to ARM `SSAT`. `BITS` and `RSHIFT` must be compile-time constants
/// because the instruction takes immediate operands.
#[inline(always)]
pub fn signed_saturate_rshift<const BITS: u32, const RSHIFT: u32>(val: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #{bits}, {val}, asr #{rshift}",
                out = out(reg) out,
                val = in(reg) val,
                bits = const BITS,
                rshift = const RSHIFT,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        let shifted = val >> RSHIFT;
        let max = (1i32 << (BITS - 1)) - 1;
        let min = -(1i32 << (BITS - 1));
        if shifted > max {
            max
        } else if shifted < min {
            min
        } else {
            shifted
        }
    }
}

/// Saturate an `i32` to `i16` range (`-32768..=32767`).
///
/// Maps to ARM `SSAT #16`.
#[inline(always)]
pub fn saturate16(val: i32) -> i16 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "ssat {out}, #16, {val}",
                out = out(reg) out,
                val = in(reg) val,
            );
        }
        out as i16
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        if val > 32767 {
            32767
        } else if val < -32768 {
            -32768
        } else {
            val as i16
        }
    }
}

/// Multiply two 32-bit values, return upper 32 bits.
///
/// Computes `(a * b) >> 32`. Maps to ARM `SMMUL`.
#[inline(always)]
pub fn mul_32x32_rshift32(a: i32, b: i32) -> i32 {
    #[cfg(all(target_arch = "arm", target_feature = "dsp"))]
    {
        let out: i32;
        unsafe {
            core::arch::asm!(
                "smmul {out}, {a}, {b}",
                out = out(reg) out,
                a = in(reg) a,
                b = in(reg) b,
            );
        }
        out
    }
    #[cfg(not(all(target_arch = "arm", target_feature = "dsp")))]
    {
        ((a as i64 * b as i64) >> 32) as i32
    }
}
