//! Radix-2 complex FFT and analysis window generation.
//!
//! The transform is an iterative in-place decimation-in-time FFT over `f32`
//! buffers, driven by a caller-provided twiddle table (filled once via
//! [`fill_twiddles`]). Table-driven twiddles keep the per-transform work to
//! multiply/adds only, which matters on Cortex-M FPUs where `sinf`/`cosf`
//! are library calls.

use core::f32::consts::PI;

/// Apodization window applied before the transform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// No windowing. Zero leakage for exactly bin-centered tones only.
    Rectangular,
    /// Hann (raised cosine). The default.
    Hann,
    /// Hamming.
    Hamming,
    /// Blackman (three-term).
    Blackman,
}

/// Fill `dest` with window coefficients and return their sum.
///
/// The windows are periodic (DFT-even): the denominator is `N`, not `N - 1`,
/// so a tone centered on a bin stays confined to the window's main lobe.
/// The returned sum is what magnitude normalization divides by.
pub fn fill_window(dest: &mut [f32], kind: WindowKind) -> f32 {
    let n = dest.len();
    let mut sum = 0.0f32;
    for (i, w) in dest.iter_mut().enumerate() {
        let x = 2.0 * PI * i as f32 / n as f32;
        let v = match kind {
            WindowKind::Rectangular => 1.0,
            WindowKind::Hann => 0.5 - 0.5 * libm::cosf(x),
            WindowKind::Hamming => 0.54 - 0.46 * libm::cosf(x),
            WindowKind::Blackman => {
                0.42 - 0.5 * libm::cosf(x) + 0.08 * libm::cosf(2.0 * x)
            }
        };
        *w = v;
        sum += v;
    }
    sum
}

/// Fill the twiddle table for an `N`-point transform, where `N` is twice the
/// table length: `tw[j] = e^(-2*pi*i*j / N)`.
pub fn fill_twiddles(tw_re: &mut [f32], tw_im: &mut [f32]) {
    debug_assert_eq!(tw_re.len(), tw_im.len());
    let n = tw_re.len() * 2;
    for j in 0..tw_re.len() {
        let angle = -2.0 * PI * j as f32 / n as f32;
        tw_re[j] = libm::cosf(angle);
        tw_im[j] = libm::sinf(angle);
    }
}

/// In-place forward FFT over `re`/`im`.
///
/// `re.len()` must be a power of two and equal to `im.len()`; the twiddle
/// tables must hold `N / 2` entries filled by [`fill_twiddles`] for the same
/// `N`. No scaling is applied; `X[k]` comes out in natural (unnormalized)
/// DFT units.
pub fn fft_in_place(re: &mut [f32], im: &mut [f32], tw_re: &[f32], tw_im: &[f32]) {
    let n = re.len();
    debug_assert!(n.is_power_of_two());
    debug_assert_eq!(n, im.len());
    debug_assert_eq!(n / 2, tw_re.len());
    debug_assert_eq!(n / 2, tw_im.len());

    // Bit-reversal permutation
    let shift = usize::BITS - n.trailing_zeros();
    for i in 0..n {
        let j = i.reverse_bits() >> shift;
        if j > i {
            re.swap(i, j);
            im.swap(i, j);
        }
    }

    // Butterfly stages: len = 2, 4, ..., n
    let mut len = 2;
    while len <= n {
        let half = len / 2;
        let stride = n / len;
        let mut start = 0;
        while start < n {
            for k in 0..half {
                let a = start + k;
                let b = a + half;
                let w = k * stride;
                let wr = tw_re[w];
                let wi = tw_im[w];
                let tr = wr * re[b] - wi * im[b];
                let ti = wr * im[b] + wi * re[b];
                re[b] = re[a] - tr;
                im[b] = im[a] - ti;
                re[a] += tr;
                im[a] += ti;
            }
            start += len;
        }
        len <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const N: usize = 64;

    fn twiddles() -> ([f32; N / 2], [f32; N / 2]) {
        let mut tw_re = [0.0f32; N / 2];
        let mut tw_im = [0.0f32; N / 2];
        fill_twiddles(&mut tw_re, &mut tw_im);
        (tw_re, tw_im)
    }

    fn magnitude(re: &[f32], im: &[f32], k: usize) -> f32 {
        libm::sqrtf(re[k] * re[k] + im[k] * im[k])
    }

    #[test]
    fn twiddle_cardinal_points() {
        let (tw_re, tw_im) = twiddles();
        assert!((tw_re[0] - 1.0).abs() < 1e-6);
        assert!(tw_im[0].abs() < 1e-6);
        // e^(-i*pi/2) = -i
        assert!(tw_re[N / 4].abs() < 1e-6);
        assert!((tw_im[N / 4] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn impulse_has_flat_spectrum() {
        let (tw_re, tw_im) = twiddles();
        let mut re = [0.0f32; N];
        let mut im = [0.0f32; N];
        re[0] = 1.0;

        fft_in_place(&mut re, &mut im, &tw_re, &tw_im);

        for k in 0..N {
            assert!(
                (magnitude(&re, &im, k) - 1.0).abs() < 1e-5,
                "bin {k} should be 1.0"
            );
        }
    }

    #[test]
    fn dc_lands_in_bin_zero() {
        let (tw_re, tw_im) = twiddles();
        let mut re = [1.0f32; N];
        let mut im = [0.0f32; N];

        fft_in_place(&mut re, &mut im, &tw_re, &tw_im);

        assert!((magnitude(&re, &im, 0) - N as f32).abs() < 1e-3);
        for k in 1..N {
            assert!(magnitude(&re, &im, k) < 1e-3, "bin {k} should be empty");
        }
    }

    #[test]
    fn bin_centered_cosine() {
        let (tw_re, tw_im) = twiddles();
        let bin = 5;
        let mut re = [0.0f32; N];
        let mut im = [0.0f32; N];
        for i in 0..N {
            re[i] = libm::cosf(2.0 * PI * bin as f32 * i as f32 / N as f32);
        }

        fft_in_place(&mut re, &mut im, &tw_re, &tw_im);

        // A real cosine splits into bins k and N-k, each of magnitude N/2
        assert!((magnitude(&re, &im, bin) - (N / 2) as f32).abs() < 1e-2);
        assert!((magnitude(&re, &im, N - bin) - (N / 2) as f32).abs() < 1e-2);
        for k in 0..=N / 2 {
            if k != bin {
                assert!(
                    magnitude(&re, &im, k) < 1e-2,
                    "bin {k} should be empty, got {}",
                    magnitude(&re, &im, k)
                );
            }
        }
    }

    #[test]
    fn window_sums() {
        let mut w = [0.0f32; N];
        let sum = fill_window(&mut w, WindowKind::Rectangular);
        assert!((sum - N as f32).abs() < 1e-4);

        // Periodic Hann sums to exactly N/2
        let sum = fill_window(&mut w, WindowKind::Hann);
        assert!((sum - (N / 2) as f32).abs() < 1e-3);
        assert!(w[0].abs() < 1e-6, "Hann starts at zero");

        let sum = fill_window(&mut w, WindowKind::Hamming);
        assert!((sum - 0.54 * N as f32).abs() < 1e-2);

        let sum = fill_window(&mut w, WindowKind::Blackman);
        assert!((sum - 0.42 * N as f32).abs() < 1e-2);
    }
}
