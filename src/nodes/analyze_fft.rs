//! 1024-point FFT spectrum analyzer.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::dsp::fft::{fft_in_place, fill_twiddles, fill_window};
use crate::error::ConfigError;
use crate::node::AudioNode;

pub use crate::dsp::fft::WindowKind;

/// Transform length in samples. Eight audio blocks fill one window.
pub const FFT_SIZE: usize = 1024;

/// Working storage for one [`AudioAnalyzeFft1024`].
///
/// About 20 KB, so the caller decides where it lives (typically a
/// `static`) instead of it being embedded in the node.
pub struct FftBuffers {
    input: [i16; FFT_SIZE],
    window: [f32; FFT_SIZE],
    re: [f32; FFT_SIZE],
    im: [f32; FFT_SIZE],
    tw_re: [f32; FFT_SIZE / 2],
    tw_im: [f32; FFT_SIZE / 2],
    magnitudes: [f32; FFT_SIZE / 2],
}

impl FftBuffers {
    pub const fn new() -> Self {
        FftBuffers {
            input: [0; FFT_SIZE],
            window: [0.0; FFT_SIZE],
            re: [0.0; FFT_SIZE],
            im: [0.0; FFT_SIZE],
            tw_re: [0.0; FFT_SIZE / 2],
            tw_im: [0.0; FFT_SIZE / 2],
            magnitudes: [0.0; FFT_SIZE / 2],
        }
    }
}

/// Spectrum analyzer. One input, no outputs.
///
/// Accumulates eight consecutive blocks into a 1024-sample window, then
/// applies the apodization window and a forward transform. A missing
/// input block contributes zeros, so analysis timing never stalls.
///
/// Magnitudes are normalized so a full-scale bin-centered sine reads
/// 1.0: bin `k` holds `2 * |X[k]| / (32768 * W)` for `k >= 1` and
/// `|X[0]| / (32768 * W)` for DC, where `W` is the sum of the window
/// samples. The window defaults to Hann.
///
/// `available` turns true each time a transform completes and is
/// cleared by the next `read` or `read_range`; the stored magnitudes
/// remain readable until the following transform overwrites them.
pub struct AudioAnalyzeFft1024 {
    buffers: &'static mut FftBuffers,
    filled: usize,
    window_sum: f32,
    available: bool,
}

impl AudioAnalyzeFft1024 {
    /// Wrap caller-provided storage, priming the twiddle factors and a
    /// Hann window.
    pub fn new(buffers: &'static mut FftBuffers) -> Self {
        fill_twiddles(&mut buffers.tw_re, &mut buffers.tw_im);
        let window_sum = fill_window(&mut buffers.window, WindowKind::Hann);
        AudioAnalyzeFft1024 {
            buffers,
            filled: 0,
            window_sum,
            available: false,
        }
    }

    /// Select the apodization window, effective from the next completed
    /// transform.
    pub fn window_function(&mut self, kind: WindowKind) {
        self.window_sum = fill_window(&mut self.buffers.window, kind);
    }

    /// True once per completed transform, until a read clears it.
    pub fn available(&self) -> bool {
        self.available
    }

    /// Magnitude of one bin from the most recent transform.
    ///
    /// Valid bins are `0..512`. Before the first transform completes
    /// every bin reads 0.0.
    pub fn read(&mut self, bin: usize) -> Result<f32, ConfigError> {
        if bin >= FFT_SIZE / 2 {
            return Err(ConfigError::BinOutOfRange);
        }
        self.available = false;
        Ok(self.buffers.magnitudes[bin])
    }

    /// Sum of the magnitudes over an inclusive bin range.
    pub fn read_range(&mut self, first: usize, last: usize) -> Result<f32, ConfigError> {
        if first > last || last >= FFT_SIZE / 2 {
            return Err(ConfigError::BinOutOfRange);
        }
        self.available = false;
        let mut sum = 0.0;
        for &mag in &self.buffers.magnitudes[first..=last] {
            sum += mag;
        }
        Ok(sum)
    }

    fn transform(&mut self) {
        let b = &mut *self.buffers;
        for i in 0..FFT_SIZE {
            b.re[i] = b.input[i] as f32 * b.window[i];
            b.im[i] = 0.0;
        }
        fft_in_place(&mut b.re, &mut b.im, &b.tw_re, &b.tw_im);

        let scale = 1.0 / (32768.0 * self.window_sum);
        b.magnitudes[0] = libm::sqrtf(b.re[0] * b.re[0] + b.im[0] * b.im[0]) * scale;
        for k in 1..FFT_SIZE / 2 {
            let mag = libm::sqrtf(b.re[k] * b.re[k] + b.im[k] * b.im[k]);
            b.magnitudes[k] = 2.0 * mag * scale;
        }
        self.available = true;
    }
}

impl AudioNode for AudioAnalyzeFft1024 {
    fn num_inputs(&self) -> usize {
        1
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn update(
        &mut self,
        inputs: &mut [Option<AudioBlockRef>],
        _outputs: &mut [Option<AudioBlockMut>],
    ) {
        let start = self.filled * AUDIO_BLOCK_SAMPLES;
        let dest = &mut self.buffers.input[start..start + AUDIO_BLOCK_SAMPLES];
        match inputs[0].take() {
            Some(block) => dest.copy_from_slice(&block[..]),
            None => dest.fill(0),
        }
        self.filled += 1;
        if self.filled == FFT_SIZE / AUDIO_BLOCK_SAMPLES {
            self.filled = 0;
            self.transform();
        }
    }
}
