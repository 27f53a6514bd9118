//! RMS (root-mean-square) level meter.
//!
//! Accumulates squared samples over a fixed-length analysis window and
//! reports one scalar per completed window.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::error::ConfigError;
use crate::node::AudioNode;

/// RMS level meter. Analyzer node: 1 input, 0 outputs.
///
/// The analysis window length is independent of the audio block length
/// and defaults to 1024 samples. Each completed window latches
/// `sqrt(mean(sample^2)) / 32767` and raises `available`; the next
/// window starts immediately, even mid-block. A missing input block
/// counts as silence.
pub struct AudioAnalyzeRms {
    accum: u64,
    window_len: u32,
    count: u32,
    result: f32,
    new_output: bool,
}

impl AudioAnalyzeRms {
    /// Create a new RMS meter with a 1024-sample window.
    pub const fn new() -> Self {
        AudioAnalyzeRms {
            accum: 0,
            window_len: 1024,
            count: 0,
            result: 0.0,
            new_output: false,
        }
    }

    /// Set the analysis window length in samples.
    ///
    /// Discards any partially accumulated window; the latched result
    /// stays readable. A zero length is rejected.
    pub fn window_length(&mut self, samples: u32) -> Result<(), ConfigError> {
        if samples == 0 {
            return Err(ConfigError::InvalidParameter);
        }
        self.window_len = samples;
        self.accum = 0;
        self.count = 0;
        Ok(())
    }

    /// Returns `true` once per completed window, until `read` clears it.
    pub fn available(&self) -> bool {
        self.new_output
    }

    /// RMS level of the last completed window, normalized to [0.0, 1.0].
    ///
    /// Returns 0.0 before the first window completes. Clears the
    /// `available` flag; the latched value remains until the next window
    /// overwrites it.
    pub fn read(&mut self) -> f32 {
        self.new_output = false;
        self.result
    }

    #[inline]
    fn accumulate(&mut self, d: i16) {
        let s = d as i64;
        self.accum += (s * s) as u64;
        self.count += 1;
        if self.count >= self.window_len {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        let mean = self.accum as f64 / self.window_len as f64;
        self.result = (libm::sqrt(mean) / 32767.0) as f32;
        self.accum = 0;
        self.count = 0;
        self.new_output = true;
    }
}

impl AudioNode for AudioAnalyzeRms {
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
        match inputs[0].take() {
            Some(input) => {
                for i in 0..AUDIO_BLOCK_SAMPLES {
                    self.accumulate(input[i]);
                }
            }
            None => {
                for _ in 0..AUDIO_BLOCK_SAMPLES {
                    self.accumulate(0);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AudioBlockPool;
    use core::f32::consts::PI;

    fn feed_with(
        rms: &mut AudioAnalyzeRms,
        pool: &'static AudioBlockPool,
        fill: impl Fn(usize) -> i16,
    ) {
        let mut block = pool.try_allocate().unwrap();
        for (i, s) in block.iter_mut().enumerate() {
            *s = fill(i);
        }
        let mut inputs = [Some(block.into_shared())];
        rms.update(&mut inputs, &mut []);
    }

    #[test]
    fn rms_no_data() {
        let mut rms = AudioAnalyzeRms::new();
        assert!(!rms.available());
        assert_eq!(rms.read(), 0.0);
    }

    #[test]
    fn silence_reads_zero() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();
        rms.window_length(128).unwrap();

        feed_with(&mut rms, pool, |_| 0);
        assert!(rms.available());
        assert_eq!(rms.read(), 0.0);
    }

    #[test]
    fn full_scale_dc_reads_one() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();
        rms.window_length(128).unwrap();

        feed_with(&mut rms, pool, |_| 32767);
        let level = rms.read();
        assert!((level - 1.0).abs() < 0.001, "expected ~1.0, got {}", level);
    }

    #[test]
    fn sine_reads_amplitude_over_sqrt_two() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();

        // Eight whole cycles fit the default 1024-sample window exactly
        for b in 0..8 {
            feed_with(&mut rms, pool, |i| {
                let n = (b * AUDIO_BLOCK_SAMPLES + i) as f32;
                (16384.0 * libm::sinf(2.0 * PI * 8.0 * n / 1024.0)) as i16
            });
        }

        assert!(rms.available());
        let level = rms.read();
        let expected = 16384.0 / 32767.0 / core::f32::consts::SQRT_2;
        assert!(
            (level - expected).abs() < 0.01,
            "expected ~{}, got {}",
            expected,
            level
        );
    }

    #[test]
    fn window_spans_blocks() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();
        rms.window_length(256).unwrap();

        feed_with(&mut rms, pool, |_| 10000);
        assert!(!rms.available(), "window only half full");
        feed_with(&mut rms, pool, |_| 10000);
        assert!(rms.available());

        let level = rms.read();
        let expected = 10000.0 / 32767.0;
        assert!(
            (level - expected).abs() < 0.001,
            "expected ~{}, got {}",
            expected,
            level
        );
    }

    #[test]
    fn missing_input_dilutes_the_window() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();
        rms.window_length(256).unwrap();

        feed_with(&mut rms, pool, |_| 32767);
        let mut inputs = [None];
        rms.update(&mut inputs, &mut []);

        // Half the window at full scale, half silent
        assert!(rms.available());
        let level = rms.read();
        let expected = 1.0 / core::f32::consts::SQRT_2;
        assert!(
            (level - expected).abs() < 0.001,
            "expected ~{}, got {}",
            expected,
            level
        );
    }

    #[test]
    fn read_keeps_latched_value() {
        let pool = AudioBlockPool::new_leaked(4);
        let mut rms = AudioAnalyzeRms::new();
        rms.window_length(128).unwrap();

        feed_with(&mut rms, pool, |_| 20000);
        let first = rms.read();
        assert!(!rms.available());
        assert_eq!(rms.read(), first, "value stays until next window");
    }

    #[test]
    fn zero_window_rejected() {
        let mut rms = AudioAnalyzeRms::new();
        assert_eq!(rms.window_length(0), Err(ConfigError::InvalidParameter));
    }
}
