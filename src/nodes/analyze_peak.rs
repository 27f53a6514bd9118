//! Peak level detector / analyzer.
//!
//! Tracks the minimum and maximum sample values over a fixed-length
//! analysis window and reports one result per completed window.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::error::ConfigError;
use crate::node::AudioNode;

/// Peak level detector. Analyzer node: 1 input, 0 outputs.
///
/// The analysis window length is independent of the audio block length
/// and defaults to 1024 samples. When the window fills, the peak and
/// peak-to-peak levels are latched, `available` turns true, and the next
/// window starts immediately, even mid-block. A missing input block
/// counts as silence so the window keeps real time.
///
/// # Example
/// ```ignore
/// let mut peak = AudioAnalyzePeak::new();
/// // ... after processing ...
/// if peak.available() {
///     let level = peak.read(); // 0.0–1.0
/// }
/// ```
pub struct AudioAnalyzePeak {
    min_val: i16,
    max_val: i16,
    window_len: u32,
    count: u32,
    result: f32,
    result_p2p: f32,
    new_output: bool,
}

impl AudioAnalyzePeak {
    /// Create a new peak analyzer with a 1024-sample window.
    pub const fn new() -> Self {
        AudioAnalyzePeak {
            min_val: i16::MAX,
            max_val: i16::MIN,
            window_len: 1024,
            count: 0,
            result: 0.0,
            result_p2p: 0.0,
            new_output: false,
        }
    }

    /// Set the analysis window length in samples.
    ///
    /// Discards any partially accumulated window; latched results stay
    /// readable. A zero length is rejected.
    pub fn window_length(&mut self, samples: u32) -> Result<(), ConfigError> {
        if samples == 0 {
            return Err(ConfigError::InvalidParameter);
        }
        self.window_len = samples;
        self.min_val = i16::MAX;
        self.max_val = i16::MIN;
        self.count = 0;
        Ok(())
    }

    /// Returns `true` once per completed window, until a read clears it.
    pub fn available(&self) -> bool {
        self.new_output
    }

    /// Peak level of the last completed window, normalized to [0.0, 1.0].
    ///
    /// Returns 0.0 before the first window completes. Clears the
    /// `available` flag; the latched value remains until the next window
    /// overwrites it.
    pub fn read(&mut self) -> f32 {
        self.new_output = false;
        self.result
    }

    /// Peak-to-peak level of the last completed window (0.0–2.0).
    pub fn read_peak_to_peak(&mut self) -> f32 {
        self.new_output = false;
        self.result_p2p
    }

    #[inline]
    fn accumulate(&mut self, d: i16) {
        if d < self.min_val {
            self.min_val = d;
        }
        if d > self.max_val {
            self.max_val = d;
        }
        self.count += 1;
        if self.count >= self.window_len {
            self.finalize();
        }
    }

    fn finalize(&mut self) {
        let abs_min = if self.min_val == i16::MIN {
            // -32768 abs would overflow i16, handle specially
            32768i32
        } else {
            (self.min_val as i32).abs()
        };
        let abs_max = (self.max_val as i32).abs();
        let peak = if abs_min > abs_max { abs_min } else { abs_max };
        self.result = peak as f32 / 32767.0;
        self.result_p2p = (self.max_val as i32 - self.min_val as i32) as f32 / 32767.0;
        self.min_val = i16::MAX;
        self.max_val = i16::MIN;
        self.count = 0;
        self.new_output = true;
    }
}

impl AudioNode for AudioAnalyzePeak {
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
