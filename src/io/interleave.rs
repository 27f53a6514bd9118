//! Stereo frame packing for the I2S DMA buffer.
//!
//! The PIO I2S program clocks out one 32-bit word per frame: the left
//! sample in the low half-word, the right sample in the high half-word.
//! The DMA engine therefore wants `AUDIO_BLOCK_SAMPLES` words per audio
//! block, and these helpers build them from the per-channel `i16`
//! blocks the graph routes into the sink. Single-channel variants fill
//! the absent side with silence.

/// Pack matching left/right samples into stereo frames:
/// `frame = (right << 16) | left`.
///
/// Debug-asserts that all three slices have the same length.
pub fn interleave_lr(frames: &mut [u32], left: &[i16], right: &[i16]) {
    debug_assert_eq!(frames.len(), left.len());
    debug_assert_eq!(frames.len(), right.len());
    for ((frame, &l), &r) in frames.iter_mut().zip(left).zip(right) {
        *frame = (l as u16 as u32) | ((r as u16 as u32) << 16);
    }
}

/// Pack a left-only signal; the right half-word of every frame is zero.
pub fn interleave_l(frames: &mut [u32], left: &[i16]) {
    debug_assert_eq!(frames.len(), left.len());
    for (frame, &l) in frames.iter_mut().zip(left) {
        *frame = l as u16 as u32;
    }
}

/// Pack a right-only signal; the left half-word of every frame is zero.
pub fn interleave_r(frames: &mut [u32], right: &[i16]) {
    debug_assert_eq!(frames.len(), right.len());
    for (frame, &r) in frames.iter_mut().zip(right) {
        *frame = (r as u16 as u32) << 16;
    }
}

/// Fill frames with digital silence on both channels.
pub fn silence(frames: &mut [u32]) {
    frames.fill(0);
}
