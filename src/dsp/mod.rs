//! Fixed-point and spectral DSP primitives shared by the processing nodes.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`intrinsics`] | ARM DSP instruction wrappers with portable fallbacks |
//! | [`helpers`] | Q15 block arithmetic (scaling, saturating accumulate) |
//! | [`wavetables`] | Precomputed sine lookup table |
//! | [`fft`] | Radix-2 FFT and analysis window generation |

pub mod fft;
pub mod helpers;
pub mod intrinsics;
pub mod wavetables;
