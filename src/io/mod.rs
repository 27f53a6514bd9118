//! I/O edge of the graph: the I2S sink, the cross-core play queue, and
//! the primitives underneath them.
//!
//! | Item | Role |
//! |------|------|
//! | [`AudioOutputI2S`] | Terminal node; interleaves L/R blocks into the DMA buffer and paces the tick |
//! | [`AudioPlayQueue`] / [`PlayQueueProducer`] | Wait-free handoff of pre-rendered blocks from the second core into the graph |
//! | [`spsc::SpscQueue`] | Lamport single-producer/single-consumer ring used by the play queue |
//! | [`interleave`] | Stereo frame packing for the DMA buffer |

pub mod interleave;
pub mod output_i2s;
pub mod play_queue;
pub mod spsc;

pub use output_i2s::AudioOutputI2S;
pub use play_queue::{play_queue, AudioPlayQueue, PlayQueueChannel, PlayQueueProducer};
