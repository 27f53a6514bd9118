//! I2S stereo output sink.
//!
//! [`AudioOutputI2S`] is the graph's terminal node and the source of
//! its timing. Two input ports (0 = left, 1 = right) each feed a
//! two-deep queue — the block being transmitted plus one pending — and
//! the DMA completion interrupt calls [`isr`](AudioOutputI2S::isr) to
//! interleave the current pair into the hardware buffer the DMA engine
//! will drain next, while the previously filled buffer is still going
//! out. One `isr` call consumes exactly one audio block per channel.
//!
//! The PIO state machine, DMA channel, and interrupt wiring are the
//! embedding application's concern; this node only fills the buffer the
//! application hands it. The contract with the application's interrupt:
//!
//! ```ignore
//! static POOL: AudioBlockPool = AudioBlockPool::new(16);
//! // DMA ping-pong buffers, one audio block of stereo frames each.
//! static mut DMA_BUF: [[u32; AUDIO_BLOCK_SAMPLES]; 2] = [[0; AUDIO_BLOCK_SAMPLES]; 2];
//!
//! // at setup:
//! graph.node_mut(i2s).begin();
//!
//! // in the DMA completion interrupt, `which` alternating 0/1:
//! let run_update = graph.node_mut(i2s).isr(&mut DMA_BUF[which]);
//! if run_update {
//!     let _ = graph.update_all();
//! }
//! ```
//!
//! Exactly one sink in the system should be constructed with update
//! responsibility; its `isr` return value tells the interrupt to drive
//! the graph tick.

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::constants::AUDIO_BLOCK_SAMPLES;
use crate::node::AudioNode;

use super::interleave::{interleave_l, interleave_lr, interleave_r, silence};

/// One channel's slice of the sink: the block being transmitted and
/// the block queued behind it.
struct ChannelQueue {
    current: Option<AudioBlockRef>,
    pending: Option<AudioBlockRef>,
}

impl ChannelQueue {
    const fn new() -> Self {
        ChannelQueue {
            current: None,
            pending: None,
        }
    }

    /// Queue a block for transmission. When both slots are full the
    /// oldest block is dropped, keeping latency bounded at two blocks.
    fn push(&mut self, block: AudioBlockRef) {
        if self.current.is_none() {
            self.current = Some(block);
        } else if self.pending.is_none() {
            self.pending = Some(block);
        } else {
            self.current = self.pending.take();
            self.pending = Some(block);
        }
    }

    /// Consume the current block and promote the pending one.
    fn rotate(&mut self) -> Option<AudioBlockRef> {
        let consumed = self.current.take();
        self.current = self.pending.take();
        consumed
    }
}

/// DMA-fed I2S sink node: 2 inputs (left, right), no outputs.
pub struct AudioOutputI2S {
    left: ChannelQueue,
    right: ChannelQueue,
    /// `begin` has been called; before that, inputs are discarded.
    armed: bool,
    /// The sink has transmitted at least one real block, so a missing
    /// block from here on is a genuine underrun rather than startup.
    primed: bool,
    underruns: u32,
    update_responsibility: bool,
}

impl AudioOutputI2S {
    /// Create an I2S sink.
    ///
    /// `update_responsibility`: whether this sink's [`isr`](Self::isr)
    /// should tell the interrupt to run the graph tick. Exactly one
    /// sink per system should carry it.
    pub const fn new(update_responsibility: bool) -> Self {
        AudioOutputI2S {
            left: ChannelQueue::new(),
            right: ChannelQueue::new(),
            armed: false,
            primed: false,
            underruns: 0,
            update_responsibility,
        }
    }

    /// Arm the sink. The application calls this once the PIO/DMA side
    /// is configured and the block-rate interrupt is about to start;
    /// until then the node discards its inputs.
    pub fn begin(&mut self) {
        self.armed = true;
    }

    /// Fill the next free hardware buffer with one block of interleaved
    /// stereo frames (one `u32` per frame, left in the low half-word).
    ///
    /// Call from the DMA completion interrupt. Missing channel blocks
    /// interleave as silence; once the sink has been primed by real
    /// data, a tick where *neither* channel had a block to transmit is
    /// counted as an underrun (the stream re-synchronizes on the next
    /// buffer boundary by itself).
    ///
    /// Returns `true` when this sink holds update responsibility, i.e.
    /// the caller should now run `update_all` to produce the next block.
    pub fn isr(&mut self, dma_buffer: &mut [u32; AUDIO_BLOCK_SAMPLES]) -> bool {
        match (&self.left.current, &self.right.current) {
            (Some(l), Some(r)) => interleave_lr(dma_buffer, &l[..], &r[..]),
            (Some(l), None) => interleave_l(dma_buffer, &l[..]),
            (None, Some(r)) => interleave_r(dma_buffer, &r[..]),
            (None, None) => {
                silence(dma_buffer);
                if self.primed {
                    self.underruns = self.underruns.wrapping_add(1);
                }
            }
        }
        if self.left.current.is_some() || self.right.current.is_some() {
            self.primed = true;
        }
        self.left.rotate();
        self.right.rotate();
        self.update_responsibility
    }

    /// Number of times the DMA needed a buffer the graph had not
    /// refilled. Audible as a dropout; recoverable.
    pub fn underruns(&self) -> u32 {
        self.underruns
    }

    /// Whether this sink's `isr` drives the graph tick.
    pub fn has_update_responsibility(&self) -> bool {
        self.update_responsibility
    }
}

impl AudioNode for AudioOutputI2S {
    fn num_inputs(&self) -> usize {
        2
    }

    fn num_outputs(&self) -> usize {
        0
    }

    fn update(
        &mut self,
        inputs: &mut [Option<AudioBlockRef>],
        _outputs: &mut [Option<AudioBlockMut>],
    ) {
        if !self.armed {
            return;
        }
        if let Some(block) = inputs[0].take() {
            self.left.push(block);
        }
        if let Some(block) = inputs[1].take() {
            self.right.push(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::AudioBlockPool;

    fn make_block(pool: &'static AudioBlockPool, value: i16) -> AudioBlockRef {
        let mut block = pool.try_allocate().unwrap();
        block.fill(value);
        block.into_shared()
    }

    fn feed(sink: &mut AudioOutputI2S, left: Option<AudioBlockRef>, right: Option<AudioBlockRef>) {
        let mut inputs = [left, right];
        sink.update(&mut inputs, &mut []);
    }

    #[test]
    fn unarmed_sink_discards_inputs() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut sink = AudioOutputI2S::new(false);

        feed(&mut sink, Some(make_block(pool, 1)), Some(make_block(pool, 2)));
        assert_eq!(pool.usage(), 0);

        let mut buf = [0xAAu32; AUDIO_BLOCK_SAMPLES];
        sink.isr(&mut buf);
        assert!(buf.iter().all(|&w| w == 0));
    }

    #[test]
    fn isr_interleaves_current_pair() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut sink = AudioOutputI2S::new(false);
        sink.begin();

        feed(&mut sink, Some(make_block(pool, 100)), Some(make_block(pool, -200)));

        let mut buf = [0u32; AUDIO_BLOCK_SAMPLES];
        sink.isr(&mut buf);
        for &frame in buf.iter() {
            assert_eq!(frame as i16, 100);
            assert_eq!((frame >> 16) as i16, -200);
        }
    }

    #[test]
    fn mono_left_fills_right_with_silence() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut sink = AudioOutputI2S::new(false);
        sink.begin();

        feed(&mut sink, Some(make_block(pool, 777)), None);

        let mut buf = [0u32; AUDIO_BLOCK_SAMPLES];
        sink.isr(&mut buf);
        for &frame in buf.iter() {
            assert_eq!(frame as i16, 777);
            assert_eq!((frame >> 16) as i16, 0);
        }
        // A connected-but-silent right channel is not an underrun.
        assert_eq!(sink.underruns(), 0);
    }

    #[test]
    fn double_buffer_rotation() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut sink = AudioOutputI2S::new(false);
        sink.begin();

        feed(&mut sink, Some(make_block(pool, 10)), None);
        feed(&mut sink, Some(make_block(pool, 20)), None);
        // Third push drops the oldest: bounded two-block latency.
        feed(&mut sink, Some(make_block(pool, 30)), None);

        let mut buf = [0u32; AUDIO_BLOCK_SAMPLES];
        sink.isr(&mut buf);
        assert_eq!(buf[0] as i16, 20);
        sink.isr(&mut buf);
        assert_eq!(buf[0] as i16, 30);
        // Queue drained; the consumed blocks went back to the pool.
        assert_eq!(pool.usage(), 0);
    }

    #[test]
    fn underrun_counted_only_after_priming() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut sink = AudioOutputI2S::new(false);
        sink.begin();

        let mut buf = [0u32; AUDIO_BLOCK_SAMPLES];
        // Startup: nothing queued yet, not an underrun.
        sink.isr(&mut buf);
        sink.isr(&mut buf);
        assert_eq!(sink.underruns(), 0);

        feed(&mut sink, Some(make_block(pool, 5)), None);
        sink.isr(&mut buf);
        assert_eq!(sink.underruns(), 0);

        // Primed and starved: count it, output silence.
        sink.isr(&mut buf);
        assert_eq!(sink.underruns(), 1);
        assert!(buf.iter().all(|&w| w == 0));

        // Recovery: fresh data resumes cleanly.
        feed(&mut sink, Some(make_block(pool, 6)), None);
        sink.isr(&mut buf);
        assert_eq!(sink.underruns(), 1);
        assert_eq!(buf[0] as i16, 6);
    }

    #[test]
    fn update_responsibility_is_reported() {
        let mut with = AudioOutputI2S::new(true);
        let mut without = AudioOutputI2S::new(false);
        let mut buf = [0u32; AUDIO_BLOCK_SAMPLES];

        assert!(with.has_update_responsibility());
        assert!(with.isr(&mut buf));
        assert!(!without.isr(&mut buf));
    }
}
