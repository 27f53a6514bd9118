//! User-to-graph audio handoff.
//!
//! A [`PlayQueueChannel`] carries pre-rendered audio blocks from user code
//! into the graph: streaming from storage, test tones, or data generated
//! on the second core. [`play_queue`] splits a channel into a
//! [`PlayQueueProducer`] for the feeding task and an [`AudioPlayQueue`]
//! source node for the graph.
//!
//! ## Usage
//!
//! ```ignore
//! static CHANNEL: PlayQueueChannel = PlayQueueChannel::new();
//!
//! let (producer, queue_node) = play_queue(&CHANNEL);
//! // producer can move to the second core:
//! let mut block = pool.try_allocate().unwrap();
//! // Fill block with audio data...
//! producer.try_play(block).unwrap();
//!
//! // queue_node joins the graph and emits one queued block per tick.
//! ```

use crate::block::{AudioBlockMut, AudioBlockRef};
use crate::node::AudioNode;

use super::spsc::SpscQueue;

/// Queue capacity: 4 usable slots + 1 sentinel = 5 total.
const QUEUE_SIZE: usize = 5;

/// Shared storage for one producer/consumer pair.
///
/// Lives in a `static` so both cores can reach it. Split it with
/// [`play_queue`] exactly once; the wait-free protocol underneath
/// tolerates one producer and one consumer only.
pub struct PlayQueueChannel {
    queue: SpscQueue<AudioBlockMut, QUEUE_SIZE>,
}

impl PlayQueueChannel {
    /// Create an empty channel.
    pub const fn new() -> Self {
        PlayQueueChannel {
            queue: SpscQueue::new(),
        }
    }
}

/// Split a channel into its feeding half and its graph half.
pub fn play_queue(channel: &'static PlayQueueChannel) -> (PlayQueueProducer, AudioPlayQueue) {
    (
        PlayQueueProducer { channel },
        AudioPlayQueue { channel },
    )
}

/// Feeding half of a play queue. Safe to move to another core.
pub struct PlayQueueProducer {
    channel: &'static PlayQueueChannel,
}

impl PlayQueueProducer {
    /// Enqueue an audio block for playback, without blocking.
    ///
    /// The block reaches the graph on one of the next `update()` calls.
    /// Returns `Err(block)` if the queue is full (caller retains
    /// ownership and can retry after a tick has drained a slot).
    pub fn try_play(&self, block: AudioBlockMut) -> Result<(), AudioBlockMut> {
        self.channel.queue.try_send(block)
    }

    /// Check if any blocks are waiting for playback.
    pub fn is_empty(&self) -> bool {
        self.channel.queue.is_empty()
    }

    /// Return the number of blocks currently queued.
    pub fn len(&self) -> usize {
        self.channel.queue.len()
    }
}

/// Graph half of a play queue. Source node: 0 inputs, 1 output.
///
/// Emits one queued block per tick. An empty queue yields silence for
/// that tick rather than waiting; the producer simply refills when it
/// can.
pub struct AudioPlayQueue {
    channel: &'static PlayQueueChannel,
}

impl AudioNode for AudioPlayQueue {
    fn num_inputs(&self) -> usize {
        0
    }

    fn num_outputs(&self) -> usize {
        1
    }

    fn update(
        &mut self,
        _inputs: &mut [Option<AudioBlockRef>],
        outputs: &mut [Option<AudioBlockMut>],
    ) {
        outputs[0] = self.channel.queue.try_receive();
    }
}
