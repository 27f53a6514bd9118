use crate::block::{AudioBlockMut, AudioBlockRef};

/// Core trait for all audio processing nodes.
///
/// Each node receives input blocks and produces output blocks during
/// `update()`, which the scheduler invokes exactly once per tick. Port counts
/// are instance methods (not associated constants) so the graph can hold
/// nodes as a tagged variant set and validate connections at runtime.
pub trait AudioNode {
    /// Number of input channels this node accepts.
    fn num_inputs(&self) -> usize;

    /// Number of output channels this node produces.
    fn num_outputs(&self) -> usize;

    /// Whether the given input port sums multiple connections.
    ///
    /// A summing input may be the destination of several connections; the
    /// router accumulates the contributions with saturating addition before
    /// `update()` runs. Non-summing inputs are single-writer per tick and a
    /// second connection to one is rejected at configuration time.
    fn sums_input(&self, port: usize) -> bool {
        let _ = port;
        false
    }

    /// Process one block of audio.
    ///
    /// `inputs` holds one slot per input channel, each optionally containing
    /// a retained shared block for this tick; the node may `take()` a slot to
    /// consume the reference (for copy-on-write via
    /// [`AudioBlockRef::into_mut`]). Slots left occupied are released by the
    /// scheduler after the call.
    ///
    /// `outputs` holds one slot per output channel, each pre-filled with a
    /// zeroed exclusive block when the pool could supply one. The node writes
    /// its result into (or replaces) a slot to publish it, or takes the slot
    /// to `None` to emit silence. An empty slot on entry means the pool was
    /// exhausted; the node must degrade to silence, never fault.
    fn update(
        &mut self,
        inputs: &mut [Option<AudioBlockRef>],
        outputs: &mut [Option<AudioBlockMut>],
    );
}
