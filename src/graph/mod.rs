//! Runtime audio graph: node registry, connection table, and the
//! per-tick update scheduler.
//!
//! An [`AudioGraph`] owns every processing node as a tagged variant
//! ([`NodeKind`]), a fixed-capacity table of directed connections, and
//! the topological update order derived from them. The application
//! builds the graph once at startup — [`add_node`](AudioGraph::add_node),
//! [`connect`](AudioGraph::connect) — and then calls
//! [`update_all`](AudioGraph::update_all) from its block-rate interrupt
//! (or the context the I2S sink's `isr` return value points at).
//!
//! Everything that can go wrong structurally (bad port, duplicate input,
//! cycle, full tables) is rejected at configuration time; the tick walk
//! itself never allocates beyond the block pool and never blocks.
//!
//! ```ignore
//! static POOL: AudioBlockPool = AudioBlockPool::new(16);
//!
//! let mut graph = AudioGraph::new(&POOL);
//! let osc = graph.add_node(AudioSynthWaveform::new())?;
//! let amp = graph.add_node(AudioAmplifier::new())?;
//! let out = graph.add_node(AudioOutputI2S::new(true))?;
//! graph.connect(osc, 0, amp, 0)?;
//! graph.connect(amp, 0, out, 0)?;
//! graph.connect(amp, 0, out, 1)?;
//!
//! graph.node_mut(osc).frequency(440.0);
//!
//! // in the DMA interrupt:
//! graph.update_all()?;
//! ```

use core::marker::PhantomData;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::block::{AudioBlockMut, AudioBlockPool, AudioBlockRef};
use crate::constants::{MAX_CONNECTIONS, MAX_NODES, MAX_PORTS};
use crate::dsp::helpers::block_accumulate;
use crate::error::{ConfigError, TickError};
use crate::io::{AudioOutputI2S, AudioPlayQueue};
use crate::node::AudioNode;
use crate::nodes::{
    AudioAmplifier, AudioAnalyzeFft1024, AudioAnalyzePeak, AudioAnalyzeRms,
    AudioEffectBitcrusher, AudioEffectChorus, AudioEffectFlange, AudioFilterFir, AudioMixer,
    AudioSynthNoiseWhite, AudioSynthWaveform, AudioSynthWaveformDc,
};
use crate::profiler::UsageProfiler;

/// Typed handle to a node registered in an [`AudioGraph`].
///
/// Carries the node's concrete type, so [`AudioGraph::node`] and
/// [`AudioGraph::node_mut`] hand back `&T` without downcasting at the
/// call site. Only valid for the graph that issued it.
pub struct NodeId<T> {
    index: u8,
    _marker: PhantomData<fn() -> T>,
}

impl<T> core::fmt::Debug for NodeId<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeId").field("index", &self.index).finish()
    }
}

impl<T> Clone for NodeId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NodeId<T> {}

/// A node type the graph knows how to store and retrieve.
///
/// Implemented for every built-in node via the [`NodeKind`] variant set.
pub trait GraphNode: AudioNode + Sized {
    /// Wrap this node in its [`NodeKind`] variant.
    fn into_kind(self) -> NodeKind;
    /// Borrow this node back out of a [`NodeKind`], if the variant matches.
    fn kind_ref(kind: &NodeKind) -> Option<&Self>;
    /// Mutably borrow this node back out of a [`NodeKind`].
    fn kind_mut(kind: &mut NodeKind) -> Option<&mut Self>;
}

macro_rules! node_kinds {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// Tagged variant set of every node type the graph can host.
        ///
        /// Resolved once at construction; the tick walk dispatches on the
        /// tag instead of a vtable, and no node is created or destroyed
        /// while the scheduler runs.
        pub enum NodeKind {
            $( $variant($ty), )+
        }

        impl AudioNode for NodeKind {
            fn num_inputs(&self) -> usize {
                match self { $( NodeKind::$variant(n) => n.num_inputs(), )+ }
            }

            fn num_outputs(&self) -> usize {
                match self { $( NodeKind::$variant(n) => n.num_outputs(), )+ }
            }

            fn sums_input(&self, port: usize) -> bool {
                match self { $( NodeKind::$variant(n) => n.sums_input(port), )+ }
            }

            fn update(
                &mut self,
                inputs: &mut [Option<AudioBlockRef>],
                outputs: &mut [Option<AudioBlockMut>],
            ) {
                match self { $( NodeKind::$variant(n) => n.update(inputs, outputs), )+ }
            }
        }

        $(
            impl GraphNode for $ty {
                fn into_kind(self) -> NodeKind {
                    NodeKind::$variant(self)
                }

                fn kind_ref(kind: &NodeKind) -> Option<&Self> {
                    match kind {
                        NodeKind::$variant(n) => Some(n),
                        _ => None,
                    }
                }

                fn kind_mut(kind: &mut NodeKind) -> Option<&mut Self> {
                    match kind {
                        NodeKind::$variant(n) => Some(n),
                        _ => None,
                    }
                }
            }
        )+
    };
}

node_kinds! {
    Waveform(AudioSynthWaveform),
    Noise(AudioSynthNoiseWhite),
    Dc(AudioSynthWaveformDc),
    Amplifier(AudioAmplifier),
    Bitcrusher(AudioEffectBitcrusher),
    Chorus(AudioEffectChorus),
    Flange(AudioEffectFlange),
    Fir(AudioFilterFir),
    Fft(AudioAnalyzeFft1024),
    Peak(AudioAnalyzePeak),
    Rms(AudioAnalyzeRms),
    Mixer(AudioMixer<MAX_PORTS>),
    PlayQueue(AudioPlayQueue),
    OutputI2s(AudioOutputI2S),
}

/// Directed edge: (source node, source output) → (destination node,
/// destination input). Immutable once accepted.
#[derive(Clone, Copy)]
struct Connection {
    src: u8,
    src_port: u8,
    dst: u8,
    dst_port: u8,
}

/// The graph context: nodes, connections, update order, and profiler.
///
/// One instance per audio engine, alive from setup to teardown. The
/// block pool is a separate `static` (its constructor is `const`) and
/// every handle the graph routes carries a reference to it.
pub struct AudioGraph {
    pool: &'static AudioBlockPool,
    nodes: [Option<NodeKind>; MAX_NODES],
    node_count: usize,
    connections: [Option<Connection>; MAX_CONNECTIONS],
    connection_count: usize,
    /// Node indices in dependency order; ties keep registration order.
    order: [u8; MAX_NODES],
    /// Per-node, per-port retained input handles for the current tick.
    input_slots: [[Option<AudioBlockRef>; MAX_PORTS]; MAX_NODES],
    /// Tick walk in progress. Re-entry is an overrun.
    running: AtomicBool,
    profiler: UsageProfiler,
}

impl AudioGraph {
    /// Create an empty graph drawing blocks from `pool`.
    pub fn new(pool: &'static AudioBlockPool) -> Self {
        AudioGraph {
            pool,
            nodes: core::array::from_fn(|_| None),
            node_count: 0,
            connections: [None; MAX_CONNECTIONS],
            connection_count: 0,
            order: [0; MAX_NODES],
            input_slots: core::array::from_fn(|_| core::array::from_fn(|_| None)),
            running: AtomicBool::new(false),
            profiler: UsageProfiler::new(),
        }
    }

    /// Register a node. Registration order breaks scheduling ties
    /// between independent nodes.
    pub fn add_node<T: GraphNode>(&mut self, node: T) -> Result<NodeId<T>, ConfigError> {
        if self.node_count == MAX_NODES {
            return Err(ConfigError::TooManyNodes);
        }
        let index = self.node_count as u8;
        self.nodes[self.node_count] = Some(node.into_kind());
        self.order[self.node_count] = index;
        self.node_count += 1;
        #[cfg(feature = "tracing")]
        tracing::debug!("graph_add: node {} ({} total)", index, self.node_count);
        Ok(NodeId {
            index,
            _marker: PhantomData,
        })
    }

    /// Connect `src`'s output `src_port` to `dst`'s input `dst_port`.
    ///
    /// Rejected (and not kept) if a port index is out of range, the
    /// destination input already has a connection and does not sum, the
    /// connection table is full, or the edge would close a cycle. The
    /// update order is recomputed on success.
    pub fn connect<S: GraphNode, D: GraphNode>(
        &mut self,
        src: NodeId<S>,
        src_port: usize,
        dst: NodeId<D>,
        dst_port: usize,
    ) -> Result<(), ConfigError> {
        let src_node = self.kind_at(src.index)?;
        if src_port >= src_node.num_outputs() {
            return Err(ConfigError::InvalidPort);
        }
        let dst_node = self.kind_at(dst.index)?;
        if dst_port >= dst_node.num_inputs() {
            return Err(ConfigError::InvalidPort);
        }
        if !dst_node.sums_input(dst_port) {
            let taken = self
                .connections
                .iter()
                .flatten()
                .any(|c| c.dst == dst.index && c.dst_port as usize == dst_port);
            if taken {
                return Err(ConfigError::InputInUse);
            }
        }
        if self.connection_count == MAX_CONNECTIONS {
            return Err(ConfigError::TooManyConnections);
        }

        let slot = self.connection_count;
        self.connections[slot] = Some(Connection {
            src: src.index,
            src_port: src_port as u8,
            dst: dst.index,
            dst_port: dst_port as u8,
        });
        self.connection_count += 1;

        if let Err(e) = self.recompute_order() {
            // Withdraw the offending edge before reporting.
            self.connections[slot] = None;
            self.connection_count -= 1;
            return Err(e);
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "graph_connect: {}:{} -> {}:{}",
            src.index,
            src_port,
            dst.index,
            dst_port
        );
        Ok(())
    }

    /// Borrow a registered node for parameter reads or analyzer polling.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph. Ids are only
    /// meaningful to the graph whose `add_node` produced them.
    pub fn node<T: GraphNode>(&self, id: NodeId<T>) -> &T {
        self.nodes[id.index as usize]
            .as_ref()
            .and_then(T::kind_ref)
            .unwrap_or_else(|| panic!("node id does not belong to this graph"))
    }

    /// Mutably borrow a registered node for `begin`/setter calls.
    ///
    /// Exclusive access through `&mut self` also guarantees no setter
    /// overlaps an in-flight tick.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different graph.
    pub fn node_mut<T: GraphNode>(&mut self, id: NodeId<T>) -> &mut T {
        self.nodes[id.index as usize]
            .as_mut()
            .and_then(T::kind_mut)
            .unwrap_or_else(|| panic!("node id does not belong to this graph"))
    }

    /// Number of registered nodes.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Number of accepted connections.
    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    /// The block pool this graph allocates from.
    pub fn pool(&self) -> &'static AudioBlockPool {
        self.pool
    }

    /// CPU usage and overrun statistics.
    pub fn profiler(&self) -> &UsageProfiler {
        &self.profiler
    }

    /// Mutable profiler access, e.g. to install a cycle source.
    pub fn profiler_mut(&mut self) -> &mut UsageProfiler {
        &mut self.profiler
    }

    /// Process one audio block through the whole graph.
    ///
    /// Walks every node exactly once in dependency order: inputs are
    /// the handles routed during earlier steps of this same walk,
    /// outputs are published to each connected consumer (fan-out by
    /// refcount, summing inputs by saturating accumulation), and any
    /// block without a consumer is released before the next node runs.
    ///
    /// Returns [`TickError::Overrun`] — and leaves all in-flight block
    /// ownership untouched — if called again before a previous walk
    /// finished. That can only happen when the application aliases the
    /// graph from an interrupt; the overrun is also counted on the
    /// profiler.
    pub fn update_all(&mut self) -> Result<(), TickError> {
        if self.running.swap(true, Ordering::Acquire) {
            self.profiler.record_overrun();
            return Err(TickError::Overrun);
        }
        let started = self.profiler.begin_tick();

        for i in 0..self.node_count {
            let idx = self.order[i] as usize;
            let Some(mut kind) = self.nodes[idx].take() else {
                continue;
            };

            let mut inputs = core::mem::take(&mut self.input_slots[idx]);
            let in_count = kind.num_inputs();
            let out_count = kind.num_outputs();

            // One fresh zeroed block per output port; a None slot tells
            // the node the pool is exhausted and it must stay silent.
            let mut outputs: [Option<AudioBlockMut>; MAX_PORTS] = Default::default();
            for slot in outputs.iter_mut().take(out_count) {
                *slot = self.pool.try_allocate();
            }

            kind.update(&mut inputs[..in_count], &mut outputs[..out_count]);
            // Unconsumed input handles release here.
            drop(inputs);

            for (port, out) in outputs.iter_mut().enumerate().take(out_count) {
                if let Some(block) = out.take() {
                    let shared = block.into_shared();
                    for ci in 0..self.connection_count {
                        let Some(c) = self.connections[ci] else {
                            continue;
                        };
                        if c.src as usize == idx && c.src_port as usize == port {
                            Self::deliver(
                                &mut self.input_slots[c.dst as usize][c.dst_port as usize],
                                shared.clone(),
                            );
                        }
                    }
                    // `shared` drops here; with no consumer the block
                    // goes straight back to the pool.
                }
            }

            self.nodes[idx] = Some(kind);
        }

        self.profiler.end_tick(started);
        self.running.store(false, Ordering::Release);
        Ok(())
    }

    /// Place a routed block into a destination input slot.
    ///
    /// An occupied slot means the input sums (`connect` enforces that):
    /// the contributions merge with saturating addition into a
    /// copy-on-write block. If the pool cannot supply the copy, the new
    /// contribution is dropped for this tick and the earlier one stands.
    fn deliver(slot: &mut Option<AudioBlockRef>, block: AudioBlockRef) {
        match slot.take() {
            None => *slot = Some(block),
            Some(existing) => match block.into_mut() {
                Some(mut sum) => {
                    block_accumulate(&mut sum, &existing);
                    *slot = Some(sum.into_shared());
                }
                None => *slot = Some(existing),
            },
        }
    }

    fn kind_at(&self, index: u8) -> Result<&NodeKind, ConfigError> {
        self.nodes[index as usize]
            .as_ref()
            .ok_or(ConfigError::UnknownNode)
    }

    /// Rebuild `order` with Kahn's algorithm over the connection table.
    ///
    /// Always picks the lowest-index ready node, so independent nodes
    /// keep their registration order. Failing to make progress means
    /// the table contains a cycle.
    fn recompute_order(&mut self) -> Result<(), ConfigError> {
        let mut in_degree = [0u8; MAX_NODES];
        for c in self.connections.iter().flatten() {
            in_degree[c.dst as usize] += 1;
        }

        let mut placed = [false; MAX_NODES];
        let mut order = [0u8; MAX_NODES];
        for position in 0..self.node_count {
            let mut ready = None;
            for (i, done) in placed.iter().enumerate().take(self.node_count) {
                if !done && in_degree[i] == 0 {
                    ready = Some(i);
                    break;
                }
            }
            let Some(i) = ready else {
                return Err(ConfigError::CycleDetected);
            };
            placed[i] = true;
            order[position] = i as u8;
            for c in self.connections.iter().flatten() {
                if c.src as usize == i {
                    in_degree[c.dst as usize] -= 1;
                }
            }
        }
        self.order = order;
        Ok(())
    }

    /// Pretend a tick walk is in flight. Lets tests exercise the
    /// overrun path without an interrupt.
    #[cfg(test)]
    pub(crate) fn force_running(&self) {
        self.running.store(true, Ordering::Release);
    }
}
