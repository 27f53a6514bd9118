//! # pico-audio
//!
//! A zero-allocation, block-based audio processing graph for the
//! RP2040/RP2350. A fixed set of nodes — synthesizers, effects,
//! analyzers, a mixer, an I2S sink — is wired into a directed graph at
//! startup and executed once per 128-sample block from the DMA
//! completion interrupt, with bounded latency and no heap use in
//! steady state.
//!
//! ## Architecture
//!
//! | Layer | Module | Purpose |
//! |-------|--------|---------|
//! | Memory | [`block`] | Fixed-capacity block pool with refcounted handles |
//! | Trait | [`node`] | The `AudioNode` per-tick contract |
//! | Graph | [`graph`] | Node registry, connections, update scheduler |
//! | DSP | [`dsp`] / [`nodes`] | Fixed-point math and the processing nodes |
//! | I/O | [`io`] | I2S sink, cross-core play queue |
//! | Diagnostics | [`profiler`] | Per-tick CPU usage, overrun counting |
//!
//! ## Quick start
//!
//! ```ignore
//! use pico_audio::block::AudioBlockPool;
//! use pico_audio::graph::AudioGraph;
//! use pico_audio::nodes::*;
//! use pico_audio::io::AudioOutputI2S;
//!
//! // The "audio memory" budget, fixed for the program's lifetime.
//! static POOL: AudioBlockPool = AudioBlockPool::new(16);
//!
//! let mut graph = AudioGraph::new(&POOL);
//! let osc = graph.add_node(AudioSynthWaveform::new())?;
//! let amp = graph.add_node(AudioAmplifier::new())?;
//! let out = graph.add_node(AudioOutputI2S::new(true))?;
//! graph.connect(osc, 0, amp, 0)?;
//! graph.connect(amp, 0, out, 0)?;   // left
//! graph.connect(amp, 0, out, 1)?;   // right
//!
//! graph.node_mut(osc).begin(0.8, 440.0, WaveformShape::Sine);
//! graph.node_mut(amp).gain(0.5);
//! graph.node_mut(out).begin();
//!
//! // From the DMA completion interrupt:
//! if graph.node_mut(out).isr(&mut dma_buffer) {
//!     let _ = graph.update_all();
//! }
//! ```
//!
//! ## Audio parameters
//!
//! - **Block size:** 128 samples ([`constants::AUDIO_BLOCK_SAMPLES`])
//! - **Sample rate:** 44 100 Hz ([`constants::AUDIO_SAMPLE_RATE`])
//! - **Sample format:** `i16`
//! - **Pool:** up to 32 blocks ([`constants::POOL_MAX_BLOCKS`]), sized
//!   per application at pool construction
//!
//! ## Features
//!
//! | Feature | Default | Enables |
//! |---------|---------|---------|
//! | `std` | yes | `std::error::Error` impls; disable for firmware |
//! | `tracing` | no | `tracing` events on the graph configuration path |

#![cfg_attr(not(feature = "std"), no_std)]

pub mod block;
pub mod constants;
pub mod dsp;
pub mod error;
pub mod graph;
pub mod io;
pub mod node;
pub mod nodes;
pub mod profiler;

pub use error::{ConfigError, TickError};
pub use graph::{AudioGraph, NodeId};
