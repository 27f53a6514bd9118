/// Number of 16-bit samples per audio block.
pub const AUDIO_BLOCK_SAMPLES: usize = 128;

/// Largest pool capacity a single allocation bitmap word can track.
pub const POOL_MAX_BLOCKS: usize = 32;

/// Audio sample rate in Hz (PIO-driven I2S clock on RP2040/RP2350).
pub const AUDIO_SAMPLE_RATE: f32 = 44_100.0;

/// Maximum number of nodes one graph can hold.
pub const MAX_NODES: usize = 32;

/// Maximum number of connections one graph can hold.
pub const MAX_CONNECTIONS: usize = 64;

/// Maximum input or output ports on a single node.
pub const MAX_PORTS: usize = 4;

/// Maximum FIR filter length in taps.
pub const FIR_MAX_TAPS: usize = 160;
