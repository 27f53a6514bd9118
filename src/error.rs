//! Error types for graph configuration and tick execution.
//!
//! Configuration problems are rejected before the tick loop ever sees them;
//! the only runtime error a tick can surface is an overrun. Steady-state
//! conditions (pool exhaustion, empty queues, unread analyzers) are not
//! errors at this level: they degrade to silence or a documented default.

/// A graph or node configuration was rejected.
///
/// Returned by `add_node`/`connect` and by node `begin` methods. None of
/// these occur once the tick loop is running a validated graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The connection would close a cycle through the graph.
    CycleDetected,
    /// A node id does not refer to a node registered in this graph.
    UnknownNode,
    /// A source or destination port index is outside the node's port range.
    InvalidPort,
    /// The destination input already has a connection and does not sum.
    InputInUse,
    /// The graph's node table is full.
    TooManyNodes,
    /// The graph's connection table is full.
    TooManyConnections,
    /// An analyzer bin index is outside the valid range.
    BinOutOfRange,
    /// A coefficient set is empty or longer than the supported tap count.
    TooManyTaps,
    /// A buffer length, offset, depth or voice count is out of bounds.
    InvalidParameter,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::CycleDetected => write!(f, "connection would create a cycle"),
            ConfigError::UnknownNode => write!(f, "node id is not registered in this graph"),
            ConfigError::InvalidPort => write!(f, "port index out of range for node"),
            ConfigError::InputInUse => {
                write!(f, "destination input already connected and does not sum")
            }
            ConfigError::TooManyNodes => write!(f, "graph node table is full"),
            ConfigError::TooManyConnections => write!(f, "graph connection table is full"),
            ConfigError::BinOutOfRange => write!(f, "analyzer bin index out of range"),
            ConfigError::TooManyTaps => write!(f, "coefficient count out of range"),
            ConfigError::InvalidParameter => write!(f, "parameter out of bounds"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

/// A tick could not run to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickError {
    /// The tick fired again before the previous walk finished. The block
    /// period is too short for the graph's total work; the colliding tick
    /// is abandoned without touching in-flight block ownership.
    Overrun,
}

impl core::fmt::Display for TickError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            TickError::Overrun => write!(f, "tick re-entered before the previous walk finished"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TickError {}
