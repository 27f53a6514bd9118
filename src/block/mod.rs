//! Audio block memory: fixed-capacity pool and refcounted block handles.
//!
//! Every sample buffer in the graph is a 128-sample `i16` block owned by an
//! [`AudioBlockPool`]. Producers hold an exclusive [`AudioBlockMut`] while
//! writing; publishing converts it to a shared [`AudioBlockRef`] whose clone
//! count reflects fan-out. A block is mutable only while exactly one handle
//! exists; [`AudioBlockRef::into_mut`] reclaims exclusivity in place when
//! possible and copies otherwise.

mod handle;
mod pool;

pub use handle::{AudioBlockMut, AudioBlockRef};
pub use pool::AudioBlockPool;
