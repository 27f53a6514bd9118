use core::cell::UnsafeCell;
use core::mem::MaybeUninit;
use core::sync::atomic::{AtomicU32, AtomicU8, Ordering};

use crate::constants::{AUDIO_BLOCK_SAMPLES, POOL_MAX_BLOCKS};

use super::handle::AudioBlockMut;

/// Raw audio block storage: 128 signed 16-bit samples, 4-byte aligned.
#[repr(C, align(4))]
pub struct AudioBlockData {
    pub samples: [i16; AUDIO_BLOCK_SAMPLES],
}

impl AudioBlockData {
    /// Create a zeroed audio block.
    const fn zeroed() -> Self {
        AudioBlockData {
            samples: [0i16; AUDIO_BLOCK_SAMPLES],
        }
    }
}

/// Lock-free pool allocator for audio blocks.
///
/// Uses an atomic bitmap to track which slots are allocated, and per-slot
/// atomic reference counts for shared ownership. All operations are lock-free
/// and ISR-safe.
///
/// The constructor is `const`, so the application places its pool in a
/// `static` and sizes it once ("audio memory" budget):
///
/// ```ignore
/// static POOL: AudioBlockPool = AudioBlockPool::new(24);
/// ```
///
/// Capacity is clamped to `1..=POOL_MAX_BLOCKS`. Usage counters
/// ([`usage`](Self::usage), [`usage_max`](Self::usage_max),
/// [`alloc_failures`](Self::alloc_failures)) are readable from any context
/// and feed the usage profiler.
pub struct AudioBlockPool {
    /// Bitmap: bit N = 1 means slot N is allocated.
    bitmap: AtomicU32,
    /// Bits 0..capacity set; allocation never claims a slot outside it.
    capacity_mask: u32,
    /// Configured capacity in blocks.
    capacity: u32,
    /// Highest concurrently-live block count observed.
    high_water: AtomicU32,
    /// Number of allocation requests that found the pool exhausted.
    failed_allocs: AtomicU32,
    /// Per-slot reference counts.
    refcounts: [AtomicU8; POOL_MAX_BLOCKS],
    /// Block storage.
    storage: UnsafeCell<[MaybeUninit<AudioBlockData>; POOL_MAX_BLOCKS]>,
}

// SAFETY: The pool uses atomic operations for all shared state.
// The UnsafeCell<storage> is only accessed through slot indices that are
// exclusively owned (via bitmap allocation) or shared (via refcount).
unsafe impl Sync for AudioBlockPool {}

impl AudioBlockPool {
    /// Create a new pool with the given capacity in blocks. All slots start
    /// unallocated. Capacity is clamped to `1..=POOL_MAX_BLOCKS`.
    #[allow(clippy::declare_interior_mut_const)]
    pub const fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            1
        } else if capacity > POOL_MAX_BLOCKS {
            POOL_MAX_BLOCKS
        } else {
            capacity
        };
        let capacity_mask = if capacity == POOL_MAX_BLOCKS {
            u32::MAX
        } else {
            (1u32 << capacity) - 1
        };
        const ZERO_REFCOUNT: AtomicU8 = AtomicU8::new(0);
        AudioBlockPool {
            bitmap: AtomicU32::new(0),
            capacity_mask,
            capacity: capacity as u32,
            high_water: AtomicU32::new(0),
            failed_allocs: AtomicU32::new(0),
            refcounts: [ZERO_REFCOUNT; POOL_MAX_BLOCKS],
            storage: UnsafeCell::new(unsafe {
                MaybeUninit::<[MaybeUninit<AudioBlockData>; POOL_MAX_BLOCKS]>::zeroed()
                    .assume_init()
            }),
        }
    }

    /// Allocate a zero-filled block with reference count 1.
    ///
    /// Returns `None` when the pool is exhausted; the failure is counted but
    /// never panics or blocks. Callers substitute silence for the tick.
    pub fn try_allocate(&'static self) -> Option<AudioBlockMut> {
        self.alloc().map(|slot| AudioBlockMut::new(self, slot))
    }

    /// Allocate a slot from the pool. Returns the slot index, or `None` if
    /// every slot within the configured capacity is taken.
    pub(crate) fn alloc(&self) -> Option<u8> {
        loop {
            let bitmap = self.bitmap.load(Ordering::Acquire);
            let free = !bitmap & self.capacity_mask;
            if free == 0 {
                self.failed_allocs.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            let slot = free.trailing_zeros();
            let bit = 1u32 << slot;
            // Try to claim this slot
            match self.bitmap.compare_exchange_weak(
                bitmap,
                bitmap | bit,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    // Slot claimed — initialize it
                    self.refcounts[slot as usize].store(1, Ordering::Release);
                    // Zero the block data
                    let storage = self.storage.get();
                    // SAFETY: We just exclusively claimed this slot via the bitmap CAS.
                    unsafe {
                        let block_ptr = (*storage)[slot as usize].as_mut_ptr();
                        (*block_ptr) = AudioBlockData::zeroed();
                    }
                    let live = (bitmap | bit).count_ones();
                    self.high_water.fetch_max(live, Ordering::AcqRel);
                    return Some(slot as u8);
                }
                Err(_) => continue, // another core/ISR raced us, retry
            }
        }
    }

    /// Increment the reference count for a slot (used by `AudioBlockRef::clone`).
    ///
    /// # Panics
    /// Debug-asserts that the slot is currently allocated and refcount won't overflow.
    pub(crate) fn inc_ref(&self, slot: u8) {
        debug_assert!((slot as usize) < POOL_MAX_BLOCKS);
        let old = self.refcounts[slot as usize].fetch_add(1, Ordering::AcqRel);
        debug_assert!(old > 0, "inc_ref on unallocated slot");
        debug_assert!(old < 255, "refcount overflow");
    }

    /// Decrement the reference count for a slot. If it reaches zero, the slot
    /// is deallocated (bitmap bit cleared).
    pub(crate) fn dec_ref(&self, slot: u8) {
        debug_assert!((slot as usize) < POOL_MAX_BLOCKS);
        let old = self.refcounts[slot as usize].fetch_sub(1, Ordering::AcqRel);
        debug_assert!(old > 0, "dec_ref on slot with refcount 0");
        if old == 1 {
            // Refcount went from 1 to 0 — deallocate
            let bit = 1u32 << (slot as u32);
            self.bitmap.fetch_and(!bit, Ordering::Release);
        }
    }

    /// Get the current reference count for a slot.
    pub(crate) fn refcount(&self, slot: u8) -> u8 {
        self.refcounts[slot as usize].load(Ordering::Acquire)
    }

    /// Get a pointer to the block data for a given slot.
    ///
    /// # Safety
    /// Caller must ensure the slot is currently allocated.
    pub(crate) unsafe fn data_ptr(&self, slot: u8) -> *mut AudioBlockData {
        let storage = self.storage.get();
        unsafe { (*storage)[slot as usize].as_mut_ptr() }
    }

    /// Configured capacity in blocks.
    pub fn capacity(&self) -> usize {
        self.capacity as usize
    }

    /// Number of currently allocated blocks.
    pub fn usage(&self) -> usize {
        self.bitmap.load(Ordering::Acquire).count_ones() as usize
    }

    /// Maximum concurrently-allocated block count observed since the last
    /// [`reset_usage_max`](Self::reset_usage_max).
    pub fn usage_max(&self) -> usize {
        self.high_water.load(Ordering::Acquire) as usize
    }

    /// Reset the high-water mark to the current usage.
    pub fn reset_usage_max(&self) {
        self.high_water
            .store(self.bitmap.load(Ordering::Acquire).count_ones(), Ordering::Release);
    }

    /// Number of allocation requests that failed because the pool was full.
    pub fn alloc_failures(&self) -> u32 {
        self.failed_allocs.load(Ordering::Relaxed)
    }

    /// Reset the pool to its initial state. For testing only.
    #[cfg(test)]
    pub(crate) fn reset(&self) {
        self.bitmap.store(0, Ordering::Release);
        self.high_water.store(0, Ordering::Release);
        self.failed_allocs.store(0, Ordering::Release);
        for rc in &self.refcounts {
            rc.store(0, Ordering::Release);
        }
    }
}

#[cfg(test)]
impl AudioBlockPool {
    /// Leak a fresh pool so handles get the `&'static` they need on hardware.
    pub(crate) fn new_leaked(capacity: usize) -> &'static Self {
        Box::leak(Box::new(AudioBlockPool::new(capacity)))
    }
}
