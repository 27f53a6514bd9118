use core::ops::{Deref, DerefMut};

use crate::constants::AUDIO_BLOCK_SAMPLES;

use super::pool::AudioBlockPool;

/// Exclusive (mutable) handle to an audio block in a pool.
///
/// There is exactly one `AudioBlockMut` per allocated slot.
/// Provides `DerefMut` access to the underlying `[i16; 128]` samples.
/// Dropping an `AudioBlockMut` decrements the refcount (and frees the slot if
/// it reaches zero). The handle remembers which pool it came from, so blocks
/// from different pools can coexist.
pub struct AudioBlockMut {
    pool: &'static AudioBlockPool,
    slot: u8,
}

impl core::fmt::Debug for AudioBlockMut {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AudioBlockMut").field("slot", &self.slot).finish()
    }
}

impl AudioBlockMut {
    /// Create a new `AudioBlockMut` for the given pool slot.
    ///
    /// The caller must ensure the slot was just allocated with refcount = 1
    /// and no other `AudioBlockMut` or `AudioBlockRef` exists for this slot.
    pub(crate) fn new(pool: &'static AudioBlockPool, slot: u8) -> Self {
        AudioBlockMut { pool, slot }
    }

    /// Convert this exclusive reference into a shared reference.
    /// This is a zero-cost conversion (no data copy, no refcount change).
    pub fn into_shared(self) -> AudioBlockRef {
        let pool = self.pool;
        let slot = self.slot;
        core::mem::forget(self); // don't run Drop (don't dec_ref)
        AudioBlockRef { pool, slot }
    }

    /// Get the pool slot index.
    pub fn slot(&self) -> u8 {
        self.slot
    }
}

impl Deref for AudioBlockMut {
    type Target = [i16; AUDIO_BLOCK_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: We hold exclusive access (refcount == 1, unique AudioBlockMut).
        unsafe { &(*self.pool.data_ptr(self.slot)).samples }
    }
}

impl DerefMut for AudioBlockMut {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: We hold exclusive access (refcount == 1, unique AudioBlockMut).
        unsafe { &mut (*self.pool.data_ptr(self.slot)).samples }
    }
}

impl Drop for AudioBlockMut {
    fn drop(&mut self) {
        self.pool.dec_ref(self.slot);
    }
}

/// Shared (immutable) handle to an audio block in a pool.
///
/// Multiple `AudioBlockRef`s can point to the same slot. Cloning increments the
/// refcount; dropping decrements it. When the last reference is dropped, the
/// pool slot is freed.
pub struct AudioBlockRef {
    pool: &'static AudioBlockPool,
    slot: u8,
}

impl AudioBlockRef {
    /// Get the pool slot index.
    pub fn slot(&self) -> u8 {
        self.slot
    }

    /// Try to convert back to an exclusive mutable reference.
    ///
    /// - If this is the only reference (refcount == 1), converts in place (no copy).
    /// - If there are other references, allocates a new block from the same
    ///   pool, copies the data, and returns the new exclusive block. Returns
    ///   `None` (releasing this reference) if the pool is exhausted.
    pub fn into_mut(self) -> Option<AudioBlockMut> {
        let refcount = self.pool.refcount(self.slot);
        if refcount == 1 {
            // We're the sole owner — convert in place
            let pool = self.pool;
            let slot = self.slot;
            core::mem::forget(self);
            Some(AudioBlockMut::new(pool, slot))
        } else {
            // Clone-on-write: allocate a new block and copy
            let new_slot = self.pool.alloc()?;
            unsafe {
                let src = &(*self.pool.data_ptr(self.slot)).samples;
                let dst = &mut (*self.pool.data_ptr(new_slot)).samples;
                *dst = *src;
            }
            let pool = self.pool;
            // Drop self (decrements refcount on old slot)
            drop(self);
            Some(AudioBlockMut::new(pool, new_slot))
        }
    }
}

impl Deref for AudioBlockRef {
    type Target = [i16; AUDIO_BLOCK_SAMPLES];

    fn deref(&self) -> &Self::Target {
        // SAFETY: Slot is allocated and data is immutable through shared references.
        unsafe { &(*self.pool.data_ptr(self.slot)).samples }
    }
}

impl Clone for AudioBlockRef {
    fn clone(&self) -> Self {
        self.pool.inc_ref(self.slot);
        AudioBlockRef {
            pool: self.pool,
            slot: self.slot,
        }
    }
}

impl Drop for AudioBlockRef {
    fn drop(&mut self) {
        self.pool.dec_ref(self.slot);
    }
}

#[cfg(test)]
mod tests {
    use super::super::pool::AudioBlockPool;

    #[test]
    fn alloc_and_drop() {
        let pool = AudioBlockPool::new_leaked(8);
        {
            let block = pool.try_allocate().unwrap();
            assert_eq!(pool.usage(), 1);
            assert_eq!(pool.refcount(block.slot()), 1);
        }
        assert_eq!(pool.usage(), 0);
    }

    #[test]
    fn write_and_read() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut block = pool.try_allocate().unwrap();
        block[0] = 1234;
        block[127] = -5678;
        assert_eq!(block[0], 1234);
        assert_eq!(block[127], -5678);
    }

    #[test]
    fn into_shared() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut block = pool.try_allocate().unwrap();
        block[0] = 42;
        let slot = block.slot();

        let shared = block.into_shared();
        assert_eq!(shared.slot(), slot);
        assert_eq!(shared[0], 42);
        assert_eq!(pool.refcount(slot), 1); // no extra ref
        assert_eq!(pool.usage(), 1);
    }

    #[test]
    fn shared_clone_and_drop() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut block = pool.try_allocate().unwrap();
        block[0] = 99;
        let slot = block.slot();
        let shared = block.into_shared();

        let shared2 = shared.clone();
        assert_eq!(pool.refcount(slot), 2);
        assert_eq!(shared2[0], 99);

        drop(shared);
        assert_eq!(pool.refcount(slot), 1);
        assert_eq!(pool.usage(), 1);

        drop(shared2);
        assert_eq!(pool.usage(), 0);
    }

    #[test]
    fn into_mut_sole_owner() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut block = pool.try_allocate().unwrap();
        block[0] = 77;
        let slot = block.slot();
        let shared = block.into_shared();

        // sole owner => convert in place
        let mut exclusive = shared.into_mut().unwrap();
        assert_eq!(exclusive.slot(), slot); // same slot
        assert_eq!(exclusive[0], 77);
        exclusive[0] = 88;
        assert_eq!(exclusive[0], 88);
    }

    #[test]
    fn into_mut_clone_on_write() {
        let pool = AudioBlockPool::new_leaked(8);
        let mut block = pool.try_allocate().unwrap();
        block[0] = 55;
        let slot = block.slot();
        let shared = block.into_shared();
        let shared2 = shared.clone();
        assert_eq!(pool.refcount(slot), 2);

        // multiple owners => clone-on-write
        let mut exclusive = shared.into_mut().unwrap();
        assert_ne!(exclusive.slot(), slot); // different slot (new allocation)
        assert_eq!(exclusive[0], 55); // data was copied
        exclusive[0] = 66;

        // Original shared ref is unaffected
        assert_eq!(shared2[0], 55);
        assert_eq!(pool.refcount(slot), 1); // old slot refcount decremented
    }

    #[test]
    fn into_mut_exhausted_pool_releases_ref() {
        let pool = AudioBlockPool::new_leaked(1);
        let shared = pool.try_allocate().unwrap().into_shared();
        let shared2 = shared.clone();

        // Copy-on-write needs a second slot; the pool has none.
        assert!(shared.into_mut().is_none());
        // The failed conversion released its reference.
        assert_eq!(pool.refcount(shared2.slot()), 1);
        assert_eq!(pool.alloc_failures(), 1);
    }
}
