use std::{fmt, ptr, ptr::NonNull, slice};

use log::{debug, trace};

use crate::{
    block::{BLOCK_TAG, HEADER_SIZE, Header, MIN_BLOCK_SIZE, NIL},
    kernel,
    utils::align,
};

/// Opaque reference to a live allocation: the byte offset of the payload
/// inside the pool region. Only the pool that produced a handle can resolve
/// it, through [`Pool::payload`] and [`Pool::payload_mut`], and there is no
/// public constructor, so a handle cannot be forged out of thin air.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Handle(pub(crate) usize);

/// Failure of an allocation request. The pool is left exactly as it was
/// before the failing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    /// Zero-sized request.
    InvalidSize,
    /// No free block can satisfy the request.
    OutOfMemory,
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::InvalidSize => write!(f, "requested size is invalid"),
            AllocError::OutOfMemory => write!(f, "no free block fits the requested size"),
        }
    }
}

impl std::error::Error for AllocError {}

/// Fixed-capacity allocator over one contiguous byte region.
///
/// The region is carved into blocks, each described by a header placed
/// immediately before its payload. Free and used blocks together always
/// cover the whole region:
///
/// ```text
/// +--------+---------+--------+--------------+--------+---------------+
/// | Header | Payload | Header |   Payload    | Header |    Payload    |
/// | (used) |         | (free) |              | (used) |               |
/// +--------+---------+--------+--------------+--------+---------------+
/// 0 ------------------------ address order ----------------- capacity
/// ```
///
/// Allocation is first-fit with an eager split of the leftover; release
/// eagerly merges with both neighbors, so no two adjacent free blocks ever
/// survive a [`Pool::free`]. All operations are plain linear scans of the
/// chain; there is no I/O and nothing ever blocks.
///
/// A `Pool` is an ordinary value: callers may create as many independent
/// pools as they want, and dropping one returns its region to the operating
/// system. It can move between threads but offers no interior locking;
/// concurrent access requires an external mutex around the whole pool.
///
/// ```
/// use mempool::Pool;
///
/// let mut pool = Pool::new(1024);
///
/// let block = pool.alloc(100).unwrap();
/// pool.payload_mut(block)[..5].copy_from_slice(b"hello");
/// assert_eq!(&pool.payload(block)[..5], b"hello");
///
/// pool.free(Some(block));
/// ```
pub struct Pool {
    /// Base address of the region. The chain head lives at offset 0 for the
    /// whole lifetime of the pool.
    base: NonNull<u8>,
    /// Total region size in bytes, headers included.
    capacity: usize,
}

// The region is owned exclusively; nothing aliases it from outside.
unsafe impl Send for Pool {}

impl Pool {
    /// Acquires a `capacity` byte region from the operating system and
    /// installs a single free block covering all of it.
    ///
    /// # Panics
    ///
    /// Panics if the platform refuses the region (the process has no arena
    /// to work with, nothing can be recovered), or if `capacity` cannot
    /// hold even one minimal block.
    pub fn new(capacity: usize) -> Self {
        assert!(
            capacity >= HEADER_SIZE + MIN_BLOCK_SIZE,
            "pool capacity {capacity} cannot hold a single block (minimum {})",
            HEADER_SIZE + MIN_BLOCK_SIZE,
        );

        let base = unsafe { kernel::request_memory(capacity) }
            .unwrap_or_else(|| panic!("system refused a {capacity} byte region"));

        let mut pool = Self { base, capacity };
        pool.install_header(0, Header {
            size: capacity - HEADER_SIZE,
            is_free: true,
            next: NIL,
            tag: BLOCK_TAG,
        });

        debug!("pool initialized with capacity {capacity}");
        pool
    }

    /// Total region size in bytes, headers included.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Reserves a block with at least `size` usable bytes.
    ///
    /// The request is rounded up to a multiple of [`MIN_BLOCK_SIZE`] and
    /// served by the first free block in address order that fits; among
    /// equally fitting candidates the lowest-addressed one always wins.
    /// When the chosen block is large enough to leave a usable tail behind,
    /// the tail is split off as a new free block; otherwise the whole block
    /// is handed out and its payload stays larger than requested.
    pub fn alloc(&mut self, size: usize) -> Result<Handle, AllocError> {
        if size == 0 {
            return Err(AllocError::InvalidSize);
        }
        // Nothing above the region size can ever fit. This also keeps the
        // rounding below from overflowing.
        if size > self.capacity {
            return Err(AllocError::OutOfMemory);
        }

        let rounded = align(size, MIN_BLOCK_SIZE);

        let mut offset = Some(0);
        while let Some(current) = offset {
            let (fits, next) = {
                let header = self.header(current);
                (header.is_free && header.size >= rounded, header.next())
            };

            if fits {
                self.split(current, rounded);
                self.header_mut(current).is_free = false;

                trace!("allocated {rounded} bytes at offset {current}");
                return Ok(Handle(Self::payload_offset(current)));
            }
            offset = next;
        }

        debug!("no block fits a request for {size} bytes");
        Err(AllocError::OutOfMemory)
    }

    /// Returns the block behind `handle` to the pool and merges it with any
    /// free neighbor. `None` is accepted and ignored, mirroring `free(NULL)`.
    ///
    /// After this call no two adjacent blocks in the chain are both free.
    ///
    /// # Panics
    ///
    /// Panics if `handle` was not produced by this pool, references a block
    /// that was already released, or references a header that a merge has
    /// absorbed in the meantime.
    pub fn free(&mut self, handle: Option<Handle>) {
        let Some(handle) = handle else { return };

        let offset = self.checked_header_offset(handle);
        let header = self.header_mut(offset);
        assert!(!header.is_free, "double release of block at offset {offset}");
        header.is_free = true;

        trace!("released block at offset {offset}");

        self.merge_with_next(offset);
        self.merge_with_prev(offset);
    }

    /// Grows the block behind `handle` to at least `new_size` usable bytes,
    /// preserving its current payload. The returned handle may differ from
    /// the one passed in.
    ///
    /// `None` degrades to a plain [`Pool::alloc`]. A block that already
    /// covers `new_size` is returned unchanged; blocks are never shrunk.
    /// When the next block in the chain is free and large enough, it is
    /// absorbed in place and no bytes move. Otherwise the payload is copied
    /// into a freshly allocated block and the old one is released. If that
    /// fresh allocation fails, the old block is left intact and the error
    /// is returned, so a failed resize never loses data.
    ///
    /// # Panics
    ///
    /// Same contract violations as [`Pool::free`].
    pub fn resize(&mut self, handle: Option<Handle>, new_size: usize) -> Result<Handle, AllocError> {
        let Some(handle) = handle else {
            return self.alloc(new_size);
        };

        let offset = self.checked_header_offset(handle);
        let header = self.header(offset);
        assert!(!header.is_free, "resize of a released block at offset {offset}");

        let old_size = header.size;
        if old_size >= new_size {
            return Ok(handle);
        }

        if let Some(next) = header.next() {
            let next_header = self.header(next);
            if next_header.is_free && old_size + HEADER_SIZE + next_header.size >= new_size {
                self.merge_with_next(offset);
                trace!("grew block at offset {offset} in place");
                return Ok(handle);
            }
        }

        let fresh = self.alloc(new_size)?;
        unsafe {
            let old = self.base.as_ptr().add(handle.0);
            let new = self.base.as_ptr().add(fresh.0);
            // Distinct blocks of the same chain; old_size is smaller than
            // the fresh payload on this path.
            ptr::copy_nonoverlapping(old, new, old_size);
        }
        self.free(Some(handle));

        trace!("moved block at offset {offset} to offset {}", fresh.0 - HEADER_SIZE);
        Ok(fresh)
    }

    /// Read access to a block's payload, all `size` bytes of it.
    ///
    /// # Panics
    ///
    /// Same contract violations as [`Pool::free`].
    pub fn payload(&self, handle: Handle) -> &[u8] {
        let offset = self.checked_header_offset(handle);
        let header = self.header(offset);
        assert!(!header.is_free, "payload access to released block at offset {offset}");

        unsafe { slice::from_raw_parts(self.base.as_ptr().add(handle.0), header.size) }
    }

    /// Write access to a block's payload.
    ///
    /// # Panics
    ///
    /// Same contract violations as [`Pool::free`].
    pub fn payload_mut(&mut self, handle: Handle) -> &mut [u8] {
        let offset = self.checked_header_offset(handle);
        let header = self.header(offset);
        assert!(!header.is_free, "payload access to released block at offset {offset}");
        let size = header.size;

        unsafe { slice::from_raw_parts_mut(self.base.as_ptr().add(handle.0), size) }
    }

    /// Address-ordered view of every block in the chain, free and used.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            pool: self,
            offset: Some(0),
        }
    }

    /// Resolves a caller handle to its header offset, verifying the canary.
    ///
    /// Panics when the handle cannot belong to this pool or its header has
    /// been absorbed by a merge since the handle was produced.
    fn checked_header_offset(&self, handle: Handle) -> usize {
        let Handle(payload) = handle;
        assert!(
            payload >= HEADER_SIZE && payload < self.capacity && payload % MIN_BLOCK_SIZE == 0,
            "handle {payload:#x} does not belong to this pool",
        );

        let offset = payload - HEADER_SIZE;
        assert_eq!(
            self.header(offset).tag,
            BLOCK_TAG,
            "handle {payload:#x} does not reference a live block",
        );

        offset
    }

    /// Carves the tail of the free block at `offset` into a new free block,
    /// provided the leftover can hold a header plus a minimal payload. A
    /// block with a smaller leftover keeps its full size.
    fn split(&mut self, offset: usize, rounded: usize) {
        let (size, next) = {
            let header = self.header(offset);
            (header.size, header.next)
        };

        let Some(remainder) = (size - rounded).checked_sub(HEADER_SIZE) else {
            return;
        };
        if remainder < MIN_BLOCK_SIZE {
            return;
        }

        let tail = Self::payload_offset(offset) + rounded;
        self.install_header(tail, Header {
            size: remainder,
            is_free: true,
            next,
            tag: BLOCK_TAG,
        });

        let header = self.header_mut(offset);
        header.size = rounded;
        header.next = tail;
    }

    /// Absorbs the block following `offset` when it is free. O(1), the
    /// forward link is direct.
    fn merge_with_next(&mut self, offset: usize) {
        let Some(next) = self.header(offset).next() else {
            return;
        };
        if !self.header(next).is_free {
            return;
        }

        let (next_size, next_next) = {
            let absorbed = self.header_mut(next);
            // Dead metadata now; the canary must not validate stale handles.
            absorbed.tag = 0;
            (absorbed.size, absorbed.next)
        };

        let header = self.header_mut(offset);
        header.size += HEADER_SIZE + next_size;
        header.next = next_next;
    }

    /// Absorbs the block at `offset` into its predecessor when that one is
    /// free. The chain has no backward links, so the predecessor comes from
    /// an O(n) walk starting at the head.
    fn merge_with_prev(&mut self, offset: usize) {
        if offset == 0 {
            return;
        }

        let mut current = 0;
        loop {
            match self.header(current).next() {
                Some(next) if next == offset => break,
                Some(next) => current = next,
                None => return,
            }
        }

        if !self.header(current).is_free {
            return;
        }

        let (size, next) = {
            let absorbed = self.header_mut(offset);
            absorbed.tag = 0;
            (absorbed.size, absorbed.next)
        };

        let previous = self.header_mut(current);
        previous.size += HEADER_SIZE + size;
        previous.next = next;
    }

    /// Header accessor for the block starting at `offset`.
    ///
    /// Offsets of non-terminal blocks are multiples of [`MIN_BLOCK_SIZE`]
    /// (the head sits at 0 and splits only ever carve at rounded sizes), so
    /// the reference is always aligned.
    fn header(&self, offset: usize) -> &Header {
        debug_assert!(offset + HEADER_SIZE <= self.capacity);
        unsafe { &*self.base.as_ptr().add(offset).cast::<Header>() }
    }

    fn header_mut(&mut self, offset: usize) -> &mut Header {
        debug_assert!(offset + HEADER_SIZE <= self.capacity);
        unsafe { &mut *self.base.as_ptr().add(offset).cast::<Header>() }
    }

    /// Writes a header into bytes that were not a header before (the region
    /// base at construction, the split point of a carved block), so a plain
    /// store, not an assignment through a reference.
    fn install_header(&mut self, offset: usize, header: Header) {
        debug_assert!(offset + HEADER_SIZE <= self.capacity);
        unsafe { self.base.as_ptr().add(offset).cast::<Header>().write(header) }
    }

    /// Offset of the payload belonging to the header at `offset`.
    fn payload_offset(offset: usize) -> usize {
        offset + HEADER_SIZE
    }
}

impl Drop for Pool {
    fn drop(&mut self) {
        debug!("returning the {} byte pool region", self.capacity);
        unsafe { kernel::return_memory(self.base.as_ptr(), self.capacity) }
    }
}

/// One entry of [`Pool::blocks`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BlockInfo {
    /// Byte offset of the block's header inside the region.
    pub offset: usize,
    /// Usable payload size.
    pub size: usize,
    pub is_free: bool,
}

/// Iterator over the block chain in address order.
pub struct Blocks<'a> {
    pool: &'a Pool,
    offset: Option<usize>,
}

impl Iterator for Blocks<'_> {
    type Item = BlockInfo;

    fn next(&mut self) -> Option<BlockInfo> {
        let offset = self.offset?;
        let header = self.pool.header(offset);
        self.offset = header.next();

        Some(BlockInfo {
            offset,
            size: header.size,
            is_free: header.is_free,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Chain shape as (size, is_free) pairs, for whole-chain assertions.
    fn shapes(pool: &Pool) -> Vec<(usize, bool)> {
        pool.blocks().map(|block| (block.size, block.is_free)).collect()
    }

    /// Every byte of the region belongs to exactly one block.
    fn assert_partition(pool: &Pool) {
        let covered: usize = pool.blocks().map(|block| HEADER_SIZE + block.size).sum();
        assert_eq!(covered, pool.capacity());
    }

    fn assert_no_adjacent_free(pool: &Pool) {
        let mut previous_free = false;
        for block in pool.blocks() {
            assert!(
                !(previous_free && block.is_free),
                "adjacent free blocks at offset {}",
                block.offset,
            );
            previous_free = block.is_free;
        }
    }

    #[test]
    fn new_pool_is_one_free_block() {
        let pool = Pool::new(1024);

        assert_eq!(shapes(&pool), vec![(1024 - HEADER_SIZE, true)]);
        assert_partition(&pool);
    }

    #[test]
    #[should_panic(expected = "cannot hold a single block")]
    fn tiny_pool_is_rejected() {
        let _ = Pool::new(HEADER_SIZE);
    }

    #[test]
    fn alloc_rounds_up_to_granularity() {
        let mut pool = Pool::new(1024);

        let block = pool.alloc(1).unwrap();
        assert_eq!(pool.payload(block).len(), MIN_BLOCK_SIZE);

        let block = pool.alloc(17).unwrap();
        assert_eq!(pool.payload(block).len(), 2 * MIN_BLOCK_SIZE);

        assert_partition(&pool);
    }

    #[test]
    fn alloc_zero_is_rejected() {
        let mut pool = Pool::new(1024);

        assert_eq!(pool.alloc(0), Err(AllocError::InvalidSize));
        assert_eq!(shapes(&pool), vec![(1024 - HEADER_SIZE, true)]);
    }

    #[test]
    fn first_fit_prefers_address_order() {
        // Sized so the last allocation consumes the chain exactly.
        let mut pool = Pool::new(192 + 6 * HEADER_SIZE);

        let a = pool.alloc(64).unwrap();
        let _keep_1 = pool.alloc(16).unwrap();
        let b = pool.alloc(32).unwrap();
        let _keep_2 = pool.alloc(16).unwrap();
        let c = pool.alloc(48).unwrap();
        let _keep_3 = pool.alloc(16).unwrap();

        pool.free(Some(a));
        pool.free(Some(b));
        pool.free(Some(c));

        // Free blocks of sizes [64, 32, 48] in address order, kept apart by
        // the used 16-byte blocks. A best-fit would choose the exact 32.
        assert_eq!(
            shapes(&pool),
            vec![(64, true), (16, false), (32, true), (16, false), (48, true), (16, false)],
        );

        let chosen = pool.alloc(32).unwrap();
        assert_eq!(chosen, a);
        // Earliest sufficient block, handed out whole (remainder below the
        // split threshold).
        assert_eq!(pool.payload(chosen).len(), 64);

        assert_partition(&pool);
    }

    #[test]
    fn remainder_below_threshold_does_not_split() {
        // One free block of exactly rounded + HEADER_SIZE + 15 bytes.
        let mut pool = Pool::new(HEADER_SIZE + 32 + HEADER_SIZE + 15);

        let block = pool.alloc(32).unwrap();

        assert_eq!(shapes(&pool), vec![(32 + HEADER_SIZE + 15, false)]);
        assert_eq!(pool.payload(block).len(), 32 + HEADER_SIZE + 15);
        assert_partition(&pool);
    }

    #[test]
    fn remainder_at_threshold_splits() {
        // One byte more of leftover and the tail becomes its own block.
        let mut pool = Pool::new(HEADER_SIZE + 32 + HEADER_SIZE + 16);

        let block = pool.alloc(32).unwrap();

        assert_eq!(shapes(&pool), vec![(32, false), (16, true)]);
        assert_eq!(pool.payload(block).len(), 32);
        assert_partition(&pool);
        assert_no_adjacent_free(&pool);
    }

    #[test]
    fn round_trip_restores_chain_shape() {
        let mut pool = Pool::new(256);
        let initial = shapes(&pool);

        let block = pool.alloc(48).unwrap();
        pool.free(Some(block));
        assert_eq!(shapes(&pool), initial);

        // Same request again lands on the same block.
        assert_eq!(pool.alloc(48).unwrap(), block);
    }

    #[test]
    fn free_none_is_a_noop() {
        let mut pool = Pool::new(256);
        let initial = shapes(&pool);

        pool.free(None);

        assert_eq!(shapes(&pool), initial);
    }

    #[test]
    fn free_merges_forward() {
        let mut pool = Pool::new(512);

        let a = pool.alloc(16).unwrap();
        let b = pool.alloc(16).unwrap();
        let _c = pool.alloc(16).unwrap();

        pool.free(Some(b));
        // b sits between two used blocks; nothing merges yet.
        assert_eq!(shapes(&pool)[1], (16, true));

        pool.free(Some(a));
        // a absorbs b ahead of it.
        assert_eq!(
            shapes(&pool),
            vec![
                (16 + HEADER_SIZE + 16, true),
                (16, false),
                (512 - 4 * HEADER_SIZE - 48, true),
            ],
        );

        assert_partition(&pool);
        assert_no_adjacent_free(&pool);
    }

    #[test]
    fn free_merges_backward() {
        let mut pool = Pool::new(512);

        let a = pool.alloc(16).unwrap();
        let b = pool.alloc(16).unwrap();
        let c = pool.alloc(16).unwrap();

        pool.free(Some(a));
        pool.free(Some(b));
        // b is absorbed into a behind it.
        assert_eq!(
            shapes(&pool),
            vec![
                (16 + HEADER_SIZE + 16, true),
                (16, false),
                (512 - 4 * HEADER_SIZE - 48, true),
            ],
        );

        pool.free(Some(c));
        // c merges both ways; the pool collapses back to one free block.
        assert_eq!(shapes(&pool), vec![(512 - HEADER_SIZE, true)]);

        assert_partition(&pool);
    }

    #[test]
    fn failed_alloc_leaves_chain_untouched() {
        let mut pool = Pool::new(256);
        let _block = pool.alloc(64).unwrap();
        let before = shapes(&pool);

        assert_eq!(pool.alloc(1024), Err(AllocError::OutOfMemory));

        assert_eq!(shapes(&pool), before);
        assert_partition(&pool);
    }

    #[test]
    fn full_capacity_request_never_fits() {
        let mut pool = Pool::new(256);

        // Header overhead makes a capacity-sized payload impossible.
        assert_eq!(pool.alloc(256), Err(AllocError::OutOfMemory));

        // The pool stays initialized and usable.
        assert!(pool.alloc(64).is_ok());
        assert_partition(&pool);
    }

    #[test]
    fn resize_none_allocates() {
        let mut pool = Pool::new(256);

        let block = pool.resize(None, 48).unwrap();

        assert_eq!(pool.payload(block).len(), 48);
        assert_partition(&pool);
    }

    #[test]
    fn resize_within_current_size_returns_same_block() {
        let mut pool = Pool::new(256);
        let block = pool.alloc(64).unwrap();

        assert_eq!(pool.resize(Some(block), 16).unwrap(), block);
        assert_eq!(pool.payload(block).len(), 64);
    }

    #[test]
    fn resize_grows_in_place_when_next_is_free() {
        let mut pool = Pool::new(256);
        let block = pool.alloc(16).unwrap();
        pool.payload_mut(block)[..4].copy_from_slice(b"abcd");

        let grown = pool.resize(Some(block), 64).unwrap();

        assert_eq!(grown, block);
        // The free neighbor is absorbed whole.
        assert_eq!(pool.payload(grown).len(), 256 - HEADER_SIZE);
        assert_eq!(&pool.payload(grown)[..4], b"abcd");
        assert_partition(&pool);
    }

    #[test]
    fn resize_moves_and_preserves_content() {
        let mut pool = Pool::new(512);
        let block = pool.alloc(16).unwrap();
        let barrier = pool.alloc(16).unwrap();

        let pattern: Vec<u8> = (0..16).collect();
        pool.payload_mut(block).copy_from_slice(&pattern);
        pool.payload_mut(barrier).fill(0xEE);

        let moved = pool.resize(Some(block), 64).unwrap();

        assert_ne!(moved, block);
        assert!(pool.payload(moved).len() >= 64);
        assert_eq!(&pool.payload(moved)[..16], &pattern[..]);
        // The neighbor was not disturbed, and the old block went back to
        // the pool.
        assert!(pool.payload(barrier).iter().all(|&byte| byte == 0xEE));
        assert!(pool.blocks().next().unwrap().is_free);

        assert_partition(&pool);
        assert_no_adjacent_free(&pool);
    }

    #[test]
    fn failed_resize_keeps_old_block_intact() {
        // Room for exactly a 16 byte and an 80 byte block, nothing spare.
        let mut pool = Pool::new(2 * HEADER_SIZE + 96);
        let block = pool.alloc(16).unwrap();
        let _blocker = pool.alloc(80).unwrap();

        pool.payload_mut(block).fill(0x5A);
        let before = shapes(&pool);

        assert_eq!(pool.resize(Some(block), 64), Err(AllocError::OutOfMemory));

        assert_eq!(shapes(&pool), before);
        assert!(pool.payload(block).iter().all(|&byte| byte == 0x5A));
    }

    #[test]
    #[should_panic(expected = "double release")]
    fn double_free_panics() {
        let mut pool = Pool::new(256);
        let block = pool.alloc(16).unwrap();
        // Keeps the freed block from being merged away.
        let _barrier = pool.alloc(16).unwrap();

        pool.free(Some(block));
        pool.free(Some(block));
    }

    #[test]
    #[should_panic(expected = "does not reference a live block")]
    fn stale_handle_after_merge_panics() {
        let mut pool = Pool::new(256);
        let a = pool.alloc(16).unwrap();
        let b = pool.alloc(16).unwrap();

        pool.free(Some(a));
        // b's header is absorbed into a here.
        pool.free(Some(b));

        let _ = pool.payload(b);
    }

    #[test]
    fn payload_round_trips_bytes() {
        let mut pool = Pool::new(256);
        let block = pool.alloc(32).unwrap();

        for (index, byte) in pool.payload_mut(block).iter_mut().enumerate() {
            *byte = index as u8;
        }

        let read: Vec<u8> = pool.payload(block).to_vec();
        assert_eq!(read, (0..32).map(|value| value as u8).collect::<Vec<_>>());
    }

    #[test]
    fn mixed_workload_keeps_invariants() {
        let mut pool = Pool::new(4096);
        let mut live = Vec::new();

        for round in 1..=8 {
            live.push(pool.alloc(round * 16).unwrap());
        }
        // Free every other block, then everything, checking the chain at
        // each step.
        for handle in live.iter().step_by(2) {
            pool.free(Some(*handle));
            assert_partition(&pool);
            assert_no_adjacent_free(&pool);
        }
        for handle in live.iter().skip(1).step_by(2) {
            pool.free(Some(*handle));
            assert_partition(&pool);
            assert_no_adjacent_free(&pool);
        }

        assert_eq!(shapes(&pool), vec![(4096 - HEADER_SIZE, true)]);
    }
}
