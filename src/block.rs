use std::mem;

/// Size rounding granularity, and the smallest payload a block can hold.
///
/// Requested sizes are rounded up to a multiple of this value, and a split
/// never produces a free block with a smaller payload. Handing out a block
/// that is slightly too large beats leaving behind a sliver nothing can use.
pub const MIN_BLOCK_SIZE: usize = 16;

/// Overhead introduced by the header that precedes every payload.
pub const HEADER_SIZE: usize = mem::size_of::<Header>();

/// Sentinel for "no block". Offset `0` is the chain head, so the missing
/// link needs an out-of-band marker.
pub(crate) const NIL: usize = usize::MAX;

/// Canary written into every live header. Checked whenever a caller hands a
/// handle back in, and wiped when a merge absorbs the header, so a stale or
/// double-released handle fails loudly instead of corrupting the chain.
pub(crate) const BLOCK_TAG: usize = 0xB10C_A110;

/// Block metadata, embedded in the pool region immediately before the bytes
/// it describes:
///
/// ```text
/// +---------------------+ <------+
/// |        size         |        |
/// +---------------------+        |
/// |       is_free       |        | -> Header
/// +---------------------+        |
/// |     next,  tag      |        |
/// +---------------------+ <------+
/// |       Payload       |        |
/// |         ...         |        | -> size bytes owned by the caller
/// |                     |        |
/// +---------------------+ <------+
/// ```
///
/// Headers form a singly-linked, address-ascending chain that partitions the
/// whole region: every byte belongs to exactly one block, free or used, and
/// the block after the one at offset `o` always starts at
/// `o + HEADER_SIZE + size`. There is no backward link; finding a
/// predecessor means walking from the head.
#[repr(C)]
pub(crate) struct Header {
    /// Usable payload size in bytes. The header itself is not counted.
    pub size: usize,
    /// Whether the payload is available for allocation.
    pub is_free: bool,
    /// Offset of the next header in address order, [`NIL`] for the last one.
    pub next: usize,
    /// [`BLOCK_TAG`] while this header is part of the chain.
    pub tag: usize,
}

impl Header {
    /// Forward link, with the sentinel resolved away.
    pub fn next(&self) -> Option<usize> {
        (self.next != NIL).then_some(self.next)
    }
}
