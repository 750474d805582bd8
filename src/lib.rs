//! Fixed-capacity pool allocator.
//!
//! A [`Pool`] owns one contiguous byte region, requested from the operating
//! system up front, and serves allocations out of it until it is dropped.
//! Block metadata lives inline, right before each payload:
//!
//! ```text
//! +--------------------------------+
//! | Header | Payload               |
//! +--------------------------------+
//! ```
//!
//! The headers chain every block of the region together in address order,
//! free and used alike, so the chain is a complete partition of the region.
//! Allocation walks that chain first-fit and splits off the unused tail of
//! the chosen block; release merges the freed block with both neighbors
//! right away, so fragmentation only ever comes from the allocation pattern
//! itself, never from the allocator declining to merge.
//!
//! Callers address their blocks through opaque [`Handle`] values (byte
//! offsets under the hood, not raw pointers) and reach the bytes with
//! [`Pool::payload`] / [`Pool::payload_mut`]. Every header carries a canary,
//! checked whenever a handle is presented, so double releases and stale
//! handles panic instead of silently corrupting the chain.
//!
//! [`RecordList`] is a small consumer of the allocator: a singly-linked
//! list of `u16` records that draws every node from its own pool and treats
//! a full pool as an ordinary rejected insert.

mod block;
mod kernel;
mod pool;
mod records;
mod utils;

pub use block::{HEADER_SIZE, MIN_BLOCK_SIZE};
pub use pool::{AllocError, BlockInfo, Blocks, Handle, Pool};
pub use records::{RECORD_SIZE, RecordList, Values};
