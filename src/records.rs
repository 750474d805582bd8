use std::{mem, ptr};

use log::warn;

use crate::{
    block::{HEADER_SIZE, MIN_BLOCK_SIZE, NIL},
    pool::{AllocError, Handle, Pool},
    utils::align,
};

/// Storage footprint of one list node inside the pool.
pub const RECORD_SIZE: usize = mem::size_of::<Record>();

/// Fixed-width list node, written into the payload of one pool block.
#[derive(Clone, Copy)]
#[repr(C)]
struct Record {
    value: u16,
    /// Payload offset of the next record, [`NIL`] at the tail.
    next: usize,
}

/// Singly-linked list of `u16` records whose nodes live inside a [`Pool`].
///
/// This is a plain consumer of the allocator: one `alloc` per insertion, one
/// `free` per removal, and nothing else. When the pool runs out the
/// insertion is rejected with an error the caller can act on; the list never
/// panics over a full pool.
///
/// ```
/// use mempool::RecordList;
///
/// let mut list = RecordList::new(8);
/// list.insert(1).unwrap();
/// list.insert(2).unwrap();
/// list.remove(1);
///
/// assert_eq!(list.iter().collect::<Vec<_>>(), vec![2]);
/// ```
pub struct RecordList {
    pool: Pool,
    head: Option<Handle>,
    len: usize,
}

impl RecordList {
    /// Creates a list backed by a pool sized for exactly `record_count`
    /// nodes: each one costs a block header plus one record payload.
    ///
    /// # Panics
    ///
    /// Panics when `record_count` is zero (the pool cannot be empty).
    pub fn new(record_count: usize) -> Self {
        // One node consumes a header plus a granularity-rounded record.
        let node_size = align(RECORD_SIZE, MIN_BLOCK_SIZE) + HEADER_SIZE;

        Self {
            pool: Pool::new(record_count * node_size),
            head: None,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Appends `value` at the tail of the list.
    ///
    /// A full pool is a recoverable condition: the error is returned and
    /// the list is left unchanged.
    pub fn insert(&mut self, value: u16) -> Result<(), AllocError> {
        let node = self.alloc_record(value, NIL)?;

        match self.tail() {
            None => self.head = Some(node),
            Some(tail) => {
                let record = self.record(tail);
                self.write_record(tail, Record { next: link(node), ..record });
            }
        }

        self.len += 1;
        Ok(())
    }

    /// Splices `value` in after the first node holding `after`. Returns
    /// `Ok(false)` when no such node exists; nothing is allocated then.
    pub fn insert_after(&mut self, after: u16, value: u16) -> Result<bool, AllocError> {
        let Some(cursor) = self.find_node(after) else {
            return Ok(false);
        };

        let cursor_record = self.record(cursor);
        let node = self.alloc_record(value, cursor_record.next)?;
        self.write_record(cursor, Record { next: link(node), ..cursor_record });

        self.len += 1;
        Ok(true)
    }

    /// Unlinks the first node holding `value` and returns its block to the
    /// pool. Returns whether a node was removed.
    pub fn remove(&mut self, value: u16) -> bool {
        let mut previous: Option<Handle> = None;
        let mut current = self.head;

        while let Some(node) = current {
            let record = self.record(node);
            if record.value == value {
                match previous {
                    None => self.head = unlink(record.next),
                    Some(previous) => {
                        let previous_record = self.record(previous);
                        self.write_record(previous, Record { next: record.next, ..previous_record });
                    }
                }

                self.pool.free(Some(node));
                self.len -= 1;
                return true;
            }

            previous = current;
            current = unlink(record.next);
        }

        false
    }

    /// Whether any node holds `value`.
    pub fn contains(&self, value: u16) -> bool {
        self.find_node(value).is_some()
    }

    /// The record values in list order.
    pub fn iter(&self) -> Values<'_> {
        Values {
            list: self,
            current: self.head,
        }
    }

    /// Removes every node, returning all blocks to the pool.
    pub fn clear(&mut self) {
        let mut current = self.head.take();
        while let Some(node) = current {
            current = unlink(self.record(node).next);
            self.pool.free(Some(node));
        }
        self.len = 0;
    }

    /// Allocates one node and writes its record. Allocation failure is
    /// reported, never escalated.
    fn alloc_record(&mut self, value: u16, next: usize) -> Result<Handle, AllocError> {
        let node = match self.pool.alloc(RECORD_SIZE) {
            Ok(node) => node,
            Err(error) => {
                warn!("record insert rejected: {error}");
                return Err(error);
            }
        };

        self.write_record(node, Record { value, next });
        Ok(node)
    }

    fn find_node(&self, value: u16) -> Option<Handle> {
        let mut current = self.head;
        while let Some(node) = current {
            let record = self.record(node);
            if record.value == value {
                return Some(node);
            }
            current = unlink(record.next);
        }
        None
    }

    /// Last node of the list, reached by walking from the head.
    fn tail(&self) -> Option<Handle> {
        let mut current = self.head?;
        loop {
            match unlink(self.record(current).next) {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
    }

    fn record(&self, node: Handle) -> Record {
        let payload = self.pool.payload(node);
        unsafe { ptr::read_unaligned(payload.as_ptr().cast::<Record>()) }
    }

    fn write_record(&mut self, node: Handle, record: Record) {
        let payload = self.pool.payload_mut(node);
        unsafe { ptr::write_unaligned(payload.as_mut_ptr().cast::<Record>(), record) }
    }
}

fn link(node: Handle) -> usize {
    let Handle(offset) = node;
    offset
}

fn unlink(raw: usize) -> Option<Handle> {
    (raw != NIL).then_some(Handle(raw))
}

/// Iterator over the record values, front to back.
pub struct Values<'a> {
    list: &'a RecordList,
    current: Option<Handle>,
}

impl Iterator for Values<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        let node = self.current?;
        let record = self.list.record(node);
        self.current = unlink(record.next);

        Some(record.value)
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = u16;
    type IntoIter = Values<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
