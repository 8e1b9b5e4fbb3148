//! Typed view over a raw node holding `RecordId` values.

use page_store::PageStore;

use crate::error::{IndexError, Result};
use crate::raw_node::{PageId, RawNode, INVALID_PID, Key};
use crate::record_id::RecordId;

/// A leaf page: an ordered `(key, RecordId)` array plus a `next_pid`
/// pointer chaining it to the next leaf in key order.
///
/// Wraps a `RawNode<RecordId>` image together with a `data_pid` cache —
/// the page id the image currently reflects, so a redundant `write` to
/// the same page can be elided when nothing changed.
pub struct LeafNode {
    raw: RawNode<RecordId>,
    data_pid: PageId,
}

impl LeafNode {
    /// A fresh, empty leaf not yet associated with any page.
    pub fn new() -> Self {
        let mut raw = RawNode::new();
        raw.set_leaf();
        Self {
            raw,
            data_pid: INVALID_PID,
        }
    }

    /// Wraps an already-loaded image known to be a leaf. Used by the tree
    /// driver when it has already read the page once to tell node kinds
    /// apart, so it doesn't need to read it again here.
    pub(crate) fn from_raw(raw: RawNode<RecordId>, pid: PageId) -> Self {
        Self { raw, data_pid: pid }
    }

    /// Loads page `pid`. `data_pid` is updated regardless of outcome, so a
    /// caller inspecting a `WrongNodeType` error still knows which page was
    /// read.
    pub fn read(&mut self, pid: PageId, store: &PageStore) -> Result<()> {
        self.raw = RawNode::read(pid, store)?;
        self.data_pid = pid;
        if !self.raw.is_leaf() {
            return Err(IndexError::WrongNodeType);
        }
        Ok(())
    }

    /// Persists to page `pid`. A no-op if the image already reflects `pid`
    /// and nothing has changed since.
    pub fn write(&mut self, pid: PageId, store: &PageStore) -> Result<()> {
        if self.data_pid == pid && !self.raw.is_dirty() {
            return Ok(());
        }
        self.raw.write(pid, store)?;
        self.data_pid = pid;
        Ok(())
    }

    /// The page id this image was last loaded from or written to.
    pub fn data_pid(&self) -> PageId {
        self.data_pid
    }

    pub fn insert(&mut self, key: Key, rid: RecordId) -> Result<()> {
        self.raw.insert_pair(key, rid)
    }

    /// Splits this overflowing leaf while inserting `(key, rid)`, moving the
    /// upper half into `sibling`. The caller owns page allocation: it must
    /// assign `sibling` a page id, wire `self.set_next_ptr(sibling_pid)`,
    /// and persist both nodes.
    pub fn insert_and_split(
        &mut self,
        key: Key,
        rid: RecordId,
        sibling: &mut LeafNode,
    ) -> Result<Key> {
        self.raw.insert_pair_and_split(key, rid, &mut sibling.raw)
    }

    /// Smallest `eid` in the valid prefix with `keys[eid] >= search_key`.
    /// `NoSuchRecord` if every key is smaller (the scan belongs on a later
    /// leaf, or past the end of the tree).
    pub fn locate(&self, search_key: Key) -> Result<usize> {
        let n = self.raw.pair_count() as usize;
        for i in 0..n {
            let (k, _) = self.raw.get_pair(i)?;
            if k >= search_key {
                return Ok(i);
            }
        }
        Err(IndexError::NoSuchRecord)
    }

    pub fn read_entry(&self, eid: usize) -> Result<(Key, RecordId)> {
        self.raw.get_pair(eid)
    }

    pub fn next_ptr(&self) -> PageId {
        self.raw.next_pid()
    }

    pub fn set_next_ptr(&mut self, pid: PageId) {
        self.raw.set_next_pid(pid);
    }

    pub fn key_count(&self) -> u16 {
        self.raw.pair_count()
    }

    pub fn is_full(&self) -> bool {
        self.raw.pair_count() as usize == crate::raw_node::DEGREE - 1
    }
}

impl Default for LeafNode {
    fn default() -> Self {
        Self::new()
    }
}
