//! Typed view over a raw node holding child page ids.

use page_store::PageStore;

use crate::error::Result;
use crate::raw_node::{Key, PageId, RawNode, DEGREE, INVALID_PID};

/// An internal page: `pair_count` separator keys, each paired with the
/// child that covers everything below it, plus one additional tail
/// pointer (`next_pid`) for the rightmost child — `pair_count + 1`
/// children total.
pub struct InternalNode {
    raw: RawNode<PageId>,
    data_pid: PageId,
}

impl InternalNode {
    /// A fresh, empty internal node not yet associated with any page.
    pub fn new() -> Self {
        let mut raw = RawNode::new();
        raw.set_non_leaf();
        Self {
            raw,
            data_pid: INVALID_PID,
        }
    }

    /// Builds a brand new root with a single separator key and the two
    /// children produced by splitting whatever used to be the root.
    pub fn initialize_root(left_pid: PageId, separator: Key, right_pid: PageId) -> Result<Self> {
        let mut node = Self::new();
        node.raw.insert_pair(separator, left_pid)?;
        node.raw.set_next_pid(right_pid);
        Ok(node)
    }

    /// Wraps an already-loaded image known to be an internal node. Used by
    /// the tree driver when it has already read the page once to tell node
    /// kinds apart, so it doesn't need to read it again here.
    pub(crate) fn from_raw(raw: RawNode<PageId>, pid: PageId) -> Self {
        Self { raw, data_pid: pid }
    }

    pub fn read(&mut self, pid: PageId, store: &PageStore) -> Result<()> {
        self.raw = RawNode::read(pid, store)?;
        self.data_pid = pid;
        if self.raw.is_leaf() {
            return Err(crate::error::IndexError::WrongNodeType);
        }
        Ok(())
    }

    pub fn write(&mut self, pid: PageId, store: &PageStore) -> Result<()> {
        if self.data_pid == pid && !self.raw.is_dirty() {
            return Ok(());
        }
        self.raw.write(pid, store)?;
        self.data_pid = pid;
        Ok(())
    }

    pub fn data_pid(&self) -> PageId {
        self.data_pid
    }

    /// The child page that covers `search_key`: the value of the first
    /// pair whose key is strictly greater than `search_key`, or the tail
    /// pointer if no such pair exists (search_key is at or past every
    /// separator, so the rightmost child owns it).
    pub fn locate_child_ptr(&self, search_key: Key) -> Result<PageId> {
        let n = self.raw.pair_count() as usize;
        for i in 0..n {
            let (k, v) = self.raw.get_pair(i)?;
            if search_key < k {
                return Ok(v);
            }
        }
        Ok(self.raw.next_pid())
    }

    /// Records a new child produced by a split one level down: `key` is
    /// the child's first key, `child_pid` its page id.
    pub fn insert(&mut self, key: Key, child_pid: PageId) -> Result<()> {
        if self.raw.will_be_inserted_at_end(key) {
            let old_next = self.raw.next_pid();
            self.raw.insert_pair(key, old_next)?;
            self.raw.set_next_pid(child_pid);
        } else {
            let j = self.raw.index_for_insert(key);
            let (old_key, old_pid) = self.raw.get_pair(j)?;
            self.raw.update_pair(old_key, child_pid)?;
            self.raw.insert_pair(key, old_pid)?;
        }
        Ok(())
    }

    pub fn is_full(&self) -> bool {
        self.raw.pair_count() as usize == DEGREE - 1
    }

    /// Splits this overflowing internal node while recording a new child
    /// (`key`, `child_pid`), moving the upper half into `sibling`. Returns
    /// the separator key promoted to the parent — `sibling`'s own page id
    /// is what the caller records alongside it, exactly like any other
    /// `insert`.
    ///
    /// The raw split hands the sibling a leading pair whose value actually
    /// belongs to *this* node (it covers the range that straddles the
    /// split point, which is `< key promoted`). That pair is consumed out
    /// of the sibling and its value becomes this node's new tail pointer,
    /// replacing the stale one the raw split copied over verbatim.
    pub fn insert_and_split(
        &mut self,
        key: Key,
        child_pid: PageId,
        sibling: &mut InternalNode,
    ) -> Result<Key> {
        let promoted_key = if self.raw.will_be_inserted_at_end(key) {
            let old_next = self.raw.next_pid();
            let promoted = self.raw.insert_pair_and_split(key, old_next, &mut sibling.raw)?;
            sibling.raw.set_next_pid(child_pid);
            promoted
        } else {
            self.raw.insert_pair_and_split(key, child_pid, &mut sibling.raw)?
        };

        let (consumed_key, consumed_value) = sibling.raw.remove_leading_pair()?;
        debug_assert_eq!(consumed_key, promoted_key);
        self.raw.set_next_pid(consumed_value);

        Ok(promoted_key)
    }

    pub fn key_count(&self) -> u16 {
        self.raw.pair_count()
    }
}

impl Default for InternalNode {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use page_store::OpenMode;
    use tempfile::NamedTempFile;

    fn open_store() -> (NamedTempFile, PageStore) {
        let file = NamedTempFile::new().unwrap();
        let store = PageStore::open(file.path(), OpenMode::ReadWrite).unwrap();
        (file, store)
    }

    #[test]
    fn locate_child_ptr_falls_through_to_tail() {
        let mut node = InternalNode::new();
        node.insert(10, 1).unwrap();
        node.insert(20, 2).unwrap();
        node.raw.set_next_pid(3);

        assert_eq!(node.locate_child_ptr(5).unwrap(), 1);
        assert_eq!(node.locate_child_ptr(15).unwrap(), 2);
        assert_eq!(node.locate_child_ptr(20).unwrap(), 3);
        assert_eq!(node.locate_child_ptr(1000).unwrap(), 3);
    }

    #[test]
    fn insert_at_end_extends_tail_and_reuses_old_tail_as_new_pair() {
        let mut node = InternalNode::new();
        node.raw.set_next_pid(100);
        node.insert(50, 200).unwrap();

        assert_eq!(node.locate_child_ptr(10).unwrap(), 100);
        assert_eq!(node.locate_child_ptr(1000).unwrap(), 200);
    }

    #[test]
    fn insert_in_middle_overwrites_and_reinserts_old_child() {
        // Two children to start: pid 1 covers < 50, pid 2 covers >= 50.
        let mut node = InternalNode::new();
        node.raw.set_next_pid(1);
        node.insert(50, 2).unwrap();

        // Child 1 splits into (1, covering < 30) and (3, covering [30, 50)).
        node.insert(30, 3).unwrap();

        assert_eq!(node.locate_child_ptr(10).unwrap(), 1);
        assert_eq!(node.locate_child_ptr(40).unwrap(), 3);
        assert_eq!(node.locate_child_ptr(60).unwrap(), 2);
    }

    #[test]
    fn insert_and_split_preserves_left_boundary_via_consumed_value() {
        let mut node = InternalNode::new();
        for i in 0..(DEGREE - 1) as i32 {
            node.insert(i * 10, i).unwrap();
        }
        node.raw.set_next_pid(9999);

        let mut sibling = InternalNode::new();
        let new_key = (DEGREE as i32) * 10;
        let promoted = node.insert_and_split(new_key, 1234, &mut sibling).unwrap();

        // Every key covered by node.next_pid() (post-split) must be the
        // exact range that was covered by the consumed pair pre-split.
        assert!(node.locate_child_ptr(promoted - 1).unwrap() == node.raw.next_pid());
        assert!(promoted > 0);
        assert_eq!(sibling.locate_child_ptr(i32::MAX).unwrap(), sibling.raw.next_pid());
    }

    #[test]
    fn round_trips_through_store() {
        let (_file, store) = open_store();
        let pid = store.end_pid();

        let mut node = InternalNode::new();
        node.insert(5, 1).unwrap();
        node.write(pid, &store).unwrap();

        let mut reloaded = InternalNode::new();
        reloaded.read(pid, &store).unwrap();
        assert_eq!(reloaded.key_count(), 1);
        assert_eq!(reloaded.locate_child_ptr(3).unwrap(), 1);
    }
}
