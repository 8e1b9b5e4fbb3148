//! The tree driver: root/leaf/internal split handling and the public
//! insert/locate/scan surface.

use std::path::Path;

use log::{debug, info};
use page_store::PageStore;

use crate::cursor::Cursor;
use crate::error::{IndexError, Result};
use crate::internal::InternalNode;
use crate::leaf::LeafNode;
use crate::raw_node::{Key, PageId, RawNode, INVALID_KEY, INVALID_PID};
use crate::record_id::RecordId;
pub use page_store::OpenMode;

/// Either node kind, tagged by a single untyped read of the page's leaf
/// flag — avoids reading a page twice just to find out what it is.
enum NodeView {
    Leaf(LeafNode),
    Internal(InternalNode),
}

/// A disk-resident B+tree index mapping `i32` keys to `RecordId`s.
///
/// The root always lives at page 0; `root_pid` only ever takes the values
/// `0` (open) or `INVALID_PID` (closed) — it exists to make "the tree is
/// closed" representable without an `Option`, matching the page id type
/// every other part of this crate already uses for "no page".
pub struct BTreeIndex {
    store: PageStore,
    root_pid: PageId,
}

/// What one level of the recursive descent reports to its caller.
enum InsertOutcome {
    Done,
    NeedsSplit {
        sibling_pid: PageId,
        sibling_first_key: Key,
    },
}

impl BTreeIndex {
    /// Opens (creating if absent) the index backed by the file at `name`.
    /// A brand new store is bootstrapped with an empty leaf at page 0.
    pub fn open(name: impl AsRef<Path>, mode: OpenMode) -> Result<Self> {
        let store = PageStore::open(name, mode)?;
        if store.end_pid() == 0 && mode == OpenMode::ReadWrite {
            let mut root = LeafNode::new();
            root.write(0, &store)?;
            debug!("bootstrapped empty root leaf at page 0");
        }
        Ok(Self { store, root_pid: 0 })
    }

    /// Closes the index. The backing file is released when `self` (and its
    /// `PageStore`) drops; this just marks the handle closed.
    pub fn close(&mut self) {
        self.root_pid = INVALID_PID;
    }

    /// `0` while open, `INVALID_PID` once closed. Exposed mainly so tests
    /// can assert the root-pinned-at-page-0 invariant from outside the
    /// crate; callers have no other use for it since every public operation
    /// already starts its descent at the root implicitly.
    pub fn root_pid(&self) -> PageId {
        self.root_pid
    }

    /// Reads page `pid` once and tags it by node kind, so descent code
    /// never has to read a page twice to find out what it is.
    fn load(&self, pid: PageId) -> Result<NodeView> {
        let raw: RawNode<PageId> = RawNode::read(pid, &self.store)?;
        if raw.is_leaf() {
            Ok(NodeView::Leaf(LeafNode::from_raw(raw.retype(), pid)))
        } else {
            Ok(NodeView::Internal(InternalNode::from_raw(raw, pid)))
        }
    }

    /// Finds the entry whose key is the smallest one `>= search_key`. If
    /// `search_key` overshoots every key in the leaf the descent lands on
    /// (only possible on the rightmost leaf), the cursor names the
    /// past-the-end slot rather than failing: `read_forward` on it walks
    /// off the leaf chain on its own and reports `EndOfTree`, exactly like
    /// an overshoot discovered partway through a scan.
    pub fn locate(&self, search_key: Key) -> Result<Cursor> {
        let mut pid = self.root_pid;
        loop {
            match self.load(pid)? {
                NodeView::Leaf(leaf) => {
                    let eid = match leaf.locate(search_key) {
                        Ok(eid) => eid,
                        Err(IndexError::NoSuchRecord) => leaf.key_count() as usize,
                        Err(e) => return Err(e),
                    };
                    return Ok(Cursor::new(pid, eid));
                }
                NodeView::Internal(internal) => {
                    pid = internal.locate_child_ptr(search_key)?;
                }
            }
        }
    }

    /// A cursor naming the very first entry in key order, descending the
    /// leftmost spine of the tree.
    pub fn locate_first(&self) -> Result<Cursor> {
        let mut pid = self.root_pid;
        loop {
            match self.load(pid)? {
                NodeView::Leaf(leaf) => {
                    if leaf.key_count() == 0 {
                        return Err(IndexError::EndOfTree);
                    }
                    return Ok(Cursor::new(pid, 0));
                }
                NodeView::Internal(internal) => {
                    // INVALID_KEY sorts below every real key, so this
                    // always resolves to the leftmost child (values[0]).
                    pid = internal.locate_child_ptr(INVALID_KEY)?;
                }
            }
        }
    }

    /// Reads the entry `cursor` names and advances it to the next entry in
    /// key order, following the leaf chain across page boundaries.
    pub fn read_forward(&self, cursor: &mut Cursor) -> Result<(Key, RecordId)> {
        loop {
            let mut leaf = LeafNode::new();
            match leaf.read(cursor.pid, &self.store) {
                Ok(()) => {}
                Err(IndexError::WrongNodeType) => return Err(IndexError::InvalidCursor),
                Err(e) => return Err(e),
            }
            match leaf.read_entry(cursor.eid) {
                Ok((key, rid)) => {
                    cursor.eid += 1;
                    return Ok((key, rid));
                }
                Err(IndexError::NoSuchRecord) => {
                    cursor.pid = leaf.next_ptr();
                    cursor.eid = 0;
                    if cursor.pid == INVALID_PID {
                        return Err(IndexError::EndOfTree);
                    }
                }
                Err(_) => return Err(IndexError::InvalidCursor),
            }
        }
    }

    /// Inserts `(key, rid)`, splitting and promoting the root as needed.
    pub fn insert(&mut self, key: Key, rid: RecordId) -> Result<()> {
        match self.insert_rec(self.root_pid, key, rid)? {
            InsertOutcome::Done => Ok(()),
            InsertOutcome::NeedsSplit {
                sibling_pid,
                sibling_first_key,
            } => {
                let new_old_root_pid = self.store.end_pid();
                self.copy_page_verbatim(self.root_pid, new_old_root_pid)?;

                let mut new_root = InternalNode::initialize_root(
                    new_old_root_pid,
                    sibling_first_key,
                    sibling_pid,
                )?;
                new_root.write(self.root_pid, &self.store)?;
                info!(
                    "root promoted: old root copied to page {}, new separator {}",
                    new_old_root_pid, sibling_first_key
                );
                Ok(())
            }
        }
    }

    /// Copies whatever page `src` holds (leaf or internal) to `dst`,
    /// byte-for-byte, without interpreting its contents beyond the flag
    /// that tells the two node views apart.
    fn copy_page_verbatim(&self, src: PageId, dst: PageId) -> Result<()> {
        match self.load(src)? {
            NodeView::Leaf(mut leaf) => leaf.write(dst, &self.store),
            NodeView::Internal(mut internal) => internal.write(dst, &self.store),
        }
    }

    fn insert_rec(&self, node_pid: PageId, key: Key, rid: RecordId) -> Result<InsertOutcome> {
        match self.load(node_pid)? {
            NodeView::Leaf(leaf) => self.insert_into_leaf(node_pid, leaf, key, rid),
            NodeView::Internal(internal) => {
                let child_pid = internal.locate_child_ptr(key)?;
                // Drop the local buffer before recursing so stack usage
                // stays bounded by depth, not by depth times page size.
                drop(internal);

                match self.insert_rec(child_pid, key, rid)? {
                    InsertOutcome::Done => Ok(InsertOutcome::Done),
                    InsertOutcome::NeedsSplit {
                        sibling_pid,
                        sibling_first_key,
                    } => self.insert_into_internal(node_pid, sibling_first_key, sibling_pid),
                }
            }
        }
    }

    fn insert_into_leaf(
        &self,
        node_pid: PageId,
        mut leaf: LeafNode,
        key: Key,
        rid: RecordId,
    ) -> Result<InsertOutcome> {
        match leaf.insert(key, rid) {
            Ok(()) => {
                leaf.write(node_pid, &self.store)?;
                Ok(InsertOutcome::Done)
            }
            Err(IndexError::NodeFull) => {
                let sibling_pid = self.store.end_pid();
                let mut sibling = LeafNode::new();
                let sibling_first_key = leaf.insert_and_split(key, rid, &mut sibling)?;
                sibling.set_next_ptr(leaf.next_ptr());
                leaf.set_next_ptr(sibling_pid);
                leaf.write(node_pid, &self.store)?;
                sibling.write(sibling_pid, &self.store)?;
                debug!(
                    "split leaf {} -> sibling {} (first key {})",
                    node_pid, sibling_pid, sibling_first_key
                );
                Ok(InsertOutcome::NeedsSplit {
                    sibling_pid,
                    sibling_first_key,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn insert_into_internal(
        &self,
        node_pid: PageId,
        sibling_first_key: Key,
        sibling_pid: PageId,
    ) -> Result<InsertOutcome> {
        let mut internal = InternalNode::new();
        internal.read(node_pid, &self.store)?;
        match internal.insert(sibling_first_key, sibling_pid) {
            Ok(()) => {
                internal.write(node_pid, &self.store)?;
                Ok(InsertOutcome::Done)
            }
            Err(IndexError::NodeFull) => {
                let new_sibling_pid = self.store.end_pid();
                let mut new_sibling = InternalNode::new();
                let mid_key =
                    internal.insert_and_split(sibling_first_key, sibling_pid, &mut new_sibling)?;
                internal.write(node_pid, &self.store)?;
                new_sibling.write(new_sibling_pid, &self.store)?;
                debug!(
                    "split internal {} -> sibling {} (mid key {})",
                    node_pid, new_sibling_pid, mid_key
                );
                Ok(InsertOutcome::NeedsSplit {
                    sibling_pid: new_sibling_pid,
                    sibling_first_key: mid_key,
                })
            }
            Err(e) => Err(e),
        }
    }
}
