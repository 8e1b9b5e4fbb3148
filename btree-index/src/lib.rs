//! A disk-resident B+tree index over a fixed-width `i32` key and an
//! opaque, fixed-width `RecordId` value.
//!
//! Layered bottom-up:
//! - [`raw_node`] — byte-exact page image, shared by leaf and internal
//!   nodes.
//! - [`leaf`] / [`internal`] — typed views over a raw node, one per node
//!   kind.
//! - [`cursor`] — the `(pid, eid)` iteration handle.
//! - [`btree`] — [`BTreeIndex`], the tree driver: open/close, point
//!   lookup, forward scan, and insert with split propagation.
//!
//! The index is single-threaded and synchronous (see the crate's design
//! notes): one `insert` runs to completion — descent, any splits, and a
//! possible root promotion — before the next operation begins.

pub mod btree;
pub mod cursor;
pub mod error;
pub mod internal;
pub mod leaf;
pub mod raw_node;
pub mod record_id;

pub use btree::{BTreeIndex, OpenMode};
pub use cursor::Cursor;
pub use error::{IndexError, Result};
pub use raw_node::{Key, PageId, DEGREE, INVALID_KEY, INVALID_PID, PAGE_SIZE};
pub use record_id::RecordId;
