//! Error taxonomy for the B+tree index.
//!
//! Three kinds of failure, per the design's error handling policy:
//! structural errors that indicate a programmer or corruption fault
//! (`WrongNodeType`, `InvalidCursor`), expected control signals
//! (`NoSuchRecord`, `EndOfTree`), and resource errors from the page
//! store (`Io`). `NodeFull` is caught internally by split propagation
//! and never escapes `BTreeIndex::insert`; it is kept as a public
//! variant only because `RawNode::insert_pair` needs *some* type to
//! signal it with, and reusing one enum is simpler than a second type
//! used nowhere else.
use page_store::PageStoreError;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, IndexError>;

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// A node has no room for another pair; caught internally and resolved
    /// by splitting. Never returned from `BTreeIndex::insert`.
    #[error("node is full")]
    NodeFull,

    /// A page was read as the wrong kind of node (e.g. a leaf read where an
    /// internal node was expected, or vice versa).
    #[error("page holds the wrong kind of node")]
    WrongNodeType,

    /// The requested entry does not exist (empty slot, key not present, or
    /// search position past the last occupied slot).
    #[error("no such record")]
    NoSuchRecord,

    /// A cursor no longer names a valid entry (a concurrent mutation moved
    /// or removed what it pointed at, or it was built incorrectly).
    #[error("cursor is no longer valid")]
    InvalidCursor,

    /// A forward scan ran off the end of the leaf chain.
    #[error("end of tree reached")]
    EndOfTree,

    /// The page store rejected a read, write, or allocation.
    #[error("page store error: {0}")]
    Io(#[from] PageStoreError),
}
