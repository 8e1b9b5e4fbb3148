//! The value type stored in leaf nodes.
//!
//! Opaque to the index: a `RecordId` just needs a stable fixed-width
//! binary representation so it fits in a raw node's value slot next to
//! the page ids used by internal nodes (see `raw_node::VALUE_WIDTH`).

use crate::raw_node::{PageValue, VALUE_WIDTH};

/// Identifies a tuple in the external record store. The index never
/// interprets `page_id`/`slot_id`; it only stores and returns them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordId {
    pub page_id: i32,
    pub slot_id: i32,
}

impl RecordId {
    pub fn new(page_id: i32, slot_id: i32) -> Self {
        Self { page_id, slot_id }
    }
}

impl PageValue for RecordId {
    fn to_bytes(&self) -> [u8; VALUE_WIDTH] {
        let mut out = [0u8; VALUE_WIDTH];
        out[0..4].copy_from_slice(&self.page_id.to_le_bytes());
        out[4..8].copy_from_slice(&self.slot_id.to_le_bytes());
        out
    }

    fn from_bytes(bytes: &[u8]) -> Self {
        let page_id = i32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let slot_id = i32::from_le_bytes(bytes[4..8].try_into().unwrap());
        Self { page_id, slot_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_bytes() {
        let rid = RecordId::new(42, -7);
        let bytes = rid.to_bytes();
        assert_eq!(RecordId::from_bytes(&bytes), rid);
    }
}
