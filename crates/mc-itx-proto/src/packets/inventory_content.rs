//! InventoryContent (0x31): Server → Client.
//!
//! Replaces the full contents of one window on the client.

use bytes::{Buf, BufMut};

use crate::codec::{read_list, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::item_stack::ItemStack;
use crate::types::VarUInt32;

/// Full contents of a window. Slot `i` holds `items[i]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InventoryContent {
    /// Window ID: 0 = inventory, 119 = offhand, 120 = armor, 124 = UI.
    pub window_id: u32,
    pub items: Vec<ItemStack>,
}

impl ProtoEncode for InventoryContent {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.window_id).proto_encode(buf);
        VarUInt32(self.items.len() as u32).proto_encode(buf);
        for item in &self.items {
            item.proto_encode(buf);
        }
    }
}

impl ProtoDecode for InventoryContent {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let window_id = VarUInt32::proto_decode(buf)?.0;
        let items = read_list(buf, |b| ItemStack::proto_decode(b))?;
        Ok(Self { window_id, items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn content_with_gaps() {
        let pkt = InventoryContent {
            window_id: 0,
            items: vec![
                ItemStack::with_stack_id(1, 64, 3),
                ItemStack::empty(),
                ItemStack::with_stack_id(5, 2, 4),
            ],
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        let decoded = InventoryContent::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.items.len(), 3);
        assert!(decoded.items[1].is_empty());
        assert_eq!(decoded.items[2].stack_network_id, 4);
    }
}
