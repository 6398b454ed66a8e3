//! ItemStack type and NetworkItemStackDescriptor serialization.
//!
//! The wire format matches Bedrock's `NetworkItemStackDescriptor`; user data
//! is decoded into an NBT compound so callers can read and patch it.

use bytes::{Buf, BufMut};
use mc_itx_nbt::{read_nbt_le, write_compound_le, NbtCompound};

use crate::codec::{
    ensure_remaining, read_bool, read_string, read_u8, write_string, ProtoDecode, ProtoEncode,
};
use crate::error::ProtoError;
use crate::types::{VarInt, VarUInt32};

/// User data marker announcing an NBT payload.
const USER_DATA_NBT_MARKER: u32 = 0xFFFF_FFFF;
/// Version byte that follows the marker.
const USER_DATA_NBT_VERSION: u8 = 1;

/// A single item stack.
///
/// `runtime_id == 0` means the slot is empty (air).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemStack {
    /// Item runtime ID (item type). 0 = air/empty.
    pub runtime_id: i32,
    /// Number of items in this stack.
    pub count: u16,
    /// Aux value (damage/variant).
    pub metadata: u16,
    /// Block runtime ID if this item represents a placeable block.
    pub block_runtime_id: i32,
    /// Structured user data: custom name, enchantments, repair cost...
    pub nbt: Option<NbtCompound>,
    /// Blocks this item can be placed on (adventure mode).
    pub can_place_on: Vec<String>,
    /// Blocks this item can destroy (adventure mode).
    pub can_destroy: Vec<String>,
    /// Server-assigned stack id. Changes every time a request touches the stack.
    pub stack_network_id: i32,
}

impl ItemStack {
    /// An empty slot (air).
    pub fn empty() -> Self {
        Self::default()
    }

    /// A plain stack with no user data.
    pub fn new(runtime_id: i32, count: u16) -> Self {
        Self {
            runtime_id,
            count,
            ..Self::default()
        }
    }

    /// A plain stack carrying a stack id.
    pub fn with_stack_id(runtime_id: i32, count: u16, stack_network_id: i32) -> Self {
        Self {
            stack_network_id,
            ..Self::new(runtime_id, count)
        }
    }

    /// Whether this slot is empty.
    pub fn is_empty(&self) -> bool {
        self.runtime_id == 0 || self.count == 0
    }
}

/// Encode as `NetworkItemStackDescriptor`.
///
/// Wire format:
/// ```text
/// VarInt(runtime_id): 0 = empty, return early
/// u16_le(count)
/// VarUInt32(metadata)
/// u8(has_stack_id) + optional VarInt(stack_network_id)
/// VarInt(block_runtime_id)
/// VarUInt32(user_data_marker) + optional u8(version) + LE NBT
/// VarInt(can_place_on_count) + strings
/// VarInt(can_destroy_count) + strings
/// ```
impl ProtoEncode for ItemStack {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.runtime_id).proto_encode(buf);
        if self.runtime_id == 0 {
            return;
        }

        buf.put_u16_le(self.count);
        VarUInt32(self.metadata as u32).proto_encode(buf);

        if self.stack_network_id != 0 {
            buf.put_u8(1);
            VarInt(self.stack_network_id).proto_encode(buf);
        } else {
            buf.put_u8(0);
        }

        VarInt(self.block_runtime_id).proto_encode(buf);

        match &self.nbt {
            Some(compound) => {
                VarUInt32(USER_DATA_NBT_MARKER).proto_encode(buf);
                buf.put_u8(USER_DATA_NBT_VERSION);
                write_compound_le(buf, "", compound);
            }
            None => VarUInt32(0).proto_encode(buf),
        }

        write_string_list(buf, &self.can_place_on);
        write_string_list(buf, &self.can_destroy);
    }
}

impl ProtoDecode for ItemStack {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let runtime_id = VarInt::proto_decode(buf)?.0;
        if runtime_id == 0 {
            return Ok(Self::empty());
        }

        ensure_remaining(buf, 2)?;
        let count = buf.get_u16_le();
        let metadata = VarUInt32::proto_decode(buf)?.0 as u16;

        let stack_network_id = if read_bool(buf)? {
            VarInt::proto_decode(buf)?.0
        } else {
            0
        };

        let block_runtime_id = VarInt::proto_decode(buf)?.0;
        let nbt = decode_user_data(buf)?;
        let can_place_on = read_string_list(buf)?;
        let can_destroy = read_string_list(buf)?;

        Ok(Self {
            runtime_id,
            count,
            metadata,
            block_runtime_id,
            nbt,
            can_place_on,
            can_destroy,
            stack_network_id,
        })
    }
}

fn decode_user_data(buf: &mut impl Buf) -> Result<Option<NbtCompound>, ProtoError> {
    let marker = VarUInt32::proto_decode(buf)?.0;
    if marker == USER_DATA_NBT_MARKER {
        let version = read_u8(buf)?;
        if version != USER_DATA_NBT_VERSION {
            return Err(ProtoError::InvalidData(format!(
                "unsupported item user data version {version}"
            )));
        }
        let root = read_nbt_le(buf)?;
        Ok(Some(root.compound))
    } else {
        // Legacy raw user data: nothing we can interpret, skip it.
        let len = marker as usize;
        tracing::trace!("Skipping {len} bytes of legacy item user data");
        ensure_remaining(buf, len)?;
        buf.advance(len);
        Ok(None)
    }
}

fn write_string_list(buf: &mut impl BufMut, list: &[String]) {
    VarInt(list.len() as i32).proto_encode(buf);
    for s in list {
        write_string(buf, s);
    }
}

fn read_string_list(buf: &mut impl Buf) -> Result<Vec<String>, ProtoError> {
    let count = VarInt::proto_decode(buf)?.0;
    if count < 0 {
        return Err(ProtoError::InvalidData(format!("negative list length {count}")));
    }
    ensure_remaining(buf, count as usize)?;
    (0..count).map(|_| read_string(buf)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;
    use mc_itx_nbt::NbtTag;

    fn encode(item: &ItemStack) -> BytesMut {
        let mut buf = BytesMut::new();
        item.proto_encode(&mut buf);
        buf
    }

    #[test]
    fn empty_item_is_single_byte() {
        let buf = encode(&ItemStack::empty());
        assert_eq!(&buf[..], &[0]);
        assert!(ItemStack::proto_decode(&mut buf.freeze()).unwrap().is_empty());
    }

    #[test]
    fn named_item_keeps_user_data() {
        let mut display = NbtCompound::new();
        display.insert("Name".into(), NbtTag::String("Foo".into()));
        let mut nbt = NbtCompound::new();
        nbt.insert("display".into(), NbtTag::Compound(display));
        nbt.insert("RepairCost".into(), NbtTag::Int(1));

        let item = ItemStack {
            nbt: Some(nbt),
            can_place_on: vec!["minecraft:stone".into()],
            ..ItemStack::with_stack_id(307, 1, -7)
        };
        let decoded = ItemStack::proto_decode(&mut encode(&item).freeze()).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn stack_id_zero_is_omitted() {
        let with_id = encode(&ItemStack::with_stack_id(1, 1, 5));
        let without = encode(&ItemStack::new(1, 1));
        assert_eq!(with_id.len(), without.len() + 1);
    }

    #[test]
    fn legacy_user_data_is_skipped() {
        let mut buf = BytesMut::new();
        VarInt(3).proto_encode(&mut buf);
        buf.put_u16_le(2);
        VarUInt32(0).proto_encode(&mut buf);
        buf.put_u8(0);
        VarInt(0).proto_encode(&mut buf);
        VarUInt32(2).proto_encode(&mut buf);
        buf.put_slice(&[0xAB, 0xCD]);
        VarInt(0).proto_encode(&mut buf);
        VarInt(0).proto_encode(&mut buf);

        let item = ItemStack::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(item.runtime_id, 3);
        assert_eq!(item.count, 2);
        assert!(item.nbt.is_none());
    }

    #[test]
    fn is_empty_checks() {
        assert!(ItemStack::empty().is_empty());
        assert!(ItemStack::new(0, 10).is_empty());
        assert!(ItemStack::new(1, 0).is_empty());
        assert!(!ItemStack::new(1, 1).is_empty());
    }
}
