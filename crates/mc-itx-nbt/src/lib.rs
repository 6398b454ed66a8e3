//! NBT (Named Binary Tag) support for item user data.
//!
//! Bedrock encodes the user data of a network item stack as a little-endian
//! NBT root compound: ints and array lengths are `i32_le`, string lengths
//! are `u16_le`.

pub mod error;
mod le;
pub mod tag;

pub use error::NbtError;
pub use tag::{NbtCompound, NbtRoot, NbtTag};

use bytes::{Buf, BufMut};

/// Read a little-endian NBT root compound from a buffer.
pub fn read_nbt_le(buf: &mut impl Buf) -> Result<NbtRoot, NbtError> {
    le::read_root(buf)
}

/// Write a little-endian NBT root compound to a buffer.
pub fn write_nbt_le(buf: &mut impl BufMut, root: &NbtRoot) {
    le::write_root(buf, &root.name, &root.compound)
}

/// Write a borrowed compound as a little-endian NBT root named `name`.
pub fn write_compound_le(buf: &mut impl BufMut, name: &str, compound: &NbtCompound) {
    le::write_root(buf, name, compound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn roundtrip(root: &NbtRoot) -> NbtRoot {
        let mut buf = BytesMut::new();
        write_nbt_le(&mut buf, root);
        let mut frozen = buf.freeze();
        let decoded = read_nbt_le(&mut frozen).unwrap();
        assert!(frozen.is_empty(), "trailing bytes after root compound");
        decoded
    }

    fn named_item() -> NbtCompound {
        let mut display = NbtCompound::new();
        display.insert("Name".into(), NbtTag::String("Ender Blade".into()));
        display.insert(
            "Lore".into(),
            NbtTag::List(vec![NbtTag::String("forged in the void".into())]),
        );

        let mut ench = NbtCompound::new();
        ench.insert("id".into(), NbtTag::Short(9));
        ench.insert("lvl".into(), NbtTag::Short(5));

        let mut root = NbtCompound::new();
        root.insert("display".into(), NbtTag::Compound(display));
        root.insert("ench".into(), NbtTag::List(vec![NbtTag::Compound(ench)]));
        root.insert("RepairCost".into(), NbtTag::Int(3));
        root
    }

    #[test]
    fn item_user_data_roundtrip() {
        let root = NbtRoot::unnamed(named_item());
        assert_eq!(roundtrip(&root), root);
    }

    #[test]
    fn empty_compound_is_four_bytes() {
        let mut buf = BytesMut::new();
        write_nbt_le(&mut buf, &NbtRoot::unnamed(NbtCompound::new()));
        // TAG_Compound, u16 name length 0, TAG_End
        assert_eq!(&buf[..], &[10, 0, 0, 0]);
    }

    #[test]
    fn ints_are_little_endian() {
        let mut c = NbtCompound::new();
        c.insert("v".into(), NbtTag::Int(1));
        let mut buf = BytesMut::new();
        write_nbt_le(&mut buf, &NbtRoot::unnamed(c));
        // 10, 0,0 | 3, 1,0, 'v' | 1,0,0,0 | 0
        assert_eq!(&buf[..], &[10, 0, 0, 3, 1, 0, b'v', 1, 0, 0, 0, 0]);
    }

    #[test]
    fn scalar_and_array_tags_survive() {
        let mut c = NbtCompound::new();
        c.insert("f".into(), NbtTag::Float(3.5));
        c.insert("d".into(), NbtTag::Double(-0.25));
        c.insert("l".into(), NbtTag::Long(i64::MIN));
        c.insert("ba".into(), NbtTag::ByteArray(vec![1, -1]));
        c.insert("ia".into(), NbtTag::IntArray(vec![7, -7]));
        c.insert("la".into(), NbtTag::LongArray(vec![0, i64::MAX]));
        c.insert("empty".into(), NbtTag::List(vec![]));
        let root = NbtRoot::unnamed(c);
        assert_eq!(roundtrip(&root), root);
    }

    #[test]
    fn truncated_input_is_eof() {
        let mut buf = BytesMut::new();
        write_nbt_le(&mut buf, &NbtRoot::unnamed(named_item()));
        let truncated = buf.freeze().slice(..6);
        assert!(matches!(
            read_nbt_le(&mut truncated.clone()),
            Err(NbtError::UnexpectedEof)
        ));
    }

    #[test]
    fn root_must_be_compound() {
        let data = bytes::Bytes::from_static(&[8, 0, 0]);
        assert!(matches!(
            read_nbt_le(&mut data.clone()),
            Err(NbtError::ExpectedCompound { got: 8 })
        ));
    }

    #[test]
    fn unknown_tag_type_rejected() {
        // root compound containing a tag of type 13
        let data = bytes::Bytes::from_static(&[10, 0, 0, 13, 1, 0, b'x']);
        assert!(matches!(
            read_nbt_le(&mut data.clone()),
            Err(NbtError::UnknownTagType(13))
        ));
    }
}
