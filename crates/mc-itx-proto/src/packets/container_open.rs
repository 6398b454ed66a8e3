//! ContainerOpen (0x2E): Server → Client.
//!
//! The server opened a container window (chest, anvil, loom...) for us.

use bytes::{Buf, BufMut};

use crate::codec::{read_u8, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{BlockPos, VarLong};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerOpen {
    /// Window ID assigned to this container session.
    pub window_id: u8,
    /// Container type (see `container::container_type`).
    pub container_type: u8,
    /// Position of the container block.
    pub position: BlockPos,
    /// Entity unique ID (-1 for block containers).
    pub entity_unique_id: i64,
}

impl ProtoEncode for ContainerOpen {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.window_id);
        buf.put_u8(self.container_type);
        self.position.proto_encode(buf);
        VarLong(self.entity_unique_id).proto_encode(buf);
    }
}

impl ProtoDecode for ContainerOpen {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            window_id: read_u8(buf)?,
            container_type: read_u8(buf)?,
            position: BlockPos::proto_decode(buf)?,
            entity_unique_id: VarLong::proto_decode(buf)?.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn anvil_open_roundtrip() {
        let pkt = ContainerOpen {
            window_id: 2,
            container_type: crate::container::container_type::ANVIL,
            position: BlockPos::new(10, 64, -5),
            entity_unique_id: -1,
        };
        let mut buf = BytesMut::new();
        pkt.proto_encode(&mut buf);
        assert_eq!(buf[0], 2);
        assert_eq!(buf[1], 5);
        assert_eq!(ContainerOpen::proto_decode(&mut buf.freeze()).unwrap(), pkt);
    }
}
