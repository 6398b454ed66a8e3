//! Game packets exchanged by the transaction engine.

pub mod container_close;
pub mod container_open;
pub mod inventory_content;
pub mod item_stack_request;
pub mod item_stack_response;

pub use container_close::ContainerClose;
pub use container_open::ContainerOpen;
pub use inventory_content::InventoryContent;
pub use item_stack_request::{ItemStackRequest, StackAction, StackRequest, StackSlot};
pub use item_stack_response::{
    ItemStackResponse, StackResponseContainer, StackResponseEntry, StackResponseSlot,
};

use bytes::{Buf, Bytes, BytesMut};

use crate::codec::{ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::VarUInt32;

/// Game packet IDs.
pub mod id {
    pub const CONTAINER_OPEN: u32 = 0x2E;
    pub const CONTAINER_CLOSE: u32 = 0x2F;
    pub const INVENTORY_CONTENT: u32 = 0x31;
    pub const ITEM_STACK_REQUEST: u32 = 0x93;
    pub const ITEM_STACK_RESPONSE: u32 = 0x94;
}

/// Inbound packets the engine consumes.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerPacket {
    InventoryContent(InventoryContent),
    ContainerOpen(ContainerOpen),
    ContainerClose(ContainerClose),
    ItemStackResponse(ItemStackResponse),
}

impl ServerPacket {
    /// Decode the body of a sub-packet whose id has already been read.
    pub fn decode(packet_id: u32, buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let packet = match packet_id {
            id::INVENTORY_CONTENT => {
                ServerPacket::InventoryContent(InventoryContent::proto_decode(buf)?)
            }
            id::CONTAINER_OPEN => ServerPacket::ContainerOpen(ContainerOpen::proto_decode(buf)?),
            id::CONTAINER_CLOSE => {
                ServerPacket::ContainerClose(ContainerClose::proto_decode(buf)?)
            }
            id::ITEM_STACK_RESPONSE => {
                ServerPacket::ItemStackResponse(ItemStackResponse::proto_decode(buf)?)
            }
            other => return Err(ProtoError::UnknownPacketId(other)),
        };
        Ok(packet)
    }

    /// Decode a full sub-packet: `VarUInt32(id) + body`.
    pub fn decode_sub_packet(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let packet_id = VarUInt32::proto_decode(buf)?.0;
        Self::decode(packet_id, buf)
    }

    pub fn packet_id(&self) -> u32 {
        match self {
            ServerPacket::InventoryContent(_) => id::INVENTORY_CONTENT,
            ServerPacket::ContainerOpen(_) => id::CONTAINER_OPEN,
            ServerPacket::ContainerClose(_) => id::CONTAINER_CLOSE,
            ServerPacket::ItemStackResponse(_) => id::ITEM_STACK_RESPONSE,
        }
    }

    /// Encode as a sub-packet. Used by scripted servers in tests and tools.
    pub fn to_sub_packet(&self) -> Bytes {
        match self {
            ServerPacket::InventoryContent(p) => encode_sub_packet(self.packet_id(), p),
            ServerPacket::ContainerOpen(p) => encode_sub_packet(self.packet_id(), p),
            ServerPacket::ContainerClose(p) => encode_sub_packet(self.packet_id(), p),
            ServerPacket::ItemStackResponse(p) => encode_sub_packet(self.packet_id(), p),
        }
    }
}

/// Outbound packets the engine produces.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientPacket {
    ItemStackRequest(ItemStackRequest),
    ContainerClose(ContainerClose),
}

impl ClientPacket {
    pub fn packet_id(&self) -> u32 {
        match self {
            ClientPacket::ItemStackRequest(_) => id::ITEM_STACK_REQUEST,
            ClientPacket::ContainerClose(_) => id::CONTAINER_CLOSE,
        }
    }

    /// Encode as a sub-packet: `VarUInt32(id) + body`.
    pub fn to_sub_packet(&self) -> Bytes {
        match self {
            ClientPacket::ItemStackRequest(p) => encode_sub_packet(self.packet_id(), p),
            ClientPacket::ContainerClose(p) => encode_sub_packet(self.packet_id(), p),
        }
    }
}

/// Encode a packet struct into a sub-packet: `VarUInt32(id) + proto_encoded fields`.
pub fn encode_sub_packet(packet_id: u32, packet: &impl ProtoEncode) -> Bytes {
    let mut buf = BytesMut::new();
    VarUInt32(packet_id).proto_encode(&mut buf);
    packet.proto_encode(&mut buf);
    buf.freeze()
}
