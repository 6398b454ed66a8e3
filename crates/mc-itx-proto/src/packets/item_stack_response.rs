//! ItemStackResponse (0x94): Server → Client.
//!
//! Confirms or rejects each request of an ItemStackRequest. Successful
//! entries echo the final count and stack id of every slot the request
//! touched, grouped by role. Full item details are not echoed.

use bytes::{Buf, BufMut};

use crate::codec::{read_list, read_string, read_u8, write_string, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;
use crate::types::{VarInt, VarUInt32};

/// Status of a request that was applied.
pub const STATUS_OK: u8 = 0;
/// Generic rejection status.
pub const STATUS_ERROR: u8 = 1;

/// Response for a single slot after an inventory operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResponseSlot {
    /// Slot index.
    pub slot: u8,
    /// Hotbar slot (same as slot for hotbar items).
    pub hotbar_slot: u8,
    /// Resulting item count.
    pub count: u8,
    /// New stack network ID assigned by the server.
    pub stack_network_id: i32,
    /// Custom name (empty string if none).
    pub custom_name: String,
    /// Durability correction (0 if no change).
    pub durability_correction: i32,
}

impl ProtoEncode for StackResponseSlot {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.slot);
        buf.put_u8(self.hotbar_slot);
        buf.put_u8(self.count);
        VarInt(self.stack_network_id).proto_encode(buf);
        write_string(buf, &self.custom_name);
        VarInt(self.durability_correction).proto_encode(buf);
    }
}

impl ProtoDecode for StackResponseSlot {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            slot: read_u8(buf)?,
            hotbar_slot: read_u8(buf)?,
            count: read_u8(buf)?,
            stack_network_id: VarInt::proto_decode(buf)?.0,
            custom_name: read_string(buf)?,
            durability_correction: VarInt::proto_decode(buf)?.0,
        })
    }
}

/// Slot updates grouped by role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResponseContainer {
    /// Raw role (`ContainerId`) the slots belong to.
    pub container_id: u8,
    /// Dynamic container id (bundles); 0 otherwise.
    pub dynamic_container_id: u32,
    /// Updated slots in this container.
    pub slots: Vec<StackResponseSlot>,
}

impl ProtoEncode for StackResponseContainer {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.container_id);
        VarUInt32(self.dynamic_container_id).proto_encode(buf);
        VarUInt32(self.slots.len() as u32).proto_encode(buf);
        for slot in &self.slots {
            slot.proto_encode(buf);
        }
    }
}

impl ProtoDecode for StackResponseContainer {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let container_id = read_u8(buf)?;
        let dynamic_container_id = VarUInt32::proto_decode(buf)?.0;
        let slots = read_list(buf, |b| StackResponseSlot::proto_decode(b))?;
        Ok(Self {
            container_id,
            dynamic_container_id,
            slots,
        })
    }
}

/// Response for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackResponseEntry {
    /// 0 = success, non-zero = error.
    pub status: u8,
    /// Matches the request_id from the ItemStackRequest.
    pub request_id: i32,
    /// Container slot updates (empty if status != 0).
    pub containers: Vec<StackResponseContainer>,
}

impl StackResponseEntry {
    pub fn is_success(&self) -> bool {
        self.status == STATUS_OK
    }

    /// A rejection carrying no slot updates.
    pub fn rejected(request_id: i32, status: u8) -> Self {
        Self {
            status,
            request_id,
            containers: Vec::new(),
        }
    }
}

impl ProtoEncode for StackResponseEntry {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.status);
        VarInt(self.request_id).proto_encode(buf);
        if self.status == STATUS_OK {
            VarUInt32(self.containers.len() as u32).proto_encode(buf);
            for container in &self.containers {
                container.proto_encode(buf);
            }
        }
    }
}

impl ProtoDecode for StackResponseEntry {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let status = read_u8(buf)?;
        let request_id = VarInt::proto_decode(buf)?.0;
        let containers = if status == STATUS_OK {
            read_list(buf, |b| StackResponseContainer::proto_decode(b))?
        } else {
            Vec::new()
        };
        Ok(Self {
            status,
            request_id,
            containers,
        })
    }
}

/// The complete ItemStackResponse packet.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemStackResponse {
    pub responses: Vec<StackResponseEntry>,
}

impl ProtoEncode for ItemStackResponse {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.responses.len() as u32).proto_encode(buf);
        for response in &self.responses {
            response.proto_encode(buf);
        }
    }
}

impl ProtoDecode for ItemStackResponse {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let responses = read_list(buf, |b| StackResponseEntry::proto_decode(b))?;
        Ok(Self { responses })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn rejected_entry_has_no_container_section() {
        let entry = StackResponseEntry::rejected(-7, STATUS_ERROR);
        let mut buf = BytesMut::new();
        entry.proto_encode(&mut buf);
        // status + VarInt(-7) = 13
        assert_eq!(&buf[..], &[1, 13]);
        let decoded = StackResponseEntry::proto_decode(&mut buf.freeze()).unwrap();
        assert!(!decoded.is_success());
        assert!(decoded.containers.is_empty());
    }

    #[test]
    fn mixed_batch_decodes_in_order() {
        let packet = ItemStackResponse {
            responses: vec![
                StackResponseEntry {
                    status: STATUS_OK,
                    request_id: -1,
                    containers: vec![StackResponseContainer {
                        container_id: 29,
                        dynamic_container_id: 0,
                        slots: vec![StackResponseSlot {
                            slot: 9,
                            hotbar_slot: 9,
                            count: 3,
                            stack_network_id: -5,
                            custom_name: "Foo".into(),
                            durability_correction: 0,
                        }],
                    }],
                },
                StackResponseEntry::rejected(-3, STATUS_ERROR),
            ],
        };
        let mut buf = BytesMut::new();
        packet.proto_encode(&mut buf);
        let decoded = ItemStackResponse::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, packet);
        assert!(decoded.responses[0].is_success());
        assert_eq!(decoded.responses[0].containers[0].slots[0].custom_name, "Foo");
    }
}
