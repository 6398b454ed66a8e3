//! ItemStackRequest (0x93): Client → Server.
//!
//! One packet carries any number of requests. Each request is an ordered
//! list of primitive actions addressed by (role, slot, stack id). The server
//! answers every request with an entry in ItemStackResponse.

use bytes::{Buf, BufMut};

use crate::codec::{read_list, read_string, read_u8, write_string, ProtoDecode, ProtoEncode};
use crate::container::ContainerId;
use crate::error::ProtoError;
use crate::types::{VarInt, VarUInt32};

/// Cause attached to a request's filter strings.
pub mod filter_cause {
    pub const SERVER_CHAT_PUBLIC: i32 = 0;
    pub const SIGN_TEXT: i32 = 2;
    pub const ANVIL_TEXT: i32 = 3;
    pub const BOOK_AND_QUILL_TEXT: i32 = 4;
}

/// A reference to a specific container slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackSlot {
    /// Role of the slot inside this request.
    pub container_id: ContainerId,
    /// Slot index within the container.
    pub slot: u8,
    /// Stack id the client believes the slot holds. Negative values name
    /// the request that last touched the stack.
    pub stack_network_id: i32,
}

impl StackSlot {
    pub fn new(container_id: ContainerId, slot: u8, stack_network_id: i32) -> Self {
        Self {
            container_id,
            slot,
            stack_network_id,
        }
    }
}

impl ProtoEncode for StackSlot {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.container_id.as_u8());
        buf.put_u8(self.slot);
        VarInt(self.stack_network_id).proto_encode(buf);
    }
}

impl ProtoDecode for StackSlot {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let raw = read_u8(buf)?;
        let container_id = ContainerId::from_u8(raw)
            .ok_or_else(|| ProtoError::InvalidData(format!("unknown container id {raw}")))?;
        let slot = read_u8(buf)?;
        let stack_network_id = VarInt::proto_decode(buf)?.0;
        Ok(Self {
            container_id,
            slot,
            stack_network_id,
        })
    }
}

/// Individual action within a request.
#[derive(Debug, Clone, PartialEq)]
pub enum StackAction {
    Take {
        count: u8,
        src: StackSlot,
        dst: StackSlot,
    },
    Place {
        count: u8,
        src: StackSlot,
        dst: StackSlot,
    },
    Swap {
        src: StackSlot,
        dst: StackSlot,
    },
    Drop {
        count: u8,
        src: StackSlot,
        randomly: bool,
    },
    Destroy {
        count: u8,
        src: StackSlot,
    },
    Consume {
        count: u8,
        src: StackSlot,
    },
    Create {
        result_slot: u8,
    },
    CraftRecipe {
        recipe_network_id: u32,
    },
    CraftRecipeAuto {
        recipe_network_id: u32,
        times_crafted: u8,
        ingredients: Vec<u8>,
    },
    CraftCreative {
        creative_item_network_id: u32,
    },
    /// Craft using a filter string (anvil rename, book signing).
    CraftRecipeOptional {
        recipe_network_id: u32,
        filter_string_index: i32,
    },
    CraftGrindstone {
        recipe_network_id: u32,
    },
    CraftLoom {
        pattern_id: String,
    },
}

impl StackAction {
    /// Wire action type.
    pub fn action_type(&self) -> u8 {
        match self {
            StackAction::Take { .. } => 0,
            StackAction::Place { .. } => 1,
            StackAction::Swap { .. } => 2,
            StackAction::Drop { .. } => 3,
            StackAction::Destroy { .. } => 4,
            StackAction::Consume { .. } => 5,
            StackAction::Create { .. } => 6,
            StackAction::CraftRecipe { .. } => 12,
            StackAction::CraftRecipeAuto { .. } => 13,
            StackAction::CraftCreative { .. } => 14,
            StackAction::CraftRecipeOptional { .. } => 15,
            StackAction::CraftGrindstone { .. } => 16,
            StackAction::CraftLoom { .. } => 17,
        }
    }
}

impl ProtoEncode for StackAction {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.action_type());
        match self {
            StackAction::Take { count, src, dst } | StackAction::Place { count, src, dst } => {
                buf.put_u8(*count);
                src.proto_encode(buf);
                dst.proto_encode(buf);
            }
            StackAction::Swap { src, dst } => {
                src.proto_encode(buf);
                dst.proto_encode(buf);
            }
            StackAction::Drop {
                count,
                src,
                randomly,
            } => {
                buf.put_u8(*count);
                src.proto_encode(buf);
                buf.put_u8(*randomly as u8);
            }
            StackAction::Destroy { count, src } | StackAction::Consume { count, src } => {
                buf.put_u8(*count);
                src.proto_encode(buf);
            }
            StackAction::Create { result_slot } => buf.put_u8(*result_slot),
            StackAction::CraftRecipe { recipe_network_id }
            | StackAction::CraftGrindstone { recipe_network_id } => {
                VarUInt32(*recipe_network_id).proto_encode(buf);
            }
            StackAction::CraftRecipeAuto {
                recipe_network_id,
                times_crafted,
                ingredients,
            } => {
                VarUInt32(*recipe_network_id).proto_encode(buf);
                buf.put_u8(*times_crafted);
                VarUInt32(ingredients.len() as u32).proto_encode(buf);
                buf.put_slice(ingredients);
            }
            StackAction::CraftCreative {
                creative_item_network_id,
            } => VarUInt32(*creative_item_network_id).proto_encode(buf),
            StackAction::CraftRecipeOptional {
                recipe_network_id,
                filter_string_index,
            } => {
                VarUInt32(*recipe_network_id).proto_encode(buf);
                VarInt(*filter_string_index).proto_encode(buf);
            }
            StackAction::CraftLoom { pattern_id } => write_string(buf, pattern_id),
        }
    }
}

impl ProtoDecode for StackAction {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let action = match read_u8(buf)? {
            0 => StackAction::Take {
                count: read_u8(buf)?,
                src: StackSlot::proto_decode(buf)?,
                dst: StackSlot::proto_decode(buf)?,
            },
            1 => StackAction::Place {
                count: read_u8(buf)?,
                src: StackSlot::proto_decode(buf)?,
                dst: StackSlot::proto_decode(buf)?,
            },
            2 => StackAction::Swap {
                src: StackSlot::proto_decode(buf)?,
                dst: StackSlot::proto_decode(buf)?,
            },
            3 => StackAction::Drop {
                count: read_u8(buf)?,
                src: StackSlot::proto_decode(buf)?,
                randomly: read_u8(buf)? != 0,
            },
            4 => StackAction::Destroy {
                count: read_u8(buf)?,
                src: StackSlot::proto_decode(buf)?,
            },
            5 => StackAction::Consume {
                count: read_u8(buf)?,
                src: StackSlot::proto_decode(buf)?,
            },
            6 => StackAction::Create {
                result_slot: read_u8(buf)?,
            },
            12 => StackAction::CraftRecipe {
                recipe_network_id: VarUInt32::proto_decode(buf)?.0,
            },
            13 => StackAction::CraftRecipeAuto {
                recipe_network_id: VarUInt32::proto_decode(buf)?.0,
                times_crafted: read_u8(buf)?,
                ingredients: read_list(buf, |b| read_u8(b))?,
            },
            14 => StackAction::CraftCreative {
                creative_item_network_id: VarUInt32::proto_decode(buf)?.0,
            },
            15 => StackAction::CraftRecipeOptional {
                recipe_network_id: VarUInt32::proto_decode(buf)?.0,
                filter_string_index: VarInt::proto_decode(buf)?.0,
            },
            16 => StackAction::CraftGrindstone {
                recipe_network_id: VarUInt32::proto_decode(buf)?.0,
            },
            17 => StackAction::CraftLoom {
                pattern_id: read_string(buf)?,
            },
            // The size of an unknown action is unknown, so the rest of the
            // packet cannot be parsed either.
            other => return Err(ProtoError::UnknownActionType(other)),
        };
        Ok(action)
    }
}

/// A single request containing one or more actions.
#[derive(Debug, Clone, PartialEq)]
pub struct StackRequest {
    pub request_id: i32,
    pub actions: Vec<StackAction>,
    pub filter_strings: Vec<String>,
    pub filter_cause: i32,
}

impl ProtoEncode for StackRequest {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarInt(self.request_id).proto_encode(buf);
        VarUInt32(self.actions.len() as u32).proto_encode(buf);
        for action in &self.actions {
            action.proto_encode(buf);
        }
        VarUInt32(self.filter_strings.len() as u32).proto_encode(buf);
        for s in &self.filter_strings {
            write_string(buf, s);
        }
        VarInt(self.filter_cause).proto_encode(buf);
    }
}

impl ProtoDecode for StackRequest {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let request_id = VarInt::proto_decode(buf)?.0;
        let actions = read_list(buf, |b| StackAction::proto_decode(b))?;
        let filter_strings = read_list(buf, |b| read_string(b))?;
        let filter_cause = VarInt::proto_decode(buf)?.0;
        Ok(Self {
            request_id,
            actions,
            filter_strings,
            filter_cause,
        })
    }
}

/// The complete ItemStackRequest packet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ItemStackRequest {
    pub requests: Vec<StackRequest>,
}

impl ProtoEncode for ItemStackRequest {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        VarUInt32(self.requests.len() as u32).proto_encode(buf);
        for request in &self.requests {
            request.proto_encode(buf);
        }
    }
}

impl ProtoDecode for ItemStackRequest {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        let requests = read_list(buf, |b| StackRequest::proto_decode(b))?;
        Ok(Self { requests })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    fn slot(container_id: ContainerId, slot: u8, id: i32) -> StackSlot {
        StackSlot::new(container_id, slot, id)
    }

    #[test]
    fn place_action_layout() {
        let action = StackAction::Place {
            count: 3,
            src: slot(ContainerId::Hotbar, 0, 12),
            dst: slot(ContainerId::Inventory, 9, 0),
        };
        let mut buf = BytesMut::new();
        action.proto_encode(&mut buf);
        // type, count, (role, slot, VarInt(12)=24), (role, slot, VarInt(0))
        assert_eq!(&buf[..], &[1, 3, 28, 0, 24, 29, 9, 0]);
    }

    #[test]
    fn rename_request_roundtrip() {
        let request = ItemStackRequest {
            requests: vec![StackRequest {
                request_id: -3,
                actions: vec![
                    StackAction::CraftRecipeOptional {
                        recipe_network_id: 0,
                        filter_string_index: 0,
                    },
                    StackAction::Consume {
                        count: 1,
                        src: slot(ContainerId::AnvilInput, 1, -3),
                    },
                    StackAction::Place {
                        count: 1,
                        src: slot(ContainerId::CreatedOutput, 50, -3),
                        dst: slot(ContainerId::Hotbar, 4, 0),
                    },
                ],
                filter_strings: vec!["Foo".into()],
                filter_cause: filter_cause::ANVIL_TEXT,
            }],
        };
        let mut buf = BytesMut::new();
        request.proto_encode(&mut buf);
        let decoded = ItemStackRequest::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn several_requests_share_one_packet() {
        let request = ItemStackRequest {
            requests: vec![
                StackRequest {
                    request_id: -1,
                    actions: vec![StackAction::Drop {
                        count: 2,
                        src: slot(ContainerId::Hotbar, 1, 5),
                        randomly: false,
                    }],
                    filter_strings: vec![],
                    filter_cause: 0,
                },
                StackRequest {
                    request_id: -3,
                    actions: vec![
                        StackAction::CraftCreative {
                            creative_item_network_id: 77,
                        },
                        StackAction::CraftLoom {
                            pattern_id: "bo".into(),
                        },
                    ],
                    filter_strings: vec![],
                    filter_cause: 0,
                },
            ],
        };
        let mut buf = BytesMut::new();
        request.proto_encode(&mut buf);
        assert_eq!(buf[0], 2);
        let decoded = ItemStackRequest::proto_decode(&mut buf.freeze()).unwrap();
        assert_eq!(decoded.requests.len(), 2);
        assert_eq!(decoded, request);
    }

    #[test]
    fn unknown_action_type_is_an_error() {
        let data: &[u8] = &[1, 0x01, 1, 99];
        assert!(matches!(
            ItemStackRequest::proto_decode(&mut &data[..]),
            Err(ProtoError::UnknownActionType(99))
        ));
    }

    #[test]
    fn unknown_container_id_is_an_error() {
        let data: &[u8] = &[200, 0, 0];
        assert!(StackSlot::proto_decode(&mut &data[..]).is_err());
    }
}
