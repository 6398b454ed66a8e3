//! ContainerClose (0x2F): Bidirectional.
//!
//! Sent by the client to close its open container, and by the server to
//! confirm a close or to force one.

use bytes::{Buf, BufMut};

use crate::codec::{read_bool, read_u8, ProtoDecode, ProtoEncode};
use crate::error::ProtoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerClose {
    /// The window ID of the container to close.
    pub window_id: u8,
    /// Whether the server initiated this close.
    pub server_initiated: bool,
}

impl ProtoEncode for ContainerClose {
    fn proto_encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.window_id);
        buf.put_u8(self.server_initiated as u8);
    }
}

impl ProtoDecode for ContainerClose {
    fn proto_decode(buf: &mut impl Buf) -> Result<Self, ProtoError> {
        Ok(Self {
            window_id: read_u8(buf)?,
            server_initiated: read_bool(buf)?,
        })
    }
}
