//! Outbound transport boundary.

use bytes::Bytes;
use mc_itx_proto::ClientPacket;
use tokio::sync::mpsc;

use crate::error::EngineError;

/// Sends packets to the server. Implemented by the connection layer.
pub trait PacketSender: Send + Sync {
    fn send(&self, packet: ClientPacket) -> Result<(), EngineError>;
}

/// Typed packets handed to a connection task.
impl PacketSender for mpsc::UnboundedSender<ClientPacket> {
    fn send(&self, packet: ClientPacket) -> Result<(), EngineError> {
        mpsc::UnboundedSender::send(self, packet)
            .map_err(|_| EngineError::Transport("packet channel closed".into()))
    }
}

/// Encoded sub-packets (`VarUInt32(id) + body`) handed to a batching layer.
impl PacketSender for mpsc::UnboundedSender<Bytes> {
    fn send(&self, packet: ClientPacket) -> Result<(), EngineError> {
        mpsc::UnboundedSender::send(self, packet.to_sub_packet())
            .map_err(|_| EngineError::Transport("packet channel closed".into()))
    }
}
