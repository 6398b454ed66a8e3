//! Item stack transaction engine for Bedrock Edition clients.
//!
//! Queues inventory operations in a [`Transaction`], compiles them into as
//! few item stack requests as the inlining policy allows, and reconciles the
//! server's responses back into the [`ResourceMirror`].
//!
//! The embedding connection feeds every inbound packet to
//! [`Engine::handle_packet`] (or [`Engine::handle_raw`]) from a single task
//! and supplies a [`PacketSender`] for outbound traffic.

pub mod config;
pub mod container;
pub mod error;
pub mod mirror;
pub mod operations;
pub mod reconcile;
pub mod roles;
pub mod transaction;
pub mod transport;
pub mod virtual_inventory;

#[cfg(test)]
pub(crate) mod testing;

use std::sync::Arc;

use bytes::Buf;
use mc_itx_proto::container::{WINDOW_ARMOR, WINDOW_INVENTORY, WINDOW_OFFHAND, WINDOW_UI};
use mc_itx_proto::packets::ContainerClose;
use mc_itx_proto::{ClientPacket, ProtoError, ServerPacket};
use tokio::sync::oneshot;
use tracing::{debug, error, trace};

pub use config::{EngineConfig, InlinePolicy, OperationKind};
pub use container::{ClosedContainer, ContainerDescriptor, ContainerState, ContainerTracker};
pub use error::EngineError;
pub use mirror::{ResourceMirror, SlotLocation};
pub use operations::OperationManager;
pub use reconcile::ExpectedNewItem;
pub use transaction::{CommitOutcome, CreativeSource, Operation, Transaction};
pub use transport::PacketSender;

use roles::RoleResolver;

pub(crate) struct EngineInner {
    pub(crate) mirror: ResourceMirror,
    pub(crate) containers: ContainerTracker,
    pub(crate) operations: OperationManager,
    pub(crate) policy: InlinePolicy,
    pub(crate) roles: RoleResolver,
    pub(crate) drop_randomly: bool,
    pub(crate) sender: Box<dyn PacketSender>,
}

/// Shared handle to one session's engine.
#[derive(Clone)]
pub struct Engine {
    pub(crate) inner: Arc<EngineInner>,
}

impl Engine {
    pub fn new(config: &EngineConfig, sender: impl PacketSender + 'static) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                mirror: ResourceMirror::new(),
                containers: ContainerTracker::new(),
                operations: OperationManager::new(),
                policy: config.inline_policy(),
                roles: RoleResolver::new(config.role_overrides()),
                drop_randomly: config.transaction.drop_randomly,
                sender: Box::new(sender),
            }),
        }
    }

    pub fn mirror(&self) -> &ResourceMirror {
        &self.inner.mirror
    }

    pub fn containers(&self) -> &ContainerTracker {
        &self.inner.containers
    }

    pub fn operations(&self) -> &OperationManager {
        &self.inner.operations
    }

    pub fn inline_policy(&self) -> &InlinePolicy {
        &self.inner.policy
    }

    /// Start an empty transaction.
    pub fn transaction(&self) -> Transaction {
        Transaction::new(self.clone())
    }

    /// Dispatch one inbound packet.
    ///
    /// A fatal error ([`EngineError::is_fatal`]) means engine and server
    /// disagree about in-flight requests; the session should be closed.
    ///
    /// Commit completions are spawned onto the current Tokio runtime, or run
    /// inline when called from outside one.
    pub fn handle_packet(&self, packet: ServerPacket) -> Result<(), EngineError> {
        let inner = &self.inner;
        match packet {
            ServerPacket::InventoryContent(content) => {
                inner.mirror.apply_inventory_content(&content);
            }
            ServerPacket::ContainerOpen(open) => {
                inner.containers.handle_open(&open);
            }
            ServerPacket::ContainerClose(close) => {
                let closed = inner.containers.handle_close(&close);
                if !is_player_window(closed.window_id) {
                    inner.mirror.remove_window(closed.window_id);
                }
            }
            ServerPacket::ItemStackResponse(response) => {
                if let Err(e) = inner.operations.handle_response(&response, &inner.mirror) {
                    error!("Item stack response handling failed: {e}");
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Decode and dispatch one sub-packet. Packets the engine does not
    /// consume are ignored.
    pub fn handle_raw(&self, buf: &mut impl Buf) -> Result<(), EngineError> {
        match ServerPacket::decode_sub_packet(buf) {
            Ok(packet) => self.handle_packet(packet),
            Err(ProtoError::UnknownPacketId(id)) => {
                trace!("Ignoring packet 0x{id:02X}");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Ask the server to close the open container.
    ///
    /// The returned receiver resolves when the server confirms the close.
    pub fn close_container(&self) -> Result<oneshot::Receiver<ClosedContainer>, EngineError> {
        let inner = &self.inner;
        let (desc, is_open) = inner.containers.container_data();
        let desc = match desc {
            Some(desc) if is_open => desc,
            _ => return Err(EngineError::NoOpenContainer),
        };

        let (tx, rx) = oneshot::channel();
        inner.containers.on_close(move |closed| {
            let _ = tx.send(closed.clone());
        });
        debug!("Closing container window {}", desc.window_id);
        let packet = ClientPacket::ContainerClose(ContainerClose {
            window_id: desc.window_id,
            server_initiated: false,
        });
        if let Err(e) = inner.sender.send(packet) {
            inner.containers.clear_close_hook();
            return Err(e);
        }
        Ok(rx)
    }
}

fn is_player_window(window: u8) -> bool {
    matches!(
        window,
        WINDOW_INVENTORY | WINDOW_OFFHAND | WINDOW_ARMOR | WINDOW_UI
    )
}
