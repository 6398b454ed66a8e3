//! Fixtures shared by the engine tests: a seeded engine on a channel
//! transport and a scripted server answering one request packet.

use mc_itx_proto::container::{container_type, WINDOW_INVENTORY, WINDOW_UI};
use mc_itx_proto::packets::item_stack_response::STATUS_OK;
use mc_itx_proto::packets::{
    ContainerOpen, InventoryContent, ItemStackRequest, ItemStackResponse, StackRequest,
    StackResponseContainer, StackResponseEntry, StackResponseSlot,
};
use mc_itx_proto::types::BlockPos;
use mc_itx_proto::{ClientPacket, ContainerId, ItemStack, ServerPacket};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Engine, EngineConfig, SlotLocation};

/// Engine whose inventory holds, in hotbar slots 0-3:
/// `(runtime 5, x10, id 100)`, `(6, x4, 101)`, `(7, x1, 102)`, `(8, x1, 103)`.
/// All other slots of window 0 are empty.
pub(crate) fn test_engine() -> (Engine, mpsc::UnboundedReceiver<ClientPacket>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let engine = Engine::new(&EngineConfig::default(), tx);

    let mut items = vec![ItemStack::empty(); 36];
    items[0] = ItemStack::with_stack_id(5, 10, 100);
    items[1] = ItemStack::with_stack_id(6, 4, 101);
    items[2] = ItemStack::with_stack_id(7, 1, 102);
    items[3] = ItemStack::with_stack_id(8, 1, 103);
    engine.mirror().apply_inventory_content(&InventoryContent {
        window_id: u32::from(WINDOW_INVENTORY),
        items,
    });
    (engine, rx)
}

pub(crate) fn hotbar(slot: u8) -> SlotLocation {
    SlotLocation::new(WINDOW_INVENTORY, slot)
}

pub(crate) fn inv(slot: u8) -> SlotLocation {
    SlotLocation::new(WINDOW_INVENTORY, slot)
}

pub(crate) fn ui(slot: u8) -> SlotLocation {
    SlotLocation::new(WINDOW_UI, slot)
}

fn open(engine: &Engine, window_id: u8, kind: u8) {
    engine.containers().handle_open(&ContainerOpen {
        window_id,
        container_type: kind,
        position: BlockPos::new(0, 64, 0),
        entity_unique_id: -1,
    });
}

pub(crate) fn anvil(engine: &Engine, window_id: u8) {
    open(engine, window_id, container_type::ANVIL);
}

pub(crate) fn loom(engine: &Engine, window_id: u8) {
    open(engine, window_id, container_type::LOOM);
}

pub(crate) fn slot_ack(slot: u8, count: u8, stack_network_id: i32, name: &str) -> StackResponseSlot {
    StackResponseSlot {
        slot,
        hotbar_slot: slot,
        count,
        stack_network_id,
        custom_name: name.to_string(),
        durability_correction: 0,
    }
}

/// A successful entry touching the given roles.
pub(crate) fn accept(
    request_id: i32,
    containers: Vec<(ContainerId, Vec<StackResponseSlot>)>,
) -> StackResponseEntry {
    StackResponseEntry {
        status: STATUS_OK,
        request_id,
        containers: containers
            .into_iter()
            .map(|(role, slots)| StackResponseContainer {
                container_id: role.as_u8(),
                dynamic_container_id: 0,
                slots,
            })
            .collect(),
    }
}

/// A successful entry with no slot updates.
pub(crate) fn reply(request_id: i32) -> StackResponseEntry {
    accept(request_id, Vec::new())
}

/// Answers the next ItemStackRequest packet with one ItemStackResponse.
pub(crate) struct ScriptedServer {
    handle: JoinHandle<Vec<ItemStackRequest>>,
}

impl ScriptedServer {
    pub(crate) fn spawn(
        engine: Engine,
        mut rx: mpsc::UnboundedReceiver<ClientPacket>,
        answer: impl Fn(&StackRequest) -> Vec<StackResponseEntry> + Send + 'static,
    ) -> Self {
        let handle = tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Some(packet) = rx.recv().await {
                let ClientPacket::ItemStackRequest(request) = packet else {
                    continue;
                };
                let responses = request.requests.iter().flat_map(|r| answer(r)).collect();
                engine
                    .handle_packet(ServerPacket::ItemStackResponse(ItemStackResponse {
                        responses,
                    }))
                    .unwrap();
                seen.push(request);
                break;
            }
            seen
        });
        Self { handle }
    }

    /// Wait for the server task and return the packets it answered.
    pub(crate) async fn finish(self) -> Vec<ItemStackRequest> {
        self.handle.await.unwrap()
    }
}
