//! Transactions: queue logical inventory operations, then commit them as
//! one outbound ItemStackRequest.
//!
//! Consecutive inlineable operations share a request; every dedicated
//! operation gets a request of its own. Slots are addressed through a
//! per-commit [`VirtualInventory`] so later operations can chain on the
//! predicted results of earlier ones.

use std::collections::{BTreeSet, HashMap};

use mc_itx_proto::container::{
    container_type, UI_SLOT_ANVIL_INPUT, UI_SLOT_CREATED_OUTPUT, UI_SLOT_LOOM_DYE,
    UI_SLOT_LOOM_INPUT, UI_SLOT_LOOM_MATERIAL, WINDOW_INVENTORY, WINDOW_UI,
};
use mc_itx_proto::packets::item_stack_request::filter_cause;
use mc_itx_proto::packets::{
    ItemStackRequest, StackAction, StackRequest, StackResponseEntry, StackSlot,
};
use mc_itx_proto::{ClientPacket, ContainerId, ItemStack};
use tokio::sync::oneshot;
use tracing::debug;

use crate::config::{InlinePolicy, OperationKind};
use crate::container::ContainerDescriptor;
use crate::error::EngineError;
use crate::mirror::{SlotLocation, WindowId};
use crate::operations::ResponseMapping;
use crate::reconcile::{patch_display_name, ExpectedNewItem, PredictedSlot};
use crate::roles::require_container;
use crate::virtual_inventory::VirtualInventory;
use crate::{Engine, EngineInner};

/// Where a creative fetch takes its item from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreativeSource {
    /// Creative item network id.
    NetworkId(u32),
    /// Item runtime id, looked up in the creative index.
    ItemType(i32),
}

/// A queued logical operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Move {
        src: SlotLocation,
        dst: SlotLocation,
        count: u8,
    },
    Swap {
        src: SlotLocation,
        dst: SlotLocation,
    },
    Drop {
        slot: SlotLocation,
        count: u8,
    },
    CreativeFetch {
        source: CreativeSource,
        dst: SlotLocation,
        count: u8,
        expected: Option<ExpectedNewItem>,
    },
    AnvilRename {
        slot: SlotLocation,
        name: String,
        expected: Option<ExpectedNewItem>,
    },
    LoomCombine {
        pattern_id: String,
        pattern: Option<SlotLocation>,
        banner: SlotLocation,
        dye: SlotLocation,
        expected: ExpectedNewItem,
    },
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Move { .. } => OperationKind::Move,
            Operation::Swap { .. } => OperationKind::Swap,
            Operation::Drop { .. } => OperationKind::Drop,
            Operation::CreativeFetch { .. } => OperationKind::CreativeFetch,
            Operation::AnvilRename { .. } => OperationKind::AnvilRename,
            Operation::LoomCombine { .. } => OperationKind::LoomCombine,
        }
    }
}

/// Split `operations` into request-sized groups.
///
/// Runs of inlineable operations form one group; each dedicated operation
/// is a group on its own. Order is preserved.
pub fn group_operations<'a>(
    operations: &'a [Operation],
    policy: &InlinePolicy,
) -> Vec<&'a [Operation]> {
    let mut groups = Vec::new();
    let mut start = 0;
    for (i, op) in operations.iter().enumerate() {
        if policy.is_dedicated(op.kind()) {
            if start < i {
                groups.push(&operations[start..i]);
            }
            groups.push(&operations[i..=i]);
            start = i + 1;
        }
    }
    if start < operations.len() {
        groups.push(&operations[start..]);
    }
    groups
}

/// Result of a commit that reached the server.
#[derive(Debug, Clone, PartialEq)]
pub struct CommitOutcome {
    /// Every request was accepted.
    pub success: bool,
    /// The packet that was sent. `None` when nothing was queued.
    pub request: Option<ItemStackRequest>,
    /// One response per request, in request order.
    pub responses: Vec<StackResponseEntry>,
}

/// One compiled request and the bookkeeping registered for it.
#[derive(Debug, Clone)]
pub struct CompiledGroup {
    pub request: StackRequest,
    pub mapping: ResponseMapping,
    pub predictions: HashMap<SlotLocation, PredictedSlot>,
}

/// A batch of operations against one engine.
pub struct Transaction {
    engine: Engine,
    operations: Vec<Operation>,
}

impl Transaction {
    pub(crate) fn new(engine: Engine) -> Self {
        Self {
            engine,
            operations: Vec::new(),
        }
    }

    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn push(&mut self, operation: Operation) -> &mut Self {
        self.operations.push(operation);
        self
    }

    /// Move `count` items from `src` to `dst`.
    pub fn move_item(&mut self, src: SlotLocation, dst: SlotLocation, count: u8) -> &mut Self {
        self.push(Operation::Move { src, dst, count })
    }

    pub fn swap(&mut self, src: SlotLocation, dst: SlotLocation) -> &mut Self {
        self.push(Operation::Swap { src, dst })
    }

    /// Drop `count` items from `slot` into the world.
    pub fn drop_item(&mut self, slot: SlotLocation, count: u8) -> &mut Self {
        self.push(Operation::Drop { slot, count })
    }

    /// Take `count` items out of the creative inventory into `dst`.
    ///
    /// The item type comes from the creative index; use
    /// [`get_from_creative_source_with`](Self::get_from_creative_source_with)
    /// for items the index does not know.
    pub fn get_from_creative_source(
        &mut self,
        source: CreativeSource,
        dst: SlotLocation,
        count: u8,
    ) -> &mut Self {
        self.push(Operation::CreativeFetch {
            source,
            dst,
            count,
            expected: None,
        })
    }

    /// Creative fetch, declaring the fetched item's type and user data.
    pub fn get_from_creative_source_with(
        &mut self,
        source: CreativeSource,
        dst: SlotLocation,
        count: u8,
        expected: ExpectedNewItem,
    ) -> &mut Self {
        self.push(Operation::CreativeFetch {
            source,
            dst,
            count,
            expected: Some(expected),
        })
    }

    /// Rename the item at `slot` through the open anvil.
    pub fn rename_via_anvil(&mut self, slot: SlotLocation, name: impl Into<String>) -> &mut Self {
        self.push(Operation::AnvilRename {
            slot,
            name: name.into(),
            expected: None,
        })
    }

    /// Rename through the anvil, declaring what the renamed item will carry
    /// beyond its name (typically a repair cost bump).
    pub fn rename_via_anvil_with(
        &mut self,
        slot: SlotLocation,
        name: impl Into<String>,
        expected: ExpectedNewItem,
    ) -> &mut Self {
        self.push(Operation::AnvilRename {
            slot,
            name: name.into(),
            expected: Some(expected),
        })
    }

    /// Apply `pattern_id` to the banner at `banner` through the open loom.
    ///
    /// `pattern` is the banner pattern item slot for patterns that need one.
    /// The resulting banner data is not echoed by the server, so `expected`
    /// must carry it.
    pub fn combine_via_loom(
        &mut self,
        pattern_id: impl Into<String>,
        pattern: Option<SlotLocation>,
        banner: SlotLocation,
        dye: SlotLocation,
        expected: ExpectedNewItem,
    ) -> &mut Self {
        self.push(Operation::LoomCombine {
            pattern_id: pattern_id.into(),
            pattern,
            banner,
            dye,
            expected,
        })
    }

    /// Drop every queued operation.
    pub fn discard(&mut self) {
        self.operations.clear();
    }

    /// Compile, send and wait for every request of this transaction.
    ///
    /// Local failures return `Err` before anything is sent and keep the
    /// queue intact. Once the packet is sent the queue is cleared, whatever
    /// the server answers. After a partial rejection the predicted state of
    /// slots touched by later requests may not match the server; callers
    /// should resynchronize from fresh inventory contents.
    pub async fn commit(&mut self) -> Result<CommitOutcome, EngineError> {
        if self.operations.is_empty() {
            return Ok(CommitOutcome {
                success: true,
                request: None,
                responses: Vec::new(),
            });
        }

        let inner = &self.engine.inner;
        let groups = self.compile()?;

        let mut waiting = Vec::with_capacity(groups.len());
        let mut packet = ItemStackRequest::default();
        for group in groups {
            let request_id = group.request.request_id;
            let (tx, rx) = oneshot::channel();
            inner.operations.add_new_request(
                request_id,
                group.mapping,
                group.predictions,
                Box::new(move |entry| {
                    let _ = tx.send(entry);
                }),
            );
            waiting.push((request_id, rx));
            packet.requests.push(group.request);
        }

        debug!(
            "Sending {} item stack requests for {} operations",
            packet.requests.len(),
            self.operations.len()
        );
        if let Err(e) = inner
            .sender
            .send(ClientPacket::ItemStackRequest(packet.clone()))
        {
            for (request_id, _) in &waiting {
                inner.operations.cancel(*request_id);
            }
            return Err(e);
        }
        self.operations.clear();

        let mut responses = Vec::with_capacity(waiting.len());
        for (request_id, rx) in waiting {
            let entry = rx
                .await
                .map_err(|_| EngineError::CompletionDropped(request_id))?;
            responses.push(entry);
        }

        let success = responses.iter().all(StackResponseEntry::is_success);
        debug!(
            "Transaction finished: {} of {} requests accepted",
            responses.iter().filter(|r| r.is_success()).count(),
            responses.len()
        );
        Ok(CommitOutcome {
            success,
            request: Some(packet),
            responses,
        })
    }

    /// Compile the queued operations into requests, allocating request ids.
    pub fn compile(&self) -> Result<Vec<CompiledGroup>, EngineError> {
        let inner = &self.engine.inner;
        let (open, _) = inner.containers.container_data();
        let mut vi = VirtualInventory::new(&inner.mirror);

        group_operations(&self.operations, &inner.policy)
            .into_iter()
            .map(|group| {
                let mut builder =
                    GroupBuilder::new(inner, open.as_ref(), inner.operations.new_request_id());
                for op in group {
                    builder.push_operation(&mut vi, op)?;
                }
                builder.finish(&mut vi)
            })
            .collect()
    }
}

struct GroupBuilder<'e> {
    inner: &'e EngineInner,
    open: Option<&'e ContainerDescriptor>,
    request_id: i32,
    actions: Vec<StackAction>,
    mapping: ResponseMapping,
    touched: BTreeSet<SlotLocation>,
    expected: HashMap<SlotLocation, ExpectedNewItem>,
    filter_strings: Vec<String>,
    filter_cause: i32,
}

impl<'e> GroupBuilder<'e> {
    fn new(inner: &'e EngineInner, open: Option<&'e ContainerDescriptor>, request_id: i32) -> Self {
        Self {
            inner,
            open,
            request_id,
            actions: Vec::new(),
            mapping: ResponseMapping::new(),
            touched: BTreeSet::new(),
            expected: HashMap::new(),
            filter_strings: Vec::new(),
            filter_cause: filter_cause::SERVER_CHAT_PUBLIC,
        }
    }

    /// Address `loc` in this request and tag it with the request id.
    fn slot(&mut self, vi: &mut VirtualInventory<'_>, loc: SlotLocation) -> Result<StackSlot, EngineError> {
        let role = self.inner.roles.resolve(loc, self.open)?;
        let stack_id = vi.load_and_reserve(loc, self.request_id)?;
        self.map(role, loc.window);
        self.touched.insert(loc);
        Ok(StackSlot::new(role, loc.slot, stack_id))
    }

    /// The slot a crafting action produces into.
    fn created_output(&mut self) -> StackSlot {
        self.map(ContainerId::CreatedOutput, WINDOW_UI);
        StackSlot::new(ContainerId::CreatedOutput, UI_SLOT_CREATED_OUTPUT, self.request_id)
    }

    fn map(&mut self, role: ContainerId, window: WindowId) {
        self.mapping.insert(role, window);
        if matches!(role, ContainerId::Hotbar | ContainerId::Inventory) {
            self.mapping
                .insert(ContainerId::CombinedHotbarAndInventory, WINDOW_INVENTORY);
        }
    }

    fn place(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        src: SlotLocation,
        dst: SlotLocation,
        count: u8,
    ) -> Result<(), EngineError> {
        let src_slot = self.slot(vi, src)?;
        let dst_slot = self.slot(vi, dst)?;
        self.actions.push(StackAction::Place {
            count,
            src: src_slot,
            dst: dst_slot,
        });
        vi.transfer(src, dst, count)
    }

    fn consume(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        loc: SlotLocation,
        count: u8,
    ) -> Result<ItemStack, EngineError> {
        let src = self.slot(vi, loc)?;
        self.actions.push(StackAction::Consume { count, src });
        vi.take(loc, count)
    }

    /// Place the crafted `item` from the created output slot into `dst`.
    fn place_output(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        item: ItemStack,
        dst: SlotLocation,
        count: u8,
    ) -> Result<(), EngineError> {
        let src = self.created_output();
        let dst_slot = self.slot(vi, dst)?;
        self.actions.push(StackAction::Place {
            count,
            src,
            dst: dst_slot,
        });
        vi.place(dst, item)
    }

    fn push_operation(&mut self, vi: &mut VirtualInventory<'_>, op: &Operation) -> Result<(), EngineError> {
        match op {
            Operation::Move { src, dst, count } => self.place(vi, *src, *dst, *count),
            Operation::Swap { src, dst } => {
                let src_slot = self.slot(vi, *src)?;
                let dst_slot = self.slot(vi, *dst)?;
                self.actions.push(StackAction::Swap {
                    src: src_slot,
                    dst: dst_slot,
                });
                vi.swap(*src, *dst)
            }
            Operation::Drop { slot, count } => {
                let src = self.slot(vi, *slot)?;
                self.actions.push(StackAction::Drop {
                    count: *count,
                    src,
                    randomly: self.inner.drop_randomly,
                });
                vi.take(*slot, *count).map(|_| ())
            }
            Operation::CreativeFetch {
                source,
                dst,
                count,
                expected,
            } => self.creative_fetch(vi, *source, *dst, *count, expected.as_ref()),
            Operation::AnvilRename {
                slot,
                name,
                expected,
            } => self.anvil_rename(vi, *slot, name, expected.as_ref()),
            Operation::LoomCombine {
                pattern_id,
                pattern,
                banner,
                dye,
                expected,
            } => self.loom_combine(vi, pattern_id, *pattern, *banner, *dye, expected),
        }
    }

    fn creative_fetch(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        source: CreativeSource,
        dst: SlotLocation,
        count: u8,
        expected: Option<&ExpectedNewItem>,
    ) -> Result<(), EngineError> {
        let mirror = &self.inner.mirror;
        let declared = expected.and_then(|e| e.network_id);
        let (network_id, runtime_id) = match source {
            CreativeSource::NetworkId(network_id) => {
                (network_id, declared.or_else(|| mirror.creative_item(network_id)))
            }
            CreativeSource::ItemType(runtime_id) => {
                let network_id = mirror
                    .creative_network_id(runtime_id)
                    .ok_or(EngineError::UnknownCreativeItem(source))?;
                (network_id, Some(declared.unwrap_or(runtime_id)))
            }
        };
        // Without a type the acknowledged slot would hold air with a count.
        let runtime_id = runtime_id.ok_or(EngineError::UnknownCreativeItem(source))?;

        let mut expected = expected.cloned().unwrap_or_default();
        expected.network_id = Some(runtime_id);
        let mut item = ItemStack::new(runtime_id, u16::from(count));
        if let Some(nbt) = &expected.nbt {
            item.nbt = (!nbt.is_empty()).then(|| nbt.clone());
        }

        self.actions.push(StackAction::CraftCreative {
            creative_item_network_id: network_id,
        });
        self.expect(dst, expected);
        self.place_output(vi, item, dst, count)
    }

    fn anvil_rename(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        slot: SlotLocation,
        name: &str,
        expected: Option<&ExpectedNewItem>,
    ) -> Result<(), EngineError> {
        require_container(self.open, container_type::ANVIL)?;
        let item = self.require_item(vi, slot)?;
        let count = u8::try_from(item.count).unwrap_or(u8::MAX);
        let input = SlotLocation::new(WINDOW_UI, UI_SLOT_ANVIL_INPUT);

        self.place(vi, slot, input, count)?;
        self.actions.push(StackAction::CraftRecipeOptional {
            recipe_network_id: 0,
            filter_string_index: self.filter_strings.len() as i32,
        });
        self.filter_strings.push(name.to_string());
        self.filter_cause = filter_cause::ANVIL_TEXT;

        let mut renamed = self.consume(vi, input, count)?;
        patch_display_name(&mut renamed.nbt, name);
        self.place_output(vi, renamed, slot, count)?;

        if let Some(expected) = expected {
            self.expect(slot, expected.clone());
        }
        Ok(())
    }

    fn loom_combine(
        &mut self,
        vi: &mut VirtualInventory<'_>,
        pattern_id: &str,
        pattern: Option<SlotLocation>,
        banner: SlotLocation,
        dye: SlotLocation,
        expected: &ExpectedNewItem,
    ) -> Result<(), EngineError> {
        require_container(self.open, container_type::LOOM)?;
        self.require_item(vi, banner)?;
        self.require_item(vi, dye)?;
        let loom_input = SlotLocation::new(WINDOW_UI, UI_SLOT_LOOM_INPUT);
        let loom_dye = SlotLocation::new(WINDOW_UI, UI_SLOT_LOOM_DYE);
        let loom_material = SlotLocation::new(WINDOW_UI, UI_SLOT_LOOM_MATERIAL);

        self.place(vi, banner, loom_input, 1)?;
        self.place(vi, dye, loom_dye, 1)?;
        if let Some(pattern) = pattern {
            self.require_item(vi, pattern)?;
            self.place(vi, pattern, loom_material, 1)?;
        }

        self.actions.push(StackAction::CraftLoom {
            pattern_id: pattern_id.to_string(),
        });
        let mut result = self.consume(vi, loom_input, 1)?;
        self.consume(vi, loom_dye, 1)?;
        if let Some(nbt) = &expected.nbt {
            result.nbt = Some(nbt.clone());
        }
        self.place_output(vi, result, banner, 1)?;

        // The pattern item is not used up.
        if let Some(pattern) = pattern {
            self.place(vi, loom_material, pattern, 1)?;
        }

        self.expect(banner, expected.clone());
        Ok(())
    }

    fn require_item(&self, vi: &mut VirtualInventory<'_>, loc: SlotLocation) -> Result<ItemStack, EngineError> {
        let item = vi.item(loc)?;
        if item.is_empty() {
            return Err(EngineError::MissingSlot {
                window: loc.window,
                slot: loc.slot,
            });
        }
        Ok(item)
    }

    fn expect(&mut self, loc: SlotLocation, expected: ExpectedNewItem) {
        self.expected.insert(loc, expected);
    }

    fn finish(mut self, vi: &mut VirtualInventory<'_>) -> Result<CompiledGroup, EngineError> {
        let mut predictions = HashMap::with_capacity(self.touched.len());
        for loc in &self.touched {
            predictions.insert(
                *loc,
                PredictedSlot {
                    template: Some(vi.item(*loc)?),
                    expected: self.expected.remove(loc),
                },
            );
        }
        debug!(
            "Compiled request {}: {} actions over {} slots",
            self.request_id,
            self.actions.len(),
            predictions.len()
        );
        Ok(CompiledGroup {
            request: StackRequest {
                request_id: self.request_id,
                actions: self.actions,
                filter_strings: self.filter_strings,
                filter_cause: self.filter_cause,
            },
            mapping: self.mapping,
            predictions,
        })
    }
}
