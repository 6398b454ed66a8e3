//! Window/slot -> request role resolution.

use std::collections::HashMap;

use mc_itx_proto::container::{
    container_type, HOTBAR_SIZE, UI_SLOT_ANVIL_INPUT, UI_SLOT_ANVIL_MATERIAL, UI_SLOT_CREATED_OUTPUT,
    UI_SLOT_CURSOR, UI_SLOT_LOOM_DYE, UI_SLOT_LOOM_INPUT, UI_SLOT_LOOM_MATERIAL, WINDOW_ARMOR,
    WINDOW_INVENTORY, WINDOW_OFFHAND, WINDOW_UI,
};
use mc_itx_proto::ContainerId;

use crate::container::ContainerDescriptor;
use crate::error::EngineError;
use crate::mirror::SlotLocation;

#[derive(Debug, Clone, Default)]
pub struct RoleResolver {
    overrides: HashMap<u8, ContainerId>,
}

impl RoleResolver {
    pub fn new(overrides: HashMap<u8, ContainerId>) -> Self {
        Self { overrides }
    }

    /// Role of `loc` given the currently open container, if any.
    pub fn resolve(
        &self,
        loc: SlotLocation,
        open: Option<&ContainerDescriptor>,
    ) -> Result<ContainerId, EngineError> {
        let unresolved = || EngineError::UnresolvedRole {
            window: loc.window,
            slot: loc.slot,
        };
        match loc.window {
            WINDOW_INVENTORY if loc.slot < HOTBAR_SIZE => Ok(ContainerId::Hotbar),
            WINDOW_INVENTORY => Ok(ContainerId::Inventory),
            WINDOW_OFFHAND => Ok(ContainerId::Offhand),
            WINDOW_ARMOR => Ok(ContainerId::Armor),
            WINDOW_UI => ui_role(loc.slot).ok_or_else(unresolved),
            window => {
                let desc = open.ok_or(EngineError::NoOpenContainer)?;
                if desc.window_id != window {
                    return Err(EngineError::WindowNotOpen { window });
                }
                self.container_role(desc.container_type)
                    .ok_or_else(unresolved)
            }
        }
    }

    fn container_role(&self, kind: u8) -> Option<ContainerId> {
        if let Some(role) = self.overrides.get(&kind) {
            return Some(*role);
        }
        match kind {
            container_type::CONTAINER
            | container_type::DISPENSER
            | container_type::DROPPER
            | container_type::HOPPER
            | container_type::MINECART_CHEST
            | container_type::MINECART_HOPPER
            | container_type::CHEST_BOAT => Some(ContainerId::LevelEntity),
            _ => None,
        }
    }
}

fn ui_role(slot: u8) -> Option<ContainerId> {
    let role = match slot {
        UI_SLOT_CURSOR => ContainerId::Cursor,
        UI_SLOT_ANVIL_INPUT => ContainerId::AnvilInput,
        UI_SLOT_ANVIL_MATERIAL => ContainerId::AnvilMaterial,
        UI_SLOT_LOOM_INPUT => ContainerId::LoomInput,
        UI_SLOT_LOOM_DYE => ContainerId::LoomDye,
        UI_SLOT_LOOM_MATERIAL => ContainerId::LoomMaterial,
        UI_SLOT_CREATED_OUTPUT => ContainerId::CreatedOutput,
        _ => return None,
    };
    Some(role)
}

/// Fail unless the open container has type `expected`.
pub fn require_container(
    open: Option<&ContainerDescriptor>,
    expected: u8,
) -> Result<&ContainerDescriptor, EngineError> {
    let desc = open.ok_or(EngineError::NoOpenContainer)?;
    if desc.container_type != expected {
        return Err(EngineError::WrongContainerType {
            expected,
            actual: desc.container_type,
        });
    }
    Ok(desc)
}
