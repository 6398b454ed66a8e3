//! Transaction-scoped overlay over the resource mirror.
//!
//! A stack's id becomes the id of the request that last touched it. The
//! overlay records that prediction for every slot a transaction references,
//! so later operations in the same commit can chain on results the server
//! has not confirmed yet. It also tracks the predicted contents of each
//! touched slot, which become reconciliation templates.

use std::collections::HashMap;

use mc_itx_proto::container::WINDOW_UI;
use mc_itx_proto::ItemStack;

use crate::error::EngineError;
use crate::mirror::{ResourceMirror, SlotLocation};

#[derive(Debug, Clone)]
struct VirtualSlot {
    stack_id: i32,
    item: ItemStack,
}

pub struct VirtualInventory<'a> {
    mirror: &'a ResourceMirror,
    slots: HashMap<SlotLocation, VirtualSlot>,
}

impl<'a> VirtualInventory<'a> {
    pub fn new(mirror: &'a ResourceMirror) -> Self {
        Self {
            mirror,
            slots: HashMap::new(),
        }
    }

    /// Stack id to use for `loc` right now.
    pub fn load(&mut self, loc: SlotLocation) -> Result<i32, EngineError> {
        Ok(self.entry(loc)?.stack_id)
    }

    /// Return the stack id to use for `loc`, then tag the slot with `request_id`.
    pub fn load_and_reserve(&mut self, loc: SlotLocation, request_id: i32) -> Result<i32, EngineError> {
        let slot = self.entry(loc)?;
        let previous = slot.stack_id;
        slot.stack_id = request_id;
        Ok(previous)
    }

    /// Predicted contents of `loc`.
    pub fn item(&mut self, loc: SlotLocation) -> Result<ItemStack, EngineError> {
        Ok(self.entry(loc)?.item.clone())
    }

    /// Move `count` items from `src` into `dst`.
    pub fn transfer(&mut self, src: SlotLocation, dst: SlotLocation, count: u8) -> Result<(), EngineError> {
        let moved = self.take(src, count)?;
        self.place(dst, moved)
    }

    /// Exchange the contents of two slots.
    pub fn swap(&mut self, a: SlotLocation, b: SlotLocation) -> Result<(), EngineError> {
        let item_a = self.item(a)?;
        let item_b = self.item(b)?;
        self.entry(a)?.item = item_b;
        self.entry(b)?.item = item_a;
        Ok(())
    }

    /// Remove up to `count` items from `loc` and return them.
    pub fn take(&mut self, loc: SlotLocation, count: u8) -> Result<ItemStack, EngineError> {
        let slot = self.entry(loc)?;
        if slot.item.is_empty() {
            return Ok(ItemStack::empty());
        }
        let taken = u16::from(count).min(slot.item.count);
        let mut moved = slot.item.clone();
        moved.count = taken;
        slot.item.count -= taken;
        if slot.item.count == 0 {
            slot.item = ItemStack::empty();
        }
        Ok(moved)
    }

    /// Add `item` to `loc`, stacking onto what is already there.
    pub fn place(&mut self, loc: SlotLocation, item: ItemStack) -> Result<(), EngineError> {
        let slot = self.entry(loc)?;
        if item.is_empty() {
            return Ok(());
        }
        if slot.item.is_empty() {
            slot.item = item;
        } else {
            slot.item.count = slot.item.count.saturating_add(item.count);
        }
        Ok(())
    }

    fn entry(&mut self, loc: SlotLocation) -> Result<&mut VirtualSlot, EngineError> {
        if !self.slots.contains_key(&loc) {
            let (item, window_exists) = self.mirror.get_item(loc);
            // UI slots are transient and may never have been filled.
            if !window_exists && loc.window != WINDOW_UI {
                return Err(EngineError::MissingSlot {
                    window: loc.window,
                    slot: loc.slot,
                });
            }
            let item = item.unwrap_or_else(ItemStack::empty);
            let slot = VirtualSlot {
                stack_id: item.stack_network_id,
                item,
            };
            self.slots.insert(loc, slot);
        }
        self.slots.get_mut(&loc).ok_or(EngineError::MissingSlot {
            window: loc.window,
            slot: loc.slot,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(window: u8, slot: u8) -> SlotLocation {
        SlotLocation::new(window, slot)
    }

    fn mirror() -> ResourceMirror {
        let mirror = ResourceMirror::new();
        mirror.set_item(loc(0, 0), Some(ItemStack::with_stack_id(5, 10, 11)));
        mirror.set_item(loc(0, 9), None);
        mirror
    }

    #[test]
    fn load_reads_mirror_once() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        assert_eq!(vi.load(loc(0, 0)).unwrap(), 11);

        // Later mirror writes do not leak into a running transaction.
        mirror.set_item(loc(0, 0), Some(ItemStack::with_stack_id(5, 10, 99)));
        assert_eq!(vi.load(loc(0, 0)).unwrap(), 11);
    }

    #[test]
    fn reserve_chains_request_ids() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        assert_eq!(vi.load_and_reserve(loc(0, 0), -1).unwrap(), 11);
        assert_eq!(vi.load_and_reserve(loc(0, 0), -3).unwrap(), -1);
        assert_eq!(vi.load(loc(0, 0)).unwrap(), -3);
    }

    #[test]
    fn missing_window_is_an_error() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        assert!(matches!(
            vi.load(loc(7, 0)),
            Err(EngineError::MissingSlot { window: 7, slot: 0 })
        ));
        // The UI window is always addressable.
        assert_eq!(vi.load(loc(WINDOW_UI, 50)).unwrap(), 0);
    }

    #[test]
    fn transfer_predicts_contents() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        vi.transfer(loc(0, 0), loc(0, 9), 3).unwrap();
        assert_eq!(vi.item(loc(0, 0)).unwrap().count, 7);
        let dst = vi.item(loc(0, 9)).unwrap();
        assert_eq!((dst.runtime_id, dst.count), (5, 3));

        vi.transfer(loc(0, 0), loc(0, 9), 64).unwrap();
        assert!(vi.item(loc(0, 0)).unwrap().is_empty());
        assert_eq!(vi.item(loc(0, 9)).unwrap().count, 10);
    }

    #[test]
    fn swap_exchanges_contents() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        vi.swap(loc(0, 0), loc(0, 9)).unwrap();
        assert!(vi.item(loc(0, 0)).unwrap().is_empty());
        assert_eq!(vi.item(loc(0, 9)).unwrap().count, 10);
    }

    #[test]
    fn take_from_empty_slot_yields_nothing() {
        let mirror = mirror();
        let mut vi = VirtualInventory::new(&mirror);
        assert!(vi.take(loc(0, 9), 4).unwrap().is_empty());
    }
}
