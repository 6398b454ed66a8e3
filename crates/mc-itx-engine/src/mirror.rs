//! Resource mirror: the client-side copy of server-owned inventory state.
//!
//! Windows are filled by inbound `InventoryContent` packets and by
//! reconciled item stack responses. A content packet replaces its window
//! outright; responses never remove a slot, they write the empty sentinel.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use mc_itx_proto::packets::InventoryContent;
use mc_itx_proto::ItemStack;
use tracing::{debug, trace, warn};

/// Session-scoped window handle.
pub type WindowId = u8;
/// Slot index inside a window.
pub type SlotId = u8;

/// Address of a slot inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotLocation {
    pub window: WindowId,
    pub slot: SlotId,
}

impl SlotLocation {
    pub fn new(window: WindowId, slot: SlotId) -> Self {
        Self { window, slot }
    }
}

impl fmt::Display for SlotLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.window, self.slot)
    }
}

type SlotCallback = Box<dyn FnOnce(&ItemStack) + Send>;

/// Creative network id <-> item runtime id.
#[derive(Debug, Default)]
struct CreativeIndex {
    by_network_id: HashMap<u32, i32>,
    by_runtime_id: HashMap<i32, u32>,
}

/// Shadow of the server's inventories.
#[derive(Default)]
pub struct ResourceMirror {
    windows: Mutex<HashMap<WindowId, HashMap<SlotId, ItemStack>>>,
    callbacks: Mutex<HashMap<SlotLocation, SlotCallback>>,
    creative: Mutex<CreativeIndex>,
}

impl ResourceMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Item held at `loc`, and whether its window has ever been filled.
    ///
    /// A known window without an entry for `slot` yields `(None, true)`.
    pub fn get_item(&self, loc: SlotLocation) -> (Option<ItemStack>, bool) {
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        match windows.get(&loc.window) {
            Some(slots) => (slots.get(&loc.slot).cloned(), true),
            None => (None, false),
        }
    }

    /// Overwrite a slot. `None` stores the empty sentinel.
    pub fn set_item(&self, loc: SlotLocation, item: Option<ItemStack>) {
        let item = item.unwrap_or_else(ItemStack::empty);
        trace!("Mirror {loc} <- {item:?}");
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.entry(loc.window).or_default().insert(loc.slot, item);
    }

    /// Whether `window` has any mirrored content.
    pub fn has_window(&self, window: WindowId) -> bool {
        let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        windows.contains_key(&window)
    }

    /// Forget a window whose handle is no longer valid.
    pub fn remove_window(&self, window: WindowId) {
        let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
        if windows.remove(&window).is_some() {
            debug!("Dropped mirrored contents of window {window}");
        }
    }

    /// Register a one-shot observer for the next inbound content change of `loc`.
    ///
    /// Replaces any observer already registered for that slot.
    pub fn set_callback(&self, loc: SlotLocation, callback: impl FnOnce(&ItemStack) + Send + 'static) {
        let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
        callbacks.insert(loc, Box::new(callback));
    }

    /// Replace a whole window with an inbound content packet.
    ///
    /// Slots past the end of the packet are dropped; observers of dropped
    /// non-empty slots see an empty item.
    pub fn apply_inventory_content(&self, packet: &InventoryContent) {
        let Ok(window) = WindowId::try_from(packet.window_id) else {
            warn!("Ignoring inventory content for window {}", packet.window_id);
            return;
        };

        let mut changed = Vec::new();
        {
            let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);
            let mut previous = windows.remove(&window).unwrap_or_default();
            let mut slots = HashMap::with_capacity(packet.items.len());
            for (index, item) in packet.items.iter().enumerate() {
                let Ok(slot) = SlotId::try_from(index) else {
                    warn!("Window {window} content has more than 256 slots, truncating");
                    break;
                };
                if previous.remove(&slot).as_ref() != Some(item) {
                    changed.push((SlotLocation::new(window, slot), item.clone()));
                }
                slots.insert(slot, item.clone());
            }
            // Slots the new content no longer covers are gone.
            for (slot, item) in previous {
                if !item.is_empty() {
                    changed.push((SlotLocation::new(window, slot), ItemStack::empty()));
                }
            }
            windows.insert(window, slots);
        }
        debug!(
            "Window {window} content: {} slots, {} changed",
            packet.items.len(),
            changed.len()
        );

        let fired: Vec<_> = {
            let mut callbacks = self.callbacks.lock().unwrap_or_else(PoisonError::into_inner);
            changed
                .into_iter()
                .filter_map(|(loc, item)| callbacks.remove(&loc).map(|cb| (cb, item)))
                .collect()
        };
        for (callback, item) in fired {
            callback(&item);
        }
    }

    /// Install the creative item index as `(creative network id, item runtime id)` pairs.
    pub fn set_creative_items(&self, items: impl IntoIterator<Item = (u32, i32)>) {
        let mut creative = self.creative.lock().unwrap_or_else(PoisonError::into_inner);
        creative.by_network_id.clear();
        creative.by_runtime_id.clear();
        for (network_id, runtime_id) in items {
            creative.by_network_id.insert(network_id, runtime_id);
            creative.by_runtime_id.entry(runtime_id).or_insert(network_id);
        }
        debug!("Creative index holds {} items", creative.by_network_id.len());
    }

    /// Item runtime id produced by a creative entry.
    pub fn creative_item(&self, network_id: u32) -> Option<i32> {
        let creative = self.creative.lock().unwrap_or_else(PoisonError::into_inner);
        creative.by_network_id.get(&network_id).copied()
    }

    /// First creative entry producing `runtime_id`.
    pub fn creative_network_id(&self, runtime_id: i32) -> Option<u32> {
        let creative = self.creative.lock().unwrap_or_else(PoisonError::into_inner);
        creative.by_runtime_id.get(&runtime_id).copied()
    }
}
