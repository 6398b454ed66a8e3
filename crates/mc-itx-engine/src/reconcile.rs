//! Response reconciliation.
//!
//! A successful item stack response only echoes the final count, stack id
//! and custom name of each touched slot. The rest of the item comes from a
//! client-side base (the predicted template or the mirrored item) plus the
//! deltas the caller declared for the slot.

use mc_itx_nbt::{NbtCompound, NbtTag};
use mc_itx_proto::packets::StackResponseSlot;
use mc_itx_proto::ItemStack;

const TAG_DISPLAY: &str = "display";
const TAG_NAME: &str = "Name";
const TAG_REPAIR_COST: &str = "RepairCost";

/// Item details the server will not echo for a slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedNewItem {
    /// Replacement item runtime id.
    pub network_id: Option<i32>,
    /// Replacement user data, applied wholesale.
    pub nbt: Option<NbtCompound>,
    /// Added to the item's `RepairCost`.
    pub repair_cost_delta: Option<i32>,
}

impl ExpectedNewItem {
    pub fn with_network_id(network_id: i32) -> Self {
        Self {
            network_id: Some(network_id),
            ..Self::default()
        }
    }

    pub fn with_nbt(nbt: NbtCompound) -> Self {
        Self {
            nbt: Some(nbt),
            ..Self::default()
        }
    }
}

/// What the engine expects a slot to hold once a request succeeds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictedSlot {
    /// Predicted contents at the end of the request.
    pub template: Option<ItemStack>,
    pub expected: Option<ExpectedNewItem>,
}

/// Build the final item for one acknowledged slot.
pub fn reconcile(
    base: ItemStack,
    ack: &StackResponseSlot,
    expected: Option<&ExpectedNewItem>,
) -> ItemStack {
    if ack.count == 0 {
        return ItemStack::empty();
    }

    let mut item = base;
    item.count = u16::from(ack.count);
    item.stack_network_id = ack.stack_network_id;

    let expected = expected.cloned().unwrap_or_default();
    if let Some(network_id) = expected.network_id {
        item.runtime_id = network_id;
    }

    match expected.nbt {
        Some(nbt) => item.nbt = (!nbt.is_empty()).then_some(nbt),
        None => patch_display_name(&mut item.nbt, &ack.custom_name),
    }

    if let Some(delta) = expected.repair_cost_delta {
        bump_repair_cost(&mut item.nbt, delta);
    }

    item
}

/// Set `display.Name`, or clear it when `name` is empty.
///
/// Clearing drops an emptied `display` compound, and an emptied root
/// becomes `None`.
pub fn patch_display_name(nbt: &mut Option<NbtCompound>, name: &str) {
    if !name.is_empty() {
        let root = nbt.get_or_insert_with(NbtCompound::new);
        let display = root
            .entry(TAG_DISPLAY.to_string())
            .or_insert_with(|| NbtTag::Compound(NbtCompound::new()));
        if !matches!(display, NbtTag::Compound(_)) {
            *display = NbtTag::Compound(NbtCompound::new());
        }
        if let Some(display) = display.as_compound_mut() {
            display.insert(TAG_NAME.to_string(), NbtTag::String(name.to_string()));
        }
        return;
    }

    let Some(root) = nbt.as_mut() else {
        return;
    };
    let display_emptied = match root.get_mut(TAG_DISPLAY).and_then(NbtTag::as_compound_mut) {
        Some(display) => {
            display.remove(TAG_NAME);
            display.is_empty()
        }
        None => false,
    };
    if display_emptied {
        root.remove(TAG_DISPLAY);
    }
    if root.is_empty() {
        *nbt = None;
    }
}

/// Read `display.Name`.
pub fn display_name(nbt: Option<&NbtCompound>) -> Option<&str> {
    nbt?.get(TAG_DISPLAY)?
        .as_compound()?
        .get(TAG_NAME)?
        .as_string()
}

fn bump_repair_cost(nbt: &mut Option<NbtCompound>, delta: i32) {
    let root = nbt.get_or_insert_with(NbtCompound::new);
    let old = root
        .get(TAG_REPAIR_COST)
        .and_then(NbtTag::as_int)
        .unwrap_or(0);
    root.insert(TAG_REPAIR_COST.to_string(), NbtTag::Int(old + delta));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ack(count: u8, id: i32, name: &str) -> StackResponseSlot {
        StackResponseSlot {
            slot: 0,
            hotbar_slot: 0,
            count,
            stack_network_id: id,
            custom_name: name.into(),
            durability_correction: 0,
        }
    }

    fn enchanted() -> NbtCompound {
        let mut ench = NbtCompound::new();
        ench.insert("id".into(), NbtTag::Short(9));
        ench.insert("lvl".into(), NbtTag::Short(2));
        let mut root = NbtCompound::new();
        root.insert("ench".into(), NbtTag::List(vec![NbtTag::Compound(ench)]));
        root.insert(TAG_REPAIR_COST.into(), NbtTag::Int(1));
        root
    }

    #[test]
    fn count_and_id_come_from_server() {
        let base = ItemStack::with_stack_id(5, 10, 7);
        let item = reconcile(base, &ack(3, -5, ""), None);
        assert_eq!(item.count, 3);
        assert_eq!(item.stack_network_id, -5);
        assert_eq!(item.runtime_id, 5);
    }

    #[test]
    fn zero_count_empties_slot() {
        let item = reconcile(ItemStack::with_stack_id(5, 10, 7), &ack(0, 0, ""), None);
        assert!(item.is_empty());
        assert_eq!(item, ItemStack::empty());
    }

    #[test]
    fn absent_overrides_leave_metadata_untouched() {
        let base = ItemStack {
            nbt: Some(enchanted()),
            can_destroy: vec!["minecraft:stone".into()],
            metadata: 3,
            ..ItemStack::with_stack_id(5, 1, 7)
        };
        let item = reconcile(base.clone(), &ack(1, -3, ""), None);
        assert_eq!(item.nbt, base.nbt);
        assert_eq!(item.can_destroy, base.can_destroy);
        assert_eq!(item.metadata, 3);

        // Applying again changes nothing.
        let again = reconcile(item.clone(), &ack(1, -3, ""), None);
        assert_eq!(again, item);
    }

    #[test]
    fn echoed_name_is_patched_in() {
        let base = ItemStack {
            nbt: Some(enchanted()),
            ..ItemStack::new(5, 1)
        };
        let item = reconcile(base, &ack(1, -3, "Foo"), None);
        assert_eq!(display_name(item.nbt.as_ref()), Some("Foo"));
        assert!(item.nbt.as_ref().unwrap().contains_key("ench"));
    }

    #[test]
    fn clearing_name_prunes_empty_wrappers() {
        let mut nbt = None;
        patch_display_name(&mut nbt, "Foo");
        assert_eq!(display_name(nbt.as_ref()), Some("Foo"));
        patch_display_name(&mut nbt, "");
        assert!(nbt.is_none());
    }

    #[test]
    fn clearing_name_keeps_other_display_fields() {
        let mut display = NbtCompound::new();
        display.insert(TAG_NAME.into(), NbtTag::String("Old".into()));
        display.insert("Lore".into(), NbtTag::List(vec![]));
        let mut root = NbtCompound::new();
        root.insert(TAG_DISPLAY.into(), NbtTag::Compound(display));
        let mut nbt = Some(root);

        patch_display_name(&mut nbt, "");
        let display = nbt.as_ref().unwrap()[TAG_DISPLAY].as_compound().unwrap();
        assert!(!display.contains_key(TAG_NAME));
        assert!(display.contains_key("Lore"));
    }

    #[test]
    fn network_id_override() {
        let expected = ExpectedNewItem::with_network_id(301);
        let item = reconcile(ItemStack::empty(), &ack(4, -1, ""), Some(&expected));
        assert_eq!(item.runtime_id, 301);
        assert_eq!(item.count, 4);
    }

    #[test]
    fn declared_nbt_replaces_wholesale() {
        let mut replacement = NbtCompound::new();
        replacement.insert("Patterns".into(), NbtTag::List(vec![]));
        let base = ItemStack {
            nbt: Some(enchanted()),
            ..ItemStack::new(5, 1)
        };
        let expected = ExpectedNewItem::with_nbt(replacement.clone());
        // The echoed name is ignored when user data is declared.
        let item = reconcile(base, &ack(1, -1, "Ignored"), Some(&expected));
        assert_eq!(item.nbt, Some(replacement));
    }

    #[test]
    fn repair_cost_delta() {
        let base = ItemStack {
            nbt: Some(enchanted()),
            ..ItemStack::new(5, 1)
        };
        let expected = ExpectedNewItem {
            repair_cost_delta: Some(2),
            ..ExpectedNewItem::default()
        };
        let item = reconcile(base, &ack(1, -1, "Foo"), Some(&expected));
        let root = item.nbt.unwrap();
        assert_eq!(root[TAG_REPAIR_COST].as_int(), Some(3));
        assert_eq!(display_name(Some(&root)), Some("Foo"));

        let fresh = reconcile(ItemStack::new(5, 1), &ack(1, -1, ""), Some(&expected));
        assert_eq!(fresh.nbt.unwrap()[TAG_REPAIR_COST].as_int(), Some(2));
    }
}
