//! Container slot roles, window ids and container types.
//!
//! A *window id* is a session handle for an inventory-bearing surface (the
//! player's own inventory, an opened chest, the UI inventory). A
//! [`ContainerId`] is the role a slot plays inside a single item stack
//! request; the server addresses its responses by role, not by window.

use serde::{Deserialize, Serialize};

/// Player inventory window (hotbar + main inventory, slots 0-35).
pub const WINDOW_INVENTORY: u8 = 0;
/// Offhand window.
pub const WINDOW_OFFHAND: u8 = 119;
/// Armor window.
pub const WINDOW_ARMOR: u8 = 120;
/// UI window: cursor, crafting-like inputs and the created output slot.
pub const WINDOW_UI: u8 = 124;

/// Number of hotbar slots at the start of the inventory window.
pub const HOTBAR_SIZE: u8 = 9;

/// UI slot of the cursor.
pub const UI_SLOT_CURSOR: u8 = 0;
/// UI slot of the anvil input.
pub const UI_SLOT_ANVIL_INPUT: u8 = 1;
/// UI slot of the anvil material.
pub const UI_SLOT_ANVIL_MATERIAL: u8 = 2;
/// UI slot of the loom banner input.
pub const UI_SLOT_LOOM_INPUT: u8 = 9;
/// UI slot of the loom dye.
pub const UI_SLOT_LOOM_DYE: u8 = 10;
/// UI slot of the loom banner pattern.
pub const UI_SLOT_LOOM_MATERIAL: u8 = 11;
/// UI slot where crafted/created results appear.
pub const UI_SLOT_CREATED_OUTPUT: u8 = 50;

/// Container types carried by `ContainerOpen`.
pub mod container_type {
    pub const CONTAINER: u8 = 0;
    pub const WORKBENCH: u8 = 1;
    pub const FURNACE: u8 = 2;
    pub const ENCHANTMENT: u8 = 3;
    pub const BREWING_STAND: u8 = 4;
    pub const ANVIL: u8 = 5;
    pub const DISPENSER: u8 = 6;
    pub const DROPPER: u8 = 7;
    pub const HOPPER: u8 = 8;
    pub const MINECART_CHEST: u8 = 10;
    pub const MINECART_HOPPER: u8 = 11;
    pub const LOOM: u8 = 24;
    pub const GRINDSTONE: u8 = 26;
    pub const BLAST_FURNACE: u8 = 27;
    pub const SMOKER: u8 = 28;
    pub const STONECUTTER: u8 = 29;
    pub const CARTOGRAPHY: u8 = 30;
    pub const SMITHING_TABLE: u8 = 33;
    pub const CHEST_BOAT: u8 = 34;
}

/// Slot role inside an item stack request (`FullContainerName.ContainerID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ContainerId {
    AnvilInput = 0,
    AnvilMaterial = 1,
    AnvilResult = 2,
    SmithingTableInput = 3,
    SmithingTableMaterial = 4,
    SmithingTableResult = 5,
    Armor = 6,
    LevelEntity = 7,
    BeaconPayment = 8,
    BrewingStandInput = 9,
    BrewingStandResult = 10,
    BrewingStandFuel = 11,
    CombinedHotbarAndInventory = 12,
    CraftingInput = 13,
    CraftingOutputPreview = 14,
    EnchantingInput = 22,
    EnchantingMaterial = 23,
    FurnaceFuel = 24,
    FurnaceIngredient = 25,
    FurnaceResult = 26,
    Hotbar = 28,
    Inventory = 29,
    ShulkerBox = 30,
    Offhand = 34,
    LoomInput = 41,
    LoomDye = 42,
    LoomMaterial = 43,
    LoomResult = 44,
    BlastFurnaceIngredient = 45,
    SmokerIngredient = 46,
    GrindstoneInput = 50,
    GrindstoneAdditional = 51,
    GrindstoneResult = 52,
    StonecutterInput = 53,
    CartographyInput = 55,
    CartographyAdditional = 56,
    Barrel = 58,
    Cursor = 59,
    CreatedOutput = 60,
    SmithingTableTemplate = 61,
    Dynamic = 63,
}

impl ContainerId {
    /// Wire value.
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value. Roles this crate does not model yield `None`.
    pub fn from_u8(value: u8) -> Option<Self> {
        use ContainerId::*;
        let id = match value {
            0 => AnvilInput,
            1 => AnvilMaterial,
            2 => AnvilResult,
            3 => SmithingTableInput,
            4 => SmithingTableMaterial,
            5 => SmithingTableResult,
            6 => Armor,
            7 => LevelEntity,
            8 => BeaconPayment,
            9 => BrewingStandInput,
            10 => BrewingStandResult,
            11 => BrewingStandFuel,
            12 => CombinedHotbarAndInventory,
            13 => CraftingInput,
            14 => CraftingOutputPreview,
            22 => EnchantingInput,
            23 => EnchantingMaterial,
            24 => FurnaceFuel,
            25 => FurnaceIngredient,
            26 => FurnaceResult,
            28 => Hotbar,
            29 => Inventory,
            30 => ShulkerBox,
            34 => Offhand,
            41 => LoomInput,
            42 => LoomDye,
            43 => LoomMaterial,
            44 => LoomResult,
            45 => BlastFurnaceIngredient,
            46 => SmokerIngredient,
            50 => GrindstoneInput,
            51 => GrindstoneAdditional,
            52 => GrindstoneResult,
            53 => StonecutterInput,
            55 => CartographyInput,
            56 => CartographyAdditional,
            58 => Barrel,
            59 => Cursor,
            60 => CreatedOutput,
            61 => SmithingTableTemplate,
            63 => Dynamic,
            _ => return None,
        };
        Some(id)
    }
}
