//! Equipment system
//!
//! Equipping is a view over the inventory: the item stays in its
//! [`Inventory`](crate::inventory::Inventory) and the slot map only holds its handle.

use crate::events::Subscribers;
use crate::inventory::ItemHandle;
use crate::item::Item;
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Equipment slot types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Bare head (hats, masks)
    Head,
    /// Helmet
    Helmet,
    /// Chest armor
    Chest,
    /// Vest worn over the chest
    Vest,
    /// Leg armor
    Legs,
    /// Boots
    Feet,
    /// Gloves
    Hands,
    /// Backpack
    Backpack,
    /// Held weapon
    Weapon,
    /// Grenades and other throwables
    Throwable,
}

impl EquipSlot {
    /// All slots
    pub const ALL: [EquipSlot; 10] = [
        Self::Head,
        Self::Helmet,
        Self::Chest,
        Self::Vest,
        Self::Legs,
        Self::Feet,
        Self::Hands,
        Self::Backpack,
        Self::Weapon,
        Self::Throwable,
    ];

    /// Check if this is a gear slot (worn clothing/armor)
    pub fn is_gear(&self) -> bool {
        !matches!(self, Self::Weapon | Self::Throwable)
    }
}

/// Fired whenever a slot changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentChanged {
    pub slot: EquipSlot,
    pub item: Option<ItemHandle>,
}

/// Equipment errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EquipError {
    /// Item class declares no slot
    #[error("Item cannot be equipped")]
    NotEquippable,
}

/// Slot → equipped item
#[derive(Debug, Default)]
pub struct EquipmentSlotMap {
    slots: HashMap<EquipSlot, ItemHandle>,
    events: Subscribers<EquipmentChanged>,
}

impl EquipmentSlotMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen for slot changes
    pub fn subscribe(&mut self) -> Receiver<EquipmentChanged> {
        self.events.subscribe()
    }

    /// Item in a slot
    pub fn get(&self, slot: EquipSlot) -> Option<ItemHandle> {
        self.slots.get(&slot).copied()
    }

    /// Check if a slot is occupied
    pub fn is_occupied(&self, slot: EquipSlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Slot holding this item, if any
    pub fn slot_of(&self, handle: ItemHandle) -> Option<EquipSlot> {
        self.slots
            .iter()
            .find(|(_, equipped)| **equipped == handle)
            .map(|(slot, _)| *slot)
    }

    /// Put `item` into its declared slot, overwriting the occupant reference.
    ///
    /// The previous occupant is not unequipped; callers do that first.
    pub fn equip(&mut self, handle: ItemHandle, item: &Item) -> Result<EquipSlot, EquipError> {
        let slot = item.class().slot.ok_or(EquipError::NotEquippable)?;

        // One slot per item
        if let Some(previous) = self.slot_of(handle) {
            if previous != slot {
                self.slots.remove(&previous);
                self.events.broadcast(EquipmentChanged { slot: previous, item: None });
            }
        }

        self.slots.insert(slot, handle);
        log::debug!("Equipped {} in {:?}", item.class_id(), slot);
        self.events.broadcast(EquipmentChanged { slot, item: Some(handle) });
        Ok(slot)
    }

    /// Clear the item's slot, only if it is still the occupant
    pub fn unequip(&mut self, handle: ItemHandle, item: &Item) -> bool {
        let Some(slot) = item.class().slot else {
            return false;
        };
        self.unequip_slot_if(slot, handle)
    }

    /// Clear `slot` if `handle` still occupies it
    pub fn unequip_slot_if(&mut self, slot: EquipSlot, handle: ItemHandle) -> bool {
        if self.slots.get(&slot) != Some(&handle) {
            return false;
        }
        self.slots.remove(&slot);
        self.events.broadcast(EquipmentChanged { slot, item: None });
        true
    }

    /// Clear every slot whose handle no longer passes `is_valid`
    pub fn retain_valid(&mut self, mut is_valid: impl FnMut(ItemHandle) -> bool) -> Vec<EquipSlot> {
        let stale: Vec<EquipSlot> = self
            .slots
            .iter()
            .filter(|(_, handle)| !is_valid(**handle))
            .map(|(slot, _)| *slot)
            .collect();

        for slot in &stale {
            self.slots.remove(slot);
            self.events.broadcast(EquipmentChanged { slot: *slot, item: None });
        }
        stale
    }

    /// All equipped items
    pub fn iter(&self) -> impl Iterator<Item = (EquipSlot, ItemHandle)> + '_ {
        self.slots.iter().map(|(slot, handle)| (*slot, *handle))
    }

    /// Number of occupied slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is equipped
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Clear all slots
    pub fn clear(&mut self) -> Vec<(EquipSlot, ItemHandle)> {
        let mut cleared: Vec<_> = self.slots.drain().collect();
        cleared.sort_by_key(|(slot, _)| *slot);
        for (slot, _) in &cleared {
            self.events.broadcast(EquipmentChanged { slot: *slot, item: None });
        }
        cleared
    }
}
