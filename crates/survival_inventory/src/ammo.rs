//! Bridge between an equipped weapon's clip and the ammo stack in the inventory

use crate::inventory::{Inventory, ItemAddResult, ItemHandle};
use crate::item::{Item, ItemClass};

/// Clip state of an equipped weapon
#[derive(Debug, Clone)]
pub struct WeaponAmmo {
    weapon: ItemHandle,
    ammo: ItemClass,
    ammo_per_clip: u32,
    clip: u32,
}

impl WeaponAmmo {
    /// Create an empty clip for `weapon`. Returns `None` if the item is not a weapon.
    pub fn new(weapon: ItemHandle, item: &Item) -> Option<Self> {
        let spec = item.class().weapon.as_ref()?;
        Some(Self {
            weapon,
            ammo: spec.ammo.clone(),
            ammo_per_clip: spec.ammo_per_clip,
            clip: 0,
        })
    }

    /// Inventory entry of the weapon
    pub fn weapon(&self) -> ItemHandle {
        self.weapon
    }

    /// Ammo class the clip is filled from
    pub fn ammo_class(&self) -> &ItemClass {
        &self.ammo
    }

    /// Rounds in the clip
    pub fn ammo_in_clip(&self) -> u32 {
        self.clip
    }

    /// Clip size
    pub fn ammo_per_clip(&self) -> u32 {
        self.ammo_per_clip
    }

    /// Rounds of the ammo class carried in `inventory`
    pub fn current_ammo(&self, inventory: &Inventory) -> u32 {
        inventory
            .find_item_by_class(&self.ammo.id)
            .and_then(|handle| inventory.get(handle))
            .map(Item::quantity)
            .unwrap_or(0)
    }

    /// Take `amount` rounds out of the inventory. Does nothing without an ammo stack.
    pub fn consume_ammo(&self, inventory: &mut Inventory, amount: u32) -> u32 {
        match inventory.find_item_by_class(&self.ammo.id) {
            Some(handle) => inventory.consume_item(handle, amount),
            None => 0,
        }
    }

    /// Put unspent clip rounds back. Rounds that do not fit are lost.
    pub fn return_ammo_to_inventory(&mut self, inventory: &mut Inventory) -> Option<ItemAddResult> {
        if !inventory.has_authority() || self.clip == 0 {
            return None;
        }
        let rounds = std::mem::take(&mut self.clip);
        let result = inventory.try_add_item_from_class(&self.ammo, rounds);
        if !result.is_all() {
            log::debug!(
                "Lost {} rounds of {} returning clip to inventory",
                result.remainder(),
                self.ammo.id
            );
        }
        Some(result)
    }

    /// Check if the clip has room and there is ammo to fill it
    pub fn can_reload(&self, inventory: &Inventory) -> bool {
        self.clip < self.ammo_per_clip && self.current_ammo(inventory) > 0
    }

    /// Refill the clip from the inventory. Returns the number of rounds loaded.
    pub fn reload(&mut self, inventory: &mut Inventory) -> u32 {
        let clip_delta = self
            .ammo_per_clip
            .saturating_sub(self.clip)
            .min(self.current_ammo(inventory));

        if clip_delta == 0 {
            log::warn!("Didn't have enough ammo for a reload");
            return 0;
        }

        self.clip += clip_delta;
        self.consume_ammo(inventory, clip_delta);
        clip_delta
    }

    /// Spend one round from the clip
    pub fn use_clip_ammo(&mut self) -> bool {
        if self.clip == 0 {
            return false;
        }
        self.clip -= 1;
        true
    }

    /// Mirror the authority's clip count
    pub(crate) fn set_ammo_in_clip(&mut self, rounds: u32) {
        self.clip = rounds.min(self.ammo_per_clip);
    }

    /// Get ammo display string
    pub fn ammo_display(&self, inventory: &Inventory) -> String {
        format!("{}/{}", self.clip, self.current_ammo(inventory))
    }
}
