//! Player character owning an inventory, equipment and a weapon clip

use crate::ammo::WeaponAmmo;
use crate::catalog::ItemCatalog;
use crate::command::{CommandOutcome, InventoryCommand};
use crate::config::InventoryConfig;
use crate::equipment::{EquipSlot, EquipmentSlotMap};
use crate::error::Result;
use crate::events::Subscribers;
use crate::inventory::{Inventory, ItemAddResult, ItemHandle, SharedInventory};
use crate::pickup::Pickup;
use crate::replication::{EquippedItem, SurvivorState};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use survival_core::{NetId, NetRole};

/// Default maximum health
pub const DEFAULT_MAX_HEALTH: f32 = 100.0;

const NEARLY_ZERO: f32 = 1.0e-8;

/// Player character
#[derive(Debug)]
pub struct Survivor {
    role: NetRole,
    inventory: Inventory,
    equipment: EquipmentSlotMap,
    health: f32,
    max_health: f32,
    weapon: Option<WeaponAmmo>,
    notifications: Subscribers<String>,
    outbox: Vec<InventoryCommand>,
    loot_source: Option<Weak<Mutex<Inventory>>>,
    /// World position; dropped items spawn here
    pub position: [f32; 3],
}

impl Survivor {
    /// Create a survivor with the default 20 slot / 80 weight inventory
    pub fn new(role: NetRole) -> Self {
        Self::with_inventory_config(role, &InventoryConfig::default())
    }

    /// Create a survivor with configured inventory limits
    pub fn with_inventory_config(role: NetRole, config: &InventoryConfig) -> Self {
        Self {
            role,
            inventory: Inventory::from_config(config).with_role(role),
            equipment: EquipmentSlotMap::new(),
            health: DEFAULT_MAX_HEALTH,
            max_health: DEFAULT_MAX_HEALTH,
            weapon: None,
            notifications: Subscribers::new(),
            outbox: Vec::new(),
            loot_source: None,
            position: [0.0; 3],
        }
    }

    /// Start at `health` instead of full health
    pub fn with_health(mut self, health: f32) -> Self {
        self.health = health.clamp(0.0, self.max_health);
        self
    }

    /// Network role
    pub fn role(&self) -> NetRole {
        self.role
    }

    /// Check if this copy may mutate
    pub fn has_authority(&self) -> bool {
        self.role.has_authority()
    }

    /// Carried items
    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    /// Carried items, mutable
    pub fn inventory_mut(&mut self) -> &mut Inventory {
        &mut self.inventory
    }

    /// Occupied equipment slots
    pub fn equipment(&self) -> &EquipmentSlotMap {
        &self.equipment
    }

    /// Equipment slots, mutable
    pub fn equipment_mut(&mut self) -> &mut EquipmentSlotMap {
        &mut self.equipment
    }

    /// Clip state of the equipped weapon
    pub fn weapon(&self) -> Option<&WeaponAmmo> {
        self.weapon.as_ref()
    }

    /// Current health
    pub fn health(&self) -> f32 {
        self.health
    }

    /// Health ceiling
    pub fn max_health(&self) -> f32 {
        self.max_health
    }

    /// Apply `delta` clamped to `0..=max_health`; returns the change actually made
    pub fn modify_health(&mut self, delta: f32) -> f32 {
        let old = self.health;
        self.health = (self.health + delta).clamp(0.0, self.max_health);
        self.health - old
    }

    /// Listen for player-facing messages
    pub fn subscribe_notifications(&mut self) -> Receiver<String> {
        self.notifications.subscribe()
    }

    /// Take commands queued for the authority
    pub fn take_outbox(&mut self) -> Vec<InventoryCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Use an item: eat food, or toggle equippable items
    pub fn use_item(&mut self, item: ItemHandle) {
        let Some(entry) = self.inventory.get(item) else {
            log::debug!("use_item: {:?} is not in the inventory", item);
            return;
        };
        if !self.has_authority() {
            self.outbox.push(InventoryCommand::UseItem { item: entry.net_id() });
            return;
        }

        let class = Arc::clone(entry.class());
        if let Some(food) = class.food {
            let healed = self.modify_health(food.heal_amount);
            if healed.abs() > NEARLY_ZERO {
                self.notify(format!("Ate {}, healed {} health.", class.name, healed));
                self.inventory.consume_item(item, 1);
            } else {
                self.notify(format!(
                    "No need to eat {}, health is already full.",
                    class.name
                ));
            }
        } else if class.slot.is_some() {
            if self.equipment.slot_of(item).is_some() {
                self.unequip_item(item);
            } else {
                self.equip_item(item);
            }
        } else {
            log::debug!("{} has no use", class.id);
        }
    }

    /// Drop up to `quantity` units; the authority returns the spawned pickup
    pub fn drop_item(&mut self, item: ItemHandle, quantity: u32) -> Option<Pickup> {
        let entry = self.inventory.get(item)?;
        if !self.has_authority() {
            self.outbox.push(InventoryCommand::DropItem { item: entry.net_id(), quantity });
            return None;
        }

        let class = Arc::clone(entry.class());
        let dropped = self.inventory.consume_item(item, quantity);
        if dropped == 0 {
            return None;
        }
        if !self.inventory.contains(item) {
            self.release_missing_equipment();
        }

        let mut pickup = Pickup::new(self.position);
        pickup.initialize(&class, dropped);
        log::debug!("Dropped {} x{} as pickup {}", class.id, dropped, pickup.net_id());
        Some(pickup)
    }

    /// Start looting `source`, or stop with `None`. Authority only.
    ///
    /// Only a weak reference is kept: once every owner of the source drops
    /// it, the survivor stops looting.
    pub fn set_loot_source(&mut self, source: Option<&SharedInventory>) -> bool {
        if !self.has_authority() {
            log::debug!("Ignoring loot source change on a {:?} survivor", self.role);
            return false;
        }
        self.loot_source = source.map(Arc::downgrade);
        true
    }

    /// Inventory currently being looted
    pub fn loot_source(&mut self) -> Option<SharedInventory> {
        let source = self.loot_source.as_ref()?.upgrade();
        if source.is_none() {
            log::debug!("Loot source owner went away, no longer looting");
            self.loot_source = None;
        }
        source
    }

    /// Check if a loot source is set and still alive
    pub fn is_looting(&self) -> bool {
        self.loot_source
            .as_ref()
            .is_some_and(|source| source.strong_count() > 0)
    }

    /// Move an item out of `source` into this inventory
    pub fn loot_item(&mut self, source: &mut Inventory, item: ItemHandle) -> Option<ItemAddResult> {
        let entry = source.get(item)?.clone();
        if !self.has_authority() {
            self.outbox.push(InventoryCommand::LootItem { item: entry.net_id() });
            return None;
        }
        if !source.has_item(entry.class_id(), entry.quantity()) {
            return None;
        }

        let result = self.inventory.try_add_item(&entry);
        if result.amount_given > 0 {
            source.consume_item(item, result.amount_given);
        } else {
            self.notify(result.error_message.clone());
        }
        Some(result)
    }

    /// Equip an item, unequipping whatever held its slot first
    pub fn equip_item(&mut self, item: ItemHandle) -> bool {
        let Some(entry) = self.inventory.get(item) else {
            return false;
        };
        if !self.has_authority() {
            self.outbox.push(InventoryCommand::EquipItem { item: entry.net_id() });
            return false;
        }
        let Some(slot) = entry.class().slot else {
            log::debug!("{} cannot be equipped", entry.class_id());
            return false;
        };

        if let Some(previous) = self.equipment.get(slot) {
            if previous != item {
                self.unequip_item(previous);
            }
        }

        let Some(entry) = self.inventory.get(item) else {
            return false;
        };
        if self.equipment.equip(item, entry).is_err() {
            return false;
        }
        if slot == EquipSlot::Weapon {
            self.equip_weapon(item);
        }
        true
    }

    /// Unequip an item if it still occupies its slot
    pub fn unequip_item(&mut self, item: ItemHandle) -> bool {
        if !self.has_authority() {
            if let Some(entry) = self.inventory.get(item) {
                self.outbox.push(InventoryCommand::UnequipItem { item: entry.net_id() });
            }
            return false;
        }

        let unequipped = match self.inventory.get(item) {
            Some(entry) => self.equipment.unequip(item, entry),
            None => match self.equipment.slot_of(item) {
                Some(slot) => self.equipment.unequip_slot_if(slot, item),
                None => false,
            },
        };

        if unequipped && self.weapon.as_ref().map(WeaponAmmo::weapon) == Some(item) {
            self.unequip_weapon();
        }
        unequipped
    }

    /// Throw one unit of the equipped throwable
    pub fn use_throwable(&mut self) -> bool {
        let Some(handle) = self.equipment.get(EquipSlot::Throwable) else {
            return false;
        };
        let Some(throwable) = self.inventory.get(handle) else {
            self.equipment.unequip_slot_if(EquipSlot::Throwable, handle);
            return false;
        };

        if !self.has_authority() {
            // Clear locally so the slot doesn't show a grenade we just threw
            if throwable.quantity() <= 1 {
                self.equipment.unequip_slot_if(EquipSlot::Throwable, handle);
            }
            self.outbox.push(InventoryCommand::UseThrowable);
            return true;
        }

        log::debug!("Threw {}", throwable.class_id());
        self.inventory.consume_item(handle, 1);
        if !self.inventory.contains(handle) {
            self.equipment.unequip_slot_if(EquipSlot::Throwable, handle);
        }
        true
    }

    /// Refill the equipped weapon's clip
    pub fn reload(&mut self) -> u32 {
        match self.weapon.as_mut() {
            Some(weapon) => weapon.reload(&mut self.inventory),
            None => 0,
        }
    }

    /// Spend one round from the equipped weapon's clip
    pub fn fire_shot(&mut self) -> bool {
        self.weapon.as_mut().is_some_and(WeaponAmmo::use_clip_ammo)
    }

    /// Run a command received from the owning client.
    ///
    /// `LootItem` takes from `loot_source` when given, otherwise from the
    /// source set with [`set_loot_source`](Self::set_loot_source).
    pub fn execute(
        &mut self,
        command: InventoryCommand,
        loot_source: Option<&mut Inventory>,
    ) -> CommandOutcome {
        if !self.has_authority() {
            log::warn!("Ignoring {:?} on a {:?} survivor", command, self.role);
            return CommandOutcome::Ignored;
        }

        match command {
            InventoryCommand::UseItem { item } => match self.resolve(item) {
                Some(handle) => {
                    self.use_item(handle);
                    CommandOutcome::Applied
                }
                None => CommandOutcome::Ignored,
            },
            InventoryCommand::DropItem { item, quantity } => self
                .resolve(item)
                .and_then(|handle| self.drop_item(handle, quantity))
                .map_or(CommandOutcome::Ignored, CommandOutcome::Spawned),
            InventoryCommand::LootItem { item } => match loot_source {
                Some(source) => self.loot_by_net_id(source, item),
                None => match self.loot_source() {
                    Some(shared) => {
                        let mut source = shared.lock();
                        self.loot_by_net_id(&mut source, item)
                    }
                    None => {
                        log::warn!("LootItem {} without a loot source", item);
                        CommandOutcome::Ignored
                    }
                },
            },
            InventoryCommand::UseThrowable => {
                if self.use_throwable() {
                    CommandOutcome::Applied
                } else {
                    CommandOutcome::Ignored
                }
            }
            InventoryCommand::EquipItem { item } => match self.resolve(item) {
                Some(handle) if self.equip_item(handle) => CommandOutcome::Applied,
                _ => CommandOutcome::Ignored,
            },
            InventoryCommand::UnequipItem { item } => match self.resolve(item) {
                Some(handle) if self.unequip_item(handle) => CommandOutcome::Applied,
                _ => CommandOutcome::Ignored,
            },
        }
    }

    /// Capture the state replicated to the owning client
    pub fn snapshot(&self) -> SurvivorState {
        let equipped = self
            .equipment
            .iter()
            .filter_map(|(slot, handle)| {
                let item = self.inventory.get(handle)?;
                Some(EquippedItem { slot, item: item.net_id() })
            })
            .collect();

        SurvivorState {
            health: self.health,
            ammo_in_clip: self.weapon.as_ref().map_or(0, WeaponAmmo::ammo_in_clip),
            equipped,
            inventory: self.inventory.snapshot(),
        }
    }

    /// Mirror replicated state; equipment slots are rebuilt to match the authority
    pub fn apply_replicated(&mut self, state: &SurvivorState, catalog: &ItemCatalog) -> Result<()> {
        self.inventory.apply_replicated(&state.inventory, catalog)?;
        self.health = state.health.clamp(0.0, self.max_health);

        let mut wanted = HashMap::with_capacity(state.equipped.len());
        for equipped in &state.equipped {
            match self.inventory.find_by_net_id(equipped.item) {
                Some(handle) => {
                    wanted.insert(equipped.slot, handle);
                }
                None => log::warn!("Equipped item {} is not in the mirrored inventory", equipped.item),
            }
        }

        let occupied: Vec<_> = self.equipment.iter().collect();
        for (slot, handle) in occupied {
            if wanted.get(&slot) != Some(&handle) {
                self.equipment.unequip_slot_if(slot, handle);
            }
        }
        for (slot, handle) in wanted {
            if self.equipment.get(slot) == Some(handle) {
                continue;
            }
            if let Some(item) = self.inventory.get(handle) {
                if let Err(err) = self.equipment.equip(handle, item) {
                    log::warn!("Cannot mirror {:?} slot: {}", slot, err);
                }
            }
        }

        self.mirror_weapon(state.ammo_in_clip);
        Ok(())
    }

    fn resolve(&self, item: NetId) -> Option<ItemHandle> {
        let handle = self.inventory.find_by_net_id(item);
        if handle.is_none() {
            log::warn!("Command references unknown item {}", item);
        }
        handle
    }

    fn loot_by_net_id(&mut self, source: &mut Inventory, item: NetId) -> CommandOutcome {
        let Some(handle) = source.find_by_net_id(item) else {
            log::warn!("LootItem {} is not in the loot source", item);
            return CommandOutcome::Ignored;
        };
        match self.loot_item(source, handle) {
            Some(_) => CommandOutcome::Applied,
            None => CommandOutcome::Ignored,
        }
    }

    fn equip_weapon(&mut self, item: ItemHandle) {
        if let Some(mut previous) = self.weapon.take() {
            previous.return_ammo_to_inventory(&mut self.inventory);
        }
        self.weapon = self
            .inventory
            .get(item)
            .and_then(|entry| WeaponAmmo::new(item, entry));
    }

    fn unequip_weapon(&mut self) {
        if let Some(mut weapon) = self.weapon.take() {
            weapon.return_ammo_to_inventory(&mut self.inventory);
        }
    }

    // Proxies never return clip ammo; the authority's inventory already counts it
    fn mirror_weapon(&mut self, ammo_in_clip: u32) {
        let Some(handle) = self.equipment.get(EquipSlot::Weapon) else {
            self.weapon = None;
            return;
        };
        if self.weapon.as_ref().map(WeaponAmmo::weapon) != Some(handle) {
            self.weapon = self
                .inventory
                .get(handle)
                .and_then(|entry| WeaponAmmo::new(handle, entry));
        }
        if let Some(weapon) = self.weapon.as_mut() {
            weapon.set_ammo_in_clip(ammo_in_clip);
        }
    }

    fn release_missing_equipment(&mut self) {
        let inventory = &self.inventory;
        let cleared = self.equipment.retain_valid(|handle| inventory.contains(handle));
        if cleared.contains(&EquipSlot::Weapon) {
            self.unequip_weapon();
        }
    }

    fn notify(&mut self, message: String) {
        log::info!("{}", message);
        self.notifications.broadcast(message);
    }
}

impl Default for Survivor {
    fn default() -> Self {
        Self::new(NetRole::Authority)
    }
}
