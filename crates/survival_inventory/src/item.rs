//! Item classes and item instances

use crate::equipment::EquipSlot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use survival_core::{NetId, ReplicationKey};

/// Weights at or below this are treated as weightless
pub const WEIGHT_TOLERANCE: f32 = 1.0e-8;

/// Check if a weight should skip weight checks entirely
#[inline]
pub fn is_weightless(weight: f32) -> bool {
    weight.abs() <= WEIGHT_TOLERANCE
}

/// Identity of an item class; equality of ids is equality of type
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemClassId(String);

impl ItemClassId {
    /// Create a class id
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as str
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemClassId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Food behaviour
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodSpec {
    /// Health restored per unit eaten
    pub heal_amount: f32,
}

impl Default for FoodSpec {
    fn default() -> Self {
        Self { heal_amount: 20.0 }
    }
}

/// Weapon behaviour relevant to the inventory
#[derive(Debug, Clone)]
pub struct WeaponSpec {
    /// Ammo class the clip is filled from
    pub ammo: ItemClass,
    /// Clip size
    pub ammo_per_clip: u32,
}

/// Shared immutable item class
pub type ItemClass = Arc<ItemDefinition>;

/// Item class definition
#[derive(Debug, Clone)]
pub struct ItemDefinition {
    /// Class identity
    pub id: ItemClassId,
    /// Display name used in notifications
    pub name: String,
    /// Description
    pub description: String,
    /// Verb shown on the use button
    pub use_action: String,
    /// Weight of one unit
    pub weight: f32,
    /// Maximum stack size
    pub max_stack: u32,
    /// Whether several units share one entry
    pub stackable: bool,
    /// Parent class for subtype queries
    pub parent: Option<ItemClass>,
    /// Equipment slot, if equippable
    pub slot: Option<EquipSlot>,
    /// Food data, if edible
    pub food: Option<FoodSpec>,
    /// Weapon data, if this equips a weapon
    pub weapon: Option<WeaponSpec>,
}

impl ItemDefinition {
    /// Create a new, non-stackable, weightless class
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ItemClassId::new(id),
            name: name.into(),
            description: String::new(),
            use_action: "Use".to_string(),
            weight: 0.0,
            max_stack: 1,
            stackable: false,
            parent: None,
            slot: None,
            food: None,
            weapon: None,
        }
    }

    /// Set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Set use action text
    pub fn with_use_action(mut self, action: impl Into<String>) -> Self {
        self.use_action = action.into();
        self
    }

    /// Set per-unit weight
    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = weight.max(0.0);
        self
    }

    /// Make stackable up to `max` units
    pub fn stackable(mut self, max: u32) -> Self {
        self.stackable = true;
        self.max_stack = max.max(1);
        self
    }

    /// Set parent class
    pub fn with_parent(mut self, parent: &ItemClass) -> Self {
        self.parent = Some(Arc::clone(parent));
        self
    }

    /// Set equip slot
    pub fn with_slot(mut self, slot: EquipSlot) -> Self {
        self.slot = Some(slot);
        self
    }

    /// Make edible
    pub fn with_food(mut self, heal_amount: f32) -> Self {
        self.food = Some(FoodSpec { heal_amount });
        self.use_action = "Consume".to_string();
        self
    }

    /// Make this a weapon fed by `ammo`
    pub fn with_weapon(mut self, ammo: &ItemClass, ammo_per_clip: u32) -> Self {
        self.weapon = Some(WeaponSpec {
            ammo: Arc::clone(ammo),
            ammo_per_clip,
        });
        self.slot = Some(EquipSlot::Weapon);
        self
    }

    /// Freeze into a shareable class
    pub fn build(self) -> ItemClass {
        Arc::new(self)
    }

    /// Largest quantity a single entry may hold
    pub fn stack_limit(&self) -> u32 {
        if self.stackable {
            self.max_stack
        } else {
            1
        }
    }

    /// Check whether this class is `class` or derives from it
    pub fn is_child_of(&self, class: &ItemClassId) -> bool {
        if &self.id == class {
            return true;
        }
        let mut current = self.parent.as_ref();
        while let Some(parent) = current {
            if &parent.id == class {
                return true;
            }
            current = parent.parent.as_ref();
        }
        false
    }
}

/// An item instance owned by one inventory or pickup
#[derive(Debug, Clone)]
pub struct Item {
    class: ItemClass,
    quantity: u32,
    net_id: NetId,
    rep_key: ReplicationKey,
    /// Set once the owning side has announced this item
    pub(crate) arrived: bool,
}

impl Item {
    /// Create an item with a fresh net id; quantity is clamped to the stack limit
    pub fn new(class: &ItemClass, quantity: u32) -> Self {
        Self::with_net_id(class, quantity, NetId::next())
    }

    pub(crate) fn with_net_id(class: &ItemClass, quantity: u32, net_id: NetId) -> Self {
        Self {
            class: Arc::clone(class),
            quantity: quantity.min(class.stack_limit()),
            net_id,
            rep_key: ReplicationKey::INITIAL,
            arrived: false,
        }
    }

    /// Item class
    pub fn class(&self) -> &ItemClass {
        &self.class
    }

    /// Class identity
    pub fn class_id(&self) -> &ItemClassId {
        &self.class.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.class.name
    }

    /// Current quantity
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Weight of the whole stack
    pub fn stack_weight(&self) -> f32 {
        self.quantity as f32 * self.class.weight
    }

    /// Replicated identity
    pub fn net_id(&self) -> NetId {
        self.net_id
    }

    /// Per-item replication key
    pub fn rep_key(&self) -> ReplicationKey {
        self.rep_key
    }

    /// Check if the item was already announced to listeners
    pub fn has_arrived(&self) -> bool {
        self.arrived
    }

    /// Check if this is the same class as `other`
    pub fn is_same_class(&self, other: &Item) -> bool {
        self.class.id == other.class.id
    }

    /// Set quantity, clamped to `0..=stack_limit`; marks the item dirty on change
    pub fn set_quantity(&mut self, quantity: u32) {
        let clamped = quantity.min(self.class.stack_limit());
        if clamped != self.quantity {
            self.quantity = clamped;
            self.mark_dirty();
        }
    }

    /// Bump the per-item key so the host re-sends this item
    pub fn mark_dirty(&mut self) {
        self.rep_key.bump();
    }

    /// Overwrite with replicated values; proxies never clamp or bump
    pub(crate) fn apply_replicated(&mut self, quantity: u32, key: ReplicationKey) {
        self.quantity = quantity;
        self.rep_key = key;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_definition() {
        let apple = ItemDefinition::new("apple", "Apple")
            .with_weight(0.2)
            .stackable(10)
            .with_food(15.0)
            .build();

        assert_eq!(apple.id.as_str(), "apple");
        assert!(apple.stackable);
        assert_eq!(apple.stack_limit(), 10);
        assert_eq!(apple.use_action, "Consume");
        assert_eq!(apple.food.map(|f| f.heal_amount), Some(15.0));
    }

    #[test]
    fn test_non_stackable_limit() {
        let knife = ItemDefinition::new("knife", "Knife").stackable(0).build();
        assert_eq!(knife.max_stack, 1);

        let rock = ItemDefinition::new("rock", "Rock").build();
        let item = Item::new(&rock, 5);
        assert_eq!(item.quantity(), 1);
    }

    #[test]
    fn test_class_hierarchy() {
        let ammo = ItemDefinition::new("ammo", "Ammo").build();
        let rifle_ammo = ItemDefinition::new("ammo_556", "5.56 Rounds")
            .with_parent(&ammo)
            .build();
        let match_grade = ItemDefinition::new("ammo_556_match", "5.56 Match")
            .with_parent(&rifle_ammo)
            .build();

        assert!(match_grade.is_child_of(&ItemClassId::new("ammo")));
        assert!(match_grade.is_child_of(&ItemClassId::new("ammo_556")));
        assert!(rifle_ammo.is_child_of(&rifle_ammo.id));
        assert!(!ammo.is_child_of(&ItemClassId::new("ammo_556")));
    }

    #[test]
    fn test_set_quantity_clamps_and_dirties() {
        let stones = ItemDefinition::new("stone", "Stone").stackable(20).build();
        let mut item = Item::new(&stones, 5);
        let key = item.rep_key();

        item.set_quantity(50);
        assert_eq!(item.quantity(), 20);
        assert_ne!(item.rep_key(), key);

        let key = item.rep_key();
        item.set_quantity(20);
        assert_eq!(item.rep_key(), key);
    }

    #[test]
    fn test_stack_weight() {
        let logs = ItemDefinition::new("log", "Log").with_weight(2.5).stackable(10).build();
        let item = Item::new(&logs, 4);
        assert_eq!(item.stack_weight(), 10.0);
    }

    #[test]
    fn test_weapon_sets_slot() {
        let ammo = ItemDefinition::new("ammo_9mm", "9mm").stackable(100).build();
        let pistol = ItemDefinition::new("pistol", "Pistol").with_weapon(&ammo, 12).build();

        assert_eq!(pistol.slot, Some(EquipSlot::Weapon));
        assert_eq!(pistol.weapon.as_ref().map(|w| w.ammo_per_clip), Some(12));
    }
}
