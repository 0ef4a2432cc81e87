//! Survival Inventory - Authoritative Item Containers
//!
//! This crate provides the inventory, equipment and pickup systems for a
//! networked survival game. One process holds authority and mutates; every
//! other copy is a read-only mirror rebuilt from replicated state.
//!
//! # Features
//!
//! - Slot and weight limited inventory with stack merging and partial adds
//! - Player-facing failure messages for every rejected or partial add
//! - Equipment slots referencing inventory entries by handle
//! - World pickups with partial transfer
//! - Weapon clip bridge to the ammo stack
//! - Version keyed sub-object replication and a client command protocol
//!
//! # Example
//!
//! ```ignore
//! use survival_inventory::prelude::*;
//!
//! let berries = ItemDefinition::new("berries", "Berries")
//!     .with_weight(0.1)
//!     .stackable(20)
//!     .with_food(5.0)
//!     .build();
//!
//! let mut inventory = Inventory::new(20, 80.0);
//! let result = inventory.try_add_item_from_class(&berries, 12);
//! assert!(result.is_all());
//! ```

pub mod ammo;
pub mod catalog;
pub mod command;
pub mod config;
pub mod equipment;
pub mod error;
pub mod events;
pub mod inventory;
pub mod item;
pub mod pickup;
pub mod replication;
pub mod survivor;

pub mod prelude {
    pub use crate::ammo::WeaponAmmo;
    pub use crate::catalog::ItemCatalog;
    pub use crate::command::{CommandOutcome, InventoryCommand};
    pub use crate::config::{InventoryConfig, ItemDef, SurvivalConfig};
    pub use crate::equipment::{EquipError, EquipSlot, EquipmentChanged, EquipmentSlotMap};
    pub use crate::error::{InventoryError, Result};
    pub use crate::events::Subscribers;
    pub use crate::inventory::{
        AddFailure, AddResultKind, Inventory, InventoryEvent, ItemAddResult, ItemHandle,
        SharedInventory, SlotCheck,
    };
    pub use crate::item::{Item, ItemClass, ItemClassId, ItemDefinition};
    pub use crate::pickup::{Pickup, PickupOutcome};
    pub use crate::replication::{
        EquippedItem, InventoryState, KeyedChannel, ReplicatedItem, ReplicationChannel, SurvivorState,
    };
    pub use crate::survivor::Survivor;
    pub use survival_core::{NetId, NetRole, ReplicationKey};
}

pub use prelude::*;
