//! Client → authority inventory commands
//!
//! Proxies never mutate. They queue a command, the host ships it to the
//! authority, and the result comes back only as replicated state plus an
//! optional notification.

use crate::pickup::Pickup;
use serde::{Deserialize, Serialize};
use survival_core::NetId;

/// Command sent by an owning client. Items are referenced by replicated id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InventoryCommand {
    UseItem { item: NetId },
    DropItem { item: NetId, quantity: u32 },
    /// Item lives in the loot source, not the survivor's inventory
    LootItem { item: NetId },
    UseThrowable,
    EquipItem { item: NetId },
    UnequipItem { item: NetId },
}

impl InventoryCommand {
    /// Item the command refers to, if any
    pub fn item(&self) -> Option<NetId> {
        match *self {
            Self::UseItem { item }
            | Self::DropItem { item, .. }
            | Self::LootItem { item }
            | Self::EquipItem { item }
            | Self::UnequipItem { item } => Some(item),
            Self::UseThrowable => None,
        }
    }
}

/// What the authority did with a command
#[derive(Debug)]
pub enum CommandOutcome {
    /// Executed; any visible change arrives through replication
    Applied,
    /// Executed and spawned a pickup the host must place in the world
    Spawned(Pickup),
    /// Refused (unknown item, missing loot source, or not the authority)
    Ignored,
}

impl CommandOutcome {
    /// Check if the command was refused
    pub fn is_ignored(&self) -> bool {
        matches!(self, Self::Ignored)
    }

    /// Take the spawned pickup
    pub fn into_pickup(self) -> Option<Pickup> {
        match self {
            Self::Spawned(pickup) => Some(pickup),
            _ => None,
        }
    }
}
