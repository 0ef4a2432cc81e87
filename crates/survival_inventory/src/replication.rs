//! Replication boundary
//!
//! The host transport is not modelled here. The authority exposes version
//! keys and a sub-object callback; observers are handed an [`InventoryState`]
//! and rebuild their mirror from it.

use crate::catalog::ItemCatalog;
use crate::equipment::EquipSlot;
use crate::error::{InventoryError, Result};
use crate::inventory::{Inventory, InventoryEvent, ItemHandle};
use crate::item::{Item, ItemClassId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use survival_core::{NetId, ReplicationKey};

/// Wire view of one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicatedItem {
    pub net_id: NetId,
    pub class: ItemClassId,
    pub quantity: u32,
    pub key: ReplicationKey,
}

impl ReplicatedItem {
    /// Capture an item
    pub fn from_item(item: &Item) -> Self {
        Self {
            net_id: item.net_id(),
            class: item.class_id().clone(),
            quantity: item.quantity(),
            key: item.rep_key(),
        }
    }
}

/// Full replicated state of an inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryState {
    pub net_id: NetId,
    pub key: ReplicationKey,
    pub capacity: u32,
    pub weight_capacity: f32,
    pub items: Vec<ReplicatedItem>,
}

/// One occupied equipment slot, by item net id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquippedItem {
    pub slot: EquipSlot,
    pub item: NetId,
}

/// Owner-only state of a survivor: health, inventory, equipment and clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurvivorState {
    pub health: f32,
    #[serde(default)]
    pub ammo_in_clip: u32,
    #[serde(default)]
    pub equipped: Vec<EquippedItem>,
    pub inventory: InventoryState,
}

/// Host-side channel the authority writes sub-objects into
pub trait ReplicationChannel {
    /// Check whether `object` changed since the last send; records `key` as sent when it did
    fn key_needs_to_replicate(&mut self, object: NetId, key: ReplicationKey) -> bool;

    /// Write one item; returns whether anything was written
    fn replicate_subobject(&mut self, item: &ReplicatedItem) -> bool;
}

/// Channel that remembers the last key sent per object
#[derive(Debug, Default)]
pub struct KeyedChannel {
    sent: HashMap<NetId, ReplicationKey>,
    written: Vec<ReplicatedItem>,
}

impl KeyedChannel {
    /// Create a channel that has sent nothing yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Items written so far
    pub fn written(&self) -> &[ReplicatedItem] {
        &self.written
    }

    /// Take the items written so far
    pub fn take_written(&mut self) -> Vec<ReplicatedItem> {
        std::mem::take(&mut self.written)
    }

    /// Forget what was sent, forcing a full resend
    pub fn reset(&mut self) {
        self.sent.clear();
    }
}

impl ReplicationChannel for KeyedChannel {
    fn key_needs_to_replicate(&mut self, object: NetId, key: ReplicationKey) -> bool {
        match self.sent.insert(object, key) {
            Some(previous) => previous != key,
            None => true,
        }
    }

    fn replicate_subobject(&mut self, item: &ReplicatedItem) -> bool {
        self.written.push(item.clone());
        true
    }
}

impl Inventory {
    /// Capture the replicated state
    pub fn snapshot(&self) -> InventoryState {
        InventoryState {
            net_id: self.net_id(),
            key: self.rep_key,
            capacity: self.capacity,
            weight_capacity: self.weight_capacity,
            items: self.items().map(|(_, item)| ReplicatedItem::from_item(item)).collect(),
        }
    }

    /// Write every item whose key moved, provided the container key moved
    pub fn replicate_subobjects(&self, channel: &mut impl ReplicationChannel) -> bool {
        let mut wrote_something = false;

        if channel.key_needs_to_replicate(self.net_id(), self.rep_key) {
            for (_, item) in self.items() {
                if channel.key_needs_to_replicate(item.net_id(), item.rep_key()) {
                    wrote_something |= channel.replicate_subobject(&ReplicatedItem::from_item(item));
                }
            }
        }

        wrote_something
    }

    /// Take the pending "refresh your inventory" signal for the owning client
    pub fn take_client_refresh(&mut self) -> bool {
        std::mem::take(&mut self.pending_client_refresh)
    }

    /// Owning client received the refresh signal
    pub fn client_refresh_inventory(&mut self) {
        self.events.broadcast(InventoryEvent::Updated);
    }

    /// Rebuild a proxy mirror from replicated state.
    ///
    /// Known net ids keep their local handles. Fires `Updated`, then
    /// `ItemAdded` once for every item seen for the first time.
    pub fn apply_replicated(&mut self, state: &InventoryState, catalog: &ItemCatalog) -> Result<()> {
        if self.has_authority() {
            return Err(InventoryError::AuthorityMismatch);
        }

        // Resolve everything up front so a bad state leaves the mirror untouched
        let classes = state
            .items
            .iter()
            .map(|rep| catalog.require(&rep.class).map(Arc::clone))
            .collect::<Result<Vec<_>>>()?;

        let mut known: HashMap<NetId, ItemHandle> =
            self.items().map(|(handle, item)| (item.net_id(), handle)).collect();
        let mut order = Vec::with_capacity(state.items.len());

        for (rep, class) in state.items.iter().zip(classes) {
            let handle = match known.remove(&rep.net_id) {
                Some(handle) => handle,
                None => self.items.insert(Item::with_net_id(&class, rep.quantity, rep.net_id)),
            };
            if let Some(item) = self.items.get_mut(handle) {
                item.apply_replicated(rep.quantity, rep.key);
            }
            order.push(handle);
        }

        for (_, stale) in known {
            self.items.remove(stale);
        }

        self.order = order;
        self.net_id = state.net_id;
        self.capacity = state.capacity;
        self.weight_capacity = state.weight_capacity;
        self.rep_key = state.key;

        self.events.broadcast(InventoryEvent::Updated);

        for &handle in &self.order {
            if let Some(item) = self.items.get_mut(handle) {
                if !item.arrived {
                    item.arrived = true;
                    self.events.broadcast(InventoryEvent::ItemAdded {
                        item: handle,
                        class: item.class_id().clone(),
                    });
                }
            }
        }

        Ok(())
    }
}
