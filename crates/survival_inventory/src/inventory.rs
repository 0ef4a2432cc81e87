//! Inventory component
//!
//! The container is authoritative-only for mutation. Proxies hold a mirror
//! that is rebuilt from replicated state (see [`crate::replication`]).

use crate::config::InventoryConfig;
use crate::events::Subscribers;
use crate::item::{is_weightless, Item, ItemClass, ItemClassId};
use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use survival_core::{Arena, Handle, NetId, NetRole, ReplicationKey};
use thiserror::Error;

/// Handle to an item stored in an [`Inventory`]
pub type ItemHandle = Handle<Item>;

/// Fraction of a unit still counted as fitting; f32 sums like 0.3 + 0.1 land just short of 0.4
const WEIGHT_FIT_TOLERANCE: f32 = 1.0e-4;

/// Inventory shared with other threads; the mutex makes it single-writer
pub type SharedInventory = Arc<Mutex<Inventory>>;

/// Inventory events
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// Contents or limits changed; listeners should refresh
    Updated,
    /// A new entry appeared (not fired for stack merges)
    ItemAdded { item: ItemHandle, class: ItemClassId },
    /// An entry was removed
    ItemRemoved {
        item: ItemHandle,
        class: ItemClassId,
        net_id: NetId,
    },
}

/// Why an add was rejected or cut short. The display text is shown to the player.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddFailure {
    #[error("Couldn't add {item} to Inventory. Inventory is full.")]
    InventoryFull { item: String },
    #[error("Couldn't add {item}, too much weight.")]
    TooMuchWeight { item: String },
    #[error("Couldn't add entire stack of {item} to Inventory.")]
    PartialWeight { item: String },
    #[error("Couldn't add entire stack of {item} to Inventory. Inventory was full.")]
    PartialCapacity { item: String },
    #[error("Couldn't add {item}. You already have full stack of this Item.")]
    FullStack { item: String },
    #[error("Couldn't add {item} to Inventory.")]
    NothingAdded { item: String },
}

/// Tri-state classification of an [`ItemAddResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddResultKind {
    AddedNone,
    AddedSome,
    AddedAll,
}

/// Outcome of an add attempt
#[derive(Debug, Clone, PartialEq)]
pub struct ItemAddResult {
    /// Quantity the caller asked for
    pub amount_requested: u32,
    /// Quantity actually placed in the inventory
    pub amount_given: u32,
    /// Player-facing text; empty when everything was added
    pub error_message: String,
    /// Typed reason behind `error_message`
    pub reason: Option<AddFailure>,
}

impl ItemAddResult {
    /// Nothing was added
    pub fn added_none(requested: u32, reason: AddFailure) -> Self {
        Self {
            amount_requested: requested,
            amount_given: 0,
            error_message: reason.to_string(),
            reason: Some(reason),
        }
    }

    /// Part of the request was added
    pub fn added_some(requested: u32, given: u32, reason: AddFailure) -> Self {
        Self {
            amount_requested: requested,
            amount_given: given,
            error_message: reason.to_string(),
            reason: Some(reason),
        }
    }

    /// The full request was added
    pub fn added_all(requested: u32) -> Self {
        Self {
            amount_requested: requested,
            amount_given: requested,
            error_message: String::new(),
            reason: None,
        }
    }

    /// Classify by the two amounts
    pub fn kind(&self) -> AddResultKind {
        if self.amount_given == 0 {
            AddResultKind::AddedNone
        } else if self.amount_given >= self.amount_requested {
            AddResultKind::AddedAll
        } else {
            AddResultKind::AddedSome
        }
    }

    /// Check if the full request was added
    pub fn is_all(&self) -> bool {
        self.kind() == AddResultKind::AddedAll
    }

    /// Check if nothing was added
    pub fn is_none(&self) -> bool {
        self.kind() == AddResultKind::AddedNone
    }

    /// Quantity left over
    pub fn remainder(&self) -> u32 {
        self.amount_requested.saturating_sub(self.amount_given)
    }
}

/// How the slot-count check treats adds that would merge into an existing stack
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotCheck {
    /// A full inventory rejects every weighted add, even a merge that needs no new slot
    #[default]
    Conservative,
    /// A full inventory still accepts merges into an existing stack
    MergeAware,
}

/// Inventory component
#[derive(Debug)]
pub struct Inventory {
    role: NetRole,
    pub(crate) net_id: NetId,
    pub(crate) items: Arena<Item>,
    /// Insertion order, for UI
    pub(crate) order: Vec<ItemHandle>,
    pub(crate) capacity: u32,
    pub(crate) weight_capacity: f32,
    slot_check: SlotCheck,
    pub(crate) rep_key: ReplicationKey,
    pub(crate) pending_client_refresh: bool,
    pub(crate) events: Subscribers<InventoryEvent>,
}

impl Inventory {
    /// Create an authoritative inventory
    pub fn new(capacity: u32, weight_capacity: f32) -> Self {
        Self {
            role: NetRole::Authority,
            net_id: NetId::next(),
            items: Arena::with_capacity(capacity as usize),
            order: Vec::with_capacity(capacity as usize),
            capacity,
            weight_capacity,
            slot_check: SlotCheck::default(),
            rep_key: ReplicationKey::INITIAL,
            pending_client_refresh: false,
            events: Subscribers::new(),
        }
    }

    /// Create from configuration
    pub fn from_config(config: &InventoryConfig) -> Self {
        Self::new(config.capacity, config.weight_capacity).with_slot_check(config.slot_check)
    }

    /// Set the network role
    pub fn with_role(mut self, role: NetRole) -> Self {
        self.role = role;
        self
    }

    /// Set the slot check policy
    pub fn with_slot_check(mut self, slot_check: SlotCheck) -> Self {
        self.slot_check = slot_check;
        self
    }

    /// Wrap for use from several threads
    pub fn into_shared(self) -> SharedInventory {
        Arc::new(Mutex::new(self))
    }

    /// Network role
    pub fn role(&self) -> NetRole {
        self.role
    }

    /// Check if this copy may mutate
    pub fn has_authority(&self) -> bool {
        self.role.has_authority()
    }

    /// Replicated identity of the container itself
    pub fn net_id(&self) -> NetId {
        self.net_id
    }

    /// Container replication key
    pub fn rep_key(&self) -> ReplicationKey {
        self.rep_key
    }

    /// Slot policy in use
    pub fn slot_check(&self) -> SlotCheck {
        self.slot_check
    }

    /// Listen for inventory events
    pub fn subscribe(&mut self) -> Receiver<InventoryEvent> {
        self.events.subscribe()
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Maximum carried weight
    pub fn weight_capacity(&self) -> f32 {
        self.weight_capacity
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if there are no entries
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Sum of `quantity * weight` over all entries
    pub fn current_weight(&self) -> f32 {
        self.items().map(|(_, item)| item.stack_weight()).sum()
    }

    /// Entries in insertion order
    pub fn items(&self) -> impl Iterator<Item = (ItemHandle, &Item)> + '_ {
        self.order
            .iter()
            .filter_map(move |&handle| self.items.get(handle).map(|item| (handle, item)))
    }

    /// Resolve a handle
    pub fn get(&self, item: ItemHandle) -> Option<&Item> {
        self.items.get(item)
    }

    /// Check if a handle still refers to an entry of this inventory
    pub fn contains(&self, item: ItemHandle) -> bool {
        self.items.contains(item)
    }

    /// Entry with the same class as `item`
    pub fn find_item(&self, item: &Item) -> Option<ItemHandle> {
        self.find_item_by_class(item.class_id())
    }

    /// Entry of exactly this class
    pub fn find_item_by_class(&self, class: &ItemClassId) -> Option<ItemHandle> {
        self.items()
            .find(|(_, item)| item.class_id() == class)
            .map(|(handle, _)| handle)
    }

    /// Entries of this class or any subclass
    pub fn find_items_by_class(&self, class: &ItemClassId) -> Vec<ItemHandle> {
        self.items()
            .filter(|(_, item)| item.class().is_child_of(class))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Entry with this replicated id
    pub fn find_by_net_id(&self, net_id: NetId) -> Option<ItemHandle> {
        self.items()
            .find(|(_, item)| item.net_id() == net_id)
            .map(|(handle, _)| handle)
    }

    /// Check for at least `quantity` units in the entry of this class
    pub fn has_item(&self, class: &ItemClassId, quantity: u32) -> bool {
        self.find_item_by_class(class)
            .and_then(|handle| self.items.get(handle))
            .map(|item| item.quantity() >= quantity)
            .unwrap_or(false)
    }

    /// Change the slot limit. Existing entries are kept even if now over the limit.
    pub fn set_capacity(&mut self, capacity: u32) {
        self.capacity = capacity;
        self.rep_key.bump();
        self.events.broadcast(InventoryEvent::Updated);
    }

    /// Change the weight limit. Existing entries are kept even if now over the limit.
    pub fn set_weight_capacity(&mut self, weight_capacity: f32) {
        self.weight_capacity = weight_capacity;
        self.rep_key.bump();
        self.events.broadcast(InventoryEvent::Updated);
    }

    /// Create a fresh item of `class` and try to add it
    pub fn try_add_item_from_class(&mut self, class: &ItemClass, quantity: u32) -> ItemAddResult {
        let item = Item::new(class, quantity);
        self.try_add_item(&item)
    }

    /// Add as much of `item` as slot, weight and stack limits allow.
    ///
    /// `item` is not moved in; new entries are fresh copies. The caller keeps
    /// ownership and adjusts its own quantity from `amount_given`.
    ///
    /// # Panics
    ///
    /// When called on a proxy. Proxies must send a command to the authority.
    pub fn try_add_item(&mut self, item: &Item) -> ItemAddResult {
        assert!(
            self.role.has_authority(),
            "try_add_item called on a {:?} inventory",
            self.role
        );

        let class = Arc::clone(item.class());
        let add_amount = item.quantity();
        let name = class.name.clone();

        if add_amount == 0 {
            return ItemAddResult::added_none(0, AddFailure::NothingAdded { item: name });
        }

        let existing = if class.stackable {
            self.find_item(item)
        } else {
            None
        };

        if self.slot_check_blocks(&class, existing.is_some()) {
            log::debug!("Rejected {} x{}: no free slot", class.id, add_amount);
            return ItemAddResult::added_none(add_amount, AddFailure::InventoryFull { item: name });
        }

        let room_by_weight = self.room_by_weight(&class, self.current_weight());
        if room_by_weight == 0 {
            log::debug!("Rejected {} x{}: over weight", class.id, add_amount);
            return ItemAddResult::added_none(add_amount, AddFailure::TooMuchWeight { item: name });
        }

        if class.stackable {
            debug_assert!(
                add_amount <= class.max_stack,
                "{} stack of {} exceeds max stack {}",
                class.id,
                add_amount,
                class.max_stack
            );

            if let Some(handle) = existing {
                return self.merge_into(handle, add_amount, room_by_weight, name);
            }

            let given = add_amount.min(class.max_stack).min(room_by_weight);
            if given == 0 {
                return ItemAddResult::added_none(add_amount, AddFailure::NothingAdded { item: name });
            }

            self.add_item(&class, given);

            if given < add_amount {
                let reason = if room_by_weight < add_amount.min(class.max_stack) {
                    AddFailure::PartialWeight { item: name }
                } else {
                    AddFailure::PartialCapacity { item: name }
                };
                ItemAddResult::added_some(add_amount, given, reason)
            } else {
                ItemAddResult::added_all(add_amount)
            }
        } else {
            debug_assert_eq!(add_amount, 1, "non-stackable {} with quantity {}", class.id, add_amount);
            if add_amount != 1 {
                log::error!("Non-stackable {} arrived with quantity {}; adding one", class.id, add_amount);
            }

            self.add_item(&class, 1);

            if add_amount > 1 {
                ItemAddResult::added_some(add_amount, 1, AddFailure::PartialCapacity { item: name })
            } else {
                ItemAddResult::added_all(add_amount)
            }
        }
    }

    /// Consume up to `quantity` units; the entry is removed when it reaches zero.
    /// Returns how many units were consumed.
    pub fn consume_item(&mut self, item: ItemHandle, quantity: u32) -> u32 {
        if !self.role.has_authority() {
            log::debug!("Ignoring consume of {:?} on a proxy inventory", item);
            return 0;
        }

        let Some(entry) = self.items.get_mut(item) else {
            return 0;
        };

        let remove_quantity = quantity.min(entry.quantity());
        if remove_quantity == 0 {
            return 0;
        }

        let remaining = entry.quantity() - remove_quantity;
        entry.set_quantity(remaining);

        if remaining == 0 {
            self.remove_item(item);
        } else {
            // The collection diff alone won't tell owners about a quantity change
            self.rep_key.bump();
            self.pending_client_refresh = true;
            self.events.broadcast(InventoryEvent::Updated);
        }

        remove_quantity
    }

    /// Consume the entire entry. Returns how many units were consumed.
    pub fn consume_all(&mut self, item: ItemHandle) -> u32 {
        match self.items.get(item) {
            Some(entry) => {
                let quantity = entry.quantity();
                self.consume_item(item, quantity)
            }
            None => 0,
        }
    }

    /// Remove an entry outright
    pub fn remove_item(&mut self, item: ItemHandle) -> bool {
        if !self.role.has_authority() {
            log::debug!("Ignoring removal of {:?} on a proxy inventory", item);
            return false;
        }

        let Some(removed) = self.items.remove(item) else {
            return false;
        };
        self.order.retain(|&handle| handle != item);
        self.rep_key.bump();

        log::debug!("Removed {} ({})", removed.class_id(), removed.net_id());
        self.events.broadcast(InventoryEvent::ItemRemoved {
            item,
            class: removed.class_id().clone(),
            net_id: removed.net_id(),
        });
        true
    }

    fn slot_check_blocks(&self, class: &ItemClass, has_existing_stack: bool) -> bool {
        if self.order.len() < self.capacity as usize {
            return false;
        }
        match self.slot_check {
            SlotCheck::Conservative => !(has_existing_stack && is_weightless(class.weight)),
            SlotCheck::MergeAware => !has_existing_stack,
        }
    }

    fn room_by_weight(&self, class: &ItemClass, current_weight: f32) -> u32 {
        if is_weightless(class.weight) {
            return u32::MAX;
        }
        // Float-to-int `as` saturates; negatives and NaN become zero
        ((self.weight_capacity - current_weight) / class.weight + WEIGHT_FIT_TOLERANCE).floor() as u32
    }

    fn merge_into(
        &mut self,
        handle: ItemHandle,
        add_amount: u32,
        room_by_weight: u32,
        name: String,
    ) -> ItemAddResult {
        let Some(existing) = self.items.get_mut(handle) else {
            return ItemAddResult::added_none(add_amount, AddFailure::NothingAdded { item: name });
        };

        let max_stack = existing.class().max_stack;
        let quantity = existing.quantity();
        if quantity >= max_stack {
            return ItemAddResult::added_none(add_amount, AddFailure::FullStack { item: name });
        }

        let room_by_stack = max_stack - quantity;
        let given = add_amount.min(room_by_stack).min(room_by_weight);
        if given == 0 {
            return ItemAddResult::added_none(add_amount, AddFailure::NothingAdded { item: name });
        }

        existing.set_quantity(quantity + given);
        debug_assert!(existing.quantity() <= max_stack);

        log::debug!(
            "Merged {} x{} into {} (now {})",
            existing.class_id(),
            given,
            existing.net_id(),
            existing.quantity()
        );

        self.rep_key.bump();
        self.events.broadcast(InventoryEvent::Updated);

        if given < add_amount {
            let reason = if room_by_weight < room_by_stack && room_by_weight < add_amount {
                AddFailure::PartialWeight { item: name }
            } else {
                AddFailure::PartialCapacity { item: name }
            };
            ItemAddResult::added_some(add_amount, given, reason)
        } else {
            ItemAddResult::added_all(add_amount)
        }
    }

    fn add_item(&mut self, class: &ItemClass, quantity: u32) -> ItemHandle {
        let mut item = Item::new(class, quantity);
        item.arrived = true;
        item.mark_dirty();

        log::debug!("Added {} x{} as {}", class.id, quantity, item.net_id());

        let handle = self.items.insert(item);
        self.order.push(handle);
        self.rep_key.bump();

        self.events.broadcast(InventoryEvent::ItemAdded {
            item: handle,
            class: class.id.clone(),
        });
        self.events.broadcast(InventoryEvent::Updated);
        handle
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::from_config(&InventoryConfig::default())
    }
}
