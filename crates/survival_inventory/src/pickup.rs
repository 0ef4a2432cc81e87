//! Pickup system for world items

use crate::inventory::{Inventory, ItemAddResult};
use crate::item::{Item, ItemClass};
use crate::replication::{ReplicatedItem, ReplicationChannel};
use survival_core::{NetId, NetRole};

/// Default interaction distance, in world units
pub const DEFAULT_INTERACTION_DISTANCE: f32 = 200.0;

/// What happened when someone tried to take a pickup
#[derive(Debug, Clone, PartialEq)]
pub enum PickupOutcome {
    /// Nothing happened (proxy, no taker, empty, or already being destroyed)
    Ignored,
    /// Some or none was absorbed; the pickup stays with the remainder
    Partial { result: ItemAddResult },
    /// Everything was absorbed; the pickup is now pending destroy
    Destroyed { result: ItemAddResult },
}

impl PickupOutcome {
    /// Add result, if an add was attempted
    pub fn result(&self) -> Option<&ItemAddResult> {
        match self {
            Self::Ignored => None,
            Self::Partial { result } | Self::Destroyed { result } => Some(result),
        }
    }
}

/// A world entity holding one item
#[derive(Debug, Clone)]
pub struct Pickup {
    role: NetRole,
    net_id: NetId,
    item: Option<Item>,
    /// World position
    pub position: [f32; 3],
    /// How close a taker must be
    pub interaction_distance: f32,
    pending_destroy: bool,
}

impl Pickup {
    /// Create an empty authoritative pickup
    pub fn new(position: [f32; 3]) -> Self {
        Self {
            role: NetRole::Authority,
            net_id: NetId::next(),
            item: None,
            position,
            interaction_distance: DEFAULT_INTERACTION_DISTANCE,
            pending_destroy: false,
        }
    }

    /// Create a pickup already holding `item`
    pub fn from_item(item: Item, position: [f32; 3]) -> Self {
        let mut pickup = Self::new(position);
        pickup.item = Some(item);
        pickup
    }

    /// Set the network role
    pub fn with_role(mut self, role: NetRole) -> Self {
        self.role = role;
        self
    }

    /// Set interaction distance
    pub fn with_interaction_distance(mut self, distance: f32) -> Self {
        self.interaction_distance = distance;
        self
    }

    /// Fill with `quantity` of `class`. Authority only; zero quantity is ignored.
    pub fn initialize(&mut self, class: &ItemClass, quantity: u32) -> bool {
        if !self.role.has_authority() || quantity == 0 {
            return false;
        }
        let mut item = Item::new(class, quantity);
        item.mark_dirty();
        self.item = Some(item);
        true
    }

    /// Held item
    pub fn item(&self) -> Option<&Item> {
        self.item.as_ref()
    }

    /// Held quantity
    pub fn quantity(&self) -> u32 {
        self.item.as_ref().map(Item::quantity).unwrap_or(0)
    }

    /// Replicated identity
    pub fn net_id(&self) -> NetId {
        self.net_id
    }

    /// Check if the pickup has been fully taken and awaits removal from the world
    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy
    }

    /// Check if a taker at `taker_pos` can reach this pickup
    pub fn in_range(&self, taker_pos: [f32; 3]) -> bool {
        let dx = taker_pos[0] - self.position[0];
        let dy = taker_pos[1] - self.position[1];
        let dz = taker_pos[2] - self.position[2];
        dx * dx + dy * dy + dz * dz <= self.interaction_distance * self.interaction_distance
    }

    /// Move as much of the held item as fits into `taker`
    pub fn on_take_pickup(&mut self, taker: Option<&mut Inventory>) -> PickupOutcome {
        let Some(inventory) = taker else {
            log::warn!("Pickup {} was taken but the taker was not valid", self.net_id);
            return PickupOutcome::Ignored;
        };

        // Another taker may already have emptied it this tick
        if !self.role.has_authority() || self.pending_destroy {
            return PickupOutcome::Ignored;
        }
        let Some(item) = self.item.as_mut() else {
            return PickupOutcome::Ignored;
        };

        let result = inventory.try_add_item(item);

        if result.amount_given < item.quantity() {
            item.set_quantity(item.quantity() - result.amount_given);
            log::debug!(
                "Pickup {} partially taken, {} left",
                self.net_id,
                item.quantity()
            );
            PickupOutcome::Partial { result }
        } else {
            self.pending_destroy = true;
            log::debug!("Pickup {} fully taken", self.net_id);
            PickupOutcome::Destroyed { result }
        }
    }

    /// Send the held item if its key moved
    pub fn replicate_subobjects(&self, channel: &mut impl ReplicationChannel) -> bool {
        let Some(item) = &self.item else {
            return false;
        };
        if channel.key_needs_to_replicate(item.net_id(), item.rep_key()) {
            channel.replicate_subobject(&ReplicatedItem::from_item(item))
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDefinition;
    use crate::replication::KeyedChannel;

    fn logs() -> ItemClass {
        ItemDefinition::new("log", "Log").with_weight(1.0).stackable(20).build()
    }

    #[test]
    fn test_initialize() {
        let mut pickup = Pickup::new([0.0; 3]);
        assert!(!pickup.initialize(&logs(), 0));
        assert!(pickup.initialize(&logs(), 10));
        assert_eq!(pickup.quantity(), 10);
    }

    #[test]
    fn test_proxy_cannot_initialize() {
        let mut pickup = Pickup::new([0.0; 3]).with_role(NetRole::SimulatedProxy);
        assert!(!pickup.initialize(&logs(), 10));
        assert!(pickup.item().is_none());
    }

    #[test]
    fn test_in_range() {
        let pickup = Pickup::new([0.0; 3]).with_interaction_distance(2.0);
        assert!(pickup.in_range([1.0, 0.0, 0.0]));
        assert!(!pickup.in_range([3.0, 0.0, 0.0]));
        assert!(Pickup::new([0.0; 3]).in_range([150.0, 0.0, 0.0]));
    }

    #[test]
    fn test_take_all() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 10);
        let mut inv = Inventory::new(5, 100.0);

        let outcome = pickup.on_take_pickup(Some(&mut inv));

        assert!(matches!(outcome, PickupOutcome::Destroyed { .. }));
        assert!(pickup.is_pending_destroy());
        assert!(inv.has_item(&logs().id, 10));
    }

    #[test]
    fn test_take_partial() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 10);
        let mut inv = Inventory::new(5, 4.0);

        let outcome = pickup.on_take_pickup(Some(&mut inv));

        assert_eq!(outcome.result().map(|r| r.amount_given), Some(4));
        assert!(matches!(outcome, PickupOutcome::Partial { .. }));
        assert_eq!(pickup.quantity(), 6);
        assert!(!pickup.is_pending_destroy());
    }

    #[test]
    fn test_take_nothing_keeps_pickup() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 10);
        let mut inv = Inventory::new(0, 100.0);

        let outcome = pickup.on_take_pickup(Some(&mut inv));

        assert!(outcome.result().unwrap().is_none());
        assert_eq!(pickup.quantity(), 10);
        assert!(!pickup.is_pending_destroy());
    }

    #[test]
    fn test_no_double_take() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 5);
        let mut first = Inventory::new(5, 100.0);
        let mut second = Inventory::new(5, 100.0);

        pickup.on_take_pickup(Some(&mut first));
        let outcome = pickup.on_take_pickup(Some(&mut second));

        assert_eq!(outcome, PickupOutcome::Ignored);
        assert!(second.is_empty());
    }

    #[test]
    fn test_missing_taker() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 5);
        assert_eq!(pickup.on_take_pickup(None), PickupOutcome::Ignored);
        assert_eq!(pickup.quantity(), 5);
    }

    #[test]
    fn test_replicates_on_change() {
        let mut pickup = Pickup::new([0.0; 3]);
        pickup.initialize(&logs(), 10);
        let mut channel = KeyedChannel::new();

        assert!(pickup.replicate_subobjects(&mut channel));
        assert!(!pickup.replicate_subobjects(&mut channel));

        let mut inv = Inventory::new(5, 3.0);
        pickup.on_take_pickup(Some(&mut inv));
        assert!(pickup.replicate_subobjects(&mut channel));
        assert_eq!(channel.written().last().map(|i| i.quantity), Some(7));
    }
}
