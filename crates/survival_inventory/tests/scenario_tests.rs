//! End-to-end gameplay scenarios: stacking limits, replication and commands

use approx::assert_relative_eq;
use survival_inventory::prelude::*;

const CONFIG: &str = r#"
    [inventory]
    capacity = 6
    weight_capacity = 30.0

    [[items]]
    id = "ammo_556"
    name = "5.56 Rounds"
    weight = 0.01
    stackable = true
    max_stack = 120

    [[items]]
    id = "rifle"
    name = "Rifle"
    weight = 4.0
    slot = "weapon"
    weapon = { ammo = "ammo_556", ammo_per_clip = 30 }

    [[items]]
    id = "beans"
    name = "Beans"
    weight = 0.4
    stackable = true
    max_stack = 8
    food = { heal_amount = 25.0 }
"#;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn setup() -> (SurvivalConfig, ItemCatalog) {
    init_logging();
    let config = SurvivalConfig::from_toml_str(CONFIG).unwrap();
    let catalog = ItemCatalog::from_defs(&config.items).unwrap();
    (config, catalog)
}

fn class(catalog: &ItemCatalog, id: &str) -> ItemClass {
    catalog.require(&id.into()).unwrap().clone()
}

#[test]
fn scenario_merge_into_only_slot() {
    let x = ItemDefinition::new("x", "X").with_weight(1.0).stackable(5).build();

    let mut inv = Inventory::new(1, 100.0).with_slot_check(SlotCheck::MergeAware);
    let first = inv.try_add_item_from_class(&x, 3);
    assert_eq!(first.kind(), AddResultKind::AddedAll);
    assert_eq!(first.amount_given, 3);

    let second = inv.try_add_item_from_class(&x, 4);
    assert_eq!(second.kind(), AddResultKind::AddedSome);
    assert_eq!((second.amount_requested, second.amount_given), (4, 2));
    assert_eq!(second.error_message, "Couldn't add entire stack of X to Inventory. Inventory was full.");

    // The default check refuses the same merge because the slot count is already at capacity
    let mut conservative = Inventory::new(1, 100.0);
    conservative.try_add_item_from_class(&x, 3);
    let refused = conservative.try_add_item_from_class(&x, 4);
    assert_eq!(refused.kind(), AddResultKind::AddedNone);
    assert_eq!(refused.error_message, "Couldn't add X to Inventory. Inventory is full.");
}

#[test]
fn scenario_weight_rejects_fourth_heavy_item() {
    let y = ItemDefinition::new("y", "Y").with_weight(3.0).build();
    let mut inv = Inventory::new(5, 10.0);

    for _ in 0..3 {
        assert!(inv.try_add_item_from_class(&y, 1).is_all());
    }
    assert_relative_eq!(inv.current_weight(), 9.0);

    let fourth = inv.try_add_item_from_class(&y, 1);
    assert_eq!(fourth.kind(), AddResultKind::AddedNone);
    assert_eq!(fourth.error_message, "Couldn't add Y, too much weight.");
    assert_eq!(inv.len(), 3);
}

#[test]
fn scenario_weightless_at_weight_cap() {
    let brick = ItemDefinition::new("brick", "Brick").with_weight(5.0).stackable(10).build();
    let feather = ItemDefinition::new("feather", "Feather").stackable(100).build();
    let mut inv = Inventory::new(3, 10.0);

    assert!(inv.try_add_item_from_class(&brick, 2).is_all());
    assert_relative_eq!(inv.current_weight(), inv.weight_capacity());
    assert!(inv.try_add_item_from_class(&brick, 1).is_none());

    assert!(inv.try_add_item_from_class(&feather, 60).is_all());
    assert!(inv.try_add_item_from_class(&feather, 40).is_all());
    assert!(inv.has_item(&feather.id, 100));
}

#[test]
fn scenario_config_driven_survivor() {
    let (config, catalog) = setup();
    let mut survivor = Survivor::with_inventory_config(NetRole::Authority, &config.inventory);
    assert_eq!(survivor.inventory().capacity(), 6);

    let rifle = catalog.create(&"rifle".into(), 1).unwrap();
    let rounds = catalog.create(&"ammo_556".into(), 90).unwrap();
    assert!(survivor.inventory_mut().try_add_item(&rifle).is_all());
    assert!(survivor.inventory_mut().try_add_item(&rounds).is_all());

    let rifle_handle = survivor.inventory().find_item_by_class(rifle.class_id()).unwrap();
    assert!(survivor.equip_item(rifle_handle));
    assert_eq!(survivor.reload(), 30);
    assert_eq!(survivor.weapon().map(|w| w.ammo_display(survivor.inventory())), Some("30/60".to_string()));
}

#[test]
fn scenario_replication_round_trip() {
    let (config, catalog) = setup();
    let beans = class(&catalog, "beans");
    let ammo = class(&catalog, "ammo_556");

    let mut authority = Survivor::with_inventory_config(NetRole::Authority, &config.inventory);
    let mut owner = Survivor::with_inventory_config(NetRole::AutonomousProxy, &config.inventory);
    let events = owner.inventory_mut().subscribe();
    let mut channel = KeyedChannel::new();

    authority.inventory_mut().try_add_item_from_class(&beans, 3);
    authority.inventory_mut().try_add_item_from_class(&ammo, 40);
    assert!(authority.inventory().replicate_subobjects(&mut channel));
    assert_eq!(channel.take_written().len(), 2);
    owner.apply_replicated(&authority.snapshot(), &catalog).unwrap();

    authority.inventory_mut().try_add_item_from_class(&beans, 2);
    assert!(authority.inventory().replicate_subobjects(&mut channel));
    let written = channel.take_written();
    assert_eq!(written.len(), 1);
    assert_eq!(written[0].quantity, 5);
    owner.apply_replicated(&authority.snapshot(), &catalog).unwrap();

    let received: Vec<InventoryEvent> = events.try_iter().collect();
    let added: Vec<&ItemClassId> = received
        .iter()
        .filter_map(|e| match e {
            InventoryEvent::ItemAdded { class, .. } => Some(class),
            _ => None,
        })
        .collect();
    assert_eq!(added, vec![&beans.id, &ammo.id]);
    assert_eq!(received.first(), Some(&InventoryEvent::Updated));

    assert!(owner.inventory().has_item(&beans.id, 5));
    assert_relative_eq!(owner.inventory().current_weight(), authority.inventory().current_weight());
    assert_eq!(owner.inventory().rep_key(), authority.inventory().rep_key());
}

/// Host channel that records every query
#[derive(Default)]
struct CountingChannel {
    queries: usize,
    writes: usize,
}

impl ReplicationChannel for CountingChannel {
    fn key_needs_to_replicate(&mut self, _object: NetId, _key: ReplicationKey) -> bool {
        self.queries += 1;
        true
    }

    fn replicate_subobject(&mut self, _item: &ReplicatedItem) -> bool {
        self.writes += 1;
        true
    }
}

#[test]
fn scenario_custom_replication_channel() {
    let (_, catalog) = setup();
    let mut inv = Inventory::new(5, 30.0);
    inv.try_add_item_from_class(&class(&catalog, "beans"), 1);
    inv.try_add_item_from_class(&class(&catalog, "rifle"), 1);

    let mut channel = CountingChannel::default();
    assert!(inv.replicate_subobjects(&mut channel));
    assert_eq!(channel.queries, 3);
    assert_eq!(channel.writes, 2);
}

#[test]
fn scenario_command_protocol() {
    let (config, catalog) = setup();
    let beans = class(&catalog, "beans");

    let mut authority = Survivor::with_inventory_config(NetRole::Authority, &config.inventory)
        .with_health(40.0);
    let mut owner = Survivor::with_inventory_config(NetRole::AutonomousProxy, &config.inventory)
        .with_health(40.0);
    let messages = authority.subscribe_notifications();

    authority.inventory_mut().try_add_item_from_class(&beans, 4);
    owner.apply_replicated(&authority.snapshot(), &catalog).unwrap();
    let mirrored = owner.inventory().find_item_by_class(&beans.id).unwrap();

    owner.use_item(mirrored);
    owner.drop_item(mirrored, 2);
    assert!(owner.inventory().has_item(&beans.id, 4));

    let mut pickups = Vec::new();
    for command in owner.take_outbox() {
        if let Some(pickup) = authority.execute(command, None).into_pickup() {
            pickups.push(pickup);
        }
    }

    assert_eq!(authority.health(), 65.0);
    assert_eq!(messages.try_recv().unwrap(), "Ate Beans, healed 25 health.");
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].quantity(), 2);

    assert!(authority.inventory_mut().take_client_refresh());
    owner.apply_replicated(&authority.snapshot(), &catalog).unwrap();
    assert!(owner.inventory().has_item(&beans.id, 1));
    assert!(!owner.inventory().has_item(&beans.id, 2));
    assert_eq!(owner.health(), 65.0);
}

#[test]
fn scenario_loot_crate_to_full_inventory() {
    let (_, catalog) = setup();
    let beans = class(&catalog, "beans");

    let mut authority = Survivor::default();
    let mut loot_crate = Inventory::new(10, 100.0);
    loot_crate.try_add_item_from_class(&beans, 8);
    authority.inventory_mut().try_add_item_from_class(&beans, 5);

    let loot = loot_crate.find_item_by_class(&beans.id).unwrap();
    let loot_id = loot_crate.get(loot).unwrap().net_id();
    let outcome = authority.execute(InventoryCommand::LootItem { item: loot_id }, Some(&mut loot_crate));

    assert!(matches!(outcome, CommandOutcome::Applied));
    assert!(authority.inventory().has_item(&beans.id, 8));
    assert_eq!(loot_crate.get(loot).unwrap().quantity(), 5);
}

#[test]
fn scenario_shared_inventory_across_threads() {
    let (_, catalog) = setup();
    let ammo = class(&catalog, "ammo_556");
    let shared: SharedInventory = Inventory::new(4, 30.0).into_shared();
    let events = shared.lock().subscribe();

    let workers: Vec<_> = (0..3)
        .map(|_| {
            let shared = shared.clone();
            let ammo = ammo.clone();
            std::thread::spawn(move || shared.lock().try_add_item_from_class(&ammo, 30).amount_given)
        })
        .collect();
    let given: u32 = workers.into_iter().map(|w| w.join().unwrap()).sum();

    assert_eq!(given, 90);
    assert!(shared.lock().has_item(&ammo.id, 90));
    assert!(events.try_iter().any(|e| matches!(e, InventoryEvent::ItemAdded { .. })));
}
