//! Registry of item classes

use crate::config::ItemDef;
use crate::error::{InventoryError, Result};
use crate::item::{FoodSpec, Item, ItemClass, ItemClassId, ItemDefinition, WeaponSpec};
use std::collections::HashMap;
use std::sync::Arc;

/// Item classes by id
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    classes: HashMap<ItemClassId, ItemClass>,
}

impl ItemCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from config definitions. Parents and ammo classes must be declared earlier.
    pub fn from_defs(defs: &[ItemDef]) -> Result<Self> {
        let mut catalog = Self::new();
        for def in defs {
            let class = catalog.resolve(def)?;
            catalog.register(class)?;
        }
        Ok(catalog)
    }

    /// Register a class
    pub fn register(&mut self, class: ItemClass) -> Result<()> {
        if self.classes.contains_key(&class.id) {
            return Err(InventoryError::DuplicateClass(class.id.to_string()));
        }
        self.classes.insert(class.id.clone(), class);
        Ok(())
    }

    /// Look up a class
    pub fn get(&self, id: &ItemClassId) -> Option<&ItemClass> {
        self.classes.get(id)
    }

    /// Look up a class, failing if unknown
    pub fn require(&self, id: &ItemClassId) -> Result<&ItemClass> {
        self.get(id)
            .ok_or_else(|| InventoryError::UnknownClass(id.to_string()))
    }

    /// Create an item of a registered class
    pub fn create(&self, id: &ItemClassId, quantity: u32) -> Result<Item> {
        Ok(Item::new(self.require(id)?, quantity))
    }

    /// Number of classes
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    fn resolve(&self, def: &ItemDef) -> Result<ItemClass> {
        let mut definition = ItemDefinition::new(def.id.clone(), def.name.clone())
            .with_description(def.description.clone())
            .with_weight(def.weight);

        if def.stackable {
            definition = definition.stackable(def.max_stack);
        }
        if let Some(parent) = &def.parent {
            definition.parent = Some(Arc::clone(self.require(&ItemClassId::new(parent.clone()))?));
        }
        definition.slot = def.slot;
        if let Some(food) = &def.food {
            definition.food = Some(FoodSpec { heal_amount: food.heal_amount });
            definition.use_action = "Consume".to_string();
        }
        if let Some(weapon) = &def.weapon {
            let ammo = self.require(&ItemClassId::new(weapon.ammo.clone()))?;
            definition.weapon = Some(WeaponSpec {
                ammo: Arc::clone(ammo),
                ammo_per_clip: weapon.ammo_per_clip,
            });
        }
        if let Some(action) = &def.use_action {
            definition.use_action = action.clone();
        }

        Ok(definition.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SurvivalConfig;
    use crate::equipment::EquipSlot;

    const ITEMS: &str = r#"
        [[items]]
        id = "ammo"
        name = "Ammo"

        [[items]]
        id = "ammo_556"
        name = "5.56 Rounds"
        parent = "ammo"
        weight = 0.01
        stackable = true
        max_stack = 120

        [[items]]
        id = "rifle"
        name = "Rifle"
        weight = 4.0
        slot = "weapon"
        weapon = { ammo = "ammo_556", ammo_per_clip = 30 }
    "#;

    #[test]
    fn test_catalog_from_config() {
        let config = SurvivalConfig::from_toml_str(ITEMS).unwrap();
        let catalog = ItemCatalog::from_defs(&config.items).unwrap();

        assert_eq!(catalog.len(), 3);
        let rounds = catalog.require(&"ammo_556".into()).unwrap();
        assert!(rounds.stackable);
        assert_eq!(rounds.max_stack, 120);
        assert!(rounds.is_child_of(&"ammo".into()));

        let rifle = catalog.require(&"rifle".into()).unwrap();
        assert_eq!(rifle.slot, Some(EquipSlot::Weapon));
        let weapon = rifle.weapon.as_ref().unwrap();
        assert_eq!(weapon.ammo.id, rounds.id);
        assert_eq!(weapon.ammo_per_clip, 30);
    }

    #[test]
    fn test_unknown_parent() {
        let config = SurvivalConfig::from_toml_str(
            r#"
            [[items]]
            id = "ammo_9mm"
            name = "9mm"
            parent = "ammo"
            "#,
        )
        .unwrap();

        let err = ItemCatalog::from_defs(&config.items).unwrap_err();
        assert!(matches!(err, InventoryError::UnknownClass(ref id) if id == "ammo"));
    }

    #[test]
    fn test_duplicate_class() {
        let mut catalog = ItemCatalog::new();
        catalog.register(ItemDefinition::new("rock", "Rock").build()).unwrap();
        let err = catalog.register(ItemDefinition::new("rock", "Rock").build()).unwrap_err();
        assert!(matches!(err, InventoryError::DuplicateClass(_)));
    }

    #[test]
    fn test_create() {
        let config = SurvivalConfig::from_toml_str(ITEMS).unwrap();
        let catalog = ItemCatalog::from_defs(&config.items).unwrap();

        let item = catalog.create(&"ammo_556".into(), 500).unwrap();
        assert_eq!(item.quantity(), 120);
        assert!(catalog.create(&"grenade".into(), 1).is_err());
    }
}
