//! Inventory and item catalog configuration
//!
//! # Example Config File
//!
//! ```toml
//! [inventory]
//! capacity = 20
//! weight_capacity = 80.0
//! slot_check = "conservative"  # conservative, merge_aware
//!
//! [[items]]
//! id = "ammo"
//! name = "Ammo"
//!
//! [[items]]
//! id = "ammo_556"
//! name = "5.56 Rounds"
//! parent = "ammo"
//! weight = 0.01
//! stackable = true
//! max_stack = 120
//!
//! [[items]]
//! id = "rifle"
//! name = "Rifle"
//! weight = 4.0
//! slot = "weapon"
//! weapon = { ammo = "ammo_556", ammo_per_clip = 30 }
//! ```

use crate::equipment::EquipSlot;
use crate::error::Result;
use crate::inventory::SlotCheck;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurvivalConfig {
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub items: Vec<ItemDef>,
}

impl SurvivalConfig {
    /// Parse from a TOML string
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source)?;
        log::debug!(
            "Loaded {} item classes from {}",
            config.items.len(),
            path.display()
        );
        Ok(config)
    }
}

/// Player inventory limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryConfig {
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    #[serde(default = "default_weight_capacity")]
    pub weight_capacity: f32,
    #[serde(default)]
    pub slot_check: SlotCheck,
}

fn default_capacity() -> u32 { 20 }
fn default_weight_capacity() -> f32 { 80.0 }

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            weight_capacity: default_weight_capacity(),
            slot_check: SlotCheck::default(),
        }
    }
}

/// Item class definition as written in config
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub use_action: Option<String>,
    #[serde(default)]
    pub weight: f32,
    #[serde(default)]
    pub stackable: bool,
    #[serde(default = "default_max_stack")]
    pub max_stack: u32,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub slot: Option<EquipSlot>,
    #[serde(default)]
    pub food: Option<FoodDef>,
    #[serde(default)]
    pub weapon: Option<WeaponDef>,
}

fn default_max_stack() -> u32 { 1 }

/// Food section of an item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoodDef {
    #[serde(default = "default_heal_amount")]
    pub heal_amount: f32,
}

fn default_heal_amount() -> f32 { 20.0 }

/// Weapon section of an item definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponDef {
    pub ammo: String,
    #[serde(default = "default_ammo_per_clip")]
    pub ammo_per_clip: u32,
}

fn default_ammo_per_clip() -> u32 { 30 }
