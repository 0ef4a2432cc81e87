//! Error types for the inventory system

use thiserror::Error;

/// Inventory system errors
#[derive(Debug, Error)]
pub enum InventoryError {
    /// Config file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`crate::config::SurvivalConfig`]
    #[error("Invalid inventory configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// Item class referenced before (or without) being declared
    #[error("Unknown item class: {0}")]
    UnknownClass(String),

    /// Item class declared twice
    #[error("Item class declared twice: {0}")]
    DuplicateClass(String),

    /// Replicated state applied to the authoritative copy
    #[error("Replicated state can only be applied to a proxy inventory")]
    AuthorityMismatch,
}

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;
