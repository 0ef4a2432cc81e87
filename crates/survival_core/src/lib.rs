//! # survival_core - Survival Gameplay Core
//!
//! Dependency-light primitives shared by the gameplay crates:
//! - **Handles**: generational references into an [`Arena`]
//! - **Net roles**: who is allowed to mutate replicated state
//! - **Replication keys**: version counters the host diffs against
//! - **Net ids**: object identity shared by authority and observers

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

pub mod handle;
pub mod net;

pub use handle::*;
pub use net::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::handle::{Arena, Handle};
    pub use crate::net::{NetId, NetRole, ReplicationKey};
}
