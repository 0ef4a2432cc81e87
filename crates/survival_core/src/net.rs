//! Network role and replication bookkeeping primitives

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Which side of the replication link an entity lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NetRole {
    /// Owns the state; the only role allowed to mutate it
    Authority,
    /// Locally controlled mirror (the owning player's client)
    AutonomousProxy,
    /// Mirror of an entity controlled elsewhere
    SimulatedProxy,
}

impl NetRole {
    /// Check if this role may mutate replicated state
    #[inline]
    pub const fn has_authority(&self) -> bool {
        matches!(self, Self::Authority)
    }

    /// Check if this role is a read-only mirror
    #[inline]
    pub const fn is_proxy(&self) -> bool {
        !self.has_authority()
    }
}

impl Default for NetRole {
    fn default() -> Self {
        Self::Authority
    }
}

/// Version counter the replication layer diffs against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReplicationKey(u32);

impl ReplicationKey {
    /// Initial key, before any mutation
    pub const INITIAL: Self = Self(0);

    /// Create from a raw value
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    pub const fn raw(&self) -> u32 {
        self.0
    }

    /// Advance to the next version
    #[inline]
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }
}

impl fmt::Display for ReplicationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k{}", self.0)
    }
}

static NEXT_NET_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a replicated object, shared by authority and observers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NetId(u64);

impl NetId {
    /// Never allocated
    pub const NONE: Self = Self(0);

    /// Allocate a fresh process-unique id
    pub fn next() -> Self {
        Self(NEXT_NET_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Create from a raw value received over the wire
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw value
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Check if this is [`NetId::NONE`]
    #[inline]
    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
