//! Generational handles and the arena that hands them out
//!
//! A handle stays cheap to copy and never aliases: once the value behind it
//! is removed, the handle stops resolving even if its slot is reused.

use alloc::vec::Vec;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::marker::PhantomData;

/// A type-safe reference to a value stored in an [`Arena<T>`]
pub struct Handle<T> {
    index: u32,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    #[inline]
    const fn new(index: u32, generation: u32) -> Self {
        Self {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    /// Slot index inside the owning arena
    #[inline]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    #[inline]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

// Manual impls so `T` needs no bounds
impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = core::any::type_name::<T>();
        let short = name.rsplit("::").next().unwrap_or(name);
        write!(f, "Handle<{}>({}v{})", short, self.index, self.generation)
    }
}

enum Slot<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: Option<u32> },
}

/// Slot vector owning its values, addressed by [`Handle<T>`]
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Create an arena with room for `capacity` values before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Store a value and return its handle
    pub fn insert(&mut self, value: T) -> Handle<T> {
        self.len += 1;

        if let Some(index) = self.free_head {
            let slot = &mut self.slots[index as usize];
            let (generation, next_free) = match *slot {
                Slot::Vacant { generation, next_free } => (generation, next_free),
                Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            self.free_head = next_free;
            *slot = Slot::Occupied { generation, value };
            return Handle::new(index, generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot::Occupied { generation: 0, value });
        Handle::new(index, 0)
    }

    /// Remove a value, invalidating its handle
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation => {}
            _ => return None,
        }

        let vacant = Slot::Vacant {
            generation: handle.generation.wrapping_add(1),
            next_free: self.free_head,
        };
        let previous = core::mem::replace(slot, vacant);
        self.free_head = Some(handle.index);
        self.len -= 1;

        match previous {
            Slot::Occupied { value, .. } => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    /// Resolve a handle
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Resolve a handle mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { generation, value } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    /// Check whether a handle still resolves
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Number of live values
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if no values are stored
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Drop every value. Outstanding handles stop resolving.
    pub fn clear(&mut self) {
        let handles: Vec<Handle<T>> = self.iter().map(|(handle, _)| handle).collect();
        for handle in handles {
            self.remove(handle);
        }
    }

    /// Iterate live values in slot order
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied { generation, value } => Some((Handle::new(i as u32, *generation), value)),
            Slot::Vacant { .. } => None,
        })
    }

    /// Iterate live values mutably in slot order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Handle<T>, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied { generation, value } => Some((Handle::new(i as u32, *generation), value)),
            Slot::Vacant { .. } => None,
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::{String, ToString};

    #[test]
    fn test_insert_and_get() {
        let mut arena: Arena<String> = Arena::new();
        let a = arena.insert("rifle".to_string());
        let b = arena.insert("bandage".to_string());

        assert_ne!(a, b);
        assert_eq!(arena.get(a).map(String::as_str), Some("rifle"));
        assert_eq!(arena.get(b).map(String::as_str), Some("bandage"));
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_stale_handle_after_reuse() {
        let mut arena: Arena<u32> = Arena::new();
        let first = arena.insert(10);
        assert_eq!(arena.remove(first), Some(10));
        assert!(!arena.contains(first));

        let second = arena.insert(20);
        assert_eq!(second.index(), first.index());
        assert_ne!(second.generation(), first.generation());
        assert_eq!(arena.get(first), None);
        assert_eq!(arena.get(second), Some(&20));
    }

    #[test]
    fn test_double_remove() {
        let mut arena: Arena<u32> = Arena::new();
        let h = arena.insert(1);
        assert!(arena.remove(h).is_some());
        assert!(arena.remove(h).is_none());
        assert!(arena.is_empty());
    }

    #[test]
    fn test_clear_invalidates() {
        let mut arena: Arena<u32> = Arena::with_capacity(4);
        let handles: Vec<_> = (0..4).map(|v| arena.insert(v)).collect();
        arena.clear();

        assert!(arena.is_empty());
        assert!(handles.iter().all(|h| !arena.contains(*h)));
    }

    #[test]
    fn test_iter_mut() {
        let mut arena: Arena<u32> = Arena::new();
        arena.insert(1);
        arena.insert(2);
        for (_, value) in arena.iter_mut() {
            *value *= 10;
        }
        let values: Vec<u32> = arena.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![10, 20]);
    }
}
