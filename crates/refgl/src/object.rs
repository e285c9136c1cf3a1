//! # Object Arena
//!
//! Generation-checked storage for context-owned objects. Freed slots are
//! recycled with a new generation, so stale handles fail lookup instead of
//! aliasing whatever took their place.

use alloc::vec::Vec;

use refgl_core::Handle;

struct Slot<T> {
    /// Stored object, `None` once freed
    object: Option<T>,
    /// Generation of the current (or last) occupant
    generation: u32,
}

/// Arena of objects addressed by [`Handle<T>`].
pub struct ObjectTable<T> {
    slots: Vec<Slot<T>>,
    free_list: Vec<u32>,
    next_generation: u32,
    live: usize,
}

impl<T> ObjectTable<T> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            next_generation: 1,
            live: 0,
        }
    }

    /// Store `object` and return its handle
    pub fn insert(&mut self, object: T) -> Handle<T> {
        let generation = self.next_generation;
        self.next_generation = self.next_generation.wrapping_add(1).max(1);

        let index = if let Some(index) = self.free_list.pop() {
            let slot = &mut self.slots[index as usize];
            slot.generation = generation;
            slot.object = Some(object);
            index
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                object: Some(object),
                generation,
            });
            index
        };

        self.live += 1;
        Handle::new(index, generation)
    }

    /// Look up a live object
    pub fn get(&self, handle: Handle<T>) -> Option<&T> {
        let slot = self.slots.get(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.object.as_ref()
    }

    /// Look up a live object mutably
    pub fn get_mut(&mut self, handle: Handle<T>) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        slot.object.as_mut()
    }

    /// Whether `handle` refers to a live object
    pub fn contains(&self, handle: Handle<T>) -> bool {
        self.get(handle).is_some()
    }

    /// Free the object behind `handle`, returning it
    pub fn remove(&mut self, handle: Handle<T>) -> Option<T> {
        let slot = self.slots.get_mut(handle.index() as usize)?;
        if slot.generation != handle.generation() {
            return None;
        }
        let object = slot.object.take()?;
        self.free_list.push(handle.index());
        self.live -= 1;
        Some(object)
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.live
    }

    /// No live objects
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterate over live objects with their handles
    pub fn iter(&self) -> impl Iterator<Item = (Handle<T>, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.object
                .as_ref()
                .map(|object| (Handle::new(index as u32, slot.generation), object))
        })
    }

    /// Iterate mutably over live objects
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.object.as_mut())
    }
}

impl<T> Default for ObjectTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> core::fmt::Debug for ObjectTable<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ObjectTable")
            .field("live", &self.live)
            .field("capacity", &self.slots.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_get_remove() {
        let mut table = ObjectTable::new();
        let a = table.insert(10u32);
        let b = table.insert(20u32);
        assert_eq!(table.get(a), Some(&10));
        assert_eq!(table.get(b), Some(&20));
        assert_eq!(table.len(), 2);

        assert_eq!(table.remove(a), Some(10));
        assert!(table.get(a).is_none());
        assert_eq!(table.remove(a), None);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_reused_slot_rejects_stale_handle() {
        let mut table = ObjectTable::new();
        let old = table.insert("old");
        table.remove(old);
        let new = table.insert("new");

        assert_eq!(old.index(), new.index());
        assert_ne!(old, new);
        assert!(table.get(old).is_none());
        assert!(table.get_mut(old).is_none());
        assert_eq!(table.get(new), Some(&"new"));
    }

    #[test]
    fn test_iter_skips_freed() {
        let mut table = ObjectTable::new();
        let a = table.insert(1);
        let _b = table.insert(2);
        table.remove(a);
        let values: Vec<_> = table.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, [2]);
    }
}
