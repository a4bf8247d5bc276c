//! Generation-checked handles.
//!
//! Long-lived holders (UI panels, script variables) keep a [`Handle`] instead
//! of a reference. Every access goes through [`HandleAllocator::translate`],
//! which returns `None` once the slot has been freed or the whole table has
//! been reset, even if the slot was reused since.

use serde::{Deserialize, Serialize};

/// Opaque reference into a [`HandleAllocator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Handle {
    slot: u32,
    generation: u32,
}

impl Handle {
    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

#[derive(Debug)]
enum Slot<T> {
    Occupied(T),
    Free { next: Option<u32> },
}

#[derive(Debug)]
struct Entry<T> {
    generation: u32,
    slot: Slot<T>,
}

/// Slot table with an intrusive free list and per-slot generation counters.
///
/// Not synchronized: the owner serializes `allocate`/`free`, or wraps the
/// allocator in a lock when it is shared.
#[derive(Debug)]
pub struct HandleAllocator<T> {
    entries: Vec<Entry<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Default for HandleAllocator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HandleAllocator<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Store `value`, reusing a freed slot when one is available.
    pub fn allocate(&mut self, value: T) -> Handle {
        self.len += 1;

        if let Some(slot) = self.free_head {
            let entry = &mut self.entries[slot as usize];
            self.free_head = match entry.slot {
                Slot::Free { next } => next,
                Slot::Occupied(_) => unreachable!("free list points at an occupied slot"),
            };
            entry.slot = Slot::Occupied(value);
            return Handle {
                slot,
                generation: entry.generation,
            };
        }

        assert!(
            self.entries.len() < u32::MAX as usize,
            "handle table exhausted"
        );
        let slot = self.entries.len() as u32;
        self.entries.push(Entry {
            generation: 0,
            slot: Slot::Occupied(value),
        });
        Handle {
            slot,
            generation: 0,
        }
    }

    /// Release the value behind `handle`, returning it to the caller.
    ///
    /// Returns `None` if the handle is already stale.
    pub fn free(&mut self, handle: Handle) -> Option<T> {
        if !self.contains(handle) {
            return None;
        }

        let entry = &mut self.entries[handle.slot as usize];
        let old = std::mem::replace(
            &mut entry.slot,
            Slot::Free {
                next: self.free_head,
            },
        );
        entry.generation = entry.generation.wrapping_add(1);
        self.free_head = Some(handle.slot);
        self.len -= 1;

        match old {
            Slot::Occupied(value) => Some(value),
            Slot::Free { .. } => None,
        }
    }

    /// Resolve a handle. `None` means the handle is stale.
    pub fn translate(&self, handle: Handle) -> Option<&T> {
        match self.entries.get(handle.slot as usize) {
            Some(Entry {
                generation,
                slot: Slot::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn translate_mut(&mut self, handle: Handle) -> Option<&mut T> {
        match self.entries.get_mut(handle.slot as usize) {
            Some(Entry {
                generation,
                slot: Slot::Occupied(value),
            }) if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.translate(handle).is_some()
    }

    /// Invalidate every outstanding handle at once and drop all values.
    pub fn reset(&mut self) {
        self.free_head = None;
        for (slot, entry) in self.entries.iter_mut().enumerate().rev() {
            entry.generation = entry.generation.wrapping_add(1);
            entry.slot = Slot::Free {
                next: self.free_head,
            };
            self.free_head = Some(slot as u32);
        }
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Live values with their current handles, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| match &entry.slot {
                Slot::Occupied(value) => Some((
                    Handle {
                        slot: slot as u32,
                        generation: entry.generation,
                    },
                    value,
                )),
                Slot::Free { .. } => None,
            })
    }
}
