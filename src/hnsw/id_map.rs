//! Mapping between external ids and internal slots.
//!
//! Forward direction: external id -> the one slot currently active for it.
//! Reverse direction: slot -> the external id it was created for. The reverse
//! entry outlives the binding, so a tombstoned slot still knows its id; a slot
//! is active only when the forward entry for that id points back at it.

use std::collections::HashMap;

use crate::error::{Result, VecSimError};

/// Bidirectional id/slot relation. Owns no vector memory.
#[derive(Debug, Clone, Default)]
pub struct IdMap {
    active: HashMap<u64, u32>,
    labels: Vec<Option<u64>>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            active: HashMap::with_capacity(capacity),
            labels: Vec::with_capacity(capacity),
        }
    }

    /// Bind `id` to `slot`.
    ///
    /// Fails with [`VecSimError::DuplicateActiveId`] if `id` is already bound;
    /// overwrite-in-place is not supported.
    pub fn bind(&mut self, id: u64, slot: u32) -> Result<()> {
        if self.active.contains_key(&id) {
            return Err(VecSimError::DuplicateActiveId(id));
        }
        let idx = slot as usize;
        if idx >= self.labels.len() {
            self.labels.resize(idx + 1, None);
        }
        self.labels[idx] = Some(id);
        self.active.insert(id, slot);
        Ok(())
    }

    /// Remove the active binding for `id`, returning the slot it pointed to.
    /// No-op when `id` is unbound.
    pub fn unbind(&mut self, id: u64) -> Option<u32> {
        self.active.remove(&id)
    }

    #[inline]
    pub fn lookup(&self, id: u64) -> Option<u32> {
        self.active.get(&id).copied()
    }

    /// External id a slot was created for, whether or not it is still active.
    #[inline]
    pub fn label_of(&self, slot: u32) -> Option<u64> {
        self.labels.get(slot as usize).copied().flatten()
    }

    /// Whether `slot` is the active slot for its id.
    pub fn is_active(&self, slot: u32) -> bool {
        self.label_of(slot)
            .and_then(|id| self.lookup(id))
            .is_some_and(|bound| bound == slot)
    }

    /// Number of ids with an active binding.
    #[inline]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Iterate over `(id, slot)` for every active binding, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u32)> + '_ {
        self.active.iter().map(|(&id, &slot)| (id, slot))
    }

    pub fn size_bytes(&self) -> usize {
        self.active.capacity() * (std::mem::size_of::<u64>() + std::mem::size_of::<u32>())
            + self.labels.capacity() * std::mem::size_of::<Option<u64>>()
    }
}
