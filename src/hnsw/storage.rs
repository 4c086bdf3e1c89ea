//! Append-only vector storage.
//!
//! Vectors live in one flat `Vec<f32>` (structure of arrays): slot `i` occupies
//! `data[i * dimension..(i + 1) * dimension]`. Slots are never freed or moved,
//! so a slot id stays valid for the lifetime of the storage.

use crate::error::{Result, VecSimError};

/// Flat, growable storage for fixed-dimension `f32` vectors.
#[derive(Debug, Clone)]
pub struct VectorStorage {
    dimension: usize,
    data: Vec<f32>,
    len: usize,
    capacity: usize,
}

impl VectorStorage {
    /// Create storage for `dimension`-length vectors with room for
    /// `initial_capacity` slots.
    pub fn new(dimension: usize, initial_capacity: usize) -> Result<Self> {
        let mut storage = Self {
            dimension,
            data: Vec::new(),
            len: 0,
            capacity: 0,
        };
        storage.reserve(initial_capacity)?;
        Ok(storage)
    }

    /// Grow to hold at least `capacity` vectors. Never shrinks.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        if capacity <= self.capacity {
            return Ok(());
        }
        if capacity > u32::MAX as usize {
            return Err(VecSimError::OutOfCapacity {
                requested: capacity,
            });
        }
        let additional = capacity
            .checked_mul(self.dimension)
            .and_then(|total| total.checked_sub(self.data.len()))
            .ok_or(VecSimError::OutOfCapacity {
                requested: capacity,
            })?;
        self.data
            .try_reserve_exact(additional)
            .map_err(|_| VecSimError::OutOfCapacity {
                requested: capacity,
            })?;
        tracing::debug!(
            from = self.capacity,
            to = capacity,
            dimension = self.dimension,
            "vector storage grown"
        );
        self.capacity = capacity;
        Ok(())
    }

    /// Copy `vector` into a fresh slot, growing geometrically when full.
    pub fn append(&mut self, vector: &[f32]) -> Result<u32> {
        if vector.len() != self.dimension {
            return Err(VecSimError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        if self.len == self.capacity {
            let next = self.capacity.saturating_mul(2).max(self.len + 1);
            self.reserve(next.min(u32::MAX as usize).max(self.len + 1))?;
        }
        let slot = u32::try_from(self.len).map_err(|_| VecSimError::OutOfCapacity {
            requested: self.len + 1,
        })?;
        self.data.extend_from_slice(vector);
        self.len += 1;
        Ok(slot)
    }

    /// Bounds-checked read of a slot.
    #[inline]
    pub fn get(&self, slot: u32) -> Option<&[f32]> {
        let idx = slot as usize;
        if idx >= self.len {
            return None;
        }
        let start = idx * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }

    /// Read a slot that is known to exist. Panics on an out-of-range slot.
    #[inline]
    pub(crate) fn vector(&self, slot: u32) -> &[f32] {
        let start = slot as usize * self.dimension;
        &self.data[start..start + self.dimension]
    }

    /// Number of allocated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Slots that fit without growing.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.data.capacity() * std::mem::size_of::<f32>()
    }
}
