//! Unified trait for all index implementations.

use crate::ann::params::Algorithm;
use crate::distance::DistanceMetric;
use crate::error::Result;
use crate::hnsw::TombstoneStats;

/// Operations every index exposes to its host.
pub trait VectorIndex {
    /// Insert `vector` under external `id`.
    fn add(&mut self, vector: &[f32], id: u64) -> Result<()>;

    /// Remove the live vector for `id`. Returns false when there was none.
    fn delete(&mut self, id: u64) -> bool;

    /// Up to `k` `(id, score)` pairs, ascending by score.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>>;

    /// Number of live vectors.
    fn size(&self) -> usize;

    fn dimension(&self) -> usize;

    fn info(&self) -> IndexInfo;
}

/// Snapshot of an index's configuration and state.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexInfo {
    pub algorithm: Algorithm,
    pub metric: DistanceMetric,
    pub dimension: usize,
    /// Live vectors.
    pub size: usize,
    /// Slots ever allocated, including tombstoned ones.
    pub slot_count: usize,
    pub capacity: usize,
    pub m: Option<usize>,
    pub ef_construction: Option<usize>,
    pub ef_search: Option<usize>,
    pub max_level: Option<usize>,
    /// External id of the slot searches start from.
    pub entry_point: Option<u64>,
    pub tombstones: TombstoneStats,
    pub size_bytes: usize,
}

impl VectorIndex for crate::hnsw::HnswIndex {
    fn add(&mut self, vector: &[f32], id: u64) -> Result<()> {
        self.add(vector, id)
    }

    fn delete(&mut self, id: u64) -> bool {
        self.delete(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>> {
        self.search(query, k)
    }

    fn size(&self) -> usize {
        self.size()
    }

    fn dimension(&self) -> usize {
        self.dimension()
    }

    fn info(&self) -> IndexInfo {
        self.info()
    }
}

impl VectorIndex for crate::flat::FlatIndex {
    fn add(&mut self, vector: &[f32], id: u64) -> Result<()> {
        self.add(vector, id)
    }

    fn delete(&mut self, id: u64) -> bool {
        self.delete(id)
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>> {
        self.search(query, k)
    }

    fn size(&self) -> usize {
        self.size()
    }

    fn dimension(&self) -> usize {
        self.dimension()
    }

    fn info(&self) -> IndexInfo {
        self.info()
    }
}
