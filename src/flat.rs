//! Exact brute-force index.
//!
//! Scans every live vector per query. Useful as ground truth for measuring
//! HNSW recall, and as the index of choice for small collections where a
//! linear scan beats graph traversal.

use std::collections::{BinaryHeap, HashMap};

use crate::ann::params::{Algorithm, IndexParams};
use crate::ann::traits::IndexInfo;
use crate::distance::DistanceMetric;
use crate::error::{Result, VecSimError};
use crate::hnsw::TombstoneStats;

/// Brute-force index. Deletion compacts in place by moving the last vector
/// into the freed position.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    metric: DistanceMetric,
    vectors: Vec<f32>,
    labels: Vec<u64>,
    positions: HashMap<u64, usize>,
}

impl FlatIndex {
    pub fn new(params: IndexParams) -> Result<Self> {
        params.validate()?;
        if params.algorithm != Algorithm::BruteForce {
            return Err(VecSimError::InvalidParameter(format!(
                "FlatIndex cannot be built for algorithm {:?}",
                params.algorithm
            )));
        }
        let capacity = params.hnsw.initial_capacity;
        let mut vectors = Vec::new();
        vectors
            .try_reserve_exact(capacity.saturating_mul(params.dimension))
            .map_err(|_| VecSimError::OutOfCapacity {
                requested: capacity,
            })?;
        tracing::debug!(
            dimension = params.dimension,
            metric = %params.metric,
            capacity,
            "created brute-force index"
        );
        Ok(Self {
            dimension: params.dimension,
            metric: params.metric,
            vectors,
            labels: Vec::with_capacity(capacity),
            positions: HashMap::with_capacity(capacity),
        })
    }

    pub fn add(&mut self, vector: &[f32], id: u64) -> Result<()> {
        self.check_dimension(vector)?;
        if self.positions.contains_key(&id) {
            return Err(VecSimError::DuplicateActiveId(id));
        }
        let vector = self.metric.preprocess(vector);
        self.vectors
            .try_reserve(self.dimension)
            .map_err(|_| VecSimError::OutOfCapacity {
                requested: self.labels.len() + 1,
            })?;
        self.vectors.extend_from_slice(&vector);
        self.positions.insert(id, self.labels.len());
        self.labels.push(id);
        Ok(())
    }

    pub fn delete(&mut self, id: u64) -> bool {
        let Some(pos) = self.positions.remove(&id) else {
            return false;
        };
        let last = self.labels.len() - 1;
        if pos != last {
            let moved = self.labels[last];
            self.labels[pos] = moved;
            self.positions.insert(moved, pos);
            let (head, tail) = self.vectors.split_at_mut(last * self.dimension);
            head[pos * self.dimension..(pos + 1) * self.dimension].copy_from_slice(tail);
        }
        self.labels.pop();
        self.vectors.truncate(last * self.dimension);
        true
    }

    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>> {
        self.check_dimension(query)?;
        if k == 0 || self.labels.is_empty() {
            return Ok(Vec::new());
        }
        let query = self.metric.preprocess(query);

        // Max-heap on (distance, id) holding the best k so far.
        let mut best: BinaryHeap<(OrderedDistance, u64)> =
            BinaryHeap::with_capacity(k.min(self.labels.len()) + 1);
        for (pos, vector) in self.vectors.chunks_exact(self.dimension).enumerate() {
            let entry = (
                OrderedDistance(self.metric.distance(&query, vector)),
                self.labels[pos],
            );
            if best.len() < k {
                best.push(entry);
            } else if best.peek().is_some_and(|worst| entry < *worst) {
                best.pop();
                best.push(entry);
            }
        }

        Ok(best
            .into_sorted_vec()
            .into_iter()
            .map(|(d, id)| (id, f64::from(d.0)))
            .collect())
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.labels.len()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn contains(&self, id: u64) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn info(&self) -> IndexInfo {
        IndexInfo {
            algorithm: Algorithm::BruteForce,
            metric: self.metric,
            dimension: self.dimension,
            size: self.size(),
            slot_count: self.size(),
            capacity: self.vectors.capacity() / self.dimension,
            m: None,
            ef_construction: None,
            ef_search: None,
            max_level: None,
            entry_point: None,
            tombstones: TombstoneStats {
                count: 0,
                total_slots: self.size(),
                ratio: 0.0,
                needs_compaction: false,
            },
            size_bytes: self.vectors.capacity() * std::mem::size_of::<f32>()
                + self.labels.capacity() * std::mem::size_of::<u64>(),
        }
    }

    fn check_dimension(&self, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(VecSimError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

/// `f32` with a total order for heap use.
#[derive(Debug, Clone, Copy, PartialEq)]
struct OrderedDistance(f32);

impl Eq for OrderedDistance {}

impl PartialOrd for OrderedDistance {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedDistance {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}
