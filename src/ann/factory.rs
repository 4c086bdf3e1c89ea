//! Build an index from an [`IndexParams`] record.

use crate::ann::params::{Algorithm, IndexParams};
use crate::ann::traits::{IndexInfo, VectorIndex};
use crate::error::Result;
use crate::flat::FlatIndex;
use crate::hnsw::HnswIndex;

/// An index of whichever algorithm the parameters asked for.
#[derive(Debug)]
pub enum AnyIndex {
    Hnsw(HnswIndex),
    BruteForce(FlatIndex),
}

/// Create an empty index as described by `params`.
///
/// ```rust
/// use vecsim::{new_index, DistanceMetric, IndexParams, VectorIndex};
///
/// let mut index = new_index(&IndexParams::flat(2, DistanceMetric::L2)).unwrap();
/// index.add(&[1.0, 0.0], 7).unwrap();
/// assert_eq!(index.search(&[1.0, 0.0], 1).unwrap(), vec![(7, 0.0)]);
/// ```
pub fn new_index(params: &IndexParams) -> Result<AnyIndex> {
    Ok(match params.algorithm {
        Algorithm::Hnsw => AnyIndex::Hnsw(HnswIndex::new(params.clone())?),
        Algorithm::BruteForce => AnyIndex::BruteForce(FlatIndex::new(params.clone())?),
    })
}

impl AnyIndex {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::Hnsw(_) => Algorithm::Hnsw,
            Self::BruteForce(_) => Algorithm::BruteForce,
        }
    }

    pub fn as_hnsw(&self) -> Option<&HnswIndex> {
        match self {
            Self::Hnsw(index) => Some(index),
            Self::BruteForce(_) => None,
        }
    }

    pub fn as_hnsw_mut(&mut self) -> Option<&mut HnswIndex> {
        match self {
            Self::Hnsw(index) => Some(index),
            Self::BruteForce(_) => None,
        }
    }
}

impl VectorIndex for AnyIndex {
    fn add(&mut self, vector: &[f32], id: u64) -> Result<()> {
        match self {
            Self::Hnsw(index) => index.add(vector, id),
            Self::BruteForce(index) => index.add(vector, id),
        }
    }

    fn delete(&mut self, id: u64) -> bool {
        match self {
            Self::Hnsw(index) => index.delete(id),
            Self::BruteForce(index) => index.delete(id),
        }
    }

    fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>> {
        match self {
            Self::Hnsw(index) => index.search(query, k),
            Self::BruteForce(index) => index.search(query, k),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Hnsw(index) => index.size(),
            Self::BruteForce(index) => index.size(),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Self::Hnsw(index) => index.dimension(),
            Self::BruteForce(index) => index.dimension(),
        }
    }

    fn info(&self) -> IndexInfo {
        match self {
            Self::Hnsw(index) => index.info(),
            Self::BruteForce(index) => index.info(),
        }
    }
}
