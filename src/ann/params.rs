//! Index construction parameters.
//!
//! Mirrors the record a host passes when it creates an index: algorithm
//! family, metric, element type, dimensionality, and the HNSW knobs.

use crate::distance::DistanceMetric;
use crate::error::{Result, VecSimError};
use crate::hnsw::HnswParams;

/// Index algorithm family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Graph-based approximate search.
    #[default]
    Hnsw,
    /// Exact linear scan.
    BruteForce,
}

/// Vector element type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ElementType {
    #[default]
    Float32,
}

/// Everything needed to construct an index.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexParams {
    #[cfg_attr(feature = "serde", serde(default))]
    pub algorithm: Algorithm,
    #[cfg_attr(feature = "serde", serde(default))]
    pub metric: DistanceMetric,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element_type: ElementType,
    pub dimension: usize,
    /// Ignored by [`Algorithm::BruteForce`] except for `initial_capacity`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub hnsw: HnswParams,
}

impl IndexParams {
    /// HNSW index with default graph parameters.
    pub fn hnsw(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            algorithm: Algorithm::Hnsw,
            metric,
            element_type: ElementType::Float32,
            dimension,
            hnsw: HnswParams::default(),
        }
    }

    /// Brute-force index.
    pub fn flat(dimension: usize, metric: DistanceMetric) -> Self {
        Self {
            algorithm: Algorithm::BruteForce,
            ..Self::hnsw(dimension, metric)
        }
    }

    pub fn with_hnsw(mut self, hnsw: HnswParams) -> Self {
        self.hnsw = hnsw;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(VecSimError::InvalidParameter(
                "dimension must be positive".to_string(),
            ));
        }
        if self.algorithm == Algorithm::Hnsw {
            self.hnsw.validate()?;
        }
        Ok(())
    }
}
