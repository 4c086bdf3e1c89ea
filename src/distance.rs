//! Distance metrics for dense vectors.
//!
//! The graph code only ever sees a distance as an `f32` with a total order
//! (`f32::total_cmp`), so metrics can be swapped without touching it.
//!
//! ## Important nuance
//!
//! [`DistanceMetric::L2`] is the **squared** Euclidean distance. Scores are
//! reported exactly as computed, so two vectors `{i; d}` and `{j; d}` score
//! `d * (i - j)^2`.
//!
//! [`DistanceMetric::Cosine`] expects stored and query vectors to be unit
//! length. [`DistanceMetric::preprocess`] takes care of that; the index calls it
//! on every vector before storing it and on every query before searching.

use std::borrow::Cow;

use crate::simd;

/// Distance metric for dense vectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceMetric {
    /// Squared Euclidean distance.
    #[default]
    L2,
    /// Inner product distance $1 - \langle a,b\rangle$.
    InnerProduct,
    /// Cosine distance $1 - \cos(a,b)$, computed as inner product distance over
    /// normalized vectors.
    Cosine,
}

impl DistanceMetric {
    /// Compute the distance between two vectors of equal length.
    #[inline]
    #[must_use]
    pub fn distance(self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => simd::l2_distance_squared(a, b),
            DistanceMetric::InnerProduct | DistanceMetric::Cosine => 1.0 - simd::dot(a, b),
        }
    }

    /// Bring a vector into the form this metric expects to store and compare.
    ///
    /// Borrowed unless the metric needs to rewrite it.
    #[must_use]
    pub fn preprocess<'a>(self, v: &'a [f32]) -> Cow<'a, [f32]> {
        match self {
            DistanceMetric::Cosine => {
                let mut owned = v.to_vec();
                simd::normalize_in_place(&mut owned);
                Cow::Owned(owned)
            }
            DistanceMetric::L2 | DistanceMetric::InnerProduct => Cow::Borrowed(v),
        }
    }

    /// Short name used in index info and logs.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::L2 => "L2",
            DistanceMetric::InnerProduct => "IP",
            DistanceMetric::Cosine => "COSINE",
        }
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
