//! Dense vector kernels.
//!
//! When the `innr` feature is enabled (default), uses the `innr` crate for
//! SIMD-accelerated `dot`, `l2_distance_squared` and `norm`. Otherwise falls
//! back to portable loops that accumulate into `LANES` independent partial
//! sums over `chunks_exact` so the compiler can auto-vectorize them.
//!
//! ```rust
//! use vecsim::simd::{dot, l2_distance_squared, norm};
//!
//! let a = [1.0_f32, 2.0, 3.0, 4.0];
//! let b = [1.0_f32, 2.0, 3.0, 6.0];
//!
//! assert_eq!(l2_distance_squared(&a, &b), 4.0);
//! assert_eq!(dot(&a, &a), 30.0);
//! assert!((norm(&[3.0, 4.0]) - 5.0).abs() < 1e-6);
//! ```

#[cfg(feature = "innr")]
pub use innr::{dot, l2_distance_squared, norm};

#[cfg(not(feature = "innr"))]
mod fallback {
    //! Portable fallback implementations when innr is not available.

    const LANES: usize = 8;

    /// Dot product of two equal-length vectors.
    #[inline]
    #[must_use]
    pub fn dot(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let mut acc = [0.0_f32; LANES];
        let a_chunks = a.chunks_exact(LANES);
        let b_chunks = b.chunks_exact(LANES);
        let tail: f32 = a_chunks
            .remainder()
            .iter()
            .zip(b_chunks.remainder())
            .map(|(x, y)| x * y)
            .sum();
        for (ca, cb) in a_chunks.zip(b_chunks) {
            for i in 0..LANES {
                acc[i] += ca[i] * cb[i];
            }
        }
        acc.iter().sum::<f32>() + tail
    }

    /// Squared Euclidean distance. No square root is taken.
    #[inline]
    #[must_use]
    pub fn l2_distance_squared(a: &[f32], b: &[f32]) -> f32 {
        debug_assert_eq!(a.len(), b.len());
        let mut acc = [0.0_f32; LANES];
        let a_chunks = a.chunks_exact(LANES);
        let b_chunks = b.chunks_exact(LANES);
        let tail: f32 = a_chunks
            .remainder()
            .iter()
            .zip(b_chunks.remainder())
            .map(|(x, y)| (x - y) * (x - y))
            .sum();
        for (ca, cb) in a_chunks.zip(b_chunks) {
            for i in 0..LANES {
                let d = ca[i] - cb[i];
                acc[i] += d * d;
            }
        }
        acc.iter().sum::<f32>() + tail
    }

    /// L2 norm of a vector.
    #[inline]
    #[must_use]
    pub fn norm(v: &[f32]) -> f32 {
        dot(v, v).sqrt()
    }
}

#[cfg(not(feature = "innr"))]
pub use fallback::*;

const NORM_EPSILON: f32 = 1e-9;

/// Scale `v` to unit L2 norm in place. Near-zero vectors are left untouched.
#[inline]
pub fn normalize_in_place(v: &mut [f32]) {
    let n = norm(v);
    if n > NORM_EPSILON {
        for x in v.iter_mut() {
            *x /= n;
        }
    }
}
