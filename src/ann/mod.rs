//! Index-agnostic surface: construction parameters, the common trait, and a
//! factory that picks the algorithm from the parameters.
//!
//! ```rust
//! use vecsim::ann::{new_index, IndexParams, VectorIndex};
//! use vecsim::DistanceMetric;
//!
//! let mut index = new_index(&IndexParams::hnsw(4, DistanceMetric::L2)).unwrap();
//! index.add(&[0.0; 4], 1).unwrap();
//! assert_eq!(index.size(), 1);
//! ```

pub mod factory;
pub mod params;
pub mod traits;

pub use factory::{new_index, AnyIndex};
pub use params::{Algorithm, ElementType, IndexParams};
pub use traits::{IndexInfo, VectorIndex};
