//! vecsim: in-memory vector similarity indexes.
//!
//! The main index is [`HnswIndex`], an online HNSW graph that supports
//! insertion, tombstone deletion, and top-k queries under L2, inner product,
//! or cosine distance. [`FlatIndex`] answers the same queries exactly by
//! linear scan.
//!
//! - `hnsw/`: graph layers, level sampling, insertion, layered search,
//!   tombstones, id mapping
//! - `flat`: brute-force index
//! - `ann/`: [`IndexParams`], the [`VectorIndex`] trait, [`new_index`]
//! - `distance`, `simd`: metrics and their kernels
//!
//! # Scores
//!
//! Results are `(id, score)` pairs sorted ascending by score, lower meaning
//! closer. L2 scores are squared distances. Inner product scores are
//! `1 - <q, v>`; cosine scores are the same over normalized vectors.
//!
//! # Deletion
//!
//! Deleting an id hides its slot from results but keeps it in the graph as a
//! routing node. Re-adding the id allocates a new slot, so `slot_count()`
//! grows while `size()` counts only live vectors.

pub mod ann;
pub mod distance;
pub mod error;
pub mod flat;
pub mod hnsw;
pub mod simd;

pub use ann::{new_index, Algorithm, AnyIndex, ElementType, IndexInfo, IndexParams, VectorIndex};
pub use distance::DistanceMetric;
pub use error::{Result, VecSimError};
pub use flat::FlatIndex;
pub use hnsw::{HnswIndex, HnswParams, NeighborhoodDiversification};
