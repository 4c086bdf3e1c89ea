//! Hierarchical Navigable Small World (HNSW) approximate nearest neighbor search.
//!
//! # Algorithm
//!
//! HNSW builds a multi-layer proximity graph where:
//! - **Upper layers**: Sparse, long-range connections for fast navigation
//! - **Base layer**: Every slot, dense local connections for precise search
//! - **Search**: Greedy 1-NN descent through the upper layers, then a beam
//!   search of width `ef` on the base layer
//!
//! Insertion is online: each `add` samples a level, descends to it, and wires
//! the new slot into every layer from that level down to 0. There is no
//! separate build step.
//!
//! # Deletion
//!
//! `delete` tombstones a slot. The slot keeps its vector and edges, so search
//! still walks through it; it is only kept out of results. Storage is
//! append-only: a re-added id gets a fresh slot.
//!
//! # Usage
//!
//! ```rust
//! use vecsim::{DistanceMetric, HnswIndex, IndexParams};
//!
//! # fn main() -> Result<(), vecsim::VecSimError> {
//! let mut index = HnswIndex::new(IndexParams::hnsw(4, DistanceMetric::L2))?;
//!
//! for i in 0..100u64 {
//!     index.add(&[i as f32; 4], i)?;
//! }
//!
//! let results = index.search(&[50.0; 4], 3)?;
//! assert_eq!(results[0], (50, 0.0));
//! assert_eq!(results[1].1, 4.0);
//!
//! index.delete(50);
//! assert_eq!(index.size(), 99);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Malkov & Yashunin (2018): "Efficient and robust approximate nearest neighbor search
//!   using Hierarchical Navigable Small World graphs"

pub(crate) mod construction;
pub mod graph;
pub mod id_map;
pub mod layers;
pub mod level;
pub(crate) mod search;
pub mod storage;
pub mod tombstones;

pub use graph::{HnswIndex, HnswParams, NeighborhoodDiversification};
pub use id_map::IdMap;
pub use layers::{ConnectivityReport, EntryPoint, GraphLayers, GraphViolation};
pub use level::LevelGenerator;
pub use storage::VectorStorage;
pub use tombstones::{TombstoneSet, TombstoneStats};
