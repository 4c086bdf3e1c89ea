//! The HNSW index aggregate: storage, id map, graph, and tombstones behind one
//! owned value.

use rand::RngCore;

use crate::ann::params::{Algorithm, IndexParams};
use crate::ann::traits::IndexInfo;
use crate::distance::DistanceMetric;
use crate::error::{Result, VecSimError};
use crate::hnsw::construction::insert_node;
use crate::hnsw::id_map::IdMap;
use crate::hnsw::layers::{ConnectivityReport, GraphLayers, GraphViolation};
use crate::hnsw::level::LevelGenerator;
use crate::hnsw::search::{greedy_closest, search_layer, Candidate, SearchContext};
use crate::hnsw::storage::VectorStorage;
use crate::hnsw::tombstones::TombstoneSet;

/// Neighbor selection strategy used when wiring and re-pruning edges.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NeighborhoodDiversification {
    /// Keep the closest candidates.
    Simple,
    /// RND: keep a candidate unless an already kept neighbor is closer to it
    /// than the base node is (the HNSW paper's heuristic).
    #[default]
    RelativeNeighborhood,
    /// RRND: like RND with the neighbor-to-candidate distance scaled by
    /// `alpha >= 1`, which keeps more edges.
    RelaxedRelative { alpha: f32 },
}

/// HNSW construction and search parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HnswParams {
    /// Slots reserved up front; storage grows past this on demand.
    pub initial_capacity: usize,
    /// Max neighbors per slot on upper layers; the base layer allows `2 * m`.
    pub m: usize,
    /// Beam width while inserting.
    pub ef_construction: usize,
    /// Default beam width while searching (raised to `k` when smaller).
    pub ef_search: usize,
    /// Seed for layer assignment; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Heuristic that picks which candidates become neighbors.
    pub neighborhood_diversification: NeighborhoodDiversification,
    /// Fill neighbor lists with pruned candidates up to the cap.
    pub keep_pruned_connections: bool,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            initial_capacity: 1024,
            m: 16,
            ef_construction: 200,
            ef_search: 10,
            seed: None,
            neighborhood_diversification: NeighborhoodDiversification::default(),
            keep_pruned_connections: true,
        }
    }
}

impl HnswParams {
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(VecSimError::InvalidParameter(format!(
                "M must be at least 2, got {}",
                self.m
            )));
        }
        if self.ef_construction == 0 {
            return Err(VecSimError::InvalidParameter(
                "efConstruction must be positive".to_string(),
            ));
        }
        if self.ef_search == 0 {
            return Err(VecSimError::InvalidParameter(
                "efSearch must be positive".to_string(),
            ));
        }
        if let NeighborhoodDiversification::RelaxedRelative { alpha } =
            self.neighborhood_diversification
        {
            if !(alpha >= 1.0) {
                return Err(VecSimError::InvalidParameter(format!(
                    "RRND alpha must be >= 1.0, got {alpha}"
                )));
            }
        }
        Ok(())
    }
}

/// Hierarchical Navigable Small World index over `f32` vectors keyed by
/// external `u64` ids.
///
/// Deletion tombstones a slot; its storage and edges stay so that live slots
/// remain reachable. Re-adding a deleted id always allocates a new slot.
#[derive(Debug)]
pub struct HnswIndex {
    pub(crate) params: HnswParams,
    dimension: usize,
    metric: DistanceMetric,
    storage: VectorStorage,
    ids: IdMap,
    graph: GraphLayers,
    tombstones: TombstoneSet,
    levels: LevelGenerator,
    compaction_warned: bool,
}

impl HnswIndex {
    /// Create an index, seeding layer assignment from `params.hnsw.seed`.
    pub fn new(params: IndexParams) -> Result<Self> {
        let levels = LevelGenerator::seeded(params.hnsw.m, params.hnsw.seed);
        Self::build(params, levels)
    }

    /// Create an index whose layer assignment draws from `rng`.
    pub fn with_rng(params: IndexParams, rng: impl RngCore + Send + 'static) -> Result<Self> {
        let levels = LevelGenerator::new(params.hnsw.m, Box::new(rng));
        Self::build(params, levels)
    }

    fn build(params: IndexParams, levels: LevelGenerator) -> Result<Self> {
        params.validate()?;
        if params.algorithm != Algorithm::Hnsw {
            return Err(VecSimError::InvalidParameter(format!(
                "HnswIndex cannot be built for algorithm {:?}",
                params.algorithm
            )));
        }
        let IndexParams {
            metric,
            dimension,
            hnsw,
            ..
        } = params;
        let storage = VectorStorage::new(dimension, hnsw.initial_capacity)?;
        tracing::debug!(
            dimension,
            %metric,
            m = hnsw.m,
            ef_construction = hnsw.ef_construction,
            capacity = hnsw.initial_capacity,
            "created HNSW index"
        );
        Ok(Self {
            dimension,
            metric,
            storage,
            ids: IdMap::with_capacity(hnsw.initial_capacity),
            graph: GraphLayers::new(hnsw.m, hnsw.initial_capacity),
            tombstones: TombstoneSet::default(),
            levels,
            compaction_warned: false,
            params: hnsw,
        })
    }

    /// Insert `vector` under external `id`.
    ///
    /// Fails with [`VecSimError::DimensionMismatch`] on a wrong-length vector
    /// and [`VecSimError::DuplicateActiveId`] if `id` is already live.
    pub fn add(&mut self, vector: &[f32], id: u64) -> Result<()> {
        self.check_dimension(vector)?;
        if self.ids.lookup(id).is_some() {
            return Err(VecSimError::DuplicateActiveId(id));
        }

        let vector = self.metric.preprocess(vector);
        let slot = self.storage.append(&vector)?;
        self.ids.bind(id, slot)?;
        self.graph.reserve(self.storage.capacity());

        let level = self.levels.sample();
        insert_node(
            &mut self.graph,
            &self.storage,
            &self.tombstones,
            self.metric,
            &self.params,
            slot,
            level,
        );
        Ok(())
    }

    /// Tombstone the slot bound to `id` and release the id.
    ///
    /// Returns false (and changes nothing) when `id` has no live vector.
    pub fn delete(&mut self, id: u64) -> bool {
        let Some(slot) = self.ids.unbind(id) else {
            tracing::trace!(id, "delete of unbound id ignored");
            return false;
        };
        self.tombstones.delete(slot);

        let total = self.storage.len();
        if self.tombstones.should_compact(total) {
            if !self.compaction_warned {
                self.compaction_warned = true;
                let stats = self.tombstones.stats(total);
                tracing::warn!(
                    tombstones = stats.count,
                    slots = stats.total_slots,
                    ratio = stats.ratio,
                    "tombstone ratio above compaction threshold"
                );
            }
        } else {
            self.compaction_warned = false;
        }
        true
    }

    /// Top-`k` live vectors nearest to `query` using the configured `ef_search`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(u64, f64)>> {
        self.search_with_ef(query, k, self.params.ef_search)
    }

    /// Top-`k` search with an explicit beam width (raised to `k` if smaller).
    ///
    /// Results are `(id, score)` sorted by ascending score; at most
    /// `min(k, size())` entries.
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<(u64, f64)>> {
        self.check_dimension(query)?;
        let Some(entry) = self.graph.entry_point() else {
            return Ok(Vec::new());
        };
        if k == 0 || self.ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.metric.preprocess(query);
        let ctx = SearchContext {
            storage: &self.storage,
            graph: &self.graph,
            metric: self.metric,
            tombstones: &self.tombstones,
        };

        let mut current = Candidate {
            slot: entry.slot,
            distance: ctx.distance(&query, entry.slot),
        };
        for layer in (1..=entry.level).rev() {
            current = greedy_closest(ctx, &query, current, layer);
        }

        let mut found = search_layer(ctx, &query, &[current], 0, ef.max(k), |slot| {
            !ctx.is_deleted(slot)
        });
        // Equal scores come back in insertion order.
        found.sort_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then_with(|| a.slot.cmp(&b.slot))
        });

        Ok(found
            .into_iter()
            .take(k)
            .filter_map(|c| {
                self.ids
                    .label_of(c.slot)
                    .map(|id| (id, f64::from(c.distance)))
            })
            .collect())
    }

    /// Number of live vectors.
    #[inline]
    pub fn size(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether `id` currently has a live vector.
    pub fn contains(&self, id: u64) -> bool {
        self.ids.lookup(id).is_some()
    }

    /// Stored form of the live vector for `id` (normalized under cosine).
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        self.ids.lookup(id).and_then(|slot| self.storage.get(slot))
    }

    /// Slots ever allocated, live and tombstoned.
    pub fn slot_count(&self) -> usize {
        self.storage.len()
    }

    pub fn capacity(&self) -> usize {
        self.storage.capacity()
    }

    /// Grow storage to hold at least `capacity` slots.
    pub fn reserve(&mut self, capacity: usize) -> Result<()> {
        self.storage.reserve(capacity)?;
        self.graph.reserve(capacity);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn params(&self) -> &HnswParams {
        &self.params
    }

    pub fn set_ef_search(&mut self, ef: usize) -> Result<()> {
        if ef == 0 {
            return Err(VecSimError::InvalidParameter(
                "efSearch must be positive".to_string(),
            ));
        }
        self.params.ef_search = ef;
        Ok(())
    }

    /// Read-only view of the layered graph.
    pub fn graph(&self) -> &GraphLayers {
        &self.graph
    }

    /// Check degree caps, layer nesting, and edge targets.
    pub fn validate(&self) -> std::result::Result<(), GraphViolation> {
        self.graph.validate()
    }

    /// Count live slots reachable on the base layer from the entry point.
    pub fn check_connectivity(&self) -> ConnectivityReport {
        let tombstones = &self.tombstones;
        self.graph
            .connectivity(|slot| tombstones.is_deleted(slot))
    }

    pub fn info(&self) -> IndexInfo {
        let entry = self.graph.entry_point();
        IndexInfo {
            algorithm: Algorithm::Hnsw,
            metric: self.metric,
            dimension: self.dimension,
            size: self.size(),
            slot_count: self.storage.len(),
            capacity: self.storage.capacity(),
            m: Some(self.params.m),
            ef_construction: Some(self.params.ef_construction),
            ef_search: Some(self.params.ef_search),
            max_level: entry.map(|e| e.level),
            entry_point: entry.and_then(|e| self.ids.label_of(e.slot)),
            tombstones: self.tombstones.stats(self.storage.len()),
            size_bytes: self.size_bytes(),
        }
    }

    /// Approximate heap footprint in bytes.
    pub fn size_bytes(&self) -> usize {
        self.storage.size_bytes()
            + self.ids.size_bytes()
            + self.graph.size_bytes()
            + self.tombstones.size_bytes()
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
