//! HNSW layer search.
//!
//! Two primitives shared by insertion and querying:
//! - [`greedy_closest`]: 1-NN hill climb used to descend through upper layers
//! - [`search_layer`]: bounded beam search (Malkov & Yashunin, Algorithm 2)

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

use crate::distance::DistanceMetric;
use crate::hnsw::layers::GraphLayers;
use crate::hnsw::storage::VectorStorage;
use crate::hnsw::tombstones::TombstoneSet;

/// Candidate node during search, ordered by distance, then newer slot first.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Candidate {
    pub(crate) slot: u32,
    pub(crate) distance: f32,
}

impl Eq for Candidate {}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // total_cmp keeps NaN from breaking the heap
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| other.slot.cmp(&self.slot))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Read-only view over the parts of an index a search needs.
#[derive(Clone, Copy)]
pub(crate) struct SearchContext<'a> {
    pub(crate) storage: &'a VectorStorage,
    pub(crate) graph: &'a GraphLayers,
    pub(crate) metric: DistanceMetric,
    pub(crate) tombstones: &'a TombstoneSet,
}

impl<'a> SearchContext<'a> {
    #[inline]
    pub(crate) fn distance(&self, query: &[f32], slot: u32) -> f32 {
        self.metric.distance(query, self.storage.vector(slot))
    }

    #[inline]
    pub(crate) fn distance_between(&self, a: u32, b: u32) -> f32 {
        self.metric
            .distance(self.storage.vector(a), self.storage.vector(b))
    }

    #[inline]
    pub(crate) fn is_deleted(&self, slot: u32) -> bool {
        self.tombstones.is_deleted(slot)
    }

    /// True when both slots store the same vector.
    #[inline]
    pub(crate) fn same_vector(&self, a: u32, b: u32) -> bool {
        self.storage.vector(a) == self.storage.vector(b)
    }
}

/// Walk `layer` greedily from `entry`, moving to any strictly closer neighbor
/// until none is left.
pub(crate) fn greedy_closest(
    ctx: SearchContext<'_>,
    query: &[f32],
    entry: Candidate,
    layer: usize,
) -> Candidate {
    let mut best = entry;
    let mut changed = true;
    while changed {
        changed = false;
        for &neighbor in ctx.graph.neighbors(best.slot, layer) {
            let distance = ctx.distance(query, neighbor);
            if distance < best.distance {
                best = Candidate {
                    slot: neighbor,
                    distance,
                };
                changed = true;
            }
        }
    }
    best
}

/// Beam search of width `ef` on one layer.
///
/// Every reachable slot may be expanded, but only slots for which `admit`
/// returns true enter the result set and count toward the `ef` budget. Stops
/// once the closest unexpanded candidate is farther than the worst of `ef`
/// admitted results, or when the reachable part of the layer is exhausted.
/// Among equidistant slots the newer ones win a place in the beam.
///
/// Returns admitted slots in [`Candidate`] order.
pub(crate) fn search_layer(
    ctx: SearchContext<'_>,
    query: &[f32],
    entry_points: &[Candidate],
    layer: usize,
    ef: usize,
    admit: impl Fn(u32) -> bool,
) -> Vec<Candidate> {
    let ef = ef.max(1);
    // No layer holds more than `graph.len()` slots, whatever `ef` asks for.
    let bound = ef.min(ctx.graph.len()).max(1);
    // Min-heap of slots to expand; max-heap of the best `ef` admitted slots.
    let mut candidates: BinaryHeap<std::cmp::Reverse<Candidate>> =
        BinaryHeap::with_capacity(bound * 2);
    let mut results: BinaryHeap<Candidate> = BinaryHeap::with_capacity(bound + 1);
    let mut visited: HashSet<u32> = HashSet::with_capacity(bound * 4);

    for &ep in entry_points {
        if !visited.insert(ep.slot) {
            continue;
        }
        candidates.push(std::cmp::Reverse(ep));
        if admit(ep.slot) {
            results.push(ep);
            if results.len() > ef {
                results.pop();
            }
        }
    }

    while let Some(std::cmp::Reverse(current)) = candidates.pop() {
        let worst = results.peek().map_or(f32::INFINITY, |r| r.distance);
        if results.len() >= ef && current.distance > worst {
            break;
        }

        for &neighbor in ctx.graph.neighbors(current.slot, layer) {
            if !visited.insert(neighbor) {
                continue;
            }
            let found = Candidate {
                slot: neighbor,
                distance: ctx.distance(query, neighbor),
            };
            if results.len() < ef || results.peek().is_some_and(|worst| found < *worst) {
                candidates.push(std::cmp::Reverse(found));
                if admit(neighbor) {
                    results.push(found);
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }
    }

    results.into_sorted_vec()
}
