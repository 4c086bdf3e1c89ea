//! HNSW insertion: layer descent, candidate collection, neighbor selection,
//! and bidirectional wiring with re-pruning.

use std::cmp::Ordering;

use crate::distance::DistanceMetric;
use crate::hnsw::graph::{HnswParams, NeighborhoodDiversification};
use crate::hnsw::layers::GraphLayers;
use crate::hnsw::search::{greedy_closest, search_layer, Candidate, SearchContext};
use crate::hnsw::storage::VectorStorage;
use crate::hnsw::tombstones::TombstoneSet;

/// Preference among candidates for `base`: closer first, then live before
/// tombstoned, then slots inserted nearer to `base`, newer first.
fn selection_order(ctx: SearchContext<'_>, base: u32, a: &Candidate, b: &Candidate) -> Ordering {
    a.distance
        .total_cmp(&b.distance)
        .then_with(|| ctx.is_deleted(a.slot).cmp(&ctx.is_deleted(b.slot)))
        .then_with(|| a.slot.abs_diff(base).cmp(&b.slot.abs_diff(base)))
        .then_with(|| b.slot.cmp(&a.slot))
}

/// Select up to `m` neighbors for `base` from `candidates`.
///
/// `pinned`, if any, is always kept. Diversifying strategies walk the rest in
/// [`selection_order`] and skip any candidate that an already selected
/// neighbor is strictly closer to than the base is. With `keep_pruned`,
/// skipped candidates fill the list up to `m`.
///
/// Exact copies of the base vector take at most half of the list. Copies past
/// that share fill the list only when nothing else is left.
pub(crate) fn select_neighbors(
    ctx: SearchContext<'_>,
    base: u32,
    candidates: &[Candidate],
    pinned: Option<Candidate>,
    m: usize,
    strategy: NeighborhoodDiversification,
    keep_pruned: bool,
) -> Vec<Candidate> {
    let pinned_slot = pinned.map(|p| p.slot);
    let mut ordered: Vec<Candidate> = candidates
        .iter()
        .copied()
        .filter(|c| Some(c.slot) != pinned_slot)
        .collect();
    ordered.sort_by(|a, b| selection_order(ctx, base, a, b));

    let mut selected: Vec<Candidate> = Vec::with_capacity(m);
    selected.extend(pinned);
    if selected.len() + ordered.len() <= m {
        selected.extend(ordered);
        selected.sort();
        return selected;
    }

    let alpha = match strategy {
        NeighborhoodDiversification::Simple => None,
        NeighborhoodDiversification::RelativeNeighborhood => Some(1.0),
        NeighborhoodDiversification::RelaxedRelative { alpha } => Some(alpha),
    };
    let copy_share = (m / 2).max(1);
    let mut copies = selected
        .iter()
        .filter(|c| ctx.same_vector(base, c.slot))
        .count();
    let mut pruned: Vec<Candidate> = Vec::new();
    let mut surplus: Vec<Candidate> = Vec::new();

    for candidate in ordered {
        if selected.len() >= m {
            break;
        }
        let copy = ctx.same_vector(base, candidate.slot);
        if copy && copies >= copy_share {
            surplus.push(candidate);
            continue;
        }
        let dominated = alpha.is_some_and(|alpha| {
            selected.iter().any(|chosen| {
                alpha * ctx.distance_between(chosen.slot, candidate.slot) < candidate.distance
            })
        });
        if dominated {
            pruned.push(candidate);
        } else {
            copies += usize::from(copy);
            selected.push(candidate);
        }
    }

    if keep_pruned {
        for candidate in pruned {
            if selected.len() >= m {
                break;
            }
            if ctx.same_vector(base, candidate.slot) {
                if copies >= copy_share {
                    surplus.push(candidate);
                    continue;
                }
                copies += 1;
            }
            selected.push(candidate);
        }
    }

    let missing = m.saturating_sub(selected.len());
    if missing > 0 {
        surplus.sort_by(|a, b| selection_order(ctx, base, a, b));
        selected.extend(surplus.into_iter().take(missing));
    }
    selected.sort();
    selected
}

/// Link `slot` into the graph on layers `0..=level`.
///
/// `slot` must already hold its vector in `storage`. The first slot becomes the
/// entry point; later slots descend greedily from the entry point to `level`,
/// then on each layer from `level` down to 0 collect `ef_construction`
/// candidates, keep a diversified subset, and wire edges both ways.
pub(crate) fn insert_node(
    graph: &mut GraphLayers,
    storage: &VectorStorage,
    tombstones: &TombstoneSet,
    metric: DistanceMetric,
    params: &HnswParams,
    slot: u32,
    level: usize,
) {
    let query = storage.vector(slot);
    graph.add_node(slot, level);

    let Some(entry) = graph.entry_point() else {
        graph.set_entry_point(slot, level);
        tracing::trace!(slot, level, "first slot is the entry point");
        return;
    };

    let descended = {
        let ctx = SearchContext {
            storage,
            graph: &*graph,
            metric,
            tombstones,
        };
        let mut current = Candidate {
            slot: entry.slot,
            distance: ctx.distance(query, entry.slot),
        };
        for layer in (level + 1..=entry.level).rev() {
            current = greedy_closest(ctx, query, current, layer);
        }
        current
    };

    let mut entry_points = vec![descended];
    for layer in (0..=level.min(entry.level)).rev() {
        let (candidates, selected) = {
            let ctx = SearchContext {
                storage,
                graph: &*graph,
                metric,
                tombstones,
            };
            let candidates = search_layer(
                ctx,
                query,
                &entry_points,
                layer,
                params.ef_construction,
                |s| s != slot,
            );
            let selected = select_neighbors(
                ctx,
                slot,
                &candidates,
                None,
                graph.max_degree(layer),
                params.neighborhood_diversification,
                params.keep_pruned_connections,
            );
            (candidates, selected)
        };

        graph.set_neighbors(slot, layer, selected.iter().map(|c| c.slot));
        for neighbor in &selected {
            connect(
                graph,
                storage,
                tombstones,
                metric,
                params,
                neighbor.slot,
                Candidate {
                    slot,
                    distance: neighbor.distance,
                },
                layer,
            );
        }

        if !candidates.is_empty() {
            entry_points = candidates;
        }
    }

    if level > entry.level {
        graph.set_entry_point(slot, level);
        tracing::trace!(slot, level, previous = entry.level, "new entry point");
    }
}

/// Add the reverse edge `from -> to.slot` on `layer`, re-pruning `from` when
/// its list is full. `to.distance` is the distance between the two slots.
/// A freshly inserted copy of `from` always keeps the edge.
#[allow(clippy::too_many_arguments)]
fn connect(
    graph: &mut GraphLayers,
    storage: &VectorStorage,
    tombstones: &TombstoneSet,
    metric: DistanceMetric,
    params: &HnswParams,
    from: u32,
    to: Candidate,
    layer: usize,
) {
    let cap = graph.max_degree(layer);
    let list = graph.neighbors_mut(from, layer);
    if list.contains(&to.slot) {
        return;
    }
    if list.len() < cap {
        list.push(to.slot);
        return;
    }

    let kept = {
        let ctx = SearchContext {
            storage,
            graph: &*graph,
            metric,
            tombstones,
        };
        let mut pool: Vec<Candidate> = graph
            .neighbors(from, layer)
            .iter()
            .map(|&s| Candidate {
                slot: s,
                distance: ctx.distance_between(from, s),
            })
            .collect();
        let pinned = if ctx.same_vector(from, to.slot) {
            Some(to)
        } else {
            pool.push(to);
            None
        };
        select_neighbors(
            ctx,
            from,
            &pool,
            pinned,
            cap,
            params.neighborhood_diversification,
            params.keep_pruned_connections,
        )
    };
    graph.set_neighbors(from, layer, kept.into_iter().map(|c| c.slot));
}
