//! Multi-layer adjacency store.
//!
//! Each slot owns one neighbor list per layer it belongs to, `0..=level`, so a
//! slot present in layer `i` is present in every layer below it by
//! construction. Lists are capped at `m` on upper layers and `2 * m` on the
//! base layer.

use std::collections::VecDeque;

use smallvec::SmallVec;
use thiserror::Error;

/// Neighbor list for one slot on one layer.
pub(crate) type NeighborList = SmallVec<[u32; 32]>;

/// Global search starting point: a slot on the topmost occupied layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntryPoint {
    pub slot: u32,
    pub level: usize,
}

/// A structural invariant the graph failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphViolation {
    #[error("slot {slot} has {degree} neighbors on layer {layer}, cap is {cap}")]
    DegreeExceeded {
        slot: u32,
        layer: usize,
        degree: usize,
        cap: usize,
    },
    #[error("slot {slot} links to unknown slot {neighbor} on layer {layer}")]
    DanglingEdge { slot: u32, layer: usize, neighbor: u32 },
    #[error("slot {slot} links to slot {neighbor} on layer {layer}, which it does not reach")]
    LayerMismatch { slot: u32, layer: usize, neighbor: u32 },
    #[error("slot {slot} links to itself on layer {layer}")]
    SelfLoop { slot: u32, layer: usize },
    #[error("slot {slot} lists neighbor {neighbor} twice on layer {layer}")]
    DuplicateEdge { slot: u32, layer: usize, neighbor: u32 },
    #[error("entry point {entry:?} is not on the top layer {top}")]
    BadEntryPoint { entry: Option<EntryPoint>, top: usize },
}

/// Result of a base-layer reachability walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConnectivityReport {
    /// Live slots reachable from the entry point.
    pub reachable: usize,
    /// Live slots that no walk from the entry point reaches.
    pub orphans: usize,
}

#[derive(Debug, Clone)]
struct Node {
    layers: Vec<NeighborList>,
}

/// Per-layer adjacency lists for every slot.
#[derive(Debug, Clone)]
pub struct GraphLayers {
    nodes: Vec<Node>,
    m: usize,
    entry_point: Option<EntryPoint>,
    /// Number of slots present on each layer.
    layer_sizes: Vec<usize>,
}

impl GraphLayers {
    pub fn new(m: usize, capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            m,
            entry_point: None,
            layer_sizes: Vec::new(),
        }
    }

    pub fn reserve(&mut self, capacity: usize) {
        self.nodes
            .reserve(capacity.saturating_sub(self.nodes.len()));
    }

    /// Register `slot` on layers `0..=level` with empty neighbor lists.
    ///
    /// Slots are appended in order, so `slot` must equal the current length.
    pub fn add_node(&mut self, slot: u32, level: usize) {
        debug_assert_eq!(slot as usize, self.nodes.len());
        self.nodes.push(Node {
            layers: vec![NeighborList::new(); level + 1],
        });
        if self.layer_sizes.len() <= level {
            self.layer_sizes.resize(level + 1, 0);
        }
        for size in &mut self.layer_sizes[..=level] {
            *size += 1;
        }
    }

    /// Number of slots in the graph.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Highest layer `slot` belongs to.
    #[inline]
    pub fn level(&self, slot: u32) -> usize {
        self.nodes[slot as usize].layers.len() - 1
    }

    /// Neighbors of `slot` on `layer`; empty if the slot is not on that layer.
    #[inline]
    pub fn neighbors(&self, slot: u32, layer: usize) -> &[u32] {
        self.nodes[slot as usize]
            .layers
            .get(layer)
            .map_or(&[], |list| list.as_slice())
    }

    #[inline]
    pub(crate) fn neighbors_mut(&mut self, slot: u32, layer: usize) -> &mut NeighborList {
        &mut self.nodes[slot as usize].layers[layer]
    }

    pub(crate) fn set_neighbors(
        &mut self,
        slot: u32,
        layer: usize,
        neighbors: impl IntoIterator<Item = u32>,
    ) {
        let list = self.neighbors_mut(slot, layer);
        list.clear();
        list.extend(neighbors);
    }

    /// Neighbor cap on `layer`: `2 * m` on the base layer, `m` above it.
    #[inline]
    pub fn max_degree(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m * 2
        } else {
            self.m
        }
    }

    #[inline]
    pub fn entry_point(&self) -> Option<EntryPoint> {
        self.entry_point
    }

    pub(crate) fn set_entry_point(&mut self, slot: u32, level: usize) {
        self.entry_point = Some(EntryPoint { slot, level });
    }

    /// Top occupied layer, `None` for an empty graph.
    pub fn max_level(&self) -> Option<usize> {
        self.entry_point.map(|ep| ep.level)
    }

    /// Slots present on `layer`.
    pub fn layer_size(&self, layer: usize) -> usize {
        self.layer_sizes.get(layer).copied().unwrap_or(0)
    }

    /// Directed edges stored on `layer`.
    pub fn edge_count(&self, layer: usize) -> usize {
        self.nodes
            .iter()
            .filter_map(|n| n.layers.get(layer))
            .map(|l| l.len())
            .sum()
    }

    pub fn size_bytes(&self) -> usize {
        self.nodes
            .iter()
            .map(|n| {
                std::mem::size_of::<Node>()
                    + n.layers.capacity() * std::mem::size_of::<NeighborList>()
                    + n.layers
                        .iter()
                        .filter(|l| l.spilled())
                        .map(|l| l.capacity() * std::mem::size_of::<u32>())
                        .sum::<usize>()
            })
            .sum()
    }

    /// Check the structural invariants, stopping at the first violation.
    pub fn validate(&self) -> Result<(), GraphViolation> {
        let top = self.layer_sizes.len().saturating_sub(1);
        match self.entry_point {
            None if !self.nodes.is_empty() => {
                return Err(GraphViolation::BadEntryPoint { entry: None, top })
            }
            Some(ep) if ep.level != top || self.level(ep.slot) != top => {
                return Err(GraphViolation::BadEntryPoint {
                    entry: Some(ep),
                    top,
                })
            }
            _ => {}
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            let slot = idx as u32;
            for (layer, list) in node.layers.iter().enumerate() {
                let cap = self.max_degree(layer);
                if list.len() > cap {
                    return Err(GraphViolation::DegreeExceeded {
                        slot,
                        layer,
                        degree: list.len(),
                        cap,
                    });
                }
                for (pos, &neighbor) in list.iter().enumerate() {
                    if neighbor == slot {
                        return Err(GraphViolation::SelfLoop { slot, layer });
                    }
                    if neighbor as usize >= self.nodes.len() {
                        return Err(GraphViolation::DanglingEdge {
                            slot,
                            layer,
                            neighbor,
                        });
                    }
                    if self.level(neighbor) < layer {
                        return Err(GraphViolation::LayerMismatch {
                            slot,
                            layer,
                            neighbor,
                        });
                    }
                    if list[..pos].contains(&neighbor) {
                        return Err(GraphViolation::DuplicateEdge {
                            slot,
                            layer,
                            neighbor,
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Breadth-first walk of the base layer from the entry point.
    ///
    /// Deleted slots are walked through but not counted.
    pub fn connectivity(&self, is_deleted: impl Fn(u32) -> bool) -> ConnectivityReport {
        let live = (0..self.nodes.len() as u32)
            .filter(|&s| !is_deleted(s))
            .count();
        let Some(entry) = self.entry_point else {
            return ConnectivityReport {
                reachable: 0,
                orphans: live,
            };
        };

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([entry.slot]);
        seen[entry.slot as usize] = true;
        let mut reachable = 0;

        while let Some(slot) = queue.pop_front() {
            if !is_deleted(slot) {
                reachable += 1;
            }
            for &neighbor in self.neighbors(slot, 0) {
                if !std::mem::replace(&mut seen[neighbor as usize], true) {
                    queue.push_back(neighbor);
                }
            }
        }

        ConnectivityReport {
            reachable,
            orphans: live - reachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(levels: &[usize]) -> GraphLayers {
        let mut graph = GraphLayers::new(2, levels.len());
        for (slot, &level) in levels.iter().enumerate() {
            graph.add_node(slot as u32, level);
        }
        for slot in 1..levels.len() as u32 {
            graph.neighbors_mut(slot - 1, 0).push(slot);
            graph.neighbors_mut(slot, 0).push(slot - 1);
        }
        graph
    }

    #[test]
    fn nodes_exist_on_every_lower_layer() {
        let mut graph = GraphLayers::new(4, 3);
        graph.add_node(0, 2);
        graph.add_node(1, 0);
        graph.add_node(2, 1);
        assert_eq!(graph.layer_size(0), 3);
        assert_eq!(graph.layer_size(1), 2);
        assert_eq!(graph.layer_size(2), 1);
        assert_eq!(graph.layer_size(3), 0);
        assert!(graph.neighbors(1, 1).is_empty());
    }

    #[test]
    fn base_layer_cap_is_doubled() {
        let graph = GraphLayers::new(16, 0);
        assert_eq!(graph.max_degree(0), 32);
        assert_eq!(graph.max_degree(1), 16);
        assert_eq!(graph.max_degree(5), 16);
    }

    #[test]
    fn validate_accepts_well_formed_graph() {
        let mut graph = chain(&[1, 0, 0, 0]);
        graph.set_entry_point(0, 1);
        assert_eq!(graph.validate(), Ok(()));
        assert_eq!(graph.edge_count(0), 6);
    }

    #[test]
    fn validate_flags_layer_mismatch() {
        let mut graph = chain(&[1, 0, 0]);
        graph.set_entry_point(0, 1);
        graph.neighbors_mut(0, 1).push(2);
        assert_eq!(
            graph.validate(),
            Err(GraphViolation::LayerMismatch {
                slot: 0,
                layer: 1,
                neighbor: 2
            })
        );
    }

    #[test]
    fn validate_flags_degree_overflow() {
        let mut graph = chain(&[0, 0, 0, 0, 0, 0]);
        graph.set_entry_point(0, 0);
        graph.set_neighbors(0, 0, [1, 2, 3, 4, 5]);
        assert!(matches!(
            graph.validate(),
            Err(GraphViolation::DegreeExceeded { slot: 0, cap: 4, .. })
        ));
    }

    #[test]
    fn validate_requires_entry_on_top_layer() {
        let mut graph = chain(&[0, 2]);
        graph.set_entry_point(0, 0);
        assert!(matches!(
            graph.validate(),
            Err(GraphViolation::BadEntryPoint { top: 2, .. })
        ));
    }

    #[test]
    fn connectivity_walks_through_deleted_slots() {
        let mut graph = chain(&[0, 0, 0, 0]);
        graph.set_entry_point(0, 0);
        let report = graph.connectivity(|s| s == 1);
        assert_eq!(
            report,
            ConnectivityReport {
                reachable: 3,
                orphans: 0
            }
        );
    }

    #[test]
    fn connectivity_counts_orphans() {
        let mut graph = chain(&[0, 0, 0]);
        graph.add_node(3, 0);
        graph.set_entry_point(0, 0);
        let report = graph.connectivity(|_| false);
        assert_eq!(report.reachable, 3);
        assert_eq!(report.orphans, 1);
    }
}
