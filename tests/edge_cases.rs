//! Edge case tests for vecsim.
//!
//! Tests unusual inputs and boundary conditions that could cause failures.

use vecsim::{
    Algorithm, DistanceMetric, HnswIndex, HnswParams, IndexParams, NeighborhoodDiversification,
    VecSimError,
};

fn index_with(dimension: usize, metric: DistanceMetric, hnsw: HnswParams) -> HnswIndex {
    HnswIndex::new(IndexParams::hnsw(dimension, metric).with_hnsw(hnsw)).expect("Failed to create")
}

fn seeded(dimension: usize, metric: DistanceMetric) -> HnswIndex {
    index_with(
        dimension,
        metric,
        HnswParams {
            seed: Some(7),
            ..Default::default()
        },
    )
}

// =============================================================================
// Dimension edge cases
// =============================================================================

#[test]
fn very_small_dimension() {
    let mut hnsw = seeded(2, DistanceMetric::Cosine);

    let vectors: Vec<[f32; 2]> = (0..50)
        .map(|i| {
            let angle = (i as f32) * 0.1;
            [angle.cos(), angle.sin()]
        })
        .collect();
    for (i, v) in vectors.iter().enumerate() {
        hnsw.add(v, i as u64).expect("Failed to add");
    }

    let results = hnsw.search(&vectors[0], 5).expect("Search failed");
    assert_eq!(results.len(), 5);
    assert_eq!(results[0].0, 0); // Should find itself
}

#[test]
fn high_dimension() {
    let dim = 1024;
    let mut hnsw = seeded(dim, DistanceMetric::L2);

    let vectors: Vec<Vec<f32>> = (0..20)
        .map(|i| (0..dim).map(|d| (((i + 1) * d) as f32).sin()).collect())
        .collect();
    for (i, v) in vectors.iter().enumerate() {
        hnsw.add(v, i as u64).expect("Failed to add");
    }

    let results = hnsw.search(&vectors[10], 5).expect("Search failed");
    assert_eq!(results[0], (10, 0.0));
}

#[test]
fn wrong_dimension_is_rejected() {
    let mut hnsw = seeded(4, DistanceMetric::L2);
    hnsw.add(&[1.0; 4], 1).unwrap();

    assert_eq!(
        hnsw.add(&[1.0; 3], 2),
        Err(VecSimError::DimensionMismatch {
            expected: 4,
            actual: 3
        })
    );
    assert_eq!(
        hnsw.search(&[1.0; 5], 1),
        Err(VecSimError::DimensionMismatch {
            expected: 4,
            actual: 5
        })
    );
    assert_eq!(hnsw.size(), 1);
    assert_eq!(hnsw.slot_count(), 1);
}

// =============================================================================
// Size edge cases
// =============================================================================

#[test]
fn empty_index() {
    let hnsw = seeded(4, DistanceMetric::L2);
    assert!(hnsw.is_empty());
    assert!(hnsw.search(&[0.0; 4], 10).unwrap().is_empty());
    assert_eq!(hnsw.info().entry_point, None);
}

#[test]
fn single_vector() {
    let mut hnsw = seeded(3, DistanceMetric::L2);
    hnsw.add(&[1.0, 2.0, 3.0], 99).unwrap();

    let results = hnsw.search(&[1.0, 2.0, 4.0], 10).unwrap();
    assert_eq!(results, vec![(99, 1.0)]);
    assert_eq!(hnsw.info().entry_point, Some(99));
}

#[test]
fn k_zero_returns_nothing() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    hnsw.add(&[0.0, 0.0], 1).unwrap();
    assert!(hnsw.search(&[0.0, 0.0], 0).unwrap().is_empty());
}

#[test]
fn k_equals_n() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    for i in 0..30u64 {
        hnsw.add(&[i as f32, (i % 3) as f32], i).unwrap();
    }

    let results = hnsw.search(&[15.0, 1.0], 30).unwrap();
    assert_eq!(results.len(), 30);
    let mut ids: Vec<u64> = results.iter().map(|r| r.0).collect();
    ids.sort_unstable();
    assert_eq!(ids, (0..30).collect::<Vec<_>>());
    assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));

    let results = hnsw.search(&[15.0, 1.0], 100).unwrap();
    assert_eq!(results.len(), 30);
}

#[test]
fn capacity_grows_from_one() {
    let mut hnsw = index_with(
        2,
        DistanceMetric::L2,
        HnswParams {
            initial_capacity: 1,
            seed: Some(3),
            ..Default::default()
        },
    );
    assert_eq!(hnsw.capacity(), 1);
    for i in 0..40u64 {
        hnsw.add(&[i as f32, 0.0], i).unwrap();
    }
    assert_eq!(hnsw.size(), 40);
    assert!(hnsw.capacity() >= 40);
    assert_eq!(hnsw.search(&[39.0, 0.0], 1).unwrap(), vec![(39, 0.0)]);
}

#[test]
fn zero_initial_capacity() {
    let mut hnsw = index_with(
        2,
        DistanceMetric::L2,
        HnswParams {
            initial_capacity: 0,
            ..Default::default()
        },
    );
    hnsw.add(&[1.0, 1.0], 1).unwrap();
    assert_eq!(hnsw.size(), 1);
}

// =============================================================================
// Duplicate and identical vectors
// =============================================================================

#[test]
fn identical_vectors() {
    let mut hnsw = seeded(8, DistanceMetric::L2);
    for i in 0..48u64 {
        hnsw.add(&[0.5; 8], i).unwrap();
    }

    let results = hnsw.search(&[0.5; 8], 5).unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|&(_, score)| score == 0.0));
    assert_eq!(hnsw.check_connectivity().orphans, 0);
    assert_eq!(hnsw.search(&[0.5; 8], 48).unwrap().len(), 48);
}

#[test]
fn duplicate_active_id() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    hnsw.add(&[0.0, 0.0], 5).unwrap();
    assert_eq!(
        hnsw.add(&[1.0, 1.0], 5),
        Err(VecSimError::DuplicateActiveId(5))
    );
    assert_eq!(hnsw.size(), 1);
    assert_eq!(hnsw.vector(5), Some(&[0.0, 0.0][..]));

    assert!(hnsw.delete(5));
    hnsw.add(&[1.0, 1.0], 5).unwrap();
    assert_eq!(hnsw.vector(5), Some(&[1.0, 1.0][..]));
    assert_eq!(hnsw.slot_count(), 2);
}

// =============================================================================
// Deletion edge cases
// =============================================================================

#[test]
fn delete_unknown_and_twice() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    assert!(!hnsw.delete(1));
    hnsw.add(&[0.0, 0.0], 1).unwrap();
    assert!(hnsw.delete(1));
    assert!(!hnsw.delete(1));
    assert_eq!(hnsw.size(), 0);
    assert_eq!(hnsw.info().tombstones.count, 1);
}

#[test]
fn deleted_entry_point_still_routes() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    for i in 0..200u64 {
        hnsw.add(&[(i % 20) as f32, (i / 20) as f32], i).unwrap();
    }
    let entry = hnsw.info().entry_point.expect("entry point");
    assert!(hnsw.delete(entry));

    // The entry slot is tombstoned but search still descends through it.
    assert_eq!(hnsw.info().entry_point, Some(entry));
    assert!(!hnsw.contains(entry));
    let results = hnsw.search(&[5.0, 5.0], 5).unwrap();
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|&(id, _)| id != entry));
}

#[test]
fn deleted_ids_never_returned() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    for i in 0..100u64 {
        hnsw.add(&[i as f32, 0.0], i).unwrap();
    }
    for i in (40..60u64).step_by(2) {
        assert!(hnsw.delete(i));
    }

    let results = hnsw.search(&[50.0, 0.0], 10).unwrap();
    assert_eq!(results.len(), 10);
    for (id, _) in &results {
        assert!(!(40..60).contains(id) || id % 2 == 1, "deleted id {id} returned");
    }
    assert_eq!(results[0].0, 49);
    assert!(hnsw.validate().is_ok());
    assert_eq!(hnsw.check_connectivity().orphans, 0);
}

#[test]
fn delete_all_then_add() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    for i in 0..10u64 {
        hnsw.add(&[i as f32, 0.0], i).unwrap();
    }
    for i in 0..10u64 {
        hnsw.delete(i);
    }
    assert!(hnsw.search(&[0.0, 0.0], 3).unwrap().is_empty());

    hnsw.add(&[3.0, 0.0], 100).unwrap();
    assert_eq!(hnsw.search(&[0.0, 0.0], 3).unwrap(), vec![(100, 9.0)]);
    let stats = hnsw.info().tombstones;
    assert_eq!(stats.count, 10);
    assert_eq!(stats.total_slots, 11);
    assert!(stats.needs_compaction);
}

// =============================================================================
// Metrics
// =============================================================================

#[test]
fn inner_product_scores() {
    let mut hnsw = seeded(3, DistanceMetric::InnerProduct);
    hnsw.add(&[1.0, 0.0, 0.0], 1).unwrap();
    hnsw.add(&[0.0, 1.0, 0.0], 2).unwrap();
    hnsw.add(&[0.5, 0.5, 0.0], 3).unwrap();

    let results = hnsw.search(&[1.0, 0.0, 0.0], 3).unwrap();
    assert_eq!(results, vec![(1, 0.0), (3, 0.5), (2, 1.0)]);
}

#[test]
fn cosine_ignores_magnitude() {
    let mut hnsw = seeded(2, DistanceMetric::Cosine);
    hnsw.add(&[10.0, 0.0], 1).unwrap();
    hnsw.add(&[0.0, 0.1], 2).unwrap();

    let results = hnsw.search(&[3.0, 0.0], 2).unwrap();
    assert_eq!(results[0].0, 1);
    assert!(results[0].1.abs() < 1e-6);
    assert!((results[1].1 - 1.0).abs() < 1e-6);

    let stored = hnsw.vector(1).unwrap();
    assert!((stored[0] - 1.0).abs() < 1e-6);
}

// =============================================================================
// Parameters
// =============================================================================

#[test]
fn invalid_parameters() {
    let bad = [
        HnswParams {
            m: 1,
            ..Default::default()
        },
        HnswParams {
            ef_construction: 0,
            ..Default::default()
        },
        HnswParams {
            ef_search: 0,
            ..Default::default()
        },
        HnswParams {
            neighborhood_diversification: NeighborhoodDiversification::RelaxedRelative {
                alpha: 0.5,
            },
            ..Default::default()
        },
    ];
    for hnsw in bad {
        let err = HnswIndex::new(IndexParams::hnsw(4, DistanceMetric::L2).with_hnsw(hnsw))
            .unwrap_err();
        assert!(matches!(err, VecSimError::InvalidParameter(_)), "{err}");
    }

    assert!(HnswIndex::new(IndexParams::hnsw(0, DistanceMetric::L2)).is_err());
    assert!(HnswIndex::new(IndexParams::flat(4, DistanceMetric::L2)).is_err());
}

#[test]
fn small_and_large_ef_search() {
    let mut hnsw = seeded(2, DistanceMetric::L2);
    for i in 0..300u64 {
        hnsw.add(&[(i % 30) as f32, (i / 30) as f32], i).unwrap();
    }

    assert!(hnsw.set_ef_search(0).is_err());
    hnsw.set_ef_search(1).unwrap();
    // ef is raised to k.
    assert_eq!(hnsw.search(&[3.0, 3.0], 8).unwrap().len(), 8);

    let results = hnsw.search_with_ef(&[3.0, 3.0], 1, 500).unwrap();
    assert_eq!(results, vec![(93, 0.0)]);
}

#[test]
fn simple_diversification_builds_valid_graph() {
    let mut hnsw = index_with(
        4,
        DistanceMetric::L2,
        HnswParams {
            m: 4,
            seed: Some(11),
            neighborhood_diversification: NeighborhoodDiversification::Simple,
            keep_pruned_connections: false,
            ..Default::default()
        },
    );
    for i in 0..200u64 {
        let x = i as f32;
        hnsw.add(&[x.sin(), x.cos(), (x * 0.1).sin(), 0.0], i).unwrap();
    }
    assert!(hnsw.validate().is_ok());
    assert_eq!(hnsw.info().algorithm, Algorithm::Hnsw);
    assert_eq!(hnsw.info().m, Some(4));
}

#[test]
fn same_seed_same_results() {
    let build = || {
        let mut hnsw = seeded(16, DistanceMetric::L2);
        for i in 0..300u64 {
            let v: Vec<f32> = (0..16).map(|d| ((i * 31 + d) as f32 * 0.37).sin()).collect();
            hnsw.add(&v, i).unwrap();
        }
        hnsw
    };
    let a = build();
    let b = build();

    assert_eq!(a.info(), b.info());
    let query = [0.1; 16];
    assert_eq!(a.search(&query, 10).unwrap(), b.search(&query, 10).unwrap());
}
