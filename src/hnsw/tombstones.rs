//! Tombstone-based deletions.
//!
//! Inspired by FreshDiskANN (Singh et al., 2021): a deleted slot is only
//! marked, never unlinked. Its vector and edges stay in place so live nodes
//! remain reachable through it; search simply keeps it out of the results.
//!
//! # Trade-offs
//!
//! | Approach | Deletion | Search | Memory |
//! |----------|----------|--------|--------|
//! | Immediate repair | O(degree * search) | Optimal | Optimal |
//! | Tombstones | O(1) | Slight overhead | Tombstone bloat |
//!
//! The bloat is what [`TombstoneSet::should_compact`] reports on. This crate
//! never compacts; the hint lets the owner decide when to rebuild.
//!
//! # References
//!
//! - Singh et al. (2021). "FreshDiskANN: A Fast and Accurate Graph-Based ANN Index
//!   for Streaming Similarity Search." arXiv:2105.09613

const WORD_BITS: usize = u64::BITS as usize;

/// Default fraction of tombstoned slots above which compaction is suggested.
pub const DEFAULT_COMPACTION_THRESHOLD: f32 = 0.1;

/// Set of tombstoned slots, stored as a growable bitset.
#[derive(Debug, Clone)]
pub struct TombstoneSet {
    words: Vec<u64>,
    count: usize,
    compaction_threshold: f32,
}

impl TombstoneSet {
    /// Create a new tombstone set.
    ///
    /// # Arguments
    ///
    /// * `compaction_threshold` - Fraction of slots that can be tombstoned
    ///   before suggesting compaction (e.g., 0.1 = 10%)
    pub fn new(compaction_threshold: f32) -> Self {
        TombstoneSet {
            words: Vec::new(),
            count: 0,
            compaction_threshold: compaction_threshold.clamp(0.01, 0.5),
        }
    }

    /// Mark a slot as deleted.
    ///
    /// Returns true if the slot was newly deleted, false if already deleted.
    pub fn delete(&mut self, slot: u32) -> bool {
        let (word, bit) = Self::position(slot);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        if self.words[word] & mask != 0 {
            return false;
        }
        self.words[word] |= mask;
        self.count += 1;
        true
    }

    #[inline]
    pub fn is_deleted(&self, slot: u32) -> bool {
        let (word, bit) = Self::position(slot);
        self.words
            .get(word)
            .is_some_and(|w| w & (1u64 << bit) != 0)
    }

    /// Number of tombstoned slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// True if the fraction of tombstones exceeds the threshold.
    pub fn should_compact(&self, total_slots: usize) -> bool {
        if total_slots == 0 {
            return false;
        }
        (self.count as f32 / total_slots as f32) > self.compaction_threshold
    }

    /// Tombstoned slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.words.iter().enumerate().flat_map(|(w, &word)| {
            (0..WORD_BITS)
                .filter(move |b| word & (1u64 << b) != 0)
                .map(move |b| (w * WORD_BITS + b) as u32)
        })
    }

    pub fn stats(&self, total_slots: usize) -> TombstoneStats {
        let ratio = if total_slots > 0 {
            self.count as f32 / total_slots as f32
        } else {
            0.0
        };
        TombstoneStats {
            count: self.count,
            total_slots,
            ratio,
            needs_compaction: self.should_compact(total_slots),
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
    }

    #[inline]
    fn position(slot: u32) -> (usize, usize) {
        let slot = slot as usize;
        (slot / WORD_BITS, slot % WORD_BITS)
    }
}

impl Default for TombstoneSet {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACTION_THRESHOLD)
    }
}

/// Statistics about tombstone state.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TombstoneStats {
    /// Number of tombstoned slots
    pub count: usize,
    /// Total slots ever allocated
    pub total_slots: usize,
    /// Ratio of tombstones to total
    pub ratio: f32,
    /// Whether compaction is recommended
    pub needs_compaction: bool,
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Deletion is idempotent
        #[test]
        fn prop_delete_idempotent(slot in 0..10_000_u32) {
            let mut ts = TombstoneSet::new(0.1);
            prop_assert!(ts.delete(slot));
            prop_assert!(!ts.delete(slot));
            prop_assert!(ts.is_deleted(slot));
            prop_assert_eq!(ts.len(), 1);
        }

        /// Count and iteration agree with a reference set
        #[test]
        fn prop_matches_reference_set(
            deletions in proptest::collection::vec(0..500_u32, 0..100),
        ) {
            let mut ts = TombstoneSet::default();
            let mut reference = std::collections::BTreeSet::new();
            for slot in deletions {
                prop_assert_eq!(ts.delete(slot), reference.insert(slot));
            }
            prop_assert_eq!(ts.len(), reference.len());
            let listed: Vec<u32> = ts.iter().collect();
            let expected: Vec<u32> = reference.into_iter().collect();
            prop_assert_eq!(listed, expected);
        }

        /// Compaction threshold is consistent
        #[test]
        fn prop_compaction_threshold_consistent(
            threshold in 0.01..0.5_f32,
            deletions in 0..50_u32,
            total in 50..500_usize,
        ) {
            let mut ts = TombstoneSet::new(threshold);
            for i in 0..deletions {
                ts.delete(i);
            }

            let ratio = deletions as f32 / total as f32;
            prop_assert_eq!(ts.should_compact(total), ratio > threshold);
        }
    }
}
