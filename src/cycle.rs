use crate::grid::Grid;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

/// 64-bit digest of a grid's dimensions and row-major cell sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Fingerprint(u64);

pub(crate) fn fingerprint(grid: &Grid) -> Fingerprint {
    // DefaultHasher::new() uses fixed keys, so digests are stable within a process.
    let mut h = DefaultHasher::new();
    grid.hash(&mut h);
    Fingerprint(h.finish())
}

/// Remembers every configuration seen during one run.
#[derive(Debug, Default)]
pub(crate) struct CycleDetector {
    seen: HashSet<Fingerprint>,
}

impl CycleDetector {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// True if `fp` was already recorded this run; otherwise records it.
    pub(crate) fn observe(&mut self, fp: Fingerprint) -> bool {
        !self.seen.insert(fp)
    }

    pub(crate) fn reset(&mut self) {
        self.seen.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn equal_grids_share_a_fingerprint() {
        let a = Grid::from_pattern(&[".#.", "##.", "..."]);
        let b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn fingerprint_is_order_sensitive() {
        let a = Grid::from_pattern(&["#..", "..."]);
        let b = Grid::from_pattern(&["...", "#.."]);
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn same_cells_in_other_shape_differ() {
        let wide = Grid::from_pattern(&["#.....", "......"]);
        let tall = Grid::from_pattern(&["#..", "...", "...", "..."]);
        assert_eq!(wide.cells(), tall.cells());
        assert_ne!(fingerprint(&wide), fingerprint(&tall));
    }

    #[test]
    fn blinker_repeats_on_its_third_observation() {
        let mut det = CycleDetector::new();
        let g0 = Grid::from_pattern(&[".....", ".....", ".###.", ".....", "....."]);
        let g1 = g0.next_generation();
        let g2 = g1.next_generation();
        assert!(!det.observe(fingerprint(&g0)));
        assert!(!det.observe(fingerprint(&g1)));
        assert!(det.observe(fingerprint(&g2)));
        assert_eq!(det.len(), 2);
    }

    proptest! {
        #[test]
        fn first_observation_is_new_then_always_seen(raw in any::<u64>(), repeats in 1usize..6) {
            let mut det = CycleDetector::new();
            let fp = Fingerprint(raw);
            prop_assert!(!det.observe(fp));
            for _ in 0..repeats {
                prop_assert!(det.observe(fp));
            }
            det.reset();
            prop_assert_eq!(det.len(), 0);
            prop_assert!(!det.observe(fp));
            prop_assert!(det.observe(fp));
        }
    }
}
