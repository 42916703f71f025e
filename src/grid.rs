use rand::Rng;

/// Boolean Game of Life board with toroidal wrapping.
///
/// Cells are stored row-major. A generation step always produces a new
/// `Grid`; the source is left untouched so callers can keep it as the
/// previous frame.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl Grid {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        let rows = rows.max(1);
        let cols = cols.max(1);
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Seed every cell independently: alive with probability `prob`.
    pub(crate) fn random<R: Rng>(rows: usize, cols: usize, prob: f64, rng: &mut R) -> Self {
        let mut grid = Self::new(rows, cols);
        let prob = if prob.is_finite() { prob.clamp(0.0, 1.0) } else { 0.0 };
        for c in &mut grid.cells {
            *c = rng.gen_bool(prob);
        }
        grid
    }

    pub(crate) fn rows(&self) -> usize {
        self.rows
    }

    pub(crate) fn cols(&self) -> usize {
        self.cols
    }

    #[cfg(test)]
    pub(crate) fn cells(&self) -> &[bool] {
        &self.cells
    }

    #[inline]
    fn idx(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub(crate) fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[self.idx(row, col)]
    }

    #[cfg(test)]
    pub(crate) fn set(&mut self, row: usize, col: usize, alive: bool) {
        if row < self.rows && col < self.cols {
            let i = self.idx(row, col);
            self.cells[i] = alive;
        }
    }

    #[cfg(test)]
    pub(crate) fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Live cells among the 8 neighbors of (row, col), wrapping at the edges.
    pub(crate) fn live_neighbors(&self, row: usize, col: usize) -> u8 {
        let mut n = 0u8;
        for dr in [-1isize, 0, 1] {
            for dc in [-1isize, 0, 1] {
                if dr == 0 && dc == 0 {
                    continue;
                }
                let r = (row as isize + dr).rem_euclid(self.rows as isize) as usize;
                let c = (col as isize + dc).rem_euclid(self.cols as isize) as usize;
                if self.cells[self.idx(r, c)] {
                    n += 1;
                }
            }
        }
        n
    }

    pub(crate) fn next_generation(&self) -> Grid {
        let mut next = vec![false; self.cells.len()];
        for row in 0..self.rows {
            for col in 0..self.cols {
                let i = self.idx(row, col);
                // B3/S23
                next[i] = matches!(
                    (self.cells[i], self.live_neighbors(row, col)),
                    (_, 3) | (true, 2)
                );
            }
        }
        Grid {
            rows: self.rows,
            cols: self.cols,
            cells: next,
        }
    }

    /// Build a grid from rows of `#` (alive) and `.` (dead).
    #[cfg(test)]
    pub(crate) fn from_pattern(lines: &[&str]) -> Self {
        let rows = lines.len();
        let cols = lines.first().map_or(0, |l| l.len());
        let mut grid = Self::new(rows, cols);
        for (r, line) in lines.iter().enumerate() {
            assert_eq!(line.len(), cols, "pattern rows must share one width");
            for (c, b) in line.bytes().enumerate() {
                grid.set(r, c, b == b'#');
            }
        }
        grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn shifted(grid: &Grid, dr: usize, dc: usize) -> Grid {
        let mut out = Grid::new(grid.rows(), grid.cols());
        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                out.set((r + dr) % grid.rows(), (c + dc) % grid.cols(), grid.get(r, c));
            }
        }
        out
    }

    #[test]
    fn corner_cell_reaches_opposite_edges() {
        let (rows, cols) = (5, 7);
        let mut g = Grid::new(rows, cols);
        g.set(0, 0, true);

        let wrapped = [
            (rows - 1, cols - 1),
            (rows - 1, 0),
            (rows - 1, 1),
            (0, cols - 1),
            (0, 1),
            (1, cols - 1),
            (1, 0),
            (1, 1),
        ];
        for r in 0..rows {
            for c in 0..cols {
                let expected = u8::from(wrapped.contains(&(r, c)));
                assert_eq!(g.live_neighbors(r, c), expected, "at ({r},{c})");
            }
        }
    }

    #[test]
    fn block_is_a_fixed_point() {
        let block = Grid::from_pattern(&[
            "......",
            "......",
            "..##..",
            "..##..",
            "......",
            "......",
        ]);
        let next = block.next_generation();
        assert_eq!(next, block);
        assert_eq!(next.population(), 4);
    }

    #[test]
    fn blinker_has_period_two() {
        let blinker = Grid::from_pattern(&[
            ".....",
            ".....",
            ".###.",
            ".....",
            ".....",
        ]);
        let one = blinker.next_generation();
        assert_ne!(one, blinker);
        assert_eq!(
            one,
            Grid::from_pattern(&[
                ".....",
                "..#..",
                "..#..",
                "..#..",
                ".....",
            ])
        );
        assert_eq!(one.next_generation(), blinker);
    }

    #[test]
    fn blinker_across_the_seam_still_oscillates() {
        let mut g = Grid::new(5, 5);
        g.set(0, 4, true);
        g.set(0, 0, true);
        g.set(0, 1, true);
        let one = g.next_generation();
        assert!(one.get(4, 0) && one.get(0, 0) && one.get(1, 0));
        assert_eq!(one.population(), 3);
        assert_eq!(one.next_generation(), g);
    }

    #[test]
    fn next_generation_leaves_source_untouched() {
        let g = Grid::from_pattern(&[".....", ".###.", "....."]);
        let before = g.clone();
        let _ = g.next_generation();
        assert_eq!(g, before);
    }

    #[test]
    fn degenerate_probabilities() {
        let mut rng = StdRng::seed_from_u64(7);
        let dead = Grid::random(4, 9, 0.0, &mut rng);
        assert_eq!(dead.population(), 0);
        let full = Grid::random(4, 9, 1.0, &mut rng);
        assert_eq!(full.population(), 36);
    }

    #[test]
    fn zero_dimensions_are_floored() {
        let g = Grid::new(0, 0);
        assert_eq!((g.rows(), g.cols()), (1, 1));
    }

    #[test]
    fn lonely_cells_die_and_crowds_starve() {
        let g = Grid::from_pattern(&[
            ".......",
            ".#.....",
            ".......",
            "...###.",
            "...###.",
            "...###.",
            ".......",
        ]);
        let next = g.next_generation();
        assert!(!next.get(1, 1));
        // centre of a 3x3 square has 8 neighbors
        assert!(!next.get(4, 4));
    }

    proptest! {
        #[test]
        fn generation_is_deterministic(seed in any::<u64>(), rows in 1usize..24, cols in 1usize..24) {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = Grid::random(rows, cols, 0.35, &mut rng);
            prop_assert_eq!(g.next_generation(), g.next_generation());
        }

        #[test]
        fn step_commutes_with_toroidal_shift(
            seed in any::<u64>(),
            rows in 3usize..16,
            cols in 3usize..16,
            dr in 0usize..16,
            dc in 0usize..16,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let g = Grid::random(rows, cols, 0.4, &mut rng);
            prop_assert_eq!(
                shifted(&g, dr, dc).next_generation(),
                shifted(&g.next_generation(), dr, dc)
            );
        }
    }
}
