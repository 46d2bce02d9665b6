//! Rho/theta voting transform.
//!
//! Every non-zero cell `(x, y)` of an edge matrix votes once per integer
//! degree `theta` in `[0, 180)` for the bin
//! `rho = round(x·cos θ + y·sin θ + diagonal)`, with
//! `diagonal = floor(sqrt(width² + height²))`. The offset keeps `rho`
//! non-negative, so the accumulator has `2·diagonal + 1` rho bins.

use hough_grid_core::Matrix;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One bin per integer degree.
pub const THETA_BINS: usize = 180;

/// Vote counts indexed `[rho][theta]`.
#[derive(Clone, Debug, PartialEq)]
pub struct HoughAccumulator {
    diagonal: usize,
    rho_bins: usize,
    votes: Vec<u32>, // row-major over rho, len = rho_bins * THETA_BINS
}

struct TrigTable {
    cos: [f64; THETA_BINS],
    sin: [f64; THETA_BINS],
}

impl TrigTable {
    fn new() -> Self {
        let mut cos = [0.0; THETA_BINS];
        let mut sin = [0.0; THETA_BINS];
        for theta in 0..THETA_BINS {
            let rad = (theta as f64).to_radians();
            cos[theta] = rad.cos();
            sin[theta] = rad.sin();
        }
        Self { cos, sin }
    }
}

/// `floor(sqrt(width² + height²))`.
#[inline]
pub fn diagonal_length(width: usize, height: usize) -> usize {
    ((width * width + height * height) as f64).sqrt().floor() as usize
}

impl HoughAccumulator {
    /// Empty accumulator sized for a `width × height` edge matrix.
    pub fn new(width: usize, height: usize) -> Self {
        let diagonal = diagonal_length(width, height);
        let rho_bins = 2 * diagonal + 1;
        Self {
            diagonal,
            rho_bins,
            votes: vec![0; rho_bins * THETA_BINS],
        }
    }

    /// Accumulate votes from every non-zero cell of `edges`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(edges), fields(width = edges.width(), height = edges.height()))
    )]
    pub fn from_edges(edges: &Matrix) -> Self {
        let mut acc = Self::new(edges.width(), edges.height());
        let trig = TrigTable::new();
        for (y, row) in edges.rows().enumerate() {
            for (x, &v) in row.iter().enumerate() {
                if v != 0.0 {
                    acc.vote_point(x, y, &trig);
                }
            }
        }
        acc
    }

    fn vote_point(&mut self, x: usize, y: usize, trig: &TrigTable) {
        let (xf, yf) = (x as f64, y as f64);
        let offset = self.diagonal as f64;
        for theta in 0..THETA_BINS {
            let rho = (xf * trig.cos[theta] + yf * trig.sin[theta] + offset).round();
            // |x cos + y sin| never exceeds the diagonal for in-image points
            if rho >= 0.0 && (rho as usize) < self.rho_bins {
                self.votes[rho as usize * THETA_BINS + theta] += 1;
            }
        }
    }

    #[inline]
    pub fn diagonal(&self) -> usize {
        self.diagonal
    }

    #[inline]
    pub fn rho_bins(&self) -> usize {
        self.rho_bins
    }

    #[inline]
    pub fn theta_bins(&self) -> usize {
        THETA_BINS
    }

    #[inline]
    pub fn votes(&self, rho: usize, theta: usize) -> u32 {
        self.votes[rho * THETA_BINS + theta]
    }

    /// Add `n` votes to a single cell.
    pub fn add_votes(&mut self, rho: usize, theta: usize, n: u32) {
        self.votes[rho * THETA_BINS + theta] += n;
    }

    pub fn max_votes(&self) -> u32 {
        self.votes.iter().copied().max().unwrap_or(0)
    }

    /// Cells in scan order: rho ascending, then theta ascending.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, u32)> + '_ {
        self.votes
            .iter()
            .enumerate()
            .map(|(i, &v)| (i / THETA_BINS, i % THETA_BINS, v))
    }

    /// First cell (in scan order) holding the maximum vote count.
    pub fn peak(&self) -> Option<(usize, usize, u32)> {
        let max = self.max_votes();
        if max == 0 {
            return None;
        }
        self.cells().find(|&(_, _, v)| v == max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_follow_input_size() {
        let acc = HoughAccumulator::new(20, 20);
        assert_eq!(acc.diagonal(), 28);
        assert_eq!(acc.rho_bins(), 57);
        assert_eq!(acc.theta_bins(), 180);
        assert_eq!(acc.cells().count(), 57 * 180);

        let acc = HoughAccumulator::new(640, 480);
        assert_eq!(acc.diagonal(), 800);
        assert_eq!(acc.rho_bins(), 1601);
    }

    #[test]
    fn each_edge_pixel_casts_one_vote_per_theta() {
        let edges = Matrix::from_fn(15, 11, |x, y| if (x * 3 + y) % 7 == 0 { 255.0 } else { 0.0 });
        let acc = HoughAccumulator::from_edges(&edges);
        let total: u64 = acc.cells().map(|(_, _, v)| v as u64).sum();
        assert_eq!(total, edges.count_nonzero() as u64 * THETA_BINS as u64);
    }

    #[test]
    fn vertical_edge_column_peaks_at_theta_zero() {
        // column x = 5
        let edges = Matrix::from_fn(20, 20, |x, _| if x == 5 { 255.0 } else { 0.0 });
        let acc = HoughAccumulator::from_edges(&edges);
        let d = acc.diagonal();
        assert_eq!(acc.votes(5 + d, 0), 20);
        assert_eq!(acc.max_votes(), 20);
    }

    #[test]
    fn horizontal_edge_row_peaks_at_theta_ninety() {
        // row y = 5
        let edges = Matrix::from_fn(20, 20, |_, y| if y == 5 { 255.0 } else { 0.0 });
        let acc = HoughAccumulator::from_edges(&edges);
        let d = acc.diagonal();
        assert_eq!(acc.votes(5 + d, 90), 20);
        assert_eq!(acc.max_votes(), 20);
    }

    #[test]
    fn peak_is_first_maximum_in_scan_order() {
        let mut acc = HoughAccumulator::new(10, 10);
        assert_eq!(acc.peak(), None);
        acc.add_votes(12, 40, 7);
        acc.add_votes(3, 170, 7);
        acc.add_votes(20, 0, 5);
        assert_eq!(acc.peak(), Some((3, 170, 7)));
    }

    #[test]
    fn empty_edge_matrix_has_no_votes() {
        let acc = HoughAccumulator::from_edges(&Matrix::new(0, 0));
        assert_eq!(acc.diagonal(), 0);
        assert_eq!(acc.rho_bins(), 1);
        assert_eq!(acc.max_votes(), 0);
    }
}
