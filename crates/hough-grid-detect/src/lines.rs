use crate::hough::HoughAccumulator;
use crate::params::LineClusterParams;
use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A detected line as an accumulator cell.
///
/// Represents `x·cos θ + y·sin θ = rho − diagonal` in edge-matrix coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoughLine {
    /// Rho bin (offset by the accumulator diagonal).
    pub rho: usize,
    /// Angle of the line normal in integer degrees, `[0, 180)`.
    pub theta: usize,
    /// Votes of the accumulator cell.
    pub votes: u32,
}

/// Finite display segment of a [`HoughLine`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub start: Point2<f64>,
    pub end: Point2<f64>,
}

impl HoughLine {
    /// `(a, b, c)` with `a·x + b·y = c`.
    pub fn normal_form(&self, diagonal: usize) -> (f64, f64, f64) {
        let rad = (self.theta as f64).to_radians();
        (rad.cos(), rad.sin(), self.rho as f64 - diagonal as f64)
    }

    /// Segment through the foot of the normal, extending `diagonal` pixels
    /// both ways along the line direction.
    pub fn segment(&self, diagonal: usize) -> LineSegment {
        let (cos, sin, dist) = self.normal_form(diagonal);
        let foot = Point2::new(dist * cos, dist * sin);
        let span = diagonal as f64;
        let (dx, dy) = (-sin * span, cos * span);
        LineSegment {
            start: Point2::new(foot.x + dx, foot.y + dy),
            end: Point2::new(foot.x - dx, foot.y - dy),
        }
    }

    #[inline]
    fn is_near(&self, rho: usize, theta: usize, params: &LineClusterParams) -> bool {
        self.rho.abs_diff(rho) < params.rho_tolerance
            && self.theta.abs_diff(theta) < params.theta_tolerance
    }
}

/// Greedy first-come-first-kept line selection.
///
/// Cells are scanned rho-major (rho ascending, then theta ascending). A cell
/// whose votes strictly exceed `vote_threshold` is accepted unless an already
/// accepted line lies within both tolerances. Theta does not wrap around.
pub fn cluster_lines(acc: &HoughAccumulator, params: &LineClusterParams) -> Vec<HoughLine> {
    let mut accepted: Vec<HoughLine> = Vec::new();
    let mut candidates = 0usize;

    for (rho, theta, votes) in acc.cells() {
        if votes <= params.vote_threshold {
            continue;
        }
        candidates += 1;
        if accepted.iter().any(|l| l.is_near(rho, theta, params)) {
            continue;
        }
        accepted.push(HoughLine { rho, theta, votes });
    }

    debug!(
        "{} candidate cells above {} votes, {} lines kept",
        candidates,
        params.vote_threshold,
        accepted.len()
    );
    accepted
}
