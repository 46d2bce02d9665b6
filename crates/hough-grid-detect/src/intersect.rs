//! Pairwise line intersections with bounds and distance-based deduplication.

use crate::lines::HoughLine;
use crate::params::IntersectionParams;
use log::debug;
use nalgebra::Point2;

/// Lines whose Cramer denominator is smaller than this are parallel.
pub const PARALLEL_EPS: f64 = 1e-10;

/// Intersection of two lines by Cramer's rule, `None` when (nearly) parallel.
pub fn intersect(l1: &HoughLine, l2: &HoughLine, diagonal: usize) -> Option<Point2<f64>> {
    let (a1, b1, c1) = l1.normal_form(diagonal);
    let (a2, b2, c2) = l2.normal_form(diagonal);

    let den = a1 * b2 - a2 * b1;
    if den.abs() < PARALLEL_EPS {
        return None;
    }
    Some(Point2::new(
        (c1 * b2 - c2 * b1) / den,
        (a1 * c2 - a2 * c1) / den,
    ))
}

/// Extend `points` with the intersections of every ordered pair of distinct
/// lines that fall inside `[0, width) × [0, height)` and are not within
/// `dedup_radius` of a point already in the list.
///
/// Both orders of each pair are evaluated; the second evaluation is always
/// absorbed by the dedup test. The result depends on line order and on the
/// points passed in, which lets callers accumulate across several runs.
pub fn accumulate_intersections(
    lines: &[HoughLine],
    diagonal: usize,
    width: usize,
    height: usize,
    params: &IntersectionParams,
    mut points: Vec<Point2<f64>>,
) -> Vec<Point2<f64>> {
    let prior = points.len();
    let (w, h) = (width as f64, height as f64);
    let r2 = params.dedup_radius * params.dedup_radius;

    for (i, l1) in lines.iter().enumerate() {
        for (j, l2) in lines.iter().enumerate() {
            if i == j {
                continue;
            }
            let Some(p) = intersect(l1, l2, diagonal) else {
                continue;
            };
            if !(p.x >= 0.0 && p.x < w && p.y >= 0.0 && p.y < h) {
                continue;
            }
            let too_close = points.iter().any(|q| (q - p).norm_squared() < r2);
            if !too_close {
                points.push(p);
            }
        }
    }

    debug!(
        "{} new intersections from {} lines ({} carried over)",
        points.len() - prior,
        lines.len(),
        prior
    );
    points
}

/// [`accumulate_intersections`] starting from an empty list.
pub fn find_intersections(
    lines: &[HoughLine],
    diagonal: usize,
    width: usize,
    height: usize,
    params: &IntersectionParams,
) -> Vec<Point2<f64>> {
    accumulate_intersections(lines, diagonal, width, height, params, Vec::new())
}
