//! Row grouping and rectangular trimming of intersection points.

use crate::error::{GridDetectError, Stage};
use crate::params::GridParams;
use log::{debug, warn};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Rectangular grid of points: rows ordered by `y`, each row ordered by `x`,
/// every row the same length.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    rows: Vec<Vec<Point2<f64>>>,
}

/// The four extreme points of a [`Grid`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridCorners {
    pub top_left: Point2<f64>,
    pub top_right: Point2<f64>,
    pub bottom_left: Point2<f64>,
    pub bottom_right: Point2<f64>,
}

impl GridCorners {
    /// Axis-aligned target rectangle `cols·cell_size × rows·cell_size` at the origin.
    pub fn canonical(cols: usize, rows: usize, cell_size: f64) -> Self {
        let w = cell_size * cols as f64;
        let h = cell_size * rows as f64;
        Self {
            top_left: Point2::new(0.0, 0.0),
            top_right: Point2::new(w, 0.0),
            bottom_left: Point2::new(0.0, h),
            bottom_right: Point2::new(w, h),
        }
    }

    /// `[top_left, top_right, bottom_left, bottom_right]`.
    pub fn as_array(&self) -> [Point2<f64>; 4] {
        [
            self.top_left,
            self.top_right,
            self.bottom_left,
            self.bottom_right,
        ]
    }
}

impl Grid {
    pub fn rows(&self) -> &[Vec<Point2<f64>>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cols(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// `None` for an empty grid.
    pub fn corners(&self) -> Option<GridCorners> {
        let first = self.rows.first()?;
        let last = self.rows.last()?;
        Some(GridCorners {
            top_left: *first.first()?,
            top_right: *first.last()?,
            bottom_left: *last.first()?,
            bottom_right: *last.last()?,
        })
    }
}

/// Split points into rows.
///
/// Points are stably sorted by `y`; a new row starts whenever the gap to the
/// previous point exceeds `row_separation`. Each row is then sorted by `x`.
pub fn group_rows(points: &[Point2<f64>], row_separation: f64) -> Vec<Vec<Point2<f64>>> {
    let mut sorted = points.to_vec();
    sorted.sort_by(|a, b| a.y.total_cmp(&b.y));

    let mut rows: Vec<Vec<Point2<f64>>> = Vec::new();
    let mut current: Vec<Point2<f64>> = Vec::new();
    for p in sorted {
        if let Some(prev) = current.last() {
            if p.y - prev.y > row_separation {
                rows.push(std::mem::take(&mut current));
            }
        }
        current.push(p);
    }
    if !current.is_empty() {
        rows.push(current);
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
    }
    rows
}

/// Trim every row to the shortest row length with a centered window.
///
/// With `center = len / 2` and `half = shortest / 2` the kept range is
/// `center - half .. center - half + shortest`, so odd remainders drop the
/// extra point on the right.
pub fn trim_rows(rows: Vec<Vec<Point2<f64>>>) -> Vec<Vec<Point2<f64>>> {
    let Some(shortest) = rows.iter().map(Vec::len).min() else {
        return rows;
    };
    let half = shortest / 2;
    rows.into_iter()
        .map(|row| {
            let start = row.len() / 2 - half;
            row[start..start + shortest].to_vec()
        })
        .collect()
}

/// Group, trim and validate intersection points into a [`Grid`].
///
/// Fails with [`GridDetectError::InsufficientGeometry`] when fewer than four
/// points are given or the trimmed grid has fewer than two rows or columns.
pub fn extract_grid(points: &[Point2<f64>], params: &GridParams) -> Result<Grid, GridDetectError> {
    require(Stage::Intersections, points.len(), 4)?;

    let rows = trim_rows(group_rows(points, params.row_separation));
    let grid = Grid { rows };
    debug!(
        "grid {}x{} from {} points",
        grid.cols(),
        grid.row_count(),
        points.len()
    );

    require(Stage::Rows, grid.row_count(), 2)?;
    require(Stage::Columns, grid.cols(), 2)?;
    Ok(grid)
}

fn require(stage: Stage, found: usize, required: usize) -> Result<(), GridDetectError> {
    if found < required {
        warn!("not enough {stage}: found {found}, need {required}");
        return Err(GridDetectError::InsufficientGeometry {
            stage,
            found,
            required,
        });
    }
    Ok(())
}
