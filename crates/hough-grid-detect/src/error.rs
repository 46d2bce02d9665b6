use hough_grid_core::{FilterError, MatrixError, SolveError};
use std::fmt;

/// Pipeline stage that ran out of geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Intersections,
    Rows,
    Columns,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Intersections => "intersections",
            Stage::Rows => "grid rows",
            Stage::Columns => "grid columns",
        })
    }
}

/// Errors returned by the grid detector.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GridDetectError {
    #[error("invalid input: {0}")]
    InvalidInput(#[from] MatrixError),
    #[error("edge extraction: {0}")]
    Filter(#[from] FilterError),
    #[error("insufficient geometry: {found} {stage}, need at least {required}")]
    InsufficientGeometry {
        stage: Stage,
        found: usize,
        required: usize,
    },
    #[error("homography solve failed: {0}")]
    Solve(#[from] SolveError),
}

impl GridDetectError {
    /// True when the homography system was singular, typically because the
    /// detected corners are collinear.
    pub fn is_singular(&self) -> bool {
        matches!(self, Self::Solve(SolveError::SingularSystem { .. }))
    }
}
