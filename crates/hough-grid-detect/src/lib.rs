//! Rectangular grid recovery by Hough line voting.
//!
//! The pipeline run by [`GridDetector`]:
//!
//! 1. blur the luminance matrix and extract an edge/binary matrix
//!    ([`EdgeExtractor`]: clamped gradient or adaptive threshold),
//! 2. vote every edge pixel into a [`HoughAccumulator`],
//! 3. keep lines with a greedy scan-order suppression ([`cluster_lines`]),
//! 4. intersect every pair of lines and drop near-duplicates
//!    ([`accumulate_intersections`]),
//! 5. group the points into rows and trim them to a rectangle ([`extract_grid`]),
//! 6. solve the homography from the four grid corners onto a canonical grid.
//!
//! Both suppression steps are first-come-first-kept, so results depend on
//! scan order; the order is fixed and documented on each function.
//!
//! ## Quickstart
//!
//! ```
//! use hough_grid_core::Matrix;
//! use hough_grid_detect::{GridDetector, GridDetectorParams};
//!
//! // dark lattice on a bright background
//! let lum = Matrix::from_fn(200, 200, |x, y| {
//!     if x % 50 == 25 || y % 50 == 25 { 0.0 } else { 255.0 }
//! });
//! let detector = GridDetector::new(GridDetectorParams::default());
//! match detector.detect(&lum) {
//!     Ok(found) => println!("grid {}x{}", found.grid.cols(), found.grid.row_count()),
//!     Err(e) => println!("no grid: {e}"),
//! }
//! ```

mod detector;
mod error;
mod grid;
mod hough;
mod intersect;
mod lines;
mod params;

pub use detector::{GridDetection, GridDetector, LineDetection, MIN_INPUT_SIZE};
pub use error::{GridDetectError, Stage};
pub use grid::{extract_grid, group_rows, trim_rows, Grid, GridCorners};
pub use hough::{diagonal_length, HoughAccumulator, THETA_BINS};
pub use intersect::{accumulate_intersections, find_intersections, intersect, PARALLEL_EPS};
pub use lines::{cluster_lines, HoughLine, LineSegment};
pub use params::{
    EdgeExtractor, GridDetectorParams, GridParams, IntersectionParams, LineClusterParams,
};
