//! High-level facade crate for the `hough-grid-*` workspace.
//!
//! This crate provides:
//! - re-exports of the numeric core and the grid detector
//! - (feature-gated) helpers that decode an image with the `image` crate,
//!   run the pipeline on its luminance and export the edge matrix for display.
//!
//! ## Quickstart
//!
//! ```no_run
//! use hough_grid::pipeline;
//! use hough_grid::GridDetectorParams;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let found = pipeline::detect_path("board.png", GridDetectorParams::default())?;
//! println!(
//!     "grid {}x{}, H = {:?}",
//!     found.grid.cols(),
//!     found.grid.row_count(),
//!     found.homography.to_array()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `hough_grid::core`: luminance matrices, 3×3 filters, adaptive threshold,
//!   Gauss-Jordan inverse and the four-point homography.
//! - `hough_grid::detect`: Hough accumulator, line clustering, intersections,
//!   grid trimming and the [`GridDetector`] pipeline.
//! - `hough_grid::pipeline` (feature `image`): image decoding and edge export.

pub use hough_grid_core as core;
pub use hough_grid_detect as detect;

pub use hough_grid_core::{Homography, Matrix};
pub use hough_grid_detect::{
    EdgeExtractor, GridDetectError, GridDetection, GridDetector, GridDetectorParams,
};

#[cfg(feature = "image")]
pub mod pipeline;
