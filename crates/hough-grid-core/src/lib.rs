//! Numeric building blocks for grid recovery from raster images.
//!
//! This crate is intentionally small and purely numeric. It knows nothing
//! about line detection; it provides the luminance [`Matrix`], 3×3 filtering
//! ([`convolve3`], [`blur`], [`gradient_magnitude`]), adaptive thresholding,
//! a Gauss-Jordan inverse and the four-point [`Homography`] solve.

mod binarize;
mod convolve;
mod homography;
mod image;
mod kernel;
mod linalg;
mod logger;
mod matrix;

pub use binarize::{
    adaptive_threshold, gaussian_window, AdaptiveThresholdParams, FilterError, FOREGROUND,
};
pub use convolve::{blur, convolve3, convolved_size, gradient_magnitude, sobel_magnitude};
pub use homography::{homography_from_4pt, homography_system, Homography};
pub use image::{
    luminance, luminance_from_rgb, luminance_from_rgba, matrix_from_gray, GrayImage,
    GrayImageView,
};
pub use kernel::Kernel3;
pub use linalg::{invert, solve, SolveError, RELATIVE_PIVOT_EPS};
pub use matrix::{Matrix, MatrixError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
