//! Adaptive (local Gaussian mean) thresholding.
//!
//! A pixel is foreground when it is darker than its weighted neighborhood
//! by more than `offset`; thin dark grid lines on a bright target come out as
//! 255, everything else as 0. A half-window border is dropped on every side.

use crate::Matrix;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Value written for foreground pixels.
pub const FOREGROUND: f64 = 255.0;

/// Invalid filter configuration.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("window size must be odd and positive, got {size}")]
    EvenWindow { size: usize },
    #[error("gaussian spread must be positive and finite, got {sigma}")]
    NonPositiveSigma { sigma: f64 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdaptiveThresholdParams {
    /// Side of the square averaging window (odd).
    pub window_size: usize,
    /// Gaussian spread of the window weights.
    pub sigma: f64,
    /// Subtracted from the local mean; larger values make the test stricter.
    pub offset: f64,
}

impl Default for AdaptiveThresholdParams {
    fn default() -> Self {
        Self {
            window_size: 15,
            sigma: 2.0,
            offset: 3.0,
        }
    }
}

impl AdaptiveThresholdParams {
    pub fn validate(&self) -> Result<(), FilterError> {
        if self.window_size % 2 == 0 {
            return Err(FilterError::EvenWindow {
                size: self.window_size,
            });
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(FilterError::NonPositiveSigma { sigma: self.sigma });
        }
        Ok(())
    }
}

/// Row-major `size × size` Gaussian weights normalized to sum 1.
pub fn gaussian_window(size: usize, sigma: f64) -> Result<Vec<f64>, FilterError> {
    AdaptiveThresholdParams {
        window_size: size,
        sigma,
        offset: 0.0,
    }
    .validate()?;

    let half = (size / 2) as f64;
    let two_s2 = 2.0 * sigma * sigma;
    let scale = 1.0 / (PI * two_s2);
    let mut weights = Vec::with_capacity(size * size);
    for y in 0..size {
        for x in 0..size {
            let dx = x as f64 - half;
            let dy = y as f64 - half;
            weights.push(scale * (-(dx * dx + dy * dy) / two_s2).exp());
        }
    }

    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }
    Ok(weights)
}

/// Binarize `src` against its Gaussian-weighted local mean.
///
/// The output is `(width - 2h) × (height - 2h)` with `h = window_size / 2`;
/// output `(x, y)` corresponds to input `(x + h, y + h)`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, params), fields(width = src.width(), height = src.height()))
)]
pub fn adaptive_threshold(
    src: &Matrix,
    params: &AdaptiveThresholdParams,
) -> Result<Matrix, FilterError> {
    let kernel = gaussian_window(params.window_size, params.sigma)?;
    let size = params.window_size;
    let half = size / 2;

    let out_w = src.width().saturating_sub(2 * half);
    let out_h = src.height().saturating_sub(2 * half);
    if out_w == 0 || out_h == 0 {
        return Ok(Matrix::new(0, 0));
    }

    Ok(Matrix::from_fn(out_w, out_h, |ox, oy| {
        // window rows oy..oy+size, cols ox..ox+size; center at (ox+half, oy+half)
        let mut mean = 0.0;
        for (ky, krow) in kernel.chunks_exact(size).enumerate() {
            let row = &src.row(oy + ky)[ox..ox + size];
            for (w, v) in krow.iter().zip(row) {
                mean += w * v;
            }
        }
        if src.get(ox + half, oy + half) < mean - params.offset {
            FOREGROUND
        } else {
            0.0
        }
    }))
}
