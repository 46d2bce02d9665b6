//! Dense row-major matrix of `f64` samples.
//!
//! Every pipeline stage consumes a `Matrix` read-only and allocates a new one
//! for its output; nothing is filtered in place.

use crate::image::GrayImage;

/// Errors for malformed matrix input.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MatrixError {
    #[error("row {row} has {got} samples, expected {expected}")]
    NonRectangular {
        row: usize,
        expected: usize,
        got: usize,
    },
    #[error("buffer holds {got} values, expected {expected}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("matrix is {width}x{height}, need at least {min}x{min}")]
    TooSmall {
        width: usize,
        height: usize,
        min: usize,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Matrix {
    width: usize,
    height: usize,
    data: Vec<f64>, // row-major, len = w*h
}

impl Matrix {
    /// Zero-filled matrix.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Build a matrix by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_vec(width: usize, height: usize, data: Vec<f64>) -> Result<Self, MatrixError> {
        if data.len() != width * height {
            return Err(MatrixError::LengthMismatch {
                expected: width * height,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build a matrix from nested rows. All rows must have the same length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, MatrixError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(width * height);
        for (row, r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != width {
                return Err(MatrixError::NonRectangular {
                    row,
                    expected: width,
                    got: r.len(),
                });
            }
            data.extend_from_slice(r);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.data[y * self.width + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: f64) {
        self.data[y * self.width + x] = value;
    }

    #[inline]
    pub fn row(&self, y: usize) -> &[f64] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        // chunks_exact panics on 0; an empty matrix simply has no rows.
        self.data.chunks_exact(self.width.max(1))
    }

    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.rows().map(<[f64]>::to_vec).collect()
    }

    /// Number of non-zero cells (edge pixels for edge/binary matrices).
    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0.0).count()
    }

    /// Fail unless both dimensions are at least `min`.
    pub fn ensure_min_size(&self, min: usize) -> Result<(), MatrixError> {
        if self.width < min || self.height < min {
            return Err(MatrixError::TooSmall {
                width: self.width,
                height: self.height,
                min,
            });
        }
        Ok(())
    }

    /// Round and clamp every sample into `[0, 255]` for display.
    pub fn to_gray_u8(&self) -> GrayImage {
        GrayImage {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .map(|v| v.round().clamp(0.0, 255.0) as u8)
                .collect(),
        }
    }
}
