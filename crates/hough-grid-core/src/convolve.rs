//! 3×3 convolution engine plus the blur and gradient filters built on it.
//!
//! Output sizing: the engine evaluates centers `(x, y)` with
//! `1 <= x < width - 2` and `1 <= y < height - 2` and stores them at
//! `(x - 1, y - 1)`. The result is therefore `(width - 3) × (height - 3)`:
//! one column/row is dropped at the leading edge and two at the trailing edge.
//! Every neighborhood read stays inside the input. Inputs smaller than 3×3 in
//! either dimension produce an empty matrix.

use crate::{Kernel3, Matrix};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Output dimensions of [`convolve3`] for an input of `width × height`.
#[inline]
pub fn convolved_size(width: usize, height: usize) -> (usize, usize) {
    if width < 3 || height < 3 {
        return (0, 0);
    }
    (width - 3, height - 3)
}

/// Weighted sum of the 3×3 neighborhood around every interior cell.
pub fn convolve3(src: &Matrix, kernel: &Kernel3) -> Matrix {
    let (out_w, out_h) = convolved_size(src.width(), src.height());
    if out_w == 0 || out_h == 0 {
        return Matrix::new(0, 0);
    }

    let k = kernel.effective_weights();
    Matrix::from_fn(out_w, out_h, |ox, oy| {
        // (ox, oy) is the output cell of input center (ox + 1, oy + 1);
        // its window starts at input (ox, oy).
        let mut acc = 0.0;
        for (r, krow) in k.iter().enumerate() {
            let row = src.row(oy + r);
            for (c, &w) in krow.iter().enumerate() {
                acc += w * row[ox + c];
            }
        }
        acc
    })
}

/// Smooth with a (normally normalized) kernel, typically [`Kernel3::BLUR`].
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, kernel), fields(width = src.width(), height = src.height()))
)]
pub fn blur(src: &Matrix, kernel: &Kernel3) -> Matrix {
    convolve3(src, kernel)
}

/// Gradient magnitude `clamp(sqrt(gx² + gy²), 0, 255)`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(src, kx, ky), fields(width = src.width(), height = src.height()))
)]
pub fn gradient_magnitude(src: &Matrix, kx: &Kernel3, ky: &Kernel3) -> Matrix {
    let gx = convolve3(src, kx);
    let gy = convolve3(src, ky);
    Matrix::from_fn(gx.width(), gx.height(), |x, y| {
        let (dx, dy) = (gx.get(x, y), gy.get(x, y));
        (dx * dx + dy * dy).sqrt().clamp(0.0, 255.0)
    })
}

/// [`gradient_magnitude`] with the Sobel pair.
pub fn sobel_magnitude(src: &Matrix) -> Matrix {
    gradient_magnitude(src, &Kernel3::SOBEL_X, &Kernel3::SOBEL_Y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Matrix {
        Matrix::from_fn(width, height, |x, y| ((x * 37 + y * 91) % 256) as f64)
    }

    #[test]
    fn output_trims_one_leading_and_two_trailing() {
        for (w, h) in [(3, 3), (4, 3), (5, 7), (10, 4), (20, 20)] {
            let out = convolve3(&ramp(w, h), &Kernel3::BLUR);
            let (ew, eh) = convolved_size(w, h);
            assert_eq!((ew, eh), (w - 3, h - 3));
            if ew == 0 || eh == 0 {
                assert!(out.is_empty());
            } else {
                assert_eq!((out.width(), out.height()), (ew, eh));
            }
        }
    }

    #[test]
    fn tiny_inputs_give_empty_output() {
        assert!(convolve3(&ramp(2, 10), &Kernel3::BLUR).is_empty());
        assert!(convolve3(&ramp(10, 2), &Kernel3::BLUR).is_empty());
        assert!(convolve3(&Matrix::new(0, 0), &Kernel3::SOBEL_X).is_empty());
    }

    #[test]
    fn output_cell_reads_window_around_shifted_center() {
        let src = Matrix::from_fn(5, 5, |x, y| (y * 5 + x) as f64);
        let pick_top_left = Kernel3::new([[1.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]]);
        let pick_center = Kernel3::new([[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 0.0]]);
        let a = convolve3(&src, &pick_top_left);
        let b = convolve3(&src, &pick_center);
        assert_eq!(a.get(0, 0), src.get(0, 0));
        assert_eq!(b.get(0, 0), src.get(1, 1));
        assert_eq!(b.get(1, 1), src.get(2, 2));
    }

    #[test]
    fn blur_stays_within_window_range() {
        let src = ramp(16, 12);
        let out = blur(&src, &Kernel3::BLUR);
        for oy in 0..out.height() {
            for ox in 0..out.width() {
                let mut lo = f64::INFINITY;
                let mut hi = f64::NEG_INFINITY;
                for y in oy..oy + 3 {
                    for x in ox..ox + 3 {
                        lo = lo.min(src.get(x, y));
                        hi = hi.max(src.get(x, y));
                    }
                }
                let v = out.get(ox, oy);
                assert!(v >= lo - 1e-9 && v <= hi + 1e-9, "{v} outside [{lo}, {hi}]");
            }
        }
    }

    #[test]
    fn uniform_image_has_zero_gradient() {
        let src = Matrix::from_fn(9, 7, |_, _| 128.0);
        let g = sobel_magnitude(&src);
        assert_eq!((g.width(), g.height()), (6, 4));
        assert!(g.data().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn gradient_is_clamped_to_byte_range() {
        let src = Matrix::from_fn(12, 12, |x, y| if (x + y) % 2 == 0 { 0.0 } else { 255.0 });
        let g = sobel_magnitude(&src);
        assert!(g.data().iter().all(|&v| (0.0..=255.0).contains(&v)));
        let step = Matrix::from_fn(8, 8, |x, _| if x < 4 { 0.0 } else { 255.0 });
        let g = sobel_magnitude(&step);
        assert_eq!(g.get(2, 2), 255.0);
        assert_eq!(g.get(0, 0), 0.0);
    }
}
