use crate::{Matrix, MatrixError};

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

/// ITU-R BT.601 luma. No clamping: later stages work on real values.
#[inline]
pub fn luminance(r: f64, g: f64, b: f64) -> f64 {
    0.299 * r + 0.587 * g + 0.114 * b
}

fn luminance_interleaved(
    width: usize,
    height: usize,
    data: &[u8],
    channels: usize,
) -> Result<Matrix, MatrixError> {
    let expected = width * height * channels;
    if data.len() != expected {
        return Err(MatrixError::LengthMismatch {
            expected,
            got: data.len(),
        });
    }
    let values = data
        .chunks_exact(channels)
        .map(|px| luminance(px[0] as f64, px[1] as f64, px[2] as f64))
        .collect();
    Matrix::from_vec(width, height, values)
}

/// Luminance matrix from a packed 8-bit RGBA buffer (alpha ignored).
pub fn luminance_from_rgba(width: usize, height: usize, data: &[u8]) -> Result<Matrix, MatrixError> {
    luminance_interleaved(width, height, data, 4)
}

/// Luminance matrix from a packed 8-bit RGB buffer.
pub fn luminance_from_rgb(width: usize, height: usize, data: &[u8]) -> Result<Matrix, MatrixError> {
    luminance_interleaved(width, height, data, 3)
}

/// Lift an 8-bit grayscale view into a real-valued matrix.
pub fn matrix_from_gray(src: &GrayImageView<'_>) -> Result<Matrix, MatrixError> {
    let expected = src.width * src.height;
    if src.data.len() != expected {
        return Err(MatrixError::LengthMismatch {
            expected,
            got: src.data.len(),
        });
    }
    Matrix::from_vec(
        src.width,
        src.height,
        src.data.iter().map(|&v| v as f64).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn luminance_uses_bt601_weights() {
        assert_abs_diff_eq!(luminance(1.0, 0.0, 0.0), 0.299);
        assert_abs_diff_eq!(luminance(0.0, 1.0, 0.0), 0.587);
        assert_abs_diff_eq!(luminance(0.0, 0.0, 1.0), 0.114);
        assert_abs_diff_eq!(luminance(255.0, 255.0, 255.0), 255.0, epsilon = 1e-9);
        assert_abs_diff_eq!(
            luminance(10.0, 20.0, 30.0),
            0.299 * 10.0 + 0.587 * 20.0 + 0.114 * 30.0
        );
    }

    #[test]
    fn rgba_buffer_ignores_alpha() {
        let rgba = [255, 0, 0, 7, 0, 255, 0, 200];
        let m = luminance_from_rgba(2, 1, &rgba).expect("2x1");
        assert_abs_diff_eq!(m.get(0, 0), 0.299 * 255.0);
        assert_abs_diff_eq!(m.get(1, 0), 0.587 * 255.0);
    }

    #[test]
    fn rgb_buffer_length_is_checked() {
        let err = luminance_from_rgb(2, 2, &[0u8; 11]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::LengthMismatch {
                expected: 12,
                got: 11
            }
        );
    }

    #[test]
    fn gray_view_lifts_to_f64() {
        let data = [3, 250];
        let view = GrayImageView {
            width: 2,
            height: 1,
            data: &data,
        };
        let m = matrix_from_gray(&view).expect("matrix");
        assert_eq!(m.data(), &[3.0, 250.0]);

        let short = GrayImageView { height: 2, ..view };
        assert_eq!(
            matrix_from_gray(&short),
            Err(MatrixError::LengthMismatch {
                expected: 4,
                got: 2
            })
        );
    }
}
