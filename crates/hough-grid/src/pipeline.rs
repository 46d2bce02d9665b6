use crate::{core, detect};
use ::image::{DynamicImage, ImageBuffer, Luma};
use std::path::{Path, PathBuf};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Errors produced by the image-level helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("failed to read image {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error("failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: ::image::ImageError,
    },

    #[error(transparent)]
    Matrix(#[from] core::MatrixError),

    #[error(transparent)]
    Grid(#[from] detect::GridDetectError),
}

/// Borrow an `image::GrayImage` as the core view type.
pub fn gray_view(img: &::image::GrayImage) -> core::GrayImageView<'_> {
    core::GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

/// Luminance matrix of a decoded image.
///
/// 8-bit grayscale is used as-is; every other pixel format goes through RGB
/// and the BT.601 weights.
pub fn luminance_from_image(img: &DynamicImage) -> Result<core::Matrix, DetectError> {
    if let DynamicImage::ImageLuma8(gray) = img {
        return Ok(core::matrix_from_gray(&gray_view(gray))?);
    }
    let rgb = img.to_rgb8();
    let (w, h) = rgb.dimensions();
    Ok(core::luminance_from_rgb(
        w as usize,
        h as usize,
        rgb.as_raw(),
    )?)
}

/// Decode an image file and convert it to luminance.
pub fn load_luminance(path: impl AsRef<Path>) -> Result<core::Matrix, DetectError> {
    let path = path.as_ref();
    let img = ::image::open(path).map_err(|source| DetectError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    luminance_from_image(&img)
}

/// Round and clamp a matrix into an 8-bit grayscale image.
pub fn matrix_to_image(m: &core::Matrix) -> ::image::GrayImage {
    let gray = m.to_gray_u8();
    ImageBuffer::from_fn(gray.width as u32, gray.height as u32, |x, y| {
        Luma([gray.data[y as usize * gray.width + x as usize]])
    })
}

/// Save an edge/binary matrix as an 8-bit image; the format follows the extension.
pub fn save_matrix(m: &core::Matrix, path: impl AsRef<Path>) -> Result<(), DetectError> {
    let path = path.as_ref();
    matrix_to_image(m)
        .save(path)
        .map_err(|source| DetectError::Write {
            path: path.to_path_buf(),
            source,
        })
}

/// Run the grid pipeline on a decoded image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, params), fields(width = img.width(), height = img.height()))
)]
pub fn detect_image(
    img: &DynamicImage,
    params: detect::GridDetectorParams,
) -> Result<detect::GridDetection, DetectError> {
    let lum = luminance_from_image(img)?;
    Ok(detect::GridDetector::new(params).detect(&lum)?)
}

/// Decode `path` and run the grid pipeline on it.
pub fn detect_path(
    path: impl AsRef<Path>,
    params: detect::GridDetectorParams,
) -> Result<detect::GridDetection, DetectError> {
    let lum = load_luminance(path)?;
    Ok(detect::GridDetector::new(params).detect(&lum)?)
}
