use hough_grid_core::{
    adaptive_threshold, gradient_magnitude, AdaptiveThresholdParams, FilterError, Kernel3, Matrix,
};
use serde::{Deserialize, Serialize};

fn sobel_x() -> Kernel3 {
    Kernel3::SOBEL_X
}

fn sobel_y() -> Kernel3 {
    Kernel3::SOBEL_Y
}

/// How the blurred luminance matrix is turned into an edge/binary matrix.
///
/// Any non-zero output cell is an edge pixel for the Hough transform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EdgeExtractor {
    /// Clamped gradient magnitude from a pair of derivative kernels.
    Gradient {
        #[serde(default = "sobel_x")]
        kernel_x: Kernel3,
        #[serde(default = "sobel_y")]
        kernel_y: Kernel3,
    },
    /// Local Gaussian-mean binarization (dark lines become 255).
    AdaptiveThreshold(AdaptiveThresholdParams),
}

impl EdgeExtractor {
    pub fn sobel() -> Self {
        Self::Gradient {
            kernel_x: Kernel3::SOBEL_X,
            kernel_y: Kernel3::SOBEL_Y,
        }
    }

    pub fn extract(&self, blurred: &Matrix) -> Result<Matrix, FilterError> {
        match self {
            Self::Gradient { kernel_x, kernel_y } => {
                Ok(gradient_magnitude(blurred, kernel_x, kernel_y))
            }
            Self::AdaptiveThreshold(params) => adaptive_threshold(blurred, params),
        }
    }

    /// Offset of edge-matrix coordinates relative to the luminance input,
    /// counting the blur border.
    pub fn input_offset(&self) -> usize {
        match self {
            Self::Gradient { .. } => 2,
            Self::AdaptiveThreshold(params) => 1 + params.window_size / 2,
        }
    }
}

impl Default for EdgeExtractor {
    fn default() -> Self {
        Self::AdaptiveThreshold(AdaptiveThresholdParams::default())
    }
}

/// Greedy non-maximum suppression over accumulator cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineClusterParams {
    /// A cell is a candidate only if its votes strictly exceed this.
    pub vote_threshold: u32,
    /// Candidates closer than this in rho to an accepted line are dropped.
    pub rho_tolerance: usize,
    /// Candidates closer than this in theta (degrees) to an accepted line are dropped.
    pub theta_tolerance: usize,
}

impl Default for LineClusterParams {
    fn default() -> Self {
        Self {
            vote_threshold: 180,
            rho_tolerance: 10,
            theta_tolerance: 5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntersectionParams {
    /// Points closer than this (pixels) to an accepted intersection are dropped.
    pub dedup_radius: f64,
}

impl Default for IntersectionParams {
    fn default() -> Self {
        Self { dedup_radius: 10.0 }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    /// A y-gap larger than this between consecutive sorted points starts a new row.
    pub row_separation: f64,
    /// Side of one canonical grid cell in the homography target space.
    pub cell_size: f64,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            row_separation: 10.0,
            cell_size: 32.0,
        }
    }
}

/// Full pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridDetectorParams {
    /// Smoothing kernel applied to the luminance input.
    pub blur: Kernel3,
    pub extractor: EdgeExtractor,
    pub lines: LineClusterParams,
    pub intersections: IntersectionParams,
    pub grid: GridParams,
}
