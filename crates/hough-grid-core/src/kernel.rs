use serde::{Deserialize, Serialize};

/// 3×3 correlation kernel, indexed `weights[row][col]` with the center at `[1][1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Kernel3 {
    pub weights: [[f64; 3]; 3],
    /// Divide every weight by the weight sum before applying.
    #[serde(default)]
    pub normalize: bool,
}

impl Kernel3 {
    /// Binomial smoothing kernel, weight sum 16.
    pub const BLUR: Kernel3 = Kernel3 {
        weights: [[1.0, 2.0, 1.0], [2.0, 4.0, 2.0], [1.0, 2.0, 1.0]],
        normalize: true,
    };

    /// Sobel horizontal derivative.
    pub const SOBEL_X: Kernel3 = Kernel3 {
        weights: [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]],
        normalize: false,
    };

    /// Sobel vertical derivative.
    pub const SOBEL_Y: Kernel3 = Kernel3 {
        weights: [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]],
        normalize: false,
    };

    pub const fn new(weights: [[f64; 3]; 3]) -> Self {
        Self {
            weights,
            normalize: false,
        }
    }

    pub const fn normalized(self) -> Self {
        Self {
            weights: self.weights,
            normalize: true,
        }
    }

    pub fn weight_sum(&self) -> f64 {
        self.weights.iter().flatten().sum()
    }

    /// Weights as applied by the convolution engine.
    ///
    /// Normalization divides by the raw weight sum; zero-sum kernels (derivatives)
    /// fall back to the sum of absolute weights.
    pub fn effective_weights(&self) -> [[f64; 3]; 3] {
        if !self.normalize {
            return self.weights;
        }
        let mut norm = self.weight_sum();
        if norm == 0.0 {
            norm = self.weights.iter().flatten().map(|w| w.abs()).sum();
        }
        if norm == 0.0 {
            return self.weights;
        }
        self.weights.map(|row| row.map(|w| w / norm))
    }
}

impl Default for Kernel3 {
    fn default() -> Self {
        Self::BLUR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blur_kernel_normalizes_by_sixteen() {
        assert_eq!(Kernel3::BLUR.weight_sum(), 16.0);
        let w = Kernel3::BLUR.effective_weights();
        assert_eq!(w[1][1], 0.25);
        assert_eq!(w[0][0], 1.0 / 16.0);
        let sum: f64 = w.iter().flatten().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_sum_kernel_normalizes_by_absolute_weights() {
        let w = Kernel3::SOBEL_X.normalized().effective_weights();
        assert_eq!(w[1][2], 0.25);
        assert_eq!(w[0][0], -0.125);
    }

    #[test]
    fn unnormalized_kernels_are_applied_verbatim() {
        assert_eq!(
            Kernel3::SOBEL_Y.effective_weights(),
            Kernel3::SOBEL_Y.weights
        );
    }
}
