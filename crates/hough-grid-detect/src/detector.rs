use crate::error::{GridDetectError, Stage};
use crate::grid::{extract_grid, Grid, GridCorners};
use crate::hough::HoughAccumulator;
use crate::intersect::accumulate_intersections;
use crate::lines::{cluster_lines, HoughLine};
use crate::params::GridDetectorParams;
use hough_grid_core::{blur, homography_from_4pt, Homography, Matrix};
use log::debug;
use nalgebra::Point2;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Smallest luminance input the filters accept.
pub const MIN_INPUT_SIZE: usize = 3;

/// Output of the line stage.
///
/// Line and point coordinates are in edge-matrix space; add `edge_offset`
/// to map them back onto the luminance input.
#[derive(Clone, Debug)]
pub struct LineDetection {
    pub edges: Matrix,
    pub edge_offset: usize,
    /// Accumulator rho offset, needed to interpret [`HoughLine::rho`].
    pub diagonal: usize,
    pub lines: Vec<HoughLine>,
    /// Intersections accepted so far, including any carried in by the caller.
    pub intersections: Vec<Point2<f64>>,
}

/// Full pipeline output: lines, grid and the homography onto the canonical grid.
#[derive(Clone, Debug)]
pub struct GridDetection {
    pub edges: Matrix,
    pub edge_offset: usize,
    pub diagonal: usize,
    pub lines: Vec<HoughLine>,
    pub intersections: Vec<Point2<f64>>,
    pub grid: Grid,
    pub corners: GridCorners,
    pub target_corners: GridCorners,
    /// Maps edge-matrix coordinates to canonical grid coordinates.
    pub homography: Homography,
}

impl LineDetection {
    /// Map an edge-matrix point to luminance-input coordinates.
    pub fn to_input(&self, p: Point2<f64>) -> Point2<f64> {
        let o = self.edge_offset as f64;
        Point2::new(p.x + o, p.y + o)
    }
}

/// Unified grid pipeline: blur, edge extraction, Hough voting, line
/// clustering, intersections, grid trimming and the four-corner homography.
///
/// The detector holds only configuration. State carried between runs (the
/// accepted intersections) is passed in and returned explicitly.
#[derive(Clone, Debug, Default)]
pub struct GridDetector {
    params: GridDetectorParams,
}

impl GridDetector {
    pub fn new(params: GridDetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GridDetectorParams {
        &self.params
    }

    /// Blur the luminance matrix and run the configured edge extractor.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, luminance), fields(width = luminance.width(), height = luminance.height()))
    )]
    pub fn extract_edges(&self, luminance: &Matrix) -> Result<Matrix, GridDetectError> {
        luminance.ensure_min_size(MIN_INPUT_SIZE)?;
        let blurred = blur(luminance, &self.params.blur);
        let edges = self.params.extractor.extract(&blurred)?;
        debug!(
            "edges {}x{} with {} active cells",
            edges.width(),
            edges.height(),
            edges.count_nonzero()
        );
        Ok(edges)
    }

    /// Edge extraction, voting, clustering and intersections, starting from
    /// an empty intersection list.
    pub fn detect_lines(&self, luminance: &Matrix) -> Result<LineDetection, GridDetectError> {
        self.detect_lines_with(luminance, Vec::new())
    }

    /// Like [`Self::detect_lines`], extending `prior` with the new intersections.
    pub fn detect_lines_with(
        &self,
        luminance: &Matrix,
        prior: Vec<Point2<f64>>,
    ) -> Result<LineDetection, GridDetectError> {
        let edges = self.extract_edges(luminance)?;
        let mut out = self.lines_from_edges(edges, prior);
        out.edge_offset = self.params.extractor.input_offset();
        Ok(out)
    }

    /// Line stage on a ready-made edge matrix (`edge_offset` is 0).
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, edges, prior), fields(width = edges.width(), height = edges.height(), prior = prior.len()))
    )]
    pub fn lines_from_edges(&self, edges: Matrix, prior: Vec<Point2<f64>>) -> LineDetection {
        let acc = HoughAccumulator::from_edges(&edges);
        debug!(
            "accumulator {}x{}, max votes {}",
            acc.rho_bins(),
            acc.theta_bins(),
            acc.max_votes()
        );
        let lines = cluster_lines(&acc, &self.params.lines);
        let intersections = accumulate_intersections(
            &lines,
            acc.diagonal(),
            edges.width(),
            edges.height(),
            &self.params.intersections,
            prior,
        );
        LineDetection {
            edges,
            edge_offset: 0,
            diagonal: acc.diagonal(),
            lines,
            intersections,
        }
    }

    /// Run the whole pipeline on a luminance matrix.
    pub fn detect(&self, luminance: &Matrix) -> Result<GridDetection, GridDetectError> {
        self.detect_with(luminance, Vec::new())
    }

    /// Run the whole pipeline, seeding intersection dedup with `prior`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, luminance, prior), fields(width = luminance.width(), height = luminance.height()))
    )]
    pub fn detect_with(
        &self,
        luminance: &Matrix,
        prior: Vec<Point2<f64>>,
    ) -> Result<GridDetection, GridDetectError> {
        let lines = self.detect_lines_with(luminance, prior)?;
        self.fit_grid(lines)
    }

    /// Run the line and grid stages on a ready-made edge matrix.
    pub fn detect_from_edges(
        &self,
        edges: Matrix,
        prior: Vec<Point2<f64>>,
    ) -> Result<GridDetection, GridDetectError> {
        self.fit_grid(self.lines_from_edges(edges, prior))
    }

    /// Grid and homography stages on an existing line detection.
    pub fn fit_grid(&self, found: LineDetection) -> Result<GridDetection, GridDetectError> {
        let grid = extract_grid(&found.intersections, &self.params.grid)?;
        let corners = grid
            .corners()
            .ok_or(GridDetectError::InsufficientGeometry {
                stage: Stage::Rows,
                found: grid.row_count(),
                required: 2,
            })?;
        let target_corners =
            GridCorners::canonical(grid.cols(), grid.row_count(), self.params.grid.cell_size);
        let homography = homography_from_4pt(&corners.as_array(), &target_corners.as_array())?;
        debug!(
            "{} lines, {} intersections, grid {}x{}",
            found.lines.len(),
            found.intersections.len(),
            grid.cols(),
            grid.row_count()
        );

        Ok(GridDetection {
            edges: found.edges,
            edge_offset: found.edge_offset,
            diagonal: found.diagonal,
            lines: found.lines,
            intersections: found.intersections,
            grid,
            corners,
            target_corners,
            homography,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::EdgeExtractor;
    use approx::assert_abs_diff_eq;
    use hough_grid_core::MatrixError;

    fn lattice_edges(size: usize, at: &[usize]) -> Matrix {
        Matrix::from_fn(size, size, |x, y| {
            if at.contains(&x) || at.contains(&y) {
                255.0
            } else {
                0.0
            }
        })
    }

    #[test]
    fn rejects_inputs_below_three_pixels() {
        let det = GridDetector::default();
        let err = det.detect(&Matrix::new(2, 10)).unwrap_err();
        assert_eq!(
            err,
            GridDetectError::InvalidInput(MatrixError::TooSmall {
                width: 2,
                height: 10,
                min: 3
            })
        );
    }

    #[test]
    fn invalid_extractor_parameters_surface_as_filter_errors() {
        let mut params = GridDetectorParams::default();
        if let EdgeExtractor::AdaptiveThreshold(p) = &mut params.extractor {
            p.window_size = 4;
        }
        let err = GridDetector::new(params)
            .detect_lines(&Matrix::new(40, 40))
            .unwrap_err();
        assert!(matches!(err, GridDetectError::Filter(_)));
    }

    #[test]
    fn blank_image_reports_missing_intersections() {
        let det = GridDetector::default();
        let found = det.detect_lines(&Matrix::from_fn(50, 50, |_, _| 255.0)).expect("lines");
        assert!(found.lines.is_empty());
        assert!(found.intersections.is_empty());

        let err = det.detect(&Matrix::from_fn(50, 50, |_, _| 255.0)).unwrap_err();
        assert!(matches!(
            err,
            GridDetectError::InsufficientGeometry {
                stage: Stage::Intersections,
                found: 0,
                ..
            }
        ));
    }

    #[test]
    fn recovers_grid_from_edge_lattice() {
        let edges = lattice_edges(400, &[100, 200, 300]);
        let det = GridDetector::default();
        let out = det.detect_from_edges(edges, Vec::new()).expect("grid");

        assert_eq!(out.diagonal, 565);
        assert_eq!(out.lines.len(), 6);
        assert_eq!(out.intersections.len(), 9);
        assert_eq!((out.grid.cols(), out.grid.row_count()), (3, 3));
        assert_eq!(out.edge_offset, 0);

        let src = out.corners.as_array();
        let dst = out.target_corners.as_array();
        assert_eq!(dst[3], Point2::new(96.0, 96.0));
        for (s, d) in src.iter().zip(dst.iter()) {
            let m = out.homography.apply(*s);
            assert_abs_diff_eq!(m.x, d.x, epsilon = 1e-6);
            assert_abs_diff_eq!(m.y, d.y, epsilon = 1e-6);
        }
        assert_abs_diff_eq!(out.homography.h[(0, 0)], 0.48, epsilon = 1e-9);
        assert_abs_diff_eq!(out.homography.h[(0, 2)], -48.0, epsilon = 1e-6);
    }

    #[test]
    fn prior_intersections_are_threaded_through() {
        let det = GridDetector::default();
        let first = det.lines_from_edges(lattice_edges(400, &[100, 200, 300]), Vec::new());
        assert_eq!(first.intersections.len(), 9);

        let again = det.lines_from_edges(
            lattice_edges(400, &[100, 200, 300]),
            first.intersections.clone(),
        );
        assert_eq!(again.intersections, first.intersections);

        let fresh = det.lines_from_edges(lattice_edges(400, &[100, 200, 300]), Vec::new());
        assert_eq!(fresh.intersections, first.intersections);
    }

    #[test]
    fn to_input_adds_edge_offset() {
        let found = LineDetection {
            edges: Matrix::new(0, 0),
            edge_offset: 8,
            diagonal: 0,
            lines: Vec::new(),
            intersections: Vec::new(),
        };
        assert_eq!(found.to_input(Point2::new(1.0, 2.0)), Point2::new(9.0, 10.0));
    }
}
