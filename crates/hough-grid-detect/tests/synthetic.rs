use approx::assert_abs_diff_eq;
use hough_grid_core::{luminance_from_rgba, Matrix};
use hough_grid_detect::{
    EdgeExtractor, GridDetectError, GridDetector, GridDetectorParams, LineClusterParams, Stage,
};
use nalgebra::Point2;

const SIZE: usize = 400;

/// One-pixel dark lines on white at the given rows and columns.
fn dark_lattice(size: usize, at: &[usize]) -> Matrix {
    Matrix::from_fn(size, size, |x, y| {
        if at.contains(&x) || at.contains(&y) {
            0.0
        } else {
            255.0
        }
    })
}

fn detector(extractor: EdgeExtractor) -> GridDetector {
    GridDetector::new(GridDetectorParams {
        extractor,
        lines: LineClusterParams {
            vote_threshold: 300,
            ..LineClusterParams::default()
        },
        ..GridDetectorParams::default()
    })
}

fn assert_maps_corners(found: &hough_grid_detect::GridDetection) {
    for (s, d) in found
        .corners
        .as_array()
        .iter()
        .zip(found.target_corners.as_array().iter())
    {
        let m = found.homography.apply(*s);
        assert_abs_diff_eq!(m.x, d.x, epsilon = 1e-6);
        assert_abs_diff_eq!(m.y, d.y, epsilon = 1e-6);
    }
}

#[test]
fn adaptive_pipeline_recovers_three_by_three_grid() {
    let lum = dark_lattice(SIZE, &[100, 200, 300]);
    let found = detector(EdgeExtractor::default())
        .detect(&lum)
        .expect("grid detected");

    assert_eq!(found.edges.width(), 383);
    assert_eq!(found.edge_offset, 8);
    assert_eq!(found.lines.len(), 6);
    assert!(found.lines.iter().all(|l| l.theta == 0 || l.theta == 90));
    assert_eq!(found.intersections.len(), 9);
    assert_eq!((found.grid.cols(), found.grid.row_count()), (3, 3));

    let tl = found.corners.top_left;
    let br = found.corners.bottom_right;
    assert!((90.0..=94.0).contains(&tl.x), "top-left {tl:?}");
    assert!((290.0..=294.0).contains(&br.y), "bottom-right {br:?}");
    assert_eq!(found.target_corners.bottom_right, Point2::new(96.0, 96.0));
    assert_maps_corners(&found);
}

#[test]
fn gradient_pipeline_recovers_three_by_three_grid() {
    let lum = dark_lattice(SIZE, &[100, 200, 300]);
    let found = detector(EdgeExtractor::sobel())
        .detect(&lum)
        .expect("grid detected");

    assert_eq!(found.edges.width(), 394);
    assert_eq!(found.edge_offset, 2);
    assert!(found
        .edges
        .data()
        .iter()
        .all(|&v| (0.0..=255.0).contains(&v)));
    assert_eq!(found.intersections.len(), 9);
    assert_eq!((found.grid.cols(), found.grid.row_count()), (3, 3));
    assert_maps_corners(&found);
}

#[test]
fn intersections_accumulate_across_runs() {
    let det = detector(EdgeExtractor::default());

    let first = det
        .detect_lines(&dark_lattice(SIZE, &[100, 200, 300]))
        .expect("first run");
    assert_eq!(first.intersections.len(), 9);

    // a 3 px shift lands every new point inside the dedup radius
    let nudged = det
        .detect_lines_with(
            &dark_lattice(SIZE, &[103, 203, 303]),
            first.intersections.clone(),
        )
        .expect("second run");
    assert_eq!(nudged.intersections, first.intersections);

    // half a cell away everything is new
    let shifted = det
        .detect_lines_with(&dark_lattice(SIZE, &[150, 250]), first.intersections.clone())
        .expect("third run");
    assert_eq!(shifted.intersections.len(), 9 + 4);
    assert_eq!(&shifted.intersections[..9], &first.intersections[..]);
}

#[test]
fn rgba_buffer_feeds_the_pipeline() {
    let lum = dark_lattice(SIZE, &[100, 200, 300]);
    let rgba: Vec<u8> = lum
        .data()
        .iter()
        .flat_map(|&v| {
            let c = v as u8;
            [c, c, c, 255]
        })
        .collect();
    let from_rgba = luminance_from_rgba(SIZE, SIZE, &rgba).expect("buffer size");
    for (a, b) in from_rgba.data().iter().zip(lum.data()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }

    let found = detector(EdgeExtractor::default())
        .detect(&from_rgba)
        .expect("grid detected");
    assert_eq!((found.grid.cols(), found.grid.row_count()), (3, 3));
}

#[test]
fn single_line_is_insufficient() {
    let lum = Matrix::from_fn(SIZE, SIZE, |x, _| if x == 200 { 0.0 } else { 255.0 });
    let err = detector(EdgeExtractor::default())
        .detect(&lum)
        .unwrap_err();
    assert_eq!(
        err,
        GridDetectError::InsufficientGeometry {
            stage: Stage::Intersections,
            found: 0,
            required: 4
        }
    );
}
