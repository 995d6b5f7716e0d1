//! Board presence classification and piece localization on the normalized
//! board image: edge preprocessing, quadrilateral cell counting, and Hough
//! circle detection for the pieces.

pub mod annotate;
mod hough;
mod preprocess;
mod tunables;

pub use hough::{hough_circles, DetectedCircle, HoughParams};
pub use preprocess::{edge_mask, laplacian_abs, morph_gradient_5x5, threshold_binary};
pub use tunables::Tunables;

use chesseye_core::{
    approx_polygon, centroid, contour_area, find_contours, perimeter, GrayImage, Point2i, RgbImage,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Square-count band for a fully visible board: a standard board exposes 64
/// cells, with a +-3 tolerance for noise. Exclusive on both ends.
pub const FULL_BAND: (usize, usize) = (63, 67);
/// Square-count band for a partially visible board. Exclusive on both ends,
/// checked only after the full band. Empirically tuned; keep as is.
pub const PARTIAL_BAND: (usize, usize) = (10, 64);

/// Classifier configuration.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ClassifyParams {
    /// Binary threshold cutoff for the edge stage (operator tunable, 0-255).
    pub threshold: u8,
    /// Minimum contour area for a counted cell (operator tunable).
    pub min_square_area: f64,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub square_simplify_tol: f64,
    /// Piece circle detector tuning.
    pub hough: HoughParams,
}

impl Default for ClassifyParams {
    fn default() -> Self {
        Self {
            threshold: 228,
            min_square_area: 300.0,
            square_simplify_tol: 0.15,
            hough: HoughParams::default(),
        }
    }
}

/// How much of the board the current frame shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    Full,
    Partial,
    None,
}

impl Presence {
    /// Band classification; the full band wins when both would match.
    pub fn from_square_count(n: usize) -> Self {
        if n > FULL_BAND.0 && n < FULL_BAND.1 {
            Presence::Full
        } else if n > PARTIAL_BAND.0 && n < PARTIAL_BAND.1 {
            Presence::Partial
        } else {
            Presence::None
        }
    }

    /// Human-readable caption for the annotated frame.
    pub fn caption(&self) -> &'static str {
        match self {
            Presence::Full => "Chess board detected",
            Presence::Partial => "Chess board partially detected",
            Presence::None => "Can't see the board",
        }
    }
}

/// A counted board cell.
#[derive(Clone, Debug)]
pub struct DetectedSquare {
    pub outline: Vec<Point2i>,
    pub center: Point2<f32>,
    pub area: f64,
}

/// Per-cycle classification result.
#[derive(Clone, Debug)]
pub struct Classification {
    pub presence: Presence,
    pub square_count: usize,
    pub circle_count: usize,
    pub squares: Vec<DetectedSquare>,
    pub circles: Vec<DetectedCircle>,
    /// Color frame with cell outlines and piece markers drawn in.
    pub annotated: RgbImage,
    /// Intermediate edge mask, useful as a diagnostic view.
    pub edges: GrayImage,
}

/// Classify a normalized board image.
///
/// Counts quadrilateral cell contours to decide between full, partial and no
/// board, and runs the piece circle detector only on a fully visible board.
pub fn classify(board: &RgbImage, params: &ClassifyParams) -> Classification {
    let gray = board.to_gray();
    let frame_area = (gray.width * gray.height) as f64;
    let max_square_area = frame_area / 10.0;

    let edges = edge_mask(&gray.as_view(), params.threshold);
    let contours = find_contours(&edges.as_view());

    let mut annotated = board.clone();
    let mut squares = Vec::new();

    for contour in &contours {
        let area = contour_area(&contour.points);
        if area <= params.min_square_area || area >= max_square_area {
            continue;
        }
        let peri = perimeter(&contour.points);
        let poly = approx_polygon(&contour.points, params.square_simplify_tol * peri);
        if poly.len() != 4 {
            continue;
        }
        // zero-mass contours cannot produce a centroid; skip, never fail
        let Some(center) = centroid(&contour.points) else {
            continue;
        };
        annotate::draw_contour(&mut annotated, &contour.points, annotate::SQUARE_OUTLINE);
        squares.push(DetectedSquare {
            outline: poly,
            center,
            area,
        });
    }

    let square_count = squares.len();
    let presence = Presence::from_square_count(square_count);

    let mut circles = Vec::new();
    if presence == Presence::Full {
        circles = hough_circles(&gray.as_view(), &params.hough);
        for c in &circles {
            annotate::draw_circle(
                &mut annotated,
                c.cx,
                c.cy,
                c.radius as i32,
                annotate::CIRCLE_OUTLINE,
            );
            annotate::fill_rect(
                &mut annotated,
                c.cx - 5,
                c.cy - 5,
                c.cx + 5,
                c.cy + 5,
                annotate::CENTER_MARKER,
            );
        }
    }

    log::debug!(
        "classified frame: {} squares, {} circles, {:?}",
        square_count,
        circles.len(),
        presence
    );

    Classification {
        presence,
        square_count,
        circle_count: circles.len(),
        squares,
        circles,
        annotated,
        edges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presence_bands_match_tuned_thresholds() {
        assert_eq!(Presence::from_square_count(66), Presence::Full);
        assert_eq!(Presence::from_square_count(64), Presence::Full);
        assert_eq!(Presence::from_square_count(63), Presence::Partial);
        assert_eq!(Presence::from_square_count(11), Presence::Partial);
        assert_eq!(Presence::from_square_count(10), Presence::None);
        assert_eq!(Presence::from_square_count(67), Presence::None);
        assert_eq!(Presence::from_square_count(0), Presence::None);
    }

    #[test]
    fn captions_are_stable() {
        assert_eq!(Presence::Full.caption(), "Chess board detected");
        assert_eq!(
            Presence::Partial.caption(),
            "Chess board partially detected"
        );
        assert_eq!(Presence::None.caption(), "Can't see the board");
    }

    #[test]
    fn blank_board_classifies_as_none() {
        let board = RgbImage::filled(160, 160, [255, 255, 255]);
        let result = classify(&board, &ClassifyParams::default());
        assert_eq!(result.presence, Presence::None);
        assert_eq!(result.square_count, 0);
        assert_eq!(result.circle_count, 0);
    }

    #[test]
    fn empty_image_does_not_panic() {
        let board = RgbImage::new(0, 0);
        let result = classify(&board, &ClassifyParams::default());
        assert_eq!(result.presence, Presence::None);
    }
}
