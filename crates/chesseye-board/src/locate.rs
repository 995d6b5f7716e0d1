use chesseye_core::{approx_polygon, contour_area, perimeter, Contour, Point2i};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// Configuration for board outline extraction and normalization.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct BoardParams {
    /// A candidate outline must enclose more than `frame_area / min_area_divisor`.
    pub min_area_divisor: f64,
    /// Polygon simplification tolerance as a fraction of the contour perimeter.
    pub simplify_tol: f64,
    /// Solid border width added around the normalized board image, in pixels.
    pub border_px: u32,
}

impl Default for BoardParams {
    fn default() -> Self {
        Self {
            min_area_divisor: 10.0,
            simplify_tol: 0.10,
            border_px: 10,
        }
    }
}

/// The board outline corners, labeled in image-coordinate order
/// (origin top-left, x right, y down).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrderedCorners {
    pub tl: Point2<f32>,
    pub tr: Point2<f32>,
    pub br: Point2<f32>,
    pub bl: Point2<f32>,
}

impl OrderedCorners {
    #[inline]
    pub fn as_array(&self) -> [Point2<f32>; 4] {
        [self.tl, self.tr, self.br, self.bl]
    }
}

/// Label four quadrilateral vertices as {tl, tr, br, bl}.
///
/// Top-left has the smallest x+y sum, bottom-right the largest; top-right has
/// the largest x-y difference, bottom-left the smallest. For any convex
/// quadrilateral with no three collinear vertices this labeling is unique.
pub fn order_corners(pts: &[Point2i; 4]) -> OrderedCorners {
    let sum = |p: &Point2i| p.x + p.y;
    let diff = |p: &Point2i| p.x - p.y;

    let tl = pts.iter().min_by_key(|p| sum(p)).copied().unwrap_or(pts[0]);
    let br = pts.iter().max_by_key(|p| sum(p)).copied().unwrap_or(pts[0]);
    let tr = pts.iter().max_by_key(|p| diff(p)).copied().unwrap_or(pts[0]);
    let bl = pts.iter().min_by_key(|p| diff(p)).copied().unwrap_or(pts[0]);

    OrderedCorners {
        tl: tl.to_f32(),
        tr: tr.to_f32(),
        br: br.to_f32(),
        bl: bl.to_f32(),
    }
}

/// Find the chessboard outline among traced contours.
///
/// A contour qualifies when its area is strictly above a tenth of the frame
/// (configurable) and it simplifies to exactly four vertices. Among the
/// qualifying quadrilaterals the *smallest* one wins: the table edge or a
/// page border around the board is also a large quadrilateral, and the board
/// is the smallest shape that still clears the floor. Returns `None` when no
/// candidate survives; that is "board not found", not an error.
pub fn locate_board(
    contours: &[Contour],
    frame_width: usize,
    frame_height: usize,
    params: &BoardParams,
) -> Option<OrderedCorners> {
    let frame_area = (frame_width * frame_height) as f64;
    let min_area = frame_area / params.min_area_divisor;

    let mut best_area = frame_area; // the field to beat
    let mut best_quad: Option<[Point2i; 4]> = None;

    for contour in contours {
        let area = contour_area(&contour.points);
        if area <= min_area {
            continue;
        }
        let peri = perimeter(&contour.points);
        let poly = approx_polygon(&contour.points, params.simplify_tol * peri);
        if poly.len() != 4 {
            continue;
        }
        if area < best_area {
            best_area = area;
            best_quad = Some([poly[0], poly[1], poly[2], poly[3]]);
        }
    }

    best_quad.map(|quad| order_corners(&quad))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_contour(x0: i32, y0: i32, side: i32) -> Contour {
        // densely sampled square boundary so simplification has work to do
        let mut points = Vec::new();
        for t in 0..side {
            points.push(Point2i::new(x0 + t, y0));
        }
        for t in 0..side {
            points.push(Point2i::new(x0 + side, y0 + t));
        }
        for t in 0..side {
            points.push(Point2i::new(x0 + side - t, y0 + side));
        }
        for t in 0..side {
            points.push(Point2i::new(x0, y0 + side - t));
        }
        Contour {
            points,
            hole: false,
        }
    }

    #[test]
    fn orders_rotated_quad() {
        let pts = [
            Point2i::new(90, 10),
            Point2i::new(10, 12),
            Point2i::new(95, 80),
            Point2i::new(12, 85),
        ];
        let c = order_corners(&pts);
        assert_eq!(c.tl, Point2::new(10.0, 12.0));
        assert_eq!(c.br, Point2::new(95.0, 80.0));
        assert_eq!(c.tr, Point2::new(90.0, 10.0));
        assert_eq!(c.bl, Point2::new(12.0, 85.0));
    }

    #[test]
    fn ordering_satisfies_sum_extremes() {
        let pts = [
            Point2i::new(40, 5),
            Point2i::new(70, 50),
            Point2i::new(30, 60),
            Point2i::new(5, 20),
        ];
        let c = order_corners(&pts);
        for p in [c.tr, c.br, c.bl] {
            assert!(c.tl.x + c.tl.y <= p.x + p.y);
        }
        for p in [c.tl, c.tr, c.bl] {
            assert!(c.br.x + c.br.y >= p.x + p.y);
        }
    }

    fn rect_contour(x0: i32, y0: i32, w: i32, h: i32) -> Contour {
        let mut points = Vec::new();
        for t in 0..w {
            points.push(Point2i::new(x0 + t, y0));
        }
        for t in 0..h {
            points.push(Point2i::new(x0 + w, y0 + t));
        }
        for t in 0..w {
            points.push(Point2i::new(x0 + w - t, y0 + h));
        }
        for t in 0..h {
            points.push(Point2i::new(x0, y0 + h - t));
        }
        Contour {
            points,
            hole: false,
        }
    }

    #[test]
    fn rejects_contour_at_exact_area_floor() {
        // frame 100x100 => floor is 1000; the comparison must be strict
        let params = BoardParams::default();
        let exact = rect_contour(10, 10, 50, 20); // area exactly 1000
        assert!(locate_board(&[exact], 100, 100, &params).is_none());

        let above = rect_contour(10, 10, 50, 21); // area 1050 > 1000
        assert!(locate_board(&[above], 100, 100, &params).is_some());
    }

    #[test]
    fn prefers_smallest_qualifying_quad() {
        // background square ~0.5 frame area, board square ~0.15 frame area
        let background = square_contour(5, 5, 212); // 212^2 ≈ 0.5 * 300^2
        let board = square_contour(60, 60, 116); // 116^2 ≈ 0.15 * 300^2
        let params = BoardParams::default();
        let corners =
            locate_board(&[background, board], 300, 300, &params).expect("board located");
        assert_eq!(corners.tl, Point2::new(60.0, 60.0));
        assert_eq!(corners.br, Point2::new(176.0, 176.0));
    }

    #[test]
    fn non_quadrilateral_contours_are_skipped() {
        // triangle big enough to clear the floor but not 4-sided
        let tri = Contour {
            points: vec![
                Point2i::new(10, 10),
                Point2i::new(200, 10),
                Point2i::new(100, 200),
            ],
            hole: false,
        };
        assert!(locate_board(&[tri], 300, 300, &BoardParams::default()).is_none());
    }

    #[test]
    fn empty_contour_set_returns_none() {
        assert!(locate_board(&[], 640, 480, &BoardParams::default()).is_none());
    }
}
