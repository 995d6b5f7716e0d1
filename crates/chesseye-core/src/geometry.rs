use nalgebra::Point2;

/// Integer pixel coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point2i {
    pub x: i32,
    pub y: i32,
}

impl Point2i {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn to_f32(self) -> Point2<f32> {
        Point2::new(self.x as f32, self.y as f32)
    }
}

/// Absolute enclosed area of a closed polygon (shoelace formula).
pub fn contour_area(points: &[Point2i]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut twice_area = 0i64;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (p, q) = (points[j], points[i]);
        twice_area += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
        j = i;
    }
    (twice_area.abs() as f64) * 0.5
}

/// Perimeter of a closed polygon.
pub fn perimeter(points: &[Point2i]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let mut p = 0.0;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let dx = (points[i].x - points[j].x) as f64;
        let dy = (points[i].y - points[j].y) as f64;
        p += (dx * dx + dy * dy).sqrt();
        j = i;
    }
    p
}

/// Perpendicular distance from `p` to the line through `a` and `b`.
fn line_distance(p: Point2i, a: Point2i, b: Point2i) -> f64 {
    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    let norm = (dx * dx + dy * dy).sqrt();
    if norm < 1e-12 {
        let ex = (p.x - a.x) as f64;
        let ey = (p.y - a.y) as f64;
        return (ex * ex + ey * ey).sqrt();
    }
    ((p.y - a.y) as f64 * dx - (p.x - a.x) as f64 * dy).abs() / norm
}

/// Ramer-Douglas-Peucker simplification of a closed contour.
///
/// Splits the contour at the two points farthest apart, simplifies each half
/// within `epsilon` pixels, and returns the reduced vertex ring. A board
/// outline simplified with epsilon proportional to its perimeter collapses
/// to its four corners.
pub fn approx_polygon(points: &[Point2i], epsilon: f64) -> Vec<Point2i> {
    if points.len() < 3 {
        return points.to_vec();
    }

    // anchor the recursion on the farthest point pair
    let mut i0 = 0usize;
    let mut i1 = 0usize;
    let mut best = -1.0f64;
    for (i, p) in points.iter().enumerate() {
        for (j, q) in points.iter().enumerate().skip(i + 1) {
            let dx = (p.x - q.x) as f64;
            let dy = (p.y - q.y) as f64;
            let d = dx * dx + dy * dy;
            if d > best {
                best = d;
                i0 = i;
                i1 = j;
            }
        }
    }

    let mut keep = vec![false; points.len()];
    keep[i0] = true;
    keep[i1] = true;

    // iterative RDP over index ranges on the ring
    let mut stack = vec![(i0, i1), (i1, i0 + points.len())];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let a = points[start % points.len()];
        let b = points[end % points.len()];
        let mut far_idx = start;
        let mut far_dist = 0.0;
        for k in start + 1..end {
            let d = line_distance(points[k % points.len()], a, b);
            if d > far_dist {
                far_dist = d;
                far_idx = k;
            }
        }
        if far_dist > epsilon {
            keep[far_idx % points.len()] = true;
            stack.push((start, far_idx));
            stack.push((far_idx, end));
        }
    }

    points
        .iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(*p))
        .collect()
}

/// Contour centroid from raster moments: cx = M10/M00, cy = M01/M00.
///
/// Uses the signed-area weighted (green's theorem) form over the closed
/// polygon. Returns `None` when the zeroth moment vanishes (degenerate
/// contour), which callers must treat as "skip", never as a panic.
pub fn centroid(points: &[Point2i]) -> Option<Point2<f32>> {
    if points.len() < 3 {
        return None;
    }
    let mut m00 = 0.0f64;
    let mut m10 = 0.0f64;
    let mut m01 = 0.0f64;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (px, py) = (points[j].x as f64, points[j].y as f64);
        let (qx, qy) = (points[i].x as f64, points[i].y as f64);
        let cross = px * qy - qx * py;
        m00 += cross;
        m10 += (px + qx) * cross;
        m01 += (py + qy) * cross;
        j = i;
    }
    m00 *= 0.5;
    if m00.abs() < 1e-9 {
        return None;
    }
    let cx = m10 / (6.0 * m00);
    let cy = m01 / (6.0 * m00);
    Some(Point2::new(cx as f32, cy as f32))
}
