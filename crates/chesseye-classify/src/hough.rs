//! Hough gradient circle detection for piece localization.

use chesseye_core::GrayImageView;
use serde::{Deserialize, Serialize};

/// Circle detector tuning. The defaults were tuned empirically on real board
/// footage and must be kept in sync with the thresholds used for game play.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct HoughParams {
    /// Minimum distance between accepted circle centers, in pixels.
    pub min_dist: f32,
    /// Gradient magnitude needed for a pixel to count as an edge.
    pub edge_threshold: f32,
    /// Minimum accumulator votes for a center candidate.
    pub accum_threshold: u32,
    /// Inclusive radius search range, in pixels.
    pub min_radius: u32,
    pub max_radius: u32,
}

impl Default for HoughParams {
    fn default() -> Self {
        Self {
            min_dist: 24.0,
            edge_threshold: 50.0,
            accum_threshold: 28,
            min_radius: 10,
            max_radius: 20,
        }
    }
}

/// A located circular object (piece candidate).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectedCircle {
    pub cx: i32,
    pub cy: i32,
    pub radius: u32,
}

struct EdgePixel {
    x: i32,
    y: i32,
}

fn sobel_at(src: &GrayImageView<'_>, x: i32, y: i32) -> (f32, f32) {
    let at = |dx: i32, dy: i32| -> f32 {
        let xx = x + dx;
        let yy = y + dy;
        if xx < 0 || yy < 0 || xx >= src.width as i32 || yy >= src.height as i32 {
            0.0
        } else {
            src.data[yy as usize * src.width + xx as usize] as f32
        }
    };
    let gx = (at(1, -1) + 2.0 * at(1, 0) + at(1, 1)) - (at(-1, -1) + 2.0 * at(-1, 0) + at(-1, 1));
    let gy = (at(-1, 1) + 2.0 * at(0, 1) + at(1, 1)) - (at(-1, -1) + 2.0 * at(0, -1) + at(1, -1));
    (gx, gy)
}

/// Hough gradient circle transform.
///
/// Edge pixels vote for center candidates along both gradient directions over
/// the radius range; candidates above the vote floor are kept greedily with
/// non-maximum suppression at `min_dist`, and each center's radius is chosen
/// by a distance-histogram vote over the edge pixels.
pub fn hough_circles(src: &GrayImageView<'_>, params: &HoughParams) -> Vec<DetectedCircle> {
    let w = src.width as i32;
    let h = src.height as i32;
    if w < 3 || h < 3 || params.min_radius == 0 || params.max_radius < params.min_radius {
        return Vec::new();
    }

    let mut accum = vec![0u32; (w * h) as usize];
    let mut edges = Vec::new();

    for y in 0..h {
        for x in 0..w {
            let (gx, gy) = sobel_at(src, x, y);
            let mag = (gx * gx + gy * gy).sqrt();
            if mag < params.edge_threshold {
                continue;
            }
            edges.push(EdgePixel { x, y });

            let ux = gx / mag;
            let uy = gy / mag;
            for r in params.min_radius..=params.max_radius {
                for sign in [1.0f32, -1.0] {
                    let cx = (x as f32 + sign * ux * r as f32).round() as i32;
                    let cy = (y as f32 + sign * uy * r as f32).round() as i32;
                    if cx >= 0 && cy >= 0 && cx < w && cy < h {
                        accum[(cy * w + cx) as usize] += 1;
                    }
                }
            }
        }
    }

    // center candidates: local maxima above the vote floor, best first
    let mut candidates: Vec<(u32, i32, i32)> = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let votes = accum[(y * w + x) as usize];
            if votes < params.accum_threshold {
                continue;
            }
            let is_peak = (-1..=1).all(|dy: i32| {
                (-1..=1).all(|dx: i32| accum[((y + dy) * w + x + dx) as usize] <= votes)
            });
            if is_peak {
                candidates.push((votes, x, y));
            }
        }
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    let min_dist_sq = params.min_dist * params.min_dist;
    let mut circles: Vec<DetectedCircle> = Vec::new();

    for (_, cx, cy) in candidates {
        let too_close = circles.iter().any(|c| {
            let dx = (c.cx - cx) as f32;
            let dy = (c.cy - cy) as f32;
            dx * dx + dy * dy < min_dist_sq
        });
        if too_close {
            continue;
        }
        if let Some(radius) = vote_radius(&edges, cx, cy, params) {
            circles.push(DetectedCircle { cx, cy, radius });
        }
    }

    circles
}

fn vote_radius(edges: &[EdgePixel], cx: i32, cy: i32, params: &HoughParams) -> Option<u32> {
    let span = (params.max_radius - params.min_radius + 1) as usize;
    let mut hist = vec![0u32; span];

    for e in edges {
        let dx = (e.x - cx) as f32;
        let dy = (e.y - cy) as f32;
        let r = (dx * dx + dy * dy).sqrt().round() as i64;
        let bin = r - params.min_radius as i64;
        if bin >= 0 && (bin as usize) < span {
            hist[bin as usize] += 1;
        }
    }

    let (best_bin, &best_votes) = hist
        .iter()
        .enumerate()
        .max_by_key(|(_, &v)| v)?;
    if best_votes == 0 {
        return None;
    }
    Some(params.min_radius + best_bin as u32)
}
