use crate::{GrayImageView, Point2i};

/// A traced boundary of a connected region in a binary image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    /// Boundary pixels in trace order.
    pub points: Vec<Point2i>,
    /// Whether this contour bounds a hole inside another region.
    pub hole: bool,
}

// 8-neighborhood offsets, counter-clockwise starting at east.
const NEIGHBORS: [[i32; 2]; 8] = [
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

fn neighbor_offsets(stride: i32) -> [i32; 16] {
    let mut deltas = [0i32; 16];
    for (i, [dx, dy]) in NEIGHBORS.iter().enumerate() {
        let delta = dx + dy * stride;
        deltas[i] = delta;
        deltas[i + 8] = delta;
    }
    deltas
}

/// Follow one border starting at `pos` (Suzuki-style border following with
/// label marking, so each border is traced exactly once).
fn follow_border(
    buf: &mut [i32],
    pos: usize,
    label: i32,
    mut point: Point2i,
    hole: bool,
    deltas: &[i32; 16],
) -> Contour {
    let mut points = Vec::new();

    // initial probe direction: west for outer borders, east for holes
    let mut dir: usize = if hole { 0 } else { 4 };
    let probe_start = dir;

    let mut prev_pos;
    loop {
        dir = dir.wrapping_sub(1) & 7;
        prev_pos = (pos as isize + deltas[dir] as isize) as usize;
        if buf[prev_pos] != 0 || dir == probe_start {
            break;
        }
    }

    if dir == probe_start && buf[prev_pos] == 0 {
        // isolated pixel
        buf[pos] = -label;
        points.push(point);
        return Contour { points, hole };
    }

    let mut cur_pos = pos;
    loop {
        let back_stop = dir;

        let next_pos = loop {
            dir = (dir + 1) & 15;
            let cand = (cur_pos as isize + deltas[dir] as isize) as usize;
            if buf[cand] != 0 {
                break cand;
            }
        };
        dir &= 7;

        // Suzuki marking: negative label when the border exits rightward
        if (dir.wrapping_sub(1) as u32) < back_stop as u32 {
            buf[cur_pos] = -label;
        } else if buf[cur_pos] == 1 {
            buf[cur_pos] = label;
        }

        points.push(point);
        point.x += NEIGHBORS[dir][0];
        point.y += NEIGHBORS[dir][1];

        if next_pos == pos && cur_pos == prev_pos {
            break;
        }
        cur_pos = next_pos;
        dir = (dir + 4) & 7;
    }

    Contour { points, hole }
}

/// Trace all borders of the non-zero regions of a binary image.
///
/// Returns outer borders and hole borders, each as an ordered pixel ring.
pub fn find_contours(src: &GrayImageView<'_>) -> Vec<Contour> {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return Vec::new();
    }
    let stride = w + 2;

    // binary copy with a one-pixel zero frame so tracing never leaves the buffer
    let mut buf = vec![0i32; stride * (h + 2)];
    for y in 0..h {
        for x in 0..w {
            if src.data[y * w + x] != 0 {
                buf[(y + 1) * stride + x + 1] = 1;
            }
        }
    }

    let deltas = neighbor_offsets(stride as i32);
    let mut contours = Vec::new();
    let mut label = 1;

    for y in 0..h {
        for x in 0..w {
            let pos = (y + 1) * stride + x + 1;
            let pix = buf[pos];
            if pix == 0 {
                continue;
            }

            let outer = pix == 1 && buf[pos - 1] == 0;
            let hole = !outer && pix >= 1 && buf[pos + 1] == 0;
            if outer || hole {
                label += 1;
                let start = Point2i::new(x as i32, y as i32);
                contours.push(follow_border(&mut buf, pos, label, start, hole, &deltas));
            }
        }
    }

    contours
}
