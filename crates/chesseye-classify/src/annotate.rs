//! Raster overlay primitives for the annotated classification frame.

use chesseye_core::{Point2i, RgbImage};

pub const SQUARE_OUTLINE: [u8; 3] = [0, 255, 0];
pub const CIRCLE_OUTLINE: [u8; 3] = [255, 255, 255];
pub const CENTER_MARKER: [u8; 3] = [255, 128, 0];

/// Bresenham line segment, clipped at the image bounds.
pub fn draw_line(img: &mut RgbImage, a: Point2i, b: Point2i, color: [u8; 3]) {
    let mut x = a.x;
    let mut y = a.y;
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x >= 0 && y >= 0 {
            img.put_pixel(x as usize, y as usize, color);
        }
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Closed polyline through the contour points.
pub fn draw_contour(img: &mut RgbImage, points: &[Point2i], color: [u8; 3]) {
    if points.len() < 2 {
        if let Some(p) = points.first() {
            if p.x >= 0 && p.y >= 0 {
                img.put_pixel(p.x as usize, p.y as usize, color);
            }
        }
        return;
    }
    let mut prev = points[points.len() - 1];
    for &p in points {
        draw_line(img, prev, p, color);
        prev = p;
    }
}

/// Midpoint circle outline.
pub fn draw_circle(img: &mut RgbImage, cx: i32, cy: i32, radius: i32, color: [u8; 3]) {
    if radius <= 0 {
        return;
    }
    let mut x = radius;
    let mut y = 0;
    let mut err = 1 - radius;

    let mut plot = |px: i32, py: i32| {
        if px >= 0 && py >= 0 {
            img.put_pixel(px as usize, py as usize, color);
        }
    };

    while x >= y {
        plot(cx + x, cy + y);
        plot(cx + y, cy + x);
        plot(cx - y, cy + x);
        plot(cx - x, cy + y);
        plot(cx - x, cy - y);
        plot(cx - y, cy - x);
        plot(cx + y, cy - x);
        plot(cx + x, cy - y);
        y += 1;
        if err < 0 {
            err += 2 * y + 1;
        } else {
            x -= 1;
            err += 2 * (y - x) + 1;
        }
    }
}

/// Filled axis-aligned rectangle, clipped at the image bounds.
pub fn fill_rect(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: [u8; 3]) {
    let xs = x0.max(0);
    let ys = y0.max(0);
    let xe = x1.min(img.width as i32 - 1);
    let ye = y1.min(img.height as i32 - 1);
    for y in ys..=ye {
        for x in xs..=xe {
            img.put_pixel(x as usize, y as usize, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endpoints_are_painted() {
        let mut img = RgbImage::new(10, 10);
        draw_line(&mut img, Point2i::new(1, 1), Point2i::new(8, 6), [255, 0, 0]);
        assert_eq!(&img.data[(1 * 10 + 1) * 3..(1 * 10 + 1) * 3 + 3], &[255, 0, 0]);
        assert_eq!(&img.data[(6 * 10 + 8) * 3..(6 * 10 + 8) * 3 + 3], &[255, 0, 0]);
    }

    #[test]
    fn rect_is_clipped() {
        let mut img = RgbImage::new(4, 4);
        fill_rect(&mut img, -3, -3, 1, 1, [9, 9, 9]);
        assert_eq!(&img.data[0..3], &[9, 9, 9]);
        // bottom-right pixel untouched
        let i = (3 * 4 + 3) * 3;
        assert_eq!(&img.data[i..i + 3], &[0, 0, 0]);
    }

    #[test]
    fn circle_stays_in_bounds() {
        let mut img = RgbImage::new(8, 8);
        draw_circle(&mut img, 0, 0, 6, [1, 2, 3]);
        // no panic and at least one pixel painted
        assert!(img.data.chunks_exact(3).any(|c| c == [1, 2, 3]));
    }
}
