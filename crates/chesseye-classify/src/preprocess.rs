//! Edge preprocessing for the square-counting stage: binary threshold,
//! Laplacian response, morphological gradient.

use chesseye_core::{GrayImage, GrayImageView};

/// Plain binary threshold: strictly above `cutoff` maps to 255, else 0.
pub fn threshold_binary(src: &GrayImageView<'_>, cutoff: u8) -> GrayImage {
    let data = src.data.iter().map(|&v| if v > cutoff { 255 } else { 0 }).collect();
    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

/// Absolute 4-neighbour Laplacian response, clamped to u8.
///
/// On a binary input this fires exactly on region boundaries.
pub fn laplacian_abs(src: &GrayImageView<'_>) -> GrayImage {
    let w = src.width;
    let h = src.height;
    let mut out = vec![0u8; w * h];

    let at = |x: i32, y: i32| -> i32 {
        if x < 0 || y < 0 || x >= w as i32 || y >= h as i32 {
            0
        } else {
            src.data[y as usize * w + x as usize] as i32
        }
    };

    for y in 0..h as i32 {
        for x in 0..w as i32 {
            let v = at(x - 1, y) + at(x + 1, y) + at(x, y - 1) + at(x, y + 1) - 4 * at(x, y);
            out[y as usize * w + x as usize] = v.unsigned_abs().min(255) as u8;
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}

fn morph_extreme(src: &GrayImageView<'_>, radius: i32, max: bool) -> GrayImage {
    let w = src.width as i32;
    let h = src.height as i32;
    let mut out = vec![0u8; src.width * src.height];

    for y in 0..h {
        for x in 0..w {
            let mut acc: i32 = if max { 0 } else { 255 };
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    let xx = x + dx;
                    let yy = y + dy;
                    // pixels outside the image read as 0
                    let v = if xx < 0 || yy < 0 || xx >= w || yy >= h {
                        0
                    } else {
                        src.data[(yy * w + xx) as usize] as i32
                    };
                    acc = if max { acc.max(v) } else { acc.min(v) };
                }
            }
            out[(y * w + x) as usize] = acc as u8;
        }
    }

    GrayImage {
        width: src.width,
        height: src.height,
        data: out,
    }
}

/// Morphological gradient (dilation minus erosion) with a 5x5 box element.
///
/// Thickens the Laplacian edge response into closed, contour-able shapes.
pub fn morph_gradient_5x5(src: &GrayImageView<'_>) -> GrayImage {
    let dilated = morph_extreme(src, 2, true);
    let eroded = morph_extreme(src, 2, false);

    let data = dilated
        .data
        .iter()
        .zip(&eroded.data)
        .map(|(&d, &e)| d.saturating_sub(e))
        .collect();

    GrayImage {
        width: src.width,
        height: src.height,
        data,
    }
}

/// Full edge stage: threshold, Laplacian, morphological gradient.
pub fn edge_mask(gray: &GrayImageView<'_>, cutoff: u8) -> GrayImage {
    let thresholded = threshold_binary(gray, cutoff);
    let lap = laplacian_abs(&thresholded.as_view());
    morph_gradient_5x5(&lap.as_view())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        let img = GrayImage {
            width: 3,
            height: 1,
            data: vec![227, 228, 229],
        };
        let out = threshold_binary(&img.as_view(), 228);
        assert_eq!(out.data, vec![0, 0, 255]);
    }

    #[test]
    fn laplacian_is_zero_on_flat_regions() {
        let img = GrayImage {
            width: 4,
            height: 4,
            data: vec![100u8; 16],
        };
        let out = laplacian_abs(&img.as_view());
        // interior is flat; the rim sees the implicit zero padding
        assert_eq!(out.data[5], 0);
        assert_eq!(out.data[6], 0);
        assert!(out.data[0] > 0);
    }

    #[test]
    fn laplacian_fires_on_step_edges() {
        let mut img = GrayImage::new(6, 6);
        for y in 0..6 {
            for x in 3..6 {
                img.data[y * 6 + x] = 255;
            }
        }
        let out = laplacian_abs(&img.as_view());
        assert!(out.data[2 * 6 + 2] > 0);
        assert!(out.data[2 * 6 + 3] > 0);
    }

    #[test]
    fn gradient_of_uniform_image_is_zero_inside() {
        let img = GrayImage {
            width: 8,
            height: 8,
            data: vec![200u8; 64],
        };
        let out = morph_gradient_5x5(&img.as_view());
        assert_eq!(out.data[4 * 8 + 4], 0);
    }

    #[test]
    fn gradient_outlines_a_blob() {
        let mut img = GrayImage::new(12, 12);
        for y in 4..8 {
            for x in 4..8 {
                img.data[y * 12 + x] = 255;
            }
        }
        let out = morph_gradient_5x5(&img.as_view());
        // near the blob boundary the gradient is high
        assert_eq!(out.data[5 * 12 + 3], 255);
        // far away it is zero
        assert_eq!(out.data[0], 0);
    }
}
