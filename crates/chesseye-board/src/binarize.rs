use chesseye_core::{GrayImage, GrayImageView};

/// Adaptive mean threshold: a pixel strictly brighter than the mean of its
/// surrounding window (minus `c`) maps to 255, everything else to 0.
///
/// Flat regions fall below the cutoff on both sides, so the output keeps only
/// the bright flanks of intensity transitions. That is exactly what the board
/// locator needs: closed bright outlines around dark regions, robust against
/// uneven lighting across the table.
pub fn adaptive_threshold_mean(src: &GrayImageView<'_>, radius: usize, c: i32) -> GrayImage {
    let w = src.width;
    let h = src.height;
    if w == 0 || h == 0 {
        return GrayImage::new(w, h);
    }

    // summed-area table with a leading zero row/column
    let mut integral = vec![0u64; (w + 1) * (h + 1)];
    for y in 0..h {
        let mut row_sum = 0u64;
        for x in 0..w {
            row_sum += src.data[y * w + x] as u64;
            integral[(y + 1) * (w + 1) + x + 1] = integral[y * (w + 1) + x + 1] + row_sum;
        }
    }

    let mut out = vec![0u8; w * h];
    for y in 0..h {
        let y0 = y.saturating_sub(radius);
        let y1 = (y + radius + 1).min(h);
        for x in 0..w {
            let x0 = x.saturating_sub(radius);
            let x1 = (x + radius + 1).min(w);

            let sum = integral[y1 * (w + 1) + x1] + integral[y0 * (w + 1) + x0]
                - integral[y0 * (w + 1) + x1]
                - integral[y1 * (w + 1) + x0];
            let count = ((y1 - y0) * (x1 - x0)) as u64;
            let mean = (sum / count) as i32;

            if src.data[y * w + x] as i32 > mean - c {
                out[y * w + x] = 255;
            }
        }
    }

    GrayImage {
        width: w,
        height: h,
        data: out,
    }
}
