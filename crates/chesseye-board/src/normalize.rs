use crate::{BoardParams, OrderedCorners};
use chesseye_core::{warp_perspective_rgb, Homography, RgbImage, RgbImageView};
use nalgebra::Point2;

const BORDER_COLOR: [u8; 3] = [255, 255, 255];

#[inline]
fn edge_len(a: Point2<f32>, b: Point2<f32>) -> f32 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

/// Rectify the board quadrilateral into an axis-aligned top-down color image.
///
/// The canvas width is the longer of the top and bottom edges, the height the
/// longer of the left and right edges, so no board content is squeezed. The
/// result is padded with a solid border on all four sides; downstream contour
/// detection needs closed shapes at the image margin. Returns `None` when the
/// corner geometry does not admit a homography.
pub fn normalize_board(
    corners: &OrderedCorners,
    frame: &RgbImageView<'_>,
    params: &BoardParams,
) -> Option<RgbImage> {
    let width_top = edge_len(corners.tl, corners.tr);
    let width_bottom = edge_len(corners.bl, corners.br);
    let max_width = width_top.max(width_bottom).round() as usize;

    let height_left = edge_len(corners.tl, corners.bl);
    let height_right = edge_len(corners.tr, corners.br);
    let max_height = height_left.max(height_right).round() as usize;

    if max_width < 2 || max_height < 2 {
        return None;
    }

    let dst = [
        Point2::new(0.0_f32, 0.0),
        Point2::new(max_width as f32 - 1.0, 0.0),
        Point2::new(max_width as f32 - 1.0, max_height as f32 - 1.0),
        Point2::new(0.0_f32, max_height as f32 - 1.0),
    ];

    // warp maps destination pixels back into the source frame
    let h_src_from_dst = Homography::from_4pt(&dst, &corners.as_array())?;
    let board = warp_perspective_rgb(frame, h_src_from_dst, max_width, max_height);

    Some(add_border(&board, params.border_px as usize))
}

fn add_border(img: &RgbImage, border: usize) -> RgbImage {
    let out_w = img.width + 2 * border;
    let out_h = img.height + 2 * border;
    let mut out = RgbImage::filled(out_w, out_h, BORDER_COLOR);

    for y in 0..img.height {
        let src = y * img.width * 3;
        let dst = ((y + border) * out_w + border) * 3;
        out.data[dst..dst + img.width * 3].copy_from_slice(&img.data[src..src + img.width * 3]);
    }
    out
}
