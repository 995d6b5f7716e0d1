use crate::{
    sample_bilinear_rgb, sample_bilinear_u8, GrayImage, GrayImageView, RgbImage, RgbImageView,
};
use nalgebra::{Matrix3, Point2, SMatrix, SVector, Vector3};

/// Planar homography mapping source coordinates to destination coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub h: Matrix3<f64>,
}

impl Homography {
    pub fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    #[inline]
    pub fn apply(&self, p: Point2<f32>) -> Point2<f32> {
        let v = self.h * Vector3::new(p.x as f64, p.y as f64, 1.0);
        let w = v[2];
        Point2::new((v[0] / w) as f32, (v[1] / w) as f32)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// Compute H such that: dst ~ H * src, from 4 point correspondences.
    ///
    /// Corner order must be consistent between `src` and `dst`. Returns `None`
    /// for degenerate configurations (three collinear points, repeated points).
    pub fn from_4pt(src: &[Point2<f32>; 4], dst: &[Point2<f32>; 4]) -> Option<Self> {
        // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1.
        // For each correspondence (x,y)->(u,v):
        // h11 x + h12 y + h13 - u h31 x - u h32 y = u
        // h21 x + h22 y + h23 - v h31 x - v h32 y = v
        let mut a = SMatrix::<f64, 8, 8>::zeros();
        let mut b = SVector::<f64, 8>::zeros();

        for k in 0..4 {
            let x = src[k].x as f64;
            let y = src[k].y as f64;
            let u = dst[k].x as f64;
            let v = dst[k].y as f64;

            let r0 = 2 * k;
            a[(r0, 0)] = x;
            a[(r0, 1)] = y;
            a[(r0, 2)] = 1.0;
            a[(r0, 6)] = -u * x;
            a[(r0, 7)] = -u * y;
            b[r0] = u;

            let r1 = 2 * k + 1;
            a[(r1, 3)] = x;
            a[(r1, 4)] = y;
            a[(r1, 5)] = 1.0;
            a[(r1, 6)] = -v * x;
            a[(r1, 7)] = -v * y;
            b[r1] = v;
        }

        let x = a.lu().solve(&b)?;

        let h = Matrix3::<f64>::new(
            x[0], x[1], x[2], //
            x[3], x[4], x[5], //
            x[6], x[7], 1.0,
        );
        if !h.iter().all(|v| v.is_finite()) {
            return None;
        }
        Some(Self::new(h))
    }
}

/// Warp a grayscale image: for each dst pixel, map back through
/// `h_src_from_dst` and sample bilinearly.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_src_from_dst: Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = vec![0u8; out_w * out_h];

    for y in 0..out_h {
        for x in 0..out_w {
            // sample at pixel center
            let pd = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let ps = h_src_from_dst.apply(pd);
            out[y * out_w + x] = sample_bilinear_u8(src, ps.x, ps.y);
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}

/// Color twin of [`warp_perspective_gray`].
pub fn warp_perspective_rgb(
    src: &RgbImageView<'_>,
    h_src_from_dst: Homography,
    out_w: usize,
    out_h: usize,
) -> RgbImage {
    let mut out = vec![0u8; out_w * out_h * 3];

    for y in 0..out_h {
        for x in 0..out_w {
            let pd = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
            let ps = h_src_from_dst.apply(pd);
            let px = sample_bilinear_rgb(src, ps.x, ps.y);
            let i = (y * out_w + x) * 3;
            out[i..i + 3].copy_from_slice(&px);
        }
    }

    RgbImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn four_point_recovers_known_homography() {
        let ground_truth = Homography::new(Matrix3::new(
            0.9, 0.08, 40.0, //
            -0.03, 1.05, 25.0, //
            0.0007, -0.0003, 1.0,
        ));

        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(200.0_f32, 0.0),
            Point2::new(200.0_f32, 150.0),
            Point2::new(0.0_f32, 150.0),
        ];
        let dst = src.map(|p| ground_truth.apply(p));

        let recovered = Homography::from_4pt(&src, &dst).expect("recoverable");

        for p in [
            Point2::new(10.0_f32, 10.0),
            Point2::new(100.0, 70.0),
            Point2::new(180.0, 140.0),
        ] {
            assert_relative_eq!(recovered.apply(p), ground_truth.apply(p), epsilon = 1e-2);
        }
    }

    #[test]
    fn inverse_round_trips_points() {
        let h = Homography::new(Matrix3::new(
            1.1, 0.05, 7.0, //
            -0.02, 0.95, 4.0, //
            0.0005, 0.0002, 1.0,
        ));
        let inv = h.inverse().expect("invertible");

        for p in [Point2::new(0.0_f32, 0.0), Point2::new(123.0_f32, 88.0)] {
            assert_relative_eq!(inv.apply(h.apply(p)), p, epsilon = 1e-3);
        }
    }

    #[test]
    fn degenerate_correspondences_fail() {
        // three collinear source points
        let src = [
            Point2::new(0.0_f32, 0.0),
            Point2::new(1.0_f32, 0.0),
            Point2::new(2.0_f32, 0.0),
            Point2::new(0.0_f32, 1.0),
        ];
        let dst = src;
        assert!(Homography::from_4pt(&src, &dst).is_none());
    }

    #[test]
    fn identity_warp_preserves_uniform_interior() {
        let src = GrayImage {
            width: 4,
            height: 4,
            data: vec![200u8; 16],
        };
        let h = Homography::new(Matrix3::identity());
        let out = warp_perspective_gray(&src.as_view(), h, 4, 4);
        // interior pixels sample fully inside the source
        assert_eq!(out.data[0], 200);
        assert_eq!(out.data[5], 200);
    }
}
