//! Core types and utilities for chessboard perception.
//!
//! This crate is intentionally small: lightweight image buffers and views,
//! a planar homography with perspective warping, binary contour tracing and
//! polygon geometry. It does *not* depend on any concrete image I/O crate.

mod contour;
mod geometry;
mod homography;
mod image;
mod logger;

pub use contour::{find_contours, Contour};
pub use geometry::{approx_polygon, centroid, contour_area, perimeter, Point2i};
pub use homography::{warp_perspective_gray, warp_perspective_rgb, Homography};
pub use image::{
    sample_bilinear, sample_bilinear_rgb, sample_bilinear_u8, GrayImage, GrayImageView, RgbImage,
    RgbImageView,
};
pub use logger::init_with_level;
