//! `image` crate integration: frame loading, saving and buffer conversions
//! between `image` buffers and the lightweight `chesseye-core` types.

use chesseye_core::{GrayImage, RgbImage};
use std::path::Path;

/// Errors from frame I/O.
#[derive(thiserror::Error, Debug)]
pub enum FrameIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] ::image::ImageError),
}

/// Convert an `image::RgbImage` into the core interleaved buffer type.
pub fn rgb_from_image(img: &::image::RgbImage) -> RgbImage {
    RgbImage {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw().clone(),
    }
}

/// Convert a core color buffer back into an `image::RgbImage`.
pub fn image_from_rgb(img: &RgbImage) -> ::image::RgbImage {
    ::image::RgbImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .unwrap_or_else(|| ::image::RgbImage::new(img.width as u32, img.height as u32))
}

/// Convert a core grayscale buffer into an `image::GrayImage`.
pub fn image_from_gray(img: &GrayImage) -> ::image::GrayImage {
    ::image::GrayImage::from_raw(img.width as u32, img.height as u32, img.data.clone())
        .unwrap_or_else(|| ::image::GrayImage::new(img.width as u32, img.height as u32))
}

/// Load a camera frame from disk, decoded to interleaved RGB.
pub fn load_frame(path: impl AsRef<Path>) -> Result<RgbImage, FrameIoError> {
    let img = ::image::ImageReader::open(path)?.decode()?.to_rgb8();
    Ok(rgb_from_image(&img))
}

/// Save a core color buffer; the format follows the file extension.
pub fn save_frame(img: &RgbImage, path: impl AsRef<Path>) -> Result<(), FrameIoError> {
    image_from_rgb(img).save(path)?;
    Ok(())
}

/// Save a core grayscale buffer; the format follows the file extension.
pub fn save_gray(img: &GrayImage, path: impl AsRef<Path>) -> Result<(), FrameIoError> {
    image_from_gray(img).save(path)?;
    Ok(())
}
