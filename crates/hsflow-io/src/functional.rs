use std::path::Path;

use hsflow_image::{Image, ImageSize};

use crate::error::IoError;

/// Read an image file as a grayscale intensity grid.
///
/// Any format decodable by the `image` crate is accepted. Color images are
/// converted to 8-bit luma; the returned values lie in `[0, 255]`.
///
/// # Arguments
///
/// * `file_path` - The path to the image.
///
/// # Errors
///
/// Returns an error if the file does not exist or cannot be decoded.
pub fn read_image_gray(file_path: impl AsRef<Path>) -> Result<Image<f32>, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let img = image::ImageReader::open(file_path)?
        .with_guessed_format()?
        .decode()?
        .into_luma8();

    let size = ImageSize {
        width: img.width() as usize,
        height: img.height() as usize,
    };

    let image = Image::new(size, img.into_raw())?;
    Ok(image.cast()?)
}

/// Write an intensity grid to an 8-bit grayscale image file.
///
/// Values are rounded and saturated to `[0, 255]`. The format follows the
/// file extension.
pub fn write_image_gray(file_path: impl AsRef<Path>, image: &Image<f32>) -> Result<(), IoError> {
    let data = image
        .as_slice()
        .iter()
        .map(|&v| v.round().clamp(0.0, 255.0) as u8)
        .collect::<Vec<_>>();

    image::save_buffer(
        file_path,
        &data,
        image.width() as u32,
        image.height() as u32,
        image::ExtendedColorType::L8,
    )?;

    Ok(())
}
