//! Intensity normalization shared by a pair of frames.
//!
//! Both frames of a flow problem are rescaled with one common minimum and
//! maximum so that their relative brightness is preserved.

use hsflow_image::{Image, ImageError};

use crate::parallel;

/// Find the minimum and maximum values in an image.
///
/// # Errors
///
/// Returns [`ImageError::EmptyImage`] if the image has no pixels.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_imgproc::normalize::find_min_max;
///
/// let image = Image::new([3, 1].into(), vec![4.0f32, -2.0, 9.0]).unwrap();
///
/// assert_eq!(find_min_max(&image).unwrap(), (-2.0, 9.0));
/// ```
pub fn find_min_max(image: &Image<f32>) -> Result<(f32, f32), ImageError> {
    let mut iter = image.as_slice().iter().copied();
    let first = iter
        .next()
        .ok_or(ImageError::EmptyImage(image.width(), image.height()))?;

    Ok(iter.fold((first, first), |(min, max), v| (min.min(v), max.max(v))))
}

/// Normalize two images into `[min, max]` using their joint value range.
///
/// Every pixel is mapped with `(v - lo) * (max - min) / (hi - lo) + min`, where
/// `lo`/`hi` are taken over both images. If both images are constant and equal
/// the outputs are filled with `min`.
///
/// # Arguments
///
/// * `src1` - The first input image.
/// * `src2` - The second input image.
/// * `dst1` - The first output image.
/// * `dst2` - The second output image.
/// * `min` - The lower bound of the output range.
/// * `max` - The upper bound of the output range.
///
/// # Errors
///
/// Returns an error if the four images do not share one size or are empty.
pub fn normalize_min_max_joint(
    src1: &Image<f32>,
    src2: &Image<f32>,
    dst1: &mut Image<f32>,
    dst2: &mut Image<f32>,
    min: f32,
    max: f32,
) -> Result<(), ImageError> {
    let size = src1.size();
    for other in [src2.size(), dst1.size(), dst2.size()] {
        if other != size {
            return Err(ImageError::InvalidImageSize(
                size.width,
                size.height,
                other.width,
                other.height,
            ));
        }
    }

    let (min1, max1) = find_min_max(src1)?;
    let (min2, max2) = find_min_max(src2)?;
    let (lo, hi) = (min1.min(min2), max1.max(max2));

    let range = hi - lo;
    let scale = if range > 0.0 {
        (max - min) / range
    } else {
        0.0
    };

    parallel::par_iter_rows_val(src1, dst1, |&v, out| *out = (v - lo) * scale + min);
    parallel::par_iter_rows_val(src2, dst2, |&v, out| *out = (v - lo) * scale + min);

    Ok(())
}
