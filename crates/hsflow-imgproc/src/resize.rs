use hsflow_image::{Image, ImageError, ImageSize};

use crate::filter::gaussian_blur;
use crate::interpolation::{bicubic_interpolation, BoundaryPolicy};
use crate::parallel;

/// Window radius, in sigmas, of the anti-aliasing filter applied before downsampling.
pub const ANTIALIAS_RADIUS: usize = 5;

/// Compute the size of an image scaled by `factor`, rounding each side to the nearest integer.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::resize::scaled_size;
///
/// let size = scaled_size([4, 6].into(), 0.65);
///
/// assert_eq!(size.width, 3);
/// assert_eq!(size.height, 4);
/// ```
pub fn scaled_size(size: ImageSize, factor: f32) -> ImageSize {
    ImageSize {
        width: (size.width as f32 * factor + 0.5) as usize,
        height: (size.height as f32 * factor + 0.5) as usize,
    }
}

/// Sigma of the gaussian pre-filter matched to a reduction by `factor`.
///
/// `0.6 * sqrt(1 / factor^2 - 1)`
pub fn antialias_sigma(factor: f32) -> f32 {
    0.6 * (1.0 / (factor * factor) - 1.0).sqrt()
}

/// Resample an image onto a new grid with independent scale factors per axis.
///
/// The destination pixel `(x, y)` takes the bicubic sample of `src` at
/// `(x / scale_x, y / scale_y)`.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `dst` - The output image; its size defines the sampling grid.
/// * `scale_x` - The horizontal scale from source to destination.
/// * `scale_y` - The vertical scale from source to destination.
/// * `policy` - The boundary policy of the sampler.
pub fn resize_bicubic(
    src: &Image<f32>,
    dst: &mut Image<f32>,
    scale_x: f32,
    scale_y: f32,
    policy: BoundaryPolicy,
) -> Result<(), ImageError> {
    if !(scale_x.is_finite() && scale_x > 0.0) {
        return Err(ImageError::InvalidScaleFactor(scale_x));
    }
    if !(scale_y.is_finite() && scale_y > 0.0) {
        return Err(ImageError::InvalidScaleFactor(scale_y));
    }

    parallel::par_iter_rows_indexed(dst, |y, dst_row| {
        let src_y = y as f32 / scale_y;
        for (x, out) in dst_row.iter_mut().enumerate() {
            let src_x = x as f32 / scale_x;
            *out = bicubic_interpolation(src, src_x, src_y, policy);
        }
    });

    Ok(())
}

/// Reduce an image by `factor`, optionally smoothing it first.
///
/// The output size is `floor(size * factor + 0.5)` per side. With `smooth` the
/// source is first blurred with [`antialias_sigma`]. Sampling uses the clamp policy.
///
/// # Arguments
///
/// * `src` - The input image.
/// * `factor` - The reduction factor, `0 < factor < 1`.
/// * `smooth` - Whether to apply the anti-aliasing filter.
///
/// # Returns
///
/// A newly allocated downsampled image.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_imgproc::resize::downsample;
///
/// let image = Image::from_size_val([6, 6].into(), 3.0f32).unwrap();
/// let small = downsample(&image, 0.65, true).unwrap();
///
/// assert_eq!(small.width(), 4);
/// assert_eq!(small.height(), 4);
/// ```
pub fn downsample(src: &Image<f32>, factor: f32, smooth: bool) -> Result<Image<f32>, ImageError> {
    if !(factor > 0.0 && factor < 1.0) {
        return Err(ImageError::InvalidScaleFactor(factor));
    }

    let smoothed;
    let source = if smooth {
        let mut blurred = Image::from_size_val(src.size(), 0.0)?;
        gaussian_blur(src, &mut blurred, ANTIALIAS_RADIUS, antialias_sigma(factor))?;
        smoothed = blurred;
        &smoothed
    } else {
        src
    };

    let mut dst = Image::from_size_val(scaled_size(src.size(), factor), 0.0)?;
    resize_bicubic(source, &mut dst, factor, factor, BoundaryPolicy::Clamp)?;

    Ok(dst)
}

/// Enlarge an image (typically one flow component) to `new_size`.
///
/// The scale factors `new_width / width` and `new_height / height` are
/// computed independently, since rounded pyramid sizes are not exact
/// multiples of each other. Sampling uses the clamp policy.
///
/// # Errors
///
/// Returns an error if the source image is empty.
pub fn upsample(src: &Image<f32>, new_size: ImageSize) -> Result<Image<f32>, ImageError> {
    if src.is_empty() {
        return Err(ImageError::EmptyImage(src.width(), src.height()));
    }

    let scale_x = new_size.width as f32 / src.width() as f32;
    let scale_y = new_size.height as f32 / src.height() as f32;

    let mut dst = Image::from_size_val(new_size, 0.0)?;
    if dst.is_empty() {
        return Ok(dst);
    }

    resize_bicubic(src, &mut dst, scale_x, scale_y, BoundaryPolicy::Clamp)?;

    Ok(dst)
}
