use hsflow_image::{Image, ImageError};

use super::{kernels, symmetric_separable_filter};
use crate::parallel;

/// Blur an image using a gaussian filter with reflecting boundaries.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image.
/// * `radius` - The window radius in units of sigma.
/// * `sigma` - The sigma of the gaussian kernel.
///
/// PRECONDITION: `src` and `dst` must have the same shape.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_imgproc::filter::gaussian_blur;
///
/// let src = Image::from_size_val([8, 8].into(), 10.0f32).unwrap();
/// let mut dst = Image::from_size_val(src.size(), 0.0f32).unwrap();
///
/// gaussian_blur(&src, &mut dst, 5, 0.8).unwrap();
///
/// assert!(dst.as_slice().iter().all(|v| (v - 10.0).abs() < 1e-4));
/// ```
pub fn gaussian_blur(
    src: &Image<f32>,
    dst: &mut Image<f32>,
    radius: usize,
    sigma: f32,
) -> Result<(), ImageError> {
    let kernel = kernels::gaussian_kernel_half(radius, sigma as f64);
    symmetric_separable_filter(src, dst, &kernel)
}

/// Compute the first order spatial derivatives with centered differences.
///
/// Interior pixels use `0.5 * (I[x + 1] - I[x - 1])`; border pixels fall back to
/// the one-sided half difference against their single interior neighbour, on
/// each axis independently. No smoothing is applied.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dx` - The output horizontal derivative.
/// * `dy` - The output vertical derivative.
///
/// PRECONDITION: `src`, `dx` and `dy` must have the same shape.
pub fn spatial_gradient(
    src: &Image<f32>,
    dx: &mut Image<f32>,
    dy: &mut Image<f32>,
) -> Result<(), ImageError> {
    for dst in [&*dx, &*dy] {
        if src.size() != dst.size() {
            return Err(ImageError::InvalidImageSize(
                src.width(),
                src.height(),
                dst.width(),
                dst.height(),
            ));
        }
    }

    let (rows, cols) = (src.rows(), src.cols());
    let data = src.as_slice();

    parallel::par_iter_rows_indexed(dx, |y, dx_row| {
        let row = &data[y * cols..(y + 1) * cols];
        for (x, out) in dx_row.iter_mut().enumerate() {
            let left = x.saturating_sub(1);
            let right = (x + 1).min(cols - 1);
            *out = 0.5 * (row[right] - row[left]);
        }
    });

    parallel::par_iter_rows_indexed(dy, |y, dy_row| {
        let above = &data[y.saturating_sub(1) * cols..][..cols];
        let below = &data[(y + 1).min(rows - 1) * cols..][..cols];
        for ((out, &b), &a) in dy_row.iter_mut().zip(below).zip(above) {
            *out = 0.5 * (b - a);
        }
    });

    Ok(())
}
