use hsflow_image::{Image, ImageError, ImageSize};

use crate::resize::{downsample, scaled_size};

/// Smallest diagonal, in pixels, allowed for the coarsest pyramid level.
pub const MIN_LEVEL_DIAGONAL: f32 = 16.0;

/// Compute the number of pyramid levels admissible for an image.
///
/// `floor(1 + ln(diagonal / 16) / ln(1 / factor))`, so that the diagonal of the
/// coarsest level stays at or above [`MIN_LEVEL_DIAGONAL`]. Always at least 1.
///
/// # Arguments
///
/// * `size` - The size of the finest level.
/// * `factor` - The reduction factor between levels, `0 < factor < 1`.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::pyramid::max_pyramid_levels;
///
/// assert_eq!(max_pyramid_levels([680, 480].into(), 0.65), 10);
/// ```
pub fn max_pyramid_levels(size: ImageSize, factor: f32) -> usize {
    let ratio = (size.diagonal() as f64 / MIN_LEVEL_DIAGONAL as f64).ln();
    let step = (1.0 / factor as f64).ln();
    let levels = 1.0 + ratio / step;

    if levels.is_finite() && levels >= 1.0 {
        levels as usize
    } else {
        1
    }
}

/// Compute the size of every level of a pyramid, finest first.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::pyramid::pyramid_sizes;
///
/// let sizes = pyramid_sizes([100, 100].into(), 3, 0.5);
///
/// assert_eq!(sizes, vec![[100, 100].into(), [50, 50].into(), [25, 25].into()]);
/// ```
pub fn pyramid_sizes(size: ImageSize, levels: usize, factor: f32) -> Vec<ImageSize> {
    let mut sizes = Vec::with_capacity(levels);
    let mut current = size;
    for _ in 0..levels {
        sizes.push(current);
        current = scaled_size(current, factor);
    }
    sizes
}

/// Build a gaussian pyramid from an image.
///
/// Level 0 is a copy of `src`; every further level is the previous one
/// downsampled by `factor` with anti-aliasing.
///
/// # Arguments
///
/// * `src` - The finest level.
/// * `levels` - The number of levels to build, including level 0.
/// * `factor` - The reduction factor between levels.
///
/// # Returns
///
/// The levels, finest first.
pub fn build_pyramid(
    src: &Image<f32>,
    levels: usize,
    factor: f32,
) -> Result<Vec<Image<f32>>, ImageError> {
    let mut pyramid: Vec<Image<f32>> = Vec::with_capacity(levels);
    for _ in 0..levels {
        let next = match pyramid.last() {
            Some(prev) => downsample(prev, factor, true)?,
            None => src.clone(),
        };
        pyramid.push(next);
    }
    Ok(pyramid)
}
