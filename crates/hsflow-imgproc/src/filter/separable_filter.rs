use hsflow_image::{Image, ImageError};
use rayon::prelude::*;

/// Map an index into `[0, len)` by reflecting about the edge pixels.
///
/// The edge pixel itself is not repeated: `-1 -> 1`, `len -> len - 2`.
/// `len` must be non-zero.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::filter::reflect_index;
///
/// assert_eq!(reflect_index(-2, 5), 2);
/// assert_eq!(reflect_index(5, 5), 3);
/// assert_eq!(reflect_index(3, 5), 3);
/// ```
#[inline]
pub fn reflect_index(i: isize, len: usize) -> usize {
    if len == 1 {
        return 0;
    }

    let period = (2 * len - 2) as isize;
    let r = i.rem_euclid(period) as usize;
    if r < len {
        r
    } else {
        2 * len - 2 - r
    }
}

/// Apply a symmetric separable filter with reflecting boundary conditions.
///
/// The same half kernel is used along both axes: `kernel[0]` is the centre tap
/// and `kernel[i]` weighs both neighbours at distance `i`. The horizontal pass
/// runs first into a `f64` buffer, then the vertical pass writes `dst`.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image with the same size as `src`.
/// * `kernel` - The half kernel.
///
/// # Errors
///
/// Returns [`ImageError::InvalidImageSize`] if `src` and `dst` sizes differ.
pub fn symmetric_separable_filter(
    src: &Image<f32>,
    dst: &mut Image<f32>,
    kernel: &[f64],
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    let (rows, cols) = (src.rows(), src.cols());
    if rows == 0 || cols == 0 || kernel.is_empty() {
        return Ok(());
    }

    let src_data = src.as_slice();

    // horizontal pass
    let mut temp = vec![0.0f64; rows * cols];
    temp.par_chunks_exact_mut(cols)
        .zip(src_data.par_chunks_exact(cols))
        .for_each(|(temp_row, src_row)| {
            for (x, out) in temp_row.iter_mut().enumerate() {
                let mut acc = src_row[x] as f64 * kernel[0];
                for (i, &k) in kernel.iter().enumerate().skip(1) {
                    let right = reflect_index((x + i) as isize, cols);
                    let left = reflect_index(x as isize - i as isize, cols);
                    acc += (src_row[right] as f64 + src_row[left] as f64) * k;
                }
                *out = acc;
            }
        });

    // vertical pass
    dst.as_slice_mut()
        .par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(y, dst_row)| {
            for (x, out) in dst_row.iter_mut().enumerate() {
                let mut acc = temp[y * cols + x] * kernel[0];
                for (i, &k) in kernel.iter().enumerate().skip(1) {
                    let below = reflect_index((y + i) as isize, rows);
                    let above = reflect_index(y as isize - i as isize, rows);
                    acc += (temp[below * cols + x] + temp[above * cols + x]) * k;
                }
                *out = acc as f32;
            }
        });

    Ok(())
}
