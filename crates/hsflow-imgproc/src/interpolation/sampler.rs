use hsflow_image::Image;

use super::cubic::bicubic;

/// How samples that reach outside the image are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryPolicy {
    /// Replicate the nearest edge pixel (Neumann boundary condition).
    #[default]
    Clamp,
    /// The whole sample is 0 as soon as any tap of its neighbourhood is out of range.
    ///
    /// Used to mark pixels that were warped outside the frame as invalid.
    Zero,
}

/// Clamp an index into `[0, len)`.
///
/// Returns the clamped index and whether clamping was needed. `len` must be non-zero.
///
/// # Example
///
/// ```
/// use hsflow_imgproc::interpolation::clamp_index;
///
/// assert_eq!(clamp_index(-5, 10), (0, true));
/// assert_eq!(clamp_index(90, 10), (9, true));
/// assert_eq!(clamp_index(4, 10), (4, false));
/// ```
#[inline]
pub fn clamp_index(i: isize, len: usize) -> (usize, bool) {
    if i < 0 {
        (0, true)
    } else if i as usize >= len {
        (len - 1, true)
    } else {
        (i as usize, false)
    }
}

/// Sample an image at a real-valued position with bicubic interpolation.
///
/// The 4x4 neighbourhood is anchored at `floor(x), floor(y)` and extends one
/// tap behind and two taps ahead along the direction of each coordinate's sign,
/// so the stencil is `{-s, 0, s, 2s}` per axis with `s = 1` for non-negative
/// coordinates and `s = -1` otherwise. Every tap is clamped into the grid;
/// with [`BoundaryPolicy::Zero`] a single clamped tap makes the result exactly 0.
///
/// # Arguments
///
/// * `image` - The input image. Must not be empty.
/// * `x` - The column coordinate.
/// * `y` - The row coordinate.
/// * `policy` - The boundary policy.
///
/// # Returns
///
/// The interpolated value, or 0 for an empty image.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_imgproc::interpolation::{bicubic_interpolation, BoundaryPolicy};
///
/// let image = Image::new([2, 2].into(), vec![1.0f32, 2.0, 3.0, 4.0]).unwrap();
///
/// assert_eq!(bicubic_interpolation(&image, -1.0, -1.0, BoundaryPolicy::Clamp), 1.0);
/// assert_eq!(bicubic_interpolation(&image, -1.0, -1.0, BoundaryPolicy::Zero), 0.0);
/// ```
pub fn bicubic_interpolation(image: &Image<f32>, x: f32, y: f32, policy: BoundaryPolicy) -> f32 {
    if image.is_empty() {
        return 0.0;
    }

    let (cols, rows) = (image.cols(), image.rows());
    let data = image.as_slice();

    // past these bounds every tap is clamped, so the result no longer changes
    let x = (x as f64).clamp(-4.0, cols as f64 + 3.0);
    let y = (y as f64).clamp(-4.0, rows as f64 + 3.0);
    let xf = x.floor();
    let yf = y.floor();
    let (xi, yi) = (xf as isize, yf as isize);

    let sx: isize = if x < 0.0 { -1 } else { 1 };
    let sy: isize = if y < 0.0 { -1 } else { 1 };
    let offsets_x = [-sx, 0, sx, 2 * sx];
    let offsets_y = [-sy, 0, sy, 2 * sy];

    let mut out_of_bounds = false;
    let mut stencil = [[0.0f64; 4]; 4];

    for (column, &dx) in stencil.iter_mut().zip(offsets_x.iter()) {
        let (c, clamped_x) = clamp_index(xi + dx, cols);
        out_of_bounds |= clamped_x;
        for (tap, &dy) in column.iter_mut().zip(offsets_y.iter()) {
            let (r, clamped_y) = clamp_index(yi + dy, rows);
            out_of_bounds |= clamped_y;
            *tap = data[r * cols + c] as f64;
        }
    }

    if out_of_bounds && policy == BoundaryPolicy::Zero {
        return 0.0;
    }

    bicubic(&stencil, x - xf, y - yf) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsflow_image::{ImageError, ImageSize};

    // 6x6 cross pattern.
    fn cross_image() -> Result<Image<f32>, ImageError> {
        let a = [0.0, 0.0, 255.0, 255.0, 0.0, 0.0];
        let b = [255.0; 6];
        let data = [a, a, b, b, a, a].concat();
        Image::new(
            ImageSize {
                width: 6,
                height: 6,
            },
            data,
        )
    }

    #[test]
    fn interpolation_exact_on_grid() -> Result<(), ImageError> {
        let image = Image::from_fn([5, 4].into(), |x, y| (x * 7 + y * 3) as f32 * 0.5 - 4.0);
        for y in 0..4 {
            for x in 0..5 {
                let val = bicubic_interpolation(&image, x as f32, y as f32, BoundaryPolicy::Clamp);
                assert_eq!(val, image.get_pixel(x, y)?);
            }
        }
        Ok(())
    }

    #[test]
    fn interpolation_zero_boundary() -> Result<(), ImageError> {
        let image = cross_image()?;
        #[rustfmt::skip]
        let expected = [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 255.0, 255.0, 0.0, 0.0,
            0.0, 255.0, 255.0, 255.0, 0.0, 0.0,
            0.0, 255.0, 255.0, 255.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0,
        ];
        for y in 0..6 {
            for x in 0..6 {
                let val = bicubic_interpolation(&image, x as f32, y as f32, BoundaryPolicy::Zero);
                assert_eq!(val, expected[y * 6 + x], "pixel ({x}, {y})");
            }
        }
        Ok(())
    }

    #[test]
    fn interpolation_outside_clamp_vs_zero() -> Result<(), ImageError> {
        let image = cross_image()?;
        let clamp = bicubic_interpolation(&image, -1.0, -1.0, BoundaryPolicy::Clamp);
        let zero = bicubic_interpolation(&image, -1.0, -1.0, BoundaryPolicy::Zero);
        assert_eq!(clamp, image.get_pixel(0, 0)?);
        assert_eq!(zero, 0.0);

        let far = bicubic_interpolation(&image, 40.0, 2.0, BoundaryPolicy::Clamp);
        assert_eq!(far, image.get_pixel(5, 2)?);
        Ok(())
    }

    #[test]
    fn interpolation_midpoint_of_ramp() -> Result<(), ImageError> {
        let image = Image::from_fn([8, 8].into(), |x, _| x as f32);
        let val = bicubic_interpolation(&image, 3.5, 3.0, BoundaryPolicy::Clamp);
        approx::assert_relative_eq!(val, 3.5, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn interpolation_far_outside() -> Result<(), ImageError> {
        let image = Image::from_fn([4, 4].into(), |x, y| (x + 4 * y) as f32);
        for (x, y) in [(1e20, 0.0), (-1e20, 0.0), (0.0, 1e20), (3e38, -3e38), (-7.5, 2.25)] {
            assert_eq!(bicubic_interpolation(&image, x, y, BoundaryPolicy::Zero), 0.0);
        }

        assert_eq!(bicubic_interpolation(&image, 1e20, 0.0, BoundaryPolicy::Clamp), 3.0);
        assert_eq!(bicubic_interpolation(&image, -1e20, 0.0, BoundaryPolicy::Clamp), 0.0);
        assert_eq!(bicubic_interpolation(&image, 0.0, 1e20, BoundaryPolicy::Clamp), 12.0);
        assert_eq!(bicubic_interpolation(&image, 3e38, -3e38, BoundaryPolicy::Clamp), 3.0);
        Ok(())
    }

    #[test]
    fn clamp_index_bounds() {
        assert_eq!(clamp_index(-1, 3), (0, true));
        assert_eq!(clamp_index(3, 3), (2, true));
        assert_eq!(clamp_index(2, 3), (2, false));
    }
}
