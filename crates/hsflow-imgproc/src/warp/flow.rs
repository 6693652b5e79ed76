use hsflow_image::{Image, ImageError};

use crate::interpolation::{bicubic_interpolation, BoundaryPolicy};
use crate::parallel;

/// Warp an image by a dense displacement field.
///
/// Each output pixel is `dst(x, y) = src(x + u(x, y), y + v(x, y))`, sampled with
/// bicubic interpolation under the given boundary policy.
///
/// # Arguments
///
/// * `src` - The image to warp.
/// * `u` - The horizontal displacement per pixel.
/// * `v` - The vertical displacement per pixel.
/// * `dst` - The warped output image.
/// * `policy` - How samples outside `src` are resolved.
///
/// # Errors
///
/// Returns an error if `u`, `v` or `dst` differ in size from `src`.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_imgproc::interpolation::BoundaryPolicy;
/// use hsflow_imgproc::warp::warp_flow;
///
/// let src = Image::from_fn([4, 4].into(), |x, _| x as f32);
/// let u = Image::from_size_val(src.size(), 1.0f32).unwrap();
/// let v = Image::from_size_val(src.size(), 0.0f32).unwrap();
/// let mut dst = Image::from_size_val(src.size(), 0.0f32).unwrap();
///
/// warp_flow(&src, &u, &v, &mut dst, BoundaryPolicy::Clamp).unwrap();
///
/// assert_eq!(dst.get_pixel(0, 0).unwrap(), 1.0);
/// assert_eq!(dst.get_pixel(3, 0).unwrap(), 3.0);
/// ```
pub fn warp_flow(
    src: &Image<f32>,
    u: &Image<f32>,
    v: &Image<f32>,
    dst: &mut Image<f32>,
    policy: BoundaryPolicy,
) -> Result<(), ImageError> {
    let size = src.size();
    for other in [u.size(), v.size(), dst.size()] {
        if other != size {
            return Err(ImageError::InvalidImageSize(
                size.width,
                size.height,
                other.width,
                other.height,
            ));
        }
    }

    let cols = size.width;
    let (u_data, v_data) = (u.as_slice(), v.as_slice());

    parallel::par_iter_rows_indexed(dst, |y, dst_row| {
        let u_row = &u_data[y * cols..(y + 1) * cols];
        let v_row = &v_data[y * cols..(y + 1) * cols];
        for (x, ((out, &du), &dv)) in dst_row.iter_mut().zip(u_row).zip(v_row).enumerate() {
            let xs = x as f32 + du;
            let ys = y as f32 + dv;
            *out = bicubic_interpolation(src, xs, ys, policy);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cross_image() -> Result<Image<f32>, ImageError> {
        let a = [0.0, 0.0, 255.0, 255.0, 0.0, 0.0];
        let b = [255.0; 6];
        Image::new([6, 6].into(), [a, a, b, b, a, a].concat())
    }

    #[test]
    fn test_warp_identity() -> Result<(), ImageError> {
        let image = cross_image()?;
        let zeros = Image::from_size_val(image.size(), 0.0f32)?;
        let mut dst = Image::from_size_val(image.size(), -1.0f32)?;

        warp_flow(&image, &zeros, &zeros, &mut dst, BoundaryPolicy::Clamp)?;

        assert_eq!(dst, image);
        Ok(())
    }

    #[test]
    fn test_warp_diagonal_shift_clamp() -> Result<(), ImageError> {
        let image = cross_image()?;
        let ones = Image::from_size_val(image.size(), 1.0f32)?;
        let mut dst = Image::from_size_val(image.size(), 0.0f32)?;

        warp_flow(&image, &ones, &ones, &mut dst, BoundaryPolicy::Clamp)?;

        let a = [0.0, 255.0, 255.0, 0.0, 0.0, 0.0];
        let b = [255.0; 6];
        let expected = [a, b, b, a, a, a].concat();
        assert_eq!(dst.as_slice(), expected.as_slice());
        Ok(())
    }

    #[test]
    fn test_warp_out_of_frame_zero() -> Result<(), ImageError> {
        let image = Image::from_size_val([5, 5].into(), 9.0f32)?;
        let u = Image::from_size_val(image.size(), 10.0f32)?;
        let v = Image::from_size_val(image.size(), 0.0f32)?;
        let mut dst = Image::from_size_val(image.size(), 1.0f32)?;

        warp_flow(&image, &u, &v, &mut dst, BoundaryPolicy::Zero)?;
        assert!(dst.as_slice().iter().all(|&p| p == 0.0));

        warp_flow(&image, &u, &v, &mut dst, BoundaryPolicy::Clamp)?;
        assert!(dst.as_slice().iter().all(|&p| p == 9.0));
        Ok(())
    }

    #[test]
    fn test_warp_huge_displacement() -> Result<(), ImageError> {
        let image = Image::from_fn([5, 4].into(), |x, y| (x + 10 * y) as f32);
        let u = Image::from_fn(image.size(), |x, _| if x % 2 == 0 { 1e20 } else { -1e20 });
        let v = Image::from_size_val(image.size(), 0.0f32)?;
        let mut dst = Image::from_size_val(image.size(), 1.0f32)?;

        warp_flow(&image, &u, &v, &mut dst, BoundaryPolicy::Zero)?;
        assert!(dst.as_slice().iter().all(|&p| p == 0.0));

        warp_flow(&image, &u, &v, &mut dst, BoundaryPolicy::Clamp)?;
        for y in 0..4 {
            for x in 0..5 {
                let edge = if x % 2 == 0 { 4 } else { 0 };
                assert_eq!(dst.get_pixel(x, y)?, (edge + 10 * y) as f32);
            }
        }
        Ok(())
    }

    #[test]
    fn test_warp_size_mismatch() -> Result<(), ImageError> {
        let image = Image::from_size_val([4, 4].into(), 0.0f32)?;
        let u = Image::from_size_val([3, 4].into(), 0.0f32)?;
        let mut dst = Image::from_size_val(image.size(), 0.0f32)?;

        let res = warp_flow(&image, &u, &image, &mut dst, BoundaryPolicy::Zero);
        assert_eq!(res, Err(ImageError::InvalidImageSize(4, 4, 3, 4)));
        Ok(())
    }
}
