use hsflow_image::Image;
use hsflow_imgproc::{interpolation::BoundaryPolicy, parallel, warp::warp_flow};

use crate::{error::FlowError, field::FlowField};

/// The second frame and its derivatives warped towards the first frame.
#[derive(Debug, Clone)]
pub struct WarpedTarget {
    /// The warped intensities.
    pub image: Image<f32>,
    /// The warped horizontal derivative.
    pub dx: Image<f32>,
    /// The warped vertical derivative.
    pub dy: Image<f32>,
}

impl WarpedTarget {
    /// Warp `frame`, `dx` and `dy` by `flow`.
    ///
    /// Samples whose neighbourhood leaves the frame are set to 0 so that pixels
    /// displaced outside the image contribute nothing to the data term.
    pub fn warp(
        frame: &Image<f32>,
        dx: &Image<f32>,
        dy: &Image<f32>,
        flow: &FlowField,
    ) -> Result<Self, FlowError> {
        let size = frame.size();
        let mut warped = Self {
            image: Image::from_size_val(size, 0.0)?,
            dx: Image::from_size_val(size, 0.0)?,
            dy: Image::from_size_val(size, 0.0)?,
        };

        let (u, v) = (flow.u(), flow.v());
        warp_flow(frame, u, v, &mut warped.image, BoundaryPolicy::Zero)?;
        warp_flow(dx, u, v, &mut warped.dx, BoundaryPolicy::Zero)?;
        warp_flow(dy, u, v, &mut warped.dy, BoundaryPolicy::Zero)?;

        Ok(warped)
    }
}

/// Linearized data term of one pixel.
///
/// With `r = I1 - I2w + I2wx * u + I2wy * v` the brightness residual at the
/// current linearization point:
/// `au = r * I2wx`, `av = r * I2wy`, `du = I2wx^2 + alpha^2`,
/// `dv = I2wy^2 + alpha^2`, `d = I2wx * I2wy`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PixelCoefficients {
    /// Right hand side of the `u` equation.
    pub au: f32,
    /// Right hand side of the `v` equation.
    pub av: f32,
    /// Diagonal of the `u` equation.
    pub du: f32,
    /// Diagonal of the `v` equation.
    pub dv: f32,
    /// Coupling between `u` and `v`.
    pub d: f32,
}

/// Build the per-pixel coefficients of one warp.
///
/// # Arguments
///
/// * `frame1` - The reference frame.
/// * `warped` - The second frame and its derivatives warped by `flow`.
/// * `flow` - The current flow estimate (the linearization point).
/// * `alpha` - The smoothness weight.
///
/// # Errors
///
/// Returns an error if the inputs differ in size.
pub fn build_coefficients(
    frame1: &Image<f32>,
    warped: &WarpedTarget,
    flow: &FlowField,
    alpha: f32,
) -> Result<Image<PixelCoefficients>, FlowError> {
    let size = frame1.size();
    for other in [warped.image.size(), warped.dx.size(), warped.dy.size()] {
        if other != size {
            return Err(FlowError::FrameSizeMismatch(size, other));
        }
    }
    if flow.size() != size {
        return Err(FlowError::FlowSizeMismatch(flow.size(), size));
    }

    let alpha2 = alpha * alpha;
    let cols = size.width;
    let i1 = frame1.as_slice();
    let i2 = warped.image.as_slice();
    let i2x = warped.dx.as_slice();
    let i2y = warped.dy.as_slice();
    let (u, v) = (flow.u().as_slice(), flow.v().as_slice());

    let mut coefficients = Image::from_size_val(size, PixelCoefficients::default())?;
    parallel::par_iter_rows_indexed(&mut coefficients, |y, row| {
        let offset = y * cols;
        for (x, c) in row.iter_mut().enumerate() {
            let i = offset + x;
            let (gx, gy) = (i2x[i], i2y[i]);
            let residual = i1[i] - i2[i] + gx * u[i] + gy * v[i];
            *c = PixelCoefficients {
                au: residual * gx,
                av: residual * gy,
                du: gx * gx + alpha2,
                dv: gy * gy + alpha2,
                d: gx * gy,
            };
        }
    });

    Ok(coefficients)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hsflow_imgproc::filter::spatial_gradient;

    #[test]
    fn test_coefficients_values() -> Result<(), FlowError> {
        let frame1 = Image::from_size_val([2, 1].into(), 10.0f32)?;
        let warped = WarpedTarget {
            image: Image::new([2, 1].into(), vec![4.0, 10.0])?,
            dx: Image::new([2, 1].into(), vec![2.0, 0.0])?,
            dy: Image::new([2, 1].into(), vec![-1.0, 0.0])?,
        };
        let u = Image::from_size_val([2, 1].into(), 0.5f32)?;
        let v = Image::from_size_val([2, 1].into(), 1.0f32)?;
        let flow = FlowField::from_components(u, v)?;

        let coefficients = build_coefficients(&frame1, &warped, &flow, 3.0)?;

        // residual = 10 - 4 + 2 * 0.5 - 1 * 1 = 6
        assert_eq!(
            coefficients.get_pixel(0, 0)?,
            PixelCoefficients {
                au: 12.0,
                av: -6.0,
                du: 13.0,
                dv: 10.0,
                d: -2.0,
            }
        );
        assert_eq!(
            coefficients.get_pixel(1, 0)?,
            PixelCoefficients {
                au: 0.0,
                av: 0.0,
                du: 9.0,
                dv: 9.0,
                d: 0.0,
            }
        );
        Ok(())
    }

    #[test]
    fn test_coefficients_diagonal_bounded_by_alpha() -> Result<(), FlowError> {
        let alpha = 15.0f32;
        let frame1 = Image::from_fn([9, 7].into(), |x, y| ((x * 37 + y * 11) % 23) as f32);
        let frame2 = Image::from_fn([9, 7].into(), |x, y| ((x * 13 + y * 29) % 19) as f32);
        let mut dx = Image::from_size_val(frame2.size(), 0.0)?;
        let mut dy = Image::from_size_val(frame2.size(), 0.0)?;
        spatial_gradient(&frame2, &mut dx, &mut dy)?;

        let u = Image::from_fn(frame1.size(), |x, _| x as f32 * 0.3 - 1.0);
        let v = Image::from_fn(frame1.size(), |_, y| 0.7 - y as f32 * 0.2);
        let flow = FlowField::from_components(u, v)?;

        let warped = WarpedTarget::warp(&frame2, &dx, &dy, &flow)?;
        let coefficients = build_coefficients(&frame1, &warped, &flow, alpha)?;

        for c in coefficients.as_slice() {
            assert!(c.du >= alpha * alpha);
            assert!(c.dv >= alpha * alpha);
        }
        Ok(())
    }

    #[test]
    fn test_coefficients_size_mismatch() -> Result<(), FlowError> {
        let frame = Image::from_size_val([3, 3].into(), 0.0f32)?;
        let warped = WarpedTarget {
            image: frame.clone(),
            dx: frame.clone(),
            dy: frame.clone(),
        };
        let flow = FlowField::new([2, 2].into())?;
        assert_eq!(
            build_coefficients(&frame, &warped, &flow, 1.0),
            Err(FlowError::FlowSizeMismatch([2, 2].into(), [3, 3].into()))
        );
        Ok(())
    }
}
