use hsflow_image::{Image, ImageSize};
use hsflow_imgproc::parallel;

use crate::{error::FlowError, field::FlowField, sor::neighbour_average};

/// Spatio-temporal derivatives averaged over the 2x2x2 cube of both frames.
#[derive(Debug, Clone)]
pub struct CubeDerivatives {
    /// The horizontal derivative.
    pub dx: Image<f32>,
    /// The vertical derivative.
    pub dy: Image<f32>,
    /// The temporal derivative.
    pub dt: Image<f32>,
}

/// Estimate the derivatives of a frame pair on the 2x2x2 cube anchored at every pixel.
///
/// Each derivative is the mean of the four first differences along its axis
/// inside the cube spanned by `(x, x + 1) x (y, y + 1) x (frame1, frame2)`,
/// with replicated edges.
///
/// # Errors
///
/// Returns an error if the frames differ in size.
pub fn cube_derivatives(
    frame1: &Image<f32>,
    frame2: &Image<f32>,
) -> Result<CubeDerivatives, FlowError> {
    let size = frame1.size();
    if frame2.size() != size {
        return Err(FlowError::FrameSizeMismatch(size, frame2.size()));
    }

    let (cols, rows) = (size.width, size.height);
    let (f1, f2) = (frame1.as_slice(), frame2.as_slice());
    let corners = |x: usize, y: usize| {
        let x1 = (x + 1).min(cols - 1);
        let y1 = (y + 1).min(rows - 1);
        [y * cols + x, y * cols + x1, y1 * cols + x, y1 * cols + x1]
    };

    let mut derivatives = CubeDerivatives {
        dx: Image::from_size_val(size, 0.0)?,
        dy: Image::from_size_val(size, 0.0)?,
        dt: Image::from_size_val(size, 0.0)?,
    };

    parallel::par_iter_rows_indexed(&mut derivatives.dx, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let [p00, p10, p01, p11] = corners(x, y);
            *out = (f1[p10] - f1[p00] + f1[p11] - f1[p01] + f2[p10] - f2[p00] + f2[p11] - f2[p01])
                / 4.0;
        }
    });
    parallel::par_iter_rows_indexed(&mut derivatives.dy, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let [p00, p10, p01, p11] = corners(x, y);
            *out = (f1[p01] - f1[p00] + f1[p11] - f1[p10] + f2[p01] - f2[p00] + f2[p11] - f2[p10])
                / 4.0;
        }
    });
    parallel::par_iter_rows_indexed(&mut derivatives.dt, |y, row| {
        for (x, out) in row.iter_mut().enumerate() {
            let [p00, p10, p01, p11] = corners(x, y);
            *out = (f2[p00] - f1[p00] + f2[p10] - f1[p10] + f2[p01] - f1[p01] + f2[p11] - f1[p11])
                / 4.0;
        }
    });

    Ok(derivatives)
}

/// Estimate the optical flow with the classic single-scale Horn-Schunck scheme.
///
/// Starting from a zero field, every iteration replaces each vector by the
/// neighbourhood average corrected along the image gradient:
///
/// ```text
/// u = avg(u) - Ix (Ix avg(u) + Iy avg(v) + It) / (alpha^2 + Ix^2 + Iy^2)
/// ```
///
/// and the same for `v` with `Iy`. All pixels update from the previous iterate.
///
/// # Arguments
///
/// * `frame1` - The reference frame.
/// * `frame2` - The target frame.
/// * `alpha` - The smoothness weight.
/// * `iterations` - The number of iterations.
///
/// # Errors
///
/// Returns an error if the frames differ in size.
pub fn horn_schunck_classic(
    frame1: &Image<f32>,
    frame2: &Image<f32>,
    alpha: f32,
    iterations: usize,
) -> Result<FlowField, FlowError> {
    let derivatives = cube_derivatives(frame1, frame2)?;
    let size: ImageSize = frame1.size();
    let mut flow = FlowField::new(size)?;
    if frame1.is_empty() {
        return Ok(flow);
    }

    let alpha2 = alpha * alpha;
    let (cols, rows) = (size.width, size.height);
    let ix = derivatives.dx.as_slice();
    let iy = derivatives.dy.as_slice();
    let it = derivatives.dt.as_slice();

    for _ in 0..iterations {
        let (u_prev, v_prev) = (flow.u().clone(), flow.v().clone());
        let (u_prev, v_prev) = (u_prev.as_slice(), v_prev.as_slice());
        let (u, v) = flow.components_mut();

        parallel::par_iter_rows_indexed(u, |y, row| {
            for (x, out) in row.iter_mut().enumerate() {
                let i = y * cols + x;
                let u_bar = neighbour_average(u_prev, cols, rows, x, y) as f32;
                let v_bar = neighbour_average(v_prev, cols, rows, x, y) as f32;
                *out = u_bar - ix[i] * correction(ix[i], iy[i], it[i], u_bar, v_bar, alpha2);
            }
        });
        parallel::par_iter_rows_indexed(v, |y, row| {
            for (x, out) in row.iter_mut().enumerate() {
                let i = y * cols + x;
                let u_bar = neighbour_average(u_prev, cols, rows, x, y) as f32;
                let v_bar = neighbour_average(v_prev, cols, rows, x, y) as f32;
                *out = v_bar - iy[i] * correction(ix[i], iy[i], it[i], u_bar, v_bar, alpha2);
            }
        });
    }

    Ok(flow)
}

#[inline]
fn correction(ix: f32, iy: f32, it: f32, u_bar: f32, v_bar: f32, alpha2: f32) -> f32 {
    let top = ix * u_bar + iy * v_bar + it;
    let bottom = alpha2 + ix * ix + iy * iy;
    if bottom == 0.0 {
        top
    } else {
        top / bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_derivatives_ramp() -> Result<(), FlowError> {
        // horizontal ramp shifted right by one pixel: I2(x) = I1(x - 1)
        let frame1 = Image::from_fn([6, 4].into(), |x, _| 3.0 * x as f32);
        let frame2 = Image::from_fn([6, 4].into(), |x, _| 3.0 * x as f32 - 3.0);
        let d = cube_derivatives(&frame1, &frame2)?;

        assert_eq!(d.dx.get_pixel(2, 1)?, 3.0);
        assert_eq!(d.dx.get_pixel(5, 1)?, 0.0);
        assert_eq!(d.dy.get_pixel(2, 1)?, 0.0);
        assert_eq!(d.dt.get_pixel(2, 1)?, -3.0);
        Ok(())
    }

    #[test]
    fn test_classic_zero_motion() -> Result<(), FlowError> {
        let frame = Image::from_fn([10, 8].into(), |x, y| ((x * 3 + y * 7) % 5) as f32);
        let flow = horn_schunck_classic(&frame, &frame, 1.0, 20)?;
        assert!(flow.u().as_slice().iter().all(|&u| u == 0.0));
        assert!(flow.v().as_slice().iter().all(|&v| v == 0.0));
        Ok(())
    }

    #[test]
    fn test_classic_recovers_translation_direction() -> Result<(), FlowError> {
        let f = |x: f32, y: f32| 100.0 + 40.0 * (0.3 * x).sin() + 30.0 * (0.25 * y).cos();
        let frame1 = Image::from_fn([32, 32].into(), |x, y| f(x as f32, y as f32));
        let frame2 = Image::from_fn([32, 32].into(), |x, y| f(x as f32 - 0.5, y as f32));

        let flow = horn_schunck_classic(&frame1, &frame2, 5.0, 200)?;

        let (mut mean_u, mut mean_v) = (0.0, 0.0);
        for y in 8..24 {
            for x in 8..24 {
                let (u, v) = flow.vector_at(x, y)?;
                mean_u += u / 256.0;
                mean_v += v / 256.0;
            }
        }
        assert!(mean_u > 0.25 && mean_u < 0.75, "mean u = {mean_u}");
        assert!(mean_v.abs() < 0.15, "mean v = {mean_v}");
        Ok(())
    }

    #[test]
    fn test_classic_size_mismatch() -> Result<(), FlowError> {
        let frame1 = Image::from_size_val([3, 3].into(), 0.0f32)?;
        let frame2 = Image::from_size_val([3, 2].into(), 0.0f32)?;
        assert!(matches!(
            horn_schunck_classic(&frame1, &frame2, 1.0, 1),
            Err(FlowError::FrameSizeMismatch(_, _))
        ));
        Ok(())
    }
}
