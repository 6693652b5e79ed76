//! One sweep of successive over-relaxation over the linearized system.
//!
//! For every pixel the neighbourhood average of the flow (1/6 on the
//! 4-connected neighbours, 1/12 on the diagonals, edge replicated) couples the
//! data term with the smoothness term:
//!
//! ```text
//! u' = (1 - w) u + w (au - d v  + alpha^2 avg(u)) / du
//! v' = (1 - w) v + w (av - d u' + alpha^2 avg(v)) / dv
//! ```
//!
//! `v` consumes the already updated `u` of the same pixel.

use hsflow_image::Image;
use rayon::prelude::*;

use crate::{coefficients::PixelCoefficients, config::RelaxationOrder, field::FlowField};

/// Over-relaxation factor.
pub const SOR_OMEGA: f64 = 1.9;

/// Weighted average of the 8-neighbourhood of `(x, y)` with replicated edges.
#[inline]
pub fn neighbour_average(field: &[f32], cols: usize, rows: usize, x: usize, y: usize) -> f64 {
    let left = x.saturating_sub(1);
    let right = (x + 1).min(cols - 1);
    let up = y.saturating_sub(1);
    let down = (y + 1).min(rows - 1);
    let at = |px: usize, py: usize| field[py * cols + px] as f64;

    (1.0 / 12.0) * (at(left, up) + at(right, up) + at(left, down) + at(right, down))
        + (1.0 / 6.0) * (at(left, y) + at(x, up) + at(right, y) + at(x, down))
}

#[inline]
fn non_zero(value: f32) -> f64 {
    if value == 0.0 {
        1.0
    } else {
        value as f64
    }
}

/// Compute the relaxed `(u, v)` of one pixel from the current field.
#[allow(clippy::too_many_arguments)]
#[inline]
fn relax_pixel(
    u: &[f32],
    v: &[f32],
    c: &PixelCoefficients,
    alpha2: f64,
    cols: usize,
    rows: usize,
    x: usize,
    y: usize,
) -> (f32, f32) {
    let i = y * cols + x;
    let avg_u = neighbour_average(u, cols, rows, x, y);
    let avg_v = neighbour_average(v, cols, rows, x, y);
    let (u_old, v_old) = (u[i] as f64, v[i] as f64);
    let d = c.d as f64;

    let u_new = (1.0 - SOR_OMEGA) * u_old
        + SOR_OMEGA * (c.au as f64 - d * v_old + alpha2 * avg_u) / non_zero(c.du);
    let u_new = u_new as f32;

    let v_new = (1.0 - SOR_OMEGA) * v_old
        + SOR_OMEGA * (c.av as f64 - d * u_new as f64 + alpha2 * avg_v) / non_zero(c.dv);

    (u_new, v_new as f32)
}

/// Run one relaxation sweep over the whole field.
///
/// # Arguments
///
/// * `flow` - The flow field, updated in place.
/// * `coefficients` - The linearized data term of the current warp.
/// * `alpha` - The smoothness weight.
/// * `order` - The pixel visiting order.
///
/// # Returns
///
/// The RMS magnitude of the flow update, `sqrt(sum(du^2 + dv^2) / N)`.
///
/// PRECONDITION: `flow` and `coefficients` must have the same size.
pub fn relax_sweep(
    flow: &mut FlowField,
    coefficients: &Image<PixelCoefficients>,
    alpha: f32,
    order: RelaxationOrder,
) -> f32 {
    let (cols, rows) = (flow.width(), flow.height());
    if cols == 0 || rows == 0 {
        return 0.0;
    }

    let alpha2 = (alpha * alpha) as f64;
    let (u, v) = flow.components_mut();
    let (u, v) = (u.as_slice_mut(), v.as_slice_mut());
    let coefficients = coefficients.as_slice();

    let sum = match order {
        RelaxationOrder::Sequential => sweep_sequential(u, v, coefficients, alpha2, cols, rows),
        RelaxationOrder::Checkerboard => {
            sweep_checkerboard(u, v, coefficients, alpha2, cols, rows)
        }
    };

    (sum / (cols * rows) as f64).sqrt() as f32
}

fn sweep_sequential(
    u: &mut [f32],
    v: &mut [f32],
    coefficients: &[PixelCoefficients],
    alpha2: f64,
    cols: usize,
    rows: usize,
) -> f64 {
    let mut sum = 0.0;
    for y in 0..rows {
        for x in 0..cols {
            let i = y * cols + x;
            let (u_new, v_new) = relax_pixel(u, v, &coefficients[i], alpha2, cols, rows, x, y);
            sum += squared_update(u[i], v[i], u_new, v_new);
            u[i] = u_new;
            v[i] = v_new;
        }
    }
    sum
}

// Pixels of one phase share the parity of both coordinates, so no two of them
// are 8-neighbours and they can be relaxed from the same snapshot.
fn sweep_checkerboard(
    u: &mut [f32],
    v: &mut [f32],
    coefficients: &[PixelCoefficients],
    alpha2: f64,
    cols: usize,
    rows: usize,
) -> f64 {
    let mut sum = 0.0;
    for (row_parity, col_parity) in [(0, 0), (0, 1), (1, 1), (1, 0)] {
        let updates = {
            let (u, v) = (&*u, &*v);
            (row_parity..rows)
                .into_par_iter()
                .step_by(2)
                .map(|y| {
                    (col_parity..cols)
                        .step_by(2)
                        .map(|x| {
                            let i = y * cols + x;
                            let (u_new, v_new) =
                                relax_pixel(u, v, &coefficients[i], alpha2, cols, rows, x, y);
                            (i, u_new, v_new)
                        })
                        .collect::<Vec<_>>()
                })
                .collect::<Vec<_>>()
        };

        for (i, u_new, v_new) in updates.into_iter().flatten() {
            sum += squared_update(u[i], v[i], u_new, v_new);
            u[i] = u_new;
            v[i] = v_new;
        }
    }
    sum
}

#[inline]
fn squared_update(u_old: f32, v_old: f32, u_new: f32, v_new: f32) -> f64 {
    let du = (u_new - u_old) as f64;
    let dv = (v_new - v_old) as f64;
    du * du + dv * dv
}
