use hsflow_image::{Image, ImageSize};
use hsflow_imgproc::filter::spatial_gradient;

use crate::{
    coefficients::{build_coefficients, WarpedTarget},
    config::HornSchunckConfig,
    error::FlowError,
    field::FlowField,
    sor::relax_sweep,
};

/// Outcome of the relaxation of one warp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpReport {
    /// The number of sweeps performed.
    pub iterations: usize,
    /// The RMS flow update of the last sweep.
    pub error: f32,
    /// Whether the error reached the stop criterion before the iteration cap.
    pub converged: bool,
}

/// Outcome of the solve of one pyramid level.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelReport {
    /// The level index, 0 being the finest.
    pub level: usize,
    /// The size of the level.
    pub size: ImageSize,
    /// One report per warp, in order.
    pub warps: Vec<WarpReport>,
}

/// Refine a flow field on one pyramid level.
///
/// The gradient of `frame2` is computed once. Every warp then warps `frame2`
/// and its gradient by the current flow, rebuilds the linearized data term
/// and relaxes until the RMS update reaches `stop_criterion` or
/// `max_iterations` sweeps have run. Not converging is not an error; the
/// report records it.
///
/// # Arguments
///
/// * `level` - The level index, used for reporting.
/// * `frame1` - The reference frame.
/// * `frame2` - The target frame.
/// * `flow` - The initial flow, refined in place.
/// * `config` - The solver parameters.
///
/// # Errors
///
/// Returns an error if the frames or the flow field differ in size.
pub fn solve_level(
    level: usize,
    frame1: &Image<f32>,
    frame2: &Image<f32>,
    flow: &mut FlowField,
    config: &HornSchunckConfig,
) -> Result<LevelReport, FlowError> {
    let size = frame1.size();
    if frame2.size() != size {
        return Err(FlowError::FrameSizeMismatch(size, frame2.size()));
    }
    if flow.size() != size {
        return Err(FlowError::FlowSizeMismatch(flow.size(), size));
    }

    log::info!("solving level {level} ({}x{})", size.width, size.height);

    let mut dx = Image::from_size_val(size, 0.0)?;
    let mut dy = Image::from_size_val(size, 0.0)?;
    spatial_gradient(frame2, &mut dx, &mut dy)?;

    let mut warps = Vec::with_capacity(config.n_warps);
    for warp in 0..config.n_warps {
        let warped = WarpedTarget::warp(frame2, &dx, &dy, flow)?;
        let coefficients = build_coefficients(frame1, &warped, flow, config.alpha)?;

        let mut iterations = 0;
        let mut error = f32::INFINITY;
        while error > config.stop_criterion && iterations < config.max_iterations {
            error = relax_sweep(flow, &coefficients, config.alpha, config.relaxation);
            iterations += 1;
        }

        let converged = error <= config.stop_criterion;
        log::debug!("level {level} warp {warp}: {iterations} iterations, error {error:.3e}");

        warps.push(WarpReport {
            iterations,
            error,
            converged,
        });
    }

    Ok(LevelReport { level, size, warps })
}
