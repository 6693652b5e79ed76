use hsflow_image::Image;

use crate::{
    config::HornSchunckConfig,
    error::FlowError,
    field::FlowField,
    level::{solve_level, LevelReport},
    pyramid::FramePyramid,
};

/// Result of a pyramidal flow estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowEstimate {
    /// The flow at the resolution of the input frames.
    pub flow: FlowField,
    /// One report per solved level, coarsest first.
    pub report: Vec<LevelReport>,
}

impl FlowEstimate {
    /// Whether every warp of every level reached the stop criterion.
    pub fn converged(&self) -> bool {
        self.report
            .iter()
            .flat_map(|level| level.warps.iter())
            .all(|warp| warp.converged)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    BuildPyramid,
    SolveLevel(usize),
    Propagate(usize),
    Done,
}

/// Estimate the optical flow from `frame1` to `frame2` with coarse-to-fine Horn-Schunck.
///
/// The frames are normalized and a pyramid of `min(n_scales, max_pyramid_levels)`
/// levels is built. Starting from a zero flow on the coarsest level, every level
/// is refined with warped SOR, then the flow is upsampled to the next finer
/// level and scaled by `1 / downsample_factor`. The flow of level 0 is returned.
///
/// # Arguments
///
/// * `frame1` - The reference frame.
/// * `frame2` - The target frame, same size as `frame1`.
/// * `config` - The solver parameters.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the frames are empty or differ in size.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_flow::{horn_schunck_pyramidal, HornSchunckConfig};
///
/// let frame1 = Image::from_fn([32, 32].into(), |x, y| ((x * 7 + y * 3) % 17) as f32);
/// let frame2 = frame1.clone();
///
/// let estimate = horn_schunck_pyramidal(&frame1, &frame2, &HornSchunckConfig::default()).unwrap();
///
/// assert_eq!(estimate.flow.size(), frame1.size());
/// ```
pub fn horn_schunck_pyramidal(
    frame1: &Image<f32>,
    frame2: &Image<f32>,
    config: &HornSchunckConfig,
) -> Result<FlowEstimate, FlowError> {
    config.validate()?;

    let mut pyramid: Option<FramePyramid> = None;
    let mut flow = FlowField::new(frame1.size())?;
    let mut report = Vec::new();

    let mut stage = Stage::BuildPyramid;
    loop {
        stage = match stage {
            Stage::BuildPyramid => {
                let built = FramePyramid::build(frame1, frame2, config)?;
                let coarsest = built.len() - 1;
                flow = FlowField::new(built.levels()[coarsest].size())?;
                pyramid = Some(built);
                Stage::SolveLevel(coarsest)
            }
            Stage::SolveLevel(i) => {
                let Some(levels) = pyramid.as_ref().map(FramePyramid::levels) else {
                    break;
                };
                let level = &levels[i];
                report.push(solve_level(
                    i,
                    &level.frame1,
                    &level.frame2,
                    &mut flow,
                    config,
                )?);
                if i == 0 {
                    Stage::Done
                } else {
                    Stage::Propagate(i)
                }
            }
            Stage::Propagate(i) => {
                let Some(levels) = pyramid.as_ref().map(FramePyramid::levels) else {
                    break;
                };
                flow = flow.upsample(levels[i - 1].size())?;
                flow.scale(1.0 / config.downsample_factor);
                Stage::SolveLevel(i - 1)
            }
            Stage::Done => break,
        };
    }

    Ok(FlowEstimate { flow, report })
}
