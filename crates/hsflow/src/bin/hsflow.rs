use argh::FromArgs;
use std::path::PathBuf;

use hsflow::{
    flow::{self, metrics, HornSchunckConfig},
    io::{flo, functional, visualize},
};

#[derive(FromArgs)]
/// Estimate the optical flow between two frames with pyramidal Horn-Schunck
struct Args {
    /// path to the first frame
    #[argh(positional)]
    frame1: PathBuf,

    /// path to the second frame
    #[argh(positional)]
    frame2: PathBuf,

    /// path of the output .flo file
    #[argh(option, short = 'o')]
    output: PathBuf,

    /// path to a json file with solver parameters
    #[argh(option)]
    config: Option<PathBuf>,

    /// the smoothness weight
    #[argh(option)]
    alpha: Option<f32>,

    /// the number of warps per pyramid level
    #[argh(option)]
    warps: Option<usize>,

    /// the number of pyramid levels
    #[argh(option)]
    scales: Option<usize>,

    /// path of a png with the colour coded flow
    #[argh(option)]
    color: Option<PathBuf>,

    /// path of a png with one arrow per pixel
    #[argh(option)]
    arrows: Option<PathBuf>,

    /// side in pixels of the cell drawn for each arrow
    #[argh(option, default = "8")]
    cell_size: usize,

    /// path of a text dump of the flow, `u:v` per pixel
    #[argh(option)]
    csv: Option<PathBuf>,

    /// path to a ground truth .flo file to evaluate the result against
    #[argh(option)]
    ground_truth: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => serde_json::from_str::<HornSchunckConfig>(&std::fs::read_to_string(path)?)?,
        None => HornSchunckConfig::default(),
    };
    if let Some(alpha) = args.alpha {
        config.alpha = alpha;
    }
    if let Some(warps) = args.warps {
        config.n_warps = warps;
    }
    if let Some(scales) = args.scales {
        config.n_scales = scales;
    }

    let frame1 = functional::read_image_gray(&args.frame1)?;
    let frame2 = functional::read_image_gray(&args.frame2)?;
    log::info!(
        "computing flow between {} and {} ({})",
        args.frame1.display(),
        args.frame2.display(),
        frame1.size()
    );

    let now = std::time::Instant::now();
    let estimate = flow::horn_schunck_pyramidal(&frame1, &frame2, &config)?;
    log::info!("flow computed in {:?}", now.elapsed());

    if !estimate.converged() {
        log::warn!("some warps reached the iteration cap before converging");
    }

    flo::write_flo(&args.output, &estimate.flow)?;
    log::info!("flow written to {}", args.output.display());

    if let Some(path) = &args.color {
        visualize::write_flow_color(path, &estimate.flow)?;
    }
    if let Some(path) = &args.arrows {
        visualize::write_flow_arrows(path, &estimate.flow, args.cell_size)?;
    }
    if let Some(path) = &args.csv {
        visualize::write_flow_csv(path, &estimate.flow)?;
    }

    if let Some(path) = &args.ground_truth {
        let truth = flo::read_flo(path)?;
        let epe = metrics::endpoint_error(&estimate.flow, &truth)?;
        let aae = metrics::angular_error(&estimate.flow, &truth)?;
        let (x, y, max_epe) = metrics::max_endpoint_error(&estimate.flow, &truth)?;
        log::info!("EPE: {epe:.4} AAE: {aae:.4} max EPE: {max_epe:.4} at ({x}, {y})");
        let (x, y, min_epe) = metrics::min_endpoint_error(&estimate.flow, &truth)?;
        log::info!("min EPE: {min_epe:.4} at ({x}, {y})");
        let (x, y, max_ae) = metrics::max_angular_error(&estimate.flow, &truth)?;
        let (mx, my, min_ae) = metrics::min_angular_error(&estimate.flow, &truth)?;
        log::info!("max AE: {max_ae:.4} at ({x}, {y}) min AE: {min_ae:.4} at ({mx}, {my})");
        println!("EPE={epe:.6} AAE={aae:.6}");
    }

    Ok(())
}
