use hsflow_flow::{
    horn_schunck_pyramidal, metrics::endpoint_error, FlowError, FlowField, HornSchunckConfig,
    RelaxationOrder,
};
use hsflow_image::Image;

const WIDTH: usize = 80;
const HEIGHT: usize = 64;

fn texture(x: f32, y: f32) -> f32 {
    128.0 + 50.0 * (0.35 * x + 0.2 * y).sin() + 40.0 * (0.27 * y - 0.15 * x).cos()
}

fn translated_pair(dx: f32, dy: f32) -> (Image<f32>, Image<f32>) {
    let size = [WIDTH, HEIGHT].into();
    let frame1 = Image::from_fn(size, |x, y| texture(x as f32, y as f32));
    let frame2 = Image::from_fn(size, |x, y| texture(x as f32 - dx, y as f32 - dy));
    (frame1, frame2)
}

// keeps the pixels at least a quarter of the size away from the border
fn interior(flow: &FlowField) -> Result<FlowField, FlowError> {
    let (mx, my) = (WIDTH / 4, HEIGHT / 4);
    let size = [WIDTH - 2 * mx, HEIGHT - 2 * my].into();
    let u = Image::from_fn(size, |x, y| flow.u().get_pixel(x + mx, y + my).unwrap_or(0.0));
    let v = Image::from_fn(size, |x, y| flow.v().get_pixel(x + mx, y + my).unwrap_or(0.0));
    FlowField::from_components(u, v)
}

fn constant_flow(size: [usize; 2], u: f32, v: f32) -> Result<FlowField, FlowError> {
    FlowField::from_components(
        Image::from_size_val(size.into(), u)?,
        Image::from_size_val(size.into(), v)?,
    )
}

#[test]
fn test_translation_sequential() -> Result<(), FlowError> {
    let (frame1, frame2) = translated_pair(2.0, 1.0);
    let config = HornSchunckConfig::default();

    let estimate = horn_schunck_pyramidal(&frame1, &frame2, &config)?;

    assert_eq!(estimate.flow.size(), frame1.size());
    assert_eq!(estimate.report.len(), 5);

    let inner = interior(&estimate.flow)?;
    for (&u, &v) in inner.u().as_slice().iter().zip(inner.v().as_slice()) {
        assert!((u - 2.0).abs() < 0.25, "u = {u}");
        assert!((v - 1.0).abs() < 0.25, "v = {v}");
    }

    let truth = constant_flow([inner.width(), inner.height()], 2.0, 1.0)?;
    let epe = endpoint_error(&inner, &truth)?;
    assert!(epe < 0.1, "epe = {epe}");
    Ok(())
}

#[test]
fn test_translation_checkerboard() -> Result<(), FlowError> {
    let (frame1, frame2) = translated_pair(2.0, 1.0);
    let config = HornSchunckConfig {
        relaxation: RelaxationOrder::Checkerboard,
        ..Default::default()
    };

    let estimate = horn_schunck_pyramidal(&frame1, &frame2, &config)?;

    let inner = interior(&estimate.flow)?;
    let truth = constant_flow([inner.width(), inner.height()], 2.0, 1.0)?;
    let epe = endpoint_error(&inner, &truth)?;
    assert!(epe < 0.15, "epe = {epe}");
    Ok(())
}

#[test]
fn test_translation_negative_direction() -> Result<(), FlowError> {
    let (frame1, frame2) = translated_pair(-1.0, 0.0);
    let config = HornSchunckConfig {
        n_scales: 3,
        ..Default::default()
    };

    let estimate = horn_schunck_pyramidal(&frame1, &frame2, &config)?;

    let inner = interior(&estimate.flow)?;
    let truth = constant_flow([inner.width(), inner.height()], -1.0, 0.0)?;
    let epe = endpoint_error(&inner, &truth)?;
    assert!(epe < 0.15, "epe = {epe}");
    Ok(())
}
