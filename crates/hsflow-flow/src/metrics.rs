//! Accuracy of an estimated flow against a ground truth.
//!
//! Ground truth vectors with a component above [`UNKNOWN_FLOW_THRESHOLD`]
//! mark pixels without a known flow and are excluded from every metric.

use crate::{error::FlowError, field::FlowField};

/// Ground truth components above this value are unknown.
pub const UNKNOWN_FLOW_THRESHOLD: f32 = 1e9;

/// Whether a ground truth vector is known.
#[inline]
pub fn is_known(u: f32, v: f32) -> bool {
    u <= UNKNOWN_FLOW_THRESHOLD && v <= UNKNOWN_FLOW_THRESHOLD
}

fn known_pairs<'a>(
    flow: &'a FlowField,
    ground_truth: &'a FlowField,
) -> Result<impl Iterator<Item = (usize, [f32; 4])> + 'a, FlowError> {
    if flow.size() != ground_truth.size() {
        return Err(FlowError::FlowSizeMismatch(flow.size(), ground_truth.size()));
    }

    let pairs = flow
        .u()
        .as_slice()
        .iter()
        .zip(flow.v().as_slice())
        .zip(ground_truth.u().as_slice().iter().zip(ground_truth.v().as_slice()))
        .enumerate()
        .filter(|(_, (_, (&gu, &gv)))| is_known(gu, gv))
        .map(|(i, ((&u, &v), (&gu, &gv)))| (i, [u, v, gu, gv]));

    Ok(pairs)
}

#[inline]
fn endpoint(u: f32, v: f32, gu: f32, gv: f32) -> f64 {
    ((u - gu) as f64).hypot((v - gv) as f64)
}

/// Mean endpoint error, the average Euclidean distance between flow vectors.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
///
/// # Example
///
/// ```
/// use hsflow_image::Image;
/// use hsflow_flow::{metrics::endpoint_error, FlowField};
///
/// let flow = FlowField::new([2, 2].into()).unwrap();
/// let gt = FlowField::from_components(
///     Image::from_size_val([2, 2].into(), 3.0).unwrap(),
///     Image::from_size_val([2, 2].into(), 4.0).unwrap(),
/// ).unwrap();
///
/// assert_eq!(endpoint_error(&flow, &gt).unwrap(), 5.0);
/// ```
pub fn endpoint_error(flow: &FlowField, ground_truth: &FlowField) -> Result<f32, FlowError> {
    let (sum, count) = known_pairs(flow, ground_truth)?
        .fold((0.0, 0usize), |(sum, count), (_, [u, v, gu, gv])| {
            (sum + endpoint(u, v, gu, gv), count + 1)
        });

    if count == 0 {
        return Err(FlowError::NoKnownPixels);
    }
    Ok((sum / count as f64) as f32)
}

#[inline]
fn angle(u: f32, v: f32, gu: f32, gv: f32) -> f64 {
    let (u, v, gu, gv) = (u as f64, v as f64, gu as f64, gv as f64);
    let n1 = (u * u + v * v + 1.0).sqrt();
    let n2 = (gu * gu + gv * gv + 1.0).sqrt();
    let angle = ((u * gu + v * gv + 1.0) / (n1 * n2)).acos();
    if angle.is_nan() {
        0.0
    } else {
        angle
    }
}

/// Mean angular error in degrees between the space-time vectors `(u, v, 1)`.
///
/// A pixel whose cosine falls outside `[-1, 1]` by rounding counts as 0.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
pub fn angular_error(flow: &FlowField, ground_truth: &FlowField) -> Result<f32, FlowError> {
    let (sum, count) = known_pairs(flow, ground_truth)?
        .fold((0.0, 0usize), |(sum, count), (_, [u, v, gu, gv])| {
            (sum + angle(u, v, gu, gv), count + 1)
        });

    if count == 0 {
        return Err(FlowError::NoKnownPixels);
    }
    Ok((sum / count as f64).to_degrees() as f32)
}

// First known pixel whose error wins `better` against every other pixel.
fn extreme_pixel(
    flow: &FlowField,
    ground_truth: &FlowField,
    error: impl Fn(f32, f32, f32, f32) -> f64,
    better: impl Fn(f64, f64) -> bool,
) -> Result<(usize, usize, f64), FlowError> {
    let cols = flow.width();
    let best = known_pairs(flow, ground_truth)?
        .map(|(i, [u, v, gu, gv])| (i, error(u, v, gu, gv)))
        .fold(None, |best: Option<(usize, f64)>, (i, e)| match best {
            Some((_, b)) if !better(e, b) => best,
            _ => Some((i, e)),
        });

    let (i, e) = best.ok_or(FlowError::NoKnownPixels)?;
    Ok((i % cols, i / cols, e))
}

/// Find the pixel with the largest endpoint error.
///
/// # Returns
///
/// The column, the row and the endpoint error of the worst known pixel.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
pub fn max_endpoint_error(
    flow: &FlowField,
    ground_truth: &FlowField,
) -> Result<(usize, usize, f32), FlowError> {
    let (x, y, e) = extreme_pixel(flow, ground_truth, endpoint, |e, b| e > b)?;
    Ok((x, y, e as f32))
}

/// Find the pixel with the smallest endpoint error.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
pub fn min_endpoint_error(
    flow: &FlowField,
    ground_truth: &FlowField,
) -> Result<(usize, usize, f32), FlowError> {
    let (x, y, e) = extreme_pixel(flow, ground_truth, endpoint, |e, b| e < b)?;
    Ok((x, y, e as f32))
}

/// Find the pixel with the largest angular error, in degrees.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
pub fn max_angular_error(
    flow: &FlowField,
    ground_truth: &FlowField,
) -> Result<(usize, usize, f32), FlowError> {
    let (x, y, a) = extreme_pixel(flow, ground_truth, angle, |a, b| a > b)?;
    Ok((x, y, a.to_degrees() as f32))
}

/// Find the pixel with the smallest angular error, in degrees.
///
/// # Errors
///
/// Returns an error if the fields differ in size or no ground truth vector is known.
pub fn min_angular_error(
    flow: &FlowField,
    ground_truth: &FlowField,
) -> Result<(usize, usize, f32), FlowError> {
    let (x, y, a) = extreme_pixel(flow, ground_truth, angle, |a, b| a < b)?;
    Ok((x, y, a.to_degrees() as f32))
}
