use std::io::Write;
use std::path::Path;

use hsflow_flow::{metrics::is_known, FlowField};

use crate::error::IoError;

// Hue segment lengths of the Middlebury colour wheel.
const RY: usize = 15;
const YG: usize = 6;
const GC: usize = 4;
const CB: usize = 11;
const BM: usize = 13;
const MR: usize = 6;

/// Colour of pixels whose flow is unknown, fully transparent.
pub const UNKNOWN_COLOR: [u8; 4] = [255, 255, 255, 0];

fn color_wheel() -> Vec<[u8; 3]> {
    let ramp = |i: usize, n: usize| (255 * i / n) as u8;

    let mut wheel = Vec::with_capacity(RY + YG + GC + CB + BM + MR);
    wheel.extend((0..RY).map(|i| [255, ramp(i, RY), 0]));
    wheel.extend((0..YG).map(|i| [255 - ramp(i, YG), 255, 0]));
    wheel.extend((0..GC).map(|i| [0, 255, ramp(i, GC)]));
    wheel.extend((0..CB).map(|i| [0, 255 - ramp(i, CB), 255]));
    wheel.extend((0..BM).map(|i| [ramp(i, BM), 0, 255]));
    wheel.extend((0..MR).map(|i| [255, 0, 255 - ramp(i, MR)]));
    wheel
}

// Smallest and largest length over the known vectors.
fn magnitude_range(flow: &FlowField) -> Option<(f32, f32)> {
    flow.u()
        .as_slice()
        .iter()
        .zip(flow.v().as_slice())
        .filter(|&(&u, &v)| is_known(u, v))
        .map(|(&u, &v)| u.hypot(v))
        .fold(None, |range, d| match range {
            Some((lo, hi)) => Some((d.min(lo), d.max(hi))),
            None => Some((d, d)),
        })
}

// Map a length into `[0, 1]` over the range, 0 when the range is flat.
fn normalized_length(d: f32, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        (d - lo) / (hi - lo)
    } else {
        0.0
    }
}

fn wheel_color(wheel: &[[u8; 3]], dx: f32, dy: f32, rad: f32) -> [u8; 4] {
    let ncols = wheel.len();
    let a = (-dy).atan2(-dx) / std::f32::consts::PI;
    let fk = (a + 1.0) / 2.0 * (ncols - 1) as f32;
    let k0 = (fk.floor() as usize).min(ncols - 1);
    let k1 = (k0 + 1) % ncols;
    let f = fk - k0 as f32;

    let mut rgba = [255u8; 4];
    for (c, out) in rgba.iter_mut().take(3).enumerate() {
        let col0 = wheel[k0][c] as f32 / 255.0;
        let col1 = wheel[k1][c] as f32 / 255.0;
        let col = (1.0 - f) * col0 + f * col1;
        let col = if rad <= 1.0 {
            1.0 - rad * (1.0 - col)
        } else {
            col * 0.75
        };
        *out = (255.0 * col).round().clamp(0.0, 255.0) as u8;
    }
    rgba
}

/// Render a flow field with the Middlebury colour coding.
///
/// Hue encodes the direction of each vector and saturation its length, scaled
/// so the shortest known vector is white and the longest fully saturated.
/// Pixels whose flow is unknown are painted [`UNKNOWN_COLOR`].
///
/// # Example
///
/// ```
/// use hsflow_flow::FlowField;
/// use hsflow_io::visualize::flow_to_color;
///
/// let flow = FlowField::new([3, 2].into()).unwrap();
/// let rgba = flow_to_color(&flow);
///
/// assert_eq!(rgba.dimensions(), (3, 2));
/// assert_eq!(rgba.get_pixel(0, 0).0, [255, 255, 255, 255]);
/// ```
pub fn flow_to_color(flow: &FlowField) -> image::RgbaImage {
    let wheel = color_wheel();
    let range = magnitude_range(flow).unwrap_or((0.0, 0.0));
    let cols = flow.width();
    let (u, v) = (flow.u().as_slice(), flow.v().as_slice());

    image::RgbaImage::from_fn(flow.width() as u32, flow.height() as u32, |x, y| {
        let i = y as usize * cols + x as usize;
        let (u, v) = (u[i], v[i]);
        if !is_known(u, v) {
            return image::Rgba(UNKNOWN_COLOR);
        }

        let d = u.hypot(v);
        let (dx, dy) = if d > 0.0 { (u / d, v / d) } else { (0.0, 0.0) };
        let rad = normalized_length(d, range);
        image::Rgba(wheel_color(&wheel, dx * rad, dy * rad, rad))
    })
}

/// Write the colour coding of a flow field to an image file.
///
/// The format follows the file extension and must support an alpha channel.
pub fn write_flow_color(file_path: impl AsRef<Path>, flow: &FlowField) -> Result<(), IoError> {
    flow_to_color(flow).save(file_path)?;
    Ok(())
}

fn put(img: &mut image::GrayImage, x: i64, y: i64, value: u8) {
    if x >= 0 && y >= 0 && x < img.width() as i64 && y < img.height() as i64 {
        img.put_pixel(x as u32, y as u32, image::Luma([value]));
    }
}

// Bresenham line, pixels outside the canvas are dropped.
fn draw_line(img: &mut image::GrayImage, p0: (i64, i64), p1: (i64, i64), value: u8) {
    let (mut x0, mut y0) = p0;
    let (x1, y1) = p1;

    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        put(img, x0, y0, value);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Draw one arrow per pixel of a flow field on a white canvas.
///
/// Every pixel owns a `cell_size` square. A black dot marks the cell centre
/// and a line points along the flow, its length scaled so the longest known
/// vector spans half a cell. Unknown vectors only get the dot.
///
/// # Arguments
///
/// * `flow` - The flow field.
/// * `cell_size` - The side of the square drawn for each pixel.
pub fn flow_to_arrows(flow: &FlowField, cell_size: usize) -> image::GrayImage {
    let mut canvas = image::GrayImage::from_pixel(
        (flow.width() * cell_size) as u32,
        (flow.height() * cell_size) as u32,
        image::Luma([255]),
    );

    let range = magnitude_range(flow).unwrap_or((0.0, 0.0));
    let half = (cell_size / 2) as f32;
    let cols = flow.width();
    let (u, v) = (flow.u().as_slice(), flow.v().as_slice());

    for (i, (&u, &v)) in u.iter().zip(v).enumerate() {
        let cx = ((i % cols) * cell_size + cell_size / 2) as i64;
        let cy = ((i / cols) * cell_size + cell_size / 2) as i64;

        for (ox, oy) in [(0, 0), (-1, 0), (1, 0), (0, -1), (0, 1)] {
            put(&mut canvas, cx + ox, cy + oy, 0);
        }

        if !is_known(u, v) {
            continue;
        }
        let d = u.hypot(v);
        if d == 0.0 {
            continue;
        }
        let len = normalized_length(d, range) * half;
        let ex = cx + (len * u / d).round() as i64;
        let ey = cy + (len * v / d).round() as i64;
        draw_line(&mut canvas, (cx, cy), (ex, ey), 0);
    }

    canvas
}

/// Write the arrow plot of a flow field to an image file.
pub fn write_flow_arrows(
    file_path: impl AsRef<Path>,
    flow: &FlowField,
    cell_size: usize,
) -> Result<(), IoError> {
    flow_to_arrows(flow, cell_size).save(file_path)?;
    Ok(())
}

/// Write a flow field as text, one line per row and `u:v, ` per pixel.
pub fn write_flow_csv(file_path: impl AsRef<Path>, flow: &FlowField) -> Result<(), IoError> {
    let mut out = std::io::BufWriter::new(std::fs::File::create(file_path)?);
    let cols = flow.width().max(1);

    for (u_row, v_row) in flow
        .u()
        .as_slice()
        .chunks_exact(cols)
        .zip(flow.v().as_slice().chunks_exact(cols))
    {
        for (u, v) in u_row.iter().zip(v_row) {
            write!(out, "{u}:{v}, ")?;
        }
        writeln!(out)?;
    }

    out.flush()?;
    Ok(())
}
