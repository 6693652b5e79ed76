//! Middlebury `.flo` files.
//!
//! Layout, all little endian: the `f32` tag `202021.25`, the `i32` width and
//! height, then `width * height` interleaved `(u, v)` `f32` pairs in row-major order.

use std::path::Path;

use hsflow_flow::FlowField;
use hsflow_image::{Image, ImageSize};

use crate::error::IoError;

/// The tag at the start of every `.flo` file ("PIEH" in ASCII).
pub const FLO_TAG: f32 = 202021.25;

const HEADER_LEN: usize = 12;

/// Decode a flow field from the bytes of a `.flo` file.
///
/// # Errors
///
/// Returns an error if the tag is wrong, the dimensions are invalid or the
/// payload length does not match them.
pub fn decode_flo(bytes: &[u8]) -> Result<FlowField, IoError> {
    if bytes.len() < HEADER_LEN {
        return Err(IoError::InvalidFloLength(bytes.len(), HEADER_LEN));
    }

    let word = |i: usize| [bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]];
    let tag = f32::from_le_bytes(word(0));
    if tag != FLO_TAG {
        return Err(IoError::InvalidFloTag(tag));
    }

    let (width, height) = (i32::from_le_bytes(word(4)), i32::from_le_bytes(word(8)));
    let size = match (usize::try_from(width), usize::try_from(height)) {
        (Ok(w), Ok(h)) => ImageSize {
            width: w,
            height: h,
        },
        _ => return Err(IoError::InvalidFloSize(width, height)),
    };

    let expected = size
        .area()
        .checked_mul(8)
        .and_then(|n| n.checked_add(HEADER_LEN))
        .ok_or(IoError::InvalidFloSize(width, height))?;
    if bytes.len() != expected {
        return Err(IoError::InvalidFloLength(bytes.len(), expected));
    }

    let (u, v): (Vec<f32>, Vec<f32>) = bytes[HEADER_LEN..]
        .chunks_exact(8)
        .map(|pair| {
            let u = f32::from_le_bytes([pair[0], pair[1], pair[2], pair[3]]);
            let v = f32::from_le_bytes([pair[4], pair[5], pair[6], pair[7]]);
            (u, v)
        })
        .unzip();

    Ok(FlowField::from_components(
        Image::new(size, u)?,
        Image::new(size, v)?,
    )?)
}

/// Encode a flow field into the bytes of a `.flo` file.
///
/// # Errors
///
/// Returns an error if a dimension does not fit in an `i32`.
pub fn encode_flo(flow: &FlowField) -> Result<Vec<u8>, IoError> {
    let (width, height) = (flow.width(), flow.height());
    let (w, h) = match (i32::try_from(width), i32::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => return Err(IoError::InvalidFloSize(i32::MAX, i32::MAX)),
    };

    let mut bytes = Vec::with_capacity(HEADER_LEN + flow.size().area() * 8);
    bytes.extend_from_slice(&FLO_TAG.to_le_bytes());
    bytes.extend_from_slice(&w.to_le_bytes());
    bytes.extend_from_slice(&h.to_le_bytes());
    for (u, v) in flow.u().as_slice().iter().zip(flow.v().as_slice()) {
        bytes.extend_from_slice(&u.to_le_bytes());
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    Ok(bytes)
}

/// Read a flow field from a `.flo` file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.flo` file.
pub fn read_flo(file_path: impl AsRef<Path>) -> Result<FlowField, IoError> {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return Err(IoError::FileDoesNotExist(file_path.to_path_buf()));
    }

    let bytes = std::fs::read(file_path)?;
    decode_flo(&bytes)
}

/// Write a flow field to a `.flo` file.
///
/// # Arguments
///
/// * `file_path` - The path to the `.flo` file.
/// * `flow` - The flow field to write.
pub fn write_flo(file_path: impl AsRef<Path>, flow: &FlowField) -> Result<(), IoError> {
    let bytes = encode_flo(flow)?;
    std::fs::write(file_path, bytes)?;
    Ok(())
}
