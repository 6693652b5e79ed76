//! Pixel interpolation methods for image transformations.
//!
//! Every resampling operation in this crate (resizing, flow warping, pyramid
//! construction) goes through the bicubic sampler defined here.
//!
//! # Boundary Policies
//!
//! - **Clamp**: out-of-range taps replicate the nearest edge pixel (Neumann).
//! - **Zero**: a sample whose 4x4 neighbourhood leaves the grid is exactly 0.

mod cubic;
mod sampler;

pub use cubic::{bicubic, cubic_1d};
pub use sampler::{bicubic_interpolation, clamp_index, BoundaryPolicy};
