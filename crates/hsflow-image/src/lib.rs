#![deny(missing_docs)]
//! Single-channel intensity grids used by the optical flow pipeline.

/// intensity grid representation.
pub mod image;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
