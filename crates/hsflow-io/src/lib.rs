#![deny(missing_docs)]
//! Reading frames, reading/writing flow fields and rendering them.

/// Error types for the io module.
pub mod error;

/// Middlebury `.flo` flow files.
pub mod flo;

/// Image file decoding.
pub mod functional;

/// Flow field rendering and text export.
pub mod visualize;

pub use crate::error::IoError;
