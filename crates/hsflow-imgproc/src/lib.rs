#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image filtering module.
pub mod filter;

/// utilities for interpolation.
pub mod interpolation;

/// operations to normalize images.
pub mod normalize;

/// module containing parallelization utilities.
pub mod parallel;

/// Pyramid operations
pub mod pyramid;

/// utility functions for resizing images.
pub mod resize;

/// image geometric transformations module.
pub mod warp;
