//! Filter operations
//!
//! This module provides the smoothing and derivative filters used by the flow pipeline.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
