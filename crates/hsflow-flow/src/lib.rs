#![deny(missing_docs)]
//! Coarse-to-fine Horn-Schunck optical flow.
//!
//! The entry point is [`horn_schunck_pyramidal`], which builds a gaussian
//! pyramid of both frames and refines the flow from the coarsest level to the
//! finest with warped successive over-relaxation.

/// Classic single-scale Horn-Schunck.
pub mod classic;

/// Per-warp linearized data terms.
pub mod coefficients;

/// Solver configuration.
pub mod config;

/// Error types for the flow module.
pub mod error;

/// Dense flow field representation.
pub mod field;

/// Per-level warped SOR solver.
pub mod level;

/// Accuracy metrics against a ground truth flow.
pub mod metrics;

/// Frame pyramid construction.
pub mod pyramid;

/// Successive over-relaxation sweeps.
pub mod sor;

/// Coarse-to-fine orchestration.
pub mod solver;

pub use crate::classic::horn_schunck_classic;
pub use crate::config::{HornSchunckConfig, RelaxationOrder};
pub use crate::error::FlowError;
pub use crate::field::FlowField;
pub use crate::level::{LevelReport, WarpReport};
pub use crate::solver::{horn_schunck_pyramidal, FlowEstimate};
