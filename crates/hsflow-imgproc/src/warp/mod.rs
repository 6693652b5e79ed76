//! Dense image warping.
//!
//! Unlike a parametric warp, every pixel is displaced by its own vector read
//! from a pair of flow component images.

mod flow;

pub use flow::warp_flow;
