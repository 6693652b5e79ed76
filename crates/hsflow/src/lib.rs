//! Coarse-to-fine Horn-Schunck optical flow.
//!
//! ```no_run
//! use hsflow::{flow, io};
//!
//! let frame1 = io::functional::read_image_gray("frame10.png").unwrap();
//! let frame2 = io::functional::read_image_gray("frame11.png").unwrap();
//!
//! let estimate =
//!     flow::horn_schunck_pyramidal(&frame1, &frame2, &flow::HornSchunckConfig::default()).unwrap();
//!
//! io::flo::write_flo("flow.flo", &estimate.flow).unwrap();
//! ```

#[doc(inline)]
pub use hsflow_image as image;

#[doc(inline)]
pub use hsflow_imgproc as imgproc;

#[doc(inline)]
pub use hsflow_flow as flow;

#[doc(inline)]
pub use hsflow_io as io;
