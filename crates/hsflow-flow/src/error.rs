use hsflow_image::{ImageError, ImageSize};

/// An error type for the flow module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum FlowError {
    /// Error raised by an image operation.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Error when the two frames of a flow problem differ in size.
    #[error("Frame sizes do not match: {0} vs {1}")]
    FrameSizeMismatch(ImageSize, ImageSize),

    /// Error when a frame has no pixels.
    #[error("Frame is empty: {0}")]
    EmptyFrame(ImageSize),

    /// Error when a flow field does not match the size it is used with.
    #[error("Flow field size {0} does not match {1}")]
    FlowSizeMismatch(ImageSize, ImageSize),

    /// Error when a configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error when a ground truth flow has no known pixel.
    #[error("Ground truth has no known flow vector")]
    NoKnownPixels,
}
