/// An error type for the io module.
#[derive(thiserror::Error, Debug)]
pub enum IoError {
    /// Error when the file does not exist.
    #[error("File does not exist: {0}")]
    FileDoesNotExist(std::path::PathBuf),

    /// Error to open, read or write the file.
    #[error("Failed to manipulate the file. {0}")]
    FileError(#[from] std::io::Error),

    /// Error to create the image.
    #[error("Failed to create image. {0}")]
    ImageCreationError(#[from] hsflow_image::ImageError),

    /// Error to decode the image.
    #[error("Failed to decode the image. {0}")]
    ImageDecodeError(#[from] image::ImageError),

    /// Error to create the flow field.
    #[error("Failed to create flow field. {0}")]
    FlowCreationError(#[from] hsflow_flow::FlowError),

    /// The file does not start with the `.flo` tag.
    #[error("Invalid flo tag {0}, expected 202021.25")]
    InvalidFloTag(f32),

    /// The header holds a negative or oversized dimension.
    #[error("Invalid flo dimensions {0}x{1}")]
    InvalidFloSize(i32, i32),

    /// The payload is shorter or longer than the header announces.
    #[error("Flo payload has {0} bytes, expected {1}")]
    InvalidFloLength(usize, usize),
}
