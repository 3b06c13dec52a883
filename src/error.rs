use thiserror::Error;

/// Errors raised by the drawing surface and its history snapshots
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("Invalid surface dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Invalid colour: {0}")]
    InvalidColour(String),

    #[error("Size mismatch: expected {expected:?}, got {actual:?}")]
    SizeMismatch {
        expected: [u32; 2],
        actual: [u32; 2],
    },

    #[error("Image codec failed: {0}")]
    Image(#[from] image::ImageError),
}

/// Errors that can occur while loading or saving a canvas configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid config value: {0}")]
    Invalid(String),
}

pub type CanvasResult<T> = Result<T, CanvasError>;
