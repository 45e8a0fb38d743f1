use thiserror::Error;

/// Library error type for slider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The configured slide directory is invalid or unreadable.
    #[error("invalid slide directory: {0}")]
    BadDir(String),

    /// The scan completed but found no images.
    #[error("no images found in slide directory")]
    EmptyScan,

    /// The slide list is unusable (empty, or duplicate ids).
    #[error("invalid slide set: {0}")]
    BadSlideSet(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),

    /// Rendering/display error from the downstream viewer.
    #[error("render error: {0}")]
    Render(anyhow::Error),
}
