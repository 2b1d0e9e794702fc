use thiserror::Error;

/// Errors surfaced by the motion engine.
///
/// Analyzers, the face verifier and the aggregator never return these; they
/// degrade to neutral values instead. Only video/pose I/O and configuration
/// can fail an analysis pass.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Video decode failed: {0}")]
    VideoDecode(String),
    #[error("Video probe failed: {0}")]
    VideoProbe(String),
    #[error("Frame extraction failed at {timestamp:.3}s: {message}")]
    FrameExtraction { timestamp: f64, message: String },
    #[error("Pose estimation failed: {0}")]
    PoseEstimation(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl EngineError {
    /// Whether the error should abort the whole analysis pass.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, EngineError::InvalidInput(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
