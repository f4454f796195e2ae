use thiserror::Error;

use crate::shared::model_resolver::ModelResolveError;

#[derive(Error, Debug)]
pub enum AlignmentError {
    #[error("unknown dimension {0:?} (expected one of 2D, 2.5D, 3D)")]
    UnknownDimension(String),
    #[error("invalid device {0:?}")]
    InvalidDevice(String),
    #[error("device {0:?} is not supported on this platform")]
    UnsupportedDevice(String),
    #[error("unknown face detector {0:?}")]
    UnknownFaceDetector(String),
    #[error("invalid option {key:?} for face detector {detector:?}: {reason}")]
    InvalidDetectorOption {
        detector: String,
        key: String,
        reason: String,
    },
    #[error("model unavailable: {0}")]
    Model(#[from] ModelResolveError),
    #[error("runtime error: {0}")]
    Runtime(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}
