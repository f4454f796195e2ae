use super::alignment_config::{AlignmentConfig, DetectorKwargs, ModelSource};
use super::alignment_error::AlignmentError;
use super::landmarks_type::LandmarksType;

/// Resolved construction request handed to the landmark runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentSettings {
    pub landmarks_type: LandmarksType,
    pub device: String,
    pub flip_input: bool,
    pub face_detector: String,
    pub face_detector_kwargs: DetectorKwargs,
    pub models: ModelSource,
}

impl AlignmentSettings {
    pub fn from_config(config: &AlignmentConfig) -> Self {
        Self {
            landmarks_type: config.dimension.landmarks_type(),
            device: config.device.clone(),
            flip_input: config.flip_input,
            face_detector: config.face_detector.clone(),
            face_detector_kwargs: config.face_detector_kwargs.clone(),
            models: config.models.clone(),
        }
    }
}

/// Construction entry point of a landmark runtime.
///
/// Validation of devices, backends and their options belongs to the
/// implementation; callers only see its errors.
pub trait AlignmentLibrary: Send + Sync {
    type Handle: Send + Sync;

    fn construct(&self, settings: &AlignmentSettings) -> Result<Self::Handle, AlignmentError>;
}
