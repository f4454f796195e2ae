use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::alignment_error::AlignmentError;
use super::landmarks_type::Dimension;

pub const DEFAULT_DEVICE: &str = "cpu";
pub const DEFAULT_FACE_DETECTOR: &str = "sfd";
pub const DEFAULT_FILTER_THRESHOLD: f64 = 0.8;

/// Keyword options forwarded untouched to the face-detector backend.
pub type DetectorKwargs = BTreeMap<String, serde_json::Value>;

/// `{"filter_threshold": 0.8}`
pub fn default_face_detector_kwargs() -> DetectorKwargs {
    BTreeMap::from([(
        "filter_threshold".to_string(),
        serde_json::Value::from(DEFAULT_FILTER_THRESHOLD),
    )])
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

fn default_face_detector() -> String {
    DEFAULT_FACE_DETECTOR.to_string()
}

/// Where model files are looked up and fetched from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSource {
    /// Overrides the platform cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Directory with pre-packaged model files.
    pub bundled_dir: Option<PathBuf>,
    /// Models missing locally are downloaded from `{base_url}/{name}`.
    pub base_url: Option<String>,
}

/// Everything needed to build one detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlignmentConfig {
    pub dimension: Dimension,
    #[serde(default = "default_device")]
    pub device: String,
    #[serde(default)]
    pub flip_input: bool,
    #[serde(default = "default_face_detector")]
    pub face_detector: String,
    #[serde(default = "default_face_detector_kwargs")]
    pub face_detector_kwargs: DetectorKwargs,
    #[serde(default)]
    pub models: ModelSource,
}

impl AlignmentConfig {
    /// Config with the stock defaults: cpu, no flip, sfd at 0.8.
    pub fn new(dimension: Dimension) -> Self {
        Self {
            dimension,
            device: default_device(),
            flip_input: false,
            face_detector: default_face_detector(),
            face_detector_kwargs: default_face_detector_kwargs(),
            models: ModelSource::default(),
        }
    }

    pub fn with_device(mut self, device: impl Into<String>) -> Self {
        self.device = device.into();
        self
    }

    pub fn with_flip_input(mut self, flip: bool) -> Self {
        self.flip_input = flip;
        self
    }

    /// Replaces the backend and its options together; options never carry
    /// over from the previous backend.
    pub fn with_face_detector(mut self, name: impl Into<String>, kwargs: DetectorKwargs) -> Self {
        self.face_detector = name.into();
        self.face_detector_kwargs = kwargs;
        self
    }

    pub fn with_models(mut self, models: ModelSource) -> Self {
        self.models = models;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, AlignmentError> {
        serde_json::from_str(json).map_err(|e| AlignmentError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let json = fs::read_to_string(path)
            .map_err(|e| AlignmentError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }
}
