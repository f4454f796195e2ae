//! Face-detector backends and their keyword options.
//!
//! Options are checked the way a constructor checks keyword arguments:
//! unknown keys and wrongly typed values are errors, absent keys take the
//! backend's own default.

use std::fmt;
use std::path::PathBuf;

use serde_json::Value;

use crate::alignment::domain::alignment_config::DetectorKwargs;
use crate::alignment::domain::alignment_error::AlignmentError;
use crate::shared::constants::{
    BLAZEFACE_BACK_MODEL_NAME, BLAZEFACE_FRONT_MODEL_NAME, SFD_MODEL_NAME,
};

pub const SFD_NAME: &str = "sfd";
pub const BLAZEFACE_NAME: &str = "blazeface";

pub const SFD_DEFAULT_FILTER_THRESHOLD: f64 = 0.5;
pub const BLAZEFACE_DEFAULT_MIN_SCORE: f64 = 0.5;
pub const BLAZEFACE_DEFAULT_MIN_SUPPRESSION: f64 = 0.3;

#[derive(Debug, Clone, PartialEq)]
pub enum FaceDetectorBackend {
    Sfd {
        filter_threshold: f64,
        path_to_detector: Option<PathBuf>,
        verbose: bool,
    },
    BlazeFace {
        back_model: bool,
        min_score_thresh: f64,
        min_suppression_threshold: f64,
        path_to_detector: Option<PathBuf>,
        verbose: bool,
    },
}

impl FaceDetectorBackend {
    pub fn from_kwargs(name: &str, kwargs: &DetectorKwargs) -> Result<Self, AlignmentError> {
        let opts = Options { detector: name, kwargs };
        match name {
            SFD_NAME => {
                opts.only(&["filter_threshold", "path_to_detector", "verbose"])?;
                Ok(FaceDetectorBackend::Sfd {
                    filter_threshold: opts
                        .unit_interval("filter_threshold")?
                        .unwrap_or(SFD_DEFAULT_FILTER_THRESHOLD),
                    path_to_detector: opts.path("path_to_detector")?,
                    verbose: opts.bool("verbose")?.unwrap_or(false),
                })
            }
            BLAZEFACE_NAME => {
                opts.only(&[
                    "back_model",
                    "min_score_thresh",
                    "min_suppression_threshold",
                    "path_to_detector",
                    "verbose",
                ])?;
                Ok(FaceDetectorBackend::BlazeFace {
                    back_model: opts.bool("back_model")?.unwrap_or(false),
                    min_score_thresh: opts
                        .unit_interval("min_score_thresh")?
                        .unwrap_or(BLAZEFACE_DEFAULT_MIN_SCORE),
                    min_suppression_threshold: opts
                        .unit_interval("min_suppression_threshold")?
                        .unwrap_or(BLAZEFACE_DEFAULT_MIN_SUPPRESSION),
                    path_to_detector: opts.path("path_to_detector")?,
                    verbose: opts.bool("verbose")?.unwrap_or(false),
                })
            }
            other => Err(AlignmentError::UnknownFaceDetector(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FaceDetectorBackend::Sfd { .. } => SFD_NAME,
            FaceDetectorBackend::BlazeFace { .. } => BLAZEFACE_NAME,
        }
    }

    /// Model file looked up through the resolver when no explicit path is set.
    pub fn model_name(&self) -> &'static str {
        match self {
            FaceDetectorBackend::Sfd { .. } => SFD_MODEL_NAME,
            FaceDetectorBackend::BlazeFace { back_model: false, .. } => BLAZEFACE_FRONT_MODEL_NAME,
            FaceDetectorBackend::BlazeFace { back_model: true, .. } => BLAZEFACE_BACK_MODEL_NAME,
        }
    }

    pub fn path_to_detector(&self) -> Option<&PathBuf> {
        match self {
            FaceDetectorBackend::Sfd {
                path_to_detector, ..
            }
            | FaceDetectorBackend::BlazeFace {
                path_to_detector, ..
            } => path_to_detector.as_ref(),
        }
    }

    pub fn verbose(&self) -> bool {
        match self {
            FaceDetectorBackend::Sfd { verbose, .. }
            | FaceDetectorBackend::BlazeFace { verbose, .. } => *verbose,
        }
    }

    /// Minimum face score a detection must reach to be kept.
    pub fn score_threshold(&self) -> f64 {
        match self {
            FaceDetectorBackend::Sfd {
                filter_threshold, ..
            } => *filter_threshold,
            FaceDetectorBackend::BlazeFace {
                min_score_thresh, ..
            } => *min_score_thresh,
        }
    }
}

impl fmt::Display for FaceDetectorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (threshold {})", self.name(), self.score_threshold())
    }
}

struct Options<'a> {
    detector: &'a str,
    kwargs: &'a DetectorKwargs,
}

impl Options<'_> {
    fn invalid(&self, key: &str, reason: impl Into<String>) -> AlignmentError {
        AlignmentError::InvalidDetectorOption {
            detector: self.detector.to_string(),
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    fn only(&self, allowed: &[&str]) -> Result<(), AlignmentError> {
        match self.kwargs.keys().find(|k| !allowed.contains(&k.as_str())) {
            Some(key) => Err(self.invalid(key, "unexpected option")),
            None => Ok(()),
        }
    }

    fn bool(&self, key: &str) -> Result<Option<bool>, AlignmentError> {
        match self.kwargs.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.invalid(key, format!("expected a boolean, got {other}"))),
        }
    }

    fn unit_interval(&self, key: &str) -> Result<Option<f64>, AlignmentError> {
        match self.kwargs.get(key) {
            None => Ok(None),
            Some(value) => match value.as_f64() {
                Some(v) if (0.0..=1.0).contains(&v) => Ok(Some(v)),
                Some(v) => Err(self.invalid(key, format!("{v} is outside [0, 1]"))),
                None => Err(self.invalid(key, format!("expected a number, got {value}"))),
            },
        }
    }

    fn path(&self, key: &str) -> Result<Option<PathBuf>, AlignmentError> {
        match self.kwargs.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(PathBuf::from(s))),
            Some(other) => Err(self.invalid(key, format!("expected a path, got {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alignment::domain::alignment_config::default_face_detector_kwargs;
    use approx::assert_relative_eq;
    use rstest::rstest;
    use serde_json::json;

    fn kwargs(value: Value) -> DetectorKwargs {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sfd_with_default_kwargs() {
        let backend = FaceDetectorBackend::from_kwargs("sfd", &default_face_detector_kwargs())
            .unwrap();
        assert_eq!(backend.name(), "sfd");
        assert_relative_eq!(backend.score_threshold(), 0.8);
        assert_eq!(backend.model_name(), SFD_MODEL_NAME);
        assert!(backend.path_to_detector().is_none());
        assert!(!backend.verbose());
    }

    #[test]
    fn test_sfd_without_kwargs_uses_backend_default() {
        let backend = FaceDetectorBackend::from_kwargs("sfd", &DetectorKwargs::new()).unwrap();
        assert_relative_eq!(backend.score_threshold(), SFD_DEFAULT_FILTER_THRESHOLD);
    }

    #[test]
    fn test_sfd_accepts_integer_threshold() {
        let backend =
            FaceDetectorBackend::from_kwargs("sfd", &kwargs(json!({"filter_threshold": 1})))
                .unwrap();
        assert_relative_eq!(backend.score_threshold(), 1.0);
    }

    #[test]
    fn test_sfd_path_override() {
        let backend = FaceDetectorBackend::from_kwargs(
            "sfd",
            &kwargs(json!({"path_to_detector": "/models/custom.onnx", "verbose": true})),
        )
        .unwrap();
        assert_eq!(
            backend.path_to_detector(),
            Some(&PathBuf::from("/models/custom.onnx"))
        );
        assert!(backend.verbose());
    }

    #[test]
    fn test_blazeface_defaults() {
        let backend =
            FaceDetectorBackend::from_kwargs("blazeface", &DetectorKwargs::new()).unwrap();
        assert_eq!(
            backend,
            FaceDetectorBackend::BlazeFace {
                back_model: false,
                min_score_thresh: BLAZEFACE_DEFAULT_MIN_SCORE,
                min_suppression_threshold: BLAZEFACE_DEFAULT_MIN_SUPPRESSION,
                path_to_detector: None,
                verbose: false,
            }
        );
        assert_eq!(backend.model_name(), BLAZEFACE_FRONT_MODEL_NAME);
    }

    #[test]
    fn test_blazeface_back_model_selects_back_weights() {
        let backend = FaceDetectorBackend::from_kwargs(
            "blazeface",
            &kwargs(json!({"back_model": true, "min_score_thresh": 0.65})),
        )
        .unwrap();
        assert_eq!(backend.model_name(), BLAZEFACE_BACK_MODEL_NAME);
        assert_relative_eq!(backend.score_threshold(), 0.65);
    }

    #[test]
    fn test_blazeface_rejects_sfd_option() {
        let err =
            FaceDetectorBackend::from_kwargs("blazeface", &default_face_detector_kwargs())
                .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InvalidDetectorOption { ref detector, ref key, .. }
                if detector == "blazeface" && key == "filter_threshold"
        ));
    }

    #[rstest]
    #[case::dlib("dlib")]
    #[case::uppercase("SFD")]
    #[case::empty("")]
    fn test_unknown_backend(#[case] name: &str) {
        let err = FaceDetectorBackend::from_kwargs(name, &DetectorKwargs::new()).unwrap_err();
        assert!(matches!(err, AlignmentError::UnknownFaceDetector(ref n) if n == name));
    }

    #[rstest]
    #[case::unexpected_key(json!({"threshold": 0.5}), "threshold")]
    #[case::string_threshold(json!({"filter_threshold": "high"}), "filter_threshold")]
    #[case::threshold_above_one(json!({"filter_threshold": 1.5}), "filter_threshold")]
    #[case::negative_threshold(json!({"filter_threshold": -0.1}), "filter_threshold")]
    #[case::verbose_not_bool(json!({"verbose": 1}), "verbose")]
    #[case::path_not_string(json!({"path_to_detector": 3}), "path_to_detector")]
    fn test_sfd_invalid_options(#[case] value: Value, #[case] bad_key: &str) {
        let err = FaceDetectorBackend::from_kwargs("sfd", &kwargs(value)).unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InvalidDetectorOption { ref key, .. } if key == bad_key
        ));
    }

    #[test]
    fn test_null_path_means_default_model() {
        let backend =
            FaceDetectorBackend::from_kwargs("sfd", &kwargs(json!({"path_to_detector": null})))
                .unwrap();
        assert!(backend.path_to_detector().is_none());
    }

    #[test]
    fn test_display_names_backend_and_threshold() {
        let backend = FaceDetectorBackend::from_kwargs("sfd", &default_face_detector_kwargs())
            .unwrap();
        assert_eq!(backend.to_string(), "sfd (threshold 0.8)");
    }
}
