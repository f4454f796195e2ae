use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alignment::domain::alignment_error::AlignmentError;
use crate::alignment::domain::alignment_library::{AlignmentLibrary, AlignmentSettings};
use crate::alignment::domain::landmarks_type::LandmarksType;
use crate::shared::constants::{DEPTH_MODEL_NAME, FAN_2D_MODEL_NAME, FAN_3D_MODEL_NAME};
use crate::shared::model_resolver::{self, ProgressFn};

use super::device::Device;
use super::face_detector_backend::FaceDetectorBackend;
use super::onnx_face_alignment::FaceAlignment;

/// Download progress for a model file: `(model_name, bytes_downloaded, total_bytes)`.
pub type ModelProgressFn = Arc<dyn Fn(&str, u64, u64) + Send + Sync>;

/// Builds [`FaceAlignment`] handles on ONNX Runtime.
#[derive(Default, Clone)]
pub struct OnnxAlignmentLibrary {
    progress: Option<ModelProgressFn>,
}

impl fmt::Debug for OnnxAlignmentLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxAlignmentLibrary")
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

/// Model files a construction request needs, in load order.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ModelPlan {
    pub face_detector: ModelRef,
    pub landmark_net: &'static str,
    pub depth_net: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ModelRef {
    Named(&'static str),
    Path(PathBuf),
}

impl ModelPlan {
    pub(crate) fn new(landmarks_type: LandmarksType, backend: &FaceDetectorBackend) -> Self {
        let face_detector = match backend.path_to_detector() {
            Some(path) => ModelRef::Path(path.clone()),
            None => ModelRef::Named(backend.model_name()),
        };
        let (landmark_net, depth_net) = match landmarks_type {
            LandmarksType::TwoD => (FAN_2D_MODEL_NAME, None),
            LandmarksType::ThreeD => (FAN_3D_MODEL_NAME, Some(DEPTH_MODEL_NAME)),
        };
        Self {
            face_detector,
            landmark_net,
            depth_net,
        }
    }
}

impl OnnxAlignmentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report download progress for models missing from the cache.
    pub fn with_progress(mut self, progress: ModelProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    fn progress_for(&self, name: &'static str) -> Option<ProgressFn> {
        self.progress.clone().map(|cb| -> ProgressFn {
            Box::new(move |downloaded, total| cb(name, downloaded, total))
        })
    }

    fn resolve(
        &self,
        name: &'static str,
        settings: &AlignmentSettings,
    ) -> Result<PathBuf, AlignmentError> {
        let path = model_resolver::resolve(name, &settings.models, self.progress_for(name))?;
        Ok(path)
    }

    /// Parse and check everything that does not need the runtime.
    fn prepare(
        settings: &AlignmentSettings,
    ) -> Result<(Device, FaceDetectorBackend, ModelPlan), AlignmentError> {
        let device: Device = settings.device.parse()?;
        if !device.is_supported() {
            return Err(AlignmentError::UnsupportedDevice(settings.device.clone()));
        }
        let backend =
            FaceDetectorBackend::from_kwargs(&settings.face_detector, &settings.face_detector_kwargs)?;
        let plan = ModelPlan::new(settings.landmarks_type, &backend);
        Ok((device, backend, plan))
    }

    fn load_session(path: &Path, device: Device) -> Result<ort::session::Session, AlignmentError> {
        log::debug!("Loading {} on {device}", path.display());
        let providers = device.execution_providers()?;
        let session = ort::session::Session::builder()
            .map_err(runtime_err)?
            .with_execution_providers(providers)
            .map_err(|e| {
                log::warn!("Execution provider for {device} failed to register: {e}");
                AlignmentError::UnsupportedDevice(device.to_string())
            })?
            .commit_from_file(path)
            .map_err(|e| AlignmentError::Runtime(format!("{}: {e}", path.display())))?;
        log::debug!(
            "Loaded {} ({} inputs, {} outputs)",
            path.display(),
            session.inputs().len(),
            session.outputs().len()
        );
        Ok(session)
    }
}

fn runtime_err<E: std::fmt::Display>(e: E) -> AlignmentError {
    AlignmentError::Runtime(e.to_string())
}

impl AlignmentLibrary for OnnxAlignmentLibrary {
    type Handle = FaceAlignment;

    fn construct(&self, settings: &AlignmentSettings) -> Result<FaceAlignment, AlignmentError> {
        let (device, backend, plan) = Self::prepare(settings)?;
        if backend.verbose() {
            log::info!("Face detector: {backend}");
        }

        let face_detector_path = match plan.face_detector {
            ModelRef::Path(ref path) => path.clone(),
            ModelRef::Named(name) => self.resolve(name, settings)?,
        };
        let landmark_path = self.resolve(plan.landmark_net, settings)?;
        let depth_path = plan
            .depth_net
            .map(|name| self.resolve(name, settings))
            .transpose()?;

        let face_detector = Self::load_session(&face_detector_path, device)?;
        let landmark_net = Self::load_session(&landmark_path, device)?;
        let depth_net = depth_path
            .as_deref()
            .map(|path| Self::load_session(path, device))
            .transpose()?;

        log::info!(
            "Landmark detector ready: {} on {device} with {}",
            settings.landmarks_type,
            backend.name()
        );
        Ok(FaceAlignment::new(
            settings.landmarks_type,
            device,
            settings.flip_input,
            backend,
            face_detector,
            landmark_net,
            depth_net,
        ))
    }
}
