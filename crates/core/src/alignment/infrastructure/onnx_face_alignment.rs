use crate::alignment::domain::landmarks_type::LandmarksType;

use super::device::Device;
use super::face_detector_backend::FaceDetectorBackend;

/// Landmark detector handle backed by ONNX Runtime sessions.
///
/// Holds the face-detector session, the landmark network for the requested
/// mode and, for 3D, the depth regressor. Sessions are exposed read-only so
/// callers can drive inference themselves.
pub struct FaceAlignment {
    landmarks_type: LandmarksType,
    device: Device,
    flip_input: bool,
    backend: FaceDetectorBackend,
    face_detector: ort::session::Session,
    landmark_net: ort::session::Session,
    depth_net: Option<ort::session::Session>,
}

impl FaceAlignment {
    pub(super) fn new(
        landmarks_type: LandmarksType,
        device: Device,
        flip_input: bool,
        backend: FaceDetectorBackend,
        face_detector: ort::session::Session,
        landmark_net: ort::session::Session,
        depth_net: Option<ort::session::Session>,
    ) -> Self {
        Self {
            landmarks_type,
            device,
            flip_input,
            backend,
            face_detector,
            landmark_net,
            depth_net,
        }
    }

    pub fn landmarks_type(&self) -> LandmarksType {
        self.landmarks_type
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Whether inputs are also run mirrored and the predictions averaged.
    pub fn flip_input(&self) -> bool {
        self.flip_input
    }

    pub fn backend(&self) -> &FaceDetectorBackend {
        &self.backend
    }

    pub fn face_detector_session(&self) -> &ort::session::Session {
        &self.face_detector
    }

    pub fn landmark_session(&self) -> &ort::session::Session {
        &self.landmark_net
    }

    /// Present only in 3D mode.
    pub fn depth_session(&self) -> Option<&ort::session::Session> {
        self.depth_net.as_ref()
    }
}

impl std::fmt::Debug for FaceAlignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FaceAlignment")
            .field("landmarks_type", &self.landmarks_type)
            .field("device", &self.device)
            .field("flip_input", &self.flip_input)
            .field("backend", &self.backend)
            .field("has_depth_net", &self.depth_net.is_some())
            .finish_non_exhaustive()
    }
}
