//! Model file names as they appear in the cache, bundle, and download URLs.

pub const SFD_MODEL_NAME: &str = "s3fd.onnx";
pub const BLAZEFACE_FRONT_MODEL_NAME: &str = "blazeface_front.onnx";
pub const BLAZEFACE_BACK_MODEL_NAME: &str = "blazeface_back.onnx";

pub const FAN_2D_MODEL_NAME: &str = "2DFAN4.onnx";
pub const FAN_3D_MODEL_NAME: &str = "3DFAN4.onnx";
/// Depth regressor run after the 3D landmark network.
pub const DEPTH_MODEL_NAME: &str = "depth.onnx";

/// Directory under the platform cache/data dir.
pub const APP_DIR_NAME: &str = "FaceAlign";
