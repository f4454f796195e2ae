pub mod device;
pub mod face_detector_backend;
pub mod onnx_alignment_library;
pub mod onnx_face_alignment;
