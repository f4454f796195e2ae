pub mod alignment_config;
pub mod alignment_error;
pub mod alignment_library;
pub mod detector_context;
pub mod detector_factory;
pub mod landmarks_type;
