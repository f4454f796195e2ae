use super::alignment_config::AlignmentConfig;
use super::alignment_error::AlignmentError;
use super::alignment_library::{AlignmentLibrary, AlignmentSettings};

/// Turns an [`AlignmentConfig`] into a detector handle.
///
/// Adds no validation of its own: whatever the library rejects comes back
/// to the caller unchanged.
pub struct DetectorFactory<L: AlignmentLibrary> {
    library: L,
}

impl<L: AlignmentLibrary> DetectorFactory<L> {
    pub fn new(library: L) -> Self {
        Self { library }
    }

    pub fn library(&self) -> &L {
        &self.library
    }

    /// Build a detector and hand it to the caller.
    pub fn construct_local(&self, config: &AlignmentConfig) -> Result<L::Handle, AlignmentError> {
        let settings = AlignmentSettings::from_config(config);
        log::info!(
            "Constructing {} landmark detector ({} requested) on {} with {} (flip_input={})",
            settings.landmarks_type,
            config.dimension,
            settings.device,
            settings.face_detector,
            settings.flip_input
        );
        self.library.construct(&settings)
    }
}
