use std::sync::{Arc, PoisonError, RwLock};

use super::alignment_config::AlignmentConfig;
use super::alignment_error::AlignmentError;
use super::alignment_library::AlignmentLibrary;
use super::detector_factory::DetectorFactory;

/// Owns one shared detector slot.
///
/// Replaces a process-wide global: whoever needs the shared detector is
/// given the context. The slot starts empty, each successful
/// [`construct_global`](Self::construct_global) replaces its content, and it
/// is never cleared. A replaced handle is dropped once the last caller still
/// holding it lets go.
pub struct DetectorContext<L: AlignmentLibrary> {
    factory: DetectorFactory<L>,
    current: RwLock<Option<Arc<L::Handle>>>,
}

impl<L: AlignmentLibrary> DetectorContext<L> {
    pub fn new(factory: DetectorFactory<L>) -> Self {
        Self {
            factory,
            current: RwLock::new(None),
        }
    }

    pub fn factory(&self) -> &DetectorFactory<L> {
        &self.factory
    }

    /// Build a detector and make it the shared one.
    ///
    /// Construction happens before the slot is touched, so on error the
    /// previous detector stays in place.
    pub fn construct_global(&self, config: &AlignmentConfig) -> Result<(), AlignmentError> {
        let handle = Arc::new(self.factory.construct_local(config)?);
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if slot.replace(handle).is_some() {
            log::debug!("Replaced shared landmark detector");
        }
        Ok(())
    }

    /// Build a detector for the caller only; the shared slot is untouched.
    pub fn construct_local(&self, config: &AlignmentConfig) -> Result<L::Handle, AlignmentError> {
        self.factory.construct_local(config)
    }

    /// The shared detector, or `None` if none was constructed yet.
    pub fn current(&self) -> Option<Arc<L::Handle>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_initialized(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::alignment::domain::detector_factory::test_support::FakeLibrary;
    use crate::alignment::domain::landmarks_type::{Dimension, LandmarksType};

    fn context() -> DetectorContext<FakeLibrary> {
        DetectorContext::new(DetectorFactory::new(FakeLibrary::default()))
    }

    #[test]
    fn test_current_before_construction_is_none() {
        let ctx = context();
        assert!(ctx.current().is_none());
        assert!(!ctx.is_initialized());
    }

    #[test]
    fn test_construct_global_then_current_returns_same_instance() {
        let ctx = context();
        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();

        let first = ctx.current().unwrap();
        let second = ctx.current().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.id, 0);
        assert_eq!(first.settings.landmarks_type, LandmarksType::TwoD);
        assert!(ctx.is_initialized());
    }

    #[test]
    fn test_second_construct_global_overwrites_first() {
        let ctx = context();
        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();
        let old = ctx.current().unwrap();

        ctx.construct_global(&AlignmentConfig::new(Dimension::ThreeD))
            .unwrap();
        let new = ctx.current().unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.id, 1);
        assert_eq!(new.settings.landmarks_type, LandmarksType::ThreeD);
    }

    #[test]
    fn test_replaced_handle_is_released_when_unreferenced() {
        let ctx = context();
        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();
        let weak = Arc::downgrade(&ctx.current().unwrap());

        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();

        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn test_construct_local_leaves_slot_empty() {
        let ctx = context();
        let handle = ctx
            .construct_local(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();

        assert_eq!(handle.id, 0);
        assert!(ctx.current().is_none());
    }

    #[test]
    fn test_construct_local_does_not_replace_shared() {
        let ctx = context();
        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();
        let shared = ctx.current().unwrap();

        let local = ctx
            .construct_local(&AlignmentConfig::new(Dimension::ThreeD))
            .unwrap();

        assert_eq!(local.id, 1);
        assert!(Arc::ptr_eq(&shared, &ctx.current().unwrap()));
    }

    #[test]
    fn test_failed_construct_global_keeps_previous() {
        let ctx = context();
        ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .unwrap();
        let before = ctx.current().unwrap();

        ctx.factory().library().fail_next("tpu");
        let err = ctx
            .construct_global(&AlignmentConfig::new(Dimension::TwoD).with_device("tpu"))
            .unwrap_err();

        assert!(matches!(err, AlignmentError::InvalidDevice(_)));
        assert!(Arc::ptr_eq(&before, &ctx.current().unwrap()));
    }

    #[test]
    fn test_failed_first_construct_global_stays_uninitialized() {
        let ctx = context();
        ctx.factory().library().fail_next("tpu");

        assert!(ctx
            .construct_global(&AlignmentConfig::new(Dimension::TwoD))
            .is_err());
        assert!(ctx.current().is_none());
    }

    #[test]
    fn test_concurrent_construct_global_leaves_one_handle() {
        let ctx = Arc::new(context());
        let workers: Vec<_> = (0..8)
            .map(|_| {
                let ctx = ctx.clone();
                thread::spawn(move || {
                    ctx.construct_global(&AlignmentConfig::new(Dimension::TwoD))
                        .unwrap();
                    ctx.current().is_some()
                })
            })
            .collect();

        for w in workers {
            assert!(w.join().unwrap());
        }
        assert_eq!(ctx.factory().library().built(), 8);
        assert!(ctx.current().unwrap().id < 8);
    }
}
