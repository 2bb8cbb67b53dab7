// Session-level stepping state
//
// Tracks the frame-count threshold below which stepping filters are
// ignored; a positive threshold means filters are currently off.

use std::sync::atomic::{AtomicI32, Ordering};

#[derive(Debug, Default)]
pub struct SteppingSession {
    ignore_filters_threshold: AtomicI32,
}

impl SteppingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore stepping filters while the stack is at least `frame_count` deep.
    /// An existing threshold is only ever lowered.
    pub fn set_ignore_step_filters_flag(&self, frame_count: i32) {
        let _ = self
            .ignore_filters_threshold
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(if current <= 0 {
                    frame_count
                } else {
                    current.min(frame_count)
                })
            });
    }

    pub fn reset_ignore_step_filters_flag(&self) {
        self.ignore_filters_threshold.store(0, Ordering::SeqCst);
    }

    pub fn should_ignore_stepping_filters(&self) -> bool {
        self.ignore_filters_threshold.load(Ordering::SeqCst) > 0
    }

    pub fn ignore_filters_threshold(&self) -> Option<i32> {
        let threshold = self.ignore_filters_threshold.load(Ordering::SeqCst);
        (threshold > 0).then_some(threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_keeps_minimum() {
        let session = SteppingSession::new();
        assert!(!session.should_ignore_stepping_filters());

        session.set_ignore_step_filters_flag(7);
        session.set_ignore_step_filters_flag(9);
        assert_eq!(session.ignore_filters_threshold(), Some(7));

        session.set_ignore_step_filters_flag(4);
        assert_eq!(session.ignore_filters_threshold(), Some(4));

        session.reset_ignore_step_filters_flag();
        assert!(!session.should_ignore_stepping_filters());
    }

    #[test]
    fn test_zero_depth_does_not_enable() {
        let session = SteppingSession::new();
        session.set_ignore_step_filters_flag(0);
        assert!(!session.should_ignore_stepping_filters());

        session.set_ignore_step_filters_flag(6);
        session.set_ignore_step_filters_flag(0);
        assert_eq!(session.ignore_filters_threshold(), None);
    }
}
