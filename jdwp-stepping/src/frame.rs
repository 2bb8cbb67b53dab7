// Frame identity policies
//
// The engine asks, after each raw step, whether the thread is still in the
// frame it started in; a "same frame" answer lets it skip its own step
// filtering for that stop.

use crate::context::SuspendContext;
use std::fmt::Debug;

pub trait FrameIdentityPolicy: Debug + Send + Sync {
    fn is_same_frame(&self, context: &SuspendContext) -> bool;
}

/// Never reports the same frame, so guest-language filtering runs on every stop
#[derive(Debug, Default, Clone, Copy)]
pub struct NeverSameFrame;

impl FrameIdentityPolicy for NeverSameFrame {
    fn is_same_frame(&self, _context: &SuspendContext) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdwp_client::SuspendPolicy;

    #[test]
    fn test_never_same_frame() {
        let policy = NeverSameFrame;
        let before = SuspendContext::new(SuspendPolicy::All, Some(1));
        let other = SuspendContext::new(SuspendPolicy::EventThread, None);

        assert!(!policy.is_same_frame(&before));
        assert!(!policy.is_same_frame(&other));
        // Asking twice about the very same context still says "different"
        assert!(!policy.is_same_frame(&before));
    }
}
