// Step request descriptors
//
// What the engine needs to know about one submitted step: granularity,
// direction, target filter and how host-level filtering should behave.
// Built fresh for every step and shared with the breakpoint that gates it.

use crate::context::SuspendContext;
use crate::filter::MethodFilter;
use crate::frame::FrameIdentityPolicy;
use jdwp_client::commands::{step_depths, step_sizes};
use jdwp_client::types::ThreadId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepSize {
    /// Smallest possible step (one bytecode)
    Min,
    /// One source line (statement)
    Line,
}

impl StepSize {
    pub fn as_jdwp(self) -> i32 {
        match self {
            StepSize::Min => step_sizes::MIN,
            StepSize::Line => step_sizes::LINE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepDepth {
    Into,
    Over,
    Out,
}

impl StepDepth {
    pub fn as_jdwp(self) -> i32 {
        match self {
            StepDepth::Into => step_depths::INTO,
            StepDepth::Over => step_depths::OVER,
            StepDepth::Out => step_depths::OUT,
        }
    }
}

#[derive(Debug)]
pub struct StepDescriptor {
    thread: Option<ThreadId>,
    size: StepSize,
    depth: StepDepth,
    method_filter: Option<MethodFilter>,
    frame_policy: Arc<dyn FrameIdentityPolicy>,
    ignore_filters: bool,
    reset_ignore_filters: bool,
}

impl StepDescriptor {
    pub fn new(
        thread: Option<ThreadId>,
        size: StepSize,
        depth: StepDepth,
        method_filter: Option<MethodFilter>,
        frame_policy: Arc<dyn FrameIdentityPolicy>,
    ) -> Self {
        Self {
            thread,
            size,
            depth,
            method_filter,
            frame_policy,
            ignore_filters: false,
            reset_ignore_filters: false,
        }
    }

    pub fn thread(&self) -> Option<ThreadId> {
        self.thread
    }

    pub fn size(&self) -> StepSize {
        self.size
    }

    pub fn depth(&self) -> StepDepth {
        self.depth
    }

    pub fn method_filter(&self) -> Option<&MethodFilter> {
        self.method_filter.as_ref()
    }

    pub fn ignore_filters(&self) -> bool {
        self.ignore_filters
    }

    pub fn set_ignore_filters(&mut self, ignore_filters: bool) {
        self.ignore_filters = ignore_filters;
    }

    /// Whether the session's ignore-filters flag is cleared once this step lands
    pub fn reset_ignore_filters(&self) -> bool {
        self.reset_ignore_filters
    }

    pub fn set_reset_ignore_filters(&mut self, reset: bool) {
        self.reset_ignore_filters = reset;
    }

    pub fn is_same_frame(&self, context: &SuspendContext) -> bool {
        self.frame_policy.is_same_frame(context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::NeverSameFrame;
    use jdwp_client::SuspendPolicy;

    #[test]
    fn test_jdwp_constants() {
        assert_eq!(StepSize::Line.as_jdwp(), 1);
        assert_eq!(StepSize::Min.as_jdwp(), 0);
        assert_eq!(StepDepth::Into.as_jdwp(), 0);
        assert_eq!(StepDepth::Out.as_jdwp(), 2);
    }

    #[test]
    fn test_frame_question_goes_to_policy() {
        let mut descriptor = StepDescriptor::new(
            Some(9),
            StepSize::Line,
            StepDepth::Into,
            None,
            Arc::new(NeverSameFrame),
        );
        descriptor.set_ignore_filters(true);

        let context = SuspendContext::new(SuspendPolicy::All, Some(9));
        assert!(!descriptor.is_same_frame(&context));
        assert!(descriptor.ignore_filters());
        assert!(!descriptor.reset_ignore_filters());
    }
}
