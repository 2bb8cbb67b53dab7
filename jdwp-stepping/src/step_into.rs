// Step-into command
//
// Construction checks the engine can support the command at all; execution
// builds the step descriptor, arms the target breakpoint (if any), submits
// the step through the internal primitive and finally resumes.

use crate::breakpoint::StepIntoBreakpoint;
use crate::command::{ResumeCommand, ResumeScope};
use crate::context::SuspendContext;
use crate::descriptor::{StepDepth, StepDescriptor, StepSize};
use crate::filter::MethodFilter;
use crate::frame::NeverSameFrame;
use crate::invoker::PrivilegedStepInvoker;
use crate::monitor::find_monitor;
use crate::process::DebugProcess;
use jdwp_client::types::ThreadId;
use jdwp_client::SuspendPolicy;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct StepIntoCommand<P> {
    base: ResumeCommand<P>,
    method_filter: Option<MethodFilter>,
    breakpoint: Option<StepIntoBreakpoint>,
    forced_ignore_filters: bool,
    step_size: StepSize,
    invoker: PrivilegedStepInvoker,
}

impl<P: DebugProcess> StepIntoCommand<P> {
    /// Build the command, or `None` when the engine has no blocked-thread
    /// monitor. Nothing in the engine is touched here.
    pub fn create(
        process: Arc<P>,
        context: Arc<SuspendContext>,
        ignore_filters: bool,
        method_filter: Option<MethodFilter>,
        step_size: StepSize,
    ) -> Option<Self> {
        let Some(monitor) = find_monitor(&*process) else {
            debug!("No blocked-thread monitor on the debug process, step into unavailable");
            return None;
        };

        let forced_ignore_filters = ignore_filters || method_filter.is_some();
        let breakpoint = method_filter.as_ref().and_then(StepIntoBreakpoint::from_filter);
        let scope = ResumeScope::stepping(monitor, process.settings().resume_only_current_thread);

        Some(Self {
            base: ResumeCommand::new(process, context, scope),
            method_filter,
            breakpoint,
            forced_ignore_filters,
            step_size,
            invoker: PrivilegedStepInvoker::default(),
        })
    }

    pub fn breakpoint(&self) -> Option<&StepIntoBreakpoint> {
        self.breakpoint.as_ref()
    }

    pub fn forced_ignore_filters(&self) -> bool {
        self.forced_ignore_filters
    }

    pub fn resume_command(&self) -> &ResumeCommand<P> {
        &self.base
    }

    /// Run the step. Failures are logged; a step that could not be
    /// submitted leaves the VM suspended.
    pub async fn execute(mut self) {
        let process = Arc::clone(self.base.process());
        let context = Arc::clone(self.base.suspend_context());
        let session = process.session();

        process.show_status_text("Stepping into");
        let step_thread = self.base.context_thread();

        let mut descriptor = StepDescriptor::new(
            step_thread,
            StepSize::Line,
            StepDepth::Into,
            self.method_filter.clone(),
            Arc::new(NeverSameFrame),
        );
        descriptor.set_reset_ignore_filters(
            self.method_filter.is_some() && !session.should_ignore_stepping_filters(),
        );

        if self.forced_ignore_filters {
            if let Some(frame_count) = self.filter_boundary(step_thread).await {
                session.set_ignore_step_filters_flag(frame_count);
            }
        }

        descriptor.set_ignore_filters(
            self.forced_ignore_filters || session.should_ignore_stepping_filters(),
        );
        process.apply_thread_filter(step_thread);

        let descriptor = Arc::new(descriptor);

        if let Some(mut breakpoint) = self.breakpoint.take() {
            breakpoint.set_suspend_policy(match context.suspend_policy() {
                SuspendPolicy::EventThread => SuspendPolicy::EventThread,
                _ => SuspendPolicy::All,
            });
            if let Err(e) = breakpoint.create_request(&*process).await {
                warn!(error = %e, "Failed to register step-into breakpoint");
            }
            breakpoint.set_request_hint(Arc::clone(&descriptor));
            process.set_run_to_cursor_breakpoint(breakpoint).await;
        }

        let submitted = self
            .invoker
            .submit(
                &*process,
                &context,
                step_thread,
                self.step_size,
                StepDepth::Into,
                descriptor,
            )
            .await;

        if submitted {
            self.base.finish().await;
        }
    }

    /// Current stack depth of the stepping thread, if it can be read.
    /// No thread counts as depth zero, which lowers any active threshold to off.
    async fn filter_boundary(&self, thread: Option<ThreadId>) -> Option<i32> {
        let Some(thread) = thread else {
            return Some(0);
        };

        match self.base.process().frame_count(thread).await {
            Ok(count) => Some(count),
            Err(e) => {
                info!(error = %e, "Could not read frame count of thread {:x}", thread);
                None
            }
        }
    }
}
