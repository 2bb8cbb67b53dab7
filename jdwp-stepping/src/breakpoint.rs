// Step-into breakpoints
//
// A transient breakpoint at the step target. The command owns it until it
// runs, so a command that is never executed leaves nothing behind.

use crate::descriptor::StepDescriptor;
use crate::error::EngineResult;
use crate::filter::{BreakpointStepMethodFilter, MethodFilter};
use crate::process::DebugProcess;
use jdwp_client::types::Location;
use jdwp_client::{RequestId, SuspendPolicy};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug)]
pub struct StepIntoBreakpoint {
    filter: BreakpointStepMethodFilter,
    suspend_policy: SuspendPolicy,
    request_id: Option<RequestId>,
    request_hint: Option<Arc<StepDescriptor>>,
}

impl StepIntoBreakpoint {
    /// Breakpoint for a filter that names a concrete location, if it does
    pub fn from_filter(filter: &MethodFilter) -> Option<Self> {
        filter.breakpoint_filter().map(|filter| Self {
            filter: filter.clone(),
            suspend_policy: SuspendPolicy::All,
            request_id: None,
            request_hint: None,
        })
    }

    pub fn filter(&self) -> &BreakpointStepMethodFilter {
        &self.filter
    }

    pub fn location(&self) -> Location {
        self.filter.location
    }

    pub fn suspend_policy(&self) -> SuspendPolicy {
        self.suspend_policy
    }

    pub fn set_suspend_policy(&mut self, suspend_policy: SuspendPolicy) {
        self.suspend_policy = suspend_policy;
    }

    pub fn request_id(&self) -> Option<RequestId> {
        self.request_id
    }

    pub fn request_hint(&self) -> Option<&Arc<StepDescriptor>> {
        self.request_hint.as_ref()
    }

    pub fn set_request_hint(&mut self, hint: Arc<StepDescriptor>) {
        self.request_hint = Some(hint);
    }

    /// Register the breakpoint with the VM
    pub async fn create_request<P: DebugProcess>(&mut self, process: &P) -> EngineResult<RequestId> {
        let request_id = process
            .create_breakpoint_request(self.filter.location, self.suspend_policy)
            .await?;

        debug!(
            "Step-into breakpoint for {}.{} registered as request {}",
            self.filter.class_name, self.filter.method_name, request_id
        );
        self.request_id = Some(request_id);
        Ok(request_id)
    }
}
