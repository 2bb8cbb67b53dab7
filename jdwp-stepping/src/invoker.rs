// Privileged step submission
//
// The engine's stepping primitive is internal: it is looked up by name and
// parameter kinds every time, and may be missing or refuse the call on an
// engine version we don't know. Either way the step is not submitted and
// the failure is logged once.

use crate::context::SuspendContext;
use crate::descriptor::{StepDepth, StepDescriptor, StepSize};
use crate::process::{DebugProcess, ParamKind, StepCall};
use jdwp_client::types::ThreadId;
use std::sync::Arc;
use tracing::{debug, error};

pub const DO_STEP: &str = "do_step";

pub const DO_STEP_PARAMS: &[ParamKind] = &[
    ParamKind::SuspendContext,
    ParamKind::Thread,
    ParamKind::Int,
    ParamKind::Int,
    ParamKind::RequestHint,
];

#[derive(Debug, Clone, Copy)]
pub struct PrivilegedStepInvoker {
    name: &'static str,
    params: &'static [ParamKind],
}

impl Default for PrivilegedStepInvoker {
    fn default() -> Self {
        Self {
            name: DO_STEP,
            params: DO_STEP_PARAMS,
        }
    }
}

impl PrivilegedStepInvoker {
    /// Submit a step; returns whether the engine accepted it
    pub async fn submit<P: DebugProcess>(
        &self,
        process: &P,
        context: &SuspendContext,
        thread: Option<ThreadId>,
        size: StepSize,
        depth: StepDepth,
        hint: Arc<StepDescriptor>,
    ) -> bool {
        let Some(primitive) = process
            .primitives()
            .iter()
            .find(|p| p.matches(self.name, self.params))
        else {
            error!("'{}' primitive was not found, stepping action aborted", self.name);
            return false;
        };

        let call = StepCall {
            context,
            thread,
            size,
            depth,
            hint,
        };

        match (primitive.call)(process, call).await {
            Ok(()) => {
                debug!("Step {:?}/{:?} submitted for thread {:?}", size, depth, thread);
                true
            }
            Err(e) => {
                error!(error = %e, "Error while invoking '{}' primitive", self.name);
                false
            }
        }
    }
}
