// Engine seam
//
// Everything the step-into command needs from the debug engine. Calls
// that reach the VM are async; bookkeeping calls are not.

use crate::breakpoint::StepIntoBreakpoint;
use crate::context::SuspendContext;
use crate::descriptor::{StepDepth, StepDescriptor, StepSize};
use crate::error::EngineResult;
use crate::monitor::InternalField;
use crate::session::SteppingSession;
use crate::settings::DebuggerSettings;
use jdwp_client::types::{Location, ThreadId};
use jdwp_client::{RequestId, SuspendPolicy};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Parameter kinds an internal primitive declares, checked on lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    SuspendContext,
    Thread,
    Int,
    RequestHint,
}

/// Arguments of the internal stepping primitive
pub struct StepCall<'a> {
    pub context: &'a SuspendContext,
    pub thread: Option<ThreadId>,
    pub size: StepSize,
    pub depth: StepDepth,
    pub hint: Arc<StepDescriptor>,
}

pub type PrimitiveFn<P> = for<'a> fn(&'a P, StepCall<'a>) -> BoxFuture<'a, EngineResult<()>>;

/// An engine entry point that is not part of its public interface
pub struct Primitive<P> {
    pub name: &'static str,
    pub params: &'static [ParamKind],
    pub call: PrimitiveFn<P>,
}

impl<P> Primitive<P> {
    pub fn matches(&self, name: &str, params: &[ParamKind]) -> bool {
        self.name == name && self.params == params
    }
}

impl<P> fmt::Debug for Primitive<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Primitive")
            .field("name", &self.name)
            .field("params", &self.params)
            .finish()
    }
}

pub trait DebugProcess: Send + Sync + Sized + 'static {
    fn settings(&self) -> &DebuggerSettings;

    fn session(&self) -> &SteppingSession;

    /// Internal fields, for lookups no accessor exists for
    fn internals(&self) -> Vec<InternalField<'_>>;

    /// Internal primitives, looked up by name and parameter kinds
    fn primitives(&self) -> &[Primitive<Self>];

    fn show_status_text(&self, text: &str);

    /// Restrict subsequent step events to one thread
    fn apply_thread_filter(&self, thread: Option<ThreadId>);

    /// Called once a resume command has resumed its context
    fn resumed(&self, _context: &SuspendContext) {}

    /// Install the breakpoint that ends the current run, replacing any earlier one
    fn set_run_to_cursor_breakpoint(
        &self,
        breakpoint: StepIntoBreakpoint,
    ) -> impl Future<Output = ()> + Send;

    /// Resume whatever the context suspended
    fn resume_context(&self, context: &SuspendContext) -> impl Future<Output = EngineResult<()>> + Send;

    /// Resume one thread of the context, leaving the rest suspended
    fn resume_thread(
        &self,
        context: &SuspendContext,
        thread: ThreadId,
    ) -> impl Future<Output = EngineResult<()>> + Send;

    fn frame_count(&self, thread: ThreadId) -> impl Future<Output = EngineResult<i32>> + Send;

    fn create_breakpoint_request(
        &self,
        location: Location,
        suspend_policy: SuspendPolicy,
    ) -> impl Future<Output = EngineResult<RequestId>> + Send;
}
