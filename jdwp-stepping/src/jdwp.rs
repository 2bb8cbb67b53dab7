// JDWP-backed debug process
//
// Implements the engine seam over a live JDWP connection. Owns the
// blocked-thread monitor, the run-to-cursor breakpoint and the table of
// outstanding step requests used to correlate events back to steps.

use crate::breakpoint::StepIntoBreakpoint;
use crate::context::SuspendContext;
use crate::descriptor::StepDescriptor;
use crate::error::{EngineError, EngineResult};
use crate::invoker::{DO_STEP, DO_STEP_PARAMS};
use crate::monitor::{InternalField, ThreadBlockedMonitor};
use crate::process::{BoxFuture, DebugProcess, Primitive, StepCall};
use crate::session::SteppingSession;
use crate::settings::DebuggerSettings;
use jdwp_client::commands::event_kinds;
use jdwp_client::types::{Location, ThreadId, ThreadStatus};
use jdwp_client::{EventKind, EventSet, JdwpConnection, RequestId, SuspendPolicy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

static PRIMITIVES: [Primitive<JdwpDebugProcess>; 1] = [Primitive {
    name: DO_STEP,
    params: DO_STEP_PARAMS,
    call: do_step_primitive,
}];

fn do_step_primitive<'a>(
    process: &'a JdwpDebugProcess,
    call: StepCall<'a>,
) -> BoxFuture<'a, EngineResult<()>> {
    Box::pin(process.do_step(call))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug)]
struct PendingStep {
    thread: ThreadId,
    hint: Arc<StepDescriptor>,
}

#[derive(Debug)]
pub struct JdwpDebugProcess {
    connection: JdwpConnection,
    settings: DebuggerSettings,
    session: SteppingSession,
    blocked_monitor: Arc<ThreadBlockedMonitor>,
    thread_filter: Mutex<Option<ThreadId>>,
    run_to_cursor: Mutex<Option<StepIntoBreakpoint>>,
    step_requests: Mutex<HashMap<RequestId, PendingStep>>,
    status_text: Mutex<Option<String>>,
}

impl JdwpDebugProcess {
    pub fn new(connection: JdwpConnection, settings: DebuggerSettings) -> Self {
        Self {
            connection,
            settings,
            session: SteppingSession::new(),
            blocked_monitor: Arc::new(ThreadBlockedMonitor::new()),
            thread_filter: Mutex::new(None),
            run_to_cursor: Mutex::new(None),
            step_requests: Mutex::new(HashMap::new()),
            status_text: Mutex::new(None),
        }
    }

    pub fn connection(&self) -> &JdwpConnection {
        &self.connection
    }

    pub fn thread_filter(&self) -> Option<ThreadId> {
        *lock(&self.thread_filter)
    }

    pub fn status_text(&self) -> Option<String> {
        lock(&self.status_text).clone()
    }

    pub fn run_to_cursor_request(&self) -> Option<RequestId> {
        lock(&self.run_to_cursor)
            .as_ref()
            .and_then(|bp| bp.request_id())
    }

    /// Step requests that have not produced an event yet
    pub fn pending_step_requests(&self) -> Vec<RequestId> {
        let mut ids: Vec<_> = lock(&self.step_requests).keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Submit a single-step request (the `do_step` primitive)
    async fn do_step(&self, call: StepCall<'_>) -> EngineResult<()> {
        let thread = call.thread.ok_or(EngineError::NoContextThread)?;

        self.clear_step_requests(thread).await;

        let class_excludes = if call.hint.ignore_filters() {
            Vec::new()
        } else {
            self.settings.stepping_filters.clone()
        };
        let suspend_policy = match call.context.suspend_policy() {
            SuspendPolicy::None => SuspendPolicy::All,
            policy => policy,
        };

        let request_id = self
            .connection
            .set_step_request(
                thread,
                call.size.as_jdwp(),
                call.depth.as_jdwp(),
                suspend_policy,
                &class_excludes,
                self.settings.step_count_filter,
            )
            .await?;

        debug!(
            "Step request {} set on thread {:x} ({} class filters)",
            request_id,
            thread,
            class_excludes.len()
        );
        lock(&self.step_requests).insert(
            request_id,
            PendingStep {
                thread,
                hint: call.hint,
            },
        );

        Ok(())
    }

    /// Delete every outstanding step request of a thread
    async fn clear_step_requests(&self, thread: ThreadId) {
        let stale: Vec<RequestId> = {
            let mut requests = lock(&self.step_requests);
            let ids: Vec<_> = requests
                .iter()
                .filter(|(_, step)| step.thread == thread)
                .map(|(id, _)| *id)
                .collect();
            for id in &ids {
                requests.remove(id);
            }
            ids
        };

        for request_id in stale {
            if let Err(e) = self
                .connection
                .clear_event_request(event_kinds::SINGLE_STEP, request_id)
                .await
            {
                warn!(error = %e, "Failed to clear step request {}", request_id);
            }
        }
    }

    async fn clear_breakpoint_request(&self, breakpoint: &StepIntoBreakpoint) {
        if let Some(request_id) = breakpoint.request_id() {
            if let Err(e) = self.connection.clear_breakpoint(request_id).await {
                warn!(error = %e, "Failed to clear step-into breakpoint {}", request_id);
            }
        }
    }

    /// Match an event set against outstanding steps
    ///
    /// A hit on the run-to-cursor breakpoint or an event of a tracked step
    /// request yields the originating descriptor; the step's leftovers are
    /// cleared and its thread is no longer watched.
    pub async fn handle_event_set(&self, event_set: &EventSet) -> Option<Arc<StepDescriptor>> {
        for event in &event_set.events {
            match &event.details {
                EventKind::Breakpoint { thread, .. } => {
                    let breakpoint = {
                        let mut run_to_cursor = lock(&self.run_to_cursor);
                        let hit = run_to_cursor
                            .as_ref()
                            .and_then(|bp| bp.request_id())
                            .is_some_and(|id| id == event.request_id);
                        if hit {
                            run_to_cursor.take()
                        } else {
                            None
                        }
                    };

                    if let Some(breakpoint) = breakpoint {
                        info!("Step-into target reached on thread {:x}", thread);
                        self.clear_breakpoint_request(&breakpoint).await;
                        self.clear_step_requests(*thread).await;
                        self.blocked_monitor.stop_watching(*thread);
                        return breakpoint.request_hint().cloned();
                    }
                }
                EventKind::Step { thread, .. } => {
                    if self.thread_filter().is_some_and(|filtered| filtered != *thread) {
                        debug!("Ignoring step event from filtered thread {:x}", thread);
                        continue;
                    }

                    let step = lock(&self.step_requests).remove(&event.request_id);
                    if let Some(step) = step {
                        self.blocked_monitor.stop_watching(*thread);
                        return Some(step.hint);
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// Watched threads that are currently blocked on a monitor
    pub async fn blocked_threads(&self) -> Vec<ThreadId> {
        let mut blocked = Vec::new();

        for thread in self.blocked_monitor.watched_threads() {
            match self.connection.thread_status(thread).await {
                Ok(state) if state.status == ThreadStatus::Monitor => {
                    warn!(
                        "Thread {:x} is blocked on a monitor, it may be held by a suspended thread",
                        thread
                    );
                    blocked.push(thread);
                }
                Ok(_) => {}
                Err(e) => debug!(error = %e, "Could not read status of thread {:x}", thread),
            }
        }

        blocked
    }
}

impl DebugProcess for JdwpDebugProcess {
    fn settings(&self) -> &DebuggerSettings {
        &self.settings
    }

    fn session(&self) -> &SteppingSession {
        &self.session
    }

    fn internals(&self) -> Vec<InternalField<'_>> {
        vec![
            InternalField::readable("settings", &self.settings),
            InternalField::readable("session", &self.session),
            InternalField::readable("blocked_monitor", &self.blocked_monitor),
        ]
    }

    fn primitives(&self) -> &[Primitive<Self>] {
        &PRIMITIVES
    }

    fn show_status_text(&self, text: &str) {
        info!(status = text, "Debugger status");
        *lock(&self.status_text) = Some(text.to_string());
    }

    fn apply_thread_filter(&self, thread: Option<ThreadId>) {
        *lock(&self.thread_filter) = thread;
    }

    fn resumed(&self, context: &SuspendContext) {
        debug!("Suspend context of thread {:?} resumed", context.thread());
    }

    async fn set_run_to_cursor_breakpoint(&self, breakpoint: StepIntoBreakpoint) {
        if breakpoint.request_id().is_none() {
            warn!("Step-into breakpoint has no VM request, the target method will not stop");
        }
        let previous = lock(&self.run_to_cursor).replace(breakpoint);
        if let Some(previous) = previous {
            self.clear_breakpoint_request(&previous).await;
        }
    }

    async fn resume_context(&self, context: &SuspendContext) -> EngineResult<()> {
        if context.is_resumed() {
            debug!("Suspend context already resumed");
            return Ok(());
        }

        match context.suspend_policy() {
            SuspendPolicy::All => self.connection.resume_all().await?,
            SuspendPolicy::EventThread => {
                if let Some(thread) = context.thread() {
                    self.connection.resume_thread(thread).await?;
                }
            }
            SuspendPolicy::None => {}
        }

        context.mark_resumed();
        Ok(())
    }

    async fn resume_thread(&self, context: &SuspendContext, thread: ThreadId) -> EngineResult<()> {
        if context.is_thread_resumed(thread) {
            debug!("Thread {:x} already resumed", thread);
            return Ok(());
        }

        self.connection.resume_thread(thread).await?;
        context.mark_thread_resumed(thread);
        Ok(())
    }

    async fn frame_count(&self, thread: ThreadId) -> EngineResult<i32> {
        Ok(self.connection.frame_count(thread).await?)
    }

    async fn create_breakpoint_request(
        &self,
        location: Location,
        suspend_policy: SuspendPolicy,
    ) -> EngineResult<RequestId> {
        Ok(self.connection.set_breakpoint(location, suspend_policy).await?)
    }
}
