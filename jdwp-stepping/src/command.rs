// Resume commands
//
// A resume command runs once against a suspend context. Which threads it
// lets run is decided by the `ResumeScope` it is built with.

use crate::context::SuspendContext;
use crate::monitor::ThreadBlockedMonitor;
use crate::process::DebugProcess;
use jdwp_client::types::ThreadId;
use jdwp_client::SuspendPolicy;
use std::sync::Arc;
use tracing::{debug, error};

/// Which threads a resume command lets run
#[derive(Debug, Clone, Default)]
pub struct ResumeScope {
    resume_only_current_thread: bool,
    blocked_monitor: Option<Arc<ThreadBlockedMonitor>>,
}

impl ResumeScope {
    /// Resume everything the context suspended
    pub fn all() -> Self {
        Self::default()
    }

    /// Scope of a step: the stepping thread is watched for monitor blocking,
    /// and may be the only thread resumed
    pub fn stepping(blocked_monitor: Arc<ThreadBlockedMonitor>, resume_only_current_thread: bool) -> Self {
        Self {
            resume_only_current_thread,
            blocked_monitor: Some(blocked_monitor),
        }
    }

    pub fn resume_only_current_thread(&self) -> bool {
        self.resume_only_current_thread
    }
}

#[derive(Debug)]
pub struct ResumeCommand<P> {
    process: Arc<P>,
    context: Arc<SuspendContext>,
    context_thread: Option<ThreadId>,
    scope: ResumeScope,
}

impl<P: DebugProcess> ResumeCommand<P> {
    pub fn new(process: Arc<P>, context: Arc<SuspendContext>, scope: ResumeScope) -> Self {
        let context_thread = context.thread();
        Self {
            process,
            context,
            context_thread,
            scope,
        }
    }

    pub fn process(&self) -> &Arc<P> {
        &self.process
    }

    pub fn suspend_context(&self) -> &Arc<SuspendContext> {
        &self.context
    }

    pub fn context_thread(&self) -> Option<ThreadId> {
        self.context_thread
    }

    pub fn scope(&self) -> &ResumeScope {
        &self.scope
    }

    /// Resume according to the scope
    ///
    /// With "resume only current thread" on a suspend-all context, only the
    /// context thread is resumed; everything else stays suspended.
    pub async fn resume_action(&self) {
        let policy = self.context.suspend_policy();
        let only_current = self.scope.resume_only_current_thread;

        if let Some(monitor) = &self.scope.blocked_monitor {
            if policy == SuspendPolicy::EventThread || only_current {
                monitor.start_watching(self.context_thread);
            }
        }

        match self.context_thread {
            Some(thread) if only_current && policy == SuspendPolicy::All => {
                debug!("Resuming only thread {:x}", thread);
                if let Err(e) = self.process.resume_thread(&self.context, thread).await {
                    error!(error = %e, "Failed to resume thread {:x}", thread);
                }
            }
            _ => {
                if let Err(e) = self.process.resume_context(&self.context).await {
                    error!(error = %e, "Failed to resume suspend context");
                }
            }
        }
    }

    /// Common tail of every resume command
    pub async fn finish(&self) {
        self.process.show_status_text("Process resumed");
        self.resume_action().await;
        self.process.resumed(&self.context);
    }
}
