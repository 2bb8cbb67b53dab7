// Suspend contexts
//
// One suspension of the debugged VM: the policy it was suspended with,
// the thread whose event caused it, and which resumes already happened.

use jdwp_client::types::ThreadId;
use jdwp_client::{EventSet, SuspendPolicy};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
pub struct SuspendContext {
    suspend_policy: SuspendPolicy,
    thread: Option<ThreadId>,
    resumed: AtomicBool,
    resumed_threads: Mutex<HashSet<ThreadId>>,
}

impl SuspendContext {
    pub fn new(suspend_policy: SuspendPolicy, thread: Option<ThreadId>) -> Self {
        Self {
            suspend_policy,
            thread,
            resumed: AtomicBool::new(false),
            resumed_threads: Mutex::new(HashSet::new()),
        }
    }

    /// Context for the suspension an event set reported
    pub fn from_event_set(event_set: &EventSet) -> Self {
        Self::new(event_set.suspend_policy, event_set.thread())
    }

    pub fn suspend_policy(&self) -> SuspendPolicy {
        self.suspend_policy
    }

    /// Thread whose event triggered the suspension
    pub fn thread(&self) -> Option<ThreadId> {
        self.thread
    }

    pub fn is_resumed(&self) -> bool {
        self.resumed.load(Ordering::SeqCst)
    }

    pub fn mark_resumed(&self) {
        self.resumed.store(true, Ordering::SeqCst);
    }

    pub fn is_thread_resumed(&self, thread: ThreadId) -> bool {
        self.is_resumed()
            || self
                .resumed_threads
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains(&thread)
    }

    pub fn mark_thread_resumed(&self, thread: ThreadId) {
        self.resumed_threads
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(thread);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jdwp_client::types::Location;
    use jdwp_client::{Event, EventKind};

    #[test]
    fn test_from_event_set_takes_first_thread() {
        let set = EventSet {
            suspend_policy: SuspendPolicy::EventThread,
            events: vec![
                Event {
                    kind: 99,
                    request_id: 0,
                    details: EventKind::VMDeath,
                },
                Event {
                    kind: 2,
                    request_id: 5,
                    details: EventKind::Breakpoint {
                        thread: 0x42,
                        location: Location::in_class(1, 1, 0),
                    },
                },
            ],
        };

        let context = SuspendContext::from_event_set(&set);
        assert_eq!(context.suspend_policy(), SuspendPolicy::EventThread);
        assert_eq!(context.thread(), Some(0x42));
    }

    #[test]
    fn test_resume_bookkeeping() {
        let context = SuspendContext::new(SuspendPolicy::All, Some(1));
        assert!(!context.is_thread_resumed(1));

        context.mark_thread_resumed(1);
        assert!(context.is_thread_resumed(1));
        assert!(!context.is_thread_resumed(2));
        assert!(!context.is_resumed());

        context.mark_resumed();
        assert!(context.is_thread_resumed(2));
    }
}
