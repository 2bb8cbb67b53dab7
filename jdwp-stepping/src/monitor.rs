// Blocked-thread monitor and its locator
//
// The monitor is owned by the engine and not reachable through any
// accessor, so it is found by scanning the process's internal fields for
// one of the right type.

use crate::process::DebugProcess;
use jdwp_client::types::ThreadId;
use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Tracks threads that were resumed alone and may block on a monitor
/// held by a thread that stayed suspended
#[derive(Debug, Default)]
pub struct ThreadBlockedMonitor {
    watched: Mutex<HashSet<ThreadId>>,
}

impl ThreadBlockedMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    fn watched(&self) -> MutexGuard<'_, HashSet<ThreadId>> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start_watching(&self, thread: Option<ThreadId>) {
        if let Some(thread) = thread {
            debug!("Watching thread {:x} for monitor blocking", thread);
            self.watched().insert(thread);
        }
    }

    pub fn stop_watching(&self, thread: ThreadId) -> bool {
        self.watched().remove(&thread)
    }

    pub fn is_watching(&self, thread: ThreadId) -> bool {
        self.watched().contains(&thread)
    }

    pub fn watched_threads(&self) -> Vec<ThreadId> {
        let mut threads: Vec<_> = self.watched().iter().copied().collect();
        threads.sort_unstable();
        threads
    }
}

/// One introspectable field of a debug process
///
/// `value` is `None` when the field exists but may not be read.
pub struct InternalField<'a> {
    pub name: &'static str,
    pub type_id: TypeId,
    pub value: Option<&'a dyn Any>,
}

impl<'a> InternalField<'a> {
    pub fn readable<T: Any>(name: &'static str, value: &'a T) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            value: Some(value as &dyn Any),
        }
    }

    pub fn sealed<T: Any>(name: &'static str) -> Self {
        Self {
            name,
            type_id: TypeId::of::<T>(),
            value: None,
        }
    }
}

/// Find the process's blocked-thread monitor
///
/// Returns the first field typed `Arc<ThreadBlockedMonitor>`; `None` when
/// there is no such field or it can't be read.
pub fn find_monitor<P: DebugProcess>(process: &P) -> Option<Arc<ThreadBlockedMonitor>> {
    let wanted = TypeId::of::<Arc<ThreadBlockedMonitor>>();

    let field = process
        .internals()
        .into_iter()
        .find(|field| field.type_id == wanted)?;

    let monitor = field
        .value
        .and_then(|value| value.downcast_ref::<Arc<ThreadBlockedMonitor>>())
        .cloned();

    if monitor.is_none() {
        debug!("Field '{}' holds the thread monitor but is not readable", field.name);
    }

    monitor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_lifecycle() {
        let monitor = ThreadBlockedMonitor::new();
        monitor.start_watching(None);
        assert!(monitor.watched_threads().is_empty());

        monitor.start_watching(Some(3));
        monitor.start_watching(Some(1));
        assert!(monitor.is_watching(3));
        assert_eq!(monitor.watched_threads(), vec![1, 3]);

        assert!(monitor.stop_watching(3));
        assert!(!monitor.stop_watching(3));
        assert_eq!(monitor.watched_threads(), vec![1]);
    }

    #[test]
    fn test_field_constructors() {
        let monitor = Arc::new(ThreadBlockedMonitor::new());
        let readable = InternalField::readable("monitor", &monitor);
        let sealed = InternalField::sealed::<Arc<ThreadBlockedMonitor>>("monitor");

        assert_eq!(readable.type_id, sealed.type_id);
        assert!(readable.value.is_some());
        assert!(sealed.value.is_none());
    }
}
