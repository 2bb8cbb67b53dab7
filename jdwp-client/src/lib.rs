// JDWP client library for Java debugging
//
// Implements the subset of the JDWP protocol a stepping debugger needs:
// - Connection management
// - Event requests (breakpoints, single steps, modifiers)
// - Thread control (suspend/resume, frame counts, status)
// - Class and method lookup for breakpoint placement

pub mod connection;
pub mod protocol;
pub mod commands;
pub mod events;
pub mod eventloop;
pub mod types;
pub mod reader;
pub mod vm;
pub mod reftype;
pub mod method;
pub mod eventrequest;
pub mod thread;

pub use connection::JdwpConnection;
pub use protocol::{JdwpError, JdwpResult};
pub use eventrequest::{RequestId, SuspendPolicy};
pub use events::{Event, EventKind, EventModifier, EventSet};
