// Step-into command for JVM debuggers
//
// Builds and runs a "step into" on a suspended thread:
// - decides which threads to resume
// - optionally gates the step behind a breakpoint on a target method
// - disables the host's same-frame shortcut so guest-language step
//   filtering sees every stop
// - submits the step through the engine's internal stepping primitive
//
// The engine is reached through the `DebugProcess` trait; `JdwpDebugProcess`
// implements it over a JDWP connection.

pub mod breakpoint;
pub mod command;
pub mod context;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod frame;
pub mod invoker;
pub mod jdwp;
pub mod monitor;
pub mod process;
pub mod session;
pub mod settings;
pub mod step_into;

pub use breakpoint::StepIntoBreakpoint;
pub use command::{ResumeCommand, ResumeScope};
pub use context::SuspendContext;
pub use descriptor::{StepDepth, StepDescriptor, StepSize};
pub use error::{EngineError, EngineResult, SettingsError};
pub use filter::{BreakpointStepMethodFilter, MethodFilter};
pub use frame::{FrameIdentityPolicy, NeverSameFrame};
pub use invoker::PrivilegedStepInvoker;
pub use jdwp::JdwpDebugProcess;
pub use monitor::{find_monitor, InternalField, ThreadBlockedMonitor};
pub use process::{DebugProcess, ParamKind, Primitive, StepCall};
pub use session::SteppingSession;
pub use settings::DebuggerSettings;
pub use step_into::StepIntoCommand;
