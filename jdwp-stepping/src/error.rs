// Error types for the stepping engine

use jdwp_client::JdwpError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

/// Failure of a call into the debug engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("JDWP error: {0}")]
    Jdwp(#[from] JdwpError),

    #[error("Access to internal primitive '{0}' denied")]
    AccessDenied(String),

    #[error("No context thread to step")]
    NoContextThread,

    #[error("Debug process disconnected")]
    Disconnected,
}

/// Failure loading debugger settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}
