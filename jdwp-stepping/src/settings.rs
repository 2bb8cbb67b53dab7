// Debugger settings
//
// Loaded from JSON; every key is optional and unknown keys are ignored.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebuggerSettings {
    /// Resume only the stepping thread when the VM was stopped with suspend-all
    pub resume_only_current_thread: bool,
    /// Class patterns skipped while stepping (JDWP ClassExclude syntax)
    pub stepping_filters: Vec<String>,
    /// Expire each step request after its first event
    pub step_count_filter: bool,
}

impl Default for DebuggerSettings {
    fn default() -> Self {
        Self {
            resume_only_current_thread: false,
            stepping_filters: [
                "java.*",
                "javax.*",
                "jdk.internal.*",
                "sun.*",
                "com.sun.*",
                "kotlin.jvm.internal.*",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            step_count_filter: true,
        }
    }
}

impl DebuggerSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_keys_use_defaults() {
        let settings = DebuggerSettings::from_json_str(r#"{"resume_only_current_thread": true}"#).unwrap();

        assert!(settings.resume_only_current_thread);
        assert!(settings.step_count_filter);
        assert!(settings.stepping_filters.iter().any(|f| f == "java.*"));
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let settings =
            DebuggerSettings::from_json_str(r#"{"stepping_filters": [], "theme": "dark"}"#).unwrap();

        assert!(settings.stepping_filters.is_empty());
        assert!(!settings.resume_only_current_thread);
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let err = DebuggerSettings::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"step_count_filter": false}}"#).unwrap();

        let settings = DebuggerSettings::load(file.path()).unwrap();
        assert!(!settings.step_count_filter);

        let missing = DebuggerSettings::load(file.path().with_extension("missing"));
        assert!(matches!(missing, Err(SettingsError::Io(_))));
    }
}
