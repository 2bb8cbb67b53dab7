// Method filters for step-into targets

use jdwp_client::types::Location;
use serde::{Deserialize, Serialize};

/// A step-into target that resolves to a concrete bytecode location,
/// so the step can be gated behind a breakpoint there
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointStepMethodFilter {
    pub class_name: String,
    pub method_name: String,
    pub location: Location,
}

/// Describes the method a step-into should end up in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MethodFilter {
    /// Match by class pattern and method name only
    Named {
        class_pattern: String,
        method_name: String,
    },
    Breakpoint(BreakpointStepMethodFilter),
}

impl MethodFilter {
    pub fn matches(&self, class_name: &str, method_name: &str) -> bool {
        match self {
            MethodFilter::Named {
                class_pattern,
                method_name: target,
            } => target == method_name && class_pattern_matches(class_pattern, class_name),
            MethodFilter::Breakpoint(filter) => {
                filter.method_name == method_name && filter.class_name == class_name
            }
        }
    }

    pub fn breakpoint_filter(&self) -> Option<&BreakpointStepMethodFilter> {
        match self {
            MethodFilter::Breakpoint(filter) => Some(filter),
            MethodFilter::Named { .. } => None,
        }
    }

    pub fn is_breakpoint_capable(&self) -> bool {
        self.breakpoint_filter().is_some()
    }
}

/// JDWP class pattern match: exact name, `prefix.*` or `*.suffix`
pub fn class_pattern_matches(pattern: &str, class_name: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('*') {
        class_name.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        class_name.ends_with(suffix)
    } else {
        pattern == class_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_patterns() {
        assert!(class_pattern_matches("java.*", "java.lang.String"));
        assert!(!class_pattern_matches("java.*", "javax.swing.JFrame"));
        assert!(class_pattern_matches("*.Foo", "com.example.Foo"));
        assert!(class_pattern_matches("com.example.Foo", "com.example.Foo"));
        assert!(!class_pattern_matches("com.example.Foo", "com.example.FooBar"));
    }

    #[test]
    fn test_named_filter_is_not_breakpoint_capable() {
        let filter = MethodFilter::Named {
            class_pattern: "com.example.*".to_string(),
            method_name: "compute".to_string(),
        };

        assert!(!filter.is_breakpoint_capable());
        assert!(filter.matches("com.example.Calc", "compute"));
        assert!(!filter.matches("com.example.Calc", "render"));
    }

    #[test]
    fn test_breakpoint_filter_exposes_location() {
        let filter = MethodFilter::Breakpoint(BreakpointStepMethodFilter {
            class_name: "com.example.Calc".to_string(),
            method_name: "compute".to_string(),
            location: Location::in_class(3, 4, 0),
        });

        assert!(filter.is_breakpoint_capable());
        assert_eq!(
            filter.breakpoint_filter().map(|f| f.location),
            Some(Location::in_class(3, 4, 0))
        );
        assert!(filter.matches("com.example.Calc", "compute"));
    }
}
