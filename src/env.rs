//! Read-only environment snapshot consumed by tilde expansion.

use std::collections::HashMap;

/// Key/value snapshot of environment variables.
///
/// The expander takes this as an explicit argument instead of reading a
/// process-wide global, so tests can inject a home directory without
/// touching the real environment.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment.
    pub fn from_process() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Snapshot containing exactly one `HOME` entry.
    pub fn with_home(home: impl Into<String>) -> Self {
        Self {
            vars: HashMap::from([("HOME".to_string(), home.into())]),
        }
    }

    /// Snapshot with no variables at all (no `HOME`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Look up a variable by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// The `HOME` value, if present.
    pub fn home(&self) -> Option<&str> {
        self.get("HOME")
    }
}
