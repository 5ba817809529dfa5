use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Timing and comparison knobs shared by every engine component.
///
/// All fields have defaults, so an empty TOML document is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Quiescence window before a param change turns into a fetch.
    pub fetch_debounce_ms: u64,
    /// Quiescence window before changed params are persisted.
    pub persist_debounce_ms: u64,
    /// Quiescence window before a bound form's value is pushed into the filter.
    pub form_debounce_ms: u64,
    /// Depth bound for structural comparison of params and filters.
    pub equality_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch_debounce_ms: 300,
            persist_debounce_ms: 100,
            form_debounce_ms: 300,
            equality_depth: 3,
        }
    }
}

impl EngineConfig {
    pub fn fetch_debounce(&self) -> Duration {
        Duration::from_millis(self.fetch_debounce_ms)
    }

    pub fn persist_debounce(&self) -> Duration {
        Duration::from_millis(self.persist_debounce_ms)
    }

    pub fn form_debounce(&self) -> Duration {
        Duration::from_millis(self.form_debounce_ms)
    }
}
