//! Engine configuration that downstream crates can serialize/deserialize.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Initial capacity hint for the full-ordering value buffer. The
    /// buffer still grows without bound; this only sizes the first
    /// allocation.
    pub buffer_capacity_hint: usize,

    /// Emit a trace event for every buffered/retained element. Expensive;
    /// intended for tests and debugging sessions.
    pub trace_notifications: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            buffer_capacity_hint: 128,
            trace_notifications: false,
        }
    }
}

impl EngineConfig {
    /// Create a config from environment variables, falling back to defaults.
    ///
    /// Environment variables:
    /// - `RIVULET_BUFFER_CAPACITY_HINT`: initial value-buffer capacity
    /// - `RIVULET_TRACE_NOTIFICATIONS`: `1`/`true` to trace per element
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(s) = std::env::var("RIVULET_BUFFER_CAPACITY_HINT") {
            if let Ok(v) = s.parse::<usize>() {
                cfg.buffer_capacity_hint = v;
            }
        }

        if let Ok(s) = std::env::var("RIVULET_TRACE_NOTIFICATIONS") {
            cfg.trace_notifications = s == "1" || s.eq_ignore_ascii_case("true");
        }

        cfg
    }
}
