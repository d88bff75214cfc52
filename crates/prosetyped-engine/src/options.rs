use serde::{Deserialize, Serialize};
use std::time::Duration;

/// An attribute the common-prefix resolver should not compare.
///
/// In TOML either a bare key (`"id"`, ignored on every node type) or a table
/// scoping keys to one node type (`{ node_type = "heading", attributes = ["level"] }`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IgnoreAttribute {
    Key(String),
    Scoped {
        node_type: String,
        attributes: Vec<String>,
    },
}

/// Reveal session configuration. All durations are milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub show_cursor: bool,
    /// Milliseconds per position unit.
    pub typing_speed: u64,
    pub auto_start: bool,
    /// Delay before the first tick, measured from session creation.
    pub delay_start_time: Option<u64>,
    pub blink_interval: u64,
    pub hide_cursor_after_complete: bool,
    /// Mark applied to the cursor glyph, if the schema knows it.
    pub cursor_mark: Option<String>,
    pub cursor_glyph: String,
    pub ignore_attributes: Vec<IgnoreAttribute>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            show_cursor: true,
            typing_speed: 1000 / 30,
            auto_start: true,
            delay_start_time: None,
            blink_interval: 500,
            hide_cursor_after_complete: false,
            cursor_mark: None,
            cursor_glyph: "|".to_string(),
            ignore_attributes: Vec::new(),
        }
    }
}

impl Options {
    // Zero-length intervals are clamped so a timer can never become due
    // again inside the poll that fired it.
    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_speed.max(1))
    }

    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(self.blink_interval.max(1))
    }

    pub fn start_delay(&self) -> Duration {
        Duration::from_millis(self.delay_start_time.unwrap_or(0))
    }
}
