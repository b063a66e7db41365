use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SESSION_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_ATTENDANCE_STEP: u32 = 2;
pub const DEFAULT_HIGHLIGHT_MS: u64 = 2000;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL of the session service; endpoint paths are appended to it.
    pub session_url: String,

    /// Base URL of the voice service. Falls back to `session_url`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_url: Option<String>,

    /// Attendance percentage points added or removed by one present/absent mark.
    pub attendance_step: u32,

    /// How long a cell highlight stays up after a change, in milliseconds.
    pub highlight_ms: u64,

    /// Per-request timeout in seconds. Zero disables it.
    pub request_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            session_url: DEFAULT_SESSION_URL.to_string(),
            voice_url: None,
            attendance_step: DEFAULT_ATTENDANCE_STEP,
            highlight_ms: DEFAULT_HIGHLIGHT_MS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        let cfg: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parse config {}", path.display()))?;
        Ok(cfg)
    }

    pub fn session_url(&self) -> &str {
        self.session_url.trim_end_matches('/')
    }

    pub fn voice_url(&self) -> &str {
        self.voice_url
            .as_deref()
            .unwrap_or(&self.session_url)
            .trim_end_matches('/')
    }

    pub fn highlight_duration(&self) -> Duration {
        Duration::from_millis(self.highlight_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
#[path = "../tests/model/config_tests.rs"]
mod tests;
