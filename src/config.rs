use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, Result};

/// Options read once when an agent is built. Every field has a default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default = "default_max_short_term_memory")]
    pub max_short_term_memory: usize,
    #[serde(default = "default_promotion_threshold")]
    pub promotion_threshold: u8,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    #[serde(default = "default_enable_reasoning_history")]
    pub enable_reasoning_history: bool,
    /// Per-call bound in milliseconds. Zero disables it.
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_short_term_memory: default_max_short_term_memory(),
            promotion_threshold: default_promotion_threshold(),
            max_iterations: default_max_iterations(),
            enable_reasoning_history: default_enable_reasoning_history(),
            tool_timeout_ms: default_tool_timeout_ms(),
        }
    }
}

impl AgentConfig {
    pub fn tool_timeout(&self) -> Duration {
        Duration::from_millis(self.tool_timeout_ms)
    }

    pub fn with_max_short_term_memory(mut self, capacity: usize) -> Self {
        self.max_short_term_memory = capacity;
        self
    }

    pub fn with_promotion_threshold(mut self, threshold: u8) -> Self {
        self.promotion_threshold = threshold;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_reasoning_history(mut self, enabled: bool) -> Self {
        self.enable_reasoning_history = enabled;
        self
    }

    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        // a non-zero duration never collapses to "unbounded"
        self.tool_timeout_ms = if timeout.is_zero() { 0 } else { millis.max(1) };
        self
    }
}

fn default_max_short_term_memory() -> usize {
    10
}

fn default_promotion_threshold() -> u8 {
    5
}

fn default_max_iterations() -> usize {
    50
}

fn default_enable_reasoning_history() -> bool {
    true
}

fn default_tool_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .map_err(|err| AgentError::Config(format!("Failed to parse configuration: {err}")))
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_env_or_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut cfg = Self::from_file(path)?;
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    /// Apply `AUTOGOAL_*` variables. Values that fail to parse are ignored.
    pub fn apply_env_overrides(&mut self) {
        override_from_env("AUTOGOAL_MAX_SHORT_TERM_MEMORY", &mut self.agent.max_short_term_memory);
        override_from_env("AUTOGOAL_PROMOTION_THRESHOLD", &mut self.agent.promotion_threshold);
        override_from_env("AUTOGOAL_MAX_ITERATIONS", &mut self.agent.max_iterations);
        override_from_env(
            "AUTOGOAL_ENABLE_REASONING_HISTORY",
            &mut self.agent.enable_reasoning_history,
        );
        override_from_env("AUTOGOAL_TOOL_TIMEOUT_MS", &mut self.agent.tool_timeout_ms);
        if let Ok(level) = env::var("AUTOGOAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        override_from_env("AUTOGOAL_LOG_JSON", &mut self.logging.json);
    }
}

fn override_from_env<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = env::var(key) {
        match raw.trim().parse::<T>() {
            Ok(parsed) => *target = parsed,
            Err(_) => tracing::warn!(key, value = %raw, "ignoring unparseable override"),
        }
    }
}
