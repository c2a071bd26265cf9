use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub random: RandomConfig,
    pub limits: Limits,
}

impl Config {
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

/// How the dice buffer is kept topped up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RandomConfig {
    /// Pull values from the configured entropy source. When off, every roll
    /// uses the local generator.
    pub use_remote: bool,
    /// Values requested per refill.
    pub prefetch_count: usize,
    /// The buffer reports `low` once it holds fewer values than this.
    pub refill_threshold: usize,
    pub fetch_timeout_ms: u64,
}

impl RandomConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }
}

impl Default for RandomConfig {
    fn default() -> Self {
        Self {
            use_remote: true,
            prefetch_count: 30,
            refill_threshold: 10,
            fetch_timeout_ms: 5000,
        }
    }
}

/// Guards against adversarial equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Deepest allowed nesting of parentheses, calls, and unary operators.
    pub max_depth: usize,
    pub max_tokens: usize,
    /// Deepest allowed chain of user functions or stored equations calling
    /// each other.
    pub max_call_depth: usize,
    pub max_rolls: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 64,
            max_tokens: 1024,
            max_call_depth: 20,
            max_rolls: 1000,
        }
    }
}
