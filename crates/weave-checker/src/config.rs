//! Probe limits

use serde::{Deserialize, Serialize};

/// Limits applied to every host fragment the checker runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Wall-clock budget per fragment, in milliseconds
    pub budget_ms: u64,
    /// Operation cap per fragment
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_string_size: usize,
    pub max_array_size: usize,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            budget_ms: 25,
            max_operations: 1_000_000,
            max_call_levels: 64,
            max_string_size: 1 << 20,
            max_array_size: 1 << 16,
        }
    }
}
