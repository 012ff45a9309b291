//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::memory::DEFAULT_MEMORY_LIMIT;

/// Default nested call/create limit
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1024;

/// Interpreter limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvmConfig {
    /// Calls and creates at this depth push 0 instead of running
    #[serde(default = "default_max_call_depth")]
    pub max_call_depth: usize,
    /// Operand stack cap, unbounded when absent
    #[serde(default)]
    pub stack_limit: Option<usize>,
    /// Memory cap in bytes, shared by a frame and every sub-call it makes
    #[serde(default = "default_memory_limit")]
    pub memory_limit: usize,
    /// Instruction cap per frame, unbounded when absent
    #[serde(default)]
    pub step_limit: Option<u64>,
}

fn default_max_call_depth() -> usize {
    DEFAULT_MAX_CALL_DEPTH
}

fn default_memory_limit() -> usize {
    DEFAULT_MEMORY_LIMIT
}

impl Default for EvmConfig {
    fn default() -> Self {
        Self {
            max_call_depth: default_max_call_depth(),
            stack_limit: None,
            memory_limit: default_memory_limit(),
            step_limit: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EvmConfig::default();
        assert_eq!(config.max_call_depth, 1024);
        assert_eq!(config.stack_limit, None);
        assert_eq!(config.memory_limit, 32 * 1024 * 1024);
        assert_eq!(config.step_limit, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvmConfig = serde_json::from_str(r#"{"stack_limit": 1024}"#).unwrap();
        assert_eq!(config.stack_limit, Some(1024));
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert_eq!(config.memory_limit, DEFAULT_MEMORY_LIMIT);

        let empty: EvmConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, EvmConfig::default());
    }
}
