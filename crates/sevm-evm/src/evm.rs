//! Engine entry point

use bytes::Bytes;

use crate::config::EvmConfig;
use crate::context::Environment;
use crate::error::ExecutionResult;
use crate::interpreter::Interpreter;
use crate::state::WorldState;
use crate::storage::Storage;

/// Bytecode executor.
///
/// Holds only configuration; every invocation builds its own [`Interpreter`].
/// When the top-level frame does not succeed, `state` and `storage` are put
/// back exactly as they were passed in.
#[derive(Clone, Debug, Default)]
pub struct Evm {
    config: EvmConfig,
}

impl Evm {
    /// Creates an engine with the given limits
    pub fn new(config: EvmConfig) -> Self {
        Self { config }
    }

    /// Engine limits
    pub fn config(&self) -> &EvmConfig {
        &self.config
    }

    /// Execute `code` in `env` against `state` and `storage`
    pub fn execute(
        &self,
        code: impl Into<Bytes>,
        env: &Environment,
        state: &mut WorldState,
        storage: &mut Storage,
    ) -> ExecutionResult {
        let state_snapshot = state.clone();
        let storage_snapshot = storage.clone();

        let result = Interpreter::new(code, self.config).run(env, state, storage);

        if !result.is_success() {
            tracing::debug!(status = ?result.status, "rolling back top-level frame");
            *state = state_snapshot;
            *storage = storage_snapshot;
        }
        result
    }

    /// Execute `code` with a fresh storage scope
    pub fn transact(
        &self,
        code: impl Into<Bytes>,
        env: &Environment,
        state: &mut WorldState,
    ) -> ExecutionResult {
        self.execute(code, env, state, &mut Storage::new())
    }
}
