//! Nested invocation: CALL, DELEGATECALL, STATICCALL, CREATE, SELFDESTRUCT
//!
//! The CALL family and CREATE decode their operands here and park the frame
//! with a [`FrameRequest`]; the call stack in `frame.rs` runs the child and
//! hands its result back to `finish_call` / `finish_create`. The state is
//! snapshotted first and put back when the sub-call does not succeed, so only
//! successful mutations propagate to the caller. Sub-call failures are
//! reported as a 0 on the caller's stack and never abort the caller.

use bytes::Bytes;
use sevm_crypto::create_address;
use sevm_primitives::Address;

use crate::context::{CallContext, Environment};
use crate::error::{EvmError, EvmResult, ExecutionResult, ExitStatus};
use crate::frame::{FrameKind, FrameRequest};
use crate::interpreter::Interpreter;
use crate::opcode::Opcode;
use crate::state::WorldState;
use crate::word;

/// Nonce used for address derivation; creation is not nonce-tracked
const CREATE_NONCE: u64 = 0;

impl Interpreter {
    /// CALL, DELEGATECALL and STATICCALL
    pub(crate) fn call(
        &mut self,
        opcode: Opcode,
        env: &Environment,
        state: &WorldState,
    ) -> EvmResult<()> {
        let _gas = self.stack.pop()?;
        let target = word::to_address(&self.stack.pop()?);
        let value = match opcode {
            Opcode::CALL => self.stack.pop()?,
            _ => word::ZERO,
        };
        let (args_offset, args_size) = self.pop_range()?;
        let (ret_offset, ret_size) = self.pop_range()?;

        if env.call.is_static && !word::is_zero(&value) {
            return Err(EvmError::StaticCallViolation);
        }

        let input = Bytes::from(self.memory.load_range(args_offset, args_size)?);
        // Reserve the output window before running the callee
        self.memory.expand(ret_offset, ret_size)?;

        if env.call.depth >= self.config.max_call_depth {
            tracing::debug!(depth = env.call.depth, %opcode, "call depth limit reached");
            self.return_data.clear();
            return self.stack.push(word::ZERO);
        }

        let depth = env.call.depth + 1;
        let code = state.code(&target);
        tracing::debug!(%opcode, %target, depth, code_len = code.len(), "sub-call");

        let call = match opcode {
            Opcode::DELEGATECALL => CallContext {
                depth,
                ..env.call.clone()
            },
            Opcode::STATICCALL => CallContext {
                address: Some(target),
                caller: env.call.address,
                value: Some(word::ZERO),
                data: input,
                is_static: true,
                depth,
            },
            _ => CallContext {
                address: Some(target),
                caller: env.call.address,
                value: Some(value),
                data: input,
                is_static: env.call.is_static,
                depth,
            },
        };

        self.request = Some(FrameRequest {
            kind: FrameKind::Call {
                opcode,
                ret_offset,
                ret_size,
            },
            code,
            env: env.nested(call),
        });
        Ok(())
    }

    /// Copy a finished sub-call's output into the caller and push its flag
    pub(crate) fn finish_call(
        &mut self,
        result: ExecutionResult,
        ret_offset: usize,
        ret_size: usize,
    ) -> EvmResult<()> {
        let success = result.is_success();
        self.memory
            .store_padded(ret_offset, ret_size, &result.output, 0)?;
        self.return_data = result.output;
        if success {
            self.logs.extend(result.logs);
        }
        self.stack.push(word::from_bool(success))
    }

    /// CREATE: run init code and install its output as a new account's code
    pub(crate) fn create(&mut self, env: &Environment) -> EvmResult<()> {
        if env.call.is_static {
            return Err(EvmError::StaticCallViolation);
        }
        let value = self.stack.pop()?;
        let (offset, size) = self.pop_range()?;
        let init_code = Bytes::from(self.memory.load_range(offset, size)?);

        if env.call.depth >= self.config.max_call_depth {
            tracing::debug!(depth = env.call.depth, "create depth limit reached");
            self.return_data.clear();
            return self.stack.push(word::ZERO);
        }

        let sender = env.call.address.unwrap_or_default();
        let address = create_address(&sender, CREATE_NONCE);
        tracing::debug!(%sender, %address, init_len = init_code.len(), "create");

        let child = env.nested(CallContext {
            address: Some(address),
            caller: Some(sender),
            value: Some(value),
            data: Bytes::new(),
            is_static: false,
            depth: env.call.depth + 1,
        });
        self.request = Some(FrameRequest {
            kind: FrameKind::Create { address, value },
            code: init_code,
            env: child,
        });
        Ok(())
    }

    /// Install the init output as code and push the new address, or 0
    pub(crate) fn finish_create(
        &mut self,
        address: Address,
        result: ExecutionResult,
        state: &mut WorldState,
    ) -> EvmResult<()> {
        match result.status {
            ExitStatus::Success => {
                // Init code that self-destructed leaves nothing to install
                if let Some(account) = state.get_mut(&address) {
                    account.code = Bytes::from(result.output);
                }
                self.logs.extend(result.logs);
                self.return_data.clear();
                self.stack.push(word::from_address(&address))
            }
            ExitStatus::Revert => {
                self.return_data = result.output;
                self.stack.push(word::ZERO)
            }
            ExitStatus::Halt(_) => {
                self.return_data.clear();
                self.stack.push(word::ZERO)
            }
        }
    }

    /// SELFDESTRUCT: move the balance to the beneficiary, drop the account
    /// and halt the frame
    pub(crate) fn selfdestruct(
        &mut self,
        env: &Environment,
        state: &mut WorldState,
    ) -> EvmResult<()> {
        if env.call.is_static {
            return Err(EvmError::StaticCallViolation);
        }
        let beneficiary = word::to_address(&self.stack.pop()?);
        let address = env.call.address()?;

        let balance = state
            .remove(&address)
            .map(|account| account.balance)
            .unwrap_or(word::ZERO);
        state.add_balance(&beneficiary, &balance);
        tracing::debug!(%address, %beneficiary, "selfdestruct");

        self.stopped = true;
        Ok(())
    }
}
