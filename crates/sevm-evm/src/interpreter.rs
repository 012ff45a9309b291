//! Bytecode interpreter loop

use bytes::Bytes;
use sevm_crypto::keccak256;
use sevm_primitives::H256;

use crate::config::EvmConfig;
use crate::context::{required, Environment};
use crate::error::{EvmError, EvmResult, ExecutionResult, Log};
use crate::frame::{FrameExit, FrameRequest};
use crate::jumpdest::JumpTable;
use crate::memory::Memory;
use crate::opcode::Opcode;
use crate::stack::Stack;
use crate::state::WorldState;
use crate::storage::Storage;
use crate::word::{self, Word};

/// Single-frame interpreter state
#[derive(Clone, Debug)]
pub struct Interpreter {
    /// Bytecode being executed
    pub(crate) code: Bytes,
    /// Program counter
    pc: usize,
    /// Operand stack
    pub(crate) stack: Stack,
    /// Frame memory
    pub(crate) memory: Memory,
    /// Output of the most recent sub-call
    pub(crate) return_data: Vec<u8>,
    /// RETURN payload
    output: Vec<u8>,
    /// Valid jump destinations
    jump_table: JumpTable,
    /// Execution stopped
    pub(crate) stopped: bool,
    /// Logs emitted
    pub(crate) logs: Vec<Log>,
    /// Instructions executed so far
    steps: u64,
    /// Sub-frame the last instruction asked for
    pub(crate) request: Option<FrameRequest>,
    /// Error raised while folding a finished sub-frame back in
    pub(crate) fault: Option<EvmError>,
    /// Limits
    pub(crate) config: EvmConfig,
}

impl Interpreter {
    /// Create a new interpreter for `code`
    pub fn new(code: impl Into<Bytes>, config: EvmConfig) -> Self {
        let code = code.into();
        let jump_table = JumpTable::analyze(&code);
        Self {
            code,
            pc: 0,
            stack: Stack::with_limit(config.stack_limit),
            memory: Memory::with_limit(config.memory_limit),
            return_data: Vec::new(),
            output: Vec::new(),
            jump_table,
            stopped: false,
            logs: Vec::new(),
            steps: 0,
            request: None,
            fault: None,
            config,
        }
    }

    /// Step until this frame ends or parks on a sub-call
    pub(crate) fn resume(
        &mut self,
        env: &Environment,
        state: &mut WorldState,
        storage: &mut Storage,
    ) -> FrameExit {
        let mut outcome = match self.fault.take() {
            Some(err) => Err(err),
            None => Ok(()),
        };
        while outcome.is_ok() && !self.stopped && self.pc < self.code.len() {
            outcome = self.step(env, state, storage);
            if let Some(request) = self.request.take() {
                return FrameExit::SubFrame(request);
            }
        }
        FrameExit::Done(self.finish(env, outcome))
    }

    fn finish(&mut self, env: &Environment, outcome: EvmResult<()>) -> ExecutionResult {
        let stack = std::mem::take(&mut self.stack).into_vec();
        let logs = std::mem::take(&mut self.logs);
        match outcome {
            Ok(()) => {
                tracing::debug!(depth = env.call.depth, steps = self.steps, "frame success");
                ExecutionResult::success(stack, std::mem::take(&mut self.output), logs)
            }
            Err(EvmError::Revert(data)) => {
                tracing::debug!(depth = env.call.depth, len = data.len(), "frame reverted");
                ExecutionResult::revert(stack, data, logs)
            }
            Err(err) => {
                tracing::debug!(depth = env.call.depth, pc = self.pc, error = %err, "frame halted");
                ExecutionResult::halt(err)
            }
        }
    }

    /// Execute a single instruction
    fn step(
        &mut self,
        env: &Environment,
        state: &mut WorldState,
        storage: &mut Storage,
    ) -> EvmResult<()> {
        let Some(&byte) = self.code.get(self.pc) else {
            self.stopped = true;
            return Ok(());
        };

        if let Some(limit) = self.config.step_limit {
            if self.steps >= limit {
                return Err(EvmError::StepLimitExceeded(limit));
            }
        }
        self.steps += 1;

        let opcode = Opcode::from_byte(byte).ok_or(EvmError::InvalidOpcode(byte))?;
        tracing::trace!(pc = self.pc, %opcode, depth = self.stack.len(), "step");

        let pc = self.pc;
        self.pc += 1;
        self.execute(opcode, pc, env, state, storage)
    }

    /// Current program counter
    pub fn pc(&self) -> usize {
        self.pc
    }

    /// Execute an opcode located at `pc`; `self.pc` already points past it
    fn execute(
        &mut self,
        opcode: Opcode,
        pc: usize,
        env: &Environment,
        state: &mut WorldState,
        storage: &mut Storage,
    ) -> EvmResult<()> {
        match opcode {
            Opcode::STOP => {
                self.stopped = true;
            }

            // Arithmetic
            Opcode::ADD => self.binary(word::add)?,
            Opcode::MUL => self.binary(word::mul)?,
            Opcode::SUB => self.binary(word::sub)?,
            Opcode::DIV => self.binary(word::div)?,
            Opcode::SDIV => self.binary(word::sdiv)?,
            Opcode::MOD => self.binary(word::rem)?,
            Opcode::SMOD => self.binary(word::smod)?,
            Opcode::ADDMOD => self.ternary(word::addmod)?,
            Opcode::MULMOD => self.ternary(word::mulmod)?,
            Opcode::EXP => self.binary(word::exp)?,
            Opcode::SIGNEXTEND => self.binary(word::signextend)?,

            // Comparison
            Opcode::LT => self.compare(word::lt)?,
            Opcode::GT => self.compare(word::gt)?,
            Opcode::SLT => self.compare(word::slt)?,
            Opcode::SGT => self.compare(word::sgt)?,
            Opcode::EQ => self.compare(word::eq)?,
            Opcode::ISZERO => {
                let a = self.stack.pop()?;
                self.stack.push(word::from_bool(word::is_zero(&a)))?;
            }

            // Bitwise
            Opcode::AND => self.binary(word::and)?,
            Opcode::OR => self.binary(word::or)?,
            Opcode::XOR => self.binary(word::xor)?,
            Opcode::NOT => {
                let a = self.stack.pop()?;
                self.stack.push(word::not(&a))?;
            }
            Opcode::BYTE => self.binary(word::byte)?,
            Opcode::SHL => self.binary(word::shl)?,
            Opcode::SHR => self.binary(word::shr)?,
            Opcode::SAR => self.binary(word::sar)?,

            Opcode::KECCAK256 => {
                let (offset, size) = self.pop_range()?;
                let data = self.memory.load_range(offset, size)?;
                self.stack.push(keccak256(&data).into_bytes())?;
            }

            // Environment
            Opcode::ADDRESS => {
                let address = env.call.address()?;
                self.stack.push(word::from_address(&address))?;
            }
            Opcode::BALANCE => {
                let address = word::to_address(&self.stack.pop()?);
                self.stack.push(state.balance(&address))?;
            }
            Opcode::ORIGIN => {
                let origin = required(env.tx.origin, "origin")?;
                self.stack.push(word::from_address(&origin))?;
            }
            Opcode::CALLER => {
                let caller = env.call.caller()?;
                self.stack.push(word::from_address(&caller))?;
            }
            Opcode::CALLVALUE => {
                self.stack.push(env.call.value()?)?;
            }
            Opcode::CALLDATALOAD => {
                let offset = word::to_usize(&self.stack.pop()?).unwrap_or(usize::MAX);
                let tail = env.call.data.get(offset..).unwrap_or(&[]);
                let mut value = word::ZERO;
                let len = tail.len().min(32);
                value[..len].copy_from_slice(&tail[..len]);
                self.stack.push(value)?;
            }
            Opcode::CALLDATASIZE => {
                self.stack.push(word::from_usize(env.call.data.len()))?;
            }
            Opcode::CALLDATACOPY => {
                self.copy_to_memory(&env.call.data)?;
            }
            Opcode::CODESIZE => {
                self.stack.push(word::from_usize(self.code.len()))?;
            }
            Opcode::CODECOPY => {
                let code = self.code.clone();
                self.copy_to_memory(&code)?;
            }
            Opcode::GASPRICE => {
                self.stack.push(required(env.tx.gas_price, "gasprice")?)?;
            }
            Opcode::EXTCODESIZE => {
                let address = word::to_address(&self.stack.pop()?);
                self.stack.push(word::from_usize(state.code(&address).len()))?;
            }
            Opcode::EXTCODECOPY => {
                let address = word::to_address(&self.stack.pop()?);
                let code = state.code(&address);
                self.copy_to_memory(&code)?;
            }
            Opcode::RETURNDATASIZE => {
                self.stack.push(word::from_usize(self.return_data.len()))?;
            }
            Opcode::RETURNDATACOPY => {
                let data = std::mem::take(&mut self.return_data);
                let copied = self.copy_to_memory(&data);
                self.return_data = data;
                copied?;
            }
            Opcode::EXTCODEHASH => {
                let address = word::to_address(&self.stack.pop()?);
                self.stack.push(state.code_hash(&address))?;
            }

            // Block
            Opcode::COINBASE => {
                let coinbase = required(env.block.coinbase, "coinbase")?;
                self.stack.push(word::from_address(&coinbase))?;
            }
            Opcode::TIMESTAMP => {
                self.stack.push(required(env.block.timestamp, "timestamp")?)?;
            }
            Opcode::NUMBER => {
                self.stack.push(required(env.block.number, "number")?)?;
            }
            Opcode::DIFFICULTY => {
                self.stack.push(required(env.block.difficulty, "difficulty")?)?;
            }
            Opcode::GASLIMIT => {
                self.stack.push(required(env.block.gas_limit, "gaslimit")?)?;
            }
            Opcode::CHAINID => {
                self.stack.push(required(env.block.chain_id, "chainid")?)?;
            }
            Opcode::SELFBALANCE => {
                let address = env.call.address()?;
                self.stack.push(state.balance(&address))?;
            }
            Opcode::BASEFEE => {
                self.stack.push(required(env.block.base_fee, "basefee")?)?;
            }

            // Stack, memory, storage
            Opcode::POP => {
                self.stack.pop()?;
            }
            Opcode::MLOAD => {
                let offset = self.pop_offset()?;
                let value = self.memory.load(offset)?;
                self.stack.push(value)?;
            }
            Opcode::MSTORE => {
                let offset = self.pop_offset()?;
                let value = self.stack.pop()?;
                self.memory.store(offset, &value)?;
            }
            Opcode::MSTORE8 => {
                let offset = self.pop_offset()?;
                let value = self.stack.pop()?;
                self.memory.store_byte(offset, value[31])?;
            }
            Opcode::SLOAD => {
                let key = self.stack.pop()?;
                self.stack.push(storage.get(&key))?;
            }
            Opcode::SSTORE => {
                if env.call.is_static {
                    return Err(EvmError::StaticCallViolation);
                }
                let [key, value] = self.stack.pop_n()?;
                storage.put(key, value);
            }

            // Control flow
            Opcode::JUMP => {
                let dest = self.stack.pop()?;
                self.pc = self.jump_table.validate(&dest)?;
            }
            Opcode::JUMPI => {
                let [dest, condition] = self.stack.pop_n()?;
                if !word::is_zero(&condition) {
                    self.pc = self.jump_table.validate(&dest)?;
                }
            }
            Opcode::PC => {
                self.stack.push(word::from_usize(pc))?;
            }
            Opcode::MSIZE => {
                self.stack.push(word::from_usize(self.memory.size()))?;
            }
            Opcode::GAS => {
                // Gas is not metered
                self.stack.push(word::MAX)?;
            }
            Opcode::JUMPDEST => {}

            Opcode::PUSH(n) => {
                let n = n as usize;
                let start = self.pc;
                let end = start + n;
                let bytes = self.code.get(start..end).ok_or(EvmError::TruncatedPush(pc))?;
                self.stack.push(word::from_slice_padded(bytes))?;
                self.pc = end;
            }
            Opcode::DUP(n) => self.stack.dup(n as usize)?,
            Opcode::SWAP(n) => self.stack.swap(n as usize)?,

            Opcode::LOG(n) => {
                if env.call.is_static {
                    return Err(EvmError::StaticCallViolation);
                }
                let (offset, size) = self.pop_range()?;
                let mut topics = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    topics.push(H256::from_bytes(self.stack.pop()?));
                }
                let data = self.memory.load_range(offset, size)?;
                self.logs.push(Log {
                    address: env.call.address.unwrap_or_default(),
                    topics,
                    data,
                });
            }

            // System
            Opcode::CREATE => self.create(env)?,
            Opcode::CALL | Opcode::DELEGATECALL | Opcode::STATICCALL => {
                self.call(opcode, env, state)?
            }
            Opcode::RETURN => {
                let (offset, size) = self.pop_range()?;
                self.output = self.memory.load_range(offset, size)?;
                self.stopped = true;
            }
            Opcode::REVERT => {
                let (offset, size) = self.pop_range()?;
                let data = self.memory.load_range(offset, size)?;
                return Err(EvmError::Revert(data));
            }
            Opcode::INVALID => {
                return Err(EvmError::InvalidOpcode(0xFE));
            }
            Opcode::SELFDESTRUCT => self.selfdestruct(env, state)?,
        }

        Ok(())
    }

    fn binary(&mut self, op: fn(&Word, &Word) -> Word) -> EvmResult<()> {
        let [a, b] = self.stack.pop_n()?;
        self.stack.push(op(&a, &b))
    }

    fn ternary(&mut self, op: fn(&Word, &Word, &Word) -> Word) -> EvmResult<()> {
        let [a, b, c] = self.stack.pop_n()?;
        self.stack.push(op(&a, &b, &c))
    }

    fn compare(&mut self, op: fn(&Word, &Word) -> bool) -> EvmResult<()> {
        let [a, b] = self.stack.pop_n()?;
        self.stack.push(word::from_bool(op(&a, &b)))
    }

    /// Pop a memory offset
    pub(crate) fn pop_offset(&mut self) -> EvmResult<usize> {
        word::to_usize(&self.stack.pop()?).ok_or(EvmError::InvalidMemoryAccess)
    }

    /// Pop `offset, size`; the offset is ignored when the size is zero
    pub(crate) fn pop_range(&mut self) -> EvmResult<(usize, usize)> {
        let [offset, size] = self.stack.pop_n()?;
        if word::is_zero(&size) {
            return Ok((0, 0));
        }
        let offset = word::to_usize(&offset).ok_or(EvmError::InvalidMemoryAccess)?;
        let size = word::to_usize(&size).ok_or(EvmError::InvalidMemoryAccess)?;
        Ok((offset, size))
    }

    /// Shared body of the *COPY opcodes: pops `destOffset, offset, size`
    fn copy_to_memory(&mut self, source: &[u8]) -> EvmResult<()> {
        let dest = self.stack.pop()?;
        let offset = word::to_usize(&self.stack.pop()?).unwrap_or(usize::MAX);
        let size = self.stack.pop()?;
        if word::is_zero(&size) {
            return Ok(());
        }
        let dest = word::to_usize(&dest).ok_or(EvmError::InvalidMemoryAccess)?;
        let size = word::to_usize(&size).ok_or(EvmError::InvalidMemoryAccess)?;
        self.memory.store_padded(dest, size, source, offset)
    }
}
