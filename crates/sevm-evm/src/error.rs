//! EVM error and result types

use sevm_primitives::{Address, H256};
use thiserror::Error;

use crate::word::Word;

/// EVM execution errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvmError {
    /// Stack underflow
    #[error("stack underflow")]
    StackUnderflow,

    /// Stack overflow
    #[error("stack overflow (limit {0})")]
    StackOverflow(usize),

    /// Invalid jump destination
    #[error("invalid jump destination: {0}")]
    InvalidJump(usize),

    /// Invalid opcode
    #[error("invalid opcode: 0x{0:02x}")]
    InvalidOpcode(u8),

    /// PUSH immediate runs past the end of code
    #[error("truncated push data at pc {0}")]
    TruncatedPush(usize),

    /// Offset or size does not fit in memory addressing
    #[error("invalid memory access")]
    InvalidMemoryAccess,

    /// Memory growth beyond the configured limit
    #[error("memory limit exceeded: {0} bytes requested")]
    MemoryLimitExceeded(usize),

    /// Context field required by an opcode was not supplied
    #[error("missing context field: {0}")]
    MissingContext(&'static str),

    /// Write in static context
    #[error("state modification in static context")]
    StaticCallViolation,

    /// Instruction budget exhausted
    #[error("step limit exceeded (limit {0})")]
    StepLimitExceeded(u64),

    /// Revert with data
    #[error("execution reverted")]
    Revert(Vec<u8>),
}

/// Result type for EVM operations
pub type EvmResult<T> = Result<T, EvmError>;

/// Log entry emitted by LOG opcodes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Log {
    /// Contract address that emitted the log
    pub address: Address,
    /// Log topics (0-4)
    pub topics: Vec<H256>,
    /// Log data
    pub data: Vec<u8>,
}

/// How a frame terminated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    /// STOP, RETURN, SELFDESTRUCT or end of code
    Success,
    /// REVERT
    Revert,
    /// Any fatal condition
    Halt(EvmError),
}

/// Outcome of one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Termination tag
    pub status: ExitStatus,
    /// Final operand stack, most recent push first
    pub stack: Vec<Word>,
    /// Logs emitted by this frame and its successful sub-calls
    pub logs: Vec<Log>,
    /// RETURN or REVERT payload
    pub output: Vec<u8>,
}

impl ExecutionResult {
    /// Create a successful result
    pub fn success(stack: Vec<Word>, output: Vec<u8>, logs: Vec<Log>) -> Self {
        Self {
            status: ExitStatus::Success,
            stack,
            logs,
            output,
        }
    }

    /// Create a revert result; logs are kept for traceability
    pub fn revert(stack: Vec<Word>, output: Vec<u8>, logs: Vec<Log>) -> Self {
        Self {
            status: ExitStatus::Revert,
            stack,
            logs,
            output,
        }
    }

    /// Create a halted result
    pub fn halt(error: EvmError) -> Self {
        Self {
            status: ExitStatus::Halt(error),
            stack: Vec::new(),
            logs: Vec::new(),
            output: Vec::new(),
        }
    }

    /// Whether the frame completed successfully
    pub fn is_success(&self) -> bool {
        self.status == ExitStatus::Success
    }

    /// The fatal error, if any
    pub fn error(&self) -> Option<&EvmError> {
        match &self.status {
            ExitStatus::Halt(err) => Some(err),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(format!("{}", EvmError::StackUnderflow), "stack underflow");
        assert_eq!(format!("{}", EvmError::StackOverflow(1024)), "stack overflow (limit 1024)");
        assert_eq!(format!("{}", EvmError::InvalidJump(100)), "invalid jump destination: 100");
        assert_eq!(format!("{}", EvmError::InvalidOpcode(0xFE)), "invalid opcode: 0xfe");
        assert_eq!(format!("{}", EvmError::TruncatedPush(7)), "truncated push data at pc 7");
        assert_eq!(format!("{}", EvmError::MissingContext("origin")), "missing context field: origin");
        assert_eq!(format!("{}", EvmError::StaticCallViolation), "state modification in static context");
        assert_eq!(format!("{}", EvmError::Revert(vec![1])), "execution reverted");
    }

    #[test]
    fn test_result_success() {
        let result = ExecutionResult::success(vec![[1u8; 32]], vec![0xaa], vec![]);
        assert!(result.is_success());
        assert!(result.error().is_none());
        assert_eq!(result.output, vec![0xaa]);
    }

    #[test]
    fn test_result_revert_keeps_logs() {
        let log = Log {
            address: Address::ZERO,
            topics: vec![],
            data: vec![1, 2],
        };
        let result = ExecutionResult::revert(vec![], vec![0xbb], vec![log.clone()]);
        assert!(!result.is_success());
        assert_eq!(result.status, ExitStatus::Revert);
        assert_eq!(result.logs, vec![log]);
        assert!(result.error().is_none());
    }

    #[test]
    fn test_result_halt_is_empty() {
        let result = ExecutionResult::halt(EvmError::InvalidOpcode(0xfe));
        assert!(!result.is_success());
        assert!(result.stack.is_empty());
        assert!(result.output.is_empty());
        assert_eq!(result.error(), Some(&EvmError::InvalidOpcode(0xfe)));
    }
}
