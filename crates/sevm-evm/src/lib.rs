//! # sevm-evm
//!
//! Execution engine for a 256-bit stack virtual machine.
//!
//! This crate provides:
//! - Word arithmetic modulo 2^256
//! - Operand stack, frame memory and storage scopes
//! - Jump-destination analysis
//! - The interpreter loop and nested CALL / CREATE dispatch
//!
//! Gas is not metered. Resource use is bounded by [`EvmConfig`] instead.
//!
//! ## Example
//!
//! ```
//! use sevm_evm::{word, Environment, Evm, WorldState};
//!
//! // PUSH1 2, PUSH1 3, ADD
//! let code = vec![0x60, 0x02, 0x60, 0x03, 0x01];
//! let mut state = WorldState::new();
//! let result = Evm::default().transact(code, &Environment::default(), &mut state);
//!
//! assert!(result.is_success());
//! assert_eq!(result.stack, vec![word::from_u64(5)]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod word;

mod call;
mod config;
mod context;
mod error;
mod evm;
mod frame;
mod interpreter;
mod jumpdest;
mod memory;
mod opcode;
mod stack;
mod state;
mod storage;

pub use config::{EvmConfig, DEFAULT_MAX_CALL_DEPTH};
pub use context::{BlockContext, CallContext, Environment, TxContext};
pub use error::{EvmError, EvmResult, ExecutionResult, ExitStatus, Log};
pub use evm::Evm;
pub use interpreter::Interpreter;
pub use jumpdest::JumpTable;
pub use memory::{Memory, DEFAULT_MEMORY_LIMIT};
pub use opcode::{push_size, Opcode};
pub use stack::Stack;
pub use state::{Account, WorldState};
pub use storage::Storage;
pub use word::Word;
