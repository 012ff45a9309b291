//! Execution context read by environment opcodes
//!
//! Every externally supplied field is optional. An opcode that reads an
//! absent field fails with [`EvmError::MissingContext`] instead of seeing
//! zero.

use bytes::Bytes;
use sevm_primitives::Address;

use crate::error::{EvmError, EvmResult};
use crate::word::Word;

/// Per-frame call information
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    /// Executing account (ADDRESS)
    pub address: Option<Address>,
    /// Immediate caller (CALLER)
    pub caller: Option<Address>,
    /// Value sent with the call (CALLVALUE)
    pub value: Option<Word>,
    /// Call data
    pub data: Bytes,
    /// Whether state modifications are forbidden
    pub is_static: bool,
    /// Nesting depth, 0 for the top-level frame
    pub depth: usize,
}

impl CallContext {
    /// Create a top-level call context
    pub fn new(address: Address, caller: Address, value: Word, data: impl Into<Bytes>) -> Self {
        Self {
            address: Some(address),
            caller: Some(caller),
            value: Some(value),
            data: data.into(),
            is_static: false,
            depth: 0,
        }
    }

    /// Executing address or an error
    pub fn address(&self) -> EvmResult<Address> {
        self.address.ok_or(EvmError::MissingContext("address"))
    }

    /// Caller address or an error
    pub fn caller(&self) -> EvmResult<Address> {
        self.caller.ok_or(EvmError::MissingContext("caller"))
    }

    /// Call value or an error
    pub fn value(&self) -> EvmResult<Word> {
        self.value.ok_or(EvmError::MissingContext("value"))
    }
}

/// Block environment information
#[derive(Clone, Debug, Default)]
pub struct BlockContext {
    /// Base fee (BASEFEE)
    pub base_fee: Option<Word>,
    /// Block coinbase (COINBASE)
    pub coinbase: Option<Address>,
    /// Block timestamp (TIMESTAMP)
    pub timestamp: Option<Word>,
    /// Block number (NUMBER)
    pub number: Option<Word>,
    /// Difficulty / prevrandao (DIFFICULTY)
    pub difficulty: Option<Word>,
    /// Block gas limit (GASLIMIT)
    pub gas_limit: Option<Word>,
    /// Chain ID (CHAINID)
    pub chain_id: Option<Word>,
}

/// Transaction-wide information
#[derive(Clone, Debug, Default)]
pub struct TxContext {
    /// Transaction origin (ORIGIN)
    pub origin: Option<Address>,
    /// Gas price (GASPRICE)
    pub gas_price: Option<Word>,
}

/// Complete execution environment
#[derive(Clone, Debug, Default)]
pub struct Environment {
    /// Call context
    pub call: CallContext,
    /// Block context
    pub block: BlockContext,
    /// Transaction context
    pub tx: TxContext,
}

impl Environment {
    /// Create new environment
    pub fn new(call: CallContext, block: BlockContext, tx: TxContext) -> Self {
        Self { call, block, tx }
    }

    /// Derive the environment of a nested frame. Block and transaction
    /// context are inherited.
    pub fn nested(&self, call: CallContext) -> Self {
        Self {
            call,
            block: self.block.clone(),
            tx: self.tx.clone(),
        }
    }
}

/// Unwrap an optional block or transaction field
pub(crate) fn required<T: Copy>(field: Option<T>, name: &'static str) -> EvmResult<T> {
    field.ok_or(EvmError::MissingContext(name))
}
