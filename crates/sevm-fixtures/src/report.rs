//! Hex encoding of execution results

use std::collections::BTreeMap;

use serde::Serialize;
use sevm_evm::{word, ExecutionResult, Log, Word, WorldState};

/// Minimal `0x`-prefixed hex of a word (`0x0` for zero)
pub fn word_to_hex(value: &Word) -> String {
    format!("0x{:x}", word::to_u256(value))
}

/// Encoded log entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogReport {
    /// Emitting account, `0x` prefixed
    pub address: String,
    /// Payload, hex without prefix
    pub data: String,
    /// Topics as minimal hex
    pub topics: Vec<String>,
}

impl From<&Log> for LogReport {
    fn from(log: &Log) -> Self {
        Self {
            address: log.address.to_hex(),
            data: hex::encode(&log.data),
            topics: log.topics.iter().map(|t| word_to_hex(t.as_bytes())).collect(),
        }
    }
}

/// Encoded account code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeReport {
    /// Assembly listing, if one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asm: Option<String>,
    /// Bytecode, hex without prefix
    pub bin: String,
}

/// Encoded account
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountReport {
    /// Balance as minimal hex
    pub balance: String,
    /// Code
    pub code: CodeReport,
}

/// Hex rendering of an [`ExecutionResult`] and the resulting account table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionReport {
    /// Final stack, most recent first
    pub stack: Vec<String>,
    /// Whether execution succeeded
    pub success: bool,
    /// Emitted logs
    pub logs: Vec<LogReport>,
    /// Return data, hex without prefix
    #[serde(rename = "return")]
    pub return_data: String,
    /// Account table keyed by `0x` address
    pub state: BTreeMap<String, AccountReport>,
}

impl ExecutionReport {
    /// Encode `result` together with the post-execution `state`
    pub fn from_result(result: &ExecutionResult, state: &WorldState) -> Self {
        let state = state
            .iter()
            .map(|(address, account)| {
                let report = AccountReport {
                    balance: word_to_hex(&account.balance),
                    code: CodeReport {
                        asm: account.asm.clone(),
                        bin: hex::encode(&account.code),
                    },
                };
                (address.to_hex(), report)
            })
            .collect();

        Self {
            stack: result.stack.iter().map(word_to_hex).collect(),
            success: result.is_success(),
            logs: result.logs.iter().map(LogReport::from).collect(),
            return_data: hex::encode(&result.output),
            state,
        }
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
