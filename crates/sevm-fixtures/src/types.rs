//! Type definitions for the JSON fixture format

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Deserializer};
use sevm_evm::{
    Account, BlockContext, CallContext, Environment, TxContext, Word, WorldState,
};
use sevm_primitives::Address;

use crate::error::{FixtureError, FixtureResult};

/// Hex-encoded bytes. The `0x` prefix is optional and the length must be even.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HexBytes(pub Vec<u8>);

impl HexBytes {
    /// Parse a hex string
    pub fn parse(s: &str) -> FixtureResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        Ok(HexBytes(hex::decode(s)?))
    }
}

impl<'de> Deserialize<'de> for HexBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        HexBytes::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Hex-encoded 256-bit quantity, right-aligned. Odd lengths are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HexWord(pub Word);

impl HexWord {
    /// Parse a hex quantity of at most 32 bytes
    pub fn parse(s: &str) -> FixtureResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.is_empty() {
            return Ok(HexWord([0u8; 32]));
        }

        // Pad with leading zero if odd length
        let padded = if s.len() % 2 == 1 {
            format!("0{}", s)
        } else {
            s.to_string()
        };

        let bytes = hex::decode(&padded)?;
        if bytes.len() > 32 {
            return Err(FixtureError::Parse(format!(
                "word too long: {} bytes",
                bytes.len()
            )));
        }
        let mut result = [0u8; 32];
        result[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(HexWord(result))
    }
}

impl<'de> Deserialize<'de> for HexWord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;
        HexWord::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Bytecode with optional assembly listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CodeJson {
    /// Human readable assembly
    #[serde(default)]
    pub asm: Option<String>,
    /// Compiled bytecode
    #[serde(default)]
    pub bin: HexBytes,
}

/// Transaction / call fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TxJson {
    /// Executing account
    pub to: Option<Address>,
    /// Immediate caller
    pub from: Option<Address>,
    /// Transaction origin
    pub origin: Option<Address>,
    /// Gas price
    pub gasprice: Option<HexWord>,
    /// Call value
    pub value: Option<HexWord>,
    /// Call data
    pub data: Option<HexBytes>,
}

/// Block fields
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockJson {
    /// Base fee
    pub basefee: Option<HexWord>,
    /// Coinbase
    pub coinbase: Option<Address>,
    /// Timestamp
    pub timestamp: Option<HexWord>,
    /// Block number
    pub number: Option<HexWord>,
    /// Difficulty
    pub difficulty: Option<HexWord>,
    /// Block gas limit
    pub gaslimit: Option<HexWord>,
    /// Chain ID
    #[serde(alias = "chainId")]
    pub chainid: Option<HexWord>,
}

/// Pre-state account entry
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AccountJson {
    /// Balance
    pub balance: Option<HexWord>,
    /// Code
    pub code: Option<CodeJson>,
}

/// Everything needed to run one fixture
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureInput {
    /// Code to execute
    #[serde(default)]
    pub code: CodeJson,
    /// Transaction fields
    #[serde(default)]
    pub tx: Option<TxJson>,
    /// Block fields
    #[serde(default)]
    pub block: Option<BlockJson>,
    /// Initial accounts keyed by hex address
    #[serde(default)]
    pub state: Option<BTreeMap<String, AccountJson>>,
}

impl FixtureInput {
    /// Split into engine inputs: code, environment and initial state
    pub fn into_parts(self) -> FixtureResult<(Bytes, Environment, WorldState)> {
        let tx = self.tx.unwrap_or_default();
        let block = self.block.unwrap_or_default();

        let call = CallContext {
            address: tx.to,
            caller: tx.from,
            value: tx.value.map(|v| v.0),
            data: tx.data.map(|d| Bytes::from(d.0)).unwrap_or_default(),
            is_static: false,
            depth: 0,
        };
        let block = BlockContext {
            base_fee: block.basefee.map(|v| v.0),
            coinbase: block.coinbase,
            timestamp: block.timestamp.map(|v| v.0),
            number: block.number.map(|v| v.0),
            difficulty: block.difficulty.map(|v| v.0),
            gas_limit: block.gaslimit.map(|v| v.0),
            chain_id: block.chainid.map(|v| v.0),
        };
        let tx = TxContext {
            origin: tx.origin,
            gas_price: tx.gasprice.map(|v| v.0),
        };

        let mut state = WorldState::new();
        for (key, entry) in self.state.unwrap_or_default() {
            let address = Address::from_hex(&key)
                .map_err(|e| FixtureError::Parse(format!("invalid account address {}: {}", key, e)))?;
            let code = entry.code.unwrap_or_default();
            state.insert(
                address,
                Account {
                    balance: entry.balance.map(|v| v.0).unwrap_or_default(),
                    code: Bytes::from(code.bin.0),
                    asm: code.asm,
                },
            );
        }

        let code = Bytes::from(self.code.bin.0);
        Ok((code, Environment::new(call, block, tx), state))
    }
}

/// Expected log entry
#[derive(Debug, Clone, Deserialize)]
pub struct LogJson {
    /// Emitting account
    pub address: Address,
    /// Log payload
    #[serde(default)]
    pub data: HexBytes,
    /// Topics
    #[serde(default)]
    pub topics: Vec<HexWord>,
}

/// Expected outcome. Absent fields are not checked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Expectation {
    /// Final stack, most recent first
    pub stack: Option<Vec<HexWord>>,
    /// Success flag
    pub success: Option<bool>,
    /// Emitted logs
    pub logs: Option<Vec<LogJson>>,
    /// Return data
    #[serde(rename = "return")]
    pub return_data: Option<HexBytes>,
}

/// Single fixture
#[derive(Debug, Clone, Deserialize)]
pub struct Fixture {
    /// Fixture name
    pub name: String,
    /// Hint shown when the fixture fails
    #[serde(default)]
    pub hint: String,
    /// Execution inputs
    #[serde(flatten)]
    pub input: FixtureInput,
    /// Expected outcome
    #[serde(default)]
    pub expect: Expectation,
}

/// Fixture file structure (array of fixtures)
pub type FixtureFile = Vec<Fixture>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_bytes_deserialize() {
        let bytes: HexBytes = serde_json::from_str(r#""0x1234""#).unwrap();
        assert_eq!(bytes.0, vec![0x12, 0x34]);

        let bare: HexBytes = serde_json::from_str(r#""abcd""#).unwrap();
        assert_eq!(bare.0, vec![0xAB, 0xCD]);
    }

    #[test]
    fn test_hex_bytes_rejects_odd_length() {
        assert!(serde_json::from_str::<HexBytes>(r#""0x123""#).is_err());
    }

    #[test]
    fn test_hex_word_odd_length() {
        let value: HexWord = serde_json::from_str(r#""0x1""#).unwrap();
        let mut expected = [0u8; 32];
        expected[31] = 1;
        assert_eq!(value.0, expected);

        let value = HexWord::parse("0x100").unwrap();
        assert_eq!(value.0[30..], [0x01, 0x00]);
    }

    #[test]
    fn test_hex_word_too_long() {
        let long = format!("0x{}", "ff".repeat(33));
        assert!(matches!(HexWord::parse(&long), Err(FixtureError::Parse(_))));
        assert!(HexWord::parse(&format!("0x{}", "ff".repeat(32))).is_ok());
    }

    #[test]
    fn test_chain_id_alias() {
        let block: BlockJson = serde_json::from_str(r#"{"chainId": "0x1"}"#).unwrap();
        assert_eq!(block.chainid.unwrap().0[31], 1);
        let block: BlockJson = serde_json::from_str(r#"{"chainid": "0x2"}"#).unwrap();
        assert_eq!(block.chainid.unwrap().0[31], 2);
    }

    #[test]
    fn test_fixture_into_parts() {
        let json = r#"{
            "name": "env",
            "code": { "asm": "ADDRESS", "bin": "30" },
            "tx": { "to": "0x1000000000000000000000000000000000000aaa", "data": "0xff" },
            "block": { "number": "0x10" },
            "state": {
                "0x1000000000000000000000000000000000000aaa": {
                    "balance": "0x64",
                    "code": { "asm": "STOP", "bin": "00" }
                }
            },
            "expect": { "success": true }
        }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert_eq!(fixture.name, "env");
        assert_eq!(fixture.expect.success, Some(true));

        let (code, env, state) = fixture.input.into_parts().unwrap();
        assert_eq!(code.as_ref(), &[0x30]);

        let to = Address::from_hex("0x1000000000000000000000000000000000000aaa").unwrap();
        assert_eq!(env.call.address, Some(to));
        assert_eq!(env.call.caller, None);
        assert_eq!(env.call.data.as_ref(), &[0xFF]);
        assert_eq!(env.block.number.unwrap()[31], 0x10);
        assert!(env.block.chain_id.is_none());

        let account = state.get(&to).unwrap();
        assert_eq!(account.balance[31], 0x64);
        assert_eq!(account.code.as_ref(), &[0x00]);
        assert_eq!(account.asm.as_deref(), Some("STOP"));
    }

    #[test]
    fn test_invalid_state_address() {
        let json = r#"{ "name": "bad", "code": { "bin": "" }, "state": { "0x12": {} } }"#;
        let fixture: Fixture = serde_json::from_str(json).unwrap();
        assert!(matches!(fixture.input.into_parts(), Err(FixtureError::Parse(_))));
    }
}
