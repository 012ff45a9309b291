//! Opcode decoding

use std::fmt;

/// Instructions understood by the interpreter.
///
/// Families that differ only by an index carry it as a payload: `PUSH(n)`
/// reads `n` immediate bytes (0..=32), `DUP(n)` and `SWAP(n)` address depth
/// `n` (1..=16), `LOG(n)` takes `n` topics (0..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Opcode {
    // Stop and Arithmetic
    STOP,
    ADD,
    MUL,
    SUB,
    DIV,
    SDIV,
    MOD,
    SMOD,
    ADDMOD,
    MULMOD,
    EXP,
    SIGNEXTEND,

    // Comparison & Bitwise Logic
    LT,
    GT,
    SLT,
    SGT,
    EQ,
    ISZERO,
    AND,
    OR,
    XOR,
    NOT,
    BYTE,
    SHL,
    SHR,
    SAR,

    KECCAK256,

    // Environmental Information
    ADDRESS,
    BALANCE,
    ORIGIN,
    CALLER,
    CALLVALUE,
    CALLDATALOAD,
    CALLDATASIZE,
    CALLDATACOPY,
    CODESIZE,
    CODECOPY,
    GASPRICE,
    EXTCODESIZE,
    EXTCODECOPY,
    RETURNDATASIZE,
    RETURNDATACOPY,
    EXTCODEHASH,

    // Block Information
    COINBASE,
    TIMESTAMP,
    NUMBER,
    DIFFICULTY,
    GASLIMIT,
    CHAINID,
    SELFBALANCE,
    BASEFEE,

    // Stack, Memory, Storage and Flow
    POP,
    MLOAD,
    MSTORE,
    MSTORE8,
    SLOAD,
    SSTORE,
    JUMP,
    JUMPI,
    PC,
    MSIZE,
    GAS,
    JUMPDEST,

    PUSH(u8),
    DUP(u8),
    SWAP(u8),
    LOG(u8),

    // System Operations
    CREATE,
    CALL,
    RETURN,
    DELEGATECALL,
    STATICCALL,
    REVERT,
    INVALID,
    SELFDESTRUCT,
}

impl Opcode {
    /// Byte value of `JUMPDEST`
    pub const JUMPDEST_BYTE: u8 = 0x5B;

    /// Decode a byte, `None` for unassigned values
    pub fn from_byte(byte: u8) -> Option<Self> {
        let op = match byte {
            0x00 => Self::STOP,
            0x01 => Self::ADD,
            0x02 => Self::MUL,
            0x03 => Self::SUB,
            0x04 => Self::DIV,
            0x05 => Self::SDIV,
            0x06 => Self::MOD,
            0x07 => Self::SMOD,
            0x08 => Self::ADDMOD,
            0x09 => Self::MULMOD,
            0x0A => Self::EXP,
            0x0B => Self::SIGNEXTEND,
            0x10 => Self::LT,
            0x11 => Self::GT,
            0x12 => Self::SLT,
            0x13 => Self::SGT,
            0x14 => Self::EQ,
            0x15 => Self::ISZERO,
            0x16 => Self::AND,
            0x17 => Self::OR,
            0x18 => Self::XOR,
            0x19 => Self::NOT,
            0x1A => Self::BYTE,
            0x1B => Self::SHL,
            0x1C => Self::SHR,
            0x1D => Self::SAR,
            0x20 => Self::KECCAK256,
            0x30 => Self::ADDRESS,
            0x31 => Self::BALANCE,
            0x32 => Self::ORIGIN,
            0x33 => Self::CALLER,
            0x34 => Self::CALLVALUE,
            0x35 => Self::CALLDATALOAD,
            0x36 => Self::CALLDATASIZE,
            0x37 => Self::CALLDATACOPY,
            0x38 => Self::CODESIZE,
            0x39 => Self::CODECOPY,
            0x3A => Self::GASPRICE,
            0x3B => Self::EXTCODESIZE,
            0x3C => Self::EXTCODECOPY,
            0x3D => Self::RETURNDATASIZE,
            0x3E => Self::RETURNDATACOPY,
            0x3F => Self::EXTCODEHASH,
            0x41 => Self::COINBASE,
            0x42 => Self::TIMESTAMP,
            0x43 => Self::NUMBER,
            0x44 => Self::DIFFICULTY,
            0x45 => Self::GASLIMIT,
            0x46 => Self::CHAINID,
            0x47 => Self::SELFBALANCE,
            0x48 => Self::BASEFEE,
            0x50 => Self::POP,
            0x51 => Self::MLOAD,
            0x52 => Self::MSTORE,
            0x53 => Self::MSTORE8,
            0x54 => Self::SLOAD,
            0x55 => Self::SSTORE,
            0x56 => Self::JUMP,
            0x57 => Self::JUMPI,
            0x58 => Self::PC,
            0x59 => Self::MSIZE,
            0x5A => Self::GAS,
            0x5B => Self::JUMPDEST,
            0x5F..=0x7F => Self::PUSH(byte - 0x5F),
            0x80..=0x8F => Self::DUP(byte - 0x7F),
            0x90..=0x9F => Self::SWAP(byte - 0x8F),
            0xA0..=0xA4 => Self::LOG(byte - 0xA0),
            0xF0 => Self::CREATE,
            0xF1 => Self::CALL,
            0xF3 => Self::RETURN,
            0xF4 => Self::DELEGATECALL,
            0xFA => Self::STATICCALL,
            0xFD => Self::REVERT,
            0xFE => Self::INVALID,
            0xFF => Self::SELFDESTRUCT,
            _ => return None,
        };
        Some(op)
    }

    /// Number of immediate bytes following the opcode
    pub fn immediate_size(self) -> usize {
        match self {
            Self::PUSH(n) => n as usize,
            _ => 0,
        }
    }
}

/// Immediate size of a raw byte, without decoding the whole table
pub fn push_size(byte: u8) -> usize {
    if (0x60..=0x7F).contains(&byte) {
        (byte - 0x5F) as usize
    } else {
        0
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PUSH(n) => write!(f, "PUSH{}", n),
            Self::DUP(n) => write!(f, "DUP{}", n),
            Self::SWAP(n) => write!(f, "SWAP{}", n),
            Self::LOG(n) => write!(f, "LOG{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}
