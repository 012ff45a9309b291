//! Jump destination analysis

use std::collections::HashSet;

use crate::error::{EvmError, EvmResult};
use crate::opcode::{push_size, Opcode};
use crate::word::{self, Word};

/// Valid `JUMPDEST` offsets of one code object.
///
/// Built by a single forward pass that steps over PUSH immediates, so a
/// `0x5B` byte inside push data is never recorded.
#[derive(Clone, Debug, Default)]
pub struct JumpTable {
    dests: HashSet<usize>,
}

impl JumpTable {
    /// Scan `code` for jump destinations
    pub fn analyze(code: &[u8]) -> Self {
        let mut dests = HashSet::new();
        let mut i = 0;
        while i < code.len() {
            let byte = code[i];
            if byte == Opcode::JUMPDEST_BYTE {
                dests.insert(i);
            }
            i += 1 + push_size(byte);
        }
        Self { dests }
    }

    /// Whether `dest` is a `JUMPDEST` at an instruction boundary
    pub fn is_valid(&self, dest: usize) -> bool {
        self.dests.contains(&dest)
    }

    /// Resolve a popped destination word to a code offset
    pub fn validate(&self, dest: &Word) -> EvmResult<usize> {
        match word::to_usize(dest) {
            Some(pc) if self.is_valid(pc) => Ok(pc),
            Some(pc) => Err(EvmError::InvalidJump(pc)),
            None => Err(EvmError::InvalidJump(usize::MAX)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::from_u64;

    #[test]
    fn test_plain_jumpdest() {
        // PUSH1 4, JUMP, INVALID, JUMPDEST
        let table = JumpTable::analyze(&[0x60, 0x04, 0x56, 0xfe, 0x5b]);
        assert!(table.is_valid(4));
        assert!(!table.is_valid(0));
        assert_eq!(table.validate(&from_u64(4)), Ok(4));
    }

    #[test]
    fn test_jumpdest_inside_push_data() {
        // PUSH1 0x5b, PUSH2 0x5b5b, JUMPDEST
        let code = [0x60, 0x5b, 0x61, 0x5b, 0x5b, 0x5b];
        let table = JumpTable::analyze(&code);
        assert!(!table.is_valid(1));
        assert!(!table.is_valid(3));
        assert!(!table.is_valid(4));
        assert!(table.is_valid(5));
        assert_eq!(table.validate(&from_u64(1)), Err(EvmError::InvalidJump(1)));
    }

    #[test]
    fn test_jumpdest_at_code_start() {
        let table = JumpTable::analyze(&[0x5b, 0x00]);
        assert!(table.is_valid(0));
    }

    #[test]
    fn test_truncated_push_at_end() {
        // PUSH32 with only two immediate bytes; the scan stops cleanly
        let table = JumpTable::analyze(&[0x5b, 0x7f, 0x5b, 0x5b]);
        assert!(table.is_valid(0));
        assert!(!table.is_valid(2));
        assert!(!table.is_valid(3));
    }

    #[test]
    fn test_out_of_range_destinations() {
        let table = JumpTable::analyze(&[0x5b]);
        assert_eq!(table.validate(&from_u64(1)), Err(EvmError::InvalidJump(1)));
        assert_eq!(
            table.validate(&word::MAX),
            Err(EvmError::InvalidJump(usize::MAX))
        );
    }

    #[test]
    fn test_empty_code() {
        let table = JumpTable::analyze(&[]);
        assert!(!table.is_valid(0));
        assert_eq!(table.validate(&word::ZERO), Err(EvmError::InvalidJump(0)));
    }
}
