//! Byte-addressable frame memory

use crate::error::{EvmError, EvmResult};
use crate::word::Word;

/// Default cap on memory held by a whole call tree (32 MiB)
pub const DEFAULT_MEMORY_LIMIT: usize = 32 * 1024 * 1024;

/// Frame memory.
///
/// Zero-initialised and growth-only. The length is always a multiple of
/// 32 bytes. Every access grows the buffer to cover the touched range, and a
/// zero-length access touches nothing.
#[derive(Clone, Debug)]
pub struct Memory {
    data: Vec<u8>,
    limit: usize,
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl Memory {
    /// Create new empty memory with the default limit
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_MEMORY_LIMIT)
    }

    /// Create new empty memory that refuses to grow past `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    /// Current size in bytes (multiple of 32)
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Ensure `offset..offset + size` is addressable
    pub fn expand(&mut self, offset: usize, size: usize) -> EvmResult<()> {
        if size == 0 {
            return Ok(());
        }
        let end = offset
            .checked_add(size)
            .ok_or(EvmError::InvalidMemoryAccess)?;
        if end <= self.data.len() {
            return Ok(());
        }
        if end > self.limit {
            return Err(EvmError::MemoryLimitExceeded(end));
        }
        let aligned = end.div_ceil(32) * 32;
        self.data.resize(aligned, 0);
        Ok(())
    }

    /// Load a 32-byte word
    pub fn load(&mut self, offset: usize) -> EvmResult<Word> {
        self.expand(offset, 32)?;
        let mut result = [0u8; 32];
        result.copy_from_slice(&self.data[offset..offset + 32]);
        Ok(result)
    }

    /// Store a 32-byte word
    pub fn store(&mut self, offset: usize, value: &Word) -> EvmResult<()> {
        self.expand(offset, 32)?;
        self.data[offset..offset + 32].copy_from_slice(value);
        Ok(())
    }

    /// Store a single byte
    pub fn store_byte(&mut self, offset: usize, value: u8) -> EvmResult<()> {
        self.expand(offset, 1)?;
        self.data[offset] = value;
        Ok(())
    }

    /// Copy `size` bytes out of memory
    pub fn load_range(&mut self, offset: usize, size: usize) -> EvmResult<Vec<u8>> {
        if size == 0 {
            return Ok(Vec::new());
        }
        self.expand(offset, size)?;
        Ok(self.data[offset..offset + size].to_vec())
    }

    /// Write `data` at `offset`
    pub fn store_slice(&mut self, offset: usize, data: &[u8]) -> EvmResult<()> {
        if data.is_empty() {
            return Ok(());
        }
        self.expand(offset, data.len())?;
        self.data[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }

    /// Write exactly `size` bytes at `offset`, taking them from `source`
    /// starting at `source_offset` and zero-filling whatever lies past the
    /// end of `source`.
    pub fn store_padded(
        &mut self,
        offset: usize,
        size: usize,
        source: &[u8],
        source_offset: usize,
    ) -> EvmResult<()> {
        if size == 0 {
            return Ok(());
        }
        self.expand(offset, size)?;
        let target = &mut self.data[offset..offset + size];
        let available = source.get(source_offset..).unwrap_or(&[]);
        let copied = available.len().min(size);
        target[..copied].copy_from_slice(&available[..copied]);
        target[copied..].fill(0);
        Ok(())
    }

    /// Bytes this memory may still grow by
    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.data.len())
    }
}
