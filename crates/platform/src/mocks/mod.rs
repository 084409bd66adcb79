//! Mock implementations for testing
//!
//! This module provides in-memory implementations of the storage and block
//! seams so the decode engine can be exercised on the host. The mocks also
//! record the traffic they see (transaction windows, pool churn, transmitted
//! samples) so tests can assert on the engine's externally visible behavior.

#![cfg(any(test, feature = "std"))]
// Test doubles: bookkeeping counters are small and cannot overflow in any
// realistic test run, and slice bounds are checked before use.
#![allow(clippy::arithmetic_side_effects, clippy::indexing_slicing)]

use crate::block::{BlockSink, OutputBlock};
use crate::flash::ERASED_BYTE;
use crate::storage::SampleStorage;

/// Capacity of a [`MockFlash`] image in bytes.
pub const MOCK_FLASH_CAPACITY: usize = 4096;

/// In-memory flash device with transaction bookkeeping.
///
/// Reads past the end of the programmed image return [`ERASED_BYTE`], the
/// same value real NOR flash yields for never-programmed cells.
pub struct MockFlash {
    image: heapless::Vec<u8, MOCK_FLASH_CAPACITY>,
    cursor: usize,
    open: bool,
    transactions: usize,
    nested_begin: bool,
    reads_in_transaction: usize,
    last_transaction_bytes: usize,
    last_begin_address: u32,
}

impl MockFlash {
    /// Create a mock flash programmed with `image` starting at address 0.
    ///
    /// Bytes beyond [`MOCK_FLASH_CAPACITY`] are dropped.
    pub fn new(image: &[u8]) -> Self {
        let mut v = heapless::Vec::new();
        let take = image.len().min(MOCK_FLASH_CAPACITY);
        let _ = v.extend_from_slice(&image[..take]);
        Self {
            image: v,
            cursor: 0,
            open: false,
            transactions: 0,
            nested_begin: false,
            reads_in_transaction: 0,
            last_transaction_bytes: 0,
            last_begin_address: 0,
        }
    }

    /// Number of begin/end windows opened so far.
    pub fn transactions(&self) -> usize {
        self.transactions
    }

    /// True while a transaction is open.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// True if `begin` was ever called while a transaction was still open.
    pub fn saw_nested_begin(&self) -> bool {
        self.nested_begin
    }

    /// Bytes read during the most recently closed transaction.
    pub fn last_transaction_bytes(&self) -> usize {
        self.last_transaction_bytes
    }

    /// Address passed to the most recent `begin`.
    pub fn last_begin_address(&self) -> u32 {
        self.last_begin_address
    }
}

impl SampleStorage for MockFlash {
    fn begin(&mut self, address: u32) {
        if self.open {
            self.nested_begin = true;
        }
        self.open = true;
        self.transactions += 1;
        self.reads_in_transaction = 0;
        self.last_begin_address = address;
        self.cursor = address as usize;
    }

    fn read_byte(&mut self) -> u8 {
        let byte = self.image.get(self.cursor).copied().unwrap_or(ERASED_BYTE);
        self.cursor += 1;
        self.reads_in_transaction += 1;
        byte
    }

    fn end(&mut self) {
        self.open = false;
        self.last_transaction_bytes = self.reads_in_transaction;
    }
}

/// A pool block handed out by [`MockBlockSink`].
pub struct MockBlock<const N: usize> {
    samples: [i16; N],
}

impl<const N: usize> OutputBlock for MockBlock<N> {
    fn samples(&self) -> &[i16] {
        &self.samples
    }

    fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }
}

/// Bounded block pool that logs every transmitted block.
///
/// `N` is the block capacity in samples; the default matches the reference
/// engine's 128-sample blocks.
pub struct MockBlockSink<const N: usize = 128> {
    free: usize,
    allocated: usize,
    released: usize,
    transmitted: std::vec::Vec<std::vec::Vec<i16>>,
}

impl<const N: usize> MockBlockSink<N> {
    /// Create a sink with `pool` free blocks.
    pub fn new(pool: usize) -> Self {
        Self {
            free: pool,
            allocated: 0,
            released: 0,
            transmitted: std::vec::Vec::new(),
        }
    }

    /// Create a sink whose pool is already exhausted.
    pub fn exhausted() -> Self {
        Self::new(0)
    }

    /// Sample copies of every transmitted block, in transmit order.
    pub fn transmitted(&self) -> &[std::vec::Vec<i16>] {
        &self.transmitted
    }

    /// All transmitted samples flattened into one stream.
    pub fn transmitted_stream(&self) -> std::vec::Vec<i16> {
        self.transmitted.iter().flatten().copied().collect()
    }

    /// Blocks released back to the pool so far.
    pub fn released(&self) -> usize {
        self.released
    }

    /// Blocks currently held by a caller (allocated but not yet released).
    pub fn outstanding(&self) -> usize {
        self.allocated - self.released
    }
}

impl<const N: usize> BlockSink for MockBlockSink<N> {
    type Block = MockBlock<N>;

    fn allocate(&mut self) -> Option<Self::Block> {
        if self.free == 0 {
            return None;
        }
        self.free -= 1;
        self.allocated += 1;
        Some(MockBlock { samples: [0; N] })
    }

    fn transmit(&mut self, block: &Self::Block) {
        self.transmitted.push(block.samples().to_vec());
    }

    fn release(&mut self, _block: Self::Block) {
        self.free += 1;
        self.released += 1;
    }
}
