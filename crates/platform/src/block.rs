//! Output block pool abstraction.
//!
//! The real-time engine surrounding the decoder owns a pool of fixed-capacity
//! sample blocks. The decoder borrows one block per scheduler period, fills
//! it, queues it to the downstream audio pipeline, and returns its reference
//! to the pool. Pool sizing and block capacity are the engine's concern, not
//! the decoder's.

/// A fixed-capacity buffer of 16-bit output samples.
///
/// Capacity is set by the pool that owns the block and is constant for the
/// lifetime of the pool. The decoder fills every slot on each period, so the
/// capacity must be a multiple of 16 (the widest upsample group: four decoded
/// samples expanded to sixteen outputs).
pub trait OutputBlock {
    /// The block's samples.
    fn samples(&self) -> &[i16];

    /// Mutable access to the block's samples.
    fn samples_mut(&mut self) -> &mut [i16];
}

/// Allocate, transmit, and release output blocks.
///
/// Mirrors the downstream pipeline's reference counting: `transmit` queues
/// the filled samples to consumers, `release` returns the caller's reference
/// to the pool. A caller that allocated a block must release it exactly once,
/// whether or not it was transmitted.
pub trait BlockSink {
    /// Block type handed out by this sink.
    type Block: OutputBlock;

    /// Take a free block from the pool. `None` when the pool is exhausted;
    /// the caller skips the period (one block of audio is dropped silently).
    fn allocate(&mut self) -> Option<Self::Block>;

    /// Queue the filled block's samples to downstream consumers.
    fn transmit(&mut self, block: &Self::Block);

    /// Return the block to the pool.
    fn release(&mut self, block: Self::Block);
}
