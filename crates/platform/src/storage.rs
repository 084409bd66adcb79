//! Storage abstraction for sequential sample reads.

/// Sequential byte-read transactions against byte-addressable storage.
///
/// The decode engine opens one transaction per output block, streams the
/// encoded bytes it needs, and closes the transaction before handing the
/// block downstream. Transactions do not nest; exactly one may be open at
/// a time.
///
/// Reads are infallible by contract. The backing store is a memory-mapped
/// or SPI-attached flash device whose transfers either complete or hang the
/// bus; there is no partial-read failure mode the engine could recover from,
/// so none is modelled. Reads past the end of the device return whatever
/// the bus yields (erased flash reads as `0xFF`).
pub trait SampleStorage {
    /// Open a sequential-read transaction at a byte address.
    fn begin(&mut self, address: u32);

    /// Return the next byte and advance the implicit read cursor.
    fn read_byte(&mut self) -> u8;

    /// Close the transaction, releasing the bus.
    fn end(&mut self);
}
