//! Serial NOR flash read-transaction framing (W25Q128FV, single-wire SPI).
//!
//! The sample store lives in a 16 MB Winbond W25Q128FV on the SPI bus. A
//! sequential read is one chip-select window: the Fast Read command byte,
//! a 24-bit big-endian address, one dummy byte while the flash prepares its
//! output, then data bytes clocked out for as long as CS stays asserted.
//! The flash auto-increments the address, so one window serves an entire
//! output block's worth of encoded bytes.
//!
//! ```text
//! CS ──┐                                                       ┌──
//!      └── 0x0B │ addr[23:16] │ addr[15:8] │ addr[7:0] │ dummy │ data ...
//! ```
//!
//! # Sources
//!
//! - W25Q128FV datasheet (Winbond, rev. M): §8.2.12 Fast Read (0Bh)
//! - Fast Read requires 8 dummy clocks (one byte) before the first data byte
//!   and is valid up to 104 MHz; plain Read (03h) tops out at 50 MHz.

/// SPI clock for flash reads, in Hz.
///
/// 30 MHz is comfortably inside the W25Q128FV Fast Read limit (104 MHz) and
/// within reach of the host MCU's SPI peripheral dividers. At 30 MHz one
/// byte costs ~267 ns; a 256-byte block read plus command overhead stays
/// well under a 2.9 ms scheduler period.
pub const FLASH_CLOCK_HZ: u32 = 30_000_000;

/// Fast Read command byte (W25Q128FV datasheet §8.2.12).
pub const CMD_FAST_READ: u8 = 0x0B;

/// Dummy bytes clocked between the address and the first data byte.
///
/// Fast Read needs 8 dummy clocks so the flash can pipeline its output at
/// full bus speed.
pub const FAST_READ_DUMMY_BYTES: usize = 1;

/// Addressable span of the 24-bit address phase: 16 MB.
pub const FLASH_ADDR_MASK: u32 = 0x00FF_FFFF;

/// Value returned by erased (never-programmed) flash cells.
pub const ERASED_BYTE: u8 = 0xFF;

/// Build the command frame that opens a Fast Read window at `address`.
///
/// The frame is the exact byte sequence shifted out while CS is asserted,
/// before the first data byte comes back. Address bits above the 24-bit
/// phase are dropped on the wire and are masked here to match.
// Byte lanes of a masked 24-bit value; each shifted lane fits u8.
#[allow(clippy::cast_possible_truncation)]
pub fn fast_read_frame(address: u32) -> [u8; 5] {
    let addr = address & FLASH_ADDR_MASK;
    [
        CMD_FAST_READ,
        (addr >> 16) as u8,
        (addr >> 8) as u8,
        addr as u8,
        0x00,
    ]
}
