//! Fixed-point byte-to-millisecond conversion.
//!
//! Playback time is reported in milliseconds without floating point. For
//! each byte-rate class a 32.32 fixed-point factor is derived once from the
//! configured output rate:
//!
//! ```text
//! factor = round(2^32 * 1000 / byte_rate)      [bytes -> ms]
//! millis = (bytes * factor) >> 32              [64-bit intermediate]
//! ```
//!
//! Four byte-rate classes cover the six formats. Position converts the byte
//! distance actually travelled, so PCM's two-byte samples shift it one class
//! down from u-law at the same source rate; length converts the header's
//! byte count with the per-rate-tier factor shared by both encodings.

use platform::SampleRateHz;

use crate::format::SampleFormat;

/// Byte-to-millisecond factors for one configured output rate.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ByteScales {
    /// Bytes at twice the output sample rate (PCM16 at 1x).
    double: u32,
    /// Bytes at the output sample rate (u-law 1x, PCM16 1/2x).
    full: u32,
    /// Bytes at half the output sample rate (u-law 1/2x, PCM16 1/4x).
    half: u32,
    /// Bytes at a quarter of the output sample rate (u-law 1/4x).
    quarter: u32,
}

/// `round(2^32 * 1000 * num / (rate * den))`.
// The numerator tops out near 1.72e13 (num = 4) and the result fits u32 for
// every rate the SampleRateHz newtype admits (>= 8 kHz).
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn factor(rate_hz: u32, num: u64, den: u64) -> u32 {
    let numerator = (1u64 << 32) * 1000 * num;
    let denominator = u64::from(rate_hz) * den;
    ((numerator + denominator / 2) / denominator) as u32
}

impl ByteScales {
    /// Derive all four factors from the configured output rate.
    pub(crate) fn new(rate: SampleRateHz) -> Self {
        let hz = rate.get();
        Self {
            double: factor(hz, 1, 2),
            full: factor(hz, 1, 1),
            half: factor(hz, 2, 1),
            quarter: factor(hz, 4, 1),
        }
    }

    /// Factor for position reporting: matches the byte distance the cursor
    /// actually travels for this format.
    pub(crate) fn position_factor(self, format: SampleFormat) -> u32 {
        match format {
            SampleFormat::Pcm16Full => self.double,
            SampleFormat::UlawFull | SampleFormat::Pcm16Half => self.full,
            SampleFormat::UlawHalf | SampleFormat::Pcm16Quarter => self.half,
            SampleFormat::UlawQuarter => self.quarter,
        }
    }

    /// Factor for length reporting: per rate tier, shared by both encodings.
    pub(crate) fn length_factor(self, format: SampleFormat) -> u32 {
        match format {
            SampleFormat::UlawFull | SampleFormat::Pcm16Full => self.full,
            SampleFormat::UlawHalf | SampleFormat::Pcm16Half => self.half,
            SampleFormat::UlawQuarter | SampleFormat::Pcm16Quarter => self.quarter,
        }
    }
}

/// Convert a byte count to milliseconds with a 32.32 factor.
// The product of a 24-bit byte count and a 32-bit factor fits u64.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
pub(crate) fn bytes_to_millis(bytes: u32, factor: u32) -> u32 {
    ((u64::from(bytes) * u64::from(factor)) >> 32) as u32
}
