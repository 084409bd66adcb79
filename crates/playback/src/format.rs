//! Source format tags and the session header.
//!
//! Every stored sound begins with a 4-byte header: a 24-bit little-endian
//! payload length followed by a one-byte format code. The code selects both
//! the sample encoding and the source rate relative to the engine's output
//! rate.
//!
//! | Code | Encoding | Source rate |
//! |------|----------|-------------|
//! | 0x01 | u-law    | 1x          |
//! | 0x02 | u-law    | 1/2x        |
//! | 0x03 | u-law    | 1/4x        |
//! | 0x81 | PCM16-LE | 1x          |
//! | 0x82 | PCM16-LE | 1/2x        |
//! | 0x83 | PCM16-LE | 1/4x        |
//!
//! The session keeps the *raw* code byte, not a decoded variant: the header
//! is trusted at `play` time and validated only when the decode step runs,
//! so a bogus header plays out as a silent stop on the first period instead
//! of an error from `play`.

/// Length of the on-flash session header in bytes.
pub const HEADER_LEN: usize = 4;

/// Raw one-byte format tag as stored in the session header.
///
/// Zero means no active session; any other value claims a session, valid or
/// not. Use [`sample_format`][Self::sample_format] to resolve the claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct FormatCode(u8);

impl FormatCode {
    /// The idle tag: no session.
    pub const INACTIVE: Self = Self(0);

    /// Wrap a raw header byte.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// The raw byte.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// True for any nonzero tag, recognized or not.
    #[must_use]
    pub const fn is_active(self) -> bool {
        self.0 != 0
    }

    /// Resolve the tag to a supported format, if it is one.
    #[must_use]
    pub const fn sample_format(self) -> Option<SampleFormat> {
        SampleFormat::from_code(self.0)
    }
}

/// A supported encoding and source-rate combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SampleFormat {
    /// u-law at the output rate.
    UlawFull,
    /// u-law at half the output rate, upsampled 2x.
    UlawHalf,
    /// u-law at a quarter of the output rate, upsampled 4x.
    UlawQuarter,
    /// 16-bit little-endian PCM at the output rate.
    Pcm16Full,
    /// 16-bit little-endian PCM at half the output rate, upsampled 2x.
    Pcm16Half,
    /// 16-bit little-endian PCM at a quarter of the output rate, upsampled 4x.
    Pcm16Quarter,
}

impl SampleFormat {
    /// Resolve a raw header code.
    #[must_use]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0x01 => Some(Self::UlawFull),
            0x02 => Some(Self::UlawHalf),
            0x03 => Some(Self::UlawQuarter),
            0x81 => Some(Self::Pcm16Full),
            0x82 => Some(Self::Pcm16Half),
            0x83 => Some(Self::Pcm16Quarter),
            _ => None,
        }
    }

    /// The header code for this format.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::UlawFull => 0x01,
            Self::UlawHalf => 0x02,
            Self::UlawQuarter => 0x03,
            Self::Pcm16Full => 0x81,
            Self::Pcm16Half => 0x82,
            Self::Pcm16Quarter => 0x83,
        }
    }

    /// Output samples produced per decoded source sample: 1, 2, or 4.
    #[must_use]
    pub const fn upsample_factor(self) -> usize {
        match self {
            Self::UlawFull | Self::Pcm16Full => 1,
            Self::UlawHalf | Self::Pcm16Half => 2,
            Self::UlawQuarter | Self::Pcm16Quarter => 4,
        }
    }

    /// Encoded bytes per source sample: 1 for u-law, 2 for PCM16.
    #[must_use]
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::UlawFull | Self::UlawHalf | Self::UlawQuarter => 1,
            Self::Pcm16Full | Self::Pcm16Half | Self::Pcm16Quarter => 2,
        }
    }

    /// Source bytes consumed to fill a block of `block_samples` outputs.
    // Block capacities are at most a few hundred samples; the product fits
    // u32 with orders of magnitude to spare.
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn bytes_per_block(self, block_samples: usize) -> u32 {
        ((block_samples / self.upsample_factor()) * self.bytes_per_sample()) as u32
    }
}

/// Parsed 4-byte session header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionHeader {
    /// Encoded payload length in bytes (24-bit field).
    pub payload_len: u32,
    /// Raw format tag.
    pub format: FormatCode,
}

impl SessionHeader {
    /// Parse the header bytes as stored on flash.
    #[must_use]
    pub const fn parse(bytes: [u8; HEADER_LEN]) -> Self {
        Self {
            payload_len: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]),
            format: FormatCode::new(bytes[3]),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for format in [
            SampleFormat::UlawFull,
            SampleFormat::UlawHalf,
            SampleFormat::UlawQuarter,
            SampleFormat::Pcm16Full,
            SampleFormat::Pcm16Half,
            SampleFormat::Pcm16Quarter,
        ] {
            assert_eq!(SampleFormat::from_code(format.code()), Some(format));
        }
    }

    #[test]
    fn unknown_codes_do_not_resolve() {
        assert_eq!(SampleFormat::from_code(0x00), None);
        assert_eq!(SampleFormat::from_code(0x04), None);
        assert_eq!(SampleFormat::from_code(0x55), None);
        assert_eq!(SampleFormat::from_code(0x84), None);
    }

    #[test]
    fn consumed_bytes_per_128_sample_block() {
        assert_eq!(SampleFormat::UlawFull.bytes_per_block(128), 128);
        assert_eq!(SampleFormat::UlawHalf.bytes_per_block(128), 64);
        assert_eq!(SampleFormat::UlawQuarter.bytes_per_block(128), 32);
        assert_eq!(SampleFormat::Pcm16Full.bytes_per_block(128), 256);
        assert_eq!(SampleFormat::Pcm16Half.bytes_per_block(128), 128);
        assert_eq!(SampleFormat::Pcm16Quarter.bytes_per_block(128), 64);
    }

    #[test]
    fn header_length_is_24_bit_little_endian() {
        let header = SessionHeader::parse([0x80, 0x00, 0x00, 0x01]);
        assert_eq!(header.payload_len, 128);
        assert_eq!(header.format, FormatCode::new(0x01));

        let header = SessionHeader::parse([0x56, 0x34, 0x12, 0x83]);
        assert_eq!(header.payload_len, 0x0012_3456);
        assert_eq!(header.format.raw(), 0x83);
    }

    #[test]
    fn zero_code_is_inactive() {
        assert!(!FormatCode::INACTIVE.is_active());
        assert!(!FormatCode::new(0).is_active());
        assert!(FormatCode::new(0x55).is_active());
        assert_eq!(FormatCode::new(0x55).sample_format(), None);
    }
}
