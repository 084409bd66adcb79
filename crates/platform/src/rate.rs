//! Output sample rate newtype for engine configuration.
//!
//! The decode engine derives its fixed-point byte-to-millisecond scale
//! factors from the configured output rate at construction time, so the rate
//! is validated once here instead of being trusted at every call site.

use thiserror_no_std::Error;

/// Error returned when a configuration value is out of its valid range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[error("value {value} out of range {min}..={max}")]
pub struct OutOfRangeError {
    /// The value that was out of range.
    pub value: u32,
    /// The inclusive minimum allowed value.
    pub min: u32,
    /// The inclusive maximum allowed value.
    pub max: u32,
}

/// Output sample rate in Hz, validated to the range the block engine drives.
///
/// Wraps a `u32` with the invariant `8_000 <= value <= 192_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct SampleRateHz(u32);

impl SampleRateHz {
    /// Minimum supported output rate: 8 kHz (telephony).
    pub const MIN_HZ: u32 = 8_000;

    /// Maximum supported output rate: 192 kHz.
    pub const MAX_HZ: u32 = 192_000;

    /// Create a `SampleRateHz`, rejecting rates outside 8-192 kHz.
    ///
    /// # Errors
    ///
    /// Returns [`OutOfRangeError`] if `hz < 8_000` or `hz > 192_000`.
    pub fn new(hz: u32) -> Result<Self, OutOfRangeError> {
        if hz < Self::MIN_HZ || hz > Self::MAX_HZ {
            Err(OutOfRangeError {
                value: hz,
                min: Self::MIN_HZ,
                max: Self::MAX_HZ,
            })
        } else {
            Ok(Self(hz))
        }
    }

    /// Return the rate in Hz.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn accepts_cd_rate() {
        assert_eq!(SampleRateHz::new(44_100).unwrap().get(), 44_100);
    }

    #[test]
    fn accepts_range_endpoints() {
        assert!(SampleRateHz::new(SampleRateHz::MIN_HZ).is_ok());
        assert!(SampleRateHz::new(SampleRateHz::MAX_HZ).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(SampleRateHz::new(7_999).is_err());
        assert!(SampleRateHz::new(192_001).is_err());
        assert!(SampleRateHz::new(0).is_err());
    }

    #[test]
    fn error_reports_the_offending_value() {
        let err = SampleRateHz::new(500_000).unwrap_err();
        assert_eq!(err.value, 500_000);
        assert_eq!(err.max, SampleRateHz::MAX_HZ);
    }
}
