//! The six decode/upsample routines.
//!
//! Each routine streams encoded bytes from an open storage transaction and
//! writes exactly one block of output samples. The three source-rate tiers
//! share two sample readers (u-law table lookup, PCM16-LE reassembly), so
//! the dispatch is the cross product of reader and upsampler.
//!
//! Upsampling is linear interpolation in integer arithmetic. The carry
//! sample threads the last decoded source sample across block boundaries,
//! so the first interpolated outputs of a block lean on the previous block's
//! tail rather than restarting from silence. Right shifts implement the
//! divisions and round toward negative infinity for negative values; stored
//! content was produced against that behavior, so it is kept bit-exact.

use platform::SampleStorage;

use crate::format::SampleFormat;
use crate::ulaw::ULAW_TO_PCM;

impl SampleFormat {
    /// Decode one block: read encoded source bytes from `storage`, write
    /// `out.len()` samples, and return the number of source bytes consumed.
    ///
    /// `carry` holds the last decoded source sample of the previous block on
    /// entry and the last decoded source sample of this block on return. The
    /// 1x tiers never read it but still refresh it.
    pub fn decode<S: SampleStorage>(self, storage: &mut S, carry: &mut i16, out: &mut [i16]) -> u32 {
        match self {
            Self::UlawFull => direct(storage, ulaw_sample, carry, out),
            Self::Pcm16Full => direct(storage, pcm_sample, carry, out),
            Self::UlawHalf => midpoint_2x(storage, ulaw_sample, carry, out),
            Self::Pcm16Half => midpoint_2x(storage, pcm_sample, carry, out),
            Self::UlawQuarter => lerp_4x(storage, ulaw_sample, carry, out),
            Self::Pcm16Quarter => lerp_4x(storage, pcm_sample, carry, out),
        }
        self.bytes_per_block(out.len())
    }
}

/// Decode one u-law byte to a linear sample.
fn ulaw_sample<S: SampleStorage>(storage: &mut S) -> i16 {
    ULAW_TO_PCM[usize::from(storage.read_byte())]
}

/// Reassemble one little-endian 16-bit PCM sample.
fn pcm_sample<S: SampleStorage>(storage: &mut S) -> i16 {
    let lo = storage.read_byte();
    let hi = storage.read_byte();
    i16::from_le_bytes([lo, hi])
}

/// 1x tier: every source sample maps to one output sample.
fn direct<S, F>(storage: &mut S, mut next: F, carry: &mut i16, out: &mut [i16])
where
    S: SampleStorage,
    F: FnMut(&mut S) -> i16,
{
    for slot in out.iter_mut() {
        *slot = next(storage);
    }
    if let Some(last) = out.last() {
        *carry = *last;
    }
}

/// 1/2x tier: each source sample yields the midpoint with its predecessor,
/// then itself.
// Sums of two i16 values widened to i32 cannot overflow, and the averages
// land back inside i16.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn midpoint_2x<S, F>(storage: &mut S, mut next: F, carry: &mut i16, out: &mut [i16])
where
    S: SampleStorage,
    F: FnMut(&mut S) -> i16,
{
    let mut prev = i32::from(*carry);
    for pair in out.chunks_exact_mut(2) {
        let s = i32::from(next(storage));
        pair.copy_from_slice(&[((prev + s) >> 1) as i16, s as i16]);
        prev = s;
    }
    *carry = prev as i16;
}

/// 1/4x tier: each source sample yields three quarter-step interpolants
/// against its predecessor, then itself.
// Widened i16 terms bound the largest sum at 4 * 32767, far inside i32, and
// the weighted averages land back inside i16.
#[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
fn lerp_4x<S, F>(storage: &mut S, mut next: F, carry: &mut i16, out: &mut [i16])
where
    S: SampleStorage,
    F: FnMut(&mut S) -> i16,
{
    let mut prev = i32::from(*carry);
    for quad in out.chunks_exact_mut(4) {
        let s = i32::from(next(storage));
        quad.copy_from_slice(&[
            ((prev * 3 + s) >> 2) as i16,
            ((prev + s) >> 1) as i16,
            ((prev + s * 3) >> 2) as i16,
            s as i16,
        ]);
        prev = s;
    }
    *carry = prev as i16;
}
