//! Playback session state machine and the periodic decode step.
//!
//! `SamplePlayer` owns one playback session at a time. Two execution
//! contexts touch it: a periodic real-time caller runs [`update`] once per
//! output block period, and any other context may call [`play`], [`stop`],
//! [`position_millis`], or [`length_millis`] at any time, including while an
//! `update` is in flight.
//!
//! All shared session fields live behind a [`critical_section::Mutex`], the
//! portable stand-in for the interrupt-disable window the decode caller's
//! priority would otherwise demand: every multi-field read or write happens
//! inside one short critical section, so neither context can observe a new
//! format tag paired with a stale cursor or vice versa.
//!
//! The decode step itself runs lock-free between two such sections. It
//! snapshots the session, performs the storage transaction and decode with
//! no lock held, then commits the advanced cursor only if the session epoch
//! is unchanged. A `play` or `stop` that lands mid-decode wins: the stale
//! commit is discarded, though the block already decoded from the old
//! session still goes out (stopping never aborts storage I/O already in
//! progress).
//!
//! [`update`]: SamplePlayer::update
//! [`play`]: SamplePlayer::play
//! [`stop`]: SamplePlayer::stop
//! [`position_millis`]: SamplePlayer::position_millis
//! [`length_millis`]: SamplePlayer::length_millis

use core::cell::RefCell;

use critical_section::Mutex;
use platform::{BlockSink, OutputBlock, SampleRateHz, SampleStorage};

use crate::format::{FormatCode, SessionHeader, HEADER_LEN};
use crate::timebase::{bytes_to_millis, ByteScales};

/// Legacy recovery mask for the total length: the low 24 bits of the value
/// stored alongside the session base address.
const LENGTH_RECOVERY_MASK: u32 = 0x00FF_FFFF;

/// One playback session. `code` doubles as the state tag: a zero code means
/// no session is active and every other field is meaningless.
#[derive(Debug, Clone, Copy)]
struct Session {
    /// Bumped by every `play`/`stop` so an in-flight decode can detect that
    /// its snapshot went stale before committing.
    epoch: u32,
    /// Raw format tag from the session header; zero when inactive.
    code: FormatCode,
    /// Address of the first encoded payload byte, fixed for the session.
    base: u32,
    /// Byte offset of the next unread encoded byte, relative to `base`.
    cursor: u32,
    /// Encoded payload bytes not yet consumed.
    remaining: u32,
    /// Last decoded source sample, seeding interpolation in the next block.
    carry: i16,
}

const IDLE: Session = Session {
    epoch: 0,
    code: FormatCode::INACTIVE,
    base: 0,
    cursor: 0,
    remaining: 0,
    carry: 0,
};

/// Streaming sample player decoding from byte-addressable storage.
///
/// Construct once with the engine's output rate, share by reference across
/// contexts (the type is `Sync`), and drive [`update`] from the periodic
/// scheduler.
///
/// [`update`]: SamplePlayer::update
pub struct SamplePlayer {
    session: Mutex<RefCell<Session>>,
    scales: ByteScales,
}

impl SamplePlayer {
    /// Create an idle player for the given output sample rate.
    ///
    /// The byte-to-millisecond scale factors are derived here, once, from
    /// the configured rate.
    #[must_use]
    pub fn new(output_rate: SampleRateHz) -> Self {
        Self {
            session: Mutex::new(RefCell::new(IDLE)),
            scales: ByteScales::new(output_rate),
        }
    }

    /// Start playing the sound stored at `address`.
    ///
    /// Reads the 4-byte session header in its own storage transaction, then
    /// publishes the whole new session in one critical section. Any session
    /// already active is superseded, carry sample included. Cannot fail: a
    /// bogus address yields a bogus header, which plays out as a silent stop
    /// on the first decode step.
    pub fn play<S: SampleStorage>(&self, storage: &mut S, address: u32) {
        storage.begin(address);
        let header = SessionHeader::parse([
            storage.read_byte(),
            storage.read_byte(),
            storage.read_byte(),
            storage.read_byte(),
        ]);
        storage.end();

        critical_section::with(|cs| {
            let mut s = self.session.borrow_ref_mut(cs);
            s.epoch = s.epoch.wrapping_add(1);
            s.code = header.format;
            s.base = address.wrapping_add(HEADER_LEN as u32);
            s.cursor = 0;
            s.remaining = header.payload_len;
            s.carry = 0;
        });
    }

    /// Stop playback. Safe from any context, idempotent, never fails.
    ///
    /// Only prevents future decode steps from acting; a decode step already
    /// past its snapshot finishes its current block.
    pub fn stop(&self) {
        critical_section::with(|cs| {
            let mut s = self.session.borrow_ref_mut(cs);
            s.epoch = s.epoch.wrapping_add(1);
            s.code = FormatCode::INACTIVE;
        });
    }

    /// True while a session is active (its tag need not be recognized).
    pub fn is_playing(&self) -> bool {
        critical_section::with(|cs| self.session.borrow_ref(cs).code.is_active())
    }

    /// Elapsed playback time in milliseconds; 0 when idle.
    pub fn position_millis(&self) -> u32 {
        let (code, cursor) = critical_section::with(|cs| {
            let s = self.session.borrow_ref(cs);
            (s.code, s.cursor)
        });
        match code.sample_format() {
            Some(format) => bytes_to_millis(cursor, self.scales.position_factor(format)),
            None => 0,
        }
    }

    /// Total length of the current sound in milliseconds; 0 when idle.
    ///
    /// The stored layout keeps no separate copy of the header length, so the
    /// total is recovered from the session base address the way the legacy
    /// engine did, and is constant for the session's lifetime.
    pub fn length_millis(&self) -> u32 {
        let (code, base) = critical_section::with(|cs| {
            let s = self.session.borrow_ref(cs);
            (s.code, s.base)
        });
        match code.sample_format() {
            Some(format) => {
                let total = base.wrapping_sub(1) & LENGTH_RECOVERY_MASK;
                bytes_to_millis(total, self.scales.length_factor(format))
            }
            None => 0,
        }
    }

    /// Decode one output block. Call once per block period.
    ///
    /// No-op when idle. Skips the period without side effects when the pool
    /// has no free block. An unrecognized format tag releases the acquired
    /// block untransmitted and stops the session; this is the only failure
    /// path and it is silent.
    pub fn update<S, K>(&self, storage: &mut S, sink: &mut K)
    where
        S: SampleStorage,
        K: BlockSink,
    {
        let snap = critical_section::with(|cs| *self.session.borrow_ref(cs));
        if !snap.code.is_active() {
            return;
        }
        let Some(mut block) = sink.allocate() else {
            // Pool exhausted: drop one block's worth of audio, no retry.
            return;
        };
        let Some(format) = snap.code.sample_format() else {
            sink.release(block);
            critical_section::with(|cs| {
                let mut s = self.session.borrow_ref_mut(cs);
                if s.epoch == snap.epoch {
                    s.code = FormatCode::INACTIVE;
                }
            });
            return;
        };

        let mut carry = snap.carry;
        storage.begin(snap.base.wrapping_add(snap.cursor));
        let consumed = format.decode(storage, &mut carry, block.samples_mut());
        storage.end();

        critical_section::with(|cs| {
            let mut s = self.session.borrow_ref_mut(cs);
            if s.epoch == snap.epoch {
                s.carry = carry;
                s.cursor = s.cursor.wrapping_add(consumed);
                s.remaining = s.remaining.saturating_sub(consumed);
                if s.remaining == 0 {
                    // End of stream: the block decoded just now still goes out.
                    s.code = FormatCode::INACTIVE;
                }
            }
        });

        sink.transmit(&block);
        sink.release(block);
    }
}
