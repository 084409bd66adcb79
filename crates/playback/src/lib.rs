//! Streaming sample playback from serial flash - u-law/PCM16 decode, 2x/4x
//! upsampling, fixed-point position reporting.
#![cfg_attr(not(test), no_std)]
#![deny(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod decode;
pub mod engine;
pub mod format;
pub mod timebase;
pub mod ulaw;

pub use engine::SamplePlayer;
pub use format::{FormatCode, SampleFormat, SessionHeader, HEADER_LEN};

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use platform::mocks::{MockBlockSink, MockFlash};
    use platform::SampleRateHz;

    use crate::engine::SamplePlayer;

    /// u-law code decoding to sample 0.
    const ULAW_ZERO: u8 = 0xFF;

    fn player() -> SamplePlayer {
        SamplePlayer::new(SampleRateHz::new(44_100).unwrap())
    }

    /// Build a flash image holding one stored sound at `address`: a header
    /// claiming `payload_len` bytes of `code`-encoded data, then `payload`.
    fn flash_with(address: u32, payload_len: u32, code: u8, payload: &[u8]) -> MockFlash {
        let mut image = vec![0u8; address as usize];
        image.extend_from_slice(&payload_len.to_le_bytes()[..3]);
        image.push(code);
        image.extend_from_slice(payload);
        MockFlash::new(&image)
    }

    fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
        samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    /// Session control state machine
    mod control_tests {
        use super::*;

        #[test]
        fn player_starts_idle() {
            let player = player();
            assert!(!player.is_playing());
            assert_eq!(player.position_millis(), 0);
            assert_eq!(player.length_millis(), 0);
        }

        #[test]
        fn play_reads_the_header_and_activates() {
            let player = player();
            let mut flash = flash_with(0, 64, 0x01, &[ULAW_ZERO; 64]);
            player.play(&mut flash, 0);
            assert!(player.is_playing());
            assert_eq!(flash.transactions(), 1);
            assert_eq!(flash.last_transaction_bytes(), 4);
        }

        #[test]
        fn stop_is_idempotent() {
            let player = player();
            let mut flash = flash_with(0, 64, 0x01, &[ULAW_ZERO; 64]);
            player.play(&mut flash, 0);
            player.stop();
            assert!(!player.is_playing());
            player.stop();
            assert!(!player.is_playing());
            assert_eq!(player.position_millis(), 0);
        }

        #[test]
        fn stop_when_idle_is_a_no_op() {
            let player = player();
            player.stop();
            assert!(!player.is_playing());
        }

        #[test]
        fn play_claims_a_session_even_for_an_unrecognized_tag() {
            // The header byte is trusted at play time; the decode step is
            // where an unknown tag falls over.
            let player = player();
            let mut flash = flash_with(0, 16, 0x55, &[0; 16]);
            player.play(&mut flash, 0);
            assert!(player.is_playing());
            assert_eq!(player.position_millis(), 0);
            assert_eq!(player.length_millis(), 0);
        }

        #[test]
        fn play_supersedes_without_leaking_the_carry() {
            let player = player();
            // Sound A decodes a run of 100s, leaving carry = 100 after one
            // block. Sound B starts at a fresh carry of zero, so its first
            // interpolated output must lean on silence, not on sound A.
            let mut image = Vec::new();
            image.extend_from_slice(&32u32.to_le_bytes()[..3]);
            image.push(0x82);
            image.extend_from_slice(&pcm_bytes(&[100; 16]));
            image.resize(64, 0);
            image.extend_from_slice(&32u32.to_le_bytes()[..3]);
            image.push(0x82);
            image.extend_from_slice(&pcm_bytes(&[40; 16]));
            let mut flash = MockFlash::new(&image);
            let mut sink: MockBlockSink<16> = MockBlockSink::new(1);

            player.play(&mut flash, 0);
            player.update(&mut flash, &mut sink);
            assert_eq!(sink.transmitted()[0][15], 100);

            player.play(&mut flash, 64);
            player.update(&mut flash, &mut sink);
            // Midpoint of the fresh zero carry and sound B's first sample.
            assert_eq!(sink.transmitted()[1][0], 20);
            assert_eq!(sink.transmitted()[1][1], 40);
        }

        #[test]
        fn player_is_shareable_across_contexts() {
            fn assert_sync<T: Sync>() {}
            assert_sync::<SamplePlayer>();
        }
    }

    /// Periodic decode step
    mod decode_step_tests {
        use super::*;

        #[test]
        fn one_call_decodes_a_full_ulaw_block_and_ends_the_stream() {
            // Header: length 128, u-law at 1x. One 128-sample block consumes
            // the whole payload in a single decode step.
            let player = player();
            let mut flash = flash_with(0, 128, 0x01, &[ULAW_ZERO; 128]);
            let mut sink: MockBlockSink<128> = MockBlockSink::new(2);

            player.update(&mut flash, &mut sink);
            assert!(sink.transmitted().is_empty(), "idle update must not emit");

            player.play(&mut flash, 0);
            player.update(&mut flash, &mut sink);

            assert_eq!(sink.transmitted().len(), 1);
            assert_eq!(sink.transmitted()[0].len(), 128);
            assert!(sink.transmitted()[0].iter().all(|&s| s == 0));
            assert_eq!(flash.last_transaction_bytes(), 128);
            assert!(!player.is_playing(), "stream ended on the same call");
            assert_eq!(player.position_millis(), 0);
            assert_eq!(sink.outstanding(), 0);
        }

        #[test]
        fn decode_reads_payload_after_the_header_and_advances() {
            let player = player();
            let mut flash = flash_with(0, 256, 0x01, &[ULAW_ZERO; 256]);
            let mut sink: MockBlockSink<128> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            player.update(&mut flash, &mut sink);
            assert_eq!(flash.last_begin_address(), 4);
            player.update(&mut flash, &mut sink);
            assert_eq!(flash.last_begin_address(), 4 + 128);
            assert!(!player.is_playing());
        }

        #[test]
        fn exhausted_pool_skips_the_period_without_touching_the_session() {
            let player = player();
            let mut flash = flash_with(0, 128, 0x01, &[ULAW_ZERO; 128]);
            let mut sink: MockBlockSink<128> = MockBlockSink::exhausted();
            player.play(&mut flash, 0);
            let transactions_after_play = flash.transactions();

            player.update(&mut flash, &mut sink);

            assert!(player.is_playing());
            assert_eq!(player.position_millis(), 0, "no bytes were consumed");
            assert_eq!(flash.transactions(), transactions_after_play);
            assert!(sink.transmitted().is_empty());
        }

        #[test]
        fn unrecognized_tag_releases_the_block_and_stops_silently() {
            let player = player();
            let mut flash = flash_with(0, 16, 0x55, &[0; 16]);
            let mut sink: MockBlockSink<16> = MockBlockSink::new(1);
            player.play(&mut flash, 0);
            let transactions_after_play = flash.transactions();

            player.update(&mut flash, &mut sink);

            assert!(!player.is_playing());
            assert!(sink.transmitted().is_empty());
            assert_eq!(sink.released(), 1, "acquired block went back unused");
            assert_eq!(sink.outstanding(), 0);
            assert_eq!(
                flash.transactions(),
                transactions_after_play,
                "no decode transaction for a tag that cannot decode"
            );
        }

        #[test]
        fn remaining_length_ends_at_exactly_zero() {
            // 32 payload bytes at u-law 1x with 16-sample blocks: two full
            // steps, inactive on the second, nothing on a third.
            let player = player();
            let mut flash = flash_with(0, 32, 0x01, &[ULAW_ZERO; 32]);
            let mut sink: MockBlockSink<16> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            player.update(&mut flash, &mut sink);
            assert!(player.is_playing());
            player.update(&mut flash, &mut sink);
            assert!(!player.is_playing());
            player.update(&mut flash, &mut sink);
            assert_eq!(sink.transmitted().len(), 2);
        }

        #[test]
        fn short_final_block_still_fills_and_ends_the_stream() {
            // 24 payload bytes: the second step consumes past the payload
            // (erased flash reads as u-law silence) and ends the stream.
            let player = player();
            let mut flash = flash_with(0, 24, 0x01, &[ULAW_ZERO; 24]);
            let mut sink: MockBlockSink<16> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            player.update(&mut flash, &mut sink);
            player.update(&mut flash, &mut sink);

            assert!(!player.is_playing());
            assert_eq!(sink.transmitted().len(), 2);
            assert_eq!(sink.transmitted()[1].len(), 16);
        }

        #[test]
        fn upsampled_ramp_stays_monotonic_across_block_boundaries() {
            // A rising PCM ramp at half rate: every emitted sample, midpoints
            // included, must keep rising straight through the block seams.
            let player = player();
            let ramp: Vec<i16> = (1i16..=32).map(|i| i * 2).collect();
            let mut flash = flash_with(0, 64, 0x82, &pcm_bytes(&ramp));
            let mut sink: MockBlockSink<16> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            for _ in 0..4 {
                player.update(&mut flash, &mut sink);
            }

            let stream = sink.transmitted_stream();
            assert_eq!(stream.len(), 64);
            for pair in stream.windows(2) {
                assert!(pair[0] < pair[1], "ramp reversed: {pair:?}");
            }
            assert!(!player.is_playing());
        }
    }

    /// Position and length reporting
    mod timing_tests {
        use super::*;

        #[test]
        fn position_is_monotonic_and_resets_at_end_of_stream() {
            let player = player();
            let mut flash = flash_with(0, 1024, 0x01, &[ULAW_ZERO; 1024]);
            let mut sink: MockBlockSink<128> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            let mut last = player.position_millis();
            assert_eq!(last, 0);
            for _ in 0..7 {
                player.update(&mut flash, &mut sink);
                let now = player.position_millis();
                assert!(now >= last, "{now} < {last}");
                last = now;
            }
            // 896 of 1024 bytes at 44.1 kHz is past the 20 ms mark.
            assert!(last >= 20, "{last}");

            player.update(&mut flash, &mut sink);
            assert!(!player.is_playing());
            assert_eq!(player.position_millis(), 0);
        }

        #[test]
        fn position_resets_after_stop() {
            let player = player();
            let mut flash = flash_with(0, 1024, 0x01, &[ULAW_ZERO; 1024]);
            let mut sink: MockBlockSink<128> = MockBlockSink::new(1);
            player.play(&mut flash, 0);
            player.update(&mut flash, &mut sink);
            player.stop();
            assert_eq!(player.position_millis(), 0);
        }

        #[test]
        fn length_is_constant_while_the_session_lives() {
            let player = player();
            let mut flash = flash_with(0x0100, 512, 0x01, &[ULAW_ZERO; 512]);
            let mut sink: MockBlockSink<128> = MockBlockSink::new(1);
            player.play(&mut flash, 0x0100);

            let length = player.length_millis();
            player.update(&mut flash, &mut sink);
            player.update(&mut flash, &mut sink);
            assert_eq!(player.length_millis(), length);
            assert!(player.is_playing());
        }

        #[test]
        fn length_reports_zero_when_idle() {
            let player = player();
            let mut flash = flash_with(0x0100, 512, 0x01, &[ULAW_ZERO; 512]);
            player.play(&mut flash, 0x0100);
            assert_ne!(player.length_millis(), 0);
            player.stop();
            assert_eq!(player.length_millis(), 0);
        }

        #[test]
        fn position_tracks_the_byte_distance_for_pcm() {
            // PCM at 1x consumes two bytes per output sample; one 128-sample
            // block is 256 bytes but still ~2.9 ms of audio.
            let player = player();
            let samples = [0i16; 512];
            let mut flash = flash_with(0, 1024, 0x81, &pcm_bytes(&samples));
            let mut sink: MockBlockSink<128> = MockBlockSink::new(1);
            player.play(&mut flash, 0);

            player.update(&mut flash, &mut sink);
            let after_one_block = player.position_millis();
            assert!(
                (2..=3).contains(&after_one_block),
                "128 samples at 44.1 kHz is ~2.9 ms, got {after_one_block}"
            );
        }
    }
}
