//! Hardware seams for the serial-flash sample player.
//!
//! This crate defines the trait boundaries the decode engine talks through,
//! enabling development and testing without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Real-time engine (scheduler, block pool, I2S/DAC output)
//!         ↓
//! Decode engine (playback crate)
//!         ↓
//! Platform seams (this crate - trait abstractions)
//!         ↓
//! Hardware layer (SPI bus + serial NOR flash)
//! ```
//!
//! # Abstractions
//!
//! - [`SampleStorage`] - sequential byte reads from byte-addressable storage
//! - [`BlockSink`] / [`OutputBlock`] - fixed-capacity sample block pool
//! - [`flash`] - serial NOR flash fast-read transaction framing
//! - [`SampleRateHz`] - validated output sample rate for engine configuration
//!
//! # Features
//!
//! - `std`: expose the [`mocks`] module to downstream host tests
//! - `defmt`: enable defmt logging derives

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::all)]
#![allow(clippy::must_use_candidate)] // accessors on seam types - callers decide
#![allow(clippy::module_name_repetitions)]

// The mocks keep their transmit logs in std collections; pull std back in
// when they are compiled into a no_std build via the `std` feature.
#[cfg(all(not(test), feature = "std"))]
extern crate std;

pub mod block;
pub mod flash;
pub mod rate;
pub mod storage;

#[cfg(any(test, feature = "std"))]
pub mod mocks;

pub use block::{BlockSink, OutputBlock};
pub use rate::{OutOfRangeError, SampleRateHz};
pub use storage::SampleStorage;
