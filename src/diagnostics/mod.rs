//! Timing diagnostics: inter-arrival jitter bookkeeping per channel.
//!
//! Side-channel only; nothing here feeds back into orientation decisions.

pub mod bookkeeper;
pub mod ring;

pub use bookkeeper::{JitterSnapshot, JitterStats, TimingBookKeeper};
pub use ring::DeltaRing;
