//! Timing-jitter bookkeeping for one sensor channel.
//!
//! Purely diagnostic, side-channel to the fusion path: the bookkeeper only
//! computes statistics. Surfacing them (logging, broadcast) is the caller's
//! concern, and nothing here may fail regardless of input magnitude.

use serde::Serialize;
use tracing::debug;

use crate::diagnostics::ring::DeltaRing;
use crate::sensor::SensorChannel;

/// Summary of one full window of inter-arrival deltas, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JitterStats {
    /// Number of deltas in the window
    pub samples: usize,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Standard deviation of the window
    pub jitter_ms: f64,
}

impl JitterStats {
    /// Reduces a window of deltas to its summary.
    ///
    /// Defined for non-empty windows; the ring only hands out full ones.
    pub fn calculate(window: &[f64]) -> Self {
        debug_assert!(!window.is_empty(), "stats over empty window");

        let samples = window.len();
        let count = samples as f64;

        let mut sum = 0.0;
        let mut min_ms = f64::MAX;
        let mut max_ms = f64::MIN;
        for &delta in window {
            sum += delta;
            min_ms = min_ms.min(delta);
            max_ms = max_ms.max(delta);
        }
        let mean_ms = sum / count;

        let variance = window
            .iter()
            .map(|&delta| {
                let deviation = delta - mean_ms;
                deviation * deviation
            })
            .sum::<f64>()
            / count;

        Self {
            samples,
            mean_ms,
            min_ms,
            max_ms,
            jitter_ms: variance.sqrt(),
        }
    }
}

/// Jitter summary tagged with the channel it was measured on
#[derive(Debug, Clone, Copy, Serialize)]
pub struct JitterSnapshot {
    pub channel: SensorChannel,
    pub stats: JitterStats,
}

/// Consumes inter-arrival deltas and emits stats each time its ring fills.
#[derive(Debug)]
pub struct TimingBookKeeper {
    channel: SensorChannel,
    ring: DeltaRing,
}

impl TimingBookKeeper {
    pub fn new(channel: SensorChannel, ring_capacity: usize) -> Self {
        Self {
            channel,
            ring: DeltaRing::new(ring_capacity),
        }
    }

    /// Records one delta; returns a snapshot when the ring fills.
    ///
    /// Deltas are non-negative by construction (monotonic timestamps); any
    /// magnitude is accepted.
    pub fn record(&mut self, delta_ms: f64) -> Option<JitterSnapshot> {
        let window = self.ring.push(delta_ms)?;
        let stats = JitterStats::calculate(&window);
        debug!(
            "{} timing window: mean {:.2} ms, min {:.2} ms, max {:.2} ms, jitter {:.2} ms",
            self.channel, stats.mean_ms, stats.min_ms, stats.max_ms, stats.jitter_ms
        );
        Some(JitterSnapshot {
            channel: self.channel,
            stats,
        })
    }

    pub fn channel(&self) -> SensorChannel {
        self.channel
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_zero_deltas_produce_zero_stats() {
        let mut bookkeeper = TimingBookKeeper::new(SensorChannel::Accelerometer, 4);

        let mut snapshot = None;
        for _ in 0..4 {
            snapshot = bookkeeper.record(0.0);
        }

        let snapshot = snapshot.expect("fourth record fills the ring");
        assert_eq!(snapshot.stats.samples, 4);
        assert_eq!(snapshot.stats.mean_ms, 0.0);
        assert_eq!(snapshot.stats.min_ms, 0.0);
        assert_eq!(snapshot.stats.max_ms, 0.0);
        assert_eq!(snapshot.stats.jitter_ms, 0.0);
    }

    #[test]
    fn extreme_outlier_never_fails() {
        let mut bookkeeper = TimingBookKeeper::new(SensorChannel::Magnetometer, 3);
        bookkeeper.record(20.0);
        bookkeeper.record(20.0);
        let snapshot = bookkeeper.record(1.0e12).expect("ring fills");

        assert_eq!(snapshot.channel, SensorChannel::Magnetometer);
        assert_eq!(snapshot.stats.max_ms, 1.0e12);
        assert_eq!(snapshot.stats.min_ms, 20.0);
        assert!(snapshot.stats.jitter_ms.is_finite());
    }

    #[test]
    fn no_stats_before_the_ring_fills() {
        let mut bookkeeper = TimingBookKeeper::new(SensorChannel::Accelerometer, 1000);
        for _ in 0..999 {
            assert!(bookkeeper.record(16.7).is_none());
        }
    }

    #[test]
    fn second_window_starts_from_the_carried_seed() {
        let mut bookkeeper = TimingBookKeeper::new(SensorChannel::Accelerometer, 3);
        bookkeeper.record(10.0);
        bookkeeper.record(10.0);
        assert!(bookkeeper.record(40.0).is_some());

        // Seed 40.0 is already in place; two more deltas complete the window
        assert!(bookkeeper.record(10.0).is_none());
        let snapshot = bookkeeper.record(10.0).expect("window completes");
        assert_eq!(snapshot.stats.mean_ms, 20.0);
        assert_eq!(snapshot.stats.max_ms, 40.0);
    }

    #[test]
    fn stats_calculation_matches_hand_computation() {
        let stats = JitterStats::calculate(&[10.0, 20.0, 30.0]);
        assert_eq!(stats.samples, 3);
        assert_eq!(stats.mean_ms, 20.0);
        assert_eq!(stats.min_ms, 10.0);
        assert_eq!(stats.max_ms, 30.0);
        assert!((stats.jitter_ms - (200.0f64 / 3.0).sqrt()).abs() < 1e-9);
    }
}
