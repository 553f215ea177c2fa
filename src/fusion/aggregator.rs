//! Fixed-size sample windows decoupling arrival rate from decision rate.

use tracing::debug;

use crate::fusion::coordinate::{Coordinate, CoordinateCalculator};

/// Buffers coordinates per channel and reduces full windows to one average.
///
/// Exactly one averaged coordinate is produced per `capacity` pushes; partial
/// windows are never emitted. A window that is mid-fill when the pipeline
/// tears down is discarded, not flushed.
#[derive(Debug)]
pub struct SampleAggregator {
    window: Vec<Coordinate>,
    capacity: usize,
}

impl SampleAggregator {
    /// Creates an aggregator with the given window capacity.
    ///
    /// Capacity is fixed for the aggregator's lifetime and clamped to at
    /// least one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a coordinate; returns the window average once full.
    ///
    /// Reducing clears the window, so the next push starts a fresh one.
    pub fn push(&mut self, coordinate: Coordinate) -> Option<Coordinate> {
        self.window.push(coordinate);

        if self.window.len() >= self.capacity {
            let averaged = CoordinateCalculator::average(&self.window);
            self.window.clear();
            debug!(
                "Window of {} reduced to ({:.3}, {:.3}, {:.3})",
                self.capacity, averaged.x, averaged.y, averaged.z
            );
            Some(averaged)
        } else {
            None
        }
    }

    /// Number of coordinates currently buffered.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops any partially filled window.
    pub fn discard(&mut self) {
        if !self.window.is_empty() {
            debug!("Discarding partial window of {} samples", self.window.len());
            self.window.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fewer_than_capacity_never_emits() {
        let mut aggregator = SampleAggregator::new(20);
        for i in 0..19 {
            let result = aggregator.push(Coordinate::new(i as f32, 0.0, 0.0));
            assert!(result.is_none());
        }
        assert_eq!(aggregator.len(), 19);
    }

    #[test]
    fn full_window_emits_mean_and_clears() {
        let mut aggregator = SampleAggregator::new(3);
        assert!(aggregator.push(Coordinate::new(1.0, 1.0, 1.0)).is_none());
        assert!(aggregator.push(Coordinate::new(2.0, 2.0, 2.0)).is_none());

        let averaged = aggregator
            .push(Coordinate::new(3.0, 3.0, 3.0))
            .expect("third push fills the window");
        assert_eq!(averaged, Coordinate::new(2.0, 2.0, 2.0));
        assert!(aggregator.is_empty());
    }

    #[test]
    fn fourth_push_starts_a_new_window() {
        let mut aggregator = SampleAggregator::new(3);
        aggregator.push(Coordinate::new(1.0, 0.0, 0.0));
        aggregator.push(Coordinate::new(2.0, 0.0, 0.0));
        aggregator.push(Coordinate::new(3.0, 0.0, 0.0));

        assert!(aggregator.push(Coordinate::new(9.0, 0.0, 0.0)).is_none());
        assert_eq!(aggregator.len(), 1);
    }

    #[test]
    fn capacity_one_emits_every_push() {
        let mut aggregator = SampleAggregator::new(1);
        let coordinate = Coordinate::new(0.5, 0.5, 0.5);
        assert_eq!(aggregator.push(coordinate), Some(coordinate));
        assert_eq!(aggregator.push(coordinate), Some(coordinate));
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let aggregator = SampleAggregator::new(0);
        assert_eq!(aggregator.capacity(), 1);
    }

    #[test]
    fn discard_drops_partial_window() {
        let mut aggregator = SampleAggregator::new(4);
        aggregator.push(Coordinate::new(1.0, 0.0, 0.0));
        aggregator.discard();
        assert!(aggregator.is_empty());

        // The next window is unaffected by discarded samples
        aggregator.push(Coordinate::new(4.0, 0.0, 0.0));
        aggregator.push(Coordinate::new(4.0, 0.0, 0.0));
        aggregator.push(Coordinate::new(4.0, 0.0, 0.0));
        let averaged = aggregator.push(Coordinate::new(4.0, 0.0, 0.0)).unwrap();
        assert_eq!(averaged, Coordinate::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn nan_coordinates_are_absorbed_into_the_average() {
        let mut aggregator = SampleAggregator::new(2);
        aggregator.push(Coordinate::new(f32::NAN, 0.0, 0.0));
        let averaged = aggregator.push(Coordinate::new(1.0, 0.0, 0.0)).unwrap();
        assert!(averaged.x.is_nan());
        assert_eq!(averaged.y, 0.0);
    }
}
