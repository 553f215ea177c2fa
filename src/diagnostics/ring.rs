//! Bounded ring of inter-arrival deltas with a carried-forward seed.

/// Fixed-capacity buffer that hands out its contents when full.
///
/// After a window is taken, the last element is carried forward as the first
/// element of the next window. Without the seed, the first delta after a
/// restart would measure against nothing and read as zero.
#[derive(Debug)]
pub struct DeltaRing {
    entries: Vec<f64>,
    capacity: usize,
}

impl DeltaRing {
    /// Creates a ring with the given capacity, clamped to at least two so a
    /// seed and one fresh delta always fit.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a delta; returns the full window once capacity is reached.
    ///
    /// The returned window holds exactly `capacity` entries. The ring restarts
    /// seeded with the window's last element.
    pub fn push(&mut self, delta: f64) -> Option<Vec<f64>> {
        self.entries.push(delta);

        if self.entries.len() >= self.capacity {
            let window = std::mem::take(&mut self.entries);
            let seed = *window.last().expect("full window is non-empty");
            self.entries = Vec::with_capacity(self.capacity);
            self.entries.push(seed);
            Some(window)
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_exactly_at_capacity() {
        let mut ring = DeltaRing::new(3);
        assert!(ring.push(1.0).is_none());
        assert!(ring.push(2.0).is_none());

        let window = ring.push(3.0).expect("third push fills the ring");
        assert_eq!(window, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn restarts_seeded_with_the_last_element() {
        let mut ring = DeltaRing::new(3);
        ring.push(1.0);
        ring.push(2.0);
        ring.push(3.0);

        // Seed counts toward the next window, so only two fresh deltas fit
        assert_eq!(ring.len(), 1);
        assert!(ring.push(4.0).is_none());
        let window = ring.push(5.0).expect("seed plus two deltas fill the ring");
        assert_eq!(window, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn capacity_is_clamped_to_two() {
        let ring = DeltaRing::new(0);
        assert_eq!(ring.capacity(), 2);
    }
}
