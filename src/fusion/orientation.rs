//! Discrete orientation classification over averaged coordinates.
//!
//! Coordinates follow the portrait device frame: +x out the right edge,
//! +y out the top edge, +z out the screen. An axis reads positive when it
//! points away from the ground, so a device lying flat face-up reads z near
//! +1 and tilting the left edge down drives x positive.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::fusion::coordinate::Coordinate;

/// Minimum z ordinate for the flat region.
pub const FLAT_Z_THRESHOLD: f32 = 0.85;

/// Minimum in-plane gravity magnitude for the vertical region.
pub const VERTICAL_TILT_THRESHOLD: f32 = 0.92;

/// Discrete device orientation regions
///
/// A closed taxonomy; `Unknown` is the initial state and the classification
/// of non-finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrientationState {
    Unknown,
    Flat,
    TiltedLeft,
    TiltedRight,
    TiltedForward,
    TiltedBack,
    Vertical,
}

impl fmt::Display for OrientationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrientationState::Unknown => write!(f, "Unknown"),
            OrientationState::Flat => write!(f, "Flat"),
            OrientationState::TiltedLeft => write!(f, "TiltedLeft"),
            OrientationState::TiltedRight => write!(f, "TiltedRight"),
            OrientationState::TiltedForward => write!(f, "TiltedForward"),
            OrientationState::TiltedBack => write!(f, "TiltedBack"),
            OrientationState::Vertical => write!(f, "Vertical"),
        }
    }
}

/// Classifies a coordinate into exactly one orientation region.
///
/// Piecewise thresholds, checked in a fixed order so boundaries are
/// unambiguous: a value exactly at a threshold satisfies the `>=` comparison
/// and lands in the region that comparison names. The dominant-axis tie
/// `|x| == |y|` resolves to the roll axis, and an exact zero on the chosen
/// axis resolves to its positive side.
pub fn classify(coordinate: &Coordinate) -> OrientationState {
    if !coordinate.is_finite() {
        return OrientationState::Unknown;
    }

    if coordinate.z >= FLAT_Z_THRESHOLD {
        return OrientationState::Flat;
    }

    let tilt = (coordinate.x * coordinate.x + coordinate.y * coordinate.y).sqrt();
    if tilt >= VERTICAL_TILT_THRESHOLD {
        return OrientationState::Vertical;
    }

    if coordinate.x.abs() >= coordinate.y.abs() {
        if coordinate.x >= 0.0 {
            OrientationState::TiltedLeft
        } else {
            OrientationState::TiltedRight
        }
    } else if coordinate.y >= 0.0 {
        OrientationState::TiltedBack
    } else {
        OrientationState::TiltedForward
    }
}

/// Caches the current orientation between updates so transitions are
/// observable.
///
/// Classification itself is stateless; the machine runs for the pipeline's
/// lifetime, has no terminal state, and may move between any two regions on
/// a single update. No-change updates are not suppressed here; whether they
/// still produce an event is the pipeline's call.
#[derive(Debug)]
pub struct OrientationStateMachine {
    current: OrientationState,
    previous: OrientationState,
}

impl OrientationStateMachine {
    pub fn new() -> Self {
        Self {
            current: OrientationState::Unknown,
            previous: OrientationState::Unknown,
        }
    }

    /// Classifies the coordinate and caches the result as current state.
    pub fn update(&mut self, coordinate: &Coordinate) -> OrientationState {
        let next = classify(coordinate);

        if next != self.current {
            debug!("Orientation transition: {} -> {}", self.current, next);
        }

        self.previous = self.current;
        self.current = next;
        next
    }

    /// The most recently classified orientation.
    pub fn orientation(&self) -> OrientationState {
        self.current
    }

    /// The orientation before the last update.
    pub fn previous(&self) -> OrientationState {
        self.previous
    }

    /// True when the last update changed the cached orientation.
    pub fn transitioned(&self) -> bool {
        self.current != self.previous
    }
}

impl Default for OrientationStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_up_classifies_flat() {
        assert_eq!(
            classify(&Coordinate::new(0.0, 0.0, 1.0)),
            OrientationState::Flat
        );
    }

    #[test]
    fn on_edge_classifies_vertical() {
        assert_eq!(
            classify(&Coordinate::new(0.0, 1.0, 0.05)),
            OrientationState::Vertical
        );
    }

    #[test]
    fn dominant_axis_picks_the_tilt_direction() {
        assert_eq!(
            classify(&Coordinate::new(0.5, 0.1, 0.6)),
            OrientationState::TiltedLeft
        );
        assert_eq!(
            classify(&Coordinate::new(-0.5, 0.1, 0.6)),
            OrientationState::TiltedRight
        );
        assert_eq!(
            classify(&Coordinate::new(0.1, 0.5, 0.6)),
            OrientationState::TiltedBack
        );
        assert_eq!(
            classify(&Coordinate::new(0.1, -0.5, 0.6)),
            OrientationState::TiltedForward
        );
    }

    #[test]
    fn boundary_resolves_to_the_same_side_every_run() {
        // Exactly at the flat threshold: >= puts it in Flat, repeatably
        let boundary = Coordinate::new(0.3, 0.0, FLAT_Z_THRESHOLD);
        for _ in 0..100 {
            assert_eq!(classify(&boundary), OrientationState::Flat);
        }

        // Exactly at the vertical threshold with z below flat
        let vertical = Coordinate::new(VERTICAL_TILT_THRESHOLD, 0.0, 0.0);
        for _ in 0..100 {
            assert_eq!(classify(&vertical), OrientationState::Vertical);
        }
    }

    #[test]
    fn non_finite_coordinate_classifies_unknown() {
        assert_eq!(
            classify(&Coordinate::new(f32::NAN, 0.0, 0.5)),
            OrientationState::Unknown
        );
        assert_eq!(
            classify(&Coordinate::new(0.0, f32::INFINITY, 0.5)),
            OrientationState::Unknown
        );
    }

    #[test]
    fn update_is_deterministic_from_the_same_state() {
        let coordinate = Coordinate::new(0.6, 0.0, 0.4);

        let mut first = OrientationStateMachine::new();
        let mut second = OrientationStateMachine::new();
        assert_eq!(first.update(&coordinate), second.update(&coordinate));
        assert_eq!(first.orientation(), second.orientation());
    }

    #[test]
    fn repeated_update_keeps_state_and_clears_transition() {
        let mut machine = OrientationStateMachine::new();
        let coordinate = Coordinate::new(0.0, 0.0, 1.0);

        machine.update(&coordinate);
        assert!(machine.transitioned());
        assert_eq!(machine.previous(), OrientationState::Unknown);

        machine.update(&coordinate);
        assert!(!machine.transitioned());
        assert_eq!(machine.orientation(), OrientationState::Flat);
    }

    #[test]
    fn any_state_can_reach_any_other() {
        let mut machine = OrientationStateMachine::new();
        machine.update(&Coordinate::new(0.0, 0.0, 1.0));
        assert_eq!(machine.orientation(), OrientationState::Flat);

        machine.update(&Coordinate::new(0.0, 1.0, 0.0));
        assert_eq!(machine.orientation(), OrientationState::Vertical);

        machine.update(&Coordinate::new(0.0, 0.0, 1.0));
        assert_eq!(machine.orientation(), OrientationState::Flat);
    }
}
