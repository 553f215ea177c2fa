use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical sensor input stream identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorChannel {
    Accelerometer,
    Magnetometer,
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorChannel::Accelerometer => write!(f, "Accelerometer"),
            SensorChannel::Magnetometer => write!(f, "Magnetometer"),
        }
    }
}

// Raw tri-axis reading with precise chrono timestamp
#[derive(Debug, Clone)]
pub struct RawSample {
    pub channel: SensorChannel,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub timestamp: DateTime<Local>,
}

impl RawSample {
    /// Creates a sample stamped with the current local time.
    pub fn new(channel: SensorChannel, x: f32, y: f32, z: f32) -> Self {
        Self {
            channel,
            x,
            y,
            z,
            timestamp: Local::now(),
        }
    }

    /// Creates a sample with an explicit timestamp.
    ///
    /// Timestamps are expected to be monotonic per channel; the timing
    /// bookkeeping clamps negative deltas rather than failing.
    pub fn with_timestamp(
        channel: SensorChannel,
        x: f32,
        y: f32,
        z: f32,
        timestamp: DateTime<Local>,
    ) -> Self {
        Self {
            channel,
            x,
            y,
            z,
            timestamp,
        }
    }
}
