//! Sensor input layer: raw sample types and the sample source.
//!
//! A channel is one physical sensor stream (accelerometer or magnetometer).
//! Sources push `RawSample` values into the pipeline intake; the fusion core
//! assumes delivery is already demultiplexed per channel and never talks to
//! hardware itself.

pub mod sample;
pub mod source;

pub use sample::{RawSample, SensorChannel};
pub use source::{SampleSource, SourceError, SourceHandle, SourceSettings};
