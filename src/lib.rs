//! BubbleSense - Smoothed device-orientation events from raw motion sensors
//!
//! Turns raw tri-axis accelerometer and magnetometer streams into a
//! discretized orientation signal, delivered either through a push callback
//! or an observable event stream.
//!
//! # Architecture
//!
//! ```text
//! SourceHandle ─[RawSample]→ PipelineHandle ─[BubbleEvent]→ listener / stream
//!  (per channel)              (single task)
//!                                  │
//!                                  └──[JitterSnapshot]→ diagnostics watch
//! ```
//!
//! Per-sample work is synchronous and bounded; channels only buffer between
//! the sensor tasks and the single pipeline task, which serializes updates
//! to the shared orientation state machine.

pub mod config;
pub mod delivery;
pub mod diagnostics;
pub mod fusion;
pub mod sensor;

pub use config::PipelineSettings;
pub use delivery::{DeliveryMode, DeliveryStrategy, ListenerDelivery, StreamDelivery};
pub use diagnostics::{JitterSnapshot, JitterStats};
pub use fusion::{BubbleEvent, FusionError, OrientationState, PipelineHandle};
pub use sensor::{RawSample, SensorChannel, SourceHandle, SourceSettings};
