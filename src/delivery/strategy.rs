//! Trait definitions for event delivery strategies.
//!
//! Exactly one strategy is active per pipeline instance, chosen at
//! registration and immutable until unregistration. The pipeline only sees
//! the trait; whether events land in a callback or on an observable stream
//! is decided here, not by a mutable mode flag.

use std::fmt::{self, Display};

use crate::delivery::error::DeliveryError;
use crate::fusion::BubbleEvent;

/// The two delivery shapes a pipeline can be registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryMode {
    /// Push callback invoked on the pipeline task
    Listener,

    /// Observable event stream consumed at the receiver's pace
    Stream,
}

impl Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryMode::Listener => write!(f, "Listener"),
            DeliveryMode::Stream => write!(f, "Stream"),
        }
    }
}

/// Strategy for delivering orientation events to client code
pub trait DeliveryStrategy: Send + 'static {
    /// Hands one event to the target, in emission order
    fn deliver(&mut self, event: BubbleEvent) -> Result<(), DeliveryError>;

    /// Prepares the strategy before the pipeline starts
    fn initialize(&mut self) -> Result<(), DeliveryError>;

    /// Releases the delivery target; subsequent delivery must fail
    fn shutdown(&mut self);

    /// Which delivery shape this strategy implements
    fn mode(&self) -> DeliveryMode;
}
