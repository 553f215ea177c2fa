//! Error definitions for the delivery module

use thiserror::Error;

/// Failures while handing events to a delivery target
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The delivery target dropped its receiving end
    #[error("Delivery target unavailable: {0}")]
    TargetUnavailable(String),

    /// The stream buffer is full; the event was dropped
    #[error("Delivery channel full: {0}")]
    ChannelFull(String),

    /// Delivery was attempted after the strategy shut down
    #[error("Delivery already shut down: {0}")]
    ShutDown(String),
}
