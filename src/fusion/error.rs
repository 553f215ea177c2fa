//! Error definitions for the fusion module

use thiserror::Error;

use crate::config::ConfigError;
use crate::delivery::DeliveryError;

/// Error types for the fusion pipeline
#[derive(Debug, Error)]
pub enum FusionError {
    /// Invalid pipeline settings
    #[error("Configuration error: {0}")]
    ConfigError(#[from] ConfigError),

    /// Failure while preparing the delivery strategy
    #[error("Initialization error: {0}")]
    InitializationError(String),

    /// Failure on the sample intake or diagnostics channels
    #[error("Channel error: {0}")]
    ChannelError(String),

    /// The pipeline task panicked or could not be joined
    #[error("Task error: {0}")]
    TaskError(String),

    /// Failure while handing an event to the delivery target
    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    /// Usage error: operating the pipeline outside its registered lifetime
    #[error("Pipeline not registered: {0}")]
    NotRegistered(String),

    /// Failure while processing a sample
    #[error("Processing error: {0}")]
    ProcessingError(String),
}
