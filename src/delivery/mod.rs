//! Event delivery: how emitted orientation events reach client code.
//!
//! The pipeline is handed a single `DeliveryStrategy` at registration and
//! never branches on a mode flag afterwards. Two shapes exist: a push
//! callback (listener mode) and a channel-backed observable stream.

pub mod error;
pub mod listener;
pub mod strategy;
pub mod stream;

pub use error::DeliveryError;
pub use listener::ListenerDelivery;
pub use strategy::{DeliveryMode, DeliveryStrategy};
pub use stream::StreamDelivery;
