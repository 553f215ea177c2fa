//! Listener-mode delivery: a push callback invoked per event.

use tracing::{debug, info};

use crate::delivery::error::DeliveryError;
use crate::delivery::strategy::{DeliveryMode, DeliveryStrategy};
use crate::fusion::BubbleEvent;

/// Boxed callback target for listener-mode registration.
///
/// The callback runs synchronously on the pipeline task, so it must stay
/// cheap; heavy consumers should register a stream instead.
pub struct ListenerDelivery {
    callback: Option<Box<dyn FnMut(BubbleEvent) + Send>>,
}

impl ListenerDelivery {
    pub fn new(callback: Box<dyn FnMut(BubbleEvent) + Send>) -> Self {
        Self {
            callback: Some(callback),
        }
    }
}

impl DeliveryStrategy for ListenerDelivery {
    fn deliver(&mut self, event: BubbleEvent) -> Result<(), DeliveryError> {
        match &mut self.callback {
            Some(callback) => {
                debug!("Invoking listener for {} event", event.orientation);
                callback(event);
                Ok(())
            }
            None => Err(DeliveryError::ShutDown(
                "listener already released".to_string(),
            )),
        }
    }

    fn initialize(&mut self) -> Result<(), DeliveryError> {
        info!("Initializing listener delivery");
        Ok(())
    }

    fn shutdown(&mut self) {
        info!("Releasing listener callback");
        self.callback = None;
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Listener
    }
}
