//! Stream-mode delivery: an observable event stream backed by a channel.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::delivery::error::DeliveryError;
use crate::delivery::strategy::{DeliveryMode, DeliveryStrategy};
use crate::fusion::BubbleEvent;

/// Channel-backed observable stream of orientation events.
///
/// Events arrive on the returned receiver in emission order. A full buffer
/// drops the event rather than blocking the pipeline task.
pub struct StreamDelivery {
    sender: Option<mpsc::Sender<BubbleEvent>>,
}

impl StreamDelivery {
    /// Creates the strategy together with the receiving end of the stream.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<BubbleEvent>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }
}

impl DeliveryStrategy for StreamDelivery {
    fn deliver(&mut self, event: BubbleEvent) -> Result<(), DeliveryError> {
        let sender = self.sender.as_ref().ok_or_else(|| {
            DeliveryError::ShutDown("stream already released".to_string())
        })?;

        match sender.try_send(event) {
            Ok(_) => {
                debug!("Event placed on stream");
                Ok(())
            }
            Err(mpsc::error::TrySendError::Full(event)) => {
                warn!("Stream buffer full, dropping {} event", event.orientation);
                Err(DeliveryError::ChannelFull(
                    "stream buffer full".to_string(),
                ))
            }
            Err(mpsc::error::TrySendError::Closed(_)) => Err(DeliveryError::TargetUnavailable(
                "stream receiver dropped".to_string(),
            )),
        }
    }

    fn initialize(&mut self) -> Result<(), DeliveryError> {
        info!("Initializing stream delivery");
        match &self.sender {
            Some(_) => Ok(()),
            None => Err(DeliveryError::ShutDown(
                "stream already released".to_string(),
            )),
        }
    }

    fn shutdown(&mut self) {
        info!("Releasing stream sender");
        self.sender = None;
    }

    fn mode(&self) -> DeliveryMode {
        DeliveryMode::Stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::coordinate::Coordinate;
    use crate::fusion::orientation::OrientationState;

    fn event() -> BubbleEvent {
        BubbleEvent::new(OrientationState::Vertical, Coordinate::new(0.0, 1.0, 0.0))
    }

    #[tokio::test]
    async fn delivered_events_arrive_in_order() {
        let (mut delivery, mut receiver) = StreamDelivery::channel(8);
        delivery.initialize().unwrap();

        delivery
            .deliver(BubbleEvent::new(
                OrientationState::Flat,
                Coordinate::new(0.0, 0.0, 1.0),
            ))
            .unwrap();
        delivery.deliver(event()).unwrap();

        assert_eq!(
            receiver.recv().await.unwrap().orientation,
            OrientationState::Flat
        );
        assert_eq!(
            receiver.recv().await.unwrap().orientation,
            OrientationState::Vertical
        );
    }

    #[tokio::test]
    async fn full_buffer_drops_instead_of_blocking() {
        let (mut delivery, _receiver) = StreamDelivery::channel(1);
        delivery.deliver(event()).unwrap();
        assert!(matches!(
            delivery.deliver(event()),
            Err(DeliveryError::ChannelFull(_))
        ));
    }

    #[tokio::test]
    async fn shutdown_closes_the_stream() {
        let (mut delivery, mut receiver) = StreamDelivery::channel(4);
        delivery.shutdown();

        assert!(matches!(
            delivery.deliver(event()),
            Err(DeliveryError::ShutDown(_))
        ));
        // Receiver observes end-of-stream once the sender is released
        assert!(receiver.recv().await.is_none());
    }
}
