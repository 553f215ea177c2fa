//! Simulated sample source standing in for platform sensor hardware.
//!
//! Generates plausible accelerometer and magnetometer streams at a fixed
//! sampling period and pushes them into the pipeline's intake channel. The
//! fusion core never depends on where samples come from; swapping this for a
//! real driver only requires producing `RawSample` values on the same channel.

use statum::{machine, state};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::sensor::sample::{RawSample, SensorChannel};

/// Standard gravity in m/s^2, the scale of simulated accelerometer output.
const STANDARD_GRAVITY: f32 = 9.81;

// Source settings
#[derive(Clone, Debug)]
pub struct SourceSettings {
    /// Sampling period in milliseconds between generated samples
    pub sampling_period_ms: u64,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            sampling_period_ms: 20, // 50 Hz, a common platform sensor rate
        }
    }
}

// Source errors
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Failed to initialize source: {0}")]
    InitializationError(String),

    #[error("Failed to send sample: {0}")]
    SampleSendError(String),
}

// Define source states using statum's state macro
#[state]
#[derive(Debug, Clone)]
pub enum SourceState {
    Initializing,
    Streaming,
}

#[machine]
#[derive(Debug)]
pub struct SampleSource<S: SourceState> {
    // Which stream this source feeds
    channel: SensorChannel,

    // Source settings
    settings: SourceSettings,

    // Channel for sending samples to the pipeline
    sample_sender: mpsc::Sender<RawSample>,

    // Monotonic tick counter driving the simulated waveform
    ticks: u64,
}

// Implementation for Initializing state
impl SampleSource<Initializing> {
    pub fn create(
        channel: SensorChannel,
        settings: Option<SourceSettings>,
        sample_sender: mpsc::Sender<RawSample>,
    ) -> Result<Self, SourceError> {
        let settings = settings.unwrap_or_default();
        debug!("Creating {} source with settings: {:?}", channel, settings);

        if settings.sampling_period_ms == 0 {
            return Err(SourceError::InitializationError(
                "sampling period must be at least 1 ms".to_string(),
            ));
        }

        Ok(Self::new(channel, settings, sample_sender, 0))
    }

    // Transition to Streaming state
    pub fn initialize(self) -> SampleSource<Streaming> {
        info!(
            "{} source initialized at {} ms period, transitioning to Streaming state",
            self.channel, self.settings.sampling_period_ms
        );
        self.transition()
    }
}

// Implementation for Streaming state
impl SampleSource<Streaming> {
    /// Generates samples until the intake channel closes.
    ///
    /// Closing the receiver is the teardown signal; the source simply stops
    /// producing, it never flushes or retries.
    pub async fn run_stream_loop(mut self) -> Result<(), SourceError> {
        info!("Starting {} stream loop", self.channel);

        let mut interval =
            tokio::time::interval(Duration::from_millis(self.settings.sampling_period_ms));

        loop {
            interval.tick().await;

            let sample = self.next_sample();
            if let Err(e) = self.sample_sender.try_send(sample) {
                match e {
                    mpsc::error::TrySendError::Full(_) => {
                        // Intake congested; drop this sample and keep the period
                        warn!("{} intake full, dropping sample", self.channel);
                    }
                    mpsc::error::TrySendError::Closed(_) => {
                        info!("{} intake closed, stopping source", self.channel);
                        return Ok(());
                    }
                }
            }
        }
    }

    // Produce the next simulated reading for this channel
    fn next_sample(&mut self) -> RawSample {
        self.ticks += 1;
        let t = self.ticks as f32 * self.settings.sampling_period_ms as f32 / 1000.0;

        match self.channel {
            SensorChannel::Accelerometer => {
                // Slow sweep of the gravity vector across the device faces
                let roll = (t * 0.4).sin();
                let pitch = (t * 0.23).sin();
                let x = STANDARD_GRAVITY * roll * 0.7;
                let y = STANDARD_GRAVITY * pitch * 0.5;
                let z = STANDARD_GRAVITY * (1.0 - roll.abs() * 0.8);
                RawSample::new(self.channel, x, y, z)
            }
            SensorChannel::Magnetometer => {
                // Earth-field magnitude with a gentle heading wobble, in uT
                let x = 22.0 * (t * 0.05).cos();
                let y = 5.4 + (t * 0.07).sin();
                let z = -43.0 + (t * 0.11).sin() * 2.0;
                RawSample::new(self.channel, x, y, z)
            }
        }
    }
}

/// Handle for a sample source running in a tokio task
///
/// The task is fire-and-forget: it terminates on its own once the intake
/// channel is closed, so no explicit shutdown signalling is needed.
pub struct SourceHandle {
    channel: SensorChannel,
    task_handle: JoinHandle<Result<(), SourceError>>,
}

impl SourceHandle {
    // Create a new source and spawn it as a tokio task
    pub fn spawn(
        channel: SensorChannel,
        settings: Option<SourceSettings>,
        sample_sender: mpsc::Sender<RawSample>,
    ) -> Result<Self, SourceError> {
        info!("Spawning {} source with settings: {:?}", channel, settings);

        let source = SampleSource::create(channel, settings, sample_sender)?;

        let task_handle = tokio::spawn(async move {
            let streaming = source.initialize();
            streaming.run_stream_loop().await
        });

        info!("{} source successfully started", channel);
        Ok(Self {
            channel,
            task_handle,
        })
    }

    pub fn channel(&self) -> SensorChannel {
        self.channel
    }

    /// Waits for the source task to finish after its intake closed.
    pub async fn join(self) -> Result<(), SourceError> {
        match self.task_handle.await {
            Ok(result) => result,
            Err(e) => Err(SourceError::SampleSendError(format!(
                "source task panicked: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn source_stops_when_intake_closes() {
        let (tx, rx) = mpsc::channel(16);
        let handle = SourceHandle::spawn(
            SensorChannel::Accelerometer,
            Some(SourceSettings {
                sampling_period_ms: 1,
            }),
            tx,
        )
        .expect("spawn source");

        drop(rx);
        handle.join().await.expect("source exits cleanly");
    }

    #[tokio::test]
    async fn source_produces_samples_on_its_channel() {
        let (tx, mut rx) = mpsc::channel(16);
        let _handle = SourceHandle::spawn(
            SensorChannel::Magnetometer,
            Some(SourceSettings {
                sampling_period_ms: 1,
            }),
            tx,
        )
        .expect("spawn source");

        let sample = rx.recv().await.expect("sample arrives");
        assert_eq!(sample.channel, SensorChannel::Magnetometer);
    }

    #[test]
    fn zero_period_is_rejected() {
        let (tx, _rx) = mpsc::channel(1);
        let result = SampleSource::create(
            SensorChannel::Accelerometer,
            Some(SourceSettings {
                sampling_period_ms: 0,
            }),
            tx,
        );
        assert!(matches!(
            result,
            Err(SourceError::InitializationError(_))
        ));
    }
}
