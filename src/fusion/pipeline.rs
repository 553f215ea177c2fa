//! Fusion pipeline engine with statum state machine for lifecycle safety.
//!
//! One engine runs per registration in its own tokio task and owns every
//! piece of mutable pipeline state, so state-machine updates from different
//! sensor channels are serialized by construction: all samples funnel
//! through a single mpsc intake into the single writer.
//!
//! # State Machine
//!
//! ```text
//! Initializing ──► Configured ──► Active ──► Deactivating ──► Deactivated
//!                     │              │            ▲
//!                     └──────────────┘            │
//!                       (configure/activate)  (unregister)
//! ```
//!
//! # Architecture
//!
//! ```text
//! RawSample ──► [Coordinate] ──► [Window avg] ──► [Orientation] ──► BubbleEvent
//!     │                                                                  │
//!     └──► [TimingBookKeeper] ──► JitterSnapshot (watch)          [Delivery Strategy]
//! ```

use chrono::{DateTime, Local};
use statum::{machine, state};
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PipelineSettings;
use crate::delivery::{DeliveryMode, DeliveryStrategy};
use crate::diagnostics::{JitterSnapshot, TimingBookKeeper};
use crate::fusion::aggregator::SampleAggregator;
use crate::fusion::coordinate::CoordinateCalculator;
use crate::fusion::error::FusionError;
use crate::fusion::orientation::OrientationStateMachine;
use crate::fusion::BubbleEvent;
use crate::sensor::{RawSample, SensorChannel};

/// States for the pipeline lifecycle using statum
#[state]
#[derive(Debug, Clone)]
pub enum PipelineState {
    Initializing, // Setting up per-channel stages
    Configured,   // Delivery strategy loaded and initialized
    Active,       // Consuming samples in the main loop
    Deactivating, // Shutting down gracefully
    Deactivated,  // Fully stopped, delivery target released
}

/// Per-channel stage state: private to its channel, no cross-channel sharing
#[derive(Debug)]
struct ChannelStage {
    aggregator: SampleAggregator,
    bookkeeper: TimingBookKeeper,
    last_arrival: Option<DateTime<Local>>,
}

impl ChannelStage {
    fn new(channel: SensorChannel, settings: &PipelineSettings) -> Self {
        Self {
            aggregator: SampleAggregator::new(settings.window_capacity),
            bookkeeper: TimingBookKeeper::new(channel, settings.timing_ring_capacity),
            last_arrival: None,
        }
    }
}

/// Fusion pipeline with compile-time lifecycle safety via statum
///
/// Owns the per-channel stages, the shared orientation state machine and the
/// delivery strategy. Every operation is synchronous and bounded; the only
/// awaiting happens between samples in the run loop.
#[machine]
pub struct FusionPipeline<S: PipelineState> {
    sample_receiver: mpsc::Receiver<RawSample>,
    settings: PipelineSettings,
    stages: HashMap<SensorChannel, ChannelStage>,
    state_machine: OrientationStateMachine,
    delivery: Option<Box<dyn DeliveryStrategy>>,
    jitter_sender: watch::Sender<Option<JitterSnapshot>>,
    name: String,
}

impl<S: PipelineState> FusionPipeline<S> {
    pub fn get_name(&self) -> &str {
        &self.name
    }
}

impl FusionPipeline<Initializing> {
    pub fn create(
        sample_receiver: mpsc::Receiver<RawSample>,
        settings: PipelineSettings,
        jitter_sender: watch::Sender<Option<JitterSnapshot>>,
        name: String,
    ) -> Self {
        info!("Initializing fusion pipeline: {}", name);

        let mut stages = HashMap::new();
        for channel in [SensorChannel::Accelerometer, SensorChannel::Magnetometer] {
            stages.insert(channel, ChannelStage::new(channel, &settings));
        }

        Self::new(
            sample_receiver,
            settings,
            stages,
            OrientationStateMachine::new(),
            None, // delivery
            jitter_sender,
            name,
        )
    }

    /// Configures the pipeline with a delivery strategy.
    ///
    /// Initializes the strategy and transitions to Configured on success.
    pub fn configure(
        mut self,
        mut delivery: Box<dyn DeliveryStrategy>,
    ) -> Result<FusionPipeline<Configured>, FusionError> {
        info!(
            "Configuring pipeline {} with {} delivery",
            self.name,
            delivery.mode()
        );

        match delivery.initialize() {
            Ok(_) => {
                debug!("Delivery strategy initialized successfully");
                self.delivery = Some(delivery);
                Ok(self.transition())
            }
            Err(e) => {
                error!("Failed to initialize delivery strategy: {}", e);
                Err(FusionError::InitializationError(format!(
                    "Failed to initialize delivery strategy: {}",
                    e
                )))
            }
        }
    }
}

impl FusionPipeline<Configured> {
    pub fn activate(self) -> FusionPipeline<Active> {
        info!("Activating fusion pipeline: {}", self.name);
        self.transition()
    }
}

impl FusionPipeline<Active> {
    /// Runs one raw sample through its channel's stages.
    ///
    /// Timing bookkeeping happens first and never affects the primary path.
    /// Returns an event when this sample completed an averaging window.
    fn process_sample(&mut self, sample: RawSample) -> Result<Option<BubbleEvent>, FusionError> {
        let stage = self
            .stages
            .get_mut(&sample.channel)
            .ok_or_else(|| {
                FusionError::ProcessingError(format!("no stage for channel {}", sample.channel))
            })?;

        // Diagnostic side effect: inter-arrival delta into the bookkeeper
        if let Some(previous) = stage.last_arrival {
            let delta_ms = (sample.timestamp - previous).num_milliseconds().max(0) as f64;
            if let Some(snapshot) = stage.bookkeeper.record(delta_ms) {
                info!(
                    "{} jitter: mean {:.2} ms, jitter {:.2} ms over {} deltas",
                    snapshot.channel,
                    snapshot.stats.mean_ms,
                    snapshot.stats.jitter_ms,
                    snapshot.stats.samples
                );
                if self.jitter_sender.send(Some(snapshot)).is_err() {
                    debug!("No diagnostics subscriber, snapshot dropped");
                }
            }
        }
        stage.last_arrival = Some(sample.timestamp);

        let coordinate = CoordinateCalculator::calculate(&sample);

        match stage.aggregator.push(coordinate) {
            Some(averaged) => {
                let orientation = self.state_machine.update(&averaged);
                debug!(
                    "{} window averaged to ({:.3}, {:.3}, {:.3}) -> {}",
                    sample.channel, averaged.x, averaged.y, averaged.z, orientation
                );
                Ok(Some(BubbleEvent::new(orientation, averaged)))
            }
            None => Ok(None),
        }
    }

    /// Hands an event to the delivery strategy.
    fn dispatch(&mut self, event: BubbleEvent) -> Result<(), FusionError> {
        let delivery = match &mut self.delivery {
            Some(d) => d,
            None => {
                return Err(FusionError::NotRegistered(
                    "no delivery strategy available".to_string(),
                ))
            }
        };

        delivery.deliver(event)?;
        Ok(())
    }

    /// Main intake loop with graceful unregistration support.
    ///
    /// Runs until the unregister signal fires or the intake closes. Errors on
    /// individual samples or deliveries are logged and do not stop the loop.
    pub async fn run_until_unregistered(
        mut self,
        mut unregister_rx: oneshot::Receiver<()>,
    ) -> Result<FusionPipeline<Deactivating>, FusionError> {
        info!("Starting sample intake loop for: {}", self.name);

        loop {
            tokio::select! {
                _ = &mut unregister_rx => {
                    info!("Unregister signal received for: {}", self.name);
                    break;
                }

                maybe_sample = self.sample_receiver.recv() => {
                    match maybe_sample {
                        Some(sample) => match self.process_sample(sample) {
                            Ok(Some(event)) => {
                                if let Err(e) = self.dispatch(event) {
                                    warn!("Failed to deliver event: {}", e);
                                }
                            }
                            Ok(None) => {}
                            Err(e) => {
                                error!("Error processing sample: {}", e);
                            }
                        },
                        None => {
                            info!("Sample intake closed for: {}", self.name);
                            break;
                        }
                    }
                }
            }
        }

        info!("Transitioning to Deactivating state: {}", self.name);
        Ok(self.transition())
    }
}

impl FusionPipeline<Deactivating> {
    /// Discards in-flight windows, releases the delivery target and stops.
    pub fn shutdown(mut self) -> FusionPipeline<Deactivated> {
        info!("Shutting down fusion pipeline: {}", self.name);

        for stage in self.stages.values_mut() {
            if !stage.aggregator.is_empty() {
                debug!(
                    "Dropping {} buffered coordinates from a partial window",
                    stage.aggregator.len()
                );
                stage.aggregator.discard();
            }
        }

        if let Some(mut delivery) = self.delivery.take() {
            debug!("Shutting down delivery strategy");
            delivery.shutdown();
        }

        info!("Pipeline shut down successfully: {}", self.name);
        self.transition()
    }
}

impl FusionPipeline<Deactivated> {}

/// Handle for a fusion pipeline running in a tokio task
///
/// Registration spawns the pipeline; unregistration stops intake, discards
/// partial windows and releases the delivery target. Operating the handle
/// outside that span is a usage error and fails fast.
pub struct PipelineHandle {
    pub name: String,

    mode: DeliveryMode,

    sample_sender: Option<mpsc::Sender<RawSample>>,

    task_handle: Option<JoinHandle<Result<(), FusionError>>>,

    unregister_tx: Option<oneshot::Sender<()>>,

    jitter_receiver: watch::Receiver<Option<JitterSnapshot>>,
}

impl PipelineHandle {
    /// Registers a new pipeline with the given delivery strategy.
    ///
    /// Validates settings, spawns the intake loop in a background task and
    /// returns the handle controlling its lifetime.
    pub fn register(
        settings: PipelineSettings,
        delivery: Box<dyn DeliveryStrategy>,
    ) -> Result<Self, FusionError> {
        settings.validate()?;

        let mode = delivery.mode();
        let name = format!("fusion-{}", mode).to_lowercase();
        info!("Registering pipeline {} in {} mode", name, mode);

        let (sample_sender, sample_receiver) = mpsc::channel(settings.intake_buffer);
        let (jitter_sender, jitter_receiver) = watch::channel(None);

        let pipeline = FusionPipeline::create(sample_receiver, settings, jitter_sender, name.clone())
            .configure(delivery)?;
        let active = pipeline.activate();

        let (unregister_tx, unregister_rx) = oneshot::channel();
        let task_name = name.clone();
        let task_handle = tokio::spawn(async move {
            match active.run_until_unregistered(unregister_rx).await {
                Ok(deactivating) => {
                    info!("Pipeline entering deactivating state: {}", task_name);
                    let _ = deactivating.shutdown();
                    Ok(())
                }
                Err(e) => {
                    error!("Error running pipeline: {} - {}", task_name, e);
                    Err(e)
                }
            }
        });

        info!("Pipeline registered: {} ({})", name, mode);
        Ok(Self {
            name,
            mode,
            sample_sender: Some(sample_sender),
            task_handle: Some(task_handle),
            unregister_tx: Some(unregister_tx),
            jitter_receiver,
        })
    }

    /// Sender feeding raw samples into the pipeline intake.
    ///
    /// Fails fast once the pipeline is unregistered.
    pub fn sample_sender(&self) -> Result<mpsc::Sender<RawSample>, FusionError> {
        match &self.sample_sender {
            Some(sender) => Ok(sender.clone()),
            None => Err(FusionError::NotRegistered(format!(
                "pipeline {} is unregistered",
                self.name
            ))),
        }
    }

    /// Receiver for jitter snapshots (the diagnostics sink).
    pub fn jitter_receiver(&self) -> watch::Receiver<Option<JitterSnapshot>> {
        self.jitter_receiver.clone()
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn is_registered(&self) -> bool {
        self.sample_sender.is_some()
    }

    /// Unregisters the pipeline and waits for the task to stop.
    ///
    /// Stops further delivery, drops any in-flight windows and releases the
    /// delivery target. Idempotent: a second call is a no-op.
    pub async fn unregister(&mut self) -> Result<(), FusionError> {
        debug!("Unregistering pipeline: {}", self.name);

        // Close the intake so queued samples stop mattering
        self.sample_sender = None;

        if let Some(tx) = self.unregister_tx.take() {
            if tx.send(()).is_err() {
                warn!("Pipeline task already terminated: {}", self.name);
            }
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => {
                    debug!("Pipeline task completed: {}", self.name);
                    result
                }
                Err(e) => {
                    error!("Pipeline task panicked: {} - {}", self.name, e);
                    Err(FusionError::TaskError(format!(
                        "pipeline task panicked: {}",
                        e
                    )))
                }
            }
        } else {
            debug!("Pipeline already unregistered: {}", self.name);
            Ok(())
        }
    }
}
