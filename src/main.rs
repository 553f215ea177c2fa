use bubblesense::sensor::{SensorChannel, SourceHandle, SourceSettings};
use bubblesense::{PipelineHandle, PipelineSettings, StreamDelivery};
use color_eyre::Result;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    setup()?;

    let settings = match PipelineSettings::load(None) {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Falling back to default settings: {}", e);
            PipelineSettings::default()
        }
    };

    info!(
        "Starting pipeline: window {}, ring {}, period {} ms",
        settings.window_capacity, settings.timing_ring_capacity, settings.sampling_period_ms
    );

    // Register the pipeline with an observable event stream
    let (stream, mut events) = StreamDelivery::channel(100);
    let mut pipeline = PipelineHandle::register(settings.clone(), Box::new(stream))?;

    // One simulated source per sensor channel, both feeding the same intake
    let source_settings = SourceSettings {
        sampling_period_ms: settings.sampling_period_ms,
    };
    let sample_tx = pipeline.sample_sender()?;
    let _accel = SourceHandle::spawn(
        SensorChannel::Accelerometer,
        Some(source_settings.clone()),
        sample_tx.clone(),
    )?;
    let _mag = SourceHandle::spawn(
        SensorChannel::Magnetometer,
        Some(source_settings),
        sample_tx,
    )?;
    info!("Sources running: {}, {}", _accel.channel(), _mag.channel());

    let mut jitter = pipeline.jitter_receiver();

    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                match maybe_event {
                    Some(event) => info!(
                        "Orientation {} at ({:.3}, {:.3}, {:.3})",
                        event.orientation,
                        event.coordinate.x,
                        event.coordinate.y,
                        event.coordinate.z
                    ),
                    None => break,
                }
            }

            changed = jitter.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(snapshot) = *jitter.borrow_and_update() {
                    info!(
                        "{} timing: mean {:.2} ms, jitter {:.2} ms",
                        snapshot.channel, snapshot.stats.mean_ms, snapshot.stats.jitter_ms
                    );
                }
            }

            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl-C received, unregistering pipeline");
                break;
            }
        }
    }

    pipeline.unregister().await?;
    info!("Pipeline unregistered, exiting");
    Ok(())
}

fn setup() -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env();
    Ok(())
}

fn setup_logging_env() {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}
