use anyhow::{Context, Result};
use clap::Parser;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use std::fs::File;
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tokio::{signal, time::sleep};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use thetford_lib::constants::{
    DEFAULT_POLL_INTERVAL_SECS, LIN_BAUDRATE, SEQUENCE_FRAME_SPACING_MS, STATUS_FRAME_ID, WAKEUP_FRAME_ID,
    WAKEUP_SETTLE_MS,
};
use thetford_lib::mqtt::{MqttPublisher, MqttSettings};
use thetford_lib::usblini::ChecksumMode;
use thetford_lib::{BridgeConfig, Dispatcher, Model, SampleLimit, UsbLini, source};

/// Retrieve status from a Thetford N4000/T2000 series refrigerator over
/// USBlini and publish it to MQTT.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Polling interval in seconds.
    #[arg(short, long, default_value_t = DEFAULT_POLL_INTERVAL_SECS)]
    interval: u64,
    /// MQTT broker host. Without it, frames are only logged.
    #[arg(short = 'm', long)]
    mqtt_host: Option<String>,
    /// MQTT broker port.
    #[arg(short = 'p', long, default_value_t = 1883)]
    mqtt_port: u16,
    /// MQTT user name.
    #[arg(short = 'u', long, default_value = "")]
    mqtt_user: String,
    /// MQTT password.
    #[arg(short = 'P', long, default_value = "")]
    mqtt_password: String,
    /// Base MQTT topic; each reading goes to <topic>/<title>.
    #[arg(short = 'T', long, default_value = "n4000")]
    topic: String,
    /// Fridge model (N4000 or T2000).
    #[arg(short = 'M', long, default_value_t = Model::N4000)]
    model: Model,
    /// Stop after this many status frames, 0 runs until Ctrl+C.
    #[arg(short, long, default_value_t = 0)]
    count: u64,
    /// Optional path to a file to write logs to, in addition to the console.
    #[arg(short, long)]
    log_file: Option<PathBuf>,
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,
}

fn setup_logging(log_file_path: Option<PathBuf>, verbosity: &Verbosity<InfoLevel>) -> Result<Option<WorkerGuard>> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false)
        .with_thread_ids(false);

    let (file_layer, guard) = if let Some(ref path) = log_file_path {
        let log_file = File::create(path).with_context(|| format!("Failed to create log file at: {:?}", path))?;
        let (non_blocking_writer, guard) = tracing_appender::non_blocking(log_file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking_writer)
            .with_ansi(false)
            .with_target(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let filter = EnvFilter::builder()
        .with_default_directive(verbosity.tracing_level_filter().into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_file_path {
        info!("Logging to file: {:?}", path);
    }

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let guard = setup_logging(cli.log_file.clone(), &cli.verbose)?;

    if let Err(e) = run(cli).await {
        error!("Application failed: {:?}", e);
        // flush the file writer, process::exit skips destructors
        drop(guard);
        process::exit(1);
    }

    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let config = BridgeConfig::new(cli.model, cli.topic)
        .with_sample_limit(SampleLimit::new(cli.count))
        .with_interval(Duration::from_secs(cli.interval));
    let interval_ms = config.interval_ms()?;

    let publisher = match cli.mqtt_host.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => {
            let settings =
                MqttSettings::new(host, cli.mqtt_port).with_credentials(&cli.mqtt_user, &cli.mqtt_password);
            info!("Publishing under topic \"{}\"", config.base_topic);
            Some(MqttPublisher::connect(&settings))
        }
        _ => {
            info!("No MQTT host given, logging frames to the console only.");
            None
        }
    };

    info!(model = %config.model, "Decoding status frames");
    let mut dispatcher = config.dispatcher(publisher);
    let outcome = poll_adapter(&config, interval_ms, &mut dispatcher).await;
    info!("Processed {} status frames.", dispatcher.frames_accepted());

    if let Some(publisher) = dispatcher.into_publisher() {
        if let Err(e) = publisher.disconnect().await {
            warn!("Failed to disconnect from MQTT broker: {}", e);
        }
    }

    outcome
}

/// Brings the adapter up, polls until the sample limit or Ctrl+C, then
/// stops the master sequence.
async fn poll_adapter(
    config: &BridgeConfig,
    interval_ms: u32,
    dispatcher: &mut Dispatcher<MqttPublisher>,
) -> Result<()> {
    let mut adapter = UsbLini::open_with_retry().await;
    perform_startup_sequence(&adapter, interval_ms).await?;

    let outcome = tokio::select! {
        res = source::run(&mut adapter, dispatcher, config.sample_limit) => res.map(|_| ()),
        _ = signal::ctrl_c() => {
            info!("Ctrl+C received, shutting down gracefully.");
            Ok(())
        }
    };

    adapter.close().await.context("Failed to stop the master sequence")?;
    outcome.context("Frame polling failed")
}

async fn perform_startup_sequence(adapter: &UsbLini, interval_ms: u32) -> Result<()> {
    adapter
        .set_baudrate(LIN_BAUDRATE)
        .await
        .context("Failed to set LIN baud rate")?;

    info!("Sending wake-up frame");
    adapter
        .master_write(WAKEUP_FRAME_ID, ChecksumMode::None, &[])
        .await
        .context("Failed to send wake-up frame")?;
    sleep(Duration::from_millis(WAKEUP_SETTLE_MS)).await;

    adapter
        .master_set_sequence(interval_ms, SEQUENCE_FRAME_SPACING_MS, &[STATUS_FRAME_ID])
        .await
        .context("Failed to install master sequence")?;
    Ok(())
}
