//! roomsense: home climate telemetry agent
//!
//! Samples a temperature/humidity sensor on a fixed cadence and publishes
//! each reading to an MQTT broker (`home/temperature`, `home/humidity`).

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod bus;
mod config;
mod link;
mod report;
mod sensor;
mod status;

use bus::MqttSession;
use config::{Config, SensorDriver};
use report::{CycleTiming, PublishGateway, ReportingLoop};
use sensor::iio::IioSensor;
use sensor::sim::SimulatedSensor;
use sensor::{Sensor, SensorReader};

// === CLI ===

#[derive(Parser)]
#[command(name = "roomsense")]
#[command(about = "Home climate telemetry agent")]
struct Cli {
    /// Path to the config file (defaults to ~/.config/roomsense/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the config file in your editor, creating it from the template
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Config) => run_config_command(cli.config)?,
        None => run_agent(cli.config).await?,
    }

    Ok(())
}

fn config_path(flag: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    flag.or_else(Config::path)
        .context("could not determine config directory")
}

/// Open config file in user's editor
fn run_config_command(flag: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path(flag)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        let template = include_str!("../config.toml.example");
        std::fs::write(&path, template)?;
        println!("Created config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| "nano".to_string());

    println!("Opening {} with {}", path.display(), editor);

    std::process::Command::new(&editor).arg(&path).status()?;

    Ok(())
}

// === Agent ===

async fn run_agent(flag: Option<PathBuf>) -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("starting roomsense agent");

    let path = config_path(flag)?;
    let config = Config::load(&path)?;

    link::wait_for_link(&config.link.probe_addr).await;

    let mut indicator = status::for_led(config.status_led.as_deref());
    indicator.set(true);

    let session = MqttSession::connect(&config.broker)
        .await
        .context("establishing the broker session")?;

    let result = match config.sensor.driver {
        SensorDriver::Iio => {
            run_until_shutdown(IioSensor::new(&config.sensor.device), session).await
        }
        SensorDriver::Simulated => run_until_shutdown(SimulatedSensor::new(), session).await,
    };

    indicator.set(false);
    result
}

/// Drive the reporting loop until Ctrl-C, then release the session.
async fn run_until_shutdown(sensor: impl Sensor, session: MqttSession) -> anyhow::Result<()> {
    let mut agent = ReportingLoop::new(
        SensorReader::new(sensor),
        PublishGateway::new(session),
        CycleTiming::default(),
    );

    tokio::select! {
        _ = agent.run() => unreachable!("reporting loop has no normal exit"),
        signal = tokio::signal::ctrl_c() => {
            signal.context("listening for shutdown signal")?;
            info!("shutdown signal received");
        }
    }

    agent.into_gateway().into_inner().disconnect().await?;
    info!("disconnected from broker");

    Ok(())
}
