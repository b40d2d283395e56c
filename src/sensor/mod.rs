//! Sensor domain: the reading value type, the sensor port, and its adapters.

pub mod iio;
pub mod reader;
pub mod sim;

pub use reader::SensorReader;

use thiserror::Error;

/// One successful temperature/humidity measurement.
///
/// Both quantities come from the same `measure` call, so a reading either
/// exists with both fields populated or does not exist at all.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reading {
    /// Temperature in degrees Celsius
    pub temperature_c: f32,
    /// Relative humidity in percent
    pub humidity_pct: f32,
}

/// Error type for sensor operations
#[derive(Debug, Error)]
pub enum SensorError {
    /// Transient bus error; DHT-class sensors glitch on tight timing
    #[error("sensor bus i/o failed: {0}")]
    Io(#[from] std::io::Error),
    /// The device answered with something unparseable
    #[error("sensor returned a malformed value: {0:?}")]
    Malformed(String),
}

/// Port for taking one measurement from a temperature/humidity sensor.
///
/// Implementations own the device handle; nothing else touches it.
pub trait Sensor {
    async fn measure(&mut self) -> Result<Reading, SensorError>;
}
