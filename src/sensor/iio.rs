//! Linux IIO sysfs adapter for DHT-class temperature/humidity sensors.
//!
//! The kernel driver exposes milli-degree and milli-percent attributes in
//! the device directory. Reads fail with EIO when the one-wire timing
//! slips; that is the transient class the reader's retry absorbs.

use std::path::PathBuf;

use super::{Reading, Sensor, SensorError};

const TEMP_ATTR: &str = "in_temp_input";
const HUMIDITY_ATTR: &str = "in_humidityrelative_input";

pub struct IioSensor {
    device_dir: PathBuf,
}

impl IioSensor {
    pub fn new(device_dir: impl Into<PathBuf>) -> Self {
        Self {
            device_dir: device_dir.into(),
        }
    }

    async fn read_milli(&self, attr: &str) -> Result<f32, SensorError> {
        let path = self.device_dir.join(attr);
        let raw = tokio::fs::read_to_string(&path).await?;
        let milli: f32 = raw
            .trim()
            .parse()
            .map_err(|_| SensorError::Malformed(raw.trim().to_string()))?;
        Ok(milli / 1000.0)
    }
}

impl Sensor for IioSensor {
    async fn measure(&mut self) -> Result<Reading, SensorError> {
        let temperature_c = self.read_milli(TEMP_ATTR).await?;
        let humidity_pct = self.read_milli(HUMIDITY_ATTR).await?;
        Ok(Reading {
            temperature_c,
            humidity_pct,
        })
    }
}
