//! Simulated sensor for running the agent without hardware.

use super::{Reading, Sensor, SensorError};

/// Deterministic stand-in for the real sensor: a slow triangle wave
/// around typical indoor conditions.
#[derive(Debug, Default)]
pub struct SimulatedSensor {
    tick: u64,
}

impl SimulatedSensor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Sensor for SimulatedSensor {
    async fn measure(&mut self) -> Result<Reading, SensorError> {
        let phase = (self.tick % 40) as f32;
        let swing = if phase < 20.0 { phase } else { 40.0 - phase };
        self.tick += 1;
        Ok(Reading {
            temperature_c: 21.0 + swing * 0.1,
            humidity_pct: 45.0 + swing * 0.25,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stays_within_the_indoor_band() {
        let mut sensor = SimulatedSensor::new();
        for _ in 0..100 {
            let reading = sensor.measure().await.unwrap();
            assert!((21.0..=23.0).contains(&reading.temperature_c));
            assert!((45.0..=50.0).contains(&reading.humidity_pct));
        }
    }
}
