//! Bounded-retry sampling over the sensor port.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use super::{Reading, Sensor};

/// Consecutive failed attempts after which a cycle gives up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Fixed pause between attempts; no backoff.
pub const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Wraps a [`Sensor`] with a bounded retry so one timing glitch on the
/// sensor bus does not cost the cycle its reading.
pub struct SensorReader<S> {
    sensor: S,
    max_attempts: u32,
    retry_delay: Duration,
}

impl<S: Sensor> SensorReader<S> {
    pub fn new(sensor: S) -> Self {
        Self {
            sensor,
            max_attempts: MAX_ATTEMPTS,
            retry_delay: RETRY_DELAY,
        }
    }

    /// Take one validated reading, or nothing if the sensor stayed
    /// unavailable for the whole attempt budget.
    ///
    /// Exhausting the budget is an expected outcome, not an error: the
    /// caller skips that cycle's publish and tries again next cycle.
    pub async fn sample(&mut self) -> Option<Reading> {
        let mut attempts = 0;
        while attempts < self.max_attempts {
            match self.sensor.measure().await {
                Ok(reading) => {
                    debug!(
                        temperature_c = reading.temperature_c,
                        humidity_pct = reading.humidity_pct,
                        "sensor read ok"
                    );
                    return Some(reading);
                }
                Err(err) => {
                    attempts += 1;
                    warn!(
                        "failed to read sensor (attempt {attempts}/{}): {err}",
                        self.max_attempts
                    );
                    sleep(self.retry_delay).await;
                }
            }
        }
        None
    }
}
