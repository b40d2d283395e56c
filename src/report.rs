//! The acquisition-and-publish cycle: the gateway's output contract,
//! cycle timing, and the fixed-period reporting loop.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::bus::MessageBus;
use crate::sensor::{Reading, Sensor, SensorReader};

/// Topic carrying the temperature half of a reading.
pub const TEMPERATURE_TOPIC: &str = "home/temperature";
/// Topic carrying the humidity half of a reading.
pub const HUMIDITY_TOPIC: &str = "home/humidity";

// === Gateway ===

/// Thin layer over the bus session that fixes the output contract:
/// which topics exist and how a value becomes a payload.
pub struct PublishGateway<B> {
    bus: B,
}

impl<B: MessageBus> PublishGateway<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    /// Publish one reading as two independent values, temperature first.
    pub async fn publish_reading(&self, reading: &Reading) {
        self.publish_value(TEMPERATURE_TOPIC, reading.temperature_c)
            .await;
        self.publish_value(HUMIDITY_TOPIC, reading.humidity_pct)
            .await;
    }

    async fn publish_value(&self, topic: &str, value: f32) {
        // Canonical decimal string; no units, no timestamp, no envelope.
        let payload = value.to_string();
        info!("publishing {payload} to {topic}");
        if let Err(err) = self.bus.publish(topic, payload).await {
            warn!("publish to {topic} failed: {err}");
        }
    }

    pub fn into_inner(self) -> B {
        self.bus
    }
}

// === Cycle timing ===

/// Fixed cadence of the reporting loop.
#[derive(Clone, Copy, Debug)]
pub struct CycleTiming {
    /// Settling wait before each sample
    pub pre_sample: Duration,
    /// Wait after a cycle completes, publish or not
    pub idle: Duration,
}

impl Default for CycleTiming {
    fn default() -> Self {
        Self {
            pre_sample: Duration::from_secs(2),
            idle: Duration::from_secs(10),
        }
    }
}

// === Reporting loop ===

/// Drives the cycle: wait, sample, maybe publish, wait.
pub struct ReportingLoop<S, B> {
    reader: SensorReader<S>,
    gateway: PublishGateway<B>,
    timing: CycleTiming,
}

impl<S: Sensor, B: MessageBus> ReportingLoop<S, B> {
    pub fn new(reader: SensorReader<S>, gateway: PublishGateway<B>, timing: CycleTiming) -> Self {
        Self {
            reader,
            gateway,
            timing,
        }
    }

    /// Run cycles until the future is dropped; there is no internal exit
    /// condition. Shutdown belongs to the host process.
    pub async fn run(&mut self) {
        loop {
            self.run_cycle().await;
        }
    }

    async fn run_cycle(&mut self) {
        sleep(self.timing.pre_sample).await;
        match self.reader.sample().await {
            Some(reading) => self.gateway.publish_reading(&reading).await,
            None => info!("no reading this cycle, skipping publish"),
        }
        sleep(self.timing.idle).await;
    }

    pub fn into_gateway(self) -> PublishGateway<B> {
        self.gateway
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tokio::time::Instant;

    use super::*;
    use crate::sensor::SensorError;

    #[derive(Clone, Default)]
    struct RecordingBus {
        log: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl RecordingBus {
        fn published(&self) -> Vec<(String, String)> {
            self.log.lock().unwrap().clone()
        }
    }

    impl MessageBus for RecordingBus {
        type Error = std::convert::Infallible;

        async fn publish(&self, topic: &str, payload: String) -> Result<(), Self::Error> {
            self.log.lock().unwrap().push((topic.to_string(), payload));
            Ok(())
        }
    }

    struct FailingBus;

    impl MessageBus for FailingBus {
        type Error = &'static str;

        async fn publish(&self, _topic: &str, _payload: String) -> Result<(), Self::Error> {
            Err("broker went away")
        }
    }

    struct SteadySensor(Reading);

    impl Sensor for SteadySensor {
        async fn measure(&mut self) -> Result<Reading, SensorError> {
            Ok(self.0)
        }
    }

    struct DeadSensor;

    impl Sensor for DeadSensor {
        async fn measure(&mut self) -> Result<Reading, SensorError> {
            Err(SensorError::Io(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                "bus timeout",
            )))
        }
    }

    fn reading(temperature_c: f32, humidity_pct: f32) -> Reading {
        Reading {
            temperature_c,
            humidity_pct,
        }
    }

    #[tokio::test]
    async fn gateway_publishes_temperature_then_humidity() {
        let bus = RecordingBus::default();
        let gateway = PublishGateway::new(bus.clone());

        gateway.publish_reading(&reading(23.5, 60.2)).await;

        assert_eq!(
            bus.published(),
            vec![
                ("home/temperature".to_string(), "23.5".to_string()),
                ("home/humidity".to_string(), "60.2".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn gateway_swallows_publish_failures() {
        let gateway = PublishGateway::new(FailingBus);

        // The only observable effect is a warning; the call must not fail.
        gateway.publish_reading(&reading(23.5, 60.2)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn cycle_publishes_and_keeps_cadence() {
        let bus = RecordingBus::default();
        let mut agent = ReportingLoop::new(
            SensorReader::new(SteadySensor(reading(23.5, 60.2))),
            PublishGateway::new(bus.clone()),
            CycleTiming::default(),
        );
        let started = Instant::now();

        agent.run_cycle().await;

        assert_eq!(bus.published().len(), 2);
        assert_eq!(started.elapsed(), Duration::from_secs(12));
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_sensor_skips_publish_but_not_the_idle_wait() {
        let bus = RecordingBus::default();
        let mut agent = ReportingLoop::new(
            SensorReader::new(DeadSensor),
            PublishGateway::new(bus.clone()),
            CycleTiming::default(),
        );
        let started = Instant::now();

        agent.run_cycle().await;

        assert!(bus.published().is_empty());
        // 2s settle + 5 retries x 2s + 10s idle
        assert_eq!(started.elapsed(), Duration::from_secs(22));
    }

    #[tokio::test(start_paused = true)]
    async fn identical_readings_produce_identical_payloads() {
        let bus = RecordingBus::default();
        let mut agent = ReportingLoop::new(
            SensorReader::new(SteadySensor(reading(21.3, 48.0))),
            PublishGateway::new(bus.clone()),
            CycleTiming::default(),
        );

        agent.run_cycle().await;
        agent.run_cycle().await;

        let published = bus.published();
        assert_eq!(published.len(), 4);
        assert_eq!(published[0], published[2]);
        assert_eq!(published[1], published[3]);
    }
}
