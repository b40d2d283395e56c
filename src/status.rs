//! Status indication: a single on/off signal, side effect only.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

/// On/off signal shown to the operator (typically an LED).
pub trait StatusIndicator {
    fn set(&mut self, on: bool);
}

/// Drives a sysfs LED through its `brightness` attribute.
pub struct LedIndicator {
    brightness_path: PathBuf,
}

impl LedIndicator {
    pub fn new(brightness_path: impl Into<PathBuf>) -> Self {
        Self {
            brightness_path: brightness_path.into(),
        }
    }
}

impl StatusIndicator for LedIndicator {
    fn set(&mut self, on: bool) {
        let value = if on { "1" } else { "0" };
        if let Err(err) = fs::write(&self.brightness_path, value) {
            warn!(
                "failed to write status LED {}: {err}",
                self.brightness_path.display()
            );
        }
    }
}

/// Used when no LED is configured.
pub struct NoopIndicator;

impl StatusIndicator for NoopIndicator {
    fn set(&mut self, _on: bool) {}
}

pub fn for_led(path: Option<&Path>) -> Box<dyn StatusIndicator> {
    match path {
        Some(path) => Box::new(LedIndicator::new(path)),
        None => Box::new(NoopIndicator),
    }
}
