//! Thermal Throttling
//!
//! Before each iteration the runner waits for a throttled platform to cool
//! down; after it, the runner warns when throttling happened during the run.

use std::time::Duration;
use storybench_core::{Platform, StoryKey};

/// How long to wait for a throttled platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermalPolicy {
    /// Sleep between checks
    pub poll_interval: Duration,
    /// Checks before giving up and running anyway
    pub max_waits: u32,
}

impl Default for ThermalPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            max_waits: 10,
        }
    }
}

impl ThermalPolicy {
    /// Block while the platform reports throttling, up to `max_waits` polls.
    /// Returns the number of polls spent waiting.
    pub fn wait_if_throttled(&self, platform: Option<&dyn Platform>) -> u32 {
        let Some(platform) = platform else {
            return 0;
        };
        if !platform.can_monitor_thermal_throttling() {
            return 0;
        }

        let mut waits = 0;
        while waits < self.max_waits && platform.is_thermally_throttled() {
            waits += 1;
            tracing::warn!(
                "Thermally throttled, waiting {:?} ({}/{})",
                self.poll_interval,
                waits,
                self.max_waits
            );
            std::thread::sleep(self.poll_interval);
        }
        if waits == self.max_waits && platform.is_thermally_throttled() {
            tracing::warn!("Still thermally throttled after {} checks; running anyway", waits);
        }
        waits
    }

    /// Warn when the platform was throttled while `story` ran
    pub fn check_after(&self, platform: Option<&dyn Platform>, story: &StoryKey) -> bool {
        let throttled = platform.is_some_and(|p| {
            p.can_monitor_thermal_throttling() && p.has_been_thermally_throttled()
        });
        if throttled {
            tracing::warn!(
                story = %story,
                "Device was thermally throttled during the run; results may be unreliable"
            );
        }
        throttled
    }
}
