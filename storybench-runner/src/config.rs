//! Configuration loading from storybench.toml
//!
//! Storybench configuration can be specified in a `storybench.toml` file in the project root.
//! The configuration is automatically discovered by walking up from the current directory.

use crate::thermal::ThermalPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use storybench_core::{OptionsError, RunOptions};
use thiserror::Error;

/// Invalid runner configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Repeat counts out of range
    #[error("Invalid run options: {0}")]
    Options(#[from] OptionsError),

    /// A story filter regex does not compile
    #[error("Invalid story filter {pattern:?}: {source}")]
    Filter {
        /// Pattern as configured
        pattern: String,
        /// Regex compile error
        #[source]
        source: regex::Error,
    },

    /// A duration string does not parse
    #[error("Invalid duration for {field}: {message}")]
    Duration {
        /// Config key holding the duration
        field: &'static str,
        /// Parse error
        message: String,
    },
}

/// Storybench configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorybenchConfig {
    /// Runner configuration
    #[serde(default)]
    pub runner: RunnerConfig,
    /// Thermal throttling configuration
    #[serde(default)]
    pub thermal: ThermalConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Runner configuration for story execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Passes over each story group
    #[serde(default = "default_repeat")]
    pub pageset_repeat: u32,
    /// Consecutive runs of each story within a pass
    #[serde(default = "default_repeat")]
    pub page_repeat: u32,
    /// Abort once more failures than this are recorded
    #[serde(default)]
    pub max_failures: Option<usize>,
    /// Run against live sites instead of recorded archives
    #[serde(default)]
    pub use_live_sites: bool,
    /// Only run stories whose name or URL matches this regex
    #[serde(default)]
    pub story_filter: Option<String>,
    /// Skip stories whose name or URL matches this regex
    #[serde(default)]
    pub story_filter_exclude: Option<String>,
    /// Show a progress bar
    #[serde(default)]
    pub progress: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            pageset_repeat: default_repeat(),
            page_repeat: default_repeat(),
            max_failures: None,
            use_live_sites: false,
            story_filter: None,
            story_filter_exclude: None,
            progress: false,
        }
    }
}

fn default_repeat() -> u32 {
    1
}

/// Thermal throttling configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThermalConfig {
    /// Wait between throttling checks (e.g., "5s")
    #[serde(default = "default_poll_interval")]
    pub poll_interval: String,
    /// Maximum checks before running anyway
    #[serde(default = "default_max_waits")]
    pub max_waits: u32,
}

impl Default for ThermalConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            max_waits: default_max_waits(),
        }
    }
}

fn default_poll_interval() -> String {
    "5s".to_string()
}
fn default_max_waits() -> u32 {
    10
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Env-filter directive used when `RUST_LOG` is not set
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
        }
    }
}

fn default_filter() -> String {
    "storybench=info".to_string()
}

impl StorybenchConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("storybench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Run options described by the `[runner]` table, validated
    pub fn run_options(&self) -> Result<RunOptions, ConfigError> {
        let options = RunOptions {
            pageset_repeat: self.runner.pageset_repeat,
            page_repeat: self.runner.page_repeat,
            max_failures: self.runner.max_failures,
            use_live_sites: self.runner.use_live_sites,
            story_filter: self.runner.story_filter.clone(),
            story_filter_exclude: self.runner.story_filter_exclude.clone(),
        };
        options.validate()?;
        Ok(options)
    }

    /// Thermal policy described by the `[thermal]` table
    pub fn thermal_policy(&self) -> Result<ThermalPolicy, ConfigError> {
        let poll_interval =
            Self::parse_duration(&self.thermal.poll_interval).map_err(|e| ConfigError::Duration {
                field: "thermal.poll_interval",
                message: e.to_string(),
            })?;
        Ok(ThermalPolicy {
            poll_interval,
            max_waits: self.thermal.max_waits,
        })
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# Storybench Configuration

[runner]
# Passes over each story group
pageset_repeat = 1
# Consecutive runs of each story within a pass
page_repeat = 1
# Abort once more failures than this are recorded (uncomment to enable)
# max_failures = 5
# Run against live sites instead of recorded archives
use_live_sites = false
# Only run matching stories (uncomment to enable)
# story_filter = "^search"
# Skip matching stories (uncomment to enable)
# story_filter_exclude = "flaky"
# Show a progress bar
progress = false

[thermal]
# Wait between throttling checks
poll_interval = "5s"
# Maximum checks before running anyway
max_waits = 10

[logging]
# Used when RUST_LOG is not set
filter = "storybench=info"
"#
        .to_string()
    }

    /// Parse duration string (e.g., "3s", "500ms", "2m")
    pub fn parse_duration(s: &str) -> anyhow::Result<Duration> {
        let s = s.trim();
        if s.is_empty() {
            return Err(anyhow::anyhow!("Empty duration string"));
        }

        // Find where the number ends and unit begins
        let (num_part, unit_part) = s
            .char_indices()
            .find(|(_, c)| c.is_alphabetic())
            .map(|(i, _)| s.split_at(i))
            .unwrap_or((s, "s"));

        let value: f64 = num_part
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid duration number: {}", num_part))?;
        if !value.is_finite() || value < 0.0 {
            return Err(anyhow::anyhow!("Invalid duration number: {}", num_part));
        }

        let multiplier: u64 = match unit_part.to_lowercase().as_str() {
            "ns" => 1,
            "us" | "µs" => 1_000,
            "ms" => 1_000_000,
            "s" | "" => 1_000_000_000,
            "m" | "min" => 60_000_000_000,
            _ => return Err(anyhow::anyhow!("Unknown duration unit: {}", unit_part)),
        };

        Ok(Duration::from_nanos((value * multiplier as f64) as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StorybenchConfig::default();
        assert_eq!(config.runner.pageset_repeat, 1);
        assert_eq!(config.runner.page_repeat, 1);
        assert!(config.runner.max_failures.is_none());
        assert_eq!(config.thermal.max_waits, 10);
        assert_eq!(config.logging.filter, "storybench=info");
    }

    #[test]
    fn test_parse_duration() {
        let parse = |s| StorybenchConfig::parse_duration(s).unwrap();
        assert_eq!(parse("3s"), Duration::from_secs(3));
        assert_eq!(parse("500ms"), Duration::from_millis(500));
        assert_eq!(parse("100us"), Duration::from_micros(100));
        assert_eq!(parse("1000ns"), Duration::from_nanos(1000));
        assert_eq!(parse("2m"), Duration::from_secs(120));
        assert_eq!(parse("1.5s"), Duration::from_millis(1500));
        assert!(StorybenchConfig::parse_duration("").is_err());
        assert!(StorybenchConfig::parse_duration("5h").is_err());
        assert!(StorybenchConfig::parse_duration("-1s").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml_str = r#"
            [runner]
            pageset_repeat = 3
            story_filter = "^blank"

            [thermal]
            poll_interval = "250ms"
        "#;

        let config: StorybenchConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.runner.pageset_repeat, 3);
        // Defaults should still apply
        assert_eq!(config.runner.page_repeat, 1);
        assert_eq!(config.thermal.max_waits, 10);

        let options = config.run_options().unwrap();
        assert_eq!(options.pageset_repeat, 3);
        assert_eq!(options.story_filter.as_deref(), Some("^blank"));

        let thermal = config.thermal_policy().unwrap();
        assert_eq!(thermal.poll_interval, Duration::from_millis(250));
    }

    #[test]
    fn test_zero_repeat_rejected() {
        let config: StorybenchConfig = toml::from_str("[runner]\npage_repeat = 0\n").unwrap();
        assert!(matches!(
            config.run_options(),
            Err(ConfigError::Options(OptionsError::RepeatOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_bad_thermal_interval() {
        let mut config = StorybenchConfig::default();
        config.thermal.poll_interval = "soon".to_string();
        assert!(matches!(
            config.thermal_policy(),
            Err(ConfigError::Duration { .. })
        ));
    }

    #[test]
    fn test_default_toml_parses() {
        let config: StorybenchConfig = toml::from_str(&StorybenchConfig::default_toml()).unwrap();
        assert_eq!(config.runner.pageset_repeat, 1);
        assert_eq!(config.thermal.poll_interval, "5s");
        assert!(config.run_options().is_ok());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storybench.toml");
        std::fs::write(&path, "[runner]\nmax_failures = 2\n").unwrap();
        let config = StorybenchConfig::load(&path).unwrap();
        assert_eq!(config.runner.max_failures, Some(2));
        assert!(StorybenchConfig::load(dir.path().join("missing.toml")).is_err());
    }
}
