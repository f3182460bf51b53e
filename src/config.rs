//! Monitor configuration
//!
//! The configuration follows a priority chain:
//! 1. Built-in defaults (MonitorConfig::default())
//! 2. Config file (--config, or ~/.config/syncmon/config.toml when present)
//! 3. CLI flags (highest priority)

use crate::error::MonitorError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for a monitor instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MonitorConfig {
	// ========================================================================
	// POLLING
	// ========================================================================
	/// Seconds between the end of one poll and the start of the next
	pub poll_interval_secs: u64,

	/// Delay before the first poll, in milliseconds
	pub warmup_ms: u64,

	/// Seconds between daemon probes during startup
	pub startup_retry_secs: u64,

	// ========================================================================
	// EXTERNAL COMMANDS
	// ========================================================================
	/// Daemon command line client
	pub mutagen_command: String,

	/// Copy tool used to overwrite conflicting paths
	pub rsync_command: String,

	/// Upper bound for any external command
	pub command_timeout_secs: u64,

	// ========================================================================
	// PRESENTATION
	// ========================================================================
	/// Icon directory (defaults to <exe dir>/../Resources)
	pub resources_dir: Option<PathBuf>,

	/// Clicking an indicator flushes or overwrites
	pub resolution_enabled: bool,

	// ========================================================================
	// LOGGING
	// ========================================================================
	/// Log level (trace, debug, info, warn, error)
	pub log_level: String,

	/// Path to log file (stderr when unset)
	pub log_file: Option<PathBuf>,
}

impl Default for MonitorConfig {
	fn default() -> Self {
		MonitorConfig {
			poll_interval_secs: 2,
			warmup_ms: 0,
			startup_retry_secs: 2,
			mutagen_command: "mutagen".to_string(),
			rsync_command: "rsync".to_string(),
			command_timeout_secs: 30,
			resources_dir: None,
			resolution_enabled: true,
			log_level: "info".to_string(),
			log_file: None,
		}
	}
}

impl MonitorConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_secs)
	}

	pub fn warmup(&self) -> Duration {
		Duration::from_millis(self.warmup_ms)
	}

	pub fn startup_retry(&self) -> Duration {
		Duration::from_secs(self.startup_retry_secs)
	}

	pub fn command_timeout(&self) -> Duration {
		Duration::from_secs(self.command_timeout_secs)
	}

	/// Default config file location, if HOME is known
	pub fn default_path() -> Option<PathBuf> {
		std::env::var("HOME")
			.ok()
			.map(|h| PathBuf::from(h).join(".config").join("syncmon").join("config.toml"))
	}

	/// Parse a config file; TOML, or JSON/JSON5 by extension
	pub fn from_file(path: &Path) -> Result<Self, MonitorError> {
		let contents = std::fs::read_to_string(path).map_err(|e| MonitorError::Config {
			message: format!("cannot read {}: {}", path.display(), e),
		})?;

		let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
		let config: MonitorConfig = match ext {
			"json" | "json5" => json5::from_str(&contents).map_err(|e| MonitorError::Config {
				message: format!("{}: {}", path.display(), e),
			})?,
			_ => toml::from_str(&contents).map_err(|e| MonitorError::Config {
				message: format!("{}: {}", path.display(), e),
			})?,
		};
		config.validate()?;
		Ok(config)
	}

	/// Load from `explicit`, else from the default location if it exists
	pub fn load(explicit: Option<&Path>) -> Result<Self, MonitorError> {
		if let Some(path) = explicit {
			return MonitorConfig::from_file(path);
		}
		match MonitorConfig::default_path() {
			Some(path) if path.exists() => MonitorConfig::from_file(&path),
			_ => Ok(MonitorConfig::default()),
		}
	}

	pub fn validate(&self) -> Result<(), MonitorError> {
		if self.poll_interval_secs == 0 {
			return Err(MonitorError::Config {
				message: "pollIntervalSecs must be greater than 0".to_string(),
			});
		}
		if self.startup_retry_secs == 0 {
			return Err(MonitorError::Config {
				message: "startupRetrySecs must be greater than 0".to_string(),
			});
		}
		if self.command_timeout_secs == 0 {
			return Err(MonitorError::Config {
				message: "commandTimeoutSecs must be greater than 0".to_string(),
			});
		}
		if self.mutagen_command.trim().is_empty() {
			return Err(MonitorError::Config {
				message: "mutagenCommand must not be empty".to_string(),
			});
		}
		Ok(())
	}
}


// vim: ts=4
