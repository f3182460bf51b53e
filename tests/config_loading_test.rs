//! Integration tests for config loading
//!
//! Config files are written to temporary directories and loaded the way the
//! binary loads them.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

use syncmon::config::MonitorConfig;
use syncmon::error::MonitorError;

#[test]
fn test_full_toml_config() {
	let dir = TempDir::new().expect("Failed to create temp dir");
	let path = dir.path().join("syncmon.toml");
	fs::write(
		&path,
		r#"
pollIntervalSecs = 10
warmupMs = 500
startupRetrySecs = 5
mutagenCommand = "/usr/local/bin/mutagen"
rsyncCommand = "/usr/bin/rsync"
commandTimeoutSecs = 60
resourcesDir = "/opt/syncmon/Resources"
resolutionEnabled = false
logLevel = "debug"
logFile = "/tmp/syncmon.log"
"#,
	)
	.unwrap();

	let config = MonitorConfig::load(Some(path.as_path())).unwrap();
	assert_eq!(config.poll_interval(), Duration::from_secs(10));
	assert_eq!(config.warmup(), Duration::from_millis(500));
	assert_eq!(config.startup_retry(), Duration::from_secs(5));
	assert_eq!(config.command_timeout(), Duration::from_secs(60));
	assert_eq!(config.mutagen_command, "/usr/local/bin/mutagen");
	assert_eq!(config.rsync_command, "/usr/bin/rsync");
	assert_eq!(config.resources_dir, Some(PathBuf::from("/opt/syncmon/Resources")));
	assert!(!config.resolution_enabled);
	assert_eq!(config.log_level, "debug");
	assert_eq!(config.log_file, Some(PathBuf::from("/tmp/syncmon.log")));
}

#[test]
fn test_json_config_keeps_defaults() {
	let dir = TempDir::new().expect("Failed to create temp dir");
	let path = dir.path().join("syncmon.json");
	fs::write(&path, r#"{ "pollIntervalSecs": 3 }"#).unwrap();

	let config = MonitorConfig::load(Some(path.as_path())).unwrap();
	let defaults = MonitorConfig::default();
	assert_eq!(config.poll_interval_secs, 3);
	assert_eq!(config.mutagen_command, defaults.mutagen_command);
	assert_eq!(config.command_timeout_secs, defaults.command_timeout_secs);
	assert_eq!(config.resolution_enabled, defaults.resolution_enabled);
}

#[test]
fn test_zero_timeout_rejected() {
	let dir = TempDir::new().expect("Failed to create temp dir");
	let path = dir.path().join("syncmon.toml");
	fs::write(&path, "commandTimeoutSecs = 0\n").unwrap();

	match MonitorConfig::load(Some(path.as_path())) {
		Err(MonitorError::Config { message }) => assert!(message.contains("commandTimeoutSecs")),
		other => panic!("expected config error, got {:?}", other),
	}
}

#[test]
fn test_unknown_keys_ignored() {
	let dir = TempDir::new().expect("Failed to create temp dir");
	let path = dir.path().join("syncmon.toml");
	fs::write(&path, "pollIntervalSecs = 4\nthemeColor = \"blue\"\n").unwrap();

	let config = MonitorConfig::load(Some(path.as_path())).unwrap();
	assert_eq!(config.poll_interval_secs, 4);
}

// vim: ts=4
