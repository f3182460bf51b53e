//! Logging prelude module for convenient access to tracing macros.
//!
//! # Usage
//!
//! ```ignore
//! use crate::logging::*;
//!
//! info!("Session appeared");
//! warn!("Poll failed");
//! ```

pub use tracing::{debug, error, info, trace, warn};

use crate::error::MonitorError;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

/// Initialize the tracing subscriber with environment filter support.
///
/// `level` is used when `RUST_LOG` is not set:
///
/// ```bash
/// RUST_LOG=debug syncmon
/// RUST_LOG=syncmon::engine=trace syncmon
/// ```
///
/// With `log_file` set, output is appended to that file instead of stderr.
pub fn init_tracing(level: &str, log_file: Option<&Path>) -> Result<(), MonitorError> {
	let filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

	match log_file {
		Some(path) => {
			let file = OpenOptions::new().create(true).append(true).open(path)?;
			tracing_subscriber::fmt()
				.with_env_filter(filter)
				.with_ansi(false)
				.with_writer(Mutex::new(file))
				.init();
		}
		None => {
			tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_unwritable_log_file() {
		let err = init_tracing("info", Some(Path::new("/nonexistent/dir/syncmon.log"))).unwrap_err();
		assert!(matches!(err, MonitorError::Io(_)));
	}
}

// vim: ts=4
