//! Error types for syncmon operations

use std::error::Error;
use std::fmt;
use std::io;
use std::time::Duration;

/// Top-level error type for monitor setup and operation
#[derive(Debug)]
pub enum MonitorError {
	/// Configuration could not be read or is invalid
	Config { message: String },

	/// Resource directory could not be determined
	Resources { message: String },

	/// I/O error (log file)
	Io(io::Error),
}

impl fmt::Display for MonitorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			MonitorError::Config { message } => write!(f, "Invalid configuration: {}", message),
			MonitorError::Resources { message } => {
				write!(f, "Cannot locate resources: {}", message)
			}
			MonitorError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for MonitorError {}

impl From<io::Error> for MonitorError {
	fn from(e: io::Error) -> Self {
		MonitorError::Io(e)
	}
}

/// Errors from querying the synchronization daemon
#[derive(Debug)]
pub enum SourceError {
	/// Daemon client could not be started
	SpawnFailed { cmd: String, source: io::Error },

	/// Daemon client exited with an error
	CommandFailed { cmd: String, status: Option<i32>, stderr: String },

	/// Daemon did not answer in time
	Timeout { cmd: String, after: Duration },

	/// Daemon answered with nothing
	EmptyResponse,

	/// Daemon answered with something that is not a session list
	Decode { message: String },
}

impl fmt::Display for SourceError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SourceError::SpawnFailed { cmd, source } => {
				write!(f, "Failed to spawn '{}': {}", cmd, source)
			}
			SourceError::CommandFailed { cmd, status, stderr } => match status {
				Some(code) => write!(f, "'{}' exited with status {}: {}", cmd, code, stderr.trim()),
				None => write!(f, "'{}' was terminated by a signal: {}", cmd, stderr.trim()),
			},
			SourceError::Timeout { cmd, after } => {
				write!(f, "'{}' timed out after {:?}", cmd, after)
			}
			SourceError::EmptyResponse => write!(f, "Empty response from daemon"),
			SourceError::Decode { message } => write!(f, "Malformed session list: {}", message),
		}
	}
}

impl Error for SourceError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SourceError::SpawnFailed { source, .. } => Some(source),
			_ => None,
		}
	}
}

impl From<serde_json::Error> for SourceError {
	fn from(e: serde_json::Error) -> Self {
		SourceError::Decode { message: e.to_string() }
	}
}

/// Errors from external resolution actions (copy, flush)
#[derive(Debug)]
pub enum ActionError {
	/// Staging the path list failed
	TempFile(io::Error),

	/// External command could not be started
	SpawnFailed { cmd: String, source: io::Error },

	/// External command exited with an error
	CommandFailed { cmd: String, status: Option<i32>, output: String },

	/// External command did not finish in time
	Timeout { cmd: String, after: Duration },
}

impl fmt::Display for ActionError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ActionError::TempFile(e) => write!(f, "Failed to stage path list: {}", e),
			ActionError::SpawnFailed { cmd, source } => {
				write!(f, "Failed to spawn '{}': {}", cmd, source)
			}
			ActionError::CommandFailed { cmd, status, output } => match status {
				Some(code) => write!(f, "'{}' exited with status {}: {}", cmd, code, output.trim()),
				None => write!(f, "'{}' was terminated by a signal: {}", cmd, output.trim()),
			},
			ActionError::Timeout { cmd, after } => {
				write!(f, "'{}' timed out after {:?}", cmd, after)
			}
		}
	}
}

impl Error for ActionError {}

impl From<io::Error> for ActionError {
	fn from(e: io::Error) -> Self {
		ActionError::TempFile(e)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_source_error_display() {
		let err = SourceError::CommandFailed {
			cmd: "mutagen sync list".to_string(),
			status: Some(1),
			stderr: "unable to connect to daemon\n".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"'mutagen sync list' exited with status 1: unable to connect to daemon"
		);
	}

	#[test]
	fn test_timeout_display() {
		let err = ActionError::Timeout { cmd: "rsync".to_string(), after: Duration::from_secs(30) };
		assert_eq!(err.to_string(), "'rsync' timed out after 30s");
	}

	#[test]
	fn test_sub_second_timeout_display() {
		let err = SourceError::Timeout {
			cmd: "mutagen sync list".to_string(),
			after: Duration::from_millis(300),
		};
		assert_eq!(err.to_string(), "'mutagen sync list' timed out after 300ms");
	}

	#[test]
	fn test_monitor_error_from_io() {
		let err: MonitorError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
		assert!(matches!(err, MonitorError::Io(_)));
		assert_eq!(err.to_string(), "I/O error: denied");
	}
}

// vim: ts=4
