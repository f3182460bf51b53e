//! Session state source
//!
//! The daemon is queried through its command line client, which can print
//! the full session list as JSON.

use crate::error::SourceError;
use crate::logging::*;
use crate::session::SessionRecord;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::Duration;

/// Go template that makes the daemon client print JSON
pub const JSON_TEMPLATE: &str = "{{json .}}";

/// Anything that can list the current session states
#[async_trait]
pub trait StateSource: Send + Sync {
	/// List all sessions currently known to the daemon
	async fn list(&self) -> Result<Vec<SessionRecord>, SourceError>;
}

/// Parse the daemon client's JSON output
///
/// `null` means no sessions. Blank output is an error, the client prints
/// at least `[]` or `null` when it could talk to the daemon. A `null`
/// entry inside the list becomes an empty record, which fails validation
/// later on like any other malformed entry.
pub fn parse_listing(output: &str) -> Result<Vec<SessionRecord>, SourceError> {
	let trimmed = output.trim();
	if trimmed.is_empty() {
		return Err(SourceError::EmptyResponse);
	}
	let records: Option<Vec<Option<SessionRecord>>> = serde_json::from_str(trimmed)?;
	Ok(records.unwrap_or_default().into_iter().map(Option::unwrap_or_default).collect())
}

/// State source that runs `mutagen sync list`
#[derive(Debug, Clone)]
pub struct MutagenSource {
	command: String,
	timeout: Duration,
}

impl MutagenSource {
	pub fn new(command: &str, timeout: Duration) -> Self {
		MutagenSource { command: command.to_string(), timeout }
	}

	pub fn args() -> Vec<String> {
		vec![
			"sync".to_string(),
			"list".to_string(),
			"--template".to_string(),
			JSON_TEMPLATE.to_string(),
		]
	}

	fn display_cmd(&self) -> String {
		format!("{} sync list", self.command)
	}
}

#[async_trait]
impl StateSource for MutagenSource {
	async fn list(&self) -> Result<Vec<SessionRecord>, SourceError> {
		let cmd = self.display_cmd();

		let child = tokio::process::Command::new(&self.command)
			.args(MutagenSource::args())
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| SourceError::SpawnFailed { cmd: cmd.clone(), source: e })?;

		let output = tokio::time::timeout(self.timeout, child.wait_with_output())
			.await
			.map_err(|_| SourceError::Timeout { cmd: cmd.clone(), after: self.timeout })?
			.map_err(|e| SourceError::SpawnFailed { cmd: cmd.clone(), source: e })?;

		if !output.status.success() {
			return Err(SourceError::CommandFailed {
				cmd,
				status: output.status.code(),
				stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
			});
		}

		let stdout = String::from_utf8_lossy(&output.stdout);
		let records = parse_listing(&stdout)?;
		debug!("Daemon listed {} session(s)", records.len());
		Ok(records)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_listing() {
		let records = parse_listing(
			r#"[{"identifier":"sync_a","status":"watching","beta":{"host":"h","path":"/p"}}]"#,
		)
		.unwrap();
		assert_eq!(records.len(), 1);
		assert_eq!(records[0].identifier.as_deref(), Some("sync_a"));
	}

	#[test]
	fn test_parse_null_and_empty_list() {
		assert!(parse_listing("null\n").unwrap().is_empty());
		assert!(parse_listing("[]").unwrap().is_empty());
	}

	#[test]
	fn test_parse_blank_output() {
		assert!(matches!(parse_listing("  \n"), Err(SourceError::EmptyResponse)));
	}

	#[test]
	fn test_parse_garbage() {
		let err = parse_listing("Error: unable to connect to daemon").unwrap_err();
		assert!(matches!(err, SourceError::Decode { .. }));
	}

	#[test]
	fn test_tolerates_null_entries_and_unknown_fields() {
		let records =
			parse_listing(r#"[{"identifier":"a","labels":{"x":"y"},"conflicts":null}, null, {}]"#)
				.unwrap();
		assert_eq!(records.len(), 3);
		assert!(records[1].identifier.is_none());
		assert!(records[2].identifier.is_none());
	}

	#[tokio::test]
	async fn test_missing_client_is_spawn_error() {
		let source = MutagenSource::new("/nonexistent/syncmon-mutagen", Duration::from_secs(5));
		let err = source.list().await.unwrap_err();
		assert!(matches!(err, SourceError::SpawnFailed { .. }));
	}

	#[tokio::test]
	async fn test_failing_client_is_command_error() {
		// `false` ignores its arguments and exits 1
		let source = MutagenSource::new("false", Duration::from_secs(5));
		let err = source.list().await.unwrap_err();
		assert!(matches!(err, SourceError::CommandFailed { status: Some(1), .. }));
	}
}

// vim: ts=4
