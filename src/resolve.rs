//! Click-triggered resolution: flush, or overwrite beta and flush
//!
//! Overwriting is only offered for one-way-safe sessions with conflicts.
//! In that mode alpha is authoritative, so copying the conflicting paths
//! from alpha onto beta is what the daemon would do had it been allowed
//! to. For every other mode a click only requests a flush.

use crate::error::ActionError;
use crate::logging::*;
use crate::session::{SessionState, SyncMode};
use async_trait::async_trait;
use std::io::Write;
use std::process::Stdio;
use std::time::Duration;

/// What a click on an indicator does
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
	/// Ask the daemon for an immediate synchronization cycle
	Flush,

	/// Copy these paths from alpha to beta, then flush
	Overwrite(Vec<String>),
}

impl ClickAction {
	pub fn for_state(state: &SessionState) -> ClickAction {
		if state.conflicts.is_empty() || state.mode != SyncMode::OneWaySafe {
			return ClickAction::Flush;
		}
		let paths = state.beta_conflict_paths();
		if paths.is_empty() {
			ClickAction::Flush
		} else {
			ClickAction::Overwrite(paths)
		}
	}
}

/// External side effects needed by resolution
#[async_trait]
pub trait SyncActions: Send + Sync {
	/// Copy `paths` (relative to the session roots) from alpha to beta
	async fn copy_paths(&self, session: &SessionState, paths: &[String])
		-> Result<(), ActionError>;

	/// Request an immediate synchronization cycle
	async fn flush(&self, session: &SessionState) -> Result<(), ActionError>;
}

/// Result of one resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionOutcome {
	/// Number of paths handed to the copy, if a copy was attempted
	pub copied: Option<usize>,
	pub copy_failed: bool,
	pub flush_failed: bool,
}

/// Run the click action for `state`
///
/// Best effort: failures are logged, never retried, and a failed copy
/// still triggers the flush.
pub async fn resolve(state: &SessionState, actions: &dyn SyncActions) -> ResolutionOutcome {
	let mut outcome = ResolutionOutcome { copied: None, copy_failed: false, flush_failed: false };

	if let ClickAction::Overwrite(paths) = ClickAction::for_state(state) {
		info!("Overwriting {} conflicting path(s) on {}", paths.len(), state.beta);
		outcome.copied = Some(paths.len());
		if let Err(e) = actions.copy_paths(state, &paths).await {
			error!("Copy for session {} failed: {}", state.identifier, e);
			outcome.copy_failed = true;
		}
	}

	debug!("Flushing session {}", state.identifier);
	if let Err(e) = actions.flush(state).await {
		error!("Flush for session {} failed: {}", state.identifier, e);
		outcome.flush_failed = true;
	}

	outcome
}

// ============================================================================
// COMMAND-BASED ACTIONS
// ============================================================================

/// Resolution actions backed by `rsync` and the daemon's CLI
#[derive(Debug, Clone)]
pub struct CommandActions {
	pub mutagen: String,
	pub rsync: String,
	pub timeout: Duration,
}

impl CommandActions {
	pub fn new(mutagen: &str, rsync: &str, timeout: Duration) -> Self {
		CommandActions { mutagen: mutagen.to_string(), rsync: rsync.to_string(), timeout }
	}

	/// Arguments for copying the listed paths from alpha to beta
	pub fn rsync_args(session: &SessionState, files_from: &std::path::Path) -> Vec<String> {
		vec![
			"-r".to_string(),
			format!("--files-from={}", files_from.display()),
			with_trailing_slash(&session.alpha.path),
			with_trailing_slash(&session.beta.to_string()),
		]
	}

	async fn run(&self, program: &str, args: &[String]) -> Result<String, ActionError> {
		let cmd = format!("{} {}", program, args.join(" "));
		debug!("Running {}", cmd);

		let child = tokio::process::Command::new(program)
			.args(args)
			.stdin(Stdio::null())
			.stdout(Stdio::piped())
			.stderr(Stdio::piped())
			.kill_on_drop(true)
			.spawn()
			.map_err(|e| ActionError::SpawnFailed { cmd: cmd.clone(), source: e })?;

		let output = tokio::time::timeout(self.timeout, child.wait_with_output())
			.await
			.map_err(|_| ActionError::Timeout { cmd: cmd.clone(), after: self.timeout })?
			.map_err(|e| ActionError::SpawnFailed { cmd: cmd.clone(), source: e })?;

		let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
		text.push_str(&String::from_utf8_lossy(&output.stderr));

		if output.status.success() {
			Ok(text)
		} else {
			Err(ActionError::CommandFailed { cmd, status: output.status.code(), output: text })
		}
	}
}

fn with_trailing_slash(path: &str) -> String {
	if path.ends_with('/') {
		path.to_string()
	} else {
		format!("{}/", path)
	}
}

#[async_trait]
impl SyncActions for CommandActions {
	async fn copy_paths(
		&self,
		session: &SessionState,
		paths: &[String],
	) -> Result<(), ActionError> {
		// Kept alive until rsync has read it
		let mut list = tempfile::Builder::new().prefix("syncmon-").tempfile()?;
		for path in paths {
			list.write_all(path.as_bytes())?;
			list.write_all(b"\n")?;
		}
		list.flush()?;

		let args = CommandActions::rsync_args(session, list.path());
		let output = self.run(&self.rsync, &args).await?;
		debug!("rsync: {}", output.trim());
		Ok(())
	}

	async fn flush(&self, session: &SessionState) -> Result<(), ActionError> {
		let args = vec!["sync".to_string(), "flush".to_string(), session.identifier.clone()];
		self.run(&self.mutagen, &args).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::session::{Change, Conflict, Endpoint, Status};
	use std::path::Path;
	use std::sync::Mutex;

	#[derive(Default)]
	struct RecordingActions {
		fail_copy: bool,
		calls: Mutex<Vec<String>>,
	}

	#[async_trait]
	impl SyncActions for RecordingActions {
		async fn copy_paths(
			&self,
			_session: &SessionState,
			paths: &[String],
		) -> Result<(), ActionError> {
			self.calls.lock().unwrap().push(format!("copy {}", paths.join(",")));
			if self.fail_copy {
				return Err(ActionError::CommandFailed {
					cmd: "rsync".to_string(),
					status: Some(23),
					output: "partial transfer".to_string(),
				});
			}
			Ok(())
		}

		async fn flush(&self, session: &SessionState) -> Result<(), ActionError> {
			self.calls.lock().unwrap().push(format!("flush {}", session.identifier));
			Ok(())
		}
	}

	fn session(mode: SyncMode, paths: &[&str]) -> SessionState {
		let conflicts = paths
			.iter()
			.map(|p| Conflict {
				root: p.to_string(),
				alpha_changes: vec![Change { path: p.to_string() }],
				beta_changes: vec![Change { path: p.to_string() }],
			})
			.collect();
		SessionState::new(
			"sync_1",
			Status::Watching,
			Endpoint::local("/home/me/site"),
			Endpoint::new("web1", "/srv/site"),
		)
		.with_mode(mode)
		.with_conflicts(conflicts)
	}

	#[test]
	fn test_click_action_policy() {
		assert_eq!(ClickAction::for_state(&session(SyncMode::OneWaySafe, &[])), ClickAction::Flush);
		assert_eq!(
			ClickAction::for_state(&session(SyncMode::OneWaySafe, &["a", "b"])),
			ClickAction::Overwrite(vec!["a".to_string(), "b".to_string()])
		);
		assert_eq!(
			ClickAction::for_state(&session(SyncMode::TwoWaySafe, &["a"])),
			ClickAction::Flush
		);
		assert_eq!(
			ClickAction::for_state(&session(SyncMode::OneWayReplica, &["a"])),
			ClickAction::Flush
		);
	}

	#[tokio::test]
	async fn test_resolve_without_conflicts_only_flushes() {
		let actions = RecordingActions::default();
		let outcome = resolve(&session(SyncMode::OneWaySafe, &[]), &actions).await;
		assert_eq!(outcome.copied, None);
		assert_eq!(*actions.calls.lock().unwrap(), vec!["flush sync_1"]);
	}

	#[tokio::test]
	async fn test_resolve_copies_then_flushes() {
		let actions = RecordingActions::default();
		let outcome = resolve(&session(SyncMode::OneWaySafe, &["a", "b"]), &actions).await;
		assert_eq!(outcome.copied, Some(2));
		assert!(!outcome.copy_failed);
		assert_eq!(*actions.calls.lock().unwrap(), vec!["copy a,b", "flush sync_1"]);
	}

	#[tokio::test]
	async fn test_resolve_flushes_after_failed_copy() {
		let actions = RecordingActions { fail_copy: true, ..Default::default() };
		let outcome = resolve(&session(SyncMode::OneWaySafe, &["a"]), &actions).await;
		assert!(outcome.copy_failed);
		assert!(!outcome.flush_failed);
		assert_eq!(*actions.calls.lock().unwrap(), vec!["copy a", "flush sync_1"]);
	}

	#[test]
	fn test_rsync_args() {
		let state = session(SyncMode::OneWaySafe, &["a"]);
		let args = CommandActions::rsync_args(&state, Path::new("/tmp/syncmon-x"));
		assert_eq!(
			args,
			vec!["-r", "--files-from=/tmp/syncmon-x", "/home/me/site/", "web1:/srv/site/"]
		);
	}

	#[tokio::test]
	async fn test_missing_program_is_spawn_error() {
		let actions = CommandActions::new(
			"/nonexistent/syncmon-mutagen",
			"/nonexistent/syncmon-rsync",
			Duration::from_secs(5),
		);
		let state = session(SyncMode::OneWaySafe, &["a"]);
		let err = actions.flush(&state).await.unwrap_err();
		assert!(matches!(err, ActionError::SpawnFailed { .. }));
		let err = actions.copy_paths(&state, &["a".to_string()]).await.unwrap_err();
		assert!(matches!(err, ActionError::SpawnFailed { .. }));
	}
}

// vim: ts=4
