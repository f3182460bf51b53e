//! Session state model
//!
//! `SessionRecord` mirrors the daemon's JSON session listing and accepts
//! anything. `SessionState` is the validated form the engine works with.
//! A `Snapshot` is one poll's worth of states keyed by session identifier.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

/// Synchronization status reported by the daemon
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
	Disconnected,
	HaltedOnRootEmptied,
	HaltedOnRootDeletion,
	HaltedOnRootTypeChange,
	ConnectingAlpha,
	ConnectingBeta,
	Watching,
	Scanning,
	WaitingForRescan,
	Reconciling,
	StagingAlpha,
	StagingBeta,
	Transitioning,
	Saving,
	/// A status this monitor does not know about
	Other(String),
}

impl Status {
	/// Every status the monitor knows by name
	pub const KNOWN: [Status; 14] = [
		Status::Disconnected,
		Status::HaltedOnRootEmptied,
		Status::HaltedOnRootDeletion,
		Status::HaltedOnRootTypeChange,
		Status::ConnectingAlpha,
		Status::ConnectingBeta,
		Status::Watching,
		Status::Scanning,
		Status::WaitingForRescan,
		Status::Reconciling,
		Status::StagingAlpha,
		Status::StagingBeta,
		Status::Transitioning,
		Status::Saving,
	];

	/// Parse the daemon's wire name
	pub fn parse(name: &str) -> Status {
		match name {
			"disconnected" => Status::Disconnected,
			"halted-on-root-emptied" => Status::HaltedOnRootEmptied,
			"halted-on-root-deletion" => Status::HaltedOnRootDeletion,
			"halted-on-root-type-change" => Status::HaltedOnRootTypeChange,
			"connecting-alpha" => Status::ConnectingAlpha,
			"connecting-beta" => Status::ConnectingBeta,
			"watching" => Status::Watching,
			"scanning" => Status::Scanning,
			"waiting-for-rescan" => Status::WaitingForRescan,
			"reconciling" => Status::Reconciling,
			"staging-alpha" => Status::StagingAlpha,
			"staging-beta" => Status::StagingBeta,
			"transitioning" => Status::Transitioning,
			"saving" => Status::Saving,
			other => Status::Other(other.to_string()),
		}
	}

	/// Wire name, as the daemon spells it
	pub fn name(&self) -> &str {
		match self {
			Status::Disconnected => "disconnected",
			Status::HaltedOnRootEmptied => "halted-on-root-emptied",
			Status::HaltedOnRootDeletion => "halted-on-root-deletion",
			Status::HaltedOnRootTypeChange => "halted-on-root-type-change",
			Status::ConnectingAlpha => "connecting-alpha",
			Status::ConnectingBeta => "connecting-beta",
			Status::Watching => "watching",
			Status::Scanning => "scanning",
			Status::WaitingForRescan => "waiting-for-rescan",
			Status::Reconciling => "reconciling",
			Status::StagingAlpha => "staging-alpha",
			Status::StagingBeta => "staging-beta",
			Status::Transitioning => "transitioning",
			Status::Saving => "saving",
			Status::Other(name) => name,
		}
	}

	/// Human-readable description for tooltips
	pub fn description(&self) -> String {
		let text = match self {
			Status::Disconnected => "Disconnected",
			Status::HaltedOnRootEmptied => "Halted due to root emptying",
			Status::HaltedOnRootDeletion => "Halted due to root deletion",
			Status::HaltedOnRootTypeChange => "Halted due to root type change",
			Status::ConnectingAlpha => "Connecting to alpha",
			Status::ConnectingBeta => "Connecting to beta",
			Status::Watching => "Watching for changes",
			Status::Scanning => "Scanning files",
			Status::WaitingForRescan => "Waiting for rescan",
			Status::Reconciling => "Reconciling changes",
			Status::StagingAlpha => "Staging files on alpha",
			Status::StagingBeta => "Staging files on beta",
			Status::Transitioning => "Applying changes",
			Status::Saving => "Saving archive",
			Status::Other(name) => return format!("Unknown status ({})", name),
		};
		text.to_string()
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

/// Synchronization mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncMode {
	TwoWaySafe,
	TwoWayResolved,
	OneWaySafe,
	OneWayReplica,
	#[default]
	Unspecified,
}

impl SyncMode {
	pub fn parse(name: &str) -> SyncMode {
		match name {
			"two-way-safe" => SyncMode::TwoWaySafe,
			"two-way-resolved" => SyncMode::TwoWayResolved,
			"one-way-safe" => SyncMode::OneWaySafe,
			"one-way-replica" => SyncMode::OneWayReplica,
			_ => SyncMode::Unspecified,
		}
	}
}

/// One side of a session
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
	/// Remote host, empty for local endpoints
	pub host: String,
	pub path: String,
}

impl Endpoint {
	pub fn new(host: &str, path: &str) -> Self {
		Endpoint { host: host.to_string(), path: path.to_string() }
	}

	pub fn local(path: &str) -> Self {
		Endpoint { host: String::new(), path: path.to_string() }
	}

	pub fn is_remote(&self) -> bool {
		!self.host.is_empty()
	}
}

impl fmt::Display for Endpoint {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		if self.is_remote() {
			write!(f, "{}:{}", self.host, self.path)
		} else {
			f.write_str(&self.path)
		}
	}
}

/// A change on one side of a conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
	pub path: String,
}

/// A divergence the daemon could not merge
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Conflict {
	pub root: String,
	pub alpha_changes: Vec<Change>,
	pub beta_changes: Vec<Change>,
}

impl Conflict {
	/// Paths this conflict touches, preferring the beta side
	pub fn paths(&self) -> Vec<&str> {
		let beta: Vec<&str> = self
			.beta_changes
			.iter()
			.map(|c| c.path.as_str())
			.filter(|p| !p.is_empty())
			.collect();
		if !beta.is_empty() {
			return beta;
		}

		let alpha: Vec<&str> = self
			.alpha_changes
			.iter()
			.map(|c| c.path.as_str())
			.filter(|p| !p.is_empty())
			.collect();
		if !alpha.is_empty() {
			return alpha;
		}

		if self.root.is_empty() {
			vec![]
		} else {
			vec![self.root.as_str()]
		}
	}
}

/// Validated state of one synchronization session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
	pub identifier: String,
	pub name: String,
	pub status: Status,
	pub mode: SyncMode,
	pub conflicts: Vec<Conflict>,
	pub paused: bool,
	pub last_error: String,
	pub alpha: Endpoint,
	pub beta: Endpoint,
}

impl SessionState {
	/// Minimal state, mostly useful for building fixtures
	pub fn new(identifier: &str, status: Status, alpha: Endpoint, beta: Endpoint) -> Self {
		SessionState {
			identifier: identifier.to_string(),
			name: String::new(),
			status,
			mode: SyncMode::Unspecified,
			conflicts: vec![],
			paused: false,
			last_error: String::new(),
			alpha,
			beta,
		}
	}

	pub fn with_mode(mut self, mode: SyncMode) -> Self {
		self.mode = mode;
		self
	}

	pub fn with_conflicts(mut self, conflicts: Vec<Conflict>) -> Self {
		self.conflicts = conflicts;
		self
	}

	/// Human-readable label for the session's indicator
	pub fn label(&self) -> String {
		self.beta.to_string()
	}

	/// All conflicting paths in listing order, without duplicates
	pub fn conflict_paths(&self) -> Vec<String> {
		let mut seen = std::collections::HashSet::new();
		let mut paths = Vec::new();
		for conflict in &self.conflicts {
			for path in conflict.paths() {
				if seen.insert(path) {
					paths.push(path.to_string());
				}
			}
		}
		paths
	}

	/// Beta-side paths only; these are what an overwrite copies
	pub fn beta_conflict_paths(&self) -> Vec<String> {
		let mut seen = std::collections::HashSet::new();
		let mut paths = Vec::new();
		for change in self.conflicts.iter().flat_map(|c| c.beta_changes.iter()) {
			if !change.path.is_empty() && seen.insert(change.path.as_str()) {
				paths.push(change.path.clone());
			}
		}
		paths
	}
}

// ============================================================================
// WIRE RECORDS
// ============================================================================

/// Session entry as listed by the daemon
///
/// Every field is optional so that one broken entry never fails the
/// whole listing; validation happens in `SessionState::try_from`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionRecord {
	pub identifier: Option<String>,
	pub name: Option<String>,
	pub status: Option<String>,
	pub mode: Option<String>,
	pub paused: bool,
	pub last_error: Option<String>,
	pub alpha: Option<EndpointRecord>,
	pub beta: Option<EndpointRecord>,
	pub conflicts: Option<Vec<ConflictRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EndpointRecord {
	pub host: Option<String>,
	pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConflictRecord {
	pub root: Option<String>,
	pub alpha_changes: Option<Vec<ChangeRecord>>,
	pub beta_changes: Option<Vec<ChangeRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ChangeRecord {
	pub path: Option<String>,
}

/// A listing entry that could not be turned into a `SessionState`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedEntry {
	/// Position in the daemon's listing
	pub index: usize,
	pub identifier: Option<String>,
	pub reason: String,
}

impl fmt::Display for MalformedEntry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.identifier {
			Some(id) => write!(f, "session entry {} ({}): {}", self.index, id, self.reason),
			None => write!(f, "session entry {}: {}", self.index, self.reason),
		}
	}
}

impl std::error::Error for MalformedEntry {}

fn convert_changes(changes: Option<Vec<ChangeRecord>>) -> Vec<Change> {
	changes
		.unwrap_or_default()
		.into_iter()
		.filter_map(|c| c.path)
		.map(|path| Change { path })
		.collect()
}

impl TryFrom<SessionRecord> for SessionState {
	type Error = String;

	fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
		let identifier = match record.identifier {
			Some(id) if !id.is_empty() => id,
			_ => return Err("missing session identifier".to_string()),
		};
		let status = match record.status {
			Some(s) if !s.is_empty() => Status::parse(&s),
			_ => return Err("missing status".to_string()),
		};
		let beta = record.beta.ok_or_else(|| "missing beta endpoint".to_string())?;
		let alpha = record.alpha.unwrap_or_default();

		let conflicts = record
			.conflicts
			.unwrap_or_default()
			.into_iter()
			.map(|c| Conflict {
				root: c.root.unwrap_or_default(),
				alpha_changes: convert_changes(c.alpha_changes),
				beta_changes: convert_changes(c.beta_changes),
			})
			.collect();

		Ok(SessionState {
			identifier,
			name: record.name.unwrap_or_default(),
			status,
			mode: record.mode.as_deref().map(SyncMode::parse).unwrap_or_default(),
			conflicts,
			paused: record.paused,
			last_error: record.last_error.unwrap_or_default(),
			alpha: Endpoint {
				host: alpha.host.unwrap_or_default(),
				path: alpha.path.unwrap_or_default(),
			},
			beta: Endpoint {
				host: beta.host.unwrap_or_default(),
				path: beta.path.unwrap_or_default(),
			},
		})
	}
}

// ============================================================================
// SNAPSHOT
// ============================================================================

/// States of all sessions from a single poll, keyed by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
	sessions: BTreeMap<String, SessionState>,
}

impl Snapshot {
	pub fn new() -> Self {
		Snapshot::default()
	}

	/// Build a snapshot from a raw listing
	///
	/// Entries that fail validation are returned alongside the snapshot and
	/// are not part of it. A repeated identifier keeps the later entry.
	pub fn from_records(records: Vec<SessionRecord>) -> (Snapshot, Vec<MalformedEntry>) {
		let mut snapshot = Snapshot::new();
		let mut malformed = Vec::new();

		for (index, record) in records.into_iter().enumerate() {
			let identifier = record.identifier.clone().filter(|id| !id.is_empty());
			match SessionState::try_from(record) {
				Ok(state) => snapshot.insert(state),
				Err(reason) => malformed.push(MalformedEntry { index, identifier, reason }),
			}
		}

		(snapshot, malformed)
	}

	pub fn insert(&mut self, state: SessionState) {
		self.sessions.insert(state.identifier.clone(), state);
	}

	pub fn get(&self, id: &str) -> Option<&SessionState> {
		self.sessions.get(id)
	}

	pub fn contains(&self, id: &str) -> bool {
		self.sessions.contains_key(id)
	}

	pub fn len(&self) -> usize {
		self.sessions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.sessions.is_empty()
	}

	pub fn ids(&self) -> impl Iterator<Item = &String> {
		self.sessions.keys()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &SessionState)> {
		self.sessions.iter()
	}
}

impl std::iter::FromIterator<SessionState> for Snapshot {
	fn from_iter<I: IntoIterator<Item = SessionState>>(iter: I) -> Self {
		let mut snapshot = Snapshot::new();
		for state in iter {
			snapshot.insert(state);
		}
		snapshot
	}
}

impl IntoIterator for Snapshot {
	type Item = (String, SessionState);
	type IntoIter = std::collections::btree_map::IntoIter<String, SessionState>;

	fn into_iter(self) -> Self::IntoIter {
		self.sessions.into_iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const LISTING: &str = r#"[
		{
			"identifier": "sync_abc",
			"name": "web",
			"mode": "one-way-safe",
			"status": "watching",
			"paused": false,
			"lastError": "",
			"alpha": { "protocol": "local", "path": "/home/me/web", "connected": true },
			"beta": { "protocol": "ssh", "host": "devbox", "path": "/srv/web", "connected": true },
			"conflicts": [
				{
					"root": "src",
					"alphaChanges": [ { "path": "src/a.rs", "new": null } ],
					"betaChanges": [ { "path": "src/a.rs" }, { "path": "src/b.rs" } ]
				}
			]
		},
		{ "name": "no-id", "status": "watching", "beta": { "path": "/tmp" } },
		{ "identifier": "sync_def", "status": "some-future-status", "beta": { "path": "/data" } }
	]"#;

	#[test]
	fn test_parse_listing() {
		let records: Vec<SessionRecord> = serde_json::from_str(LISTING).unwrap();
		let (snapshot, malformed) = Snapshot::from_records(records);

		assert_eq!(snapshot.len(), 2);
		assert_eq!(malformed.len(), 1);
		assert_eq!(malformed[0].index, 1);
		assert_eq!(malformed[0].identifier, None);

		let web = snapshot.get("sync_abc").unwrap();
		assert_eq!(web.status, Status::Watching);
		assert_eq!(web.mode, SyncMode::OneWaySafe);
		assert_eq!(web.label(), "devbox:/srv/web");
		assert_eq!(web.alpha, Endpoint::local("/home/me/web"));
		assert_eq!(web.conflicts.len(), 1);
		assert_eq!(web.conflict_paths(), vec!["src/a.rs", "src/b.rs"]);

		let data = snapshot.get("sync_def").unwrap();
		assert_eq!(data.status, Status::Other("some-future-status".to_string()));
		assert_eq!(data.label(), "/data");
	}

	#[test]
	fn test_missing_status_is_malformed() {
		let record = SessionRecord {
			identifier: Some("sync_x".to_string()),
			beta: Some(EndpointRecord::default()),
			..Default::default()
		};
		let (snapshot, malformed) = Snapshot::from_records(vec![record]);
		assert!(snapshot.is_empty());
		assert_eq!(malformed[0].identifier.as_deref(), Some("sync_x"));
		assert_eq!(malformed[0].reason, "missing status");
	}

	#[test]
	fn test_duplicate_identifier_keeps_last() {
		let first = SessionRecord {
			identifier: Some("sync_x".to_string()),
			status: Some("scanning".to_string()),
			beta: Some(EndpointRecord::default()),
			..Default::default()
		};
		let second = SessionRecord { status: Some("watching".to_string()), ..first.clone() };
		let (snapshot, malformed) = Snapshot::from_records(vec![first, second]);
		assert!(malformed.is_empty());
		assert_eq!(snapshot.get("sync_x").unwrap().status, Status::Watching);
	}

	#[test]
	fn test_status_names_round_trip() {
		for status in Status::KNOWN.iter() {
			assert_eq!(&Status::parse(status.name()), status);
		}
	}

	#[test]
	fn test_conflict_paths_fallback() {
		let alpha_only = Conflict {
			root: "docs".to_string(),
			alpha_changes: vec![Change { path: "docs/x.md".to_string() }],
			beta_changes: vec![],
		};
		assert_eq!(alpha_only.paths(), vec!["docs/x.md"]);

		let root_only = Conflict { root: "docs".to_string(), ..Default::default() };
		assert_eq!(root_only.paths(), vec!["docs"]);
		assert!(Conflict::default().paths().is_empty());
	}

	#[test]
	fn test_beta_conflict_paths_skip_alpha_side() {
		let state = SessionState::new(
			"s",
			Status::Watching,
			Endpoint::local("/a"),
			Endpoint::new("h", "/b"),
		)
		.with_conflicts(vec![
			Conflict {
				root: "x".to_string(),
				alpha_changes: vec![Change { path: "x/alpha".to_string() }],
				beta_changes: vec![],
			},
			Conflict {
				root: "y".to_string(),
				alpha_changes: vec![],
				beta_changes: vec![
					Change { path: "y/1".to_string() },
					Change { path: "y/1".to_string() },
				],
			},
		]);
		assert_eq!(state.beta_conflict_paths(), vec!["y/1"]);
		assert_eq!(state.conflict_paths(), vec!["x/alpha", "y/1"]);
	}
}

// vim: ts=4
