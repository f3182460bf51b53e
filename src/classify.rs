//! Status classification rules
//!
//! Maps the daemon's status enumeration onto the handful of categories the
//! monitor displays. Everything here is pure.

use crate::session::{SessionState, Status};

/// Semantic category of a session status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
	/// No active link to the peer
	Disconnected,

	/// Halted and will not recover on its own
	Fatal,

	/// Actively scanning, staging or applying changes
	Syncing,

	/// Idle and connected, watching for changes
	Watching,

	/// Anything not listed above
	Unknown,
}

/// Classify a status
pub fn classify(status: &Status) -> Category {
	match status {
		Status::Disconnected | Status::ConnectingBeta => Category::Disconnected,
		Status::HaltedOnRootEmptied
		| Status::HaltedOnRootDeletion
		| Status::HaltedOnRootTypeChange => Category::Fatal,
		Status::ConnectingAlpha
		| Status::Scanning
		| Status::Reconciling
		| Status::StagingAlpha
		| Status::StagingBeta
		| Status::Transitioning
		| Status::Saving => Category::Syncing,
		Status::Watching | Status::WaitingForRescan => Category::Watching,
		Status::Other(_) => Category::Unknown,
	}
}

/// Whether the session reports any conflict
pub fn has_conflicts(state: &SessionState) -> bool {
	!state.conflicts.is_empty()
}

/// Disconnected and fatal sessions count as bad in the summary
pub fn is_bad(category: Category) -> bool {
	matches!(category, Category::Disconnected | Category::Fatal)
}

/// Icon shown for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IconKind {
	Conflict,
	Disconnected,
	Fatal,
	Syncing,
	Ok,
	Unknown,
	/// Application icon
	App,
}

impl IconKind {
	pub const ALL: [IconKind; 7] = [
		IconKind::Conflict,
		IconKind::Disconnected,
		IconKind::Fatal,
		IconKind::Syncing,
		IconKind::Ok,
		IconKind::Unknown,
		IconKind::App,
	];

	/// Logical asset name
	pub fn name(self) -> &'static str {
		match self {
			IconKind::Conflict => "conflict",
			IconKind::Disconnected => "disconnected",
			IconKind::Fatal => "fatal",
			IconKind::Syncing => "syncing",
			IconKind::Ok => "ok",
			IconKind::Unknown => "unknown",
			IconKind::App => "icon",
		}
	}

	/// Pick the icon for a session; a conflict outranks every status
	pub fn for_state(state: &SessionState) -> IconKind {
		if has_conflicts(state) {
			return IconKind::Conflict;
		}
		match classify(&state.status) {
			Category::Disconnected => IconKind::Disconnected,
			Category::Fatal => IconKind::Fatal,
			Category::Syncing => IconKind::Syncing,
			Category::Watching => IconKind::Ok,
			Category::Unknown => IconKind::Unknown,
		}
	}
}


// vim: ts=4
