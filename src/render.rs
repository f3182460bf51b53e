//! Tooltip text and conflict listings

use crate::resolve::ClickAction;
use crate::session::SessionState;

/// Maximum number of conflict paths listed one by one
pub const MAX_LISTED_CONFLICTS: usize = 20;

/// Paths longer than this are shortened for display
pub const MAX_PATH_DISPLAY: usize = 40;

const PATH_PREFIX_KEEP: usize = 20;
const PATH_SUFFIX_KEEP: usize = 15;
const ELLIPSIS: &str = " ... ";

const LISTING_HEADER: &str = "Conflicts: (click to overwrite)";
const LISTING_RULE: &str = "⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺⎺";

/// Shorten a path to `<prefix> ... <suffix>` when it is too long to show
pub fn shorten_path(path: &str) -> String {
	let len = path.chars().count();
	if len <= MAX_PATH_DISPLAY {
		return path.to_string();
	}
	let prefix: String = path.chars().take(PATH_PREFIX_KEEP).collect();
	let suffix: String = path.chars().skip(len - PATH_SUFFIX_KEEP).collect();
	format!("{}{}{}", prefix, ELLIPSIS, suffix)
}

/// `1 conflict`, `2 conflicts`
pub fn pluralize_conflicts(count: usize) -> String {
	if count == 1 {
		"1 conflict".to_string()
	} else {
		format!("{} conflicts", count)
	}
}

/// Label of the entry collecting paths past the listing cap
pub fn overflow_label(hidden: usize) -> String {
	format!("... and {} more", hidden)
}

/// Conflict paths split at the listing cap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictListing {
	/// Full paths shown individually, in order
	pub shown: Vec<String>,

	/// How many paths were collapsed into the overflow line
	pub hidden: usize,
}

impl ConflictListing {
	pub fn for_state(state: &SessionState) -> Self {
		let mut shown = state.conflict_paths();
		let hidden = shown.len().saturating_sub(MAX_LISTED_CONFLICTS);
		shown.truncate(MAX_LISTED_CONFLICTS);
		ConflictListing { shown, hidden }
	}
}

/// Tooltip text for a session's indicator
///
/// `clickable` is false when the monitor runs without resolution actions,
/// in which case no click hint is rendered.
pub fn tooltip(state: &SessionState, clickable: bool) -> String {
	let mut msg = String::new();

	if clickable {
		if let ClickAction::Overwrite(_) = ClickAction::for_state(state) {
			let listing = ConflictListing::for_state(state);
			msg.push_str(LISTING_HEADER);
			msg.push('\n');
			msg.push_str(LISTING_RULE);
			msg.push('\n');
			for path in &listing.shown {
				msg.push_str(&shorten_path(path));
				msg.push('\n');
			}
			if listing.hidden > 0 {
				msg.push_str(&overflow_label(listing.hidden));
				msg.push('\n');
			}
			return msg;
		}
	}

	msg.push_str(&state.status.description());
	if state.paused {
		msg.push_str(" (paused)");
	}
	msg.push('\n');

	if !state.conflicts.is_empty() {
		msg.push_str(&pluralize_conflicts(state.conflicts.len()));
		msg.push('\n');
	}
	if !state.last_error.is_empty() {
		msg.push_str("Error: ");
		msg.push_str(&state.last_error);
		msg.push('\n');
	}
	if clickable {
		msg.push_str("Click to force flush\n");
	}
	msg
}

/// Summary label: `<healthy>-<connected>-<total>`, `*` while syncing
pub fn summary_label(healthy: usize, connected: usize, total: usize, syncing: bool) -> String {
	let mut label = format!("{}-{}-{}", healthy, connected, total);
	if syncing {
		label.push('*');
	}
	label
}


// vim: ts=4
