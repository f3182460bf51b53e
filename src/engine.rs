//! Reconciliation engine
//!
//! Turns each poll's snapshot into create/update/hide calls on a `Tray`,
//! keeping exactly one indicator per live session identifier. Redraws are
//! limited to sessions whose status or conflict count changed, and conflict
//! sub-entries are diffed by path so that a path listed in consecutive
//! passes keeps its entry.

use crate::classify::{classify, has_conflicts, is_bad, Category, IconKind};
use crate::icons::IconSet;
use crate::logging::*;
use crate::render::{overflow_label, shorten_path, summary_label, tooltip, ConflictListing};
use crate::session::{SessionState, Snapshot};
use crate::tray::{EntryId, Tray};
use std::collections::{BTreeMap, HashMap};

/// Engine options
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
	/// Clicks trigger resolution actions; controls tooltip hints
	pub clickable: bool,
}

impl Default for EngineOptions {
	fn default() -> Self {
		EngineOptions { clickable: true }
	}
}

/// Visible proxy of one session
#[derive(Debug)]
pub struct Indicator {
	entry: EntryId,

	/// State as of the last redraw
	rendered: SessionState,

	/// State as of the last poll
	latest: SessionState,

	/// Conflict path -> sub-entry
	conflict_entries: BTreeMap<String, EntryId>,

	/// "... and N more" entry, with its N
	overflow: Option<(usize, EntryId)>,
}

impl Indicator {
	pub fn entry(&self) -> EntryId {
		self.entry
	}

	pub fn rendered(&self) -> &SessionState {
		&self.rendered
	}

	pub fn latest(&self) -> &SessionState {
		&self.latest
	}

	/// Sub-entry currently showing `path`
	pub fn conflict_entry(&self, path: &str) -> Option<EntryId> {
		self.conflict_entries.get(path).copied()
	}

	pub fn conflict_entry_count(&self) -> usize {
		self.conflict_entries.len()
	}

	pub fn overflow_entry(&self) -> Option<EntryId> {
		self.overflow.map(|(_, id)| id)
	}

	fn needs_redraw(&self, state: &SessionState) -> bool {
		self.rendered.status != state.status
			|| self.rendered.conflicts.len() != state.conflicts.len()
	}
}

/// Session counts behind the summary label
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregateCounters {
	pub total: usize,

	/// Disconnected or halted
	pub bad: usize,

	/// At least one conflict
	pub conflicted: usize,

	/// Neither bad nor conflicted
	pub healthy: usize,

	/// Any session is actively synchronizing
	pub syncing: bool,
}

impl AggregateCounters {
	fn add(&mut self, state: &SessionState) {
		let category = classify(&state.status);
		let bad = is_bad(category);
		let conflicted = has_conflicts(state);

		self.total += 1;
		if bad {
			self.bad += 1;
		}
		if conflicted {
			self.conflicted += 1;
		}
		if !bad && !conflicted {
			self.healthy += 1;
		}
		if category == Category::Syncing {
			self.syncing = true;
		}
	}

	pub fn label(&self) -> String {
		summary_label(self.healthy, self.total - self.bad, self.total, self.syncing)
	}
}

/// What one reconciliation pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub created: usize,
	pub updated: usize,
	pub removed: usize,
	pub unchanged: usize,
}

impl ReconcileReport {
	pub fn changed(&self) -> bool {
		self.created + self.updated + self.removed > 0
	}
}

/// Keeps the tray in step with the daemon's sessions
pub struct ReconciliationEngine<T: Tray> {
	tray: T,
	icons: IconSet,
	options: EngineOptions,
	indicators: BTreeMap<String, Indicator>,

	/// Top-level entry -> session identifier, for click lookup
	entries: HashMap<EntryId, String>,

	/// Counters behind the label currently shown, None before the first pass
	published: Option<AggregateCounters>,
}

impl<T: Tray> ReconciliationEngine<T> {
	pub fn new(mut tray: T, icons: IconSet, options: EngineOptions) -> Self {
		tray.set_app_icon(icons.get(IconKind::App));
		ReconciliationEngine {
			tray,
			icons,
			options,
			indicators: BTreeMap::new(),
			entries: HashMap::new(),
			published: None,
		}
	}

	/// Bring the indicators in line with `snapshot`
	///
	/// When this returns, the set of indicator keys equals the set of
	/// identifiers in `snapshot`.
	pub fn reconcile(&mut self, snapshot: Snapshot) -> ReconcileReport {
		let mut report = ReconcileReport::default();

		let mut live = Vec::with_capacity(snapshot.len());
		for (id, state) in snapshot {
			live.push(id.clone());

			match self.indicators.get_mut(&id) {
				None => {
					let entry = self.tray.create_indicator(&state.label());
					info!("Session {} appeared: {} ({})", id, state.label(), state.status);
					let mut indicator = Indicator {
						entry,
						rendered: state.clone(),
						latest: state,
						conflict_entries: BTreeMap::new(),
						overflow: None,
					};
					draw(&mut self.tray, &self.icons, self.options, &mut indicator);
					self.entries.insert(entry, id.clone());
					self.indicators.insert(id, indicator);
					report.created += 1;
				}
				Some(indicator) => {
					if indicator.needs_redraw(&state) {
						info!(
							"Session {} changed: {} -> {}, {} conflict(s)",
							id,
							indicator.rendered.status,
							state.status,
							state.conflicts.len()
						);
						indicator.rendered = state.clone();
						indicator.latest = state;
						draw(&mut self.tray, &self.icons, self.options, indicator);
						report.updated += 1;
					} else {
						indicator.latest = state;
						report.unchanged += 1;
					}
				}
			}
		}

		live.sort();
		let gone: Vec<String> = self
			.indicators
			.keys()
			.filter(|id| live.binary_search(*id).is_err())
			.cloned()
			.collect();
		for id in gone {
			if let Some(indicator) = self.indicators.remove(&id) {
				info!("Session {} disappeared", id);
				self.entries.remove(&indicator.entry);
				teardown(&mut self.tray, indicator);
				report.removed += 1;
			}
		}

		self.publish_summary();

		debug!(
			"Reconciled {} session(s): {} created, {} updated, {} removed, {} unchanged",
			self.indicators.len(),
			report.created,
			report.updated,
			report.removed,
			report.unchanged
		);
		report
	}

	/// Hide every indicator and forget all sessions
	///
	/// Returns the number of indicators hidden. The next `reconcile`
	/// starts from scratch and publishes the summary again.
	pub fn clear(&mut self) -> usize {
		let indicators = std::mem::take(&mut self.indicators);
		let count = indicators.len();
		for (_, indicator) in indicators {
			teardown(&mut self.tray, indicator);
		}
		self.entries.clear();
		self.published = None;
		count
	}

	fn publish_summary(&mut self) {
		let counters = self.recount();
		if self.published == Some(counters) {
			return;
		}
		let label = counters.label();
		debug!(
			"Summary {} (total {}, bad {}, conflicted {})",
			label, counters.total, counters.bad, counters.conflicted
		);
		self.tray.set_summary_label(&label);
		self.published = Some(counters);
	}

	/// Counters over the live indicator set
	pub fn recount(&self) -> AggregateCounters {
		let mut counters = AggregateCounters::default();
		for indicator in self.indicators.values() {
			counters.add(&indicator.latest);
		}
		counters
	}

	/// Counters behind the label currently shown
	pub fn counters(&self) -> AggregateCounters {
		self.published.unwrap_or_default()
	}

	pub fn len(&self) -> usize {
		self.indicators.len()
	}

	pub fn is_empty(&self) -> bool {
		self.indicators.is_empty()
	}

	pub fn contains(&self, id: &str) -> bool {
		self.indicators.contains_key(id)
	}

	pub fn ids(&self) -> impl Iterator<Item = &String> {
		self.indicators.keys()
	}

	pub fn indicator(&self, id: &str) -> Option<&Indicator> {
		self.indicators.get(id)
	}

	pub fn entry_for(&self, id: &str) -> Option<EntryId> {
		self.indicators.get(id).map(|i| i.entry)
	}

	/// Last polled state of the session owning `entry`
	///
	/// `None` once the session's indicator has been removed.
	pub fn session_for_entry(&self, entry: EntryId) -> Option<&SessionState> {
		let id = self.entries.get(&entry)?;
		self.indicators.get(id).map(|i| &i.latest)
	}

	pub fn options(&self) -> EngineOptions {
		self.options
	}

	pub fn tray(&self) -> &T {
		&self.tray
	}

	pub fn tray_mut(&mut self) -> &mut T {
		&mut self.tray
	}
}

/// Full redraw of an indicator from its rendered state
fn draw<T: Tray>(
	tray: &mut T,
	icons: &IconSet,
	options: EngineOptions,
	indicator: &mut Indicator,
) {
	let state = &indicator.rendered;
	tray.set_tooltip(indicator.entry, &tooltip(state, options.clickable));
	tray.set_icon(indicator.entry, icons.get(IconKind::for_state(state)));

	let listing = ConflictListing::for_state(state);

	// Vanished paths first, so their entries never linger next to new ones
	let gone: Vec<String> = indicator
		.conflict_entries
		.keys()
		.filter(|path| !listing.shown.contains(*path))
		.cloned()
		.collect();
	for path in gone {
		if let Some(sub) = indicator.conflict_entries.remove(&path) {
			tray.hide(sub);
		}
	}

	let mut added = false;
	for path in &listing.shown {
		if !indicator.conflict_entries.contains_key(path) {
			let sub = tray.create_sub_entry(indicator.entry, &shorten_path(path));
			indicator.conflict_entries.insert(path.clone(), sub);
			added = true;
		}
	}

	// The overflow entry must stay last, so new paths push it down
	let current = indicator.overflow;
	match current {
		Some((hidden, _)) if hidden == listing.hidden && !added => {}
		current => {
			if let Some((_, sub)) = current {
				tray.hide(sub);
			}
			indicator.overflow = if listing.hidden > 0 {
				let sub = tray.create_sub_entry(indicator.entry, &overflow_label(listing.hidden));
				Some((listing.hidden, sub))
			} else {
				None
			};
		}
	}
}

fn teardown<T: Tray>(tray: &mut T, indicator: Indicator) {
	for sub in indicator.conflict_entries.values() {
		tray.hide(*sub);
	}
	if let Some((_, sub)) = indicator.overflow {
		tray.hide(sub);
	}
	tray.hide(indicator.entry);
}


// vim: ts=4
