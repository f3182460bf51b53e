//! Rendering surface for indicators
//!
//! The engine only talks to the `Tray` trait. `LogTray` renders through
//! tracing for headless operation, `MemoryTray` keeps everything in memory
//! so that the rendered state can be inspected.

use crate::logging::*;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Stable handle of a menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// Operations a visual toolkit must provide
pub trait Tray: Send {
	/// Add a top-level indicator entry
	fn create_indicator(&mut self, label: &str) -> EntryId;

	/// Add an entry below `parent`
	fn create_sub_entry(&mut self, parent: EntryId, label: &str) -> EntryId;

	fn set_icon(&mut self, entry: EntryId, icon: &[u8]);

	fn set_tooltip(&mut self, entry: EntryId, text: &str);

	/// Remove an entry from view; the handle is never reused
	fn hide(&mut self, entry: EntryId);

	/// Text shown next to the application icon
	fn set_summary_label(&mut self, text: &str);

	/// Application icon, set once at startup
	fn set_app_icon(&mut self, _icon: &[u8]) {}
}

/// Allocates monotonically increasing entry handles
#[derive(Debug, Default)]
struct IdAllocator {
	next: u64,
}

impl IdAllocator {
	fn allocate(&mut self) -> EntryId {
		self.next += 1;
		EntryId(self.next)
	}
}

// ============================================================================
// LOG TRAY
// ============================================================================

/// Surface that renders every change as a log line
#[derive(Debug, Default)]
pub struct LogTray {
	ids: IdAllocator,
	labels: HashMap<EntryId, String>,
}

impl LogTray {
	pub fn new() -> Self {
		LogTray::default()
	}

	fn label(&self, entry: EntryId) -> &str {
		self.labels.get(&entry).map(|s| s.as_str()).unwrap_or("?")
	}
}

impl Tray for LogTray {
	fn create_indicator(&mut self, label: &str) -> EntryId {
		let id = self.ids.allocate();
		self.labels.insert(id, label.to_string());
		info!("[{}] {}", id, label);
		id
	}

	fn create_sub_entry(&mut self, parent: EntryId, label: &str) -> EntryId {
		let id = self.ids.allocate();
		self.labels.insert(id, label.to_string());
		debug!("[{}]   {} (under {})", id, label, parent);
		id
	}

	fn set_icon(&mut self, entry: EntryId, icon: &[u8]) {
		debug!("[{}] {}: icon ({} bytes)", entry, self.label(entry), icon.len());
	}

	fn set_tooltip(&mut self, entry: EntryId, text: &str) {
		info!("[{}] {}: {}", entry, self.label(entry), text.trim_end().replace('\n', " | "));
	}

	fn hide(&mut self, entry: EntryId) {
		if let Some(label) = self.labels.remove(&entry) {
			debug!("[{}] {}: hidden", entry, label);
		}
	}

	fn set_summary_label(&mut self, text: &str) {
		info!("no conflict / connected / total: {}", text);
	}
}

// ============================================================================
// MEMORY TRAY
// ============================================================================

/// One entry of a `MemoryTray`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryEntry {
	pub parent: Option<EntryId>,
	pub label: String,
	pub tooltip: Option<String>,
	pub icon: Option<Vec<u8>>,
	pub visible: bool,
}

/// Surface that records the rendered state in memory
#[derive(Debug, Default)]
pub struct MemoryTray {
	ids: IdAllocator,
	entries: BTreeMap<EntryId, MemoryEntry>,
	summary: Option<String>,
	app_icon: Option<Vec<u8>>,
	calls: usize,
	summary_updates: usize,
}

impl MemoryTray {
	pub fn new() -> Self {
		MemoryTray::default()
	}

	pub fn entry(&self, entry: EntryId) -> Option<&MemoryEntry> {
		self.entries.get(&entry)
	}

	/// Visible top-level entries, in creation order
	pub fn visible_indicators(&self) -> Vec<(EntryId, &MemoryEntry)> {
		self.entries
			.iter()
			.filter(|(_, e)| e.visible && e.parent.is_none())
			.map(|(id, e)| (*id, e))
			.collect()
	}

	/// Visible entries below `parent`, in creation order
	pub fn visible_children(&self, parent: EntryId) -> Vec<(EntryId, &MemoryEntry)> {
		self.entries
			.iter()
			.filter(|(_, e)| e.visible && e.parent == Some(parent))
			.map(|(id, e)| (*id, e))
			.collect()
	}

	pub fn summary(&self) -> Option<&str> {
		self.summary.as_deref()
	}

	pub fn app_icon(&self) -> Option<&[u8]> {
		self.app_icon.as_deref()
	}

	/// Number of entry operations (create, icon, tooltip, hide) so far
	pub fn calls(&self) -> usize {
		self.calls
	}

	pub fn summary_updates(&self) -> usize {
		self.summary_updates
	}

	fn insert(&mut self, parent: Option<EntryId>, label: &str) -> EntryId {
		let id = self.ids.allocate();
		self.entries.insert(
			id,
			MemoryEntry {
				parent,
				label: label.to_string(),
				tooltip: None,
				icon: None,
				visible: true,
			},
		);
		self.calls += 1;
		id
	}
}

impl Tray for MemoryTray {
	fn create_indicator(&mut self, label: &str) -> EntryId {
		self.insert(None, label)
	}

	fn create_sub_entry(&mut self, parent: EntryId, label: &str) -> EntryId {
		self.insert(Some(parent), label)
	}

	fn set_icon(&mut self, entry: EntryId, icon: &[u8]) {
		self.calls += 1;
		if let Some(e) = self.entries.get_mut(&entry) {
			e.icon = Some(icon.to_vec());
		}
	}

	fn set_tooltip(&mut self, entry: EntryId, text: &str) {
		self.calls += 1;
		if let Some(e) = self.entries.get_mut(&entry) {
			e.tooltip = Some(text.to_string());
		}
	}

	fn hide(&mut self, entry: EntryId) {
		self.calls += 1;
		if let Some(e) = self.entries.get_mut(&entry) {
			e.visible = false;
		}
	}

	fn set_summary_label(&mut self, text: &str) {
		self.summary_updates += 1;
		self.summary = Some(text.to_string());
	}

	fn set_app_icon(&mut self, icon: &[u8]) {
		self.app_icon = Some(icon.to_vec());
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_memory_tray_tracks_entries() {
		let mut tray = MemoryTray::new();
		let parent = tray.create_indicator("host:/srv");
		let child = tray.create_sub_entry(parent, "a.txt");
		tray.set_tooltip(parent, "Watching");
		tray.set_icon(parent, b"ok");

		assert_ne!(parent, child);
		assert_eq!(tray.visible_indicators().len(), 1);
		assert_eq!(tray.visible_children(parent)[0].1.label, "a.txt");
		assert_eq!(tray.entry(parent).unwrap().tooltip.as_deref(), Some("Watching"));
		assert_eq!(tray.calls(), 4);

		tray.hide(child);
		assert!(tray.visible_children(parent).is_empty());
		assert!(!tray.entry(child).unwrap().visible);
	}

	#[test]
	fn test_summary_not_counted_as_entry_call() {
		let mut tray = MemoryTray::new();
		tray.set_summary_label("1-1-1");
		assert_eq!(tray.calls(), 0);
		assert_eq!(tray.summary_updates(), 1);
		assert_eq!(tray.summary(), Some("1-1-1"));
	}

	#[test]
	fn test_log_tray_allocates_distinct_ids() {
		let mut tray = LogTray::new();
		let a = tray.create_indicator("a");
		let b = tray.create_sub_entry(a, "b");
		assert_ne!(a, b);
		tray.hide(b);
		tray.hide(b);
		assert_eq!(tray.label(b), "?");
	}
}

// vim: ts=4
