//! Icon assets
//!
//! Icons are looked up by logical name as `<dir>/<name>.png`. A missing or
//! unreadable file falls back to the built-in icon.

use crate::classify::IconKind;
use crate::error::MonitorError;
use crate::logging::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// 1x1 grey PNG
pub const DEFAULT_ICON: &[u8] = &[
	0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44, 0x52,
	0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f, 0x15, 0xc4,
	0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x68, 0x68, 0x68, 0xf8,
	0x0f, 0x00, 0x05, 0x84, 0x02, 0x80, 0x8c, 0xcd, 0x66, 0x26, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45,
	0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Icon bytes for every `IconKind`
#[derive(Debug, Clone)]
pub struct IconSet {
	icons: HashMap<IconKind, Vec<u8>>,
}

impl IconSet {
	/// Every icon is the built-in default
	pub fn builtin() -> Self {
		IconSet { icons: HashMap::new() }
	}

	/// Load icons from a resource directory
	pub fn load(dir: &Path) -> Self {
		let mut icons = HashMap::new();
		for kind in IconKind::ALL.iter() {
			let path = dir.join(format!("{}.png", kind.name()));
			match std::fs::read(&path) {
				Ok(bytes) => {
					icons.insert(*kind, bytes);
				}
				Err(e) => {
					debug!("Icon {} unavailable ({}), using built-in icon", path.display(), e);
				}
			}
		}
		debug!("Loaded {} of {} icons from {}", icons.len(), IconKind::ALL.len(), dir.display());
		IconSet { icons }
	}

	pub fn get(&self, kind: IconKind) -> &[u8] {
		self.icons.get(&kind).map(|b| b.as_slice()).unwrap_or(DEFAULT_ICON)
	}

	/// Whether `kind` was loaded from disk
	pub fn is_loaded(&self, kind: IconKind) -> bool {
		self.icons.contains_key(&kind)
	}
}

impl Default for IconSet {
	fn default() -> Self {
		IconSet::builtin()
	}
}

/// Resource directory next to the executable: `<exe dir>/../Resources`
pub fn default_resource_dir() -> Result<PathBuf, MonitorError> {
	let exe = std::env::current_exe().map_err(|e| MonitorError::Resources {
		message: format!("cannot determine executable location: {}", e),
	})?;
	let dir = exe.parent().ok_or_else(|| MonitorError::Resources {
		message: format!("executable {} has no parent directory", exe.display()),
	})?;
	Ok(dir.join("..").join("Resources"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[test]
	fn test_builtin_icons() {
		let icons = IconSet::builtin();
		for kind in IconKind::ALL.iter() {
			assert_eq!(icons.get(*kind), DEFAULT_ICON);
			assert!(!icons.is_loaded(*kind));
		}
	}

	#[test]
	fn test_load_with_fallback() {
		let dir = TempDir::new().unwrap();
		std::fs::write(dir.path().join("conflict.png"), b"conflict-bytes").unwrap();
		std::fs::write(dir.path().join("ok.png"), b"ok-bytes").unwrap();

		let icons = IconSet::load(dir.path());
		assert_eq!(icons.get(IconKind::Conflict), b"conflict-bytes");
		assert_eq!(icons.get(IconKind::Ok), b"ok-bytes");
		assert_eq!(icons.get(IconKind::Fatal), DEFAULT_ICON);
		assert!(icons.is_loaded(IconKind::Ok));
		assert!(!icons.is_loaded(IconKind::Syncing));
	}

	#[test]
	fn test_load_missing_directory() {
		let icons = IconSet::load(Path::new("/nonexistent/syncmon/resources"));
		assert_eq!(icons.get(IconKind::Unknown), DEFAULT_ICON);
		assert!(IconKind::ALL.iter().all(|k| !icons.is_loaded(*k)));
	}

	#[test]
	fn test_default_resource_dir() {
		let dir = default_resource_dir().unwrap();
		assert!(dir.ends_with("Resources"));
	}
}

// vim: ts=4
