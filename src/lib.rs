//! # SyncMon - Status Monitor for Mutagen Sync Sessions
//!
//! SyncMon polls the mutagen daemon for its synchronization sessions and
//! keeps one indicator per session on a tray surface: an icon for the
//! session's health, a tooltip with its status and conflicts, and a
//! summary of all sessions next to the application icon. Clicking an
//! indicator flushes the session, or overwrites the conflicting paths for
//! one-way-safe sessions.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use syncmon::{EngineOptions, IconSet, LogTray, Monitor, MutagenSource, ReconciliationEngine, Scheduler};
//!
//! #[tokio::main]
//! async fn main() {
//!     let engine = ReconciliationEngine::new(LogTray::new(), IconSet::builtin(), EngineOptions::default());
//!     let source = Arc::new(MutagenSource::new("mutagen", Duration::from_secs(30)));
//!     let scheduler = Scheduler::new(Duration::from_secs(2), Duration::ZERO);
//!     Monitor::new(engine, source, None, scheduler).run(None).await;
//! }
//! ```

pub mod classify;
pub mod config;
pub mod engine;
pub mod error;
pub mod icons;
pub mod logging;
pub mod monitor;
pub mod render;
pub mod resolve;
pub mod scheduler;
pub mod session;
pub mod source;
pub mod tray;
pub mod utils;

// Re-export commonly used types and functions
pub use classify::{classify, Category, IconKind};
pub use config::MonitorConfig;
pub use engine::{AggregateCounters, EngineOptions, ReconcileReport, ReconciliationEngine};
pub use error::{ActionError, MonitorError, SourceError};
pub use icons::IconSet;
pub use monitor::{handle_click, wait_for_daemon, Monitor};
pub use resolve::{ClickAction, CommandActions, SyncActions};
pub use scheduler::Scheduler;
pub use session::{SessionState, Snapshot, Status, SyncMode};
pub use source::{MutagenSource, StateSource};
pub use tray::{EntryId, LogTray, MemoryTray, Tray};

// vim: ts=4
