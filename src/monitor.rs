//! Monitor: poll loop, click dispatch and startup
//!
//! The engine sits behind a single async mutex shared by the poll loop and
//! the click dispatcher. The lock is never held while the daemon or an
//! external command is running.

use crate::engine::{ReconcileReport, ReconciliationEngine};
use crate::error::SourceError;
use crate::logging::*;
use crate::resolve::{resolve, ResolutionOutcome, SyncActions};
use crate::scheduler::Scheduler;
use crate::session::Snapshot;
use crate::source::StateSource;
use crate::tray::{EntryId, Tray};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

pub type SharedEngine<T> = Arc<Mutex<ReconciliationEngine<T>>>;

pub struct Monitor<T: Tray> {
	engine: SharedEngine<T>,
	source: Arc<dyn StateSource>,
	actions: Option<Arc<dyn SyncActions>>,
	scheduler: Scheduler,
}

impl<T: Tray + 'static> Monitor<T> {
	pub fn new(
		engine: ReconciliationEngine<T>,
		source: Arc<dyn StateSource>,
		actions: Option<Arc<dyn SyncActions>>,
		scheduler: Scheduler,
	) -> Self {
		Monitor { engine: Arc::new(Mutex::new(engine)), source, actions, scheduler }
	}

	pub fn engine(&self) -> SharedEngine<T> {
		self.engine.clone()
	}

	/// Poll the daemon once and reconcile
	///
	/// On a source failure nothing is reconciled and the current indicators
	/// stay as they are.
	pub async fn poll_once(&self) -> Result<ReconcileReport, SourceError> {
		let records = self.source.list().await?;
		let (snapshot, malformed) = Snapshot::from_records(records);
		for entry in &malformed {
			warn!("Skipping malformed {}", entry);
		}

		let mut engine = self.engine.lock().await;
		Ok(engine.reconcile(snapshot))
	}

	/// One scheduler cycle; failures are logged and retried next cycle
	pub async fn tick(&self) {
		match self.poll_once().await {
			Ok(report) => {
				if report.changed() {
					debug!(
						"Poll: {} created, {} updated, {} removed",
						report.created, report.updated, report.removed
					);
				}
			}
			Err(e) => warn!("Poll failed, keeping current indicators: {}", e),
		}
	}

	/// Run forever: clicks are dispatched in the background while this
	/// task drives the poll loop
	pub async fn run(self, clicks: Option<mpsc::Receiver<EntryId>>) {
		match (clicks, self.actions.clone()) {
			(Some(rx), Some(actions)) => {
				tokio::spawn(dispatch_clicks(self.engine.clone(), actions, rx));
			}
			(Some(_), None) => debug!("Resolution disabled, clicks are ignored"),
			_ => {}
		}

		info!("Polling every {:?}", self.scheduler.interval());
		self.scheduler.run(|| self.tick()).await
	}
}

/// Resolve the session behind a clicked entry
///
/// Returns `None` when the entry no longer belongs to a live session.
pub async fn handle_click<T: Tray>(
	engine: &SharedEngine<T>,
	actions: &dyn SyncActions,
	entry: EntryId,
) -> Option<ResolutionOutcome> {
	let state = {
		let engine = engine.lock().await;
		engine.session_for_entry(entry).cloned()
	};

	match state {
		Some(state) => {
			info!("Click on {} ({})", state.label(), state.identifier);
			Some(resolve(&state, actions).await)
		}
		None => {
			debug!("Click on {} ignored, no live session", entry);
			None
		}
	}
}

/// Consume clicks until every sender is gone
pub async fn dispatch_clicks<T: Tray>(
	engine: SharedEngine<T>,
	actions: Arc<dyn SyncActions>,
	mut clicks: mpsc::Receiver<EntryId>,
) {
	while let Some(entry) = clicks.recv().await {
		handle_click(&engine, actions.as_ref(), entry).await;
	}
	debug!("Click channel closed");
}

/// Block until the daemon answers a listing
///
/// Startup does not give up: the monitor is meant to outlive daemon
/// restarts, so it keeps probing on a fixed delay.
pub async fn wait_for_daemon(source: &dyn StateSource, retry: Duration) -> usize {
	let mut attempts = 0;
	loop {
		attempts += 1;
		match source.list().await {
			Ok(_) => {
				info!("Daemon reachable after {} attempt(s)", attempts);
				return attempts;
			}
			Err(e) => {
				warn!("Daemon not reachable: {}", e);
				info!("Waiting for initialization, retrying in {:?}", retry);
				tokio::time::sleep(retry).await;
			}
		}
	}
}

// vim: ts=4
