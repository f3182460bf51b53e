//! Shutdown on SIGTERM or SIGINT
//!
//! Live indicators are hidden before the process exits, so the surface is
//! not left showing sessions nobody is watching anymore.

use crate::logging::*;
use crate::monitor::SharedEngine;
use crate::tray::Tray;
use tokio::signal::unix::{signal, SignalKind};

/// Hide every indicator and log the last published summary
///
/// Returns the number of indicators hidden.
pub async fn shutdown<T: Tray>(engine: &SharedEngine<T>) -> usize {
	let mut engine = engine.lock().await;
	let counters = engine.counters();
	let hidden = engine.clear();
	info!(
		"Last summary {} over {} session(s), {} indicator(s) hidden",
		counters.label(),
		counters.total,
		hidden
	);
	hidden
}

/// Shut the engine down and exit on SIGTERM (143) or SIGINT (130)
pub fn setup_signal_handlers<T: Tray + 'static>(engine: SharedEngine<T>) {
	tokio::spawn(async move {
		let mut sigterm = match signal(SignalKind::terminate()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGTERM handler: {}", e);
				return;
			}
		};
		let mut sigint = match signal(SignalKind::interrupt()) {
			Ok(stream) => stream,
			Err(e) => {
				warn!("Failed to setup SIGINT handler: {}", e);
				return;
			}
		};

		let code = tokio::select! {
			_ = sigterm.recv() => {
				info!("Received SIGTERM, shutting down");
				143
			}
			_ = sigint.recv() => {
				info!("Received SIGINT, shutting down");
				130
			}
		};

		shutdown(&engine).await;
		std::process::exit(code);
	});
}


// vim: ts=4
