use clap::{Arg, ArgAction, Command};
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use syncmon::classify::IconKind;
use syncmon::config::MonitorConfig;
use syncmon::engine::{EngineOptions, ReconciliationEngine};
use syncmon::icons::{default_resource_dir, IconSet};
use syncmon::logging::*;
use syncmon::monitor::{wait_for_daemon, Monitor};
use syncmon::resolve::{CommandActions, SyncActions};
use syncmon::scheduler::Scheduler;
use syncmon::source::{MutagenSource, StateSource};
use syncmon::tray::{EntryId, LogTray};
use syncmon::utils::setup_signal_handlers;

///////////////////////
// Utility functions //
///////////////////////

/// Apply command line overrides on top of the loaded configuration
fn apply_overrides(config: &mut MonitorConfig, matches: &clap::ArgMatches) {
	if let Some(interval) = matches.get_one::<u64>("interval") {
		config.poll_interval_secs = *interval;
	}
	if let Some(dir) = matches.get_one::<String>("resources") {
		config.resources_dir = Some(PathBuf::from(dir));
	}
	if let Some(cmd) = matches.get_one::<String>("mutagen") {
		config.mutagen_command = cmd.clone();
	}
	if matches.get_flag("no-resolve") {
		config.resolution_enabled = false;
	}
	if let Some(file) = matches.get_one::<String>("log-file") {
		config.log_file = Some(PathBuf::from(file));
	}
	match matches.get_count("verbose") {
		0 => {}
		1 => config.log_level = "debug".to_string(),
		_ => config.log_level = "trace".to_string(),
	}
}

/// Forward entry numbers typed on stdin as clicks
fn spawn_stdin_clicks() -> mpsc::Receiver<EntryId> {
	let (tx, rx) = mpsc::channel(16);
	tokio::spawn(async move {
		let mut lines = BufReader::new(tokio::io::stdin()).lines();
		loop {
			match lines.next_line().await {
				Ok(Some(line)) => {
					let line = line.trim().trim_start_matches('#');
					if line.is_empty() {
						continue;
					}
					match line.parse::<u64>() {
						Ok(n) => {
							if tx.send(EntryId(n)).await.is_err() {
								return;
							}
						}
						Err(_) => warn!("Not an entry number: {}", line),
					}
				}
				Ok(None) => return,
				Err(e) => {
					warn!("Cannot read clicks from stdin: {}", e);
					return;
				}
			}
		}
	});
	rx
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
	let matches = Command::new("SyncMon")
		.version("0.1.0")
		.about("Tray status monitor for mutagen sync sessions")
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.help("Config file (TOML or JSON5)"),
		)
		.arg(
			Arg::new("interval")
				.short('i')
				.long("interval")
				.value_name("SECS")
				.value_parser(clap::value_parser!(u64))
				.help("Seconds between polls"),
		)
		.arg(
			Arg::new("resources")
				.short('r')
				.long("resources")
				.value_name("DIR")
				.help("Icon directory"),
		)
		.arg(
			Arg::new("mutagen")
				.long("mutagen")
				.value_name("CMD")
				.help("Mutagen command"),
		)
		.arg(
			Arg::new("no-resolve")
				.long("no-resolve")
				.action(ArgAction::SetTrue)
				.help("Ignore clicks instead of flushing or overwriting"),
		)
		.arg(
			Arg::new("log-file")
				.long("log-file")
				.value_name("FILE")
				.help("Append logs to FILE instead of stderr"),
		)
		.arg(
			Arg::new("verbose")
				.short('v')
				.long("verbose")
				.action(ArgAction::Count)
				.help("More logging (-vv for trace)"),
		)
		.get_matches();

	let config_path = matches.get_one::<String>("config").map(PathBuf::from);
	let mut config = MonitorConfig::load(config_path.as_deref())?;
	apply_overrides(&mut config, &matches);
	config.validate()?;

	init_tracing(&config.log_level, config.log_file.as_deref())?;

	let resources = match &config.resources_dir {
		Some(dir) => dir.clone(),
		None => default_resource_dir()?,
	};
	if !resources.is_dir() {
		warn!("Resource directory {} not found, using built-in icons", resources.display());
	}
	let icons = IconSet::load(&resources);
	let missing: Vec<&str> =
		IconKind::ALL.iter().filter(|k| !icons.is_loaded(**k)).map(|k| k.name()).collect();
	if !missing.is_empty() && resources.is_dir() {
		warn!("Icons not found in {}: {}", resources.display(), missing.join(", "));
	}

	let source: Arc<dyn StateSource> =
		Arc::new(MutagenSource::new(&config.mutagen_command, config.command_timeout()));
	let actions: Option<Arc<dyn SyncActions>> = if config.resolution_enabled {
		Some(Arc::new(CommandActions::new(
			&config.mutagen_command,
			&config.rsync_command,
			config.command_timeout(),
		)))
	} else {
		None
	};

	wait_for_daemon(source.as_ref(), config.startup_retry()).await;

	let options = EngineOptions { clickable: actions.is_some() };
	let engine = ReconciliationEngine::new(LogTray::new(), icons, options);
	let scheduler = Scheduler::new(config.poll_interval(), config.warmup());
	let clicks = if actions.is_some() { Some(spawn_stdin_clicks()) } else { None };

	let monitor = Monitor::new(engine, source, actions, scheduler);
	setup_signal_handlers(monitor.engine());
	monitor.run(clicks).await;
	Ok(())
}

// vim: ts=4
