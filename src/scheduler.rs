//! Fixed-interval poll loop
//!
//! The next cycle starts one full interval after the previous one has
//! finished. Slow cycles push the schedule back instead of queueing up.

use crate::logging::*;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
pub struct Scheduler {
	interval: Duration,
	warmup: Duration,
}

impl Scheduler {
	pub fn new(interval: Duration, warmup: Duration) -> Self {
		Scheduler { interval, warmup }
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Run `tick` forever
	pub async fn run<F, Fut>(&self, tick: F)
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = ()>,
	{
		self.drive(None, tick).await
	}

	/// Run `tick` exactly `cycles` times
	pub async fn run_cycles<F, Fut>(&self, cycles: u64, tick: F)
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = ()>,
	{
		self.drive(Some(cycles), tick).await
	}

	async fn drive<F, Fut>(&self, limit: Option<u64>, mut tick: F)
	where
		F: FnMut() -> Fut,
		Fut: Future<Output = ()>,
	{
		if !self.warmup.is_zero() {
			tokio::time::sleep(self.warmup).await;
		}

		let mut cycle: u64 = 0;
		loop {
			if let Some(limit) = limit {
				if cycle >= limit {
					return;
				}
			}
			cycle += 1;
			tick().await;

			if limit == Some(cycle) {
				return;
			}
			trace!("Cycle {} done, next in {:?}", cycle, self.interval);
			tokio::time::sleep(self.interval).await;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::{Arc, Mutex};
	use std::time::Instant;

	#[tokio::test]
	async fn test_runs_requested_cycles() {
		let count = Arc::new(Mutex::new(0));
		let scheduler = Scheduler::new(Duration::from_millis(1), Duration::ZERO);
		let counter = count.clone();
		scheduler
			.run_cycles(3, || {
				let counter = counter.clone();
				async move {
					*counter.lock().unwrap() += 1;
				}
			})
			.await;
		assert_eq!(*count.lock().unwrap(), 3);
	}

	#[tokio::test]
	async fn test_interval_counts_from_completion() {
		let starts = Arc::new(Mutex::new(Vec::new()));
		let interval = Duration::from_millis(30);
		let work = Duration::from_millis(40);
		let scheduler = Scheduler::new(interval, Duration::ZERO);

		let recorder = starts.clone();
		scheduler
			.run_cycles(3, || {
				let recorder = recorder.clone();
				async move {
					recorder.lock().unwrap().push(Instant::now());
					tokio::time::sleep(work).await;
				}
			})
			.await;

		let starts = starts.lock().unwrap();
		assert_eq!(starts.len(), 3);
		for pair in starts.windows(2) {
			assert!(pair[1] - pair[0] >= interval + work);
		}
	}

	#[tokio::test]
	async fn test_warmup_delays_first_cycle() {
		let started = Instant::now();
		let first = Arc::new(Mutex::new(None));
		let warmup = Duration::from_millis(25);
		let scheduler = Scheduler::new(Duration::from_millis(1), warmup);

		let slot = first.clone();
		scheduler
			.run_cycles(1, || {
				let slot = slot.clone();
				async move {
					*slot.lock().unwrap() = Some(Instant::now());
				}
			})
			.await;

		let first = first.lock().unwrap().unwrap();
		assert!(first - started >= warmup);
	}
}

// vim: ts=4
