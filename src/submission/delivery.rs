//! Best-effort delivery of submissions with retry and a deferred queue.
//!
//! The endpoint is contacted in opaque mode, so a request that goes out is
//! all we can ever observe. Sends that fail outright are retried with linear
//! backoff; once retries are exhausted the payload is parked in a
//! [`DeferredQueue`] and picked up again by [`Delivery::drain_due`].

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use super::payload::SubmissionPayload;
use crate::clock::Clock;
use crate::config::Config;

#[derive(Debug, Error)]
pub enum DeliveryError {
	#[error("request could not be built: {0}")]
	Request(String),
	#[error("network error: {0}")]
	Network(String),
}

/// Sends an encoded payload to the endpoint.
#[allow(async_fn_in_trait)]
pub trait Transport {
	async fn send(&self, body: &str) -> Result<(), DeliveryError>;
}

/// Waits between retry attempts.
#[allow(async_fn_in_trait)]
pub trait Delay {
	async fn wait(&self, ms: u32);
}

/// Outcome of a [`Delivery::submit`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryResult {
	/// The request left the browser. The response is opaque, so whether the
	/// server accepted it is unknown.
	Attempted,
	/// Nothing was dispatched. Normally every attempt failed and the payload
	/// waits in the deferred queue; a payload that cannot be encoded to JSON
	/// is dropped instead, since no retry could ever send it.
	Unknown,
}

impl DeliveryResult {
	pub fn is_attempted(self) -> bool {
		self == DeliveryResult::Attempted
	}
}

/// Per-call retry settings.
#[derive(Clone)]
pub struct DeliveryOptions {
	/// Retries after the first attempt.
	pub max_retries: u32,
	/// Attempt `n` is followed by a wait of `n * retry_delay_ms`.
	pub retry_delay_ms: u32,
	/// Called with the 1-based retry number before each backoff wait.
	pub on_retry: Option<Rc<dyn Fn(u32)>>,
}

impl Default for DeliveryOptions {
	fn default() -> Self {
		Self {
			max_retries: 3,
			retry_delay_ms: 1_000,
			on_retry: None,
		}
	}
}

impl DeliveryOptions {
	pub fn from_config(config: &Config) -> Self {
		Self {
			max_retries: config.max_retries,
			retry_delay_ms: config.retry_delay_ms,
			on_retry: None,
		}
	}

	pub fn with_max_retries(mut self, max_retries: u32) -> Self {
		self.max_retries = max_retries;
		self
	}

	pub fn on_retry(mut self, f: impl Fn(u32) + 'static) -> Self {
		self.on_retry = Some(Rc::new(f));
		self
	}
}

/// A payload whose delivery failed, with the time it was parked.
#[derive(Clone, Debug, PartialEq)]
pub struct QueuedSubmission {
	pub payload: SubmissionPayload,
	pub timestamp: f64,
}

/// Session-scoped holding area for failed submissions. Clones share the queue.
#[derive(Clone, Debug, Default)]
pub struct DeferredQueue {
	entries: Rc<RefCell<Vec<QueuedSubmission>>>,
}

impl DeferredQueue {
	pub fn push(&self, payload: SubmissionPayload, timestamp: f64) {
		self.entries
			.borrow_mut()
			.push(QueuedSubmission { payload, timestamp });
	}

	/// Remove and return every entry parked for longer than `grace_ms`.
	pub fn take_due(&self, now: f64, grace_ms: f64) -> Vec<QueuedSubmission> {
		let mut entries = self.entries.borrow_mut();
		let (due, waiting): (Vec<_>, Vec<_>) = entries
			.drain(..)
			.partition(|entry| now - entry.timestamp > grace_ms);
		*entries = waiting;
		due
	}

	pub fn len(&self) -> usize {
		self.entries.borrow().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.borrow().is_empty()
	}
}

/// Submission sender bound to a transport, a timer and a clock.
pub struct Delivery<T: Transport, D: Delay, C: Clock> {
	transport: T,
	delay: D,
	clock: C,
	queue: DeferredQueue,
	defaults: DeliveryOptions,
	grace_period_ms: f64,
}

impl<T: Transport, D: Delay, C: Clock> Delivery<T, D, C> {
	pub fn new(transport: T, delay: D, clock: C, queue: DeferredQueue, config: &Config) -> Self {
		Self {
			transport,
			delay,
			clock,
			queue,
			defaults: DeliveryOptions::from_config(config),
			grace_period_ms: config.grace_period_ms,
		}
	}

	pub fn queue(&self) -> &DeferredQueue {
		&self.queue
	}

	/// Options built from the configuration this delivery was created with.
	pub fn default_options(&self) -> DeliveryOptions {
		self.defaults.clone()
	}

	/// Send `payload`, retrying on failure, and park it in the deferred queue
	/// when every attempt fails. Never returns an error.
	///
	/// A payload that fails to encode is logged and dropped without being
	/// queued or sent.
	pub async fn submit(&self, payload: &SubmissionPayload, options: DeliveryOptions) -> DeliveryResult {
		let body = match payload.to_json() {
			Ok(body) => body,
			Err(e) => {
				log::error!("financify: could not encode {} submission: {}", payload.kind(), e);
				return DeliveryResult::Unknown;
			}
		};

		let mut last_error = None;
		for attempt in 0..=options.max_retries {
			match self.transport.send(&body).await {
				Ok(()) => {
					log::debug!(
						"financify: {} submission dispatched (attempt {})",
						payload.kind(),
						attempt + 1
					);
					return DeliveryResult::Attempted;
				}
				Err(e) => {
					log::warn!(
						"financify: {} submission attempt {} failed: {}",
						payload.kind(),
						attempt + 1,
						e
					);
					last_error = Some(e);
				}
			}

			if attempt < options.max_retries {
				let retry = attempt + 1;
				if let Some(on_retry) = &options.on_retry {
					on_retry(retry);
				}
				self.delay
					.wait(options.retry_delay_ms.saturating_mul(retry))
					.await;
			}
		}

		self.queue.push(payload.clone(), self.clock.now_ms());
		log::error!(
			"financify: {} submission queued after {} attempts: {}",
			payload.kind(),
			options.max_retries + 1,
			last_error.map(|e| e.to_string()).unwrap_or_default()
		);
		DeliveryResult::Unknown
	}

	/// Retry every queued submission past its grace period, once each.
	///
	/// Due entries are taken out of the queue before any of them is sent, so a
	/// submission that fails again is re-queued for a later drain and not
	/// revisited by this one. Returns the number of entries processed.
	pub async fn drain_due(&self) -> usize {
		let due = self
			.queue
			.take_due(self.clock.now_ms(), self.grace_period_ms);
		if due.is_empty() {
			return 0;
		}

		log::info!("financify: retrying {} deferred submissions", due.len());
		let options = self.default_options().with_max_retries(1);
		for entry in &due {
			self.submit(&entry.payload, options.clone()).await;
		}
		due.len()
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};

	use futures::executor::block_on;

	use super::*;
	use crate::clock::testing::ManualClock;

	/// Fails the first `failures` sends and records every body it sees.
	#[derive(Default)]
	struct FakeTransport {
		failures: Cell<usize>,
		always_fail: bool,
		sent: RefCell<Vec<String>>,
	}

	impl FakeTransport {
		fn failing() -> Self {
			Self {
				always_fail: true,
				..Self::default()
			}
		}

		fn failing_first(n: usize) -> Self {
			Self {
				failures: Cell::new(n),
				..Self::default()
			}
		}
	}

	impl Transport for &FakeTransport {
		async fn send(&self, body: &str) -> Result<(), DeliveryError> {
			self.sent.borrow_mut().push(body.to_string());
			if self.always_fail {
				return Err(DeliveryError::Network("offline".into()));
			}
			let remaining = self.failures.get();
			if remaining > 0 {
				self.failures.set(remaining - 1);
				return Err(DeliveryError::Network("flaky".into()));
			}
			Ok(())
		}
	}

	#[derive(Default)]
	struct RecordingDelay {
		waits: RefCell<Vec<u32>>,
	}

	impl Delay for &RecordingDelay {
		async fn wait(&self, ms: u32) {
			self.waits.borrow_mut().push(ms);
		}
	}

	fn waitlist(email: &str) -> SubmissionPayload {
		SubmissionPayload::Waitlist {
			email: email.into(),
			source: "pricing".into(),
			source_data: None,
		}
	}

	fn delivery<'a>(
		transport: &'a FakeTransport,
		delay: &'a RecordingDelay,
		clock: &ManualClock,
	) -> Delivery<&'a FakeTransport, &'a RecordingDelay, ManualClock> {
		Delivery::new(
			transport,
			delay,
			clock.clone(),
			DeferredQueue::default(),
			&Config::default(),
		)
	}

	#[test]
	fn exhausted_retries_attempt_four_times_and_queue() {
		let (transport, delay, clock) = (FakeTransport::failing(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		let retries = Rc::new(RefCell::new(Vec::new()));
		let seen = retries.clone();

		let options = DeliveryOptions::default().on_retry(move |n| seen.borrow_mut().push(n));
		let result = block_on(delivery.submit(&waitlist("a@b.com"), options));

		assert_eq!(result, DeliveryResult::Unknown);
		assert_eq!(transport.sent.borrow().len(), 4);
		assert_eq!(*retries.borrow(), vec![1, 2, 3]);
		assert_eq!(delivery.queue().len(), 1);
	}

	#[test]
	fn backoff_grows_linearly() {
		let (transport, delay, clock) = (FakeTransport::failing(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		block_on(delivery.submit(&waitlist("a@b.com"), DeliveryOptions::default()));
		assert_eq!(*delay.waits.borrow(), vec![1_000, 2_000, 3_000]);
	}

	#[test]
	fn successful_send_is_attempted_once() {
		let (transport, delay, clock) = (FakeTransport::default(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		let result = block_on(delivery.submit(&waitlist("a@b.com"), DeliveryOptions::default()));

		assert!(result.is_attempted());
		assert_eq!(transport.sent.borrow().len(), 1);
		assert!(delay.waits.borrow().is_empty());
		assert!(delivery.queue().is_empty());
	}

	#[test]
	fn recovers_after_transient_failures() {
		let (transport, delay, clock) = (FakeTransport::failing_first(2), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		let result = block_on(delivery.submit(&waitlist("a@b.com"), DeliveryOptions::default()));

		assert_eq!(result, DeliveryResult::Attempted);
		assert_eq!(transport.sent.borrow().len(), 3);
		assert_eq!(*delay.waits.borrow(), vec![1_000, 2_000]);
	}

	#[test]
	fn zero_retries_means_single_attempt() {
		let (transport, delay, clock) = (FakeTransport::failing(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		let calls = Rc::new(Cell::new(0));
		let counter = calls.clone();
		let options = DeliveryOptions::default()
			.with_max_retries(0)
			.on_retry(move |_| counter.set(counter.get() + 1));

		block_on(delivery.submit(&waitlist("a@b.com"), options));
		assert_eq!(transport.sent.borrow().len(), 1);
		assert_eq!(calls.get(), 0);
	}

	#[test]
	fn drain_processes_each_due_entry_once() {
		let (transport, delay, clock) = (FakeTransport::failing(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		delivery.queue().push(waitlist("one@b.com"), 0.0);
		delivery.queue().push(waitlist("two@b.com"), 0.0);
		clock.advance(6_000.0);

		let processed = block_on(delivery.drain_due());
		assert_eq!(processed, 2);

		// One submit per entry, each with a single retry
		let sent = transport.sent.borrow();
		assert_eq!(sent.len(), 4);
		assert_eq!(sent.iter().filter(|b| b.contains("one@b.com")).count(), 2);
		assert_eq!(sent.iter().filter(|b| b.contains("two@b.com")).count(), 2);
		drop(sent);

		// Both failed again and were re-queued with a fresh timestamp
		assert_eq!(delivery.queue().len(), 2);
		assert_eq!(block_on(delivery.drain_due()), 0);
	}

	#[test]
	fn drain_clears_queue_when_sends_succeed() {
		let (transport, delay, clock) = (FakeTransport::default(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		delivery.queue().push(waitlist("one@b.com"), 0.0);
		delivery.queue().push(waitlist("two@b.com"), 0.0);
		clock.advance(5_001.0);

		assert_eq!(block_on(delivery.drain_due()), 2);
		assert_eq!(transport.sent.borrow().len(), 2);
		assert!(delivery.queue().is_empty());
	}

	#[test]
	fn drain_skips_entries_inside_grace_period() {
		let (transport, delay, clock) = (FakeTransport::default(), RecordingDelay::default(), ManualClock::default());
		let delivery = delivery(&transport, &delay, &clock);
		delivery.queue().push(waitlist("old@b.com"), 0.0);
		clock.advance(5_000.0);
		delivery.queue().push(waitlist("new@b.com"), clock.now_ms());

		// Exactly at the grace period is not yet due
		assert_eq!(block_on(delivery.drain_due()), 0);

		clock.advance(1.0);
		assert_eq!(block_on(delivery.drain_due()), 1);
		assert_eq!(delivery.queue().len(), 1);
		assert!(transport.sent.borrow()[0].contains("old@b.com"));
	}
}
