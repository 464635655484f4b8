//! Background draining of the deferred queue.

use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use super::delivery::{Delay, Delivery, Transport};
use crate::clock::Clock;
use crate::config::Config;

/// Drains the deferred queue whenever the page becomes visible again and on a
/// fixed interval. Listeners are released by [`dispose`](Self::dispose) or on
/// drop.
pub struct FailedRequestProcessor {
	visibility: Option<Closure<dyn FnMut()>>,
	interval: Option<Interval>,
}

impl FailedRequestProcessor {
	pub fn init<T, D, C>(delivery: Rc<Delivery<T, D, C>>, config: &Config) -> Self
	where
		T: Transport + 'static,
		D: Delay + 'static,
		C: Clock + 'static,
	{
		let document = web_sys::window().and_then(|w| w.document());

		let visibility = document.map(|document| {
			let (delivery, doc) = (delivery.clone(), document.clone());
			let cb = Closure::<dyn FnMut()>::new(move || {
				if !doc.hidden() {
					spawn_drain(&delivery);
				}
			});
			let _ = document.add_event_listener_with_callback("visibilitychange", cb.as_ref().unchecked_ref());
			cb
		});

		let interval = Interval::new(config.drain_interval_ms, move || spawn_drain(&delivery));

		log::debug!(
			"financify: deferred queue processor started ({} ms interval)",
			config.drain_interval_ms
		);
		Self {
			visibility,
			interval: Some(interval),
		}
	}

	/// Remove the visibility listener and stop the interval. Idempotent.
	pub fn dispose(&mut self) {
		if let Some(cb) = self.visibility.take() {
			if let Some(document) = web_sys::window().and_then(|w| w.document()) {
				let _ = document
					.remove_event_listener_with_callback("visibilitychange", cb.as_ref().unchecked_ref());
			}
		}
		// Dropping the gloo Interval clears it
		if self.interval.take().is_some() {
			log::debug!("financify: deferred queue processor stopped");
		}
	}
}

impl Drop for FailedRequestProcessor {
	fn drop(&mut self) {
		self.dispose();
	}
}

fn spawn_drain<T, D, C>(delivery: &Rc<Delivery<T, D, C>>)
where
	T: Transport + 'static,
	D: Delay + 'static,
	C: Clock + 'static,
{
	if delivery.queue().is_empty() {
		return;
	}
	let delivery = delivery.clone();
	spawn_local(async move {
		delivery.drain_due().await;
	});
}
