//! Browser implementations of the delivery seams.

use gloo_net::http::Request;
use gloo_timers::future::TimeoutFuture;
use web_sys::RequestMode;

use super::delivery::{Delay, DeliveryError, Transport};

/// Posts payloads with `fetch` in `no-cors` mode.
///
/// The endpoint does not send CORS headers, so the response is opaque and a
/// resolved `send()` is the only success signal available.
#[derive(Clone, Debug)]
pub struct FetchTransport {
	endpoint: String,
}

impl FetchTransport {
	pub fn new(endpoint: impl Into<String>) -> Self {
		Self {
			endpoint: endpoint.into(),
		}
	}
}

impl Transport for FetchTransport {
	async fn send(&self, body: &str) -> Result<(), DeliveryError> {
		let request = Request::post(&self.endpoint)
			.mode(RequestMode::NoCors)
			.header("Content-Type", "text/plain")
			.body(body.to_string())
			.map_err(|e| DeliveryError::Request(e.to_string()))?;

		request
			.send()
			.await
			.map_err(|e| DeliveryError::Network(e.to_string()))?;
		Ok(())
	}
}

/// Backoff timer backed by `setTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TimerDelay;

impl Delay for TimerDelay {
	async fn wait(&self, ms: u32) {
		TimeoutFuture::new(ms).await;
	}
}
