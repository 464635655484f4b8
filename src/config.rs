//! Build-time configuration and tuning constants.
//!
//! Endpoint and site URL can be overridden at compile time through the
//! `SUBMISSION_ENDPOINT` and `SITE_URL` environment variables.

/// Form submission endpoint used when `SUBMISSION_ENDPOINT` is not set.
const DEFAULT_ENDPOINT: &str = "https://script.google.com/macros/s/AKfycbyHz0JO0aq0rzS64CPoFJxE53xviNjfA1TyGcJBZohdeb2OCejU2hj-N7Ltt7Y-ndoD/exec";

const DEFAULT_SITE_URL: &str = "https://financify.ing";

/// Debounce applied to window resize events before rescaling the field.
pub const RESIZE_DEBOUNCE_MS: u32 = 150;

/// Fraction of the canvas that must remain visible for the animation to run.
pub const VISIBILITY_THRESHOLD: f64 = 0.05;

/// Runtime configuration for submission delivery.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
	/// Remote POST target for contact and waitlist submissions.
	pub endpoint: String,
	/// Public base URL of the site, used for tracking links.
	pub site_url: String,
	/// Retries after the first failed attempt.
	pub max_retries: u32,
	/// Base backoff; attempt `n` waits `n * retry_delay_ms`.
	pub retry_delay_ms: u32,
	/// Minimum time a failed submission waits in the deferred queue.
	pub grace_period_ms: f64,
	/// How often the deferred queue is drained in the background.
	pub drain_interval_ms: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			endpoint: option_env!("SUBMISSION_ENDPOINT")
				.unwrap_or(DEFAULT_ENDPOINT)
				.to_string(),
			site_url: option_env!("SITE_URL").unwrap_or(DEFAULT_SITE_URL).to_string(),
			max_retries: 3,
			retry_delay_ms: 1_000,
			grace_period_ms: 5_000.0,
			drain_interval_ms: 30_000,
		}
	}
}
