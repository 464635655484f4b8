//! Wall-clock access, kept behind a trait so time-dependent logic can be tested.

/// Source of the current time.
pub trait Clock {
	/// Milliseconds since the Unix epoch.
	fn now_ms(&self) -> f64;
	/// Current time as an ISO-8601 string (`2025-01-31T12:00:00.000Z`).
	fn now_iso(&self) -> String;
}

/// The browser's clock (`Date.now()`).
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserClock;

impl Clock for BrowserClock {
	fn now_ms(&self) -> f64 {
		js_sys::Date::now()
	}

	fn now_iso(&self) -> String {
		js_sys::Date::new_0().to_iso_string().into()
	}
}
