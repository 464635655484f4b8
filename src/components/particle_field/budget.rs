//! Device-adaptive particle budget.
//!
//! The field scales its particle count from coarse device hints so that narrow
//! viewports, low core counts, and reduced-motion users pay for fewer particles.

/// Viewport width below which a device is treated as mobile-class.
pub const MOBILE_BREAKPOINT: f64 = 768.0;

/// Coarse device classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
	Mobile,
	DesktopLow,
	Desktop,
}

/// Signals used to scale the simulation cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceHints {
	/// Approximate logical core count (`navigator.hardwareConcurrency`).
	pub cores: u32,
	/// Whether the user prefers reduced motion.
	pub reduced_motion: bool,
	/// Whether the primary pointer is coarse (touch).
	pub coarse_pointer: bool,
}

impl Default for DeviceHints {
	fn default() -> Self {
		Self {
			cores: 4,
			reduced_motion: false,
			coarse_pointer: false,
		}
	}
}

impl DeviceHints {
	/// Classify the device for a given viewport width.
	pub fn class(&self, viewport_width: f64) -> DeviceClass {
		if self.coarse_pointer || viewport_width < MOBILE_BREAKPOINT {
			DeviceClass::Mobile
		} else if self.cores < 4 {
			DeviceClass::DesktopLow
		} else {
			DeviceClass::Desktop
		}
	}

	/// Read hints from the browser, falling back to defaults for anything missing.
	pub fn detect() -> Self {
		let Some(window) = web_sys::window() else {
			return Self::default();
		};
		let cores = window.navigator().hardware_concurrency() as u32;
		let matches = |query: &str| {
			window
				.match_media(query)
				.ok()
				.flatten()
				.map(|mql| mql.matches())
				.unwrap_or(false)
		};
		Self {
			cores: if cores == 0 { 4 } else { cores },
			reduced_motion: matches("(prefers-reduced-motion: reduce)"),
			coarse_pointer: matches("(pointer: coarse)"),
		}
	}
}

/// Particle count limits for one device class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleBudget {
	/// Hard cap on particle count.
	pub cap: usize,
	/// One particle per `density_divisor` pixels of viewport width.
	pub density_divisor: f64,
}

impl ParticleBudget {
	pub fn for_hints(hints: &DeviceHints, viewport_width: f64) -> Self {
		if hints.reduced_motion {
			return Self {
				cap: 30,
				density_divisor: 40.0,
			};
		}
		match hints.class(viewport_width) {
			DeviceClass::Mobile => Self {
				cap: 60,
				density_divisor: 25.0,
			},
			DeviceClass::DesktopLow => Self {
				cap: 90,
				density_divisor: 20.0,
			},
			DeviceClass::Desktop => Self {
				cap: 150,
				density_divisor: 15.0,
			},
		}
	}

	/// `min(cap, width / divisor)`, never negative.
	pub fn particle_count(&self, viewport_width: f64) -> usize {
		let by_density = (viewport_width.max(0.0) / self.density_divisor).floor() as usize;
		by_density.min(self.cap)
	}
}
