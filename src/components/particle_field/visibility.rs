//! Pause/resume control for the animation loop.
//!
//! The loop runs only while the canvas is on screen *and* the document is in
//! the foreground. [`VisibilityController`] is the pure state machine;
//! [`FrameGate`] owns the single pending animation-frame handle and makes sure
//! nothing is scheduled while paused.

/// Playback state of the animation loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
	Running,
	PausedOffscreen,
	PausedHidden,
}

/// What the frame loop must do after a visibility change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
	Pause,
	Resume,
	None,
}

/// Tracks the two pause conditions. Starts out visible and foregrounded.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityController {
	offscreen: bool,
	hidden: bool,
}

impl VisibilityController {
	pub fn state(&self) -> PlaybackState {
		if self.hidden {
			PlaybackState::PausedHidden
		} else if self.offscreen {
			PlaybackState::PausedOffscreen
		} else {
			PlaybackState::Running
		}
	}

	pub fn is_running(&self) -> bool {
		self.state() == PlaybackState::Running
	}

	/// The canvas left (`true`) or re-entered (`false`) the viewport.
	pub fn set_offscreen(&mut self, offscreen: bool) -> Transition {
		self.update(|c| c.offscreen = offscreen)
	}

	/// The document became hidden (`true`) or visible (`false`).
	pub fn set_hidden(&mut self, hidden: bool) -> Transition {
		self.update(|c| c.hidden = hidden)
	}

	fn update(&mut self, change: impl FnOnce(&mut Self)) -> Transition {
		let was_running = self.is_running();
		change(self);
		match (was_running, self.is_running()) {
			(true, false) => Transition::Pause,
			(false, true) => Transition::Resume,
			_ => Transition::None,
		}
	}
}

/// Whether an intersection report means the canvas should count as offscreen.
///
/// `isIntersecting` stays true for any overlap, so the visible `ratio` is
/// compared against `threshold` as well; a canvas that is only barely on
/// screen already pauses.
pub fn is_offscreen(intersecting: bool, ratio: f64, threshold: f64) -> bool {
	!intersecting || ratio < threshold
}

/// Host hook for requesting and cancelling animation frames.
pub trait FrameScheduler {
	/// Request a frame, returning its handle, or `None` if the request failed.
	fn request_frame(&self) -> Option<i32>;
	/// Cancel a previously requested frame. Cancelling a fired frame is a no-op.
	fn cancel_frame(&self, handle: i32);
}

/// Owns the pending frame request and gates drawing on visibility.
pub struct FrameGate<S: FrameScheduler> {
	scheduler: S,
	controller: VisibilityController,
	pending: Option<i32>,
	frames_drawn: u64,
	torn_down: bool,
}

impl<S: FrameScheduler> FrameGate<S> {
	pub fn new(scheduler: S) -> Self {
		Self {
			scheduler,
			controller: VisibilityController::default(),
			pending: None,
			frames_drawn: 0,
			torn_down: false,
		}
	}

	/// Kick off the loop.
	pub fn start(&mut self) {
		self.ensure_scheduled();
	}

	pub fn state(&self) -> PlaybackState {
		self.controller.state()
	}

	pub fn frames_drawn(&self) -> u64 {
		self.frames_drawn
	}

	pub fn has_pending_frame(&self) -> bool {
		self.pending.is_some()
	}

	pub fn set_offscreen(&mut self, offscreen: bool) {
		let transition = self.controller.set_offscreen(offscreen);
		self.apply(transition);
	}

	pub fn set_hidden(&mut self, hidden: bool) {
		let transition = self.controller.set_hidden(hidden);
		self.apply(transition);
	}

	/// Called from the frame callback. Returns whether this frame should draw.
	///
	/// A drawing frame is counted; the caller draws and then calls
	/// [`FrameGate::schedule_next`].
	pub fn on_frame(&mut self) -> bool {
		self.pending = None;
		if self.torn_down || !self.controller.is_running() {
			return false;
		}
		self.frames_drawn += 1;
		true
	}

	/// Request the following frame if the loop is still running.
	pub fn schedule_next(&mut self) {
		self.ensure_scheduled();
	}

	/// Cancel the pending frame and refuse any further scheduling.
	pub fn teardown(&mut self) {
		self.cancel_pending();
		self.torn_down = true;
	}

	fn apply(&mut self, transition: Transition) {
		match transition {
			Transition::Pause => {
				self.cancel_pending();
				log::debug!("financify: particle field paused ({:?})", self.state());
			}
			Transition::Resume => {
				self.ensure_scheduled();
				log::debug!("financify: particle field resumed");
			}
			Transition::None => {}
		}
	}

	fn ensure_scheduled(&mut self) {
		if self.torn_down || self.pending.is_some() || !self.controller.is_running() {
			return;
		}
		self.pending = self.scheduler.request_frame();
	}

	fn cancel_pending(&mut self) {
		if let Some(handle) = self.pending.take() {
			self.scheduler.cancel_frame(handle);
		}
	}
}
