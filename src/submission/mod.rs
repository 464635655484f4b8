//! Contact and waitlist submissions.
//!
//! Form input is validated and checked against the local ledger in [`flow`],
//! then handed to [`Delivery`], which posts it to the configured endpoint with
//! retries. Submissions that cannot be sent wait in a [`DeferredQueue`] that
//! [`FailedRequestProcessor`] drains in the background.
//!
//! ```ignore
//! let delivery = Rc::new(Delivery::new(
//!     FetchTransport::new(&config.endpoint),
//!     TimerDelay,
//!     BrowserClock,
//!     DeferredQueue::default(),
//!     &config,
//! ));
//! let _processor = FailedRequestProcessor::init(delivery.clone(), &config);
//!
//! let payload = prepare_waitlist(&email, &ledger, source.as_ref())?;
//! spawn_local(async move {
//!     delivery.submit(&payload, delivery.default_options()).await;
//! });
//! ```

pub mod delivery;
pub mod flow;
pub mod payload;
mod processor;
mod transport;

pub use delivery::{
	DeferredQueue, Delay, Delivery, DeliveryError, DeliveryOptions, DeliveryResult, QueuedSubmission,
	Transport,
};
pub use flow::{SubmitError, prepare_contact, prepare_waitlist};
pub use payload::{SubmissionPayload, ValidationError, is_valid_email};
pub use processor::FailedRequestProcessor;
pub use transport::{FetchTransport, TimerDelay};

/// Delivery wired to the browser's `fetch`, timers and clock.
pub type BrowserDelivery = Delivery<FetchTransport, TimerDelay, crate::clock::BrowserClock>;
