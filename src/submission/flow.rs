//! Turning raw form input into payloads ready for delivery.

use thiserror::Error;

use super::payload::{SubmissionPayload, ValidationError, validate_email};
use crate::clock::Clock;
use crate::storage::{KeyValueStore, SourceData, SubmissionLedger};

/// Source tag used when a waitlist sign-up carries no tracking data.
pub const DEFAULT_WAITLIST_SOURCE: &str = "pricing";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SubmitError {
	#[error(transparent)]
	Invalid(#[from] ValidationError),
	#[error("please fill in all fields")]
	MissingFields,
	#[error("this email is already on the waitlist")]
	Duplicate,
}

/// Validate a waitlist sign-up and record it in the ledger.
///
/// Duplicates are rejected here, before anything is sent. The sign-up is
/// recorded as soon as it passes, since delivery itself is fire-and-forget.
pub fn prepare_waitlist<S: KeyValueStore, C: Clock>(
	email: &str,
	ledger: &SubmissionLedger<S, C>,
	source: Option<&SourceData>,
) -> Result<SubmissionPayload, SubmitError> {
	let email = email.trim();
	validate_email(email)?;

	if ledger.is_duplicate(email) {
		log::info!("financify: ignoring repeat waitlist sign-up");
		return Err(SubmitError::Duplicate);
	}

	let source_tag = source
		.and_then(|s| s.source.as_deref())
		.unwrap_or(DEFAULT_WAITLIST_SOURCE)
		.to_string();
	ledger.record(email, &source_tag, source.cloned());

	Ok(SubmissionPayload::Waitlist {
		email: email.to_string(),
		source: source_tag,
		source_data: source.cloned(),
	})
}

/// Validate a contact message.
pub fn prepare_contact(name: &str, email: &str, message: &str) -> Result<SubmissionPayload, SubmitError> {
	let (name, email, message) = (name.trim(), email.trim(), message.trim());
	if name.is_empty() || email.is_empty() || message.is_empty() {
		return Err(SubmitError::MissingFields);
	}
	validate_email(email)?;

	Ok(SubmissionPayload::Contact {
		name: name.to_string(),
		email: email.to_string(),
		message: message.to_string(),
	})
}

#[cfg(test)]
mod tests {
	use futures::executor::block_on;

	use super::*;
	use crate::clock::testing::ManualClock;
	use crate::config::Config;
	use crate::storage::MemoryStore;
	use crate::submission::delivery::{DeferredQueue, Delay, Delivery, DeliveryError, DeliveryOptions, Transport};

	fn ledger() -> SubmissionLedger<MemoryStore, ManualClock> {
		SubmissionLedger::new(MemoryStore::default(), ManualClock::default())
	}

	#[test]
	fn waitlist_defaults_source_to_pricing() {
		let ledger = ledger();
		let payload = prepare_waitlist("  new@test.com ", &ledger, None).unwrap();
		assert_eq!(
			payload,
			SubmissionPayload::Waitlist {
				email: "new@test.com".into(),
				source: "pricing".into(),
				source_data: None,
			}
		);
		assert_eq!(ledger.entries()[0].source, "pricing");
	}

	#[test]
	fn waitlist_carries_tracked_source() {
		let ledger = ledger();
		let data = SourceData {
			source: Some("reddit".into()),
			campaign: Some("launch".into()),
			timestamp: "t".into(),
			..SourceData::default()
		};
		let payload = prepare_waitlist("a@b.com", &ledger, Some(&data)).unwrap();
		match payload {
			SubmissionPayload::Waitlist { source, source_data, .. } => {
				assert_eq!(source, "reddit");
				assert_eq!(source_data, Some(data));
			}
			other => panic!("unexpected payload {:?}", other),
		}
	}

	#[test]
	fn invalid_waitlist_email_is_not_recorded() {
		let ledger = ledger();
		assert_eq!(
			prepare_waitlist("a@b", &ledger, None),
			Err(SubmitError::Invalid(ValidationError::InvalidEmail))
		);
		assert_eq!(
			prepare_waitlist("   ", &ledger, None),
			Err(SubmitError::Invalid(ValidationError::EmptyEmail))
		);
		assert!(ledger.entries().is_empty());
	}

	#[test]
	fn contact_requires_every_field() {
		assert_eq!(prepare_contact("", "a@b.com", "hi"), Err(SubmitError::MissingFields));
		assert_eq!(prepare_contact("Ada", "a@b.com", "  "), Err(SubmitError::MissingFields));
		assert_eq!(
			prepare_contact("Ada", "a b@c.com", "hi"),
			Err(SubmitError::Invalid(ValidationError::InvalidEmail))
		);
		let payload = prepare_contact(" Ada ", "ada@b.com", " hello ").unwrap();
		assert_eq!(
			payload,
			SubmissionPayload::Contact {
				name: "Ada".into(),
				email: "ada@b.com".into(),
				message: "hello".into(),
			}
		);
	}

	struct CountingTransport(std::cell::Cell<usize>);

	impl Transport for &CountingTransport {
		async fn send(&self, _body: &str) -> Result<(), DeliveryError> {
			self.0.set(self.0.get() + 1);
			Ok(())
		}
	}

	struct NoDelay;

	impl Delay for NoDelay {
		async fn wait(&self, _ms: u32) {}
	}

	#[test]
	fn repeat_sign_up_is_rejected_before_delivery() {
		let ledger = ledger();
		let transport = CountingTransport(std::cell::Cell::new(0));
		let delivery = Delivery::new(
			&transport,
			NoDelay,
			ManualClock::default(),
			DeferredQueue::default(),
			&Config::default(),
		);

		let payload = prepare_waitlist("new@test.com", &ledger, None).unwrap();
		assert!(block_on(delivery.submit(&payload, DeliveryOptions::default())).is_attempted());

		let entries = ledger.entries();
		assert_eq!(entries.len(), 1);
		assert_eq!(entries[0].email, "new@test.com");
		assert!(!entries[0].timestamp.is_empty());

		assert_eq!(
			prepare_waitlist("NEW@Test.com", &ledger, None),
			Err(SubmitError::Duplicate)
		);
		assert_eq!(transport.0.get(), 1);
		assert_eq!(ledger.entries().len(), 1);
	}
}
