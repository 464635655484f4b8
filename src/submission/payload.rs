//! Submission payloads and email validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::SourceData;

/// Body posted to the submission endpoint.
///
/// Serialized with a lowercase `type` tag, e.g.
/// `{"type":"waitlist","email":"a@b.com","source":"pricing","sourceData":null}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubmissionPayload {
	Contact {
		name: String,
		email: String,
		message: String,
	},
	Waitlist {
		email: String,
		source: String,
		#[serde(rename = "sourceData")]
		source_data: Option<SourceData>,
	},
}

impl SubmissionPayload {
	pub fn email(&self) -> &str {
		match self {
			SubmissionPayload::Contact { email, .. } | SubmissionPayload::Waitlist { email, .. } => email,
		}
	}

	/// Short tag used in log lines.
	pub fn kind(&self) -> &'static str {
		match self {
			SubmissionPayload::Contact { .. } => "contact",
			SubmissionPayload::Waitlist { .. } => "waitlist",
		}
	}

	pub fn to_json(&self) -> Result<String, serde_json::Error> {
		serde_json::to_string(self)
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
	#[error("please enter an email address")]
	EmptyEmail,
	#[error("please enter a valid email address")]
	InvalidEmail,
}

/// Matches `^[^\s@]+@[^\s@]+\.[^\s@]+$`: exactly one `@`, no whitespace, and a
/// dot in the domain with text on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
	let Some((local, domain)) = email.split_once('@') else {
		return false;
	};
	let part_ok = |s: &str| !s.is_empty() && !s.contains('@') && !s.chars().any(char::is_whitespace);
	if !part_ok(local) || !part_ok(domain) {
		return false;
	}
	// The regex is greedy, so any dot with text before and after will do
	domain
		.char_indices()
		.any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate an already-trimmed email.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
	if email.is_empty() {
		return Err(ValidationError::EmptyEmail);
	}
	if !is_valid_email(email) {
		return Err(ValidationError::InvalidEmail);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn email_scenarios() {
		assert!(is_valid_email("a@b.com"));
		assert!(!is_valid_email("a@b"));
		assert!(!is_valid_email("a b@c.com"));
		assert!(!is_valid_email(""));
	}

	#[test]
	fn email_edge_cases() {
		assert!(is_valid_email("first.last@mail.co.uk"));
		assert!(is_valid_email("a@b.c.d"));
		assert!(!is_valid_email("a@@b.com"));
		assert!(!is_valid_email("a@b@c.com"));
		assert!(!is_valid_email("a@.com"));
		assert!(!is_valid_email("a@b."));
		assert!(!is_valid_email("@b.com"));
		assert!(!is_valid_email("a@b.com\t"));
	}

	#[test]
	fn validate_distinguishes_empty_from_invalid() {
		assert_eq!(validate_email(""), Err(ValidationError::EmptyEmail));
		assert_eq!(validate_email("nope"), Err(ValidationError::InvalidEmail));
		assert_eq!(validate_email("a@b.com"), Ok(()));
	}

	#[test]
	fn payload_json_layout() {
		let waitlist = SubmissionPayload::Waitlist {
			email: "a@b.com".into(),
			source: "pricing".into(),
			source_data: None,
		};
		let value: serde_json::Value = serde_json::from_str(&waitlist.to_json().unwrap()).unwrap();
		assert_eq!(value["type"], "waitlist");
		assert_eq!(value["source"], "pricing");
		assert!(value.get("sourceData").is_some());

		let contact = SubmissionPayload::Contact {
			name: "Ada".into(),
			email: "ada@b.com".into(),
			message: "hi".into(),
		};
		let value: serde_json::Value = serde_json::from_str(&contact.to_json().unwrap()).unwrap();
		assert_eq!(value["type"], "contact");
		assert_eq!(value["message"], "hi");
		assert_eq!(contact.email(), "ada@b.com");
	}
}
