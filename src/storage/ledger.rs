//! Local record of waitlist sign-ups, used to catch duplicates in this browser.

use serde::{Deserialize, Serialize};

use super::source_tracking::SourceData;
use super::{KeyValueStore, read_json, write_json};
use crate::clock::Clock;

/// Key holding the ledger entries.
pub const LEDGER_KEY: &str = "waitlistEmails";

/// One recorded sign-up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
	pub email: String,
	pub timestamp: String,
	#[serde(default)]
	pub source: String,
	#[serde(default)]
	pub source_data: Option<SourceData>,
}

/// Append-only list of submitted waitlist emails.
///
/// Storage problems never surface to the caller: an unreadable list is treated
/// as empty and failed writes are logged.
pub struct SubmissionLedger<S: KeyValueStore, C: Clock> {
	store: S,
	clock: C,
}

impl<S: KeyValueStore, C: Clock> SubmissionLedger<S, C> {
	pub fn new(store: S, clock: C) -> Self {
		Self { store, clock }
	}

	/// All readable entries, oldest first.
	///
	/// Entries that do not decode (e.g. written by an older page version
	/// without an email) are skipped rather than poisoning the whole list.
	pub fn entries(&self) -> Vec<LedgerEntry> {
		self.raw_entries()
			.into_iter()
			.filter_map(|v| serde_json::from_value(v).ok())
			.collect()
	}

	/// Stored entries exactly as persisted, empty when missing or unreadable.
	fn raw_entries(&self) -> Vec<serde_json::Value> {
		match read_json::<Vec<serde_json::Value>>(&self.store, LEDGER_KEY) {
			Ok(raw) => raw.unwrap_or_default(),
			Err(e) => {
				log::warn!("financify: waitlist ledger unreadable, treating as empty: {}", e);
				Vec::new()
			}
		}
	}

	/// Whether `email` was already recorded, ignoring case.
	pub fn is_duplicate(&self, email: &str) -> bool {
		let email = email.trim().to_lowercase();
		self.entries()
			.iter()
			.any(|entry| entry.email.trim().to_lowercase() == email)
	}

	/// Append a sign-up stamped with the current time and return it.
	pub fn record(
		&self,
		email: &str,
		source: &str,
		source_data: Option<SourceData>,
	) -> LedgerEntry {
		let entry = LedgerEntry {
			email: email.to_string(),
			timestamp: self.clock.now_iso(),
			source: source.to_string(),
			source_data,
		};

		// Append to the raw list so entries this version cannot decode survive
		let mut entries = self.raw_entries();
		match serde_json::to_value(&entry) {
			Ok(value) => entries.push(value),
			Err(e) => {
				log::warn!("financify: failed to encode waitlist sign-up: {}", e);
				return entry;
			}
		}
		match write_json(&self.store, LEDGER_KEY, &entries) {
			Ok(()) => log::debug!("financify: ledger now holds {} sign-ups", entries.len()),
			Err(e) => log::warn!("financify: failed to persist waitlist sign-up: {}", e),
		}
		entry
	}
}
