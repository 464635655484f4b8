//! Browser-only checks, run with `wasm-pack test --headless --firefox`.
#![allow(unused_crate_dependencies)]
#![cfg(target_arch = "wasm32")]

use financify_web::clock::BrowserClock;
use financify_web::storage::source_tracking::{
	LinkParams, add_source_to_url, build_utm_url, content_link, email_link, paid_ad_link,
	social_media_link,
};
use financify_web::storage::{KeyValueStore, LocalStorage, SubmissionLedger};
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn local_storage_round_trips() {
	let store = LocalStorage;
	store.set("financify-test", "value").unwrap();
	assert_eq!(store.get("financify-test").unwrap().as_deref(), Some("value"));
	assert_eq!(store.get("financify-missing").unwrap(), None);
}

#[wasm_bindgen_test]
fn ledger_persists_in_local_storage() {
	let ledger = SubmissionLedger::new(LocalStorage, BrowserClock);
	let email = format!("browser-{}@test.com", js_sys::Date::now() as u64);
	assert!(!ledger.is_duplicate(&email));

	let entry = ledger.record(&email, "pricing", None);
	assert!(entry.timestamp.ends_with('Z'));
	assert!(ledger.is_duplicate(&email.to_uppercase()));
}

#[wasm_bindgen_test]
fn tracking_links_are_built_with_url_api() {
	let params = LinkParams {
		medium: Some("social"),
		campaign: Some("spring launch"),
		..LinkParams::default()
	};

	let utm = build_utm_url("https://financify.ing/", "twitter", &params);
	assert_eq!(
		utm,
		"https://financify.ing/?utm_source=twitter&utm_medium=social&utm_campaign=spring+launch"
	);

	let custom = add_source_to_url("https://financify.ing/?ref=a", "reddit", &LinkParams::default());
	assert_eq!(custom, "https://financify.ing/?ref=a&source=reddit");
}

#[wasm_bindgen_test]
fn campaign_presets_fill_medium_and_defaults() {
	let base = "https://financify.ing/";
	assert_eq!(
		social_media_link(base, "Twitter", None),
		"https://financify.ing/?utm_source=twitter&utm_medium=social&utm_campaign=social_post"
	);
	assert_eq!(
		email_link(base, "monthly_newsletter", Some("header_cta")),
		"https://financify.ing/?utm_source=email&utm_medium=email&utm_campaign=monthly_newsletter&utm_content=header_cta"
	);
	assert_eq!(
		paid_ad_link(base, "google", "launch", Some("budget app")),
		"https://financify.ing/?utm_source=google&utm_medium=cpc&utm_campaign=launch&utm_term=budget+app"
	);
	assert_eq!(
		content_link(base, "blog", "guides", None),
		"https://financify.ing/?utm_source=blog&utm_medium=referral&utm_campaign=guides"
	);
}
