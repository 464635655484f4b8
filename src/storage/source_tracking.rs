//! Visit source tracking.
//!
//! Captures where a visitor came from, either from `?source=` / `utm_*` query
//! parameters or from the referrer host, and keeps the latest record plus a
//! short history in local storage so later form submissions can carry it.

use serde::{Deserialize, Serialize};

use super::{KeyValueStore, read_json, write_json};
use crate::clock::Clock;

/// Key holding the most recent [`SourceData`].
pub const SOURCE_KEY: &str = "source_tracking";
/// Key holding recent [`SourceData`] records, newest first.
pub const HISTORY_KEY: &str = "source_tracking_history";
/// Maximum number of records kept in the history.
pub const HISTORY_CAP: usize = 10;

/// Query parameters that carry tracking data, custom name first.
const PARAMS: [(&str, &str); 5] = [
	("source", "utm_source"),
	("medium", "utm_medium"),
	("campaign", "utm_campaign"),
	("term", "utm_term"),
	("content", "utm_content"),
];

/// Where a visit came from.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceData {
	pub source: Option<String>,
	pub medium: Option<String>,
	pub campaign: Option<String>,
	pub term: Option<String>,
	pub content: Option<String>,
	pub referrer: Option<String>,
	pub timestamp: String,
}

/// Build a [`SourceData`] from query parameters and the referrer.
///
/// `lookup` returns the value of a query parameter. Custom parameters win over
/// their `utm_` counterparts; without either, the source is derived from
/// `referrer_host`.
pub fn source_from_params(
	lookup: impl Fn(&str) -> Option<String>,
	referrer: Option<String>,
	referrer_host: Option<&str>,
	timestamp: String,
) -> SourceData {
	let param = |(custom, utm): (&str, &str)| {
		lookup(custom)
			.filter(|v| !v.is_empty())
			.or_else(|| lookup(utm).filter(|v| !v.is_empty()))
	};
	let [source, medium, campaign, term, content] = PARAMS.map(param);

	SourceData {
		source: source.or_else(|| referrer_host.map(classify_referrer_host)),
		medium,
		campaign,
		term,
		content,
		referrer,
		timestamp,
	}
}

/// Map a referrer hostname to a well-known source name, or the host itself.
pub fn classify_referrer_host(host: &str) -> String {
	let host = host.to_lowercase();
	const KNOWN: [(&str, &str); 9] = [
		("twitter.com", "twitter"),
		("x.com", "twitter"),
		("facebook.com", "facebook"),
		("linkedin.com", "linkedin"),
		("instagram.com", "instagram"),
		("reddit.com", "reddit"),
		("youtube.com", "youtube"),
		("tiktok.com", "tiktok"),
		("google.com", "google"),
	];
	KNOWN
		.iter()
		.find(|(domain, _)| host == *domain || host.ends_with(&format!(".{}", domain)))
		.map(|(_, name)| name.to_string())
		.unwrap_or(host)
}

/// Persisted source tracking records.
pub struct SourceStore<S: KeyValueStore> {
	store: S,
}

impl<S: KeyValueStore> SourceStore<S> {
	pub fn new(store: S) -> Self {
		Self { store }
	}

	/// Save `data` as the latest record and prepend it to the history.
	pub fn store(&self, data: &SourceData) {
		if let Err(e) = write_json(&self.store, SOURCE_KEY, data) {
			log::warn!("financify: failed to store source data: {}", e);
			return;
		}

		let mut history = self.history();
		history.insert(0, data.clone());
		history.truncate(HISTORY_CAP);
		if let Err(e) = write_json(&self.store, HISTORY_KEY, &history) {
			log::warn!("financify: failed to store source history: {}", e);
		}
	}

	/// The latest record, or `None` if absent or unreadable.
	pub fn get_stored(&self) -> Option<SourceData> {
		read_json(&self.store, SOURCE_KEY).ok().flatten()
	}

	/// Stored history, newest first. Unreadable history reads as empty.
	pub fn history(&self) -> Vec<SourceData> {
		match read_json(&self.store, HISTORY_KEY) {
			Ok(history) => history.unwrap_or_default(),
			Err(e) => {
				log::warn!("financify: discarding unreadable source history: {}", e);
				Vec::new()
			}
		}
	}

	/// Read the current page's location and referrer and store the result when
	/// it names a source.
	pub fn capture_from_location(&self, clock: &impl Clock) -> Option<SourceData> {
		let window = web_sys::window()?;
		let search = window.location().search().ok()?;
		let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
		let referrer = window
			.document()
			.map(|d| d.referrer())
			.filter(|r| !r.is_empty());
		let host = referrer
			.as_deref()
			.and_then(|r| web_sys::Url::new(r).ok())
			.map(|u| u.hostname());

		let data = source_from_params(
			|key| params.get(key),
			referrer,
			host.as_deref(),
			clock.now_iso(),
		);

		if data.source.is_some() {
			log::info!(
				"financify: visit from {:?} (medium {:?}, campaign {:?})",
				data.source,
				data.medium,
				data.campaign
			);
			self.store(&data);
		}
		Some(data)
	}
}

/// Optional tracking parameters for a generated link.
#[derive(Clone, Debug, Default)]
pub struct LinkParams<'a> {
	pub medium: Option<&'a str>,
	pub campaign: Option<&'a str>,
	pub term: Option<&'a str>,
	pub content: Option<&'a str>,
}

/// Append `?source=` style tracking parameters to `url`.
pub fn add_source_to_url(url: &str, source: &str, params: &LinkParams<'_>) -> String {
	tagged_url(
		url,
		[
			("source", Some(source)),
			("medium", params.medium),
			("campaign", params.campaign),
			("term", params.term),
			("content", params.content),
		],
	)
}

/// Append standard `utm_*` parameters to `url`.
pub fn build_utm_url(url: &str, source: &str, params: &LinkParams<'_>) -> String {
	tagged_url(
		url,
		[
			("utm_source", Some(source)),
			("utm_medium", params.medium),
			("utm_campaign", params.campaign),
			("utm_term", params.term),
			("utm_content", params.content),
		],
	)
}

/// Campaign link for a social media post, e.g. `social_media_link(site, "Twitter", Some("launch"))`.
pub fn social_media_link(base_url: &str, platform: &str, campaign: Option<&str>) -> String {
	build_utm_url(
		base_url,
		&platform.to_lowercase(),
		&LinkParams {
			medium: Some("social"),
			campaign: Some(campaign.unwrap_or("social_post")),
			..LinkParams::default()
		},
	)
}

/// Campaign link for a newsletter or other email.
pub fn email_link(base_url: &str, campaign: &str, content: Option<&str>) -> String {
	build_utm_url(
		base_url,
		"email",
		&LinkParams {
			medium: Some("email"),
			campaign: Some(campaign),
			content,
			..LinkParams::default()
		},
	)
}

/// Campaign link for a paid (cost per click) ad.
pub fn paid_ad_link(base_url: &str, source: &str, campaign: &str, term: Option<&str>) -> String {
	build_utm_url(
		base_url,
		source,
		&LinkParams {
			medium: Some("cpc"),
			campaign: Some(campaign),
			term,
			..LinkParams::default()
		},
	)
}

/// Campaign link placed in a blog post or other content.
pub fn content_link(base_url: &str, source: &str, campaign: &str, content: Option<&str>) -> String {
	build_utm_url(
		base_url,
		source,
		&LinkParams {
			medium: Some("referral"),
			campaign: Some(campaign),
			content,
			..LinkParams::default()
		},
	)
}

fn tagged_url(url: &str, pairs: [(&str, Option<&str>); 5]) -> String {
	if let Ok(parsed) = web_sys::Url::new(url) {
		let search = parsed.search_params();
		for (key, value) in pairs {
			if let Some(value) = value {
				search.set(key, value);
			}
		}
		return parsed.href();
	}

	let query: Vec<String> = pairs
		.iter()
		.filter_map(|(key, value)| {
			value.map(|v| format!("{}={}", key, String::from(js_sys::encode_uri_component(v))))
		})
		.collect();
	let separator = if url.contains('?') { '&' } else { '?' };
	format!("{}{}{}", url, separator, query.join("&"))
}
