//! financify-web: client-side pieces of the Financify landing page.
//!
//! This crate provides the animated particle background rendered behind the
//! page, and the waitlist/contact submission path: validation, a local ledger
//! of sign-ups, best-effort delivery with retries and a deferred retry queue.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info};
use send_wrapper::SendWrapper;
use std::rc::Rc;

pub mod clock;
pub mod components;
pub mod config;
pub mod storage;
pub mod submission;

pub use components::forms::{ContactForm, WaitlistForm};
pub use components::particle_field::{FieldTheme, ParticleFieldCanvas};
pub use config::Config;

use clock::BrowserClock;
use components::forms::{FormServices, provide_form_services};
use storage::source_tracking::{LinkParams, build_utm_url};
use storage::{LocalStorage, SourceStore, SubmissionLedger};
use submission::{DeferredQueue, Delivery, FailedRequestProcessor, FetchTransport, TimerDelay};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("financify: logging initialized");
}

/// Background variant requested with `?theme=`, defaulting to aurora.
fn theme_from_location() -> FieldTheme {
	let name = web_sys::window()
		.and_then(|w| w.location().search().ok())
		.and_then(|search| web_sys::UrlSearchParams::new_with_str(&search).ok())
		.and_then(|params| params.get("theme"));
	match name {
		Some(name) => FieldTheme::by_name(&name),
		None => FieldTheme::default(),
	}
}

/// Main application component.
/// Wires submission services, starts the deferred queue processor and renders
/// the particle background with the sign-up forms on top.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = Config::default();
	let delivery = Rc::new(Delivery::new(
		FetchTransport::new(config.endpoint.clone()),
		TimerDelay,
		BrowserClock,
		DeferredQueue::default(),
		&config,
	));

	let processor = SendWrapper::new(FailedRequestProcessor::init(delivery.clone(), &config));
	on_cleanup(move || drop(processor.take()));

	let sources = SourceStore::new(LocalStorage);
	sources.capture_from_location(&BrowserClock);
	provide_form_services(FormServices {
		delivery,
		ledger: SubmissionLedger::new(LocalStorage, BrowserClock),
		sources,
	});

	let share_url = build_utm_url(
		&config.site_url,
		"share",
		&LinkParams {
			medium: Some("referral"),
			..LinkParams::default()
		},
	);

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Financify - Your AI Financial Coach" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<ParticleFieldCanvas theme=theme_from_location() />
		<main class="page">
			<section id="waitlist" class="cta">
				<h2>"Want early access to Financify?"</h2>
				<p>"Join our waitlist and be among the first to try it."</p>
				<WaitlistForm />
			</section>
			<section id="contact" class="contact">
				<h2>"Get in touch"</h2>
				<ContactForm />
			</section>
			<footer>
				<a href=share_url>"Share Financify"</a>
			</footer>
		</main>
	}
}
