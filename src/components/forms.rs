//! Waitlist and contact forms.
//!
//! Both forms validate locally and report problems inline. Valid submissions
//! succeed optimistically: the request is sent in the background and delivery
//! trouble (retries, deferred queueing) is only logged, never shown.

use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use send_wrapper::SendWrapper;

use crate::clock::BrowserClock;
use crate::storage::{LocalStorage, SourceStore, SubmissionLedger};
use crate::submission::{BrowserDelivery, SubmissionPayload, SubmitError, prepare_contact, prepare_waitlist};

const WAITLIST_SUCCESS: &str = "You're on the list! We'll let you know when early access opens.";
const CONTACT_SUCCESS: &str = "Thanks! Your message is on its way.";

/// Shared submission plumbing, provided to the forms through context.
pub struct FormServices {
	pub delivery: Rc<BrowserDelivery>,
	pub ledger: SubmissionLedger<LocalStorage, BrowserClock>,
	pub sources: SourceStore<LocalStorage>,
}

/// Context handle for [`FormServices`].
pub type FormServicesContext = SendWrapper<Rc<FormServices>>;

/// Make `services` available to every form below the current owner.
pub fn provide_form_services(services: FormServices) {
	provide_context::<FormServicesContext>(SendWrapper::new(Rc::new(services)));
}

#[derive(Clone, Debug, PartialEq)]
enum FormStatus {
	Idle,
	Success(String),
	Notice(String),
	Error(String),
}

impl FormStatus {
	fn class(&self) -> &'static str {
		match self {
			FormStatus::Idle => "form-status",
			FormStatus::Success(_) => "form-status success",
			FormStatus::Notice(_) => "form-status notice",
			FormStatus::Error(_) => "form-status error",
		}
	}

	fn message(&self) -> String {
		match self {
			FormStatus::Idle => String::new(),
			FormStatus::Success(m) | FormStatus::Notice(m) | FormStatus::Error(m) => m.clone(),
		}
	}
}

/// Status shown once a form has been checked. It depends only on local
/// validation; the delivery outcome is never reflected in the form.
fn status_after_submit(prepared: &Result<SubmissionPayload, SubmitError>, success: &str) -> FormStatus {
	match prepared {
		Ok(_) => FormStatus::Success(success.to_string()),
		Err(SubmitError::Duplicate) => FormStatus::Notice(SubmitError::Duplicate.to_string()),
		Err(e) => FormStatus::Error(e.to_string()),
	}
}

fn status_line(status: ReadSignal<FormStatus>) -> impl IntoView {
	view! {
		<p class=move || status.get().class() role="status" aria-live="polite">
			{move || status.get().message()}
		</p>
	}
}

/// Email capture form for the early-access waitlist.
#[component]
pub fn WaitlistForm(
	/// Button label.
	#[prop(optional, into)]
	label: Option<String>,
) -> impl IntoView {
	let services = use_context::<FormServicesContext>();
	let (email, set_email) = signal(String::new());
	let (status, set_status) = signal(FormStatus::Idle);
	let label = label.unwrap_or_else(|| "Join the Waitlist".into());

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let Some(services) = services.clone() else {
			log::error!("financify: waitlist form mounted without form services");
			return;
		};

		let source = services.sources.get_stored();
		let prepared = prepare_waitlist(&email.get_untracked(), &services.ledger, source.as_ref());
		set_status.set(status_after_submit(&prepared, WAITLIST_SUCCESS));
		if let Ok(payload) = prepared {
			set_email.set(String::new());
			let delivery = services.delivery.clone();
			spawn_local(async move {
				delivery.submit(&payload, delivery.default_options()).await;
			});
		}
	};

	view! {
		<form class="waitlist-form" on:submit=on_submit novalidate=true>
			<input
				type="email"
				placeholder="Enter your email"
				prop:value=move || email.get()
				on:input=move |ev| set_email.set(event_target_value(&ev))
			/>
			<button type="submit">{label}</button>
			{status_line(status)}
		</form>
	}
}

/// Contact form posting a name, email and message.
#[component]
pub fn ContactForm() -> impl IntoView {
	let services = use_context::<FormServicesContext>();
	let (name, set_name) = signal(String::new());
	let (email, set_email) = signal(String::new());
	let (message, set_message) = signal(String::new());
	let (status, set_status) = signal(FormStatus::Idle);

	let on_submit = move |ev: leptos::ev::SubmitEvent| {
		ev.prevent_default();
		let Some(services) = services.clone() else {
			log::error!("financify: contact form mounted without form services");
			return;
		};

		let prepared = prepare_contact(
			&name.get_untracked(),
			&email.get_untracked(),
			&message.get_untracked(),
		);
		set_status.set(status_after_submit(&prepared, CONTACT_SUCCESS));
		let Ok(payload) = prepared else {
			return;
		};

		set_name.set(String::new());
		set_email.set(String::new());
		set_message.set(String::new());
		let delivery = services.delivery.clone();
		spawn_local(async move {
			delivery.submit(&payload, delivery.default_options()).await;
		});
	};

	view! {
		<form class="contact-form" on:submit=on_submit novalidate=true>
			<input
				type="text"
				placeholder="Your name"
				prop:value=move || name.get()
				on:input=move |ev| set_name.set(event_target_value(&ev))
			/>
			<input
				type="email"
				placeholder="Your email"
				prop:value=move || email.get()
				on:input=move |ev| set_email.set(event_target_value(&ev))
			/>
			<textarea
				placeholder="How can we help?"
				prop:value=move || message.get()
				on:input=move |ev| set_message.set(event_target_value(&ev))
			/>
			<button type="submit">"Send Message"</button>
			{status_line(status)}
		</form>
	}
}
