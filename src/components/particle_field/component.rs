//! Leptos component wrapping the particle field canvas.
//!
//! The component creates a full-viewport canvas behind the page content and
//! drives the simulation from `requestAnimationFrame`. Frames are gated on
//! visibility: an `IntersectionObserver` watches the canvas and a
//! `visibilitychange` listener watches the document. Window resizes are
//! debounced and rescale the existing particles. Everything registered here is
//! removed again when the component unmounts.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use leptos::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use send_wrapper::SendWrapper;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Document, HtmlCanvasElement, IntersectionObserver,
	IntersectionObserverEntry, IntersectionObserverInit, Window,
};

use super::budget::DeviceHints;
use super::render;
use super::state::ParticleField;
use super::theme::FieldTheme;
use super::visibility::{FrameGate, FrameScheduler, is_offscreen};
use crate::config::{RESIZE_DEBOUNCE_MS, VISIBILITY_THRESHOLD};

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Longest simulated step, so a resumed tab does not jump.
const MAX_FRAME_DT: f64 = 0.05;

/// Requests frames from the window using the shared animate closure.
struct WindowScheduler {
	window: Window,
	callback: FrameCallback,
}

impl FrameScheduler for WindowScheduler {
	fn request_frame(&self) -> Option<i32> {
		let callback = self.callback.borrow();
		let cb = callback.as_ref()?;
		self.window
			.request_animation_frame(cb.as_ref().unchecked_ref())
			.ok()
	}

	fn cancel_frame(&self, handle: i32) {
		let _ = self.window.cancel_animation_frame(handle);
	}
}

/// Bundles simulation state with its drawing context and frame gate.
struct FieldContext {
	field: ParticleField,
	theme: FieldTheme,
	rng: SmallRng,
	ctx: CanvasRenderingContext2d,
	canvas: HtmlCanvasElement,
	gate: FrameGate<WindowScheduler>,
	last_frame: Option<f64>,
}

/// Browser listeners that must be released on unmount.
#[derive(Default)]
struct Listeners {
	resize: Option<Closure<dyn FnMut()>>,
	visibility: Option<Closure<dyn FnMut()>>,
	observer: Option<(
		IntersectionObserver,
		Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
	)>,
	debounce: Option<Timeout>,
}

fn viewport_size(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
	(dim(window.inner_width()), dim(window.inner_height()))
}

fn seeded_rng() -> SmallRng {
	let seed = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
	SmallRng::seed_from_u64(seed ^ js_sys::Date::now() as u64)
}

/// Renders the animated particle background on a fixed, full-viewport canvas.
///
/// The canvas sits behind all page content. If the browser cannot provide a 2D
/// context the component renders an empty canvas and logs a warning.
#[component]
pub fn ParticleFieldCanvas(
	#[prop(default = FieldTheme::default())] theme: FieldTheme,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<FieldContext>>> = Rc::new(RefCell::new(None));
	let animate: FrameCallback = Rc::new(RefCell::new(None));
	let listeners: Rc<RefCell<Listeners>> = Rc::new(RefCell::new(Listeners::default()));
	let (context_init, animate_init, listeners_init) =
		(context.clone(), animate.clone(), listeners.clone());

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if context_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(document) = window.document() else {
			return;
		};

		let ctx = match canvas.get_context("2d") {
			Ok(Some(obj)) => match obj.dyn_into::<CanvasRenderingContext2d>() {
				Ok(ctx) => ctx,
				Err(_) => {
					log::warn!("financify: canvas context is not 2d, background disabled");
					return;
				}
			},
			_ => {
				log::warn!("financify: no 2d canvas context, background disabled");
				return;
			}
		};

		let (w, h) = viewport_size(&window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let hints = DeviceHints::detect();
		let mut rng = seeded_rng();
		let field = ParticleField::new(&mut rng, w, h, &hints, &theme);
		log::info!(
			"financify: particle field {}x{} with {} particles ({:?}, theme {})",
			w,
			h,
			field.particles.len(),
			hints.class(w),
			theme.name
		);

		let scheduler = WindowScheduler {
			window: window.clone(),
			callback: animate_init.clone(),
		};
		*context_init.borrow_mut() = Some(FieldContext {
			field,
			theme: theme.clone(),
			rng,
			ctx,
			canvas: canvas.clone(),
			gate: FrameGate::new(scheduler),
			last_frame: None,
		});

		let context_anim = context_init.clone();
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let mut guard = context_anim.borrow_mut();
			let Some(c) = guard.as_mut() else {
				return;
			};
			if !c.gate.on_frame() {
				c.last_frame = None;
				return;
			}
			let now = js_sys::Date::now();
			let dt = c
				.last_frame
				.map(|last| ((now - last) / 1000.0).clamp(0.0, MAX_FRAME_DT))
				.unwrap_or(1.0 / 60.0);
			c.last_frame = Some(now);

			c.field.advance(&mut c.rng, dt, &c.theme);
			render::render(&c.field, &c.ctx, &c.theme);
			c.gate.schedule_next();
		}));

		register_resize(&window, &context_init, &listeners_init);
		register_visibility(&document, &context_init, &listeners_init);
		register_observer(&canvas, &context_init, &listeners_init);

		if let Some(ref mut c) = *context_init.borrow_mut() {
			c.gate.set_hidden(document.hidden());
			c.gate.start();
		}
	});

	let teardown = SendWrapper::new(move || {
		if let Some(mut c) = context.borrow_mut().take() {
			c.gate.teardown();
		}

		let mut l = listeners.borrow_mut();
		if let Some(window) = web_sys::window() {
			if let Some(cb) = l.resize.take() {
				let _ = window.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
			if let (Some(document), Some(cb)) = (window.document(), l.visibility.take()) {
				let _ = document
					.remove_event_listener_with_callback("visibilitychange", cb.as_ref().unchecked_ref());
			}
		}
		if let Some((observer, _cb)) = l.observer.take() {
			observer.disconnect();
		}
		// Dropping a gloo Timeout cancels it
		l.debounce = None;

		*animate.borrow_mut() = None;
		log::debug!("financify: particle field torn down");
	});
	on_cleanup(move || (teardown.take())());

	view! {
		<canvas
			node_ref=canvas_ref
			class="particle-field-canvas"
			aria-hidden="true"
			style="position: fixed; inset: 0; width: 100%; height: 100%; z-index: 0; pointer-events: none; opacity: 0.7;"
		/>
	}
}

fn register_resize(
	window: &Window,
	context: &Rc<RefCell<Option<FieldContext>>>,
	listeners: &Rc<RefCell<Listeners>>,
) {
	let (context_resize, listeners_resize) = (context.clone(), listeners.clone());
	let cb = Closure::<dyn FnMut()>::new(move || {
		let context_settled = context_resize.clone();
		// Replacing the previous timeout cancels it
		listeners_resize.borrow_mut().debounce = Some(Timeout::new(RESIZE_DEBOUNCE_MS, move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = viewport_size(&win);
			if let Some(ref mut c) = *context_settled.borrow_mut() {
				c.canvas.set_width(nw as u32);
				c.canvas.set_height(nh as u32);
				c.field.resize(nw, nh);
				log::debug!(
					"financify: resized to {}x{}, budget now {} (keeping {})",
					nw,
					nh,
					c.field.target_count,
					c.field.particles.len()
				);
			}
		}));
	});
	let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
	listeners.borrow_mut().resize = Some(cb);
}

fn register_visibility(
	document: &Document,
	context: &Rc<RefCell<Option<FieldContext>>>,
	listeners: &Rc<RefCell<Listeners>>,
) {
	let (context_vis, document_vis) = (context.clone(), document.clone());
	let cb = Closure::<dyn FnMut()>::new(move || {
		if let Some(ref mut c) = *context_vis.borrow_mut() {
			c.gate.set_hidden(document_vis.hidden());
		}
	});
	let _ = document.add_event_listener_with_callback("visibilitychange", cb.as_ref().unchecked_ref());
	listeners.borrow_mut().visibility = Some(cb);
}

fn register_observer(
	canvas: &HtmlCanvasElement,
	context: &Rc<RefCell<Option<FieldContext>>>,
	listeners: &Rc<RefCell<Listeners>>,
) {
	let context_obs = context.clone();
	let cb = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
		move |entries: js_sys::Array, _observer: IntersectionObserver| {
			let Some(entry) = entries.iter().last() else {
				return;
			};
			let entry: IntersectionObserverEntry = entry.unchecked_into();
			if let Some(ref mut c) = *context_obs.borrow_mut() {
				c.gate.set_offscreen(is_offscreen(
					entry.is_intersecting(),
					entry.intersection_ratio(),
					VISIBILITY_THRESHOLD,
				));
			}
		},
	);

	let options = IntersectionObserverInit::new();
	options.set_threshold(&js_sys::Array::of2(&JsValue::from_f64(0.0), &JsValue::from_f64(VISIBILITY_THRESHOLD)));
	match IntersectionObserver::new_with_options(cb.as_ref().unchecked_ref(), &options) {
		Ok(observer) => {
			observer.observe(canvas);
			listeners.borrow_mut().observer = Some((observer, cb));
		}
		Err(e) => {
			log::warn!("financify: IntersectionObserver unavailable: {:?}", e);
		}
	}
}
