//! Leptos components for the landing page.

pub mod forms;
pub mod particle_field;
