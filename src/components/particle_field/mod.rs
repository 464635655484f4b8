//! Animated particle background.
//!
//! Renders a decorative particle field on a full-viewport canvas with:
//! - Drifting, pulsing, hue-cycling particles, some with fading trails
//! - Faint static shapes over a dark radial gradient
//! - Gradient lines between nearby particles, capped per particle
//! - Particle counts scaled to the device (width, cores, reduced motion)
//! - Pausing while the canvas is off screen or the tab is hidden
//!
//! The simulation ([`ParticleField`]) is plain data advanced by
//! [`ParticleField::advance`]; only [`render`] touches the canvas.
//!
//! # Example
//!
//! ```ignore
//! use financify_web::components::particle_field::{FieldTheme, ParticleFieldCanvas};
//!
//! view! { <ParticleFieldCanvas theme=FieldTheme::twilight() /> }
//! ```

pub mod budget;
mod component;
pub mod particles;
pub mod render;
pub mod state;
pub mod theme;
pub mod visibility;

pub use budget::{DeviceClass, DeviceHints, ParticleBudget};
pub use component::ParticleFieldCanvas;
pub use state::{Connection, ParticleField};
pub use theme::FieldTheme;
pub use visibility::{FrameGate, FrameScheduler, PlaybackState, VisibilityController};
