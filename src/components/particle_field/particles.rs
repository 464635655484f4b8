//! Particles and decorative shapes that make up the animated field.

use std::collections::VecDeque;
use std::f64::consts::{PI, TAU};

use rand::Rng;

use super::theme::{HueBand, Hsla, ParticleStyle, ShapeStyle};

/// Distance a particle may drift past the canvas edge before wrapping.
pub const WRAP_MARGIN: f64 = 50.0;

/// Maximum number of points kept in a particle's trail.
pub const TRAIL_CAPACITY: usize = 5;

/// Chance per tick that a trailed particle records its position.
const TRAIL_APPEND_CHANCE: f64 = 0.3;

/// Twinkle phase advance per 60Hz frame.
const TWINKLE_SPEED: f64 = 0.05;

/// Outline drawn for a particle body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleShape {
	Circle,
	Square,
	Triangle,
}

impl ParticleShape {
	const ALL: [ParticleShape; 3] = [Self::Circle, Self::Square, Self::Triangle];
}

/// A remembered position, drawn as a fading copy behind the particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
	pub x: f64,
	pub y: f64,
	pub size: f64,
	pub alpha: f64,
}

/// A single floating particle.
#[derive(Clone, Debug)]
pub struct Particle {
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
	pub size: f64,
	pub min_size: f64,
	pub max_size: f64,
	pub pulse_speed: f64,
	/// +1.0 while growing, -1.0 while shrinking.
	pub pulse_direction: f64,
	pub hue: f64,
	pub saturation: f64,
	pub lightness: f64,
	pub base_alpha: f64,
	pub alpha: f64,
	pub shape: ParticleShape,
	/// Present only on the subset of particles that leave a trail.
	pub trail: Option<VecDeque<TrailPoint>>,
	/// Twinkle phase, for particles whose alpha oscillates.
	pub twinkle: Option<f64>,
}

impl Particle {
	/// Create a particle with randomized attributes somewhere inside `width x height`.
	pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, style: &ParticleStyle) -> Self {
		let size: f64 = rng.gen_range(0.5..2.5);
		let max_size = size + rng.gen_range(0.0..2.0);
		let min_size = (size - rng.gen_range(0.0..1.0)).max(0.5);

		let band = match style.accent {
			Some((accent, chance)) if rng.gen_bool(chance) => accent,
			_ => style.primary,
		};
		let alpha = rng.gen_range(0.1..0.6);
		let shape = ParticleShape::ALL[rng.gen_range(0..ParticleShape::ALL.len())];
		let trail = (style.trail_fraction > 0.0 && rng.gen_bool(style.trail_fraction.min(1.0)))
			.then(|| VecDeque::with_capacity(TRAIL_CAPACITY + 1));
		let twinkle = (style.twinkle_fraction > 0.0 && rng.gen_bool(style.twinkle_fraction.min(1.0)))
			.then(|| rng.gen_range(0.0..TAU));

		Self {
			x: rng.gen_range(0.0..=width.max(0.0)),
			y: rng.gen_range(0.0..=height.max(0.0)),
			vx: rng.gen_range(-0.25..0.25),
			vy: rng.gen_range(-0.25..0.25),
			size,
			min_size,
			max_size,
			pulse_speed: rng.gen_range(0.01..0.03),
			pulse_direction: if rng.gen_bool(0.5) { 1.0 } else { -1.0 },
			hue: sample_band(rng, band),
			saturation: rng.gen_range(70.0..100.0),
			lightness: rng.gen_range(50.0..70.0),
			base_alpha: alpha,
			alpha,
			shape,
			trail,
			twinkle,
		}
	}

	/// Current fill color.
	pub fn color(&self) -> Hsla {
		Hsla::new(self.hue, self.saturation, self.lightness, self.alpha)
	}

	/// Advance one step. `steps` is elapsed time in 60Hz frames.
	pub fn advance<R: Rng + ?Sized>(
		&mut self,
		rng: &mut R,
		steps: f64,
		width: f64,
		height: f64,
		style: &ParticleStyle,
	) {
		if let Some(trail) = self.trail.as_mut() {
			if rng.gen_bool(TRAIL_APPEND_CHANCE) {
				trail.push_back(TrailPoint {
					x: self.x,
					y: self.y,
					size: self.size * 0.6,
					alpha: self.alpha * 0.5,
				});
				while trail.len() > TRAIL_CAPACITY {
					trail.pop_front();
				}
			}
		}

		// Slight curvature for organic drift
		self.x += (self.vx + (self.y * 0.01).sin() * 0.1) * steps;
		self.y += (self.vy + (self.x * 0.01).cos() * 0.1) * steps;

		self.size += self.pulse_speed * self.pulse_direction * steps;
		if self.size >= self.max_size {
			self.size = self.max_size;
			self.pulse_direction = -1.0;
		} else if self.size <= self.min_size {
			self.size = self.min_size;
			self.pulse_direction = 1.0;
		}

		self.hue += style.hue_step * steps;
		if self.hue > style.hue_ceiling {
			self.hue = style.hue_floor;
		}

		if let Some(phase) = self.twinkle.as_mut() {
			self.alpha = (self.base_alpha * (0.4 + 0.6 * phase.sin())).max(0.0);
			*phase = (*phase + TWINKLE_SPEED * steps) % TAU;
		}

		self.x = wrap(self.x, width);
		self.y = wrap(self.y, height);
	}

	/// Scale position (and trail) by the given factors.
	pub fn rescale(&mut self, sx: f64, sy: f64) {
		self.x *= sx;
		self.y *= sy;
		if let Some(trail) = self.trail.as_mut() {
			for point in trail.iter_mut() {
				point.x *= sx;
				point.y *= sy;
			}
		}
	}
}

/// Wrap a coordinate that left `[-margin, extent + margin]` to the opposite side.
fn wrap(value: f64, extent: f64) -> f64 {
	if value < -WRAP_MARGIN {
		extent + WRAP_MARGIN
	} else if value > extent + WRAP_MARGIN {
		-WRAP_MARGIN
	} else {
		value
	}
}

fn sample_band<R: Rng + ?Sized>(rng: &mut R, band: HueBand) -> f64 {
	band.start + rng.gen_range(0.0..1.0) * band.span
}

/// Outline of a decorative shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
	Circle,
	Rect,
}

/// Large, faint, static shape painted behind the particles.
#[derive(Clone, Debug)]
pub struct DecorativeShape {
	pub x: f64,
	pub y: f64,
	pub size: f64,
	pub rotation: f64,
	pub kind: ShapeKind,
	pub color: Hsla,
}

impl DecorativeShape {
	pub fn spawn<R: Rng + ?Sized>(rng: &mut R, width: f64, height: f64, style: &ShapeStyle) -> Self {
		Self {
			x: rng.gen_range(0.0..=width.max(0.0)),
			y: rng.gen_range(0.0..=height.max(0.0)),
			size: rng.gen_range(50.0..150.0),
			rotation: rng.gen_range(0.0..PI),
			kind: if rng.gen_bool(0.5) {
				ShapeKind::Circle
			} else {
				ShapeKind::Rect
			},
			color: Hsla::new(sample_band(rng, style.hue), 70.0, 50.0, style.alpha),
		}
	}

	pub fn rescale(&mut self, sx: f64, sy: f64) {
		self.x *= sx;
		self.y *= sy;
	}
}
