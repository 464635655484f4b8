//! Particle field simulation state.
//!
//! Owns the particles and decorative shapes, advances them once per animation
//! tick, and works out which particle pairs are close enough to be joined. None
//! of this touches the canvas; drawing lives in [`super::render`].

use rand::Rng;

use super::budget::{DeviceHints, ParticleBudget};
use super::particles::{DecorativeShape, Particle};
use super::theme::{ConnectionStyle, FieldTheme};

/// A line to draw between particles `a` and `b` (indices, `a < b`).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Connection {
	pub a: usize,
	pub b: usize,
	pub distance: f64,
}

impl Connection {
	/// Stroke width for this connection: `(1 - d / threshold) * max_width`.
	pub fn width(&self, style: &ConnectionStyle) -> f64 {
		(1.0 - self.distance / style.threshold) * style.max_width
	}
}

/// The simulated field: particles, decorative shapes and canvas bounds.
pub struct ParticleField {
	pub particles: Vec<Particle>,
	pub shapes: Vec<DecorativeShape>,
	pub width: f64,
	pub height: f64,
	/// Particle count the current device budget would pick for this width.
	pub target_count: usize,
	hints: DeviceHints,
}

impl ParticleField {
	pub fn new<R: Rng + ?Sized>(
		rng: &mut R,
		width: f64,
		height: f64,
		hints: &DeviceHints,
		theme: &FieldTheme,
	) -> Self {
		let count = ParticleBudget::for_hints(hints, width).particle_count(width);
		let particles = (0..count)
			.map(|_| Particle::spawn(rng, width, height, &theme.particles))
			.collect();
		let shapes = (0..theme.shapes.count)
			.map(|_| DecorativeShape::spawn(rng, width, height, &theme.shapes))
			.collect();

		Self {
			particles,
			shapes,
			width,
			height,
			target_count: count,
			hints: *hints,
		}
	}

	/// Advance every particle by `dt` seconds.
	pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, dt: f64, theme: &FieldTheme) {
		let steps = dt * 60.0;
		let (width, height) = (self.width, self.height);
		for p in &mut self.particles {
			p.advance(rng, steps, width, height, &theme.particles);
		}
	}

	/// Resize the field bounds, rescaling existing positions proportionally.
	///
	/// Particles are kept rather than recreated; only the target count is updated.
	pub fn resize(&mut self, width: f64, height: f64) {
		if self.width > 0.0 && self.height > 0.0 {
			let (sx, sy) = (width / self.width, height / self.height);
			for p in &mut self.particles {
				p.rescale(sx, sy);
			}
			for s in &mut self.shapes {
				s.rescale(sx, sy);
			}
		}

		self.width = width;
		self.height = height;
		self.target_count = ParticleBudget::for_hints(&self.hints, width).particle_count(width);
	}

	/// Pairs closer than the threshold, each unordered pair at most once.
	///
	/// Distances are compared squared; the square root is only taken for pairs
	/// that will actually be drawn. No particle takes part in more than
	/// `per_particle_cap` connections.
	pub fn connections(&self, style: &ConnectionStyle) -> Vec<Connection> {
		let threshold_sq = style.threshold * style.threshold;
		let n = self.particles.len();
		let mut degree = vec![0usize; n];
		let mut out = Vec::new();

		for a in 0..n {
			if degree[a] >= style.per_particle_cap {
				continue;
			}
			let pa = &self.particles[a];
			for b in (a + 1)..n {
				if degree[b] >= style.per_particle_cap {
					continue;
				}
				let pb = &self.particles[b];
				let (dx, dy) = (pa.x - pb.x, pa.y - pb.y);
				let dist_sq = dx * dx + dy * dy;
				if dist_sq >= threshold_sq {
					continue;
				}

				out.push(Connection {
					a,
					b,
					distance: dist_sq.sqrt(),
				});
				degree[a] += 1;
				degree[b] += 1;
				if degree[a] >= style.per_particle_cap {
					break;
				}
			}
		}

		out
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::SeedableRng;
	use rand::rngs::SmallRng;

	use super::*;
	use crate::components::particle_field::particles::WRAP_MARGIN;

	fn field(seed: u64) -> (ParticleField, SmallRng) {
		let mut rng = SmallRng::seed_from_u64(seed);
		let field = ParticleField::new(
			&mut rng,
			1280.0,
			720.0,
			&DeviceHints::default(),
			&FieldTheme::aurora(),
		);
		(field, rng)
	}

	fn place(field: &mut ParticleField, points: &[(f64, f64)]) {
		field.particles.truncate(points.len());
		for (p, &(x, y)) in field.particles.iter_mut().zip(points) {
			p.x = x;
			p.y = y;
		}
	}

	#[test]
	fn initial_count_follows_budget() {
		let (field, _) = field(1);
		assert_eq!(field.particles.len(), 85);
		assert_eq!(field.shapes.len(), 15);
		for p in &field.particles {
			assert!(p.x >= 0.0 && p.x <= 1280.0);
			assert!(p.y >= 0.0 && p.y <= 720.0);
		}
	}

	#[test]
	fn same_seed_gives_same_field() {
		let (a, _) = field(11);
		let (b, _) = field(11);
		let pa: Vec<_> = a.particles.iter().map(|p| (p.x, p.y, p.hue)).collect();
		let pb: Vec<_> = b.particles.iter().map(|p| (p.x, p.y, p.hue)).collect();
		assert_eq!(pa, pb);
	}

	#[test]
	fn advance_keeps_every_particle_in_bounds() {
		let (mut field, mut rng) = field(2);
		let theme = FieldTheme::aurora();
		for _ in 0..1_000 {
			field.advance(&mut rng, 1.0 / 60.0, &theme);
			for p in &field.particles {
				assert!(p.size >= p.min_size && p.size <= p.max_size);
				assert!(p.x >= -WRAP_MARGIN && p.x <= field.width + WRAP_MARGIN);
				assert!(p.y >= -WRAP_MARGIN && p.y <= field.height + WRAP_MARGIN);
			}
		}
	}

	#[test]
	fn resize_rescales_positions_proportionally() {
		let (mut field, _) = field(3);
		let before: Vec<_> = field.particles.iter().map(|p| (p.x, p.y)).collect();
		let shapes_before: Vec<_> = field.shapes.iter().map(|s| (s.x, s.y)).collect();
		let count = field.particles.len();

		field.resize(640.0, 1440.0);

		assert_eq!(field.particles.len(), count);
		for (p, (x, y)) in field.particles.iter().zip(before) {
			assert!((p.x - x * 0.5).abs() < 1e-9);
			assert!((p.y - y * 2.0).abs() < 1e-9);
		}
		for (s, (x, y)) in field.shapes.iter().zip(shapes_before) {
			assert!((s.x - x * 0.5).abs() < 1e-9);
			assert!((s.y - y * 2.0).abs() < 1e-9);
		}
		assert_eq!(field.target_count, 25);
	}

	#[test]
	fn connections_respect_threshold() {
		let (mut field, _) = field(4);
		let style = ConnectionStyle::default();
		place(
			&mut field,
			&[(0.0, 0.0), (119.9, 0.0), (0.0, 120.0), (500.0, 500.0)],
		);

		let links = field.connections(&style);
		let pairs: HashSet<_> = links.iter().map(|c| (c.a, c.b)).collect();
		assert!(pairs.contains(&(0, 1)));
		assert!(!pairs.contains(&(0, 2)), "exactly at threshold is not joined");
		assert!(!pairs.iter().any(|&(a, b)| a == 3 || b == 3));
	}

	#[test]
	fn connections_are_unique_unordered_pairs() {
		let (mut field, _) = field(5);
		let style = ConnectionStyle {
			per_particle_cap: usize::MAX,
			..ConnectionStyle::default()
		};
		place(&mut field, &[(10.0, 10.0), (20.0, 20.0), (30.0, 10.0)]);

		let links = field.connections(&style);
		assert_eq!(links.len(), 3);
		let mut seen = HashSet::new();
		for c in &links {
			assert!(c.a < c.b);
			assert!(seen.insert((c.a, c.b)));
			assert!(!seen.contains(&(c.b, c.a)));
		}
	}

	#[test]
	fn connection_count_per_particle_is_capped() {
		let (mut field, _) = field(6);
		let style = ConnectionStyle::default();
		let cluster: Vec<_> = (0..20).map(|i| (100.0 + i as f64, 100.0)).collect();
		place(&mut field, &cluster);

		let links = field.connections(&style);
		let mut degree = vec![0; 20];
		for c in &links {
			degree[c.a] += 1;
			degree[c.b] += 1;
		}
		assert!(degree.iter().all(|&d| d <= style.per_particle_cap));
		assert!(!links.is_empty());
	}

	#[test]
	fn connection_width_shrinks_with_distance() {
		let style = ConnectionStyle::default();
		let near = Connection {
			a: 0,
			b: 1,
			distance: 0.0,
		};
		let far = Connection {
			a: 0,
			b: 1,
			distance: 60.0,
		};
		assert!((near.width(&style) - 0.8).abs() < 1e-9);
		assert!((far.width(&style) - 0.4).abs() < 1e-9);
	}
}
