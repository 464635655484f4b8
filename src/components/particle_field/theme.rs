//! Visual theming for the particle field.
//!
//! Provides colors, background gradients, particle hue ranges, and the named
//! variants used on the landing page.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn to_css(self) -> String {
		format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
	}
}

/// HSLA color, the native color space of the particles.
///
/// Hue is in degrees, saturation and lightness in percent, alpha in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsla {
	pub h: f64,
	pub s: f64,
	pub l: f64,
	pub a: f64,
}

impl Hsla {
	pub const fn new(h: f64, s: f64, l: f64, a: f64) -> Self {
		Self { h, s, l, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	pub fn to_css(self) -> String {
		format!("hsla({:.1}, {:.1}%, {:.1}%, {:.3})", self.h, self.s, self.l, self.a)
	}
}

/// A gradient color stop at `offset` in `[0, 1]`.
#[derive(Clone, Copy, Debug)]
pub struct GradientStop {
	pub offset: f64,
	pub color: Color,
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Radial gradient stops, center outwards.
	pub stops: Vec<GradientStop>,
	/// Vertical position of the gradient center as a fraction of the height.
	pub center_y: f64,
	/// Optional top-to-bottom linear overlay drawn over the radial gradient.
	pub overlay: Option<(Color, Color)>,
}

/// Hue range a particle's initial hue is drawn from.
#[derive(Clone, Copy, Debug)]
pub struct HueBand {
	pub start: f64,
	pub span: f64,
}

/// Particle color and motion style.
#[derive(Clone, Debug)]
pub struct ParticleStyle {
	/// Band most particles draw their hue from.
	pub primary: HueBand,
	/// Optional second band and the probability of picking it.
	pub accent: Option<(HueBand, f64)>,
	/// Hue wraps back to `hue_floor` once it passes `hue_ceiling`.
	pub hue_floor: f64,
	pub hue_ceiling: f64,
	/// Hue advance per tick
	pub hue_step: f64,
	/// Fraction of particles carrying a fading trail (0 disables trails).
	pub trail_fraction: f64,
	/// Fraction of particles whose alpha twinkles.
	pub twinkle_fraction: f64,
	/// Draw a radial glow halo behind each particle ("star" look).
	pub glow: bool,
}

/// Static decorative shape style.
#[derive(Clone, Debug)]
pub struct ShapeStyle {
	pub hue: HueBand,
	pub alpha: f64,
	pub count: usize,
}

/// Connection line style between nearby particles.
#[derive(Clone, Debug)]
pub struct ConnectionStyle {
	/// Maximum distance in pixels for two particles to be joined.
	pub threshold: f64,
	/// Line width at zero distance; scales down linearly to 0 at `threshold`.
	pub max_width: f64,
	/// Upper bound on lines drawn from one particle.
	pub per_particle_cap: usize,
}

/// Complete visual theme of the field.
#[derive(Clone, Debug)]
pub struct FieldTheme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub particles: ParticleStyle,
	pub shapes: ShapeStyle,
	pub connections: ConnectionStyle,
}

impl FieldTheme {
	/// Lavender and mint particles with trails over a deep purple gradient (default).
	pub fn aurora() -> Self {
		Self {
			name: "aurora",
			background: BackgroundStyle {
				stops: vec![
					GradientStop {
						offset: 0.0,
						color: Color::rgb(20, 17, 35),
					},
					GradientStop {
						offset: 0.5,
						color: Color::rgb(15, 12, 30),
					},
					GradientStop {
						offset: 1.0,
						color: Color::rgb(10, 8, 20),
					},
				],
				center_y: 1.0 / 3.0,
				overlay: None,
			},
			particles: ParticleStyle {
				primary: HueBand {
					start: 160.0,
					span: 40.0,
				},
				accent: Some((
					HueBand {
						start: 140.0,
						span: 40.0,
					},
					0.3,
				)),
				hue_floor: 140.0,
				hue_ceiling: 280.0,
				hue_step: 0.1,
				trail_fraction: 0.2,
				twinkle_fraction: 0.0,
				glow: false,
			},
			shapes: ShapeStyle {
				hue: HueBand {
					start: 160.0,
					span: 60.0,
				},
				alpha: 0.03,
				count: 15,
			},
			connections: ConnectionStyle::default(),
		}
	}

	/// Blue-to-purple particles without trails over an almost black gradient.
	pub fn twilight() -> Self {
		Self {
			name: "twilight",
			background: BackgroundStyle {
				stops: vec![
					GradientStop {
						offset: 0.0,
						color: Color::rgb(15, 12, 30),
					},
					GradientStop {
						offset: 0.5,
						color: Color::rgb(10, 8, 25),
					},
					GradientStop {
						offset: 1.0,
						color: Color::rgb(5, 4, 15),
					},
				],
				center_y: 1.0 / 3.0,
				overlay: None,
			},
			particles: ParticleStyle {
				primary: HueBand {
					start: 220.0,
					span: 60.0,
				},
				accent: None,
				hue_floor: 220.0,
				hue_ceiling: 280.0,
				hue_step: 0.1,
				trail_fraction: 0.0,
				twinkle_fraction: 0.0,
				glow: false,
			},
			shapes: ShapeStyle {
				hue: HueBand {
					start: 220.0,
					span: 60.0,
				},
				alpha: 0.03,
				count: 15,
			},
			connections: ConnectionStyle::default(),
		}
	}

	/// Twinkling, glowing particles with a faint vertical overlay.
	pub fn starfield() -> Self {
		let mut theme = Self::twilight();
		theme.name = "starfield";
		theme.background.overlay = Some((Color::rgba(40, 30, 80, 0.08), Color::rgba(0, 0, 0, 0.0)));
		theme.particles.twinkle_fraction = 0.5;
		theme.particles.glow = true;
		theme.shapes.count = 8;
		theme
	}

	/// Look up a variant by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"twilight" => Self::twilight(),
			"starfield" | "star" => Self::starfield(),
			_ => Self::aurora(),
		}
	}
}

impl Default for ConnectionStyle {
	fn default() -> Self {
		Self {
			threshold: 120.0,
			max_width: 0.8,
			per_particle_cap: 4,
		}
	}
}

impl Default for FieldTheme {
	fn default() -> Self {
		Self::aurora()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn hsla_formats_as_css() {
		let c = Hsla::new(150.0, 80.0, 55.5, 0.25);
		assert_eq!(c.to_css(), "hsla(150.0, 80.0%, 55.5%, 0.250)");
	}

	#[test]
	fn unknown_variant_falls_back_to_aurora() {
		assert_eq!(FieldTheme::by_name("nope").name, "aurora");
		assert_eq!(FieldTheme::by_name("star").name, "starfield");
	}

	#[test]
	fn variants_keep_hue_bands_inside_wrap_range() {
		for theme in [FieldTheme::aurora(), FieldTheme::twilight(), FieldTheme::starfield()] {
			let p = &theme.particles;
			assert!(p.primary.start >= p.hue_floor);
			assert!(p.primary.start + p.primary.span <= p.hue_ceiling);
			if let Some((band, _)) = p.accent {
				assert!(band.start >= p.hue_floor);
			}
		}
	}
}
