//! Canvas rendering for the particle field.
//!
//! Drawing happens in fixed passes for correct z-ordering:
//! 1. Clear, background gradient and optional overlay
//! 2. Decorative shapes
//! 3. Particle trails, then particle bodies (with optional glow)
//! 4. Connection lines between nearby particles

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::particles::{DecorativeShape, Particle, ParticleShape, ShapeKind};
use super::state::ParticleField;
use super::theme::FieldTheme;

/// Renders one complete frame of the field.
pub fn render(field: &ParticleField, ctx: &CanvasRenderingContext2d, theme: &FieldTheme) {
	ctx.clear_rect(0.0, 0.0, field.width, field.height);

	draw_background(field, ctx, theme);

	for shape in &field.shapes {
		draw_shape(ctx, shape);
	}

	for p in &field.particles {
		draw_trail(ctx, p);
		if theme.particles.glow {
			draw_glow(ctx, p);
		}
		draw_particle(ctx, p);
	}

	draw_connections(field, ctx, theme);
}

fn draw_background(field: &ParticleField, ctx: &CanvasRenderingContext2d, theme: &FieldTheme) {
	let (cx, cy) = (field.width / 2.0, field.height * theme.background.center_y);

	match ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, field.width.max(1.0)) {
		Ok(gradient) => {
			for stop in &theme.background.stops {
				let _ = gradient.add_color_stop(stop.offset as f32, &stop.color.to_css());
			}
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		Err(_) => {
			let fallback = theme.background.stops.last().map(|s| s.color.to_css());
			ctx.set_fill_style_str(fallback.as_deref().unwrap_or("#0a0814"));
		}
	}
	ctx.fill_rect(0.0, 0.0, field.width, field.height);

	if let Some((top, bottom)) = theme.background.overlay {
		let overlay = ctx.create_linear_gradient(0.0, 0.0, 0.0, field.height);
		let _ = overlay.add_color_stop(0.0, &top.to_css());
		let _ = overlay.add_color_stop(1.0, &bottom.to_css());
		#[allow(deprecated)]
		ctx.set_fill_style(&overlay);
		ctx.fill_rect(0.0, 0.0, field.width, field.height);
	}
}

fn draw_shape(ctx: &CanvasRenderingContext2d, shape: &DecorativeShape) {
	ctx.save();
	let _ = ctx.translate(shape.x, shape.y);
	let _ = ctx.rotate(shape.rotation);
	ctx.set_fill_style_str(&shape.color.to_css());

	match shape.kind {
		ShapeKind::Circle => {
			ctx.begin_path();
			let _ = ctx.arc(0.0, 0.0, shape.size, 0.0, PI * 2.0);
			ctx.fill();
		}
		ShapeKind::Rect => {
			ctx.fill_rect(-shape.size / 2.0, -shape.size / 2.0, shape.size, shape.size);
		}
	}

	ctx.restore();
}

/// Older trail points are drawn smaller and fainter.
fn draw_trail(ctx: &CanvasRenderingContext2d, p: &Particle) {
	let Some(trail) = p.trail.as_ref() else {
		return;
	};
	let len = trail.len() as f64;
	let color = p.color();

	for (index, point) in trail.iter().enumerate() {
		let age = index as f64 / len;
		ctx.set_fill_style_str(&color.with_alpha(point.alpha * age).to_css());
		ctx.begin_path();
		let _ = ctx.arc(point.x, point.y, point.size * age, 0.0, PI * 2.0);
		ctx.fill();
	}
}

fn draw_glow(ctx: &CanvasRenderingContext2d, p: &Particle) {
	let radius = p.size * 4.0;
	let Ok(gradient) = ctx.create_radial_gradient(p.x, p.y, 0.0, p.x, p.y, radius) else {
		return;
	};
	let color = p.color();
	let _ = gradient.add_color_stop(0.0, &color.with_alpha(p.alpha * 0.6).to_css());
	let _ = gradient.add_color_stop(1.0, &color.with_alpha(0.0).to_css());

	ctx.begin_path();
	let _ = ctx.arc(p.x, p.y, radius, 0.0, PI * 2.0);
	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill();
}

fn draw_particle(ctx: &CanvasRenderingContext2d, p: &Particle) {
	ctx.set_fill_style_str(&p.color().to_css());

	match p.shape {
		ParticleShape::Circle => {
			ctx.begin_path();
			let _ = ctx.arc(p.x, p.y, p.size, 0.0, PI * 2.0);
			ctx.fill();
		}
		ParticleShape::Square => {
			ctx.fill_rect(p.x - p.size, p.y - p.size, p.size * 2.0, p.size * 2.0);
		}
		ParticleShape::Triangle => {
			ctx.begin_path();
			ctx.move_to(p.x, p.y - p.size);
			ctx.line_to(p.x - p.size, p.y + p.size);
			ctx.line_to(p.x + p.size, p.y + p.size);
			ctx.close_path();
			ctx.fill();
		}
	}
}

fn draw_connections(field: &ParticleField, ctx: &CanvasRenderingContext2d, theme: &FieldTheme) {
	let style = &theme.connections;

	for link in field.connections(style) {
		let (a, b) = (&field.particles[link.a], &field.particles[link.b]);

		let gradient = ctx.create_linear_gradient(a.x, a.y, b.x, b.y);
		let _ = gradient.add_color_stop(0.0, &a.color().to_css());
		let _ = gradient.add_color_stop(1.0, &b.color().to_css());

		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
		ctx.set_line_width(link.width(style));
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}
