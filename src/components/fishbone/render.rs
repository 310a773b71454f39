use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::layout::{Align, Element};
use super::state::{BADGE_RADIUS, FONT_SIZE, FishboneState};

const BACKGROUND: &str = "#1a1a2e";

pub fn render(state: &FishboneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_lines(state, ctx);
	draw_badges(state, ctx);
	draw_labels(state, ctx);
	ctx.restore();
	draw_minimap(state, ctx);
}

fn draw_lines(state: &FishboneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_line_width(2.0);
	for line in &state.scene.lines {
		ctx.set_stroke_style_str(state.scale.color(line.key));
		ctx.begin_path();
		ctx.move_to(line.x1, line.y1);
		ctx.line_to(line.x2, line.y2);
		ctx.stroke();
	}
}

fn draw_badges(state: &FishboneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	ctx.set_font(&format!("bold {}px sans-serif", FONT_SIZE - 3.0));
	for badge in &state.scene.badges {
		ctx.begin_path();
		let _ = ctx.arc(badge.x, badge.y, BADGE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(state.scale.color(badge.key));
		ctx.fill();
		ctx.set_fill_style_str("white");
		let _ = ctx.fill_text(&badge.points.to_string(), badge.x, badge.y);
	}
}

fn draw_labels(state: &FishboneState, ctx: &CanvasRenderingContext2d) {
	ctx.set_text_baseline("middle");
	for label in &state.scene.labels {
		let hovered = state.hover == Some(label.element);
		let collapsed = match label.element {
			Element::Category { .. } => state.is_collapsed(&label.text),
			Element::Root | Element::Cause { .. } => false,
		};
		let weight = if hovered { "bold " } else { "" };
		let style = if collapsed { "italic " } else { "" };
		ctx.set_font(&format!("{}{}{}px sans-serif", style, weight, FONT_SIZE));
		ctx.set_text_align(match label.align {
			Align::Left => "left",
			Align::Right => "right",
		});
		ctx.set_fill_style_str(if hovered {
			"white"
		} else {
			state.scale.color(label.key)
		});
		let _ = ctx.fill_text(&label.text, label.x, label.y);
	}
}

fn draw_minimap(state: &FishboneState, ctx: &CanvasRenderingContext2d) {
	let frame = state.minimap_frame();
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.06)");
	ctx.fill_rect(frame.x, frame.y, frame.width, frame.height);
	ctx.set_stroke_style_str("rgba(255, 255, 255, 0.3)");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(frame.x, frame.y, frame.width, frame.height);

	ctx.save();
	ctx.begin_path();
	ctx.rect(frame.x, frame.y, frame.width, frame.height);
	ctx.clip();

	let m = frame.scale;
	for line in &state.scene.lines {
		ctx.set_stroke_style_str(state.scale.color(line.key));
		ctx.begin_path();
		ctx.move_to(frame.x + line.x1 * m, frame.y + line.y1 * m);
		ctx.line_to(frame.x + line.x2 * m, frame.y + line.y2 * m);
		ctx.stroke();
	}

	let (vx, vy, vw, vh) = state.viewport();
	ctx.set_stroke_style_str("rgba(100, 180, 255, 0.9)");
	ctx.stroke_rect(frame.x + vx * m, frame.y + vy * m, vw * m, vh * m);
	ctx.restore();
}
