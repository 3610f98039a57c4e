use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::ForceGraphState;
use crate::graph::NodeShape;

const BACKGROUND: &str = "#f9fafb";
const LABEL_COLOR: &str = "#1f2937";
const EDGE_LABEL_COLOR: &str = "#6b7280";
const BORDER_WIDTH: f64 = 3.0;

fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

pub fn render(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
	draw_tooltip(state, ctx);
}

fn draw_edges(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let (dash, gap, arrow_size) = (8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(state.flow_time * 30.0) % (dash + gap);
	let t = ease_out_cubic(state.hover.highlight_t);
	let has_highlight = state.has_active_highlight();
	let positions = state.positions();

	for link in &state.edges {
		let (Some(&(x1, y1, r1)), Some(&(x2, y2, r2))) =
			(positions.get(&link.src), positions.get(&link.tgt))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let style = &link.style;

		let is_highlighted =
			has_highlight && state.is_highlighted(link.src) && state.is_highlighted(link.tgt);
		let (alpha, color, width) = if is_highlighted {
			(1.0, style.highlight, style.width * (1.0 + t))
		} else if has_highlight {
			(1.0 - 0.75 * t, style.color, style.width)
		} else {
			(1.0, style.color, style.width)
		};

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width * 0.5);
		if style.dashed {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let head = if style.arrow { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * r1, y1 + uy * r1);
		ctx.line_to(x2 - ux * (r2 + head), y2 - uy * (r2 + head));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if style.arrow {
			ctx.set_fill_style_str(color);
			let (tip_x, tip_y) = (x2 - ux * r2, y2 - uy * r2);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		if !style.label.is_empty() && k > 0.6 {
			ctx.set_fill_style_str(EDGE_LABEL_COLOR);
			ctx.set_font(&format!("{}px Inter, system-ui, sans-serif", 10.0 / k.max(0.5)));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&style.label, (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 2.0);
			ctx.set_text_align("start");
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_nodes(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	let (has_highlight, t, k) = (
		state.has_active_highlight(),
		ease_out_cubic(state.hover.highlight_t),
		state.transform.k,
	);

	// dimmed nodes first so highlighted ones draw on top
	for pass_highlighted in [false, true] {
		state.graph.visit_nodes(|node| {
			let idx = node.index();
			let highlighted = has_highlight && state.is_highlighted(idx);
			if highlighted != pass_highlighted {
				return;
			}
			let info = &node.data.user_data;
			let (x, y) = (node.x() as f64, node.y() as f64);
			let hovered = state.is_hovered(idx);

			let (alpha, radius, fill) = if !has_highlight {
				(1.0, info.radius, info.palette.fill)
			} else if hovered {
				(1.0, info.radius * (1.0 + 0.2 * t), info.palette.hover)
			} else if highlighted {
				(1.0, info.radius, info.palette.hover)
			} else {
				(1.0 - 0.7 * t, info.radius * (1.0 - 0.15 * t), info.palette.fill)
			};

			ctx.set_global_alpha(alpha);
			if hovered && t > 0.01 {
				ctx.set_shadow_color("rgba(0, 0, 0, 0.2)");
				ctx.set_shadow_blur(5.0);
				ctx.set_shadow_offset_x(2.0);
				ctx.set_shadow_offset_y(2.0);
			}
			ctx.begin_path();
			match info.shape {
				NodeShape::Dot => {
					let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
				}
				NodeShape::Box => ctx.rect(x - radius, y - radius * 0.7, radius * 2.0, radius * 1.4),
			}
			ctx.set_fill_style_str(fill);
			ctx.fill();
			ctx.set_shadow_color("transparent");
			ctx.set_stroke_style_str(info.palette.border);
			let border = if hovered { BORDER_WIDTH * 5.0 / 3.0 } else { BORDER_WIDTH };
			ctx.set_line_width(border / k.max(1.0));
			ctx.stroke();

			let weight = if info.bold { "bold " } else { "" };
			ctx.set_fill_style_str(LABEL_COLOR);
			ctx.set_font(&format!(
				"{}{}px Inter, system-ui, sans-serif",
				weight,
				info.font_size / k.max(0.5)
			));
			ctx.set_text_align("center");
			let _ = ctx.fill_text(&info.label, x, y + radius + info.font_size);
			ctx.set_text_align("start");
			ctx.set_global_alpha(1.0);
		});
	}
}

fn draw_tooltip(state: &ForceGraphState, ctx: &CanvasRenderingContext2d) {
	if state.hover.highlight_t < 0.3 {
		return;
	}
	let Some((text, gx, gy)) = state.tooltip() else {
		return;
	};
	let sx = gx * state.transform.k + state.transform.x + 14.0;
	let sy = gy * state.transform.k + state.transform.y + 14.0;

	ctx.set_font("12px Inter, system-ui, sans-serif");
	let lines: Vec<&str> = text.lines().collect();
	let width = lines
		.iter()
		.filter_map(|l| ctx.measure_text(l).ok())
		.map(|m| m.width())
		.fold(0.0, f64::max);
	let (pad, line_h) = (6.0, 16.0);
	let height = lines.len() as f64 * line_h + pad * 2.0;

	// keep the box inside the canvas
	let x = sx.min(state.width - width - pad * 2.0).max(0.0);
	let y = sy.min(state.height - height).max(0.0);

	ctx.set_global_alpha(state.hover.highlight_t.min(1.0));
	ctx.set_fill_style_str("white");
	ctx.set_stroke_style_str("#d1d5db");
	ctx.set_line_width(1.0);
	ctx.fill_rect(x, y, width + pad * 2.0, height);
	ctx.stroke_rect(x, y, width + pad * 2.0, height);
	ctx.set_fill_style_str(LABEL_COLOR);
	for (i, line) in lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + pad, y + pad + 12.0 + i as f64 * line_h);
	}
	ctx.set_global_alpha(1.0);
}
