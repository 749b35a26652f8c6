use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{NODE_RADIUS, Scene};

const BACKGROUND: &str = "#1a1a2e";
const EDGE_COLOR: (u8, u8, u8) = (100, 180, 255);

fn kind_color(kind: &str) -> &'static str {
	match kind {
		"initial" => "#2ca02c",
		"error" => "#d62728",
		"final" => "#1f77b4",
		_ => "#9467bd",
	}
}

pub fn render(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, scene.width, scene.height);
	ctx.save();
	let _ = ctx.translate(scene.camera.x, scene.camera.y);
	let _ = ctx.scale(scene.camera.k, scene.camera.k);
	draw_edges(scene, ctx);
	draw_nodes(scene, ctx);
	ctx.restore();
}

fn draw_edges(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = scene.camera.k;
	let (line_width, dash, gap, arrow_size) = (1.5 / k, 8.0 / k, 4.0 / k, 8.0 / k);
	let dash_offset = -(scene.flow_time * 30.0) % (dash + gap);
	let dimmed = scene.has_marks();
	let (r, g, b) = EDGE_COLOR;

	for edge in scene.edges() {
		if edge.style.hidden {
			continue;
		}
		let n1 = &scene.nodes()[edge.source];
		let n2 = &scene.nodes()[edge.target];
		if n1.style.hidden || n2.style.hidden {
			continue;
		}
		let (x1, y1, x2, y2) = (n1.pos.x, n1.pos.y, n2.pos.x, n2.pos.y);
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}

		let highlighted = edge.style.highlighted;
		let (edge_alpha, arrow_alpha, width) = if highlighted {
			(0.9, 0.9, line_width * 1.3)
		} else if edge.style.faded || dimmed {
			(0.15, 0.35, line_width * 0.7)
		} else {
			(0.6, 0.8, line_width)
		};

		ctx.set_stroke_style_str(&format!("rgba({r}, {g}, {b}, {edge_alpha})"));
		ctx.set_line_width(width);
		if highlighted {
			// Highlighted transitions carry the animated flow dash.
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(dash),
				&JsValue::from_f64(gap),
			));
			ctx.set_line_dash_offset(dash_offset);
		}

		let (ux, uy) = (dx / dist, dy / dist);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(
			x2 - ux * (NODE_RADIUS + arrow_size),
			y2 - uy * (NODE_RADIUS + arrow_size),
		);
		ctx.stroke();
		if highlighted {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		ctx.set_fill_style_str(&format!("rgba({r}, {g}, {b}, {arrow_alpha})"));
		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
		let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(scene: &Scene, ctx: &CanvasRenderingContext2d) {
	let k = scene.camera.k;
	let dimmed = scene.has_marks();

	for node in scene.nodes() {
		if node.style.hidden || node.style.highlighted {
			continue;
		}
		let alpha = if node.style.faded || dimmed { 0.3 } else { 1.0 };
		let (x, y) = (node.pos.x, node.pos.y);

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, NODE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(kind_color(&node.state.kind));
		ctx.fill();
		ctx.set_global_alpha(1.0);

		ctx.set_fill_style_str(&format!("rgba(255, 255, 255, {})", alpha * 0.8));
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.state.id, x + NODE_RADIUS + 3.0, y + 3.0);
	}

	for node in scene.nodes() {
		if node.style.hidden || !node.style.highlighted {
			continue;
		}
		let (x, y) = (node.pos.x, node.pos.y);
		let radius = NODE_RADIUS * 1.25;
		let glow_radius = NODE_RADIUS * 2.6;

		if let Ok(gradient) = ctx.create_radial_gradient(x, y, radius * 0.3, x, y, glow_radius) {
			let _ = gradient.add_color_stop(0.0, "rgba(255, 255, 255, 0.35)");
			let _ = gradient.add_color_stop(0.6, "rgba(200, 220, 255, 0.1)");
			let _ = gradient.add_color_stop(1.0, "rgba(255, 255, 255, 0)");
			ctx.begin_path();
			let _ = ctx.arc(x, y, glow_radius, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		}

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(kind_color(&node.state.kind));
		ctx.fill();

		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + 2.0 / k, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str("rgba(255, 255, 255, 0.7)");
		ctx.set_line_width(1.5 / k);
		ctx.stroke();

		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		let _ = ctx.fill_text(&node.state.id, x + radius + 3.0, y + 3.0);
	}
}
