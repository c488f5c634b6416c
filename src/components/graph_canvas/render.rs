use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::DefaultNodeIdx;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::engine::{ForceGraphEngine, NodeBounds, NodeInfo};
use crate::graph::NodeShape;

const BACKGROUND: &str = "#f8f9fb";
const EDGE_COLOR: &str = "#848484";

pub fn render(engine: &ForceGraphEngine, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, engine.width, engine.height);
	ctx.save();
	let _ = ctx.translate(engine.transform.x, engine.transform.y);
	let _ = ctx.scale(engine.transform.k, engine.transform.k);

	let config = engine.config();
	let mut opacity = HashMap::new();
	let mut bounds = HashMap::new();
	engine.graph.visit_nodes(|node| {
		opacity.insert(node.index(), node.data.user_data.opacity);
		bounds.insert(node.index(), NodeBounds::of(&node.data.user_data, config));
	});
	let positions = engine.positions();

	draw_edges(engine, &positions, &opacity, &bounds, ctx);
	draw_nodes(engine, ctx);
	ctx.restore();
	draw_tooltip(engine, &positions, ctx);
}

fn draw_edges(
	engine: &ForceGraphEngine,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	opacity: &HashMap<DefaultNodeIdx, f64>,
	bounds: &HashMap<DefaultNodeIdx, NodeBounds>,
	ctx: &CanvasRenderingContext2d,
) {
	let config = engine.config();
	let arrow_size = 8.0;

	for edge in engine.edges() {
		let (Some(&(x1, y1)), Some(&(x2, y2))) = (positions.get(&edge.from), positions.get(&edge.to))
		else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let alpha = opacity
			.get(&edge.from)
			.copied()
			.unwrap_or(1.0)
			.min(opacity.get(&edge.to).copied().unwrap_or(1.0));
		let color = edge.color.as_deref().unwrap_or(EDGE_COLOR);

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(edge.width.max(0.5));
		if edge.dashes {
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(8.0),
				&JsValue::from_f64(4.0),
			));
		}

		let (ux, uy) = (dx / dist, dy / dist);
		let reach = |idx: &DefaultNodeIdx| {
			bounds
				.get(idx)
				.map_or(config.node_radius, |b| b.reach(ux, uy))
		};
		let (start, end) = (reach(&edge.from), reach(&edge.to));
		let head = if config.arrows { arrow_size } else { 0.0 };
		ctx.begin_path();
		ctx.move_to(x1 + ux * start, y1 + uy * start);
		ctx.line_to(x2 - ux * (end + head), y2 - uy * (end + head));
		ctx.stroke();
		let _ = ctx.set_line_dash(&js_sys::Array::new());

		if config.arrows {
			ctx.set_fill_style_str(color);
			let (tip_x, tip_y) = (x2 - ux * end, y2 - uy * end);
			let (back_x, back_y) = (tip_x - ux * arrow_size, tip_y - uy * arrow_size);
			let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
			ctx.begin_path();
			ctx.move_to(tip_x, tip_y);
			ctx.line_to(back_x + px, back_y + py);
			ctx.line_to(back_x - px, back_y - py);
			ctx.close_path();
			ctx.fill();
		}

		if let Some(label) = &edge.label {
			ctx.set_fill_style_str(EDGE_COLOR);
			ctx.set_font(&format!("{}px sans-serif", config.font_size * 0.8));
			ctx.set_text_align("center");
			ctx.set_text_baseline("bottom");
			let _ = ctx.fill_text(label, (x1 + x2) / 2.0, (y1 + y2) / 2.0 - 2.0);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn node_font(info: &NodeInfo, size: f64) -> String {
	if info.style.bold {
		format!("bold {size}px sans-serif")
	} else {
		format!("{size}px sans-serif")
	}
}

fn draw_nodes(engine: &ForceGraphEngine, ctx: &CanvasRenderingContext2d) {
	let config = engine.config();
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");

	engine.graph.visit_nodes(|node| {
		let info = &node.data.user_data;
		let (x, y) = (node.x() as f64, node.y() as f64);
		let NodeBounds {
			shape,
			half_width: half_w,
			half_height: half_h,
		} = NodeBounds::of(info, config);
		ctx.set_font(&node_font(info, config.font_size));

		ctx.set_global_alpha(info.opacity);
		ctx.begin_path();
		match shape {
			NodeShape::Ellipse => {
				let _ = ctx.ellipse(x, y, half_w, half_h, 0.0, 0.0, 2.0 * PI);
			}
			NodeShape::Box => {
				ctx.rect(x - half_w, y - half_h, half_w * 2.0, half_h * 2.0);
			}
			NodeShape::Diamond => {
				ctx.move_to(x, y - half_h);
				ctx.line_to(x + half_w, y);
				ctx.line_to(x, y + half_h);
				ctx.line_to(x - half_w, y);
				ctx.close_path();
			}
		}
		ctx.set_fill_style_str(info.style.fill);
		ctx.fill();
		ctx.set_stroke_style_str(info.style.border);
		ctx.set_line_width(if engine.hovered == Some(node.index()) {
			3.0
		} else {
			1.5
		});
		ctx.stroke();

		ctx.set_fill_style_str(info.style.font_color);
		let _ = ctx.fill_text(&info.label, x, y);
	});
	ctx.set_global_alpha(1.0);
}

fn draw_tooltip(
	engine: &ForceGraphEngine,
	positions: &HashMap<DefaultNodeIdx, (f64, f64)>,
	ctx: &CanvasRenderingContext2d,
) {
	let Some(idx) = engine.hovered else {
		return;
	};
	let Some(&(gx, gy)) = positions.get(&idx) else {
		return;
	};
	let mut text = None;
	engine.graph.visit_nodes(|node| {
		if node.index() == idx {
			let info = &node.data.user_data;
			text = Some(match &info.title {
				Some(title) => title.clone(),
				None => format!("{} ({})", info.label, info.category.title()),
			});
		}
	});
	let Some(text) = text else {
		return;
	};

	let t = engine.transform;
	let (sx, sy) = (
		gx * t.k + t.x + 14.0,
		gy * t.k + t.y + engine.config().node_radius * t.k + 8.0,
	);
	ctx.set_font("12px sans-serif");
	ctx.set_text_align("left");
	ctx.set_text_baseline("top");
	let width = ctx.measure_text(&text).map(|m| m.width()).unwrap_or(0.0);
	ctx.set_fill_style_str("rgba(255, 255, 255, 0.95)");
	ctx.fill_rect(sx - 6.0, sy - 4.0, width + 12.0, 22.0);
	ctx.set_stroke_style_str("#999");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(sx - 6.0, sy - 4.0, width + 12.0, 22.0);
	ctx.set_fill_style_str("#222");
	let _ = ctx.fill_text(&text, sx, sy);
}
