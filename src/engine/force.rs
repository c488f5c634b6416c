use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::debug;

use super::hierarchy::{assign_levels, level_positions};
use super::{EngineEvent, LayoutEngine, LayoutMode};
use crate::config::ViewerConfig;
use crate::graph::{EdgeRecord, NodeCategory, NodeId, NodeShape, NodeStyle, StyledNode};

/// Simulation step used while stabilizing, independent of frame time.
const STABILIZATION_DT: f32 = 0.016;
/// Longest simulation step taken for a single frame.
const MAX_FRAME_DT: f64 = 0.05;
/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.6;
const BOLD_GLYPH_WIDTH: f64 = 0.65;
/// Gap between a node's label and its outline.
const LABEL_PADDING: f64 = 6.0;

/// Per-node payload carried through the simulation.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	/// Document id.
	pub id: NodeId,
	/// Text drawn inside the node.
	pub label: String,
	/// Tooltip text, if the document supplied one.
	pub title: Option<String>,
	/// Category the style was resolved from.
	pub category: NodeCategory,
	/// Resolved visual style.
	pub style: NodeStyle,
	/// Current opacity in `[0, 1]`; dimmed nodes sit below 1.
	pub opacity: f64,
}

/// An edge between two loaded nodes, ready for drawing.
#[derive(Clone, Debug)]
pub struct EdgeInfo {
	/// Source node.
	pub from: DefaultNodeIdx,
	/// Target node.
	pub to: DefaultNodeIdx,
	/// Text drawn at the midpoint.
	pub label: Option<String>,
	/// Stroke colour; the default edge colour when absent.
	pub color: Option<String>,
	/// Stroke width, taken from the edge weight.
	pub width: f64,
	/// Whether the stroke is dashed.
	pub dashes: bool,
}

/// Graph-to-screen mapping: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewTransform {
	/// Horizontal offset in screen pixels.
	pub x: f64,
	/// Vertical offset in screen pixels.
	pub y: f64,
	/// Zoom factor.
	pub k: f64,
}

/// A node drag in progress.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	/// Set between mouse down on a node and mouse up.
	pub active: bool,
	/// The node being dragged.
	pub node_idx: Option<DefaultNodeIdx>,
	/// Screen x where the drag began.
	pub start_x: f64,
	/// Screen y where the drag began.
	pub start_y: f64,
	/// Graph x of the node when the drag began.
	pub node_start_x: f32,
	/// Graph y of the node when the drag began.
	pub node_start_y: f32,
}

/// A background pan in progress.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	/// Set between mouse down on empty canvas and mouse up.
	pub active: bool,
	/// Screen x where the pan began.
	pub start_x: f64,
	/// Screen y where the pan began.
	pub start_y: f64,
	/// Transform x offset when the pan began.
	pub transform_start_x: f64,
	/// Transform y offset when the pan began.
	pub transform_start_y: f64,
}

/// Outline of a drawn node in graph units, centred on the node position.
///
/// The canvas draws exactly this outline and hit testing uses the same
/// one, so a click anywhere on a visible node lands on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBounds {
	/// Outline shape.
	pub shape: NodeShape,
	/// Horizontal half extent.
	pub half_width: f64,
	/// Vertical half extent.
	pub half_height: f64,
}

impl NodeBounds {
	/// Sizes the outline around the node's label.
	pub fn of(info: &NodeInfo, config: &ViewerConfig) -> Self {
		let glyph = if info.style.bold {
			BOLD_GLYPH_WIDTH
		} else {
			GLYPH_WIDTH
		};
		let text_width = info.label.chars().count() as f64 * config.font_size * glyph;
		let radius = config.node_radius;
		let half_w = (text_width / 2.0 + LABEL_PADDING).max(radius);
		let (half_width, half_height) = match info.style.shape {
			NodeShape::Ellipse => (half_w + LABEL_PADDING, radius),
			NodeShape::Box => (half_w, radius),
			NodeShape::Diamond => (half_w + LABEL_PADDING * 2.0, radius * 1.4),
		};
		Self {
			shape: info.style.shape,
			half_width,
			half_height,
		}
	}

	/// Whether the offset `(dx, dy)` from the centre falls inside the outline.
	pub fn contains(&self, dx: f64, dy: f64) -> bool {
		let (u, v) = (dx.abs() / self.half_width, dy.abs() / self.half_height);
		match self.shape {
			NodeShape::Ellipse => u * u + v * v <= 1.0,
			NodeShape::Box => u <= 1.0 && v <= 1.0,
			NodeShape::Diamond => u + v <= 1.0,
		}
	}

	/// Distance from the centre to the outline along the unit vector `(ux, uy)`.
	pub fn reach(&self, ux: f64, uy: f64) -> f64 {
		let (u, v) = (ux.abs() / self.half_width, uy.abs() / self.half_height);
		match self.shape {
			NodeShape::Ellipse => 1.0 / (u * u + v * v).sqrt(),
			NodeShape::Box => 1.0 / u.max(v),
			NodeShape::Diamond => 1.0 / (u + v),
		}
	}
}

#[derive(Clone, Copy, Debug)]
struct FitAnimation {
	from: ViewTransform,
	to: ViewTransform,
	elapsed: f64,
	duration: f64,
}

fn ease_in_out_quad(t: f64) -> f64 {
	if t < 0.5 {
		2.0 * t * t
	} else {
		1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
	}
}

/// [`LayoutEngine`] backed by the `force_graph` simulation, plus the view
/// state (transform, drag, pan, hover) the canvas component drives.
pub struct ForceGraphEngine {
	/// The simulation, with one [`NodeInfo`] per node.
	pub graph: ForceGraph<NodeInfo, ()>,
	/// Current view transform.
	pub transform: ViewTransform,
	/// Node drag state.
	pub drag: DragState,
	/// Background pan state.
	pub pan: PanState,
	/// Node under the pointer, if any.
	pub hovered: Option<DefaultNodeIdx>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	config: ViewerConfig,
	nodes: Vec<(NodeId, DefaultNodeIdx)>,
	index: HashMap<NodeId, DefaultNodeIdx>,
	edges: Vec<EdgeInfo>,
	pinned: HashSet<DefaultNodeIdx>,
	physics_enabled: bool,
	layout_mode: LayoutMode,
	stabilizing: Option<u32>,
	fit: Option<FitAnimation>,
}

impl ForceGraphEngine {
	/// Creates an empty engine for a canvas of the given size.
	pub fn new(config: ViewerConfig, width: f64, height: f64) -> Self {
		Self {
			graph: ForceGraph::new(config.simulation_parameters()),
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			hovered: None,
			width,
			height,
			config,
			nodes: Vec::new(),
			index: HashMap::new(),
			edges: Vec::new(),
			pinned: HashSet::new(),
			physics_enabled: true,
			layout_mode: LayoutMode::Free,
			stabilizing: None,
			fit: None,
		}
	}

	/// Configuration the engine was built with.
	pub fn config(&self) -> &ViewerConfig {
		&self.config
	}

	/// Drawable edges, in document order.
	pub fn edges(&self) -> &[EdgeInfo] {
		&self.edges
	}

	/// Whether free simulation runs between frames.
	pub fn physics_enabled(&self) -> bool {
		self.physics_enabled
	}

	/// Current layout mode.
	pub fn layout_mode(&self) -> LayoutMode {
		self.layout_mode
	}

	/// Whether the initial stabilization is still running.
	pub fn is_stabilizing(&self) -> bool {
		self.stabilizing.is_some()
	}

	/// Graph-space position of every node.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::with_capacity(self.nodes.len());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	/// Graph-space position of the node with `id`.
	pub fn position_of(&self, id: &NodeId) -> Option<(f64, f64)> {
		let idx = *self.index.get(id)?;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some((node.x() as f64, node.y() as f64));
			}
		});
		found
	}

	/// Document id of a simulation node.
	pub fn id_of(&self, idx: DefaultNodeIdx) -> Option<&NodeId> {
		self.nodes.iter().find(|(_, i)| *i == idx).map(|(id, _)| id)
	}

	/// Maps a canvas point into graph space.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node whose drawn outline contains the canvas point.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let config = &self.config;
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let bounds = NodeBounds::of(&node.data.user_data, config);
			if bounds.contains(gx - node.x() as f64, gy - node.y() as f64) {
				found = Some(node.index());
			}
		});
		found
	}

	/// Document id of the node under the canvas point.
	pub fn node_id_at(&self, sx: f64, sy: f64) -> Option<NodeId> {
		let idx = self.node_at_position(sx, sy)?;
		self.id_of(idx).cloned()
	}

	/// Starts dragging the node under `(x, y)`, or panning if there is none.
	pub fn begin_drag(&mut self, x: f64, y: f64) {
		self.fit = None;
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			let drag = &mut self.drag;
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					drag.node_start_x = node.x();
					drag.node_start_y = node.y();
				}
			});
		} else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	/// Moves the dragged node, pans, or updates the hovered node.
	pub fn drag_to(&mut self, x: f64, y: f64) {
		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
				self.pinned.insert(idx);
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		} else {
			self.hovered = self.node_at_position(x, y);
		}
	}

	/// Ends any drag or pan.
	pub fn end_drag(&mut self) {
		self.drag.active = false;
		self.drag.node_idx = None;
		self.pan.active = false;
	}

	/// Called when the pointer leaves the canvas.
	pub fn clear_hover(&mut self) {
		self.end_drag();
		self.hovered = None;
	}

	/// Records a new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Runs one simulation step and returns the largest node displacement.
	fn simulate(&mut self, dt: f32) -> f32 {
		let mut before = HashMap::with_capacity(self.nodes.len());
		self.graph.visit_nodes(|node| {
			before.insert(node.index(), (node.x(), node.y()));
		});
		self.graph.update(dt);
		let mut movement = 0.0f32;
		self.graph.visit_nodes(|node| {
			if let Some(&(x, y)) = before.get(&node.index()) {
				movement = movement.max(((node.x() - x).powi(2) + (node.y() - y).powi(2)).sqrt());
			}
		});
		movement
	}

	fn apply_layout_mode(&mut self) {
		match self.layout_mode {
			LayoutMode::Hierarchical => {
				let slots: HashMap<DefaultNodeIdx, usize> = self
					.nodes
					.iter()
					.enumerate()
					.map(|(slot, (_, idx))| (*idx, slot))
					.collect();
				let directed: Vec<(usize, usize)> = self
					.edges
					.iter()
					.filter_map(|e| Some((*slots.get(&e.from)?, *slots.get(&e.to)?)))
					.collect();
				let levels = assign_levels(self.nodes.len(), &directed);
				let positions = level_positions(
					&levels,
					self.config.node_spacing,
					self.config.level_separation,
				);
				self.graph.visit_nodes_mut(|node| {
					if let Some(&slot) = slots.get(&node.index()) {
						let (x, y) = positions[slot];
						node.data.x = x as f32;
						node.data.y = y as f32;
						node.data.is_anchor = true;
					}
				});
			}
			LayoutMode::Free => {
				let pinned = &self.pinned;
				self.graph.visit_nodes_mut(|node| {
					node.data.is_anchor = pinned.contains(&node.index());
				});
			}
		}
	}

	fn fit_target(&self) -> Option<ViewTransform> {
		if self.nodes.is_empty() {
			return None;
		}
		let config = &self.config;
		let (mut min_x, mut min_y, mut max_x, mut max_y) =
			(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		self.graph.visit_nodes(|node| {
			let b = NodeBounds::of(&node.data.user_data, config);
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x - b.half_width);
			min_y = min_y.min(y - b.half_height);
			max_x = max_x.max(x + b.half_width);
			max_y = max_y.max(y + b.half_height);
		});
		let k = (self.width / (max_x - min_x))
			.min(self.height / (max_y - min_y))
			* 0.9;
		let k = self.config.clamp_zoom(k);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		Some(ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		})
	}

	fn advance_fit(&mut self, dt: f64) {
		let Some(fit) = self.fit.as_mut() else {
			return;
		};
		fit.elapsed += dt;
		let t = (fit.elapsed / fit.duration).min(1.0);
		if t >= 1.0 {
			self.transform = fit.to;
			self.fit = None;
			return;
		}
		let e = ease_in_out_quad(t);
		self.transform = ViewTransform {
			x: fit.from.x + (fit.to.x - fit.from.x) * e,
			y: fit.from.y + (fit.to.y - fit.from.y) * e,
			k: fit.from.k + (fit.to.k - fit.from.k) * e,
		};
	}
}

impl LayoutEngine for ForceGraphEngine {
	fn load_graph(&mut self, nodes: &[StyledNode], edges: &[EdgeRecord]) {
		self.graph = ForceGraph::new(self.config.simulation_parameters());
		self.nodes.clear();
		self.index.clear();
		self.edges.clear();
		self.pinned.clear();
		self.hovered = None;
		self.end_drag();

		let radius = 100.0 + 5.0 * nodes.len() as f64;
		for (i, node) in nodes.iter().enumerate() {
			let angle = (i as f64) * 2.0 * PI / nodes.len() as f64;
			let idx = self.graph.add_node(NodeData {
				x: (radius * angle.cos()) as f32,
				y: (radius * angle.sin()) as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.id.clone(),
					label: node.label.clone(),
					title: node.title.clone(),
					category: node.category,
					style: node.style,
					opacity: 1.0,
				},
			});
			self.nodes.push((node.id.clone(), idx));
			self.index.insert(node.id.clone(), idx);
		}

		for edge in edges {
			let (Some(&from), Some(&to)) = (self.index.get(&edge.from), self.index.get(&edge.to))
			else {
				debug!("Skipping edge {} -> {}: unknown endpoint", edge.from, edge.to);
				continue;
			};
			if from != to {
				self.graph.add_edge(from, to, EdgeData::default());
			}
			self.edges.push(EdgeInfo {
				from,
				to,
				label: edge.label.clone(),
				color: edge.color.clone(),
				width: edge.weight.unwrap_or(1.0),
				dashes: edge.dashes.unwrap_or(false),
			});
		}

		self.apply_layout_mode();
		self.stabilizing = Some(self.config.stabilization_iterations);
		debug!(
			"Engine loaded {} nodes, {} edges",
			self.nodes.len(),
			self.edges.len()
		);
	}

	fn set_physics_enabled(&mut self, enabled: bool) {
		self.physics_enabled = enabled;
	}

	fn set_layout_mode(&mut self, mode: LayoutMode) {
		if self.layout_mode == mode {
			return;
		}
		self.layout_mode = mode;
		self.apply_layout_mode();
		self.fit_view(self.config.fit_duration_secs);
	}

	fn fit_view(&mut self, duration_secs: f64) {
		let Some(to) = self.fit_target() else {
			return;
		};
		if duration_secs <= 0.0 {
			self.transform = to;
			self.fit = None;
		} else {
			self.fit = Some(FitAnimation {
				from: self.transform,
				to,
				elapsed: 0.0,
				duration: duration_secs,
			});
		}
	}

	fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId> {
		let Some(&idx) = self.index.get(id) else {
			return Vec::new();
		};
		let mut seen = HashSet::new();
		self.edges
			.iter()
			.filter_map(|e| {
				if e.from == idx {
					Some(e.to)
				} else if e.to == idx {
					Some(e.from)
				} else {
					None
				}
			})
			.filter(|&n| n != idx && seen.insert(n))
			.filter_map(|n| self.id_of(n).cloned())
			.collect()
	}

	fn update_node_opacity(&mut self, id: &NodeId, opacity: f64) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|node| {
			if node.index() == idx {
				node.data.user_data.opacity = opacity;
			}
		});
	}

	fn node_opacity(&self, id: &NodeId) -> Option<f64> {
		let idx = *self.index.get(id)?;
		let mut opacity = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				opacity = Some(node.data.user_data.opacity);
			}
		});
		opacity
	}

	fn node_ids(&self) -> Vec<NodeId> {
		self.nodes.iter().map(|(id, _)| id.clone()).collect()
	}

	fn edge_count(&self) -> usize {
		self.edges.len()
	}

	fn scale(&self) -> f64 {
		self.transform.k
	}

	fn zoom_to(&mut self, scale: f64, x: f64, y: f64) {
		self.fit = None;
		let new_k = self.config.clamp_zoom(scale);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	fn step(&mut self, dt: f64) -> Option<EngineEvent> {
		self.advance_fit(dt);

		if let Some(remaining) = self.stabilizing {
			let batch = remaining.min(self.config.stabilization_batch.max(1));
			let mut movement = 0.0;
			for _ in 0..batch {
				movement = self.simulate(STABILIZATION_DT);
			}
			let remaining = remaining - batch;
			if remaining == 0 || movement < self.config.stabilization_threshold {
				debug!("Stabilized with {remaining} iterations to spare");
				self.stabilizing = None;
				self.fit_view(0.0);
				return Some(EngineEvent::Stabilized);
			}
			self.stabilizing = Some(remaining);
			return None;
		}

		if self.physics_enabled {
			self.simulate(dt.min(MAX_FRAME_DT) as f32);
		}
		None
	}
}
