//! Page-level controller for a loaded graph.
//!
//! [`GraphViewer`] owns the load status, the legend/physics/layout toggles and
//! the double-click highlight, and drives a [`LayoutEngine`] for everything
//! spatial. It holds no DOM handles, so the canvas component and the tests
//! share the same code path.

use log::{debug, error, info};

use crate::config::ViewerConfig;
use crate::engine::{EngineEvent, LayoutEngine, LayoutMode};
use crate::graph::{EdgeRecord, GraphDocument, LoadError, NodeId, StyledNode, apply_style};

/// Text shown in place of the loading indicator when the document is unusable.
pub const LOAD_ERROR_MESSAGE: &str = "Error loading graph data";

/// Elapsed time charged to the first animation frame, which has no predecessor.
const FIRST_FRAME_SECS: f64 = 1.0 / 60.0;

/// Where the page is in fetching and laying out the document.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
	/// Fetching, or waiting for the layout to stabilize.
	#[default]
	Loading,
	/// Stabilized and interactive.
	Ready,
	/// The document could not be used; carries the message to show.
	Failed(String),
}

/// Snapshot of everything the surrounding page renders besides the canvas.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ViewStatus {
	/// Load progress.
	pub load: LoadState,
	/// Whether the legend panel is shown.
	pub legend_visible: bool,
	/// Whether free simulation is running.
	pub physics_enabled: bool,
	/// Current layout mode.
	pub layout: LayoutMode,
	/// Nodes in the scene; 0 until a document is rendered.
	pub node_count: usize,
	/// Drawn edges in the scene; 0 until a document is rendered.
	pub edge_count: usize,
}

/// Turns `requestAnimationFrame` timestamps into elapsed seconds.
#[derive(Clone, Copy, Debug, Default)]
pub struct FrameClock {
	last_ms: Option<f64>,
}

impl FrameClock {
	/// Seconds since the previous frame. Timestamps are in milliseconds.
	pub fn tick(&mut self, now_ms: f64) -> f64 {
		let dt = match self.last_ms {
			Some(last) => ((now_ms - last) / 1000.0).max(0.0),
			None => FIRST_FRAME_SECS,
		};
		self.last_ms = Some(now_ms);
		dt
	}
}

/// Controller behind the page: owns the toggles and highlight and drives
/// the engine `E`.
pub struct GraphViewer<E> {
	engine: E,
	config: ViewerConfig,
	load: LoadState,
	has_graph: bool,
	legend_visible: bool,
	physics_enabled: bool,
	layout: LayoutMode,
	highlighted: Option<NodeId>,
	settle_remaining: Option<f64>,
}

impl<E: LayoutEngine> GraphViewer<E> {
	/// A viewer with nothing loaded yet.
	pub fn new(engine: E, config: ViewerConfig) -> Self {
		Self {
			engine,
			config,
			load: LoadState::Loading,
			has_graph: false,
			legend_visible: false,
			physics_enabled: true,
			layout: LayoutMode::Free,
			highlighted: None,
			settle_remaining: None,
		}
	}

	/// The engine being driven.
	pub fn engine(&self) -> &E {
		&self.engine
	}

	/// Mutable engine access for pointer handling.
	pub fn engine_mut(&mut self) -> &mut E {
		&mut self.engine
	}

	/// Current page-facing state.
	pub fn status(&self) -> ViewStatus {
		ViewStatus {
			load: self.load.clone(),
			legend_visible: self.legend_visible,
			physics_enabled: self.physics_enabled,
			layout: self.layout,
			node_count: if self.has_graph {
				self.engine.node_ids().len()
			} else {
				0
			},
			edge_count: if self.has_graph {
				self.engine.edge_count()
			} else {
				0
			},
		}
	}

	/// The node whose neighbourhood is highlighted, if any.
	pub fn highlighted(&self) -> Option<&NodeId> {
		self.highlighted.as_ref()
	}

	/// Consumes the result of [`load`](crate::graph::load): styles and renders
	/// on success, switches to the error state otherwise.
	pub fn apply_document(&mut self, result: Result<GraphDocument, LoadError>) {
		match result {
			Ok(doc) => {
				info!(
					"Loaded graph with {} nodes and {} edges",
					doc.nodes.len(),
					doc.edges.len()
				);
				let nodes = apply_style(&doc.nodes);
				self.render(&nodes, &doc.edges);
			}
			Err(err) => {
				error!("Failed to load graph ({:?}): {err}", err.kind());
				self.load = LoadState::Failed(LOAD_ERROR_MESSAGE.into());
			}
		}
	}

	/// Hands the styled scene to the engine. The load stays in
	/// [`LoadState::Loading`] until the engine reports stabilization.
	pub fn render(&mut self, nodes: &[StyledNode], edges: &[EdgeRecord]) {
		self.highlighted = None;
		self.settle_remaining = None;
		self.physics_enabled = true;
		self.engine.set_physics_enabled(true);
		self.engine.set_layout_mode(self.layout);
		self.engine.load_graph(nodes, edges);
		self.has_graph = true;
		self.load = LoadState::Loading;
	}

	/// Advances the engine and the settle timer by `dt` seconds.
	pub fn advance(&mut self, dt: f64) {
		if let Some(EngineEvent::Stabilized) = self.engine.step(dt) {
			if self.load == LoadState::Loading {
				debug!("Graph stabilized, showing legend");
				self.load = LoadState::Ready;
				self.legend_visible = true;
				self.settle_remaining = Some(self.config.settle_delay_secs);
			}
			return;
		}

		if let Some(remaining) = self.settle_remaining.as_mut() {
			*remaining -= dt;
			if *remaining <= 0.0 {
				self.settle_remaining = None;
				debug!("Settle delay elapsed, disabling physics");
				self.physics_enabled = false;
				self.engine.set_physics_enabled(false);
			}
		}
	}

	/// Animates the view to contain the whole graph.
	pub fn fit(&mut self) {
		if self.has_graph {
			self.engine.fit_view(self.config.fit_duration_secs);
		}
	}

	/// Flips physics and cancels a pending settle timer. Returns the new state.
	pub fn toggle_physics(&mut self) -> bool {
		self.settle_remaining = None;
		self.physics_enabled = !self.physics_enabled;
		self.engine.set_physics_enabled(self.physics_enabled);
		info!("Physics {}", if self.physics_enabled { "on" } else { "off" });
		self.physics_enabled
	}

	/// Switches between free and hierarchical layout.
	pub fn toggle_hierarchical_layout(&mut self) -> LayoutMode {
		self.layout = self.layout.toggled();
		self.engine.set_layout_mode(self.layout);
		info!("Layout mode: {:?}", self.layout);
		self.layout
	}

	/// Shows or hides the legend. Returns whether it is now visible.
	pub fn toggle_legend(&mut self) -> bool {
		self.legend_visible = !self.legend_visible;
		self.legend_visible
	}

	/// Highlights `target` and its neighbours, or clears the highlight when
	/// `target` is `None` or not part of the graph.
	pub fn on_double_click(&mut self, target: Option<&NodeId>) {
		if !self.has_graph {
			return;
		}
		let ids = self.engine.node_ids();
		let focus = target.filter(|id| ids.contains(id));

		let Some(focus) = focus else {
			for id in &ids {
				self.engine.update_node_opacity(id, 1.0);
			}
			self.highlighted = None;
			return;
		};

		let neighbours = self.engine.connected_nodes(focus);
		for id in &ids {
			let opacity = if id == focus || neighbours.contains(id) {
				1.0
			} else {
				self.config.dim_opacity
			};
			self.engine.update_node_opacity(id, opacity);
		}
		debug!("Highlighted {focus} and {} neighbours", neighbours.len());
		self.highlighted = Some(focus.clone());
	}

	/// Applies a zoom request, never going below the configured floor.
	/// Returns the scale actually used.
	pub fn on_zoom(&mut self, requested: f64, x: f64, y: f64) -> f64 {
		let scale = self.config.clamp_zoom(requested);
		self.engine.zoom_to(scale, x, y);
		self.engine.scale()
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;

	use super::*;
	use crate::graph::{LoadErrorKind, check_status, parse_document};

	/// Records what the viewer asks of the engine; stabilizes after
	/// `stabilize_after` steps.
	#[derive(Default)]
	struct RecordingEngine {
		ids: Vec<NodeId>,
		edges: Vec<(NodeId, NodeId)>,
		opacity: HashMap<NodeId, f64>,
		physics: bool,
		mode: LayoutMode,
		scale: f64,
		fits: usize,
		loads: usize,
		stabilize_after: Option<usize>,
	}

	impl LayoutEngine for RecordingEngine {
		fn load_graph(&mut self, nodes: &[StyledNode], edges: &[EdgeRecord]) {
			self.loads += 1;
			self.ids = nodes.iter().map(|n| n.id.clone()).collect();
			self.edges = edges
				.iter()
				.map(|e| (e.from.clone(), e.to.clone()))
				.collect();
			self.opacity = self.ids.iter().map(|id| (id.clone(), 1.0)).collect();
			self.stabilize_after = Some(2);
		}

		fn set_physics_enabled(&mut self, enabled: bool) {
			self.physics = enabled;
		}

		fn set_layout_mode(&mut self, mode: LayoutMode) {
			self.mode = mode;
		}

		fn fit_view(&mut self, _duration_secs: f64) {
			self.fits += 1;
		}

		fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId> {
			self.edges
				.iter()
				.filter_map(|(from, to)| {
					if from == id {
						Some(to.clone())
					} else if to == id {
						Some(from.clone())
					} else {
						None
					}
				})
				.collect()
		}

		fn update_node_opacity(&mut self, id: &NodeId, opacity: f64) {
			self.opacity.insert(id.clone(), opacity);
		}

		fn node_opacity(&self, id: &NodeId) -> Option<f64> {
			self.opacity.get(id).copied()
		}

		fn node_ids(&self) -> Vec<NodeId> {
			self.ids.clone()
		}

		fn edge_count(&self) -> usize {
			self.edges.len()
		}

		fn scale(&self) -> f64 {
			self.scale
		}

		fn zoom_to(&mut self, scale: f64, _x: f64, _y: f64) {
			self.scale = scale;
		}

		fn step(&mut self, _dt: f64) -> Option<EngineEvent> {
			match self.stabilize_after {
				Some(0) => {
					self.stabilize_after = None;
					Some(EngineEvent::Stabilized)
				}
				Some(n) => {
					self.stabilize_after = Some(n - 1);
					None
				}
				None => None,
			}
		}
	}

	const DOC: &str = r#"{
		"nodes": [
			{"id": "main_0", "label": "main", "group": "main_function"},
			{"id": "func_1", "label": "process", "group": "function"},
			{"id": "param_2", "label": "len", "group": "param"},
			{"id": "unsafe_3", "label": "sprintf", "group": "unsafe_call"},
			{"id": "var_4", "label": "tmp", "group": "nonsense"}
		],
		"edges": [
			{"from": "main_0", "to": "func_1"},
			{"from": "func_1", "to": "param_2"},
			{"from": "unsafe_3", "to": "func_1"}
		]
	}"#;

	fn viewer() -> GraphViewer<RecordingEngine> {
		GraphViewer::new(RecordingEngine::default(), ViewerConfig::default())
	}

	fn loaded() -> GraphViewer<RecordingEngine> {
		let mut viewer = viewer();
		viewer.apply_document(parse_document(DOC));
		viewer
	}

	fn ready() -> GraphViewer<RecordingEngine> {
		let mut viewer = loaded();
		for _ in 0..3 {
			viewer.advance(0.016);
		}
		viewer
	}

	fn opacity(viewer: &GraphViewer<RecordingEngine>, id: &str) -> f64 {
		viewer.engine().node_opacity(&id.into()).unwrap()
	}

	#[test]
	fn load_renders_every_node_and_edge() {
		let viewer = loaded();
		let status = viewer.status();
		assert_eq!(status.node_count, 5);
		assert_eq!(status.edge_count, 3);
		assert_eq!(status.load, LoadState::Loading);
		assert!(viewer.engine().physics);
	}

	#[test]
	fn stabilization_marks_ready_and_shows_legend() {
		let mut viewer = loaded();
		assert!(!viewer.status().legend_visible);
		viewer.advance(0.016);
		viewer.advance(0.016);
		assert_eq!(viewer.status().load, LoadState::Loading);
		viewer.advance(0.016);
		let status = viewer.status();
		assert_eq!(status.load, LoadState::Ready);
		assert!(status.legend_visible);
		assert!(status.physics_enabled);
	}

	#[test]
	fn physics_switches_off_after_the_settle_delay() {
		let mut viewer = ready();
		viewer.advance(0.5);
		assert!(viewer.status().physics_enabled);
		viewer.advance(0.6);
		assert!(!viewer.status().physics_enabled);
		assert!(!viewer.engine().physics);
	}

	#[test]
	fn not_found_shows_the_error_and_renders_nothing() {
		let mut viewer = viewer();
		let err = check_status("graph.json", 404).unwrap_err();
		assert_eq!(err.kind(), LoadErrorKind::Transport);
		viewer.apply_document(Err(err));
		let status = viewer.status();
		assert_eq!(status.load, LoadState::Failed(LOAD_ERROR_MESSAGE.into()));
		assert_eq!(status.node_count, 0);
		assert_eq!(viewer.engine().loads, 0);
	}

	#[test]
	fn missing_keys_take_the_same_error_path() {
		for body in [r#"{"edges": []}"#, r#"{"nodes": []}"#] {
			let mut viewer = viewer();
			viewer.apply_document(parse_document(body));
			assert_eq!(
				viewer.status().load,
				LoadState::Failed(LOAD_ERROR_MESSAGE.into())
			);
			assert_eq!(viewer.status().node_count, 0);
		}
	}

	#[test]
	fn legend_toggle_twice_is_identity() {
		let mut viewer = ready();
		let before = viewer.status();
		let ids = viewer.engine().node_ids();
		viewer.toggle_legend();
		assert_ne!(viewer.status().legend_visible, before.legend_visible);
		viewer.toggle_legend();
		assert_eq!(viewer.status(), before);
		assert_eq!(viewer.engine().node_ids(), ids);
	}

	#[test]
	fn physics_toggle_twice_is_identity() {
		let mut viewer = ready();
		let ids = viewer.engine().node_ids();
		let before = viewer.status().physics_enabled;
		assert_eq!(viewer.toggle_physics(), !before);
		assert_eq!(viewer.toggle_physics(), before);
		assert_eq!(viewer.engine().physics, before);
		assert_eq!(viewer.engine().node_ids(), ids);
	}

	#[test]
	fn frame_clock_reports_real_elapsed_time() {
		let mut clock = FrameClock::default();
		assert_eq!(clock.tick(1000.0), FIRST_FRAME_SECS);
		assert!((clock.tick(1008.0) - 0.008).abs() < 1e-12);
		assert!((clock.tick(1508.0) - 0.5).abs() < 1e-12);
		assert_eq!(clock.tick(1400.0), 0.0);
	}

	#[test]
	fn settle_delay_is_the_same_at_any_frame_rate() {
		for frame_ms in [1000.0 / 120.0, 1000.0 / 60.0, 250.0] {
			let mut viewer = ready();
			let mut clock = FrameClock::default();
			clock.tick(0.0);
			let mut now = 0.0;
			while viewer.status().physics_enabled {
				now += frame_ms;
				viewer.advance(clock.tick(now));
			}
			let elapsed = now / 1000.0;
			let frame = frame_ms / 1000.0;
			assert!(elapsed > 1.0 - 1e-9, "{frame_ms}: {elapsed}");
			assert!(elapsed < 1.0 + 2.0 * frame, "{frame_ms}: {elapsed}");
		}
	}

	#[test]
	fn manual_physics_toggle_cancels_the_settle_timer() {
		let mut viewer = ready();
		viewer.toggle_physics();
		viewer.toggle_physics();
		viewer.advance(5.0);
		assert!(viewer.status().physics_enabled);
	}

	#[test]
	fn double_click_highlights_the_neighbourhood() {
		let mut viewer = ready();
		viewer.on_double_click(Some(&"func_1".into()));
		assert_eq!(viewer.highlighted(), Some(&NodeId::from("func_1")));
		for id in ["func_1", "main_0", "param_2", "unsafe_3"] {
			assert_eq!(opacity(&viewer, id), 1.0, "{id}");
		}
		assert_eq!(opacity(&viewer, "var_4"), 0.2);

		viewer.on_double_click(Some(&"param_2".into()));
		assert_eq!(opacity(&viewer, "param_2"), 1.0);
		assert_eq!(opacity(&viewer, "func_1"), 1.0);
		assert_eq!(opacity(&viewer, "main_0"), 0.2);
		assert_eq!(opacity(&viewer, "unsafe_3"), 0.2);
	}

	#[test]
	fn double_click_on_empty_canvas_restores_opacity() {
		let mut viewer = ready();
		viewer.on_double_click(Some(&"main_0".into()));
		viewer.on_double_click(None);
		assert_eq!(viewer.highlighted(), None);
		for id in viewer.engine().node_ids() {
			assert_eq!(viewer.engine().node_opacity(&id), Some(1.0));
		}
	}

	#[test]
	fn double_click_on_an_unknown_id_clears_the_highlight() {
		let mut viewer = ready();
		viewer.on_double_click(Some(&"main_0".into()));
		viewer.on_double_click(Some(&NodeId::Int(99)));
		assert_eq!(viewer.highlighted(), None);
		assert_eq!(opacity(&viewer, "var_4"), 1.0);
	}

	#[test]
	fn double_click_before_load_is_a_no_op() {
		let mut viewer = viewer();
		viewer.on_double_click(Some(&"main_0".into()));
		assert_eq!(viewer.highlighted(), None);
		assert!(viewer.engine().opacity.is_empty());
	}

	#[test]
	fn zoom_is_clamped_to_the_floor() {
		let mut viewer = ready();
		assert_eq!(viewer.on_zoom(0.1, 0.0, 0.0), 0.3);
		assert_eq!(viewer.on_zoom(2.0, 0.0, 0.0), 2.0);
	}

	#[test]
	fn hierarchical_toggle_reaches_the_engine() {
		let mut viewer = ready();
		assert_eq!(viewer.toggle_hierarchical_layout(), LayoutMode::Hierarchical);
		assert_eq!(viewer.engine().mode, LayoutMode::Hierarchical);
		assert_eq!(viewer.toggle_hierarchical_layout(), LayoutMode::Free);
		assert_eq!(viewer.engine().mode, LayoutMode::Free);
	}

	#[test]
	fn fit_is_ignored_until_a_graph_is_loaded() {
		let mut viewer = viewer();
		viewer.fit();
		assert_eq!(viewer.engine().fits, 0);
		let mut viewer = ready();
		viewer.fit();
		assert_eq!(viewer.engine().fits, 1);
	}

	#[test]
	fn sample_document_through_the_force_engine() {
		use crate::engine::ForceGraphEngine;

		let config = ViewerConfig::default();
		let engine = ForceGraphEngine::new(config.clone(), 1024.0, 768.0);
		let mut viewer = GraphViewer::new(engine, config);
		viewer.apply_document(parse_document(include_str!("../graph.json")));
		for _ in 0..100 {
			viewer.advance(0.016);
		}
		let status = viewer.status();
		assert_eq!(status.load, LoadState::Ready);
		assert_eq!(status.node_count, 20);
		assert_eq!(status.edge_count, 24);

		viewer.on_double_click(Some(&"call_19".into()));
		let engine = viewer.engine();
		for id in ["call_19", "block_17", "func_4", "buffer_16"] {
			assert_eq!(engine.node_opacity(&id.into()), Some(1.0), "{id}");
		}
		assert_eq!(engine.node_opacity(&"main_14".into()), Some(0.2));
	}

	#[test]
	fn double_click_off_centre_on_a_wide_node_highlights_it() {
		use crate::engine::ForceGraphEngine;

		let config = ViewerConfig::default();
		let engine = ForceGraphEngine::new(config.clone(), 1024.0, 768.0);
		let mut viewer = GraphViewer::new(engine, config);
		viewer.apply_document(parse_document(
			r#"{
				"nodes": [
					{"id": "buffer_1", "label": "BufferParam: filename (const char *) [buffer parameter]", "group": "buffer_param"},
					{"id": "func_0", "label": "parse", "group": "function"}
				],
				"edges": []
			}"#,
		));
		viewer.toggle_hierarchical_layout();
		for _ in 0..100 {
			viewer.advance(0.016);
		}

		let (gx, gy) = viewer.engine().position_of(&"buffer_1".into()).unwrap();
		let t = viewer.engine().transform;
		let target = viewer.engine().node_id_at((gx + 40.0) * t.k + t.x, gy * t.k + t.y);
		viewer.on_double_click(target.as_ref());
		assert_eq!(viewer.highlighted(), Some(&NodeId::from("buffer_1")));
		assert_eq!(viewer.engine().node_opacity(&"func_0".into()), Some(0.2));
	}
}
