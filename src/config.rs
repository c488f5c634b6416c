//! Renderer options.

use force_graph::SimulationParameters;

/// Everything the renderer needs to know that is not in the graph document.
#[derive(Clone, Debug, PartialEq)]
pub struct ViewerConfig {
	/// Graph document fetched when no `?src=` is given.
	pub source: String,
	/// Minimum node half height; edges start this far from bare nodes.
	pub node_radius: f64,
	/// Label font size in graph units.
	pub font_size: f64,
	/// Draw arrowheads at edge targets.
	pub arrows: bool,
	/// Repulsion between nodes.
	pub force_charge: f32,
	/// Edge spring stiffness.
	pub force_spring: f32,
	/// Cap on the force applied to a node per step.
	pub force_max: f32,
	/// Velocity scale of the simulation.
	pub node_speed: f32,
	/// Per-step velocity damping.
	pub damping_factor: f32,
	/// Upper bound on simulation steps before the graph is declared stable.
	pub stabilization_iterations: u32,
	/// Steps run per animation frame while stabilizing.
	pub stabilization_batch: u32,
	/// Largest per-step node movement still considered "moving".
	pub stabilization_threshold: f32,
	/// Time between the graph becoming ready and physics being switched off.
	pub settle_delay_secs: f64,
	/// Length of the animated fit.
	pub fit_duration_secs: f64,
	/// Opacity of nodes outside a double-click highlight.
	pub dim_opacity: f64,
	/// Zoom floor.
	pub min_zoom: f64,
	/// Zoom ceiling.
	pub max_zoom: f64,
	/// Vertical distance between hierarchical levels.
	pub level_separation: f64,
	/// Horizontal distance between nodes on one level.
	pub node_spacing: f64,
}

impl Default for ViewerConfig {
	fn default() -> Self {
		Self {
			source: "graph.json".into(),
			node_radius: 12.0,
			font_size: 12.0,
			arrows: true,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
			stabilization_iterations: 1000,
			stabilization_batch: 50,
			stabilization_threshold: 0.05,
			settle_delay_secs: 1.0,
			fit_duration_secs: 1.0,
			dim_opacity: 0.2,
			min_zoom: 0.3,
			max_zoom: 10.0,
			level_separation: 150.0,
			node_spacing: 120.0,
		}
	}
}

impl ViewerConfig {
	/// Physics settings in the form `force_graph` takes them.
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}

	/// Limits a scale to `[min_zoom, max_zoom]`.
	pub fn clamp_zoom(&self, scale: f64) -> f64 {
		scale.clamp(self.min_zoom, self.max_zoom)
	}
}
