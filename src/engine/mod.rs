//! Layout/rendering engine boundary.
//!
//! [`GraphViewer`](crate::viewer::GraphViewer) only talks to the engine
//! through [`LayoutEngine`], so the physics and layout implementation can be
//! swapped without touching the controller.

mod force;
mod hierarchy;

pub use force::{
	DragState, EdgeInfo, ForceGraphEngine, NodeBounds, NodeInfo, PanState, ViewTransform,
};

use crate::graph::{EdgeRecord, NodeId, StyledNode};

/// How node positions are decided.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
	/// Force-directed placement.
	#[default]
	Free,
	/// Top-down layers following edge direction.
	Hierarchical,
}

impl LayoutMode {
	/// The other mode.
	pub fn toggled(self) -> Self {
		match self {
			LayoutMode::Free => LayoutMode::Hierarchical,
			LayoutMode::Hierarchical => LayoutMode::Free,
		}
	}
}

/// Notifications surfaced by [`LayoutEngine::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineEvent {
	/// Initial stabilization finished; emitted once per loaded graph.
	Stabilized,
}

/// The narrow interface [`GraphViewer`](crate::viewer::GraphViewer) drives.
pub trait LayoutEngine {
	/// Replaces the scene and starts stabilization.
	fn load_graph(&mut self, nodes: &[StyledNode], edges: &[EdgeRecord]);
	/// Freezes or resumes free simulation. Stabilization is unaffected.
	fn set_physics_enabled(&mut self, enabled: bool);
	/// Switches layout mode and refits the view.
	fn set_layout_mode(&mut self, mode: LayoutMode);
	/// Animates the view to contain every node.
	fn fit_view(&mut self, duration_secs: f64);
	/// Nodes sharing an edge with `id`, in either direction.
	fn connected_nodes(&self, id: &NodeId) -> Vec<NodeId>;
	/// Sets one node's opacity; unknown ids are ignored.
	fn update_node_opacity(&mut self, id: &NodeId, opacity: f64);
	/// Current opacity of `id`, if it is in the scene.
	fn node_opacity(&self, id: &NodeId) -> Option<f64>;
	/// Ids of the nodes in the scene, in load order.
	fn node_ids(&self) -> Vec<NodeId>;
	/// Number of edges whose endpoints both resolved.
	fn edge_count(&self) -> usize;
	/// Current zoom factor.
	fn scale(&self) -> f64;
	/// Sets the view scale, keeping the screen point `(x, y)` fixed.
	fn zoom_to(&mut self, scale: f64, x: f64, y: f64);
	/// Advances simulation and animations by `dt` seconds.
	fn step(&mut self, dt: f64) -> Option<EngineEvent>;
}
