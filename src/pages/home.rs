use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::use_query_map;

use crate::components::graph_canvas::{GraphCanvas, ViewerHandle, sync_status};
use crate::components::legend::Legend;
use crate::components::loading::LoadingIndicator;
use crate::components::toolbar::{Toolbar, ToolbarCommand};
use crate::config::ViewerConfig;
use crate::engine::ForceGraphEngine;
use crate::graph::load;
use crate::viewer::{GraphViewer, LoadState, ViewStatus};

fn run_command(viewer: &ViewerHandle, command: ToolbarCommand) {
	let mut viewer = viewer.borrow_mut();
	match command {
		ToolbarCommand::ToggleLegend => {
			viewer.toggle_legend();
		}
		ToolbarCommand::Fit => viewer.fit(),
		ToolbarCommand::TogglePhysics => {
			viewer.toggle_physics();
		}
		ToolbarCommand::ToggleHierarchical => {
			viewer.toggle_hierarchical_layout();
		}
	}
}

/// Graph viewer page. The document comes from `?src=` or the configured default.
#[component]
pub fn Home() -> impl IntoView {
	let config = ViewerConfig::default();
	let source = use_query_map()
		.with_untracked(|query| query.get("src"))
		.unwrap_or_else(|| config.source.clone());

	let engine = ForceGraphEngine::new(config.clone(), 800.0, 600.0);
	let viewer: ViewerHandle = Rc::new(RefCell::new(GraphViewer::new(engine, config)));
	let status = RwSignal::new(ViewStatus::default());

	let viewer_load = viewer.clone();
	spawn_local(async move {
		let result = load(&source).await;
		viewer_load.borrow_mut().apply_document(result);
		sync_status(&viewer_load, status);
	});

	let viewer_cmd = viewer.clone();
	let on_command = move |command: ToolbarCommand| {
		run_command(&viewer_cmd, command);
		sync_status(&viewer_cmd, status);
	};

	let legend_visible = Signal::derive(move || status.with(|s| s.legend_visible));
	let summary = move || {
		status.with(|s| {
			(s.load == LoadState::Ready)
				.then(|| format!("{} nodes, {} edges", s.node_count, s.edge_count))
		})
	};

	view! {
		<div class="fullscreen-graph">
			<GraphCanvas viewer=viewer status=status fullscreen=true />
			<div class="graph-overlay">
				<h1>"Call Graph"</h1>
				<p class="subtitle">
					"Double-click a node to highlight its neighbours. Scroll to zoom. Drag to move."
				</p>
				<p class="summary">{summary}</p>
			</div>
			<Toolbar on_command=on_command status=status />
			<Legend visible=legend_visible />
			<LoadingIndicator status=status />
		</div>
	}
}
