use leptos::prelude::*;

use crate::engine::LayoutMode;
use crate::viewer::ViewStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarCommand {
	ToggleLegend,
	Fit,
	TogglePhysics,
	ToggleHierarchical,
}

#[component]
pub fn Toolbar<F>(on_command: F, #[prop(into)] status: Signal<ViewStatus>) -> impl IntoView
where
	F: Fn(ToolbarCommand) + Clone + 'static,
{
	let button = move |command: ToolbarCommand, label: Signal<String>| {
		let on_command = on_command.clone();
		view! { <button on:click=move |_| on_command(command)>{move || label.get()}</button> }
	};

	let physics_label = Signal::derive(move || {
		if status.with(|s| s.physics_enabled) {
			"Physics: on".to_string()
		} else {
			"Physics: off".to_string()
		}
	});
	let layout_label = Signal::derive(move || match status.with(|s| s.layout) {
		LayoutMode::Free => "Hierarchical Layout".to_string(),
		LayoutMode::Hierarchical => "Free Layout".to_string(),
	});

	view! {
		<nav class="toolbar">
			{button(ToolbarCommand::ToggleLegend, Signal::stored("Toggle Legend".to_string()))}
			{button(ToolbarCommand::Fit, Signal::stored("Fit View".to_string()))}
			{button(ToolbarCommand::TogglePhysics, physics_label)}
			{button(ToolbarCommand::ToggleHierarchical, layout_label)}
		</nav>
	}
}
