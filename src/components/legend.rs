use leptos::prelude::*;

use crate::graph::{NodeCategory, NodeShape};

fn swatch_style(category: NodeCategory) -> String {
	let style = category.style();
	let radius = match style.shape {
		NodeShape::Ellipse => "50%",
		NodeShape::Box => "2px",
		NodeShape::Diamond => "0",
	};
	let rotate = if style.shape == NodeShape::Diamond {
		" transform: rotate(45deg);"
	} else {
		""
	};
	format!(
		"background: {}; border: 2px solid {}; border-radius: {radius};{rotate}",
		style.fill, style.border
	)
}

/// Static key of node categories; visibility is animated by the `visible` class.
#[component]
pub fn Legend(#[prop(into)] visible: Signal<bool>) -> impl IntoView {
	view! {
		<aside class="legend" class:visible=move || visible.get()>
			<h2>"Legend"</h2>
			<ul>
				{NodeCategory::ALL
					.into_iter()
					.map(|category| {
						view! {
							<li>
								<span class="swatch" style=swatch_style(category)></span>
								{category.title()}
							</li>
						}
					})
					.collect_view()}
			</ul>
		</aside>
	}
}
