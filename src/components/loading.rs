use leptos::prelude::*;

use crate::viewer::{LoadState, ViewStatus};

/// Shown until the graph is ready; turns into the error banner on failure.
#[component]
pub fn LoadingIndicator(#[prop(into)] status: Signal<ViewStatus>) -> impl IntoView {
	move || match status.with(|s| s.load.clone()) {
		LoadState::Loading => Some(view! { <div class="loading">"Loading graph..."</div> }.into_any()),
		LoadState::Failed(message) => {
			Some(view! { <div class="loading error">{message}</div> }.into_any())
		}
		LoadState::Ready => None,
	}
}
