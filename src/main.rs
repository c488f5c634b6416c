//! Trunk entry point: mounts the viewer app on the page body.

use callgraph_viewer::{App, init_logging};
use leptos::mount::mount_to_body;

// Used by the library half of the package.
use console_error_panic_hook as _;
use console_log as _;
use force_graph as _;
use js_sys as _;
use leptos_meta as _;
use leptos_router as _;
use log as _;
use serde as _;
use serde_json as _;
use thiserror as _;
use wasm_bindgen as _;
use wasm_bindgen_futures as _;
use web_sys as _;

fn main() {
	init_logging();
	mount_to_body(App);
}
