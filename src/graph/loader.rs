use log::{debug, info};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::types::GraphDocument;

/// Failure to obtain a usable graph document. Terminal for the session.
#[derive(Debug, Error)]
pub enum LoadError {
	/// The server answered with a non-2xx status.
	#[error("request for {url} returned HTTP {status}")]
	Status {
		/// Requested location.
		url: String,
		/// HTTP status code.
		status: u16,
	},
	/// The request never produced a response body.
	#[error("request for {url} failed: {reason}")]
	Network {
		/// Requested location.
		url: String,
		/// Browser-reported cause.
		reason: String,
	},
	/// The body is not a valid graph document.
	#[error("graph document is malformed: {0}")]
	Parse(#[from] serde_json::Error),
}

/// The two failure classes the page distinguishes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadErrorKind {
	/// Network failure or bad HTTP status.
	Transport,
	/// Body received but unusable.
	Parse,
}

impl LoadError {
	/// Which failure class this error belongs to.
	pub fn kind(&self) -> LoadErrorKind {
		match self {
			LoadError::Status { .. } | LoadError::Network { .. } => LoadErrorKind::Transport,
			LoadError::Parse(_) => LoadErrorKind::Parse,
		}
	}

	fn network(url: &str, err: JsValue) -> Self {
		LoadError::Network {
			url: url.to_owned(),
			reason: err.as_string().unwrap_or_else(|| format!("{err:?}")),
		}
	}
}

/// Rejects anything outside the 2xx range.
pub fn check_status(url: &str, status: u16) -> Result<(), LoadError> {
	if (200..300).contains(&status) {
		Ok(())
	} else {
		Err(LoadError::Status {
			url: url.to_owned(),
			status,
		})
	}
}

/// Parses a `{nodes: [...], edges: [...]}` payload.
pub fn parse_document(body: &str) -> Result<GraphDocument, LoadError> {
	let doc: GraphDocument = serde_json::from_str(body)?;
	debug!(
		"Parsed graph document: {} nodes, {} edges",
		doc.nodes.len(),
		doc.edges.len()
	);
	Ok(doc)
}

/// Fetches and parses the graph document at `url`.
pub async fn load(url: &str) -> Result<GraphDocument, LoadError> {
	info!("Fetching graph document from {url}");
	let window = web_sys::window().ok_or_else(|| LoadError::Network {
		url: url.to_owned(),
		reason: "no window available".into(),
	})?;

	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.and_then(|value| value.dyn_into())
		.map_err(|e| LoadError::network(url, e))?;
	check_status(url, response.status())?;

	let text = response.text().map_err(|e| LoadError::network(url, e))?;
	let body = JsFuture::from(text)
		.await
		.map_err(|e| LoadError::network(url, e))?
		.as_string()
		.unwrap_or_default();
	parse_document(&body)
}
