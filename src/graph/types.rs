use std::fmt;

use serde::{Deserialize, Deserializer};

/// Node identifier as it appears in the document: either a string or an integer.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum NodeId {
	/// String id, e.g. `"func_0"`.
	Str(String),
	/// Integer id.
	Int(i64),
}

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			NodeId::Str(s) => f.write_str(s),
			NodeId::Int(i) => write!(f, "{i}"),
		}
	}
}

impl From<&str> for NodeId {
	fn from(s: &str) -> Self {
		NodeId::Str(s.to_owned())
	}
}

impl From<i64> for NodeId {
	fn from(i: i64) -> Self {
		NodeId::Int(i)
	}
}

/// Reads an absent or `null` field as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the document's `nodes` array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NodeRecord {
	/// Unique id that edges refer to.
	pub id: NodeId,
	/// Raw category label; unrecognised values are styled as `function`.
	#[serde(default, deserialize_with = "null_as_default")]
	pub group: String,
	/// Display text; the id is shown when absent.
	#[serde(default)]
	pub label: Option<String>,
	/// Hover text.
	#[serde(default)]
	pub title: Option<String>,
}

impl NodeRecord {
	/// Text drawn next to the node, falling back to the id.
	pub fn display_label(&self) -> String {
		self.label.clone().unwrap_or_else(|| self.id.to_string())
	}
}

/// One directed entry of the document's `edges` array.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EdgeRecord {
	/// Source node id.
	pub from: NodeId,
	/// Target node id.
	pub to: NodeId,
	/// Relationship name drawn at the midpoint.
	#[serde(default)]
	pub label: Option<String>,
	/// CSS colour for the stroke.
	#[serde(default)]
	pub color: Option<String>,
	/// Stroke width.
	#[serde(default)]
	pub weight: Option<f64>,
	/// Dashed stroke; absent or `null` means solid.
	#[serde(default)]
	pub dashes: Option<bool>,
}

/// The whole `graph.json` payload. Both keys are required.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct GraphDocument {
	/// Nodes in document order.
	pub nodes: Vec<NodeRecord>,
	/// Edges in document order; endpoints may name unknown ids.
	pub edges: Vec<EdgeRecord>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn ids_accept_strings_and_integers() {
		let doc: GraphDocument = serde_json::from_str(
			r#"{"nodes":[{"id":"func_0","group":"function"},{"id":7,"group":"param"}],
			    "edges":[{"from":"func_0","to":7}]}"#,
		)
		.unwrap();
		assert_eq!(doc.nodes[0].id, NodeId::from("func_0"));
		assert_eq!(doc.nodes[1].id, NodeId::Int(7));
		assert_eq!(doc.edges[0].to, NodeId::Int(7));
	}

	#[test]
	fn optional_edge_attributes_default() {
		let edge: EdgeRecord = serde_json::from_str(r#"{"from":1,"to":2}"#).unwrap();
		assert_eq!(edge.label, None);
		assert_eq!(edge.weight, None);
		assert_eq!(edge.dashes, None);
	}

	#[test]
	fn null_attributes_are_treated_as_absent() {
		let doc: GraphDocument = serde_json::from_str(
			r#"{"nodes":[{"id":"var_2","group":null,"label":null}],
			    "edges":[{"from":"var_2","to":"var_2","dashes":null,"weight":null,"color":null}]}"#,
		)
		.unwrap();
		assert_eq!(doc.nodes[0].group, "");
		assert_eq!(doc.edges[0].dashes, None);
		assert_eq!(doc.edges[0].weight, None);
	}

	#[test]
	fn generator_edges_keep_their_attributes() {
		let edge: EdgeRecord = serde_json::from_str(
			r#"{"from":"func_0","to":"call_3","label":"calls","weight":2.0,"color":"blue","dashes":false}"#,
		)
		.unwrap();
		assert_eq!(edge.label.as_deref(), Some("calls"));
		assert_eq!(edge.color.as_deref(), Some("blue"));
		assert_eq!(edge.weight, Some(2.0));
		assert_eq!(edge.dashes, Some(false));
	}

	#[test]
	fn label_falls_back_to_id() {
		let node: NodeRecord = serde_json::from_str(r#"{"id":42}"#).unwrap();
		assert_eq!(node.display_label(), "42");
		assert_eq!(node.group, "");
	}
}
