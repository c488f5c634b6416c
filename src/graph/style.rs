//! Category → visual style lookup.
//!
//! The table is fixed at compile time and indexed by [`NodeCategory`]; a node
//! whose `group` is not one of the known labels is drawn with the
//! [`NodeCategory::Function`] style.

use super::types::{NodeId, NodeRecord};

/// Semantic role of a node in the analysed program.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeCategory {
	/// A function definition.
	Function,
	/// The program entry point.
	MainFunction,
	/// A call site.
	Call,
	/// A call to a known-unsafe library function.
	UnsafeCall,
	/// A pointer parameter used as a buffer.
	BufferParam,
	/// Any other parameter.
	Param,
	/// A local variable.
	Variable,
	/// A basic block.
	Basic,
}

impl NodeCategory {
	/// Every category, in table order.
	pub const ALL: [NodeCategory; 8] = [
		NodeCategory::Function,
		NodeCategory::MainFunction,
		NodeCategory::Call,
		NodeCategory::UnsafeCall,
		NodeCategory::BufferParam,
		NodeCategory::Param,
		NodeCategory::Variable,
		NodeCategory::Basic,
	];

	/// Category used for unknown or missing groups.
	pub const DEFAULT: NodeCategory = NodeCategory::Function;

	/// Label used for this category in `graph.json`.
	pub fn as_str(self) -> &'static str {
		CATEGORY_NAMES[self as usize]
	}

	/// Human-readable name for the legend.
	pub fn title(self) -> &'static str {
		CATEGORY_TITLES[self as usize]
	}

	/// Resolves a document `group` label, if it names a known category.
	pub fn parse(group: &str) -> Option<NodeCategory> {
		CATEGORY_NAMES
			.iter()
			.position(|name| *name == group)
			.map(|i| Self::ALL[i])
	}

	/// Resolves a `group` label, falling back to [`NodeCategory::DEFAULT`].
	pub fn from_group(group: &str) -> NodeCategory {
		Self::parse(group).unwrap_or(Self::DEFAULT)
	}

	/// Fill, border, shape and font for this category.
	pub fn style(self) -> &'static NodeStyle {
		&STYLE_TABLE[self as usize]
	}
}

/// Outline a node is drawn with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeShape {
	/// Ellipse around the label.
	Ellipse,
	/// Rectangle around the label.
	Box,
	/// Rhombus around the label.
	Diamond,
}

/// How one category of node is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
	/// CSS fill colour.
	pub fill: &'static str,
	/// CSS outline colour.
	pub border: &'static str,
	/// Outline shape.
	pub shape: NodeShape,
	/// CSS label colour.
	pub font_color: &'static str,
	/// Bold label.
	pub bold: bool,
}

const CATEGORY_NAMES: [&str; 8] = [
	"function",
	"main_function",
	"call",
	"unsafe_call",
	"buffer_param",
	"param",
	"variable",
	"basic",
];

const CATEGORY_TITLES: [&str; 8] = [
	"Function",
	"Main function",
	"Call",
	"Unsafe call",
	"Buffer parameter",
	"Parameter",
	"Variable",
	"Basic block",
];

static STYLE_TABLE: [NodeStyle; 8] = [
	// function
	NodeStyle {
		fill: "#97c2fc",
		border: "#2b7ce9",
		shape: NodeShape::Ellipse,
		font_color: "#1a1a2e",
		bold: false,
	},
	// main_function
	NodeStyle {
		fill: "#7be141",
		border: "#4aad52",
		shape: NodeShape::Ellipse,
		font_color: "#1a1a2e",
		bold: true,
	},
	// call
	NodeStyle {
		fill: "#c39bd3",
		border: "#8e44ad",
		shape: NodeShape::Ellipse,
		font_color: "#1a1a2e",
		bold: false,
	},
	// unsafe_call
	NodeStyle {
		fill: "#fb7e81",
		border: "#e31b23",
		shape: NodeShape::Diamond,
		font_color: "#ffffff",
		bold: true,
	},
	// buffer_param
	NodeStyle {
		fill: "#5dade2",
		border: "#1f618d",
		shape: NodeShape::Box,
		font_color: "#ffffff",
		bold: true,
	},
	// param
	NodeStyle {
		fill: "#ffa807",
		border: "#d68910",
		shape: NodeShape::Ellipse,
		font_color: "#1a1a2e",
		bold: false,
	},
	// variable
	NodeStyle {
		fill: "#a9dfbf",
		border: "#27ae60",
		shape: NodeShape::Ellipse,
		font_color: "#1a1a2e",
		bold: false,
	},
	// basic
	NodeStyle {
		fill: "#f5b7b1",
		border: "#c0392b",
		shape: NodeShape::Box,
		font_color: "#1a1a2e",
		bold: false,
	},
];

/// A document node with its style resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledNode {
	/// Document id.
	pub id: NodeId,
	/// Display text, already defaulted to the id.
	pub label: String,
	/// Hover text.
	pub title: Option<String>,
	/// Resolved category.
	pub category: NodeCategory,
	/// The category's style.
	pub style: NodeStyle,
}

/// Resolves each node's style once, in document order.
pub fn apply_style(nodes: &[NodeRecord]) -> Vec<StyledNode> {
	nodes
		.iter()
		.map(|node| {
			let category = NodeCategory::from_group(&node.group);
			StyledNode {
				id: node.id.clone(),
				label: node.display_label(),
				title: node.title.clone(),
				category,
				style: *category.style(),
			}
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(id: &str, group: &str) -> NodeRecord {
		NodeRecord {
			id: id.into(),
			group: group.into(),
			label: Some(id.to_uppercase()),
			title: None,
		}
	}

	#[test]
	fn every_category_round_trips_through_its_label() {
		for category in NodeCategory::ALL {
			assert_eq!(NodeCategory::parse(category.as_str()), Some(category));
		}
	}

	#[test]
	fn unknown_and_missing_groups_use_function_style() {
		let styled = apply_style(&[record("a", "pointer"), record("b", "")]);
		for node in &styled {
			assert_eq!(node.category, NodeCategory::Function);
			assert_eq!(node.style, *NodeCategory::Function.style());
		}
	}

	#[test]
	fn styles_follow_the_table() {
		let styled = apply_style(&[
			record("m", "main_function"),
			record("u", "unsafe_call"),
			record("b", "basic"),
		]);
		assert_eq!(styled[0].style, *NodeCategory::MainFunction.style());
		assert!(styled[0].style.bold);
		assert_eq!(styled[1].style.shape, NodeShape::Diamond);
		assert_eq!(styled[2].style.shape, NodeShape::Box);
		assert_eq!(styled[2].label, "B");
	}

	#[test]
	fn unsafe_calls_stand_out_from_calls() {
		assert_ne!(
			NodeCategory::Call.style().fill,
			NodeCategory::UnsafeCall.style().fill
		);
	}
}
