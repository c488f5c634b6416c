//! Graph document schema, loading and styling.

mod loader;
mod style;
mod types;

pub use loader::{LoadError, LoadErrorKind, check_status, load, parse_document};
pub use style::{NodeCategory, NodeShape, NodeStyle, StyledNode, apply_style};
pub use types::{EdgeRecord, GraphDocument, NodeId, NodeRecord};
