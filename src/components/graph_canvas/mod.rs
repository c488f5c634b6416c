mod component;
mod render;

pub use component::{GraphCanvas, ViewerHandle, sync_status};
