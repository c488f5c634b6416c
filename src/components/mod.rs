pub mod graph_canvas;
pub mod legend;
pub mod loading;
pub mod toolbar;
