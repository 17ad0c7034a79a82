pub mod geometry;
pub mod hit;
pub mod id;
pub mod layout;
pub mod markup;
pub mod model;

pub use geometry::{GeometryProvider, Point, Rect, Scope, Size, Vec2};
pub use hit::deep_target_find;
pub use id::{ElementId, Tag};
pub use layout::{LayoutGeometry, Viewport, resolve_bounds, resolve_layout};
pub use markup::{MarkupError, parse_fragment};
pub use model::*;

// Re-export petgraph types so downstream crates don't need a direct dependency
pub use petgraph::graph::NodeIndex;
