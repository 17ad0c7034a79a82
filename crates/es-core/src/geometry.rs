//! Geometry provider seam.
//!
//! Bounding rectangles are derived, never stored on nodes: the canvas
//! engine asks a `GeometryProvider` every time it needs one.

use crate::model::SceneGraph;
use petgraph::graph::NodeIndex;

pub use kurbo::{Point, Rect, Size, Vec2};

/// A hit-testing scope. Elements that encapsulate their rendering (hosts
/// with content-projection points) open a nested scope; a document-level
/// query stops at the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Document,
    Host(NodeIndex),
}

/// Supplies axis-aligned geometry and single-scope hit testing.
pub trait GeometryProvider {
    /// Current bounding rectangle of a node, including any transient translate.
    fn bounding_rect(&self, graph: &SceneGraph, idx: NodeIndex) -> Rect;

    /// Topmost node at `point` inside `scope`, if any.
    fn element_from_point(&self, graph: &SceneGraph, scope: Scope, point: Point)
    -> Option<NodeIndex>;

    /// Whether `idx` opens a nested scope that can be queried further.
    fn has_scope(&self, graph: &SceneGraph, idx: NodeIndex) -> bool;
}

/// Strict containment: a point on the boundary is *outside*.
pub fn strictly_contains(rect: Rect, point: Point) -> bool {
    point.x > rect.x0 && point.x < rect.x1 && point.y > rect.y0 && point.y < rect.y1
}

/// Whether `point` falls inside the bottom-right resize handle of `rect`.
/// Both distances must be strictly below `margin`.
pub fn in_resize_corner(rect: Rect, point: Point, margin: f64) -> bool {
    rect.x1 - point.x < margin && rect.y1 - point.y < margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_containment_excludes_edges() {
        let r = Rect::new(10.0, 10.0, 110.0, 60.0);
        assert!(strictly_contains(r, Point::new(11.0, 11.0)));
        assert!(!strictly_contains(r, Point::new(10.0, 30.0)));
        assert!(!strictly_contains(r, Point::new(50.0, 10.0)));
        assert!(!strictly_contains(r, Point::new(110.0, 30.0)));
        assert!(!strictly_contains(r, Point::new(50.0, 60.0)));
    }

    #[test]
    fn resize_corner_boundary() {
        let r = Rect::new(0.0, 0.0, 100.0, 50.0);
        // 7 units from both edges → resize
        assert!(in_resize_corner(r, Point::new(93.0, 43.0), 8.0));
        // 8 units from either edge → drag
        assert!(!in_resize_corner(r, Point::new(92.0, 43.0), 8.0));
        assert!(!in_resize_corner(r, Point::new(93.0, 42.0), 8.0));
    }
}
