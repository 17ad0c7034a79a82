//! Reference geometry provider: resolves rectangles from style records.
//!
//! A small flow model:
//! - the root container fills the viewport (or its own width/height),
//! - in-flow children (`static`/`relative`) stack vertically in child order
//!   and are then shifted by their left/top offsets,
//! - `absolute` children sit at parent origin + left/top and take no space,
//! - style blocks have no size and take no space,
//! - the transient translate applies last.

use crate::geometry::{GeometryProvider, Point, Rect, Scope, Size};
use crate::model::{SceneGraph, SceneNode};
use petgraph::graph::NodeIndex;
use std::collections::HashMap;

/// Height of a node without an explicit height.
pub const DEFAULT_ROW_HEIGHT: f64 = 20.0;
/// Width of an absolutely positioned node without an explicit width.
pub const DEFAULT_ABSOLUTE_WIDTH: f64 = 100.0;

/// The canvas (viewport) dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

/// Resolve the rectangle of a single node by walking up its ancestors.
pub fn resolve_bounds(graph: &SceneGraph, viewport: Viewport, idx: NodeIndex) -> Rect {
    let Some(node) = graph.node(idx) else {
        return Rect::ZERO;
    };

    if idx == graph.root {
        let size = Size::new(
            node.style.width.unwrap_or(viewport.width),
            node.style.height.unwrap_or(viewport.height),
        );
        return Rect::from_origin_size(Point::ORIGIN, size);
    }

    let Some(parent) = graph.parent(idx) else {
        return Rect::from_origin_size(Point::ORIGIN, node_size(node, viewport.width));
    };
    let parent_rect = resolve_bounds(graph, viewport, parent);

    if node.caps.is_style_marker {
        return Rect::from_origin_size(parent_rect.origin(), Size::ZERO);
    }

    let size = node_size(node, parent_rect.width());
    let style = &node.style;
    let mut origin = if style.position.in_flow() {
        Point::new(
            parent_rect.x0 + style.left_or_zero(),
            parent_rect.y0 + flow_offset(graph, parent, idx) + style.top_or_zero(),
        )
    } else {
        Point::new(
            parent_rect.x0 + style.left_or_zero(),
            parent_rect.y0 + style.top_or_zero(),
        )
    };
    if let Some(t) = style.translate {
        origin += t;
    }

    Rect::from_origin_size(origin, size)
}

/// Resolve every node in the scene.
pub fn resolve_layout(graph: &SceneGraph, viewport: Viewport) -> HashMap<NodeIndex, Rect> {
    let mut bounds = HashMap::new();
    bounds.insert(graph.root, resolve_bounds(graph, viewport, graph.root));
    for idx in graph.descendants(graph.root) {
        bounds.insert(idx, resolve_bounds(graph, viewport, idx));
    }
    bounds
}

fn node_size(node: &SceneNode, parent_width: f64) -> Size {
    let default_width = if node.style.position.in_flow() {
        parent_width
    } else {
        DEFAULT_ABSOLUTE_WIDTH
    };
    Size::new(
        node.style.width.unwrap_or(default_width).max(0.0),
        node.style.height.unwrap_or(DEFAULT_ROW_HEIGHT).max(0.0),
    )
}

/// Vertical space taken by in-flow siblings painted before `idx`.
fn flow_offset(graph: &SceneGraph, parent: NodeIndex, idx: NodeIndex) -> f64 {
    graph
        .children(parent)
        .iter()
        .take_while(|c| **c != idx)
        .map(|c| &graph.graph[*c])
        .filter(|n| n.style.position.in_flow() && !n.caps.is_style_marker)
        .map(|n| n.style.height.unwrap_or(DEFAULT_ROW_HEIGHT).max(0.0))
        .sum()
}

/// `GeometryProvider` backed by `resolve_bounds`.
///
/// Hosts (nodes with content-projection points) open a nested scope:
/// document-level hit tests stop at the host, and the host's scope is
/// searched among its children.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayoutGeometry {
    pub viewport: Viewport,
}

impl LayoutGeometry {
    pub fn new(viewport: Viewport) -> Self {
        Self { viewport }
    }

    /// Walk children in reverse paint order (topmost first), then self.
    fn hit_node(&self, graph: &SceneGraph, idx: NodeIndex, point: Point) -> Option<NodeIndex> {
        let descend = idx == graph.root || !self.has_scope(graph, idx);
        if descend {
            for &child in graph.children(idx).iter().rev() {
                if let Some(hit) = self.hit_node(graph, child, point) {
                    return Some(hit);
                }
            }
        }

        let node = graph.node(idx)?;
        if node.caps.is_style_marker {
            return None;
        }
        resolve_bounds(graph, self.viewport, idx)
            .contains(point)
            .then_some(idx)
    }
}

impl GeometryProvider for LayoutGeometry {
    fn bounding_rect(&self, graph: &SceneGraph, idx: NodeIndex) -> Rect {
        resolve_bounds(graph, self.viewport, idx)
    }

    fn element_from_point(
        &self,
        graph: &SceneGraph,
        scope: Scope,
        point: Point,
    ) -> Option<NodeIndex> {
        match scope {
            Scope::Document => self.hit_node(graph, graph.root, point),
            Scope::Host(host) => graph
                .children(host)
                .iter()
                .rev()
                .find_map(|&child| self.hit_node(graph, child, point)),
        }
    }

    fn has_scope(&self, graph: &SceneGraph, idx: NodeIndex) -> bool {
        graph.node(idx).is_some_and(|n| n.caps.slots > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::deep_target_find;
    use crate::model::{NodeStyle, PositionMode};

    fn absolute(left: f64, top: f64, width: f64, height: f64) -> NodeStyle {
        NodeStyle {
            position: PositionMode::Absolute,
            left: Some(left),
            top: Some(top),
            width: Some(width),
            height: Some(height),
            ..Default::default()
        }
    }

    #[test]
    fn root_fills_viewport() {
        let sg = SceneGraph::new();
        let r = resolve_bounds(&sg, Viewport::default(), sg.root);
        assert_eq!(r, Rect::new(0.0, 0.0, 800.0, 600.0));
    }

    #[test]
    fn in_flow_children_stack_vertically() {
        let mut sg = SceneGraph::new();
        let a = sg.add_node(sg.root, SceneNode::new("div"));
        let style = sg.add_node(sg.root, SceneNode::new("style"));
        let b = sg.add_node(
            sg.root,
            SceneNode::new("div").with_style(NodeStyle {
                height: Some(40.0),
                ..Default::default()
            }),
        );
        let c = sg.add_node(sg.root, SceneNode::new("div"));
        let vp = Viewport::default();

        assert_eq!(resolve_bounds(&sg, vp, a), Rect::new(0.0, 0.0, 800.0, 20.0));
        assert_eq!(resolve_bounds(&sg, vp, style).area(), 0.0);
        assert_eq!(resolve_bounds(&sg, vp, b), Rect::new(0.0, 20.0, 800.0, 60.0));
        assert_eq!(resolve_bounds(&sg, vp, c), Rect::new(0.0, 60.0, 800.0, 80.0));
    }

    #[test]
    fn absolute_children_are_out_of_flow() {
        let mut sg = SceneGraph::new();
        let a = sg.add_node(sg.root, SceneNode::new("div").with_style(absolute(50.0, 50.0, 200.0, 100.0)));
        let inner = sg.add_node(a, SceneNode::new("span").with_style(absolute(10.0, 5.0, 20.0, 20.0)));
        let b = sg.add_node(sg.root, SceneNode::new("div"));
        let vp = Viewport::default();

        assert_eq!(resolve_bounds(&sg, vp, a), Rect::new(50.0, 50.0, 250.0, 150.0));
        assert_eq!(resolve_bounds(&sg, vp, inner), Rect::new(60.0, 55.0, 80.0, 75.0));
        assert_eq!(resolve_bounds(&sg, vp, b).y0, 0.0);
    }

    #[test]
    fn translate_applies_last() {
        let mut sg = SceneGraph::new();
        let mut style = absolute(10.0, 10.0, 50.0, 50.0);
        style.translate = Some(kurbo::Vec2::new(20.0, -5.0));
        let a = sg.add_node(sg.root, SceneNode::new("div").with_style(style));
        assert_eq!(
            resolve_bounds(&sg, Viewport::default(), a),
            Rect::new(30.0, 5.0, 80.0, 55.0)
        );
    }

    #[test]
    fn hit_test_prefers_topmost_child() {
        let mut sg = SceneGraph::new();
        let a = sg.add_node(sg.root, SceneNode::new("div").with_style(absolute(0.0, 0.0, 100.0, 100.0)));
        let b = sg.add_node(sg.root, SceneNode::new("div").with_style(absolute(50.0, 50.0, 100.0, 100.0)));
        let geometry = LayoutGeometry::default();

        let hit = |x, y| geometry.element_from_point(&sg, Scope::Document, Point::new(x, y));
        assert_eq!(hit(10.0, 10.0), Some(a));
        assert_eq!(hit(60.0, 60.0), Some(b));
        assert_eq!(hit(500.0, 500.0), Some(sg.root));
        assert_eq!(hit(900.0, 10.0), None);
    }

    #[test]
    fn hosts_open_a_nested_scope() {
        let mut sg = SceneGraph::new();
        let host = sg.add_node(
            sg.root,
            SceneNode::new("paper-card")
                .with_slots(1)
                .with_style(absolute(0.0, 0.0, 200.0, 200.0)),
        );
        let slotted = sg.add_node(host, SceneNode::new("button").with_style(absolute(10.0, 10.0, 50.0, 20.0)));
        let geometry = LayoutGeometry::default();
        let p = Point::new(20.0, 15.0);

        assert_eq!(geometry.element_from_point(&sg, Scope::Document, p), Some(host));
        assert_eq!(deep_target_find(&geometry, &sg, p, None), Some(slotted));
        assert_eq!(
            deep_target_find(&geometry, &sg, Point::new(150.0, 150.0), None),
            Some(host)
        );
    }
}
