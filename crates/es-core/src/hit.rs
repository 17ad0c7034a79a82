//! Hit testing: point → node lookup across nested rendering scopes.

use crate::geometry::{GeometryProvider, Point, Scope};
use crate::model::SceneGraph;
use petgraph::graph::NodeIndex;

/// Find the deepest node at `point`.
///
/// Starts with a document-scope query, then keeps re-querying inside each
/// host's scope at the same point. Stops when the current node opens no
/// scope, when the nested query returns the host itself, or at `stop_at`.
/// An empty nested result keeps the last node found.
pub fn deep_target_find<G: GeometryProvider + ?Sized>(
    geometry: &G,
    graph: &SceneGraph,
    point: Point,
    stop_at: Option<NodeIndex>,
) -> Option<NodeIndex> {
    let mut node = geometry.element_from_point(graph, Scope::Document, point);
    let mut next = node;

    while let Some(current) = next {
        if Some(current) == stop_at || !geometry.has_scope(graph, current) {
            break;
        }
        next = geometry.element_from_point(graph, Scope::Host(current), point);
        if next == Some(current) {
            break;
        }
        if next.is_some() {
            node = next;
        }
    }

    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::SceneNode;
    use std::collections::HashMap;

    /// Scripted provider: a fixed answer per scope.
    struct Scripted {
        answers: HashMap<Option<NodeIndex>, Option<NodeIndex>>,
        hosts: Vec<NodeIndex>,
    }

    impl GeometryProvider for Scripted {
        fn bounding_rect(&self, _: &SceneGraph, _: NodeIndex) -> Rect {
            Rect::ZERO
        }

        fn element_from_point(&self, _: &SceneGraph, scope: Scope, _: Point) -> Option<NodeIndex> {
            let key = match scope {
                Scope::Document => None,
                Scope::Host(h) => Some(h),
            };
            self.answers.get(&key).copied().flatten()
        }

        fn has_scope(&self, _: &SceneGraph, idx: NodeIndex) -> bool {
            self.hosts.contains(&idx)
        }
    }

    fn nested() -> (SceneGraph, NodeIndex, NodeIndex, NodeIndex) {
        let mut sg = SceneGraph::new();
        let outer = sg.add_node(sg.root, SceneNode::new("x-outer").with_slots(1));
        let inner = sg.add_node(outer, SceneNode::new("x-inner").with_slots(1));
        let leaf = sg.add_node(inner, SceneNode::new("span"));
        (sg, outer, inner, leaf)
    }

    #[test]
    fn descends_through_nested_scopes() {
        let (sg, outer, inner, leaf) = nested();
        let geometry = Scripted {
            answers: HashMap::from([
                (None, Some(outer)),
                (Some(outer), Some(inner)),
                (Some(inner), Some(leaf)),
            ]),
            hosts: vec![outer, inner],
        };
        assert_eq!(
            deep_target_find(&geometry, &sg, Point::new(1.0, 1.0), None),
            Some(leaf)
        );
    }

    #[test]
    fn stops_when_scope_returns_its_host() {
        let (sg, outer, inner, _) = nested();
        let geometry = Scripted {
            answers: HashMap::from([(None, Some(outer)), (Some(outer), Some(outer))]),
            hosts: vec![outer, inner],
        };
        assert_eq!(
            deep_target_find(&geometry, &sg, Point::new(1.0, 1.0), None),
            Some(outer)
        );
    }

    #[test]
    fn empty_scope_keeps_last_hit() {
        let (sg, outer, inner, _) = nested();
        let geometry = Scripted {
            answers: HashMap::from([(None, Some(outer)), (Some(outer), None)]),
            hosts: vec![outer, inner],
        };
        assert_eq!(
            deep_target_find(&geometry, &sg, Point::new(1.0, 1.0), None),
            Some(outer)
        );
    }

    #[test]
    fn stop_at_halts_descent() {
        let (sg, outer, inner, leaf) = nested();
        let geometry = Scripted {
            answers: HashMap::from([
                (None, Some(outer)),
                (Some(outer), Some(inner)),
                (Some(inner), Some(leaf)),
            ]),
            hosts: vec![outer, inner],
        };
        assert_eq!(
            deep_target_find(&geometry, &sg, Point::new(1.0, 1.0), Some(inner)),
            Some(inner)
        );
    }
}
