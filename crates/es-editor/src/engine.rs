//! Canvas interaction engine.
//!
//! The engine owns the scene, the selection and the gesture state machine:
//!
//! - **Idle → Resizing** when a pointer goes down inside the bottom-right
//!   resize handle of a node; width/height follow the grid-snapped deltas.
//! - **Idle → Dragging** for any other press on a node; the node follows a
//!   transient translate, and a drop target is resolved on every tick.
//!   Offsets and parentage change only when the gesture ends.
//! - Every gesture end appends one history entry and returns to `Idle`
//!   with `just_finished` set, so the stray click that follows a gesture
//!   does not deselect the node.
//!
//! The canvas surface and the root container never start a gesture.

use crate::config::EngineConfig;
use crate::history::{ActionHistory, Change, HistoryKind, PositionSnapshot, Snapshot};
use crate::input::{InputEvent, KeyPress, Modifiers, TrackPhase};
use crate::router::{Focus, KeySubscriber};
use crate::scheduler::DeferredQueue;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::snap::GridSnap;
use es_core::NodeIndex;
use es_core::geometry::{
    GeometryProvider, Point, Size, Vec2, in_resize_corner, strictly_contains,
};
use es_core::hit::deep_target_find;
use es_core::markup::MarkupError;
use es_core::model::{
    ElementRegistry, Marker, PositionMode, ReorderDirection, SceneGraph, SceneNode,
};
use std::time::Duration;

// ─── Engine state ────────────────────────────────────────────────────────

/// What is currently selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The canvas as a whole.
    Canvas,
    Node(NodeIndex),
}

impl Selection {
    pub fn node(self) -> Option<NodeIndex> {
        match self {
            Selection::Canvas => None,
            Selection::Node(idx) => Some(idx),
        }
    }
}

/// Notifications for dependent views (outline, inspectors).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    SelectionChanged(Selection),
    /// Redraw request. `while_tracking` is set mid-gesture so consumers can
    /// skip expensive work.
    Refresh { while_tracking: bool },
    /// Sibling reorder request for the external reorder collaborator.
    Reorder {
        target: NodeIndex,
        direction: ReorderDirection,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub target: NodeIndex,
    /// Rendered size at pointer-down.
    pub initial: Size,
    /// Style values before the gesture, restored on cancel.
    pub prior_width: Option<f64>,
    pub prior_height: Option<f64>,
    pub tracked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub target: NodeIndex,
    /// Committed drop target (resolved with the enter-container modifier held).
    pub drop_target: Option<NodeIndex>,
    /// Position style at pointer-down.
    pub origin: PositionSnapshot,
    pub started: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    Idle {
        /// A gesture ended since the last gesture start, track tick or click.
        just_finished: bool,
    },
    Resizing(ResizeSession),
    Dragging(DragSession),
}

impl Default for GestureState {
    fn default() -> Self {
        GestureState::Idle {
            just_finished: false,
        }
    }
}

// ─── Engine ──────────────────────────────────────────────────────────────

pub struct CanvasEngine<G, H> {
    /// The scene (single source of truth).
    pub graph: SceneGraph,
    geometry: G,
    history: H,
    registry: ElementRegistry,
    config: EngineConfig,
    grid: GridSnap,
    state: GestureState,
    selection: Option<Selection>,
    /// Post-resize re-selections.
    deferred: DeferredQueue<NodeIndex>,
}

impl<G: GeometryProvider, H: ActionHistory> CanvasEngine<G, H> {
    pub fn new(graph: SceneGraph, geometry: G, history: H) -> Self {
        let config = EngineConfig::default();
        Self {
            graph,
            geometry,
            history,
            registry: ElementRegistry::new(),
            grid: config.grid(),
            config,
            state: GestureState::default(),
            selection: None,
            deferred: DeferredQueue::new(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.grid = config.grid();
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_registry(mut self, registry: ElementRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_snap_to_grid(&mut self, enabled: bool) {
        self.config.snap_to_grid = enabled;
        self.grid.enabled = enabled;
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn just_finished(&self) -> bool {
        matches!(
            self.state,
            GestureState::Idle {
                just_finished: true
            }
        )
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    pub fn selected_node(&self) -> Option<NodeIndex> {
        self.selection.and_then(Selection::node)
    }

    /// Number of deferred re-selections waiting on the clock.
    pub fn pending_tasks(&self) -> usize {
        self.deferred.len()
    }

    // ─── Event entry points ──────────────────────────────────────────────

    /// Handle a pointer event, returning notifications for dependent views.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<EngineEvent> {
        match *event {
            InputEvent::PointerDown { x, y } => self.pointer_down(Point::new(x, y)),
            InputEvent::Track {
                phase,
                dx,
                dy,
                modifiers,
                ..
            } => self.track(phase, Vec2::new(dx, dy), modifiers),
            InputEvent::PointerUp { .. } => {
                self.release_untracked();
                vec![]
            }
            InputEvent::Click { x, y } => {
                self.release_untracked();
                let hit = deep_target_find(&self.geometry, &self.graph, Point::new(x, y), None);
                self.click(hit)
            }
            InputEvent::Cancel => self.cancel(),
        }
    }

    /// Synthetic click on a node: runs that node's own selection action.
    /// The root selects the canvas. Gesture state is left untouched.
    pub fn click_node(&mut self, idx: NodeIndex) -> Vec<EngineEvent> {
        if !self.graph.contains(idx) {
            return vec![];
        }
        if idx == self.graph.root {
            return self.update_selection(Selection::Canvas);
        }
        self.update_selection(Selection::Node(idx))
    }

    /// Advance the deferred-task clock and run whatever became due.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        for idx in self.deferred.advance(elapsed) {
            log::debug!("deferred reselect of {idx:?}");
            events.extend(self.click_node(idx));
        }
        events
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    fn pointer_down(&mut self, point: Point) -> Vec<EngineEvent> {
        if !matches!(self.state, GestureState::Idle { .. }) {
            log::debug!("pointer down during an open gesture, cancelling it");
            self.cancel();
        }
        self.state = GestureState::default();

        let hit = deep_target_find(&self.geometry, &self.graph, point, None);
        let Some(target) = hit.filter(|idx| *idx != self.graph.root) else {
            return vec![];
        };
        let Some(node) = self.graph.node(target) else {
            return vec![];
        };

        let rect = self.geometry.bounding_rect(&self.graph, target);
        if in_resize_corner(rect, point, self.config.resize_margin) {
            self.state = GestureState::Resizing(ResizeSession {
                target,
                initial: rect.size(),
                prior_width: node.style.width,
                prior_height: node.style.height,
                tracked: false,
            });
            self.mark(target, Marker::Resizing);
            self.mark(target, Marker::Active);
            log::debug!("resize armed on {target:?} at {}x{}", rect.width(), rect.height());
        } else {
            self.state = GestureState::Dragging(DragSession {
                target,
                drop_target: None,
                origin: PositionSnapshot::of(&node.style),
                started: false,
            });
        }
        vec![]
    }

    fn track(&mut self, phase: TrackPhase, delta: Vec2, modifiers: Modifiers) -> Vec<EngineEvent> {
        match self.state {
            GestureState::Idle { .. } => {
                self.state = GestureState::default();
                vec![]
            }
            GestureState::Resizing(session) => self.track_resize(session, phase, delta),
            GestureState::Dragging(session) => self.track_drag(session, phase, delta, modifiers),
        }
    }

    /// A press that never turned into a track gesture.
    fn release_untracked(&mut self) {
        match self.state {
            GestureState::Resizing(session) if !session.tracked => {
                self.unmark(session.target, Marker::Resizing);
                self.state = GestureState::default();
            }
            GestureState::Dragging(session) if !session.started => {
                self.state = GestureState::default();
            }
            _ => {}
        }
    }

    fn snapped(&self, delta: Vec2) -> Vec2 {
        Vec2::new(self.grid.snap(delta.x), self.grid.snap(delta.y))
    }

    // ─── Resizing ────────────────────────────────────────────────────────

    fn track_resize(
        &mut self,
        mut session: ResizeSession,
        phase: TrackPhase,
        delta: Vec2,
    ) -> Vec<EngineEvent> {
        session.tracked = true;
        match phase {
            TrackPhase::Start => {
                self.state = GestureState::Resizing(session);
                vec![]
            }
            TrackPhase::Track => {
                self.apply_resize(&session, delta);
                self.state = GestureState::Resizing(session);
                vec![]
            }
            TrackPhase::End => self.end_resize(session, delta),
        }
    }

    fn apply_resize(&mut self, session: &ResizeSession, delta: Vec2) -> Size {
        let d = self.snapped(delta);
        let size = Size::new(
            (session.initial.width + d.x).max(0.0),
            (session.initial.height + d.y).max(0.0),
        );
        if let Some(node) = self.graph.node_mut(session.target) {
            node.style.width = Some(size.width);
            node.style.height = Some(size.height);
        }
        size
    }

    fn end_resize(&mut self, session: ResizeSession, delta: Vec2) -> Vec<EngineEvent> {
        let target = session.target;
        let size = self.apply_resize(&session, delta);
        self.history.add(
            HistoryKind::Resize,
            target,
            Change {
                old: Snapshot::Size {
                    width: session.initial.width,
                    height: session.initial.height,
                },
                new: Snapshot::Size {
                    width: size.width,
                    height: size.height,
                },
            },
        );
        self.unmark(target, Marker::Resizing);
        self.unmark(target, Marker::Dragging);

        // The release often lands outside the resized node; re-select it
        // shortly after so the stray surface click does not win.
        self.deferred.schedule(
            Duration::from_millis(self.config.reselect_delay_ms),
            target,
        );
        self.state = GestureState::Idle {
            just_finished: true,
        };
        log::debug!(
            "resized {target:?} from {}x{} to {}x{}",
            session.initial.width,
            session.initial.height,
            size.width,
            size.height
        );
        self.update_selection(Selection::Node(target))
    }

    // ─── Dragging ────────────────────────────────────────────────────────

    fn track_drag(
        &mut self,
        mut session: DragSession,
        phase: TrackPhase,
        delta: Vec2,
        modifiers: Modifiers,
    ) -> Vec<EngineEvent> {
        let mut events = Vec::new();
        if !session.started {
            session.started = true;
            self.mark(session.target, Marker::Dragging);
            self.mark(session.target, Marker::Active);
            self.state = GestureState::Dragging(session);
            log::debug!("drag started on {:?}", session.target);
            events.extend(self.update_selection(Selection::Node(session.target)));
        }

        match phase {
            TrackPhase::Start => {}
            TrackPhase::Track => {
                self.set_translate(session.target, Some(self.snapped(delta)));
                session.drop_target = self.resolve_drop_target(session.target, modifiers.alt);
                self.state = GestureState::Dragging(session);
            }
            TrackPhase::End => {
                events.extend(self.end_drag(session, delta));
                return events;
            }
        }
        events.push(EngineEvent::Refresh {
            while_tracking: true,
        });
        events
    }

    /// Find the node the dragged node would be dropped into.
    ///
    /// Every eligible node under the root container whose rectangle strictly
    /// contains the dragged node's top-left corner matches; the last match in
    /// pre-order wins and gets the `Over` marker. The match becomes the
    /// committed drop target only when `commit` (the enter-container
    /// modifier) is held.
    fn resolve_drop_target(&mut self, dragged: NodeIndex, commit: bool) -> Option<NodeIndex> {
        self.graph.clear_marker_everywhere(Marker::Over);
        let corner = self.geometry.bounding_rect(&self.graph, dragged).origin();

        let mut found = None;
        for candidate in self.graph.descendants(self.graph.root) {
            if candidate == dragged || self.graph.is_ancestor_of(dragged, candidate) {
                continue;
            }
            if !self.graph.graph[candidate].caps.accepts_children {
                continue;
            }
            let rect = self.geometry.bounding_rect(&self.graph, candidate);
            if strictly_contains(rect, corner) {
                found = Some(candidate);
            }
        }

        if let Some(over) = found {
            self.mark(over, Marker::Over);
        }
        log::trace!("drop target under {corner:?}: {found:?} (commit: {commit})");
        found.filter(|_| commit)
    }

    fn end_drag(&mut self, session: DragSession, delta: Vec2) -> Vec<EngineEvent> {
        let target = session.target;
        let root = self.graph.root;
        self.set_translate(target, Some(self.snapped(delta)));
        let rect = self.geometry.bounding_rect(&self.graph, target);
        let old_parent = self.graph.parent(target);

        let new_parent = match session.drop_target.filter(|t| self.graph.contains(*t)) {
            Some(drop) => Some(drop),
            None if old_parent != Some(root) => Some(root),
            None => None,
        };

        self.set_translate(target, None);
        let reparented = match (new_parent, old_parent) {
            (Some(parent), Some(old_parent)) => {
                self.reparent(target, old_parent, parent, session.origin)
            }
            _ => false,
        };
        if !reparented && let Some(parent) = old_parent {
            let parent_rect = self.geometry.bounding_rect(&self.graph, parent);
            self.reposition(
                target,
                Vec2::new(rect.x0 - parent_rect.x0, rect.y0 - parent_rect.y0),
                session.origin,
            );
        }

        self.unmark(target, Marker::Dragging);
        self.unmark(target, Marker::Resizing);
        self.graph.clear_marker_everywhere(Marker::Over);
        self.state = GestureState::Idle {
            just_finished: true,
        };

        let mut events = self.update_selection(Selection::Node(target));
        events.push(EngineEvent::Refresh {
            while_tracking: true,
        });
        events
    }

    /// Move `target` under `parent` with a fresh relative frame.
    fn reparent(
        &mut self,
        target: NodeIndex,
        old_parent: NodeIndex,
        parent: NodeIndex,
        old: PositionSnapshot,
    ) -> bool {
        // Residual text would keep the container from visually hosting children.
        if !self.graph.has_children(parent) {
            self.graph.clear_text(parent);
        }
        if !self.graph.append_child(parent, target) {
            log::debug!("cannot reparent {target:?} into {parent:?}");
            return false;
        }

        let new = PositionSnapshot {
            left: Some(0.0),
            top: Some(0.0),
            position: PositionMode::Relative,
        };
        if let Some(node) = self.graph.node_mut(target) {
            new.apply(&mut node.style);
        }
        self.history.add(
            HistoryKind::Reparent,
            target,
            Change {
                old: Snapshot::Parent {
                    parent: old_parent,
                    position: old,
                },
                new: Snapshot::Parent {
                    parent,
                    position: new,
                },
            },
        );
        log::debug!("reparented {target:?} from {old_parent:?} into {parent:?}");
        true
    }

    /// Pin `target` at `offset` from its parent's origin.
    fn reposition(&mut self, target: NodeIndex, offset: Vec2, old: PositionSnapshot) {
        let new = PositionSnapshot {
            left: Some(offset.x),
            top: Some(offset.y),
            position: PositionMode::Absolute,
        };
        if let Some(node) = self.graph.node_mut(target) {
            new.apply(&mut node.style);
        }
        self.history.add(
            HistoryKind::Move,
            target,
            Change {
                old: Snapshot::Position(old),
                new: Snapshot::Position(new),
            },
        );
        log::debug!("moved {target:?} to ({}, {})", offset.x, offset.y);
    }

    // ─── Cancel ──────────────────────────────────────────────────────────

    /// Abort an open gesture, restoring pre-gesture style and markers.
    /// Writes no history.
    fn cancel(&mut self) -> Vec<EngineEvent> {
        match self.state {
            GestureState::Idle { .. } => return vec![],
            GestureState::Resizing(session) => {
                if let Some(node) = self.graph.node_mut(session.target) {
                    node.style.width = session.prior_width;
                    node.style.height = session.prior_height;
                }
                self.unmark(session.target, Marker::Resizing);
                log::debug!("resize of {:?} cancelled", session.target);
            }
            GestureState::Dragging(session) => {
                self.set_translate(session.target, None);
                if let Some(node) = self.graph.node_mut(session.target) {
                    session.origin.apply(&mut node.style);
                }
                self.unmark(session.target, Marker::Dragging);
                self.graph.clear_marker_everywhere(Marker::Over);
                log::debug!("drag of {:?} cancelled", session.target);
            }
        }
        self.sync_active_marker();
        self.state = GestureState::Idle {
            just_finished: true,
        };
        vec![EngineEvent::Refresh {
            while_tracking: false,
        }]
    }

    // ─── Selection ───────────────────────────────────────────────────────

    fn click(&mut self, hit: Option<NodeIndex>) -> Vec<EngineEvent> {
        let just_finished = match &mut self.state {
            GestureState::Idle { just_finished } => std::mem::take(just_finished),
            _ => false,
        };

        match hit.filter(|idx| *idx != self.graph.root) {
            Some(node) => self.update_selection(Selection::Node(node)),
            None if just_finished => {
                log::debug!("ignoring surface click right after a gesture");
                vec![]
            }
            None => self.update_selection(Selection::Canvas),
        }
    }

    fn update_selection(&mut self, selection: Selection) -> Vec<EngineEvent> {
        self.selection = Some(selection);
        self.sync_active_marker();
        log::debug!("selection → {selection:?}");
        vec![
            EngineEvent::SelectionChanged(selection),
            EngineEvent::Refresh {
                while_tracking: false,
            },
        ]
    }

    /// The `Active` marker sits on the selected node only.
    fn sync_active_marker(&mut self) {
        self.graph.clear_marker_everywhere(Marker::Active);
        if let Some(idx) = self.selected_node() {
            self.mark(idx, Marker::Active);
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    fn nudge(&mut self, target: NodeIndex, dx: f64, dy: f64) -> Vec<EngineEvent> {
        let Some(node) = self.graph.node_mut(target) else {
            return vec![];
        };
        let old = PositionSnapshot::of(&node.style);
        if dx != 0.0 {
            node.style.left = Some(node.style.left_or_zero() + dx);
        }
        if dy != 0.0 {
            node.style.top = Some(node.style.top_or_zero() + dy);
        }
        let new = PositionSnapshot::of(&node.style);
        self.history.add(
            HistoryKind::Move,
            target,
            Change {
                old: Snapshot::Position(old),
                new: Snapshot::Position(new),
            },
        );
        log::debug!("nudged {target:?} by ({dx}, {dy})");
        vec![EngineEvent::Refresh {
            while_tracking: false,
        }]
    }

    // ─── Node-set helpers ────────────────────────────────────────────────

    /// Append a node to the root container.
    pub fn append_child(&mut self, node: SceneNode) -> NodeIndex {
        let root = self.graph.root;
        self.graph.add_node(root, node)
    }

    /// Remove a node and its subtree, dropping any state that refers to it.
    pub fn remove_child(&mut self, idx: NodeIndex) -> Option<SceneNode> {
        if idx == self.graph.root || !self.graph.contains(idx) {
            return None;
        }
        let gone = |graph: &SceneGraph, n: NodeIndex| n == idx || graph.is_ancestor_of(idx, n);

        if self.selected_node().is_some_and(|n| gone(&self.graph, n)) {
            self.selection = None;
        }
        let target = match self.state {
            GestureState::Resizing(s) => Some(s.target),
            GestureState::Dragging(s) => Some(s.target),
            GestureState::Idle { .. } => None,
        };
        if target.is_some_and(|n| gone(&self.graph, n)) {
            self.graph.clear_marker_everywhere(Marker::Over);
            self.state = GestureState::default();
        }
        let graph = &self.graph;
        self.deferred.retain(|n| !gone(graph, *n));

        self.graph.remove_node(idx)
    }

    pub fn query(&self, selector: &str) -> Option<NodeIndex> {
        self.graph.query(selector)
    }

    /// Serialized content of the root container.
    pub fn inner_markup(&self) -> String {
        self.graph.inner_markup(self.graph.root)
    }

    /// Replace the root container's content. Clears selection and any
    /// open gesture, since every previous handle is gone.
    pub fn set_inner_markup(&mut self, markup: &str) -> Result<(), MarkupError> {
        let root = self.graph.root;
        self.graph.set_inner_markup(root, markup, &self.registry)?;
        self.selection = None;
        self.state = GestureState::default();
        self.deferred.retain(|_| false);
        Ok(())
    }

    // ─── Helpers ─────────────────────────────────────────────────────────

    fn mark(&mut self, idx: NodeIndex, marker: Marker) {
        if let Some(node) = self.graph.node_mut(idx) {
            node.markers.insert(marker);
        }
    }

    fn unmark(&mut self, idx: NodeIndex, marker: Marker) {
        if let Some(node) = self.graph.node_mut(idx) {
            node.markers.remove(marker);
        }
    }

    fn set_translate(&mut self, idx: NodeIndex, translate: Option<Vec2>) {
        if let Some(node) = self.graph.node_mut(idx) {
            node.style.translate = translate;
        }
    }
}

impl<G: GeometryProvider, H: ActionHistory> KeySubscriber for CanvasEngine<G, H> {
    type Output = Vec<EngineEvent>;

    /// Keys count only when a node is meaningfully selected: focus on an
    /// outline row, on the document body, or on the active element itself.
    fn accepts_focus(&self, focus: Focus) -> bool {
        match focus {
            Focus::OutlineRow | Focus::Body => true,
            Focus::Element(idx) => self
                .graph
                .node(idx)
                .is_some_and(|n| n.markers.contains(Marker::Active)),
            Focus::Other => false,
        }
    }

    fn on_key(&mut self, key: &KeyPress) -> Vec<EngineEvent> {
        let Some(target) = self.selected_node() else {
            return vec![];
        };
        let Some(action) = ShortcutMap::resolve(&key.key, key.modifiers.shift) else {
            return vec![];
        };
        match action {
            ShortcutAction::Nudge { dx, dy } => {
                let step = self.config.nudge_step;
                self.nudge(target, dx * step, dy * step)
            }
            ShortcutAction::Reorder(direction) => {
                log::debug!("reorder request {direction:?} for {target:?}");
                vec![EngineEvent::Reorder { target, direction }]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::ActionLog;
    use es_core::layout::LayoutGeometry;
    use es_core::model::NodeStyle;

    fn engine_with_box() -> (CanvasEngine<LayoutGeometry, ActionLog>, NodeIndex) {
        let mut graph = SceneGraph::new();
        let b = graph.add_node(
            graph.root,
            SceneNode::new("div").with_style(NodeStyle {
                position: PositionMode::Absolute,
                left: Some(100.0),
                top: Some(100.0),
                width: Some(100.0),
                height: Some(50.0),
                ..Default::default()
            }),
        );
        let engine = CanvasEngine::new(graph, LayoutGeometry::default(), ActionLog::default());
        (engine, b)
    }

    #[test]
    fn press_in_corner_arms_resize() {
        let (mut engine, b) = engine_with_box();
        engine.handle(&InputEvent::PointerDown { x: 193.0, y: 143.0 });
        assert!(matches!(engine.state(), GestureState::Resizing(s) if s.target == b));
        assert!(engine.graph.graph[b].markers.contains(Marker::Resizing));
        assert!(engine.graph.graph[b].markers.contains(Marker::Active));
    }

    #[test]
    fn press_outside_corner_arms_drag() {
        let (mut engine, b) = engine_with_box();
        engine.handle(&InputEvent::PointerDown { x: 192.0, y: 143.0 });
        assert!(matches!(engine.state(), GestureState::Dragging(s) if s.target == b && !s.started));
    }

    #[test]
    fn press_on_surface_or_root_is_a_no_op() {
        let (mut engine, _) = engine_with_box();
        assert!(engine.handle(&InputEvent::PointerDown { x: 10.0, y: 10.0 }).is_empty());
        assert_eq!(engine.state(), &GestureState::default());
        engine.handle(&InputEvent::PointerDown { x: 900.0, y: 10.0 });
        assert_eq!(engine.state(), &GestureState::default());
    }

    #[test]
    fn untracked_release_disarms_resize() {
        let (mut engine, b) = engine_with_box();
        engine.handle(&InputEvent::PointerDown { x: 195.0, y: 145.0 });
        engine.handle(&InputEvent::PointerUp { x: 195.0, y: 145.0 });
        assert_eq!(engine.state(), &GestureState::default());
        assert!(!engine.graph.graph[b].markers.contains(Marker::Resizing));
        assert!(engine.history().is_empty());
    }

    #[test]
    fn key_focus_filter() {
        let (mut engine, b) = engine_with_box();
        engine.click_node(b);
        assert!(engine.accepts_focus(Focus::Body));
        assert!(engine.accepts_focus(Focus::OutlineRow));
        assert!(engine.accepts_focus(Focus::Element(b)));
        assert!(!engine.accepts_focus(Focus::Element(engine.graph.root)));
        assert!(!engine.accepts_focus(Focus::Other));
    }

    #[test]
    fn remove_child_clears_selection() {
        let (mut engine, b) = engine_with_box();
        engine.click_node(b);
        assert!(engine.remove_child(b).is_some());
        assert_eq!(engine.selection(), None);
        assert!(engine.remove_child(engine.graph.root).is_none());
    }
}
