//! Core scene-graph data model for the canvas editor.
//!
//! The scene is a tree of elements held in a `StableDiGraph` arena: nodes
//! are visual elements, edges go parent → child. Child order is kept
//! explicitly per parent because it is both paint order and outline order.
//! `NodeIndex` handles are the node identity; they stay valid across
//! unrelated insertions and removals.

use crate::id::{ElementId, Tag};
use kurbo::Vec2;
use petgraph::Direction;
use petgraph::graph::NodeIndex;
use petgraph::stable_graph::StableDiGraph;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// The one native element in the palette that cannot host children.
pub const LEAF_EXCEPTION_TAG: &str = "input";
/// Template repeater; hosts stamped children even though it is custom.
pub const REPEAT_CONTAINER_TAG: &str = "dom-repeat";
/// Style blocks carry no structural meaning.
pub const STYLE_MARKER_TAG: &str = "style";

// ─── Style record ────────────────────────────────────────────────────────

/// CSS-like positioning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionMode {
    #[default]
    Static,
    Relative,
    Absolute,
}

impl PositionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            PositionMode::Static => "static",
            PositionMode::Relative => "relative",
            PositionMode::Absolute => "absolute",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "static" => Some(PositionMode::Static),
            "relative" => Some(PositionMode::Relative),
            "absolute" => Some(PositionMode::Absolute),
            _ => None,
        }
    }

    /// Whether the node takes part in normal flow.
    pub fn in_flow(self) -> bool {
        !matches!(self, PositionMode::Absolute)
    }
}

/// The style attributes the canvas engine reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeStyle {
    pub position: PositionMode,
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    /// Transient drag offset. Never serialized into markup.
    #[serde(skip)]
    pub translate: Option<Vec2>,
}

impl NodeStyle {
    /// Left offset, unset reads as 0.
    pub fn left_or_zero(&self) -> f64 {
        self.left.unwrap_or(0.0)
    }

    /// Top offset, unset reads as 0.
    pub fn top_or_zero(&self) -> f64 {
        self.top.unwrap_or(0.0)
    }
}

// ─── Visual markers ──────────────────────────────────────────────────────

/// Class-based highlight markers toggled by the canvas engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// Currently selected.
    Active,
    /// Being dragged.
    Dragging,
    /// Being resized.
    Resizing,
    /// Hovered as a potential drop target.
    Over,
}

/// A small set of markers. Insertion order is kept so class lists
/// render deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Markers(SmallVec<[Marker; 4]>);

impl Markers {
    pub fn insert(&mut self, marker: Marker) {
        if !self.contains(marker) {
            self.0.push(marker);
        }
    }

    /// Returns true if the marker was present.
    pub fn remove(&mut self, marker: Marker) -> bool {
        match self.0.iter().position(|m| *m == marker) {
            Some(pos) => {
                self.0.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, marker: Marker) -> bool {
        self.0.contains(&marker)
    }

    pub fn iter(&self) -> impl Iterator<Item = Marker> + '_ {
        self.0.iter().copied()
    }
}

// ─── Capabilities ────────────────────────────────────────────────────────

/// Capability descriptor, resolved once when the node is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeCaps {
    /// Can be a drop target / host children.
    pub accepts_children: bool,
    /// The native leaf that never hosts children.
    pub is_leaf_exception: bool,
    /// Template repeater container.
    pub is_repeat_container: bool,
    /// Style block: skipped by the outline, no geometry.
    pub is_style_marker: bool,
    /// Number of content-projection points the element definition exposes.
    pub slots: u8,
}

impl NodeCaps {
    pub fn resolve(tag: Tag, slots: u8) -> Self {
        let name = tag.as_str();
        let is_leaf_exception = name == LEAF_EXCEPTION_TAG;
        let is_repeat_container = name == REPEAT_CONTAINER_TAG;
        let is_style_marker = name == STYLE_MARKER_TAG;
        let native_container = !tag.is_custom() && !is_leaf_exception;
        Self {
            accepts_children: native_container || is_repeat_container || slots > 0,
            is_leaf_exception,
            is_repeat_container,
            is_style_marker,
            slots,
        }
    }
}

/// Definition of a custom element, as registered with the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDef {
    pub slots: u8,
}

/// Known custom element definitions, consulted at node construction.
#[derive(Debug, Clone, Default)]
pub struct ElementRegistry {
    defs: HashMap<Tag, ElementDef>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define(&mut self, tag: &str, def: ElementDef) {
        self.defs.insert(Tag::intern(tag), def);
    }

    pub fn get(&self, tag: Tag) -> Option<&ElementDef> {
        self.defs.get(&tag)
    }

    /// Build a node for `tag`, resolving its capabilities from the definition.
    pub fn create(&self, tag: &str) -> SceneNode {
        let tag = Tag::intern(tag);
        let slots = self.get(tag).map_or(0, |d| d.slots);
        SceneNode::with_caps(tag, NodeCaps::resolve(tag, slots))
    }
}

// ─── Scene Nodes ─────────────────────────────────────────────────────────

/// A single element in the scene.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    pub tag: Tag,
    pub id: Option<ElementId>,
    /// The node's own text content.
    pub text: String,
    /// Markup attributes other than `id` and `style`, preserved verbatim.
    pub attributes: SmallVec<[(String, String); 2]>,
    pub style: NodeStyle,
    pub markers: Markers,
    pub caps: NodeCaps,
}

impl SceneNode {
    /// A node with no custom definition (zero slots).
    pub fn new(tag: &str) -> Self {
        let tag = Tag::intern(tag);
        Self::with_caps(tag, NodeCaps::resolve(tag, 0))
    }

    fn with_caps(tag: Tag, caps: NodeCaps) -> Self {
        Self {
            tag,
            id: None,
            text: String::new(),
            attributes: SmallVec::new(),
            style: NodeStyle::default(),
            markers: Markers::default(),
            caps,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(ElementId::intern(id));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: NodeStyle) -> Self {
        self.style = style;
        self
    }

    /// Declare content-projection points. Re-resolves capabilities.
    #[must_use]
    pub fn with_slots(mut self, slots: u8) -> Self {
        self.caps = NodeCaps::resolve(self.tag, slots);
        self
    }
}

/// Semantic sibling-reorder request (Shift + arrow key).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    Up,
    Down,
    Back,
    Forward,
}

// ─── Scene Graph ─────────────────────────────────────────────────────────

/// The editable element tree.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    /// The underlying arena. Edges go parent → child.
    pub graph: StableDiGraph<SceneNode, ()>,

    /// The canvas root container.
    pub root: NodeIndex,

    /// Explicit child order per parent.
    child_order: HashMap<NodeIndex, Vec<NodeIndex>>,
}

impl SceneGraph {
    /// Create a scene holding only the root container.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root(SceneNode::new("div").with_id("viewContainer"))
    }

    #[must_use]
    pub fn with_root(root_node: SceneNode) -> Self {
        let mut graph = StableDiGraph::new();
        let root = graph.add_node(root_node);
        Self {
            graph,
            root,
            child_order: HashMap::new(),
        }
    }

    /// Append a node as the last child of `parent`. Returns the new handle.
    pub fn add_node(&mut self, parent: NodeIndex, node: SceneNode) -> NodeIndex {
        let idx = self.graph.add_node(node);
        self.graph.add_edge(parent, idx, ());
        self.child_order.entry(parent).or_default().push(idx);
        idx
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove_node(&mut self, idx: NodeIndex) -> Option<SceneNode> {
        if idx == self.root || !self.contains(idx) {
            return None;
        }
        self.detach(idx);
        for descendant in self.descendants(idx) {
            self.child_order.remove(&descendant);
            self.graph.remove_node(descendant);
        }
        self.child_order.remove(&idx);
        self.graph.remove_node(idx)
    }

    pub fn contains(&self, idx: NodeIndex) -> bool {
        self.graph.contains_node(idx)
    }

    pub fn node(&self, idx: NodeIndex) -> Option<&SceneNode> {
        self.graph.node_weight(idx)
    }

    pub fn node_mut(&mut self, idx: NodeIndex) -> Option<&mut SceneNode> {
        self.graph.node_weight_mut(idx)
    }

    /// Get the parent of a node. `None` for the root or a detached node.
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).next()
    }

    /// Children of a node in paint/outline order.
    pub fn children(&self, idx: NodeIndex) -> &[NodeIndex] {
        self.child_order.get(&idx).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, idx: NodeIndex) -> bool {
        !self.children(idx).is_empty()
    }

    /// Unlink a node from its parent. The node stays in the arena.
    pub fn detach(&mut self, idx: NodeIndex) {
        let Some(parent) = self.parent(idx) else {
            return;
        };
        if let Some(edge) = self.graph.find_edge(parent, idx) {
            self.graph.remove_edge(edge);
        }
        if let Some(order) = self.child_order.get_mut(&parent) {
            order.retain(|c| *c != idx);
        }
    }

    /// Move `child` to be the last child of `parent`.
    ///
    /// Refuses to move the root or to create a cycle. Returns true on success.
    pub fn append_child(&mut self, parent: NodeIndex, child: NodeIndex) -> bool {
        if child == self.root
            || child == parent
            || !self.contains(parent)
            || !self.contains(child)
            || self.is_ancestor_of(child, parent)
        {
            return false;
        }
        self.detach(child);
        self.graph.add_edge(parent, child, ());
        self.child_order.entry(parent).or_default().push(child);
        true
    }

    /// Drop a node's own text content.
    pub fn clear_text(&mut self, idx: NodeIndex) {
        if let Some(node) = self.node_mut(idx) {
            node.text.clear();
        }
    }

    /// All descendants of `idx` in pre-order (parent before children), excluding `idx`.
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeIndex> = self.children(idx).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeIndex, descendant: NodeIndex) -> bool {
        let mut current = descendant;
        while let Some(parent) = self.parent(current) {
            if parent == ancestor {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Find the first node under the root matching a simple selector:
    /// `tag`, `#id`, or `tag#id`.
    pub fn query(&self, selector: &str) -> Option<NodeIndex> {
        let (tag, id) = match selector.split_once('#') {
            Some((tag, id)) => (tag, Some(id)),
            None => (selector, None),
        };
        let tag = match tag {
            "" => None,
            // a tag that was never interned matches no node
            name => Some(Tag::lookup(name)?),
        };
        self.descendants(self.root).into_iter().find(|idx| {
            let node = &self.graph[*idx];
            tag.is_none_or(|t| node.tag == t)
                && id.is_none_or(|id| node.id.is_some_and(|nid| nid.as_str() == id))
        })
    }

    /// Remove a marker from every node in the scene.
    pub fn clear_marker_everywhere(&mut self, marker: Marker) {
        for idx in self.graph.node_indices().collect::<Vec<_>>() {
            self.graph[idx].markers.remove(marker);
        }
    }

    // ─── Sibling reordering ──────────────────────────────────────────────

    /// Apply a reorder request to `child`. Returns true if the order changed.
    pub fn reorder(&mut self, child: NodeIndex, direction: ReorderDirection) -> bool {
        match direction {
            ReorderDirection::Up => self.send_backward(child),
            ReorderDirection::Down => self.bring_forward(child),
            ReorderDirection::Back => self.send_to_back(child),
            ReorderDirection::Forward => self.bring_to_front(child),
        }
    }

    /// Swap with the previous sibling.
    pub fn send_backward(&mut self, child: NodeIndex) -> bool {
        self.move_within_parent(child, |pos, _| pos.checked_sub(1))
    }

    /// Swap with the next sibling.
    pub fn bring_forward(&mut self, child: NodeIndex) -> bool {
        self.move_within_parent(child, |pos, len| (pos + 1 < len).then_some(pos + 1))
    }

    /// Become the first child.
    pub fn send_to_back(&mut self, child: NodeIndex) -> bool {
        self.move_within_parent(child, |pos, _| (pos > 0).then_some(0))
    }

    /// Become the last child.
    pub fn bring_to_front(&mut self, child: NodeIndex) -> bool {
        self.move_within_parent(child, |pos, len| (pos + 1 < len).then_some(len - 1))
    }

    fn move_within_parent(
        &mut self,
        child: NodeIndex,
        target: impl FnOnce(usize, usize) -> Option<usize>,
    ) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let Some(order) = self.child_order.get_mut(&parent) else {
            return false;
        };
        let Some(pos) = order.iter().position(|c| *c == child) else {
            return false;
        };
        let Some(to) = target(pos, order.len()) else {
            return false;
        };
        let moved = order.remove(pos);
        order.insert(to, moved);
        true
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
