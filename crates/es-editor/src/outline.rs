//! Outline view: tree reconciliation and selection sync.
//!
//! Every rebuild flattens the scene in pre-order and renders the same walk
//! as a nested list, so row `k` and `items[k]` always describe the same
//! node. Indices are only valid for the pass that produced them; matching
//! a selection back to a row goes through node handles.

use crate::engine::{CanvasEngine, EngineEvent, Selection};
use crate::history::ActionHistory;
use es_core::NodeIndex;
use es_core::geometry::GeometryProvider;
use es_core::model::SceneGraph;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Label shown for the canvas root container.
pub const ROOT_LABEL: &str = "main-app";

/// One pre-order-indexed projection of a scene node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub tag: String,
    /// `#id`, or empty.
    pub id: String,
    /// Own text in quotes; empty for the root container.
    pub text: String,
    pub node: NodeIndex,
    pub index: usize,
}

/// A rendered row button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub tag: String,
    pub id: String,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    pub row: OutlineRow,
    /// Created only when the node has at least one listed child.
    pub children: Option<OutlineList>,
}

/// One nesting level of the outline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineList {
    pub items: Vec<OutlineItem>,
}

impl OutlineList {
    /// Rendered rows, at every depth.
    pub fn row_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| 1 + item.children.as_ref().map_or(0, OutlineList::row_count))
            .sum()
    }
}

/// Flatten the subtree under `parent` without rendering it.
pub fn flatten_tree(graph: &SceneGraph, parent: NodeIndex) -> Vec<FlatEntry> {
    let mut list = OutlineList::default();
    let mut items = Vec::new();
    if graph.contains(parent) {
        build(graph, parent, &mut list, &mut items);
    }
    items
}

fn entry_for(graph: &SceneGraph, idx: NodeIndex, index: usize) -> FlatEntry {
    let node = &graph.graph[idx];
    if idx == graph.root {
        return FlatEntry {
            tag: ROOT_LABEL.to_string(),
            id: String::new(),
            text: String::new(),
            node: idx,
            index,
        };
    }
    FlatEntry {
        tag: node.tag.to_string(),
        id: node.id.map(|id| id.to_string()).unwrap_or_default(),
        text: format!("\"{}\"", node.text),
        node: idx,
        index,
    }
}

/// Pre-order: the node takes the next index before its children are visited.
fn build(graph: &SceneGraph, idx: NodeIndex, list: &mut OutlineList, items: &mut Vec<FlatEntry>) {
    let entry = entry_for(graph, idx, items.len());
    list.items.push(OutlineItem {
        row: OutlineRow {
            tag: entry.tag.clone(),
            id: entry.id.clone(),
            index: entry.index,
        },
        children: None,
    });
    items.push(entry);
    let pos = list.items.len() - 1;

    for &child in graph.children(idx) {
        // style blocks are neither listed nor traversed
        if graph.graph[child].caps.is_style_marker {
            continue;
        }
        let nested = list.items[pos]
            .children
            .get_or_insert_with(OutlineList::default);
        build(graph, child, nested, items);
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutlineView {
    list: OutlineList,
    items: Vec<FlatEntry>,
    selected_row: Option<usize>,
    /// Root container of the last rebuilt graph; it stands for the canvas.
    canvas: Option<NodeIndex>,
}

impl OutlineView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[FlatEntry] {
        &self.items
    }

    pub fn list(&self) -> &OutlineList {
        &self.list
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected_row
    }

    /// Node behind the highlighted row.
    pub fn selected_node(&self) -> Option<NodeIndex> {
        self.selected_row
            .and_then(|row| self.items.get(row))
            .map(|entry| entry.node)
    }

    /// Full rebuild from `parent`, then highlight `active`.
    pub fn recompute_tree(
        &mut self,
        graph: &SceneGraph,
        parent: NodeIndex,
        active: Option<Selection>,
    ) -> &[FlatEntry] {
        self.list = OutlineList::default();
        self.items.clear();
        self.selected_row = None;
        self.canvas = Some(graph.root);
        if graph.contains(parent) {
            build(graph, parent, &mut self.list, &mut self.items);
        }
        log::debug!("outline rebuilt with {} rows", self.items.len());
        self.highlight(active);
        &self.items
    }

    /// Adopt a flattening computed elsewhere. Rows are not re-rendered
    /// until the next `recompute_tree`.
    pub fn set_items(&mut self, items: Vec<FlatEntry>) {
        self.items = items;
    }

    /// Row click: highlight it and route the selection through the engine.
    pub fn click_row<G: GeometryProvider, H: ActionHistory>(
        &mut self,
        index: usize,
        engine: &mut CanvasEngine<G, H>,
    ) -> Vec<EngineEvent> {
        let Some(node) = self.items.get(index).map(|entry| entry.node) else {
            return vec![];
        };
        self.selected_row = Some(index);
        engine.click_node(node)
    }

    /// Mark the row of the selected node, clearing the previous highlight.
    /// A canvas selection marks the root container's row.
    ///
    /// Skipped (returns false) when the rendered rows and the flattened
    /// items disagree in length: a rebuild is pending and the rows may not
    /// line up with the items.
    pub fn highlight(&mut self, selection: Option<Selection>) -> bool {
        let rows = self.list.row_count();
        if rows != self.items.len() {
            log::debug!(
                "outline highlight skipped: {rows} rows for {} items",
                self.items.len()
            );
            return false;
        }
        let node = selection.and_then(|selection| match selection {
            Selection::Node(idx) => Some(idx),
            Selection::Canvas => self.canvas,
        });
        self.selected_row = node.and_then(|n| self.items.iter().position(|e| e.node == n));
        true
    }

    /// Follow selection changes reported by the engine.
    pub fn on_events(&mut self, events: &[EngineEvent]) {
        for event in events {
            if let EngineEvent::SelectionChanged(selection) = event {
                self.highlight(Some(*selection));
            }
        }
    }

    /// Indented text rendering; the highlighted row is marked with `>`.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        self.render_list(&mut out, &self.list, 0);
        out
    }

    fn render_list(&self, out: &mut String, list: &OutlineList, depth: usize) {
        for item in &list.items {
            let marker = if self.selected_row == Some(item.row.index) {
                '>'
            } else {
                ' '
            };
            let _ = write!(out, "{marker} {:indent$}{}", "", item.row.tag, indent = depth * 2);
            if !item.row.id.is_empty() {
                let _ = write!(out, " {}", item.row.id);
            }
            out.push('\n');
            if let Some(children) = &item.children {
                self.render_list(out, children, depth + 1);
            }
        }
    }
}
