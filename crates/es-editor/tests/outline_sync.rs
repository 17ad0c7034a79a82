//! Integration tests: outline view ↔ canvas engine selection sync.

use es_core::layout::{LayoutGeometry, Viewport};
use es_core::model::{ElementDef, ElementRegistry, ReorderDirection, SceneGraph};
use es_editor::engine::{CanvasEngine, EngineEvent, Selection};
use es_editor::history::ActionLog;
use es_editor::input::{InputEvent, KeyPress, Modifiers, TrackPhase};
use es_editor::outline::{OutlineView, flatten_tree};
use es_editor::router::{Focus, KeyRouter};
use pretty_assertions::assert_eq;

type Engine = CanvasEngine<LayoutGeometry, ActionLog>;

const VIEWPORT: Viewport = Viewport {
    width: 800.0,
    height: 600.0,
};

fn load_app_shell() -> Engine {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut registry = ElementRegistry::new();
    registry.define("paper-card", ElementDef { slots: 1 });
    let mut engine = CanvasEngine::new(
        SceneGraph::new(),
        LayoutGeometry::new(VIEWPORT),
        ActionLog::default(),
    )
    .with_registry(registry);
    engine
        .set_inner_markup(include_str!("fixtures/app_shell.html"))
        .unwrap();
    engine
}

fn rebuild(outline: &mut OutlineView, engine: &Engine) {
    outline.recompute_tree(&engine.graph, engine.graph.root, engine.selection());
}

fn labels(outline: &OutlineView) -> Vec<String> {
    outline
        .items()
        .iter()
        .map(|e| format!("{}{}", e.tag, e.id))
        .collect()
}

// ─── Reconciliation ─────────────────────────────────────────────────────

#[test]
fn rows_and_items_share_pre_order_indices() {
    let engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);

    assert_eq!(
        labels(&outline),
        vec![
            "main-app",
            "div#header",
            "paper-card#card",
            "paper-button#ok",
            "div#panel",
            "input#name",
        ]
    );
    for (k, entry) in outline.items().iter().enumerate() {
        assert_eq!(entry.index, k);
    }
    assert_eq!(outline.items()[1].text, "\"Title\"");
    assert_eq!(outline.list().row_count(), outline.items().len());
    assert_eq!(outline.items(), flatten_tree(&engine.graph, engine.graph.root));
}

#[test]
fn subtree_rebuild_starts_at_the_given_parent() {
    let engine = load_app_shell();
    let card = engine.query("#card").unwrap();
    let mut outline = OutlineView::new();
    outline.recompute_tree(&engine.graph, card, None);
    assert_eq!(labels(&outline), vec!["paper-card#card", "paper-button#ok"]);
}

// ─── Outline → canvas ───────────────────────────────────────────────────

#[test]
fn row_click_selects_node_on_canvas() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);

    let ok = engine.query("#ok").unwrap();
    let events = outline.click_row(3, &mut engine);
    assert_eq!(events[0], EngineEvent::SelectionChanged(Selection::Node(ok)));
    assert_eq!(engine.selected_node(), Some(ok));
    assert_eq!(outline.selected_row(), Some(3));

    outline.on_events(&events);
    assert_eq!(outline.selected_node(), Some(ok));

    assert!(outline.click_row(42, &mut engine).is_empty());
    assert_eq!(outline.selected_row(), Some(3));
}

#[test]
fn outline_row_focus_routes_keys_to_selection() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);
    let panel = engine.query("#panel").unwrap();
    outline.click_row(4, &mut engine);

    let mut router = KeyRouter::new();
    router.set_focus(Focus::OutlineRow);
    router.dispatch(&KeyPress::new("ArrowRight"), &mut engine);
    assert_eq!(engine.graph.graph[panel].style.left, Some(460.0));
}

// ─── Canvas → outline ───────────────────────────────────────────────────

#[test]
fn canvas_selection_moves_the_highlight() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);

    let events = engine.handle(&InputEvent::Click { x: 500.0, y: 200.0 });
    outline.on_events(&events);
    assert_eq!(outline.selected_row(), Some(4));

    let events = engine.handle(&InputEvent::Click { x: 700.0, y: 500.0 });
    assert_eq!(events[0], EngineEvent::SelectionChanged(Selection::Canvas));
    outline.on_events(&events);
    assert_eq!(outline.selected_row(), Some(0));
    assert_eq!(outline.selected_node(), Some(engine.graph.root));
}

#[test]
fn root_row_click_after_a_drag_selects_the_canvas() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);
    let panel = engine.query("#panel").unwrap();

    engine.handle(&InputEvent::PointerDown { x: 500.0, y: 200.0 });
    engine.handle(&InputEvent::track(TrackPhase::Start, 0.0, 0.0, 0.0, 0.0));
    engine.handle(&InputEvent::track(TrackPhase::Track, 0.0, 0.0, 20.0, 0.0));
    engine.handle(&InputEvent::track(TrackPhase::End, 0.0, 0.0, 20.0, 0.0));
    assert_eq!(engine.selected_node(), Some(panel));
    assert!(engine.just_finished());

    let events = outline.click_row(0, &mut engine);
    assert_eq!(events[0], EngineEvent::SelectionChanged(Selection::Canvas));
    assert_eq!(engine.selection(), Some(Selection::Canvas));
    outline.on_events(&events);
    assert_eq!(outline.selected_row(), Some(0));
    // the row click is not the stray click that follows a gesture
    assert!(engine.just_finished());
}

#[test]
fn stale_items_skip_the_highlight() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    rebuild(&mut outline, &engine);
    outline.click_row(1, &mut engine);

    // a newer flattening has arrived but the rows have not been re-rendered
    let panel = engine.query("#panel").unwrap();
    engine.remove_child(engine.query("#name").unwrap());
    outline.set_items(flatten_tree(&engine.graph, engine.graph.root));
    assert!(!outline.highlight(Some(Selection::Node(panel))));
    assert_eq!(outline.selected_row(), Some(1));

    rebuild(&mut outline, &engine);
    assert!(outline.highlight(Some(Selection::Node(panel))));
    assert_eq!(outline.selected_row(), Some(4));
}

#[test]
fn rebuild_after_reparent_follows_the_node() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    let ok = engine.query("#ok").unwrap();

    let alt = |phase, dx, dy| {
        InputEvent::track(phase, 0.0, 0.0, dx, dy).with_modifiers(Modifiers::ALT)
    };
    engine.handle(&InputEvent::PointerDown { x: 150.0, y: 110.0 });
    engine.handle(&alt(TrackPhase::Start, 0.0, 0.0));
    engine.handle(&alt(TrackPhase::Track, 360.0, 10.0));
    let events = engine.handle(&alt(TrackPhase::End, 360.0, 10.0));
    assert!(events.contains(&EngineEvent::Refresh { while_tracking: true }));

    rebuild(&mut outline, &engine);
    assert_eq!(
        labels(&outline),
        vec![
            "main-app",
            "div#header",
            "paper-card#card",
            "div#panel",
            "paper-button#ok",
            "input#name",
        ]
    );
    assert_eq!(outline.selected_node(), Some(ok));
    assert_eq!(outline.selected_row(), Some(4));
    assert!(outline.list().items[0].children.as_ref().unwrap().items[1]
        .children
        .is_none());
}

#[test]
fn reorder_request_then_rebuild() {
    let mut engine = load_app_shell();
    let mut outline = OutlineView::new();
    let name = engine.query("#name").unwrap();
    outline.on_events(&engine.click_node(name));

    let router = KeyRouter::new();
    let events = router.dispatch(&KeyPress::new("ArrowUp").with_shift(), &mut engine);
    let &[EngineEvent::Reorder { target, direction }] = events.as_slice() else {
        panic!("expected a single reorder request, got {events:?}");
    };
    assert_eq!(direction, ReorderDirection::Up);
    assert!(engine.graph.reorder(target, direction));

    rebuild(&mut outline, &engine);
    assert_eq!(
        labels(&outline),
        vec![
            "main-app",
            "div#header",
            "paper-card#card",
            "paper-button#ok",
            "input#name",
            "div#panel",
        ]
    );
    // the selection followed the node, not the row
    assert_eq!(outline.selected_row(), Some(4));
}
