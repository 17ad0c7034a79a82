//! Keyboard shortcut mapping.
//!
//! Maps arrow keys to the engine's two keyboard actions: plain arrows
//! nudge the selected node, Shift + arrow asks the reorder collaborator
//! to move it among its siblings.

use es_core::model::ReorderDirection;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShortcutAction {
    /// Move by one nudge step along each axis (unit direction).
    Nudge { dx: f64, dy: f64 },
    /// Sibling reorder request.
    Reorder(ReorderDirection),
}

/// Resolves key events into shortcut actions.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"ArrowUp"`).
    /// Returns `None` if the key has no binding.
    pub fn resolve(key: &str, shift: bool) -> Option<ShortcutAction> {
        if shift {
            return match key {
                "ArrowUp" => Some(ShortcutAction::Reorder(ReorderDirection::Up)),
                "ArrowDown" => Some(ShortcutAction::Reorder(ReorderDirection::Down)),
                "ArrowLeft" => Some(ShortcutAction::Reorder(ReorderDirection::Back)),
                "ArrowRight" => Some(ShortcutAction::Reorder(ReorderDirection::Forward)),
                _ => None,
            };
        }

        match key {
            "ArrowUp" => Some(ShortcutAction::Nudge { dx: 0.0, dy: -1.0 }),
            "ArrowDown" => Some(ShortcutAction::Nudge { dx: 0.0, dy: 1.0 }),
            "ArrowLeft" => Some(ShortcutAction::Nudge { dx: -1.0, dy: 0.0 }),
            "ArrowRight" => Some(ShortcutAction::Nudge { dx: 1.0, dy: 0.0 }),
            _ => None,
        }
    }
}
