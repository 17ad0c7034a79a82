//! Key routing service.
//!
//! Holds the current keyboard focus and forwards key presses to a
//! subscriber that accepts that focus. Focus is reported by the host UI.

use crate::input::KeyPress;
use es_core::NodeIndex;

/// Where keyboard focus currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// A row button inside the outline view.
    OutlineRow,
    /// Nothing in particular (document body).
    #[default]
    Body,
    /// A scene element.
    Element(NodeIndex),
    /// Any other control (text field, inspector input, ...).
    Other,
}

/// A component that reacts to routed key presses.
pub trait KeySubscriber {
    type Output: Default;

    /// Whether key presses are meaningful while `focus` holds.
    fn accepts_focus(&self, focus: Focus) -> bool;

    fn on_key(&mut self, key: &KeyPress) -> Self::Output;
}

#[derive(Debug, Clone, Default)]
pub struct KeyRouter {
    focus: Focus,
}

impl KeyRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
    }

    /// Forward `key` to `subscriber` if it accepts the current focus.
    pub fn dispatch<S: KeySubscriber + ?Sized>(&self, key: &KeyPress, subscriber: &mut S) -> S::Output {
        if !subscriber.accepts_focus(self.focus) {
            log::trace!("key {:?} dropped, focus {:?} not accepted", key.key, self.focus);
            return S::Output::default();
        }
        subscriber.on_key(key)
    }
}
