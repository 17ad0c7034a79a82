//! Input abstraction layer.
//!
//! Normalizes pointer gestures and key presses into the events the canvas
//! engine consumes. Track events follow the start/track/end protocol of a
//! pointer gesture recognizer: `dx`/`dy` are cumulative from the start.

/// Keyboard modifier state at the time of an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    /// The "enter container" modifier during a drag.
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const ALT: Modifiers = Modifiers {
        alt: true,
        ..Modifiers::NONE
    };
}

/// Phase of a track (drag) gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackPhase {
    Start,
    Track,
    End,
}

/// A normalized pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed.
    PointerDown { x: f64, y: f64 },

    /// Gesture tick. `x`/`y` is the current pointer position, `dx`/`dy`
    /// the total movement since the gesture started.
    Track {
        phase: TrackPhase,
        x: f64,
        y: f64,
        dx: f64,
        dy: f64,
        modifiers: Modifiers,
    },

    /// Pointer released without a track gesture having started.
    PointerUp { x: f64, y: f64 },

    /// Click (press + release without movement, or a stray release).
    Click { x: f64, y: f64 },

    /// The gesture was interrupted externally (focus loss, pointer capture lost).
    Cancel,
}

impl InputEvent {
    pub fn track(phase: TrackPhase, x: f64, y: f64, dx: f64, dy: f64) -> Self {
        Self::Track {
            phase,
            x,
            y,
            dx,
            dy,
            modifiers: Modifiers::NONE,
        }
    }

    /// Same event with the given modifiers (track events only).
    #[must_use]
    pub fn with_modifiers(self, modifiers: Modifiers) -> Self {
        match self {
            Self::Track {
                phase,
                x,
                y,
                dx,
                dy,
                ..
            } => Self::Track {
                phase,
                x,
                y,
                dx,
                dy,
                modifiers,
            },
            other => other,
        }
    }
}

/// A key press, identified by its `KeyboardEvent.key` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyPress {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.modifiers.shift = true;
        self
    }
}
