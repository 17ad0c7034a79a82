//! Grid snapping for gesture deltas.

/// Default grid size (matches the canvas background pattern).
pub const GRID_SIZE: f64 = 10.0;

/// Rounds drag/resize deltas to the nearest grid multiple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSnap {
    pub size: f64,
    pub enabled: bool,
}

impl Default for GridSnap {
    fn default() -> Self {
        Self {
            size: GRID_SIZE,
            enabled: true,
        }
    }
}

impl GridSnap {
    pub fn new(size: f64, enabled: bool) -> Self {
        Self { size, enabled }
    }

    /// `round(d / g) * g` when enabled, the raw delta otherwise.
    /// A non-positive grid size disables snapping.
    pub fn snap(&self, delta: f64) -> f64 {
        if !self.enabled || self.size <= 0.0 {
            return delta;
        }
        (delta / self.size).round() * self.size
    }
}
