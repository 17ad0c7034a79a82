//! Engine configuration.

use crate::snap::{GRID_SIZE, GridSnap};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document could not be parsed.
    #[error("failed to parse engine config: {0}")]
    Json(#[from] serde_json::Error),
    /// A value parsed but is outside its valid range.
    #[error("invalid engine config: {field} must be {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}

/// Tunables for the canvas interaction engine.
///
/// Every field has a default, so a partial JSON document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Grid size for drag/resize deltas. Default: **10**.
    pub grid_size: f64,
    /// Whether deltas snap to the grid. Default: **true**.
    pub snap_to_grid: bool,
    /// Size of the bottom-right resize handle. Default: **8**.
    pub resize_margin: f64,
    /// Arrow-key nudge distance. Default: **10**.
    pub nudge_step: f64,
    /// Delay before re-selecting a node after a resize ends. Default: **50 ms**.
    pub reselect_delay_ms: u64,
    /// Capacity of the reference action log. Default: **500**.
    pub history_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            grid_size: GRID_SIZE,
            snap_to_grid: true,
            resize_margin: 8.0,
            nudge_step: 10.0,
            reselect_delay_ms: 50,
            history_depth: 500,
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "grid_size",
                expected: "positive",
            });
        }
        if self.resize_margin < 0.0 {
            return Err(ConfigError::Invalid {
                field: "resize_margin",
                expected: "non-negative",
            });
        }
        if self.history_depth == 0 {
            return Err(ConfigError::Invalid {
                field: "history_depth",
                expected: "at least 1",
            });
        }
        Ok(())
    }

    pub fn grid(&self) -> GridSnap {
        GridSnap::new(self.grid_size, self.snap_to_grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn partial_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{ "grid_size": 20, "snap_to_grid": false }"#).unwrap();
        assert_eq!(
            config,
            EngineConfig {
                grid_size: 20.0,
                snap_to_grid: false,
                ..EngineConfig::default()
            }
        );
        assert_eq!(config.grid(), GridSnap::new(20.0, false));
    }

    #[test]
    fn empty_object_is_default() {
        assert_eq!(EngineConfig::from_json("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_json(r#"{ "grid_size": 0 }"#),
            Err(ConfigError::Invalid { field: "grid_size", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json(r#"{ "history_depth": 0 }"#),
            Err(ConfigError::Invalid { field: "history_depth", .. })
        ));
        assert!(matches!(
            EngineConfig::from_json("{ grid_size: 1 }"),
            Err(ConfigError::Json(_))
        ));
    }
}
