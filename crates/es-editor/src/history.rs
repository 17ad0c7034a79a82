//! Action history contract.
//!
//! The engine only appends; replay (undo/redo) belongs to the consumer.
//! `ActionLog` is a bounded in-memory implementation.

use crate::config::EngineConfig;
use es_core::NodeIndex;
use es_core::model::{NodeStyle, PositionMode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// What kind of edit an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryKind {
    Move,
    Resize,
    Reparent,
}

/// Position-related style values. Unset offsets stay `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PositionSnapshot {
    pub left: Option<f64>,
    pub top: Option<f64>,
    pub position: PositionMode,
}

impl PositionSnapshot {
    pub fn of(style: &NodeStyle) -> Self {
        Self {
            left: style.left,
            top: style.top,
            position: style.position,
        }
    }

    /// Write the snapshot back into a style record.
    pub fn apply(&self, style: &mut NodeStyle) {
        style.left = self.left;
        style.top = self.top;
        style.position = self.position;
    }
}

/// State captured on one side of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Snapshot {
    Position(PositionSnapshot),
    Size { width: f64, height: f64 },
    Parent {
        parent: NodeIndex,
        position: PositionSnapshot,
    },
}

/// Old and new state of an edit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub old: Snapshot,
    pub new: Snapshot,
}

/// One appended history record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub kind: HistoryKind,
    pub target: NodeIndex,
    pub old: Snapshot,
    pub new: Snapshot,
}

/// Append-only sink for edit records.
pub trait ActionHistory {
    fn add(&mut self, kind: HistoryKind, target: NodeIndex, change: Change);
}

/// Bounded history log. The oldest entry is dropped once full.
#[derive(Debug, Clone)]
pub struct ActionLog {
    entries: VecDeque<HistoryEntry>,
    max_depth: usize,
}

impl ActionLog {
    pub fn new(max_depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(max_depth.min(64)),
            max_depth: max_depth.max(1),
        }
    }

    /// A log sized by `history_depth`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.history_depth)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Entries of one kind, oldest first.
    pub fn of_kind(&self, kind: HistoryKind) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

impl Default for ActionLog {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

impl ActionHistory for ActionLog {
    fn add(&mut self, kind: HistoryKind, target: NodeIndex, change: Change) {
        self.entries.push_back(HistoryEntry {
            kind,
            target,
            old: change.old,
            new: change.new,
        });
        if self.entries.len() > self.max_depth {
            self.entries.pop_front();
        }
    }
}
