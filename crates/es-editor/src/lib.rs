pub mod config;
pub mod engine;
pub mod history;
pub mod input;
pub mod outline;
pub mod router;
pub mod scheduler;
pub mod shortcuts;
pub mod snap;

pub use config::{ConfigError, EngineConfig};
pub use engine::{CanvasEngine, EngineEvent, GestureState, Selection};
pub use history::{ActionHistory, ActionLog, Change, HistoryEntry, HistoryKind, Snapshot};
pub use input::{InputEvent, KeyPress, Modifiers, TrackPhase};
pub use outline::{FlatEntry, OutlineView, flatten_tree};
pub use router::{Focus, KeyRouter, KeySubscriber};
