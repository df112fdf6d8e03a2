use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::cell::CellState;
use crate::engine::GameState;

/// A single cell transition. Same-state transitions are suppressed at the
/// source, so two consecutive changes for one cell never repeat a state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    pub index: usize,
    pub old: CellState,
    pub new: CellState,
}

/// Everything the core reports back to its embedder. State mutation never
/// calls subscribers directly; each operation returns the batch it emitted
/// and a dispatcher outside the core delivers it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Notification {
    Cell(StateChange),
    UnitSelected,
    PairMatched,
    RowCleared,
    ScoreChanged(u32),
    StageChanged(u32),
    AttemptsChanged(u32),
    GameStateChanged(GameState),
}

impl From<StateChange> for Notification {
    fn from(change: StateChange) -> Self {
        Self::Cell(change)
    }
}

/// Batch emitted by one operation; short enough to stay inline.
pub type Notifications = SmallVec<[Notification; 8]>;
