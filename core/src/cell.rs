use serde::{Deserialize, Serialize};

/// The nine face values a cell can carry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
}

impl Value {
    /// Enumeration order doubles as the tie-break order for the generator.
    pub const ALL: [Value; 9] = [
        Value::One,
        Value::Two,
        Value::Three,
        Value::Four,
        Value::Five,
        Value::Six,
        Value::Seven,
        Value::Eight,
        Value::Nine,
    ];

    pub const fn face(self) -> u8 {
        self as u8 + 1
    }

    pub const fn from_face(face: u8) -> Option<Self> {
        match face {
            1 => Some(Value::One),
            2 => Some(Value::Two),
            3 => Some(Value::Three),
            4 => Some(Value::Four),
            5 => Some(Value::Five),
            6 => Some(Value::Six),
            7 => Some(Value::Seven),
            8 => Some(Value::Eight),
            9 => Some(Value::Nine),
            _ => None,
        }
    }

    pub fn from_digit(digit: char) -> Option<Self> {
        let face = digit.to_digit(10)?;
        Self::from_face(face as u8)
    }

    pub const fn to_digit(self) -> char {
        (b'0' + self.face()) as char
    }

    /// Two values are compatible when equal or when their faces sum to ten.
    pub const fn pairs_with(self, other: Value) -> bool {
        self as u8 == other as u8 || self.face() + other.face() == 10
    }
}

/// Lifecycle state of a board cell.
///
/// Only `Filled`, `Selected` and `MatchPending` block line of sight; matched
/// and cleared cells are transparent, same as never-occupied padding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Empty,
    Filled,
    Selected,
    MatchPending,
    Matched,
    Cleared,
}

impl CellState {
    pub const fn is_occupied(self) -> bool {
        matches!(self, Self::Filled | Self::Selected | Self::MatchPending)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Empty
    }
}

/// One slot of the board grid. Carries a value only while not empty/cleared.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    value: Option<Value>,
    state: CellState,
}

impl Cell {
    pub const fn state(self) -> CellState {
        self.state
    }

    pub const fn value(self) -> Option<Value> {
        self.value
    }

    pub const fn is_occupied(self) -> bool {
        self.state.is_occupied()
    }

    pub(crate) fn set_value(&mut self, value: Option<Value>) {
        self.value = value;
    }

    pub(crate) fn set_state(&mut self, state: CellState) {
        self.state = state;
        if matches!(state, CellState::Empty | CellState::Cleared) {
            self.value = None;
        }
    }
}
