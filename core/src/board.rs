use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellState, Value};
use crate::events::{Notifications, StateChange};
use crate::matching::BoardView;
use crate::types::rc_to_index;

/// The board grid.
///
/// Two views exist over the same storage: the full grid (every cell ever
/// spawned, a multiple of `columns` long, grows monotonically and includes
/// trailing padding rows) and the occupied prefix, which is the part the
/// puzzle actually reasons about. Cells are created once at expansion time
/// and reset in place; they are never destroyed or reindexed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Vec<Cell>,
    columns: usize,
    occupied_len: usize,
}

impl Board {
    /// An all-empty grid of `grid_rows * columns` cells and no active area.
    pub fn new(columns: usize, grid_rows: usize) -> Self {
        Self {
            cells: vec![Cell::default(); columns * grid_rows],
            columns,
            occupied_len: 0,
        }
    }

    /// A board whose occupied prefix is filled from `values`, padded with
    /// empty rows up to `grid_rows` (or however many rows `values` needs).
    pub fn from_values(values: &[Value], columns: usize, grid_rows: usize) -> Self {
        let needed_rows = values.len().div_ceil(columns);
        let mut board = Self::new(columns, grid_rows.max(needed_rows));
        for (index, &value) in values.iter().enumerate() {
            board.cells[index].set_value(Some(value));
            board.cells[index].set_state(CellState::Filled);
        }
        board.occupied_len = values.len();
        board
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Length of the full grid, padding included.
    pub fn grid_len(&self) -> usize {
        self.cells.len()
    }

    /// Length of the occupied prefix the puzzle reasons about.
    pub fn occupied_len(&self) -> usize {
        self.occupied_len
    }

    /// Number of complete rows inside the occupied prefix. A trailing partial
    /// row is not a row for clearing purposes.
    pub fn full_rows(&self) -> usize {
        self.occupied_len / self.columns
    }

    pub fn cell(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    pub fn state(&self, index: usize) -> CellState {
        self.cells
            .get(index)
            .map_or(CellState::Empty, |cell| cell.state())
    }

    pub fn value(&self, index: usize) -> Option<Value> {
        self.cells.get(index).and_then(|cell| cell.value())
    }

    pub fn is_occupied(&self, index: usize) -> bool {
        self.cells.get(index).is_some_and(|cell| cell.is_occupied())
    }

    pub fn is_matched(&self, index: usize) -> bool {
        self.state(index) == CellState::Matched
    }

    /// Count of occupied cells over the whole grid.
    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_occupied()).count()
    }

    /// Values of all occupied cells in board order.
    pub fn occupied_values(&self) -> Vec<Value> {
        self.cells[..self.occupied_len]
            .iter()
            .filter(|cell| cell.is_occupied())
            .filter_map(|cell| cell.value())
            .collect()
    }

    pub fn count_value(&self, target: Value) -> usize {
        self.cells[..self.occupied_len]
            .iter()
            .filter(|cell| cell.is_occupied() && cell.value() == Some(target))
            .count()
    }

    /// Transitions a cell, reporting the change. Same-state transitions are
    /// suppressed and report nothing.
    pub fn set_state(&mut self, index: usize, new: CellState) -> Option<StateChange> {
        let cell = self.cells.get_mut(index)?;
        let old = cell.state();
        if old == new {
            return None;
        }
        cell.set_state(new);
        Some(StateChange { index, old, new })
    }

    /// Clears the value reference and returns the cell to `Empty`.
    pub fn reset(&mut self, index: usize) -> Option<StateChange> {
        self.set_state(index, CellState::Empty)
    }

    /// A row is clearable when its first cell is matched and every other cell
    /// is matched or transparent. The first-cell check early-outs on padding
    /// and live rows without scanning the rest.
    pub fn row_is_fully_clearable(&self, row: usize) -> bool {
        if (row + 1) * self.columns > self.occupied_len {
            return false;
        }
        let start = rc_to_index((row, 0), self.columns);
        if self.state(start) != CellState::Matched {
            return false;
        }
        (start..start + self.columns)
            .all(|index| self.is_matched(index) || !self.is_occupied(index))
    }

    /// Indices of every clearable full row, ascending.
    pub fn clearable_rows(&self) -> Vec<usize> {
        (0..self.full_rows())
            .filter(|&row| self.row_is_fully_clearable(row))
            .collect()
    }

    /// Marks every matched cell of `row` as cleared.
    pub fn mark_row_cleared(&mut self, row: usize, notifications: &mut Notifications) {
        let start = rc_to_index((row, 0), self.columns);
        for index in start..start + self.columns {
            if self.is_matched(index) {
                if let Some(change) = self.set_state(index, CellState::Cleared) {
                    notifications.push(change.into());
                }
            }
        }
    }

    /// Removes the cleared rows and shifts everything below them up, keeping
    /// the board compact. Rows are processed lowest index first; indices of
    /// rows not yet processed shift down as earlier rows are removed. The
    /// vacated trailing rows are reset to empty and leave the occupied
    /// prefix.
    pub fn compact(&mut self, cleared_rows: &[usize], notifications: &mut Notifications) {
        let mut rows = cleared_rows.to_vec();
        for i in 0..rows.len() {
            self.remove_row(rows[i], notifications);
            for later in &mut rows[i + 1..] {
                *later -= 1;
            }
        }
    }

    fn remove_row(&mut self, row: usize, notifications: &mut Notifications) {
        let columns = self.columns;
        debug_assert!((row + 1) * columns <= self.occupied_len);

        // Bubble the removed row to the back of the occupied prefix one cell
        // at a time, cell identity travels with the swap.
        let mut index = row * columns;
        while index + columns < self.occupied_len {
            self.cells.swap(index, index + columns);
            index += 1;
        }

        for index in self.occupied_len - columns..self.occupied_len {
            if let Some(change) = self.reset(index) {
                notifications.push(change.into());
            }
        }
        self.occupied_len -= columns;
    }

    /// Appends values to the end of the occupied prefix, growing the grid by
    /// whole padding rows when it runs out of spawned cells.
    pub fn extend_occupied(&mut self, values: &[Value], notifications: &mut Notifications) {
        let needed = self.occupied_len + values.len();
        while self.cells.len() < needed {
            self.cells
                .extend(core::iter::repeat_n(Cell::default(), self.columns));
        }
        for &value in values {
            let index = self.occupied_len;
            self.cells[index].set_value(Some(value));
            if let Some(change) = self.set_state(index, CellState::Filled) {
                notifications.push(change.into());
            }
            self.occupied_len += 1;
        }
    }
}

impl BoardView for Board {
    fn columns(&self) -> usize {
        self.columns
    }

    fn len(&self) -> usize {
        self.occupied_len
    }

    fn is_occupied(&self, index: usize) -> bool {
        Board::is_occupied(self, index)
    }

    fn value_at(&self, index: usize) -> Option<Value> {
        self.value(index)
    }
}
