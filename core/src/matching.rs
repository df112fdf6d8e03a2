use serde::{Deserialize, Serialize};

use crate::cell::Value;
use crate::types::index_to_rc;

/// Line that connects a valid pair, in detection priority order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    Row,
    Column,
    MainDiagonal,
    AntiDiagonal,
}

/// Read-only occupancy/value view of a board.
///
/// The live board, the generator's value array and the solver's removal board
/// all probe line of sight through this one interface, so there is exactly one
/// detector implementation.
pub trait BoardView {
    fn columns(&self) -> usize;
    fn len(&self) -> usize;
    /// Out-of-range indices read as unoccupied.
    fn is_occupied(&self, index: usize) -> bool;
    fn value_at(&self, index: usize) -> Option<Value>;
}

/// View over a plain value slice where every present value is occupied.
#[derive(Copy, Clone, Debug)]
pub struct SliceView<'a> {
    values: &'a [Option<Value>],
    columns: usize,
}

impl<'a> SliceView<'a> {
    pub fn new(values: &'a [Option<Value>], columns: usize) -> Self {
        Self { values, columns }
    }
}

impl BoardView for SliceView<'_> {
    fn columns(&self) -> usize {
        self.columns
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn is_occupied(&self, index: usize) -> bool {
        self.values.get(index).is_some_and(|v| v.is_some())
    }

    fn value_at(&self, index: usize) -> Option<Value> {
        self.values.get(index).copied().flatten()
    }
}

/// Computes whether `a` and `b` form a match and over which line.
///
/// Values must be equal or sum to ten, and one of the four canonical lines
/// between the cells must contain no occupied cell strictly between them.
/// Lines are tried in fixed priority order: row, column, main diagonal, anti
/// diagonal. Out-of-range or identical positions are never a match.
pub fn match_kind<V: BoardView>(view: &V, a: usize, b: usize) -> Option<MatchKind> {
    if a == b || a >= view.len() || b >= view.len() {
        return None;
    }

    let value_a = view.value_at(a)?;
    let value_b = view.value_at(b)?;
    // Geometry is never evaluated for value-incompatible pairs.
    if !value_a.pairs_with(value_b) {
        return None;
    }

    let columns = view.columns();
    let (row_a, col_a) = index_to_rc(a, columns);
    let (row_b, col_b) = index_to_rc(b, columns);

    if row_a == row_b {
        let (lo, hi) = (col_a.min(col_b), col_a.max(col_b));
        if ((lo + 1)..hi).all(|col| !view.is_occupied(row_a * columns + col)) {
            return Some(MatchKind::Row);
        }
    }

    if col_a == col_b {
        let (lo, hi) = (row_a.min(row_b), row_a.max(row_b));
        if ((lo + 1)..hi).all(|row| !view.is_occupied(row * columns + col_a)) {
            return Some(MatchKind::Column);
        }
    }

    // row - col is constant along the main diagonal
    if row_a as isize - col_a as isize == row_b as isize - col_b as isize {
        let offset = row_a as isize - col_a as isize;
        let (lo, hi) = (row_a.min(row_b), row_a.max(row_b));
        let clear = ((lo + 1)..hi).all(|row| {
            let col = (row as isize - offset) as usize;
            !view.is_occupied(row * columns + col)
        });
        if clear {
            return Some(MatchKind::MainDiagonal);
        }
    }

    // row + col is constant along the anti diagonal
    if row_a + col_a == row_b + col_b {
        let sum = row_a + col_a;
        let (lo, hi) = (row_a.min(row_b), row_a.max(row_b));
        let clear = ((lo + 1)..hi).all(|row| !view.is_occupied(row * columns + (sum - row)));
        if clear {
            return Some(MatchKind::AntiDiagonal);
        }
    }

    None
}

/// Enumerates every matchable pair on the board, ordered by `(a, b)` with
/// `a < b`. The full pairwise scan is what generator verification, the game
/// over check and the solver all rely on.
pub fn matchable_pairs<V: BoardView>(view: &V) -> Vec<(usize, usize)> {
    let len = view.len();
    let mut pairs = Vec::new();
    for a in 0..len {
        if !view.is_occupied(a) {
            continue;
        }
        for b in (a + 1)..len {
            if !view.is_occupied(b) {
                continue;
            }
            if match_kind(view, a, b).is_some() {
                pairs.push((a, b));
            }
        }
    }
    pairs
}
