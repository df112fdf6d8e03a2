use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use hashbrown::HashSet;
use serde::{Deserialize, Serialize};

use crate::cell::Value;
use crate::matching::{SliceView, matchable_pairs};
use crate::types::index_to_rc;

pub use text::*;

mod text;

/// Default number of solutions the solver collects before stopping.
pub const DEFAULT_TOP_SOLUTIONS: usize = 10;

/// One matched pair inside a solution sequence.
///
/// Serializes 1-based as `rowA,colA,rowB,colB`, the on-disk step format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchStep {
    pub row_a: usize,
    pub col_a: usize,
    pub row_b: usize,
    pub col_b: usize,
}

impl MatchStep {
    pub fn from_indices(a: usize, b: usize, columns: usize) -> Self {
        let (row_a, col_a) = index_to_rc(a, columns);
        let (row_b, col_b) = index_to_rc(b, columns);
        Self {
            row_a,
            col_a,
            row_b,
            col_b,
        }
    }
}

impl fmt::Display for MatchStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.row_a + 1,
            self.col_a + 1,
            self.row_b + 1,
            self.col_b + 1
        )
    }
}

/// Search frontier entry; cheapest (fewest steps) first, FIFO within equal
/// cost so exploration order is deterministic.
struct QueueEntry {
    priority: usize,
    sequence: u64,
    steps: Vec<(usize, usize)>,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // reversed: BinaryHeap is a max-heap, we want the cheapest entry out
        // first and the oldest among equals
        (other.priority, other.sequence).cmp(&(self.priority, self.sequence))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Finds up to `max_solutions` shortest match sequences that reduce the count
/// of `target` on the board to at most one.
///
/// Uniform-cost best-first search over board states. A state is the sequence
/// of steps taken; its board is derived by replaying the steps onto the
/// initial board, with matched cells removed outright (the solver models
/// removal, not the live matched/cleared lifecycle). Visited boards are
/// deduplicated by a structural hash, which keeps the state space tractable.
///
/// A board whose target count is already at most one returns no solutions;
/// the vacuously minimal empty sequence is not reported.
pub fn solve(
    initial: &[Option<Value>],
    columns: usize,
    target: Value,
    max_solutions: usize,
) -> Vec<Vec<MatchStep>> {
    let mut results = Vec::new();
    if max_solutions == 0 {
        return results;
    }
    if count_target(initial, target) <= 1 {
        return results;
    }

    let mut heap = BinaryHeap::new();
    let mut seen: HashSet<u64> = HashSet::new();
    let mut sequence = 0u64;

    heap.push(QueueEntry {
        priority: 0,
        sequence,
        steps: Vec::new(),
    });

    'search: while let Some(entry) = heap.pop() {
        let board = replay(initial, &entry.steps);
        let pairs = matchable_pairs(&SliceView::new(&board, columns));

        for (a, b) in pairs {
            let mut child = board.clone();
            child[a] = None;
            child[b] = None;

            if !seen.insert(board_key(&child)) {
                continue;
            }

            let mut steps = entry.steps.clone();
            steps.push((a, b));

            if count_target(&child, target) <= 1 {
                results.push(
                    steps
                        .iter()
                        .map(|&(a, b)| MatchStep::from_indices(a, b, columns))
                        .collect(),
                );
                if results.len() >= max_solutions {
                    break 'search;
                }
            } else {
                sequence += 1;
                heap.push(QueueEntry {
                    priority: steps.len(),
                    sequence,
                    steps,
                });
            }
        }
    }

    results
}

/// Replays removal steps onto a copy of the initial board.
pub fn replay(initial: &[Option<Value>], steps: &[(usize, usize)]) -> Vec<Option<Value>> {
    let mut board = initial.to_vec();
    for &(a, b) in steps {
        board[a] = None;
        board[b] = None;
    }
    board
}

fn count_target(board: &[Option<Value>], target: Value) -> usize {
    board.iter().filter(|&&cell| cell == Some(target)).count()
}

/// Order-sensitive polynomial hash of a board; removed cells hash as a
/// sentinel distinct from every face value.
fn board_key(board: &[Option<Value>]) -> u64 {
    let mut hash: u64 = 17;
    for cell in board {
        let code = cell.map_or(0, |value| value.face() as u64);
        hash = hash.wrapping_mul(31).wrapping_add(code);
    }
    hash
}
