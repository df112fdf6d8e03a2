use rand::prelude::*;

use super::{BoardGenerator, GenerateConfig, OverMatchPolicy};
use crate::cell::Value;
use crate::error::{GameError, Result};
use crate::matching::{SliceView, match_kind, matchable_pairs};
use crate::types::rc_to_index;

const MAX_BOARD_ATTEMPTS: usize = 50;
const MAX_PAIR_ATTEMPTS: usize = 100;

/// Matchable pair templates: the nine same-value pairs plus the four
/// sum-to-ten pairs.
const PAIR_TEMPLATES: [(Value, Value); 13] = [
    (Value::One, Value::One),
    (Value::Two, Value::Two),
    (Value::Three, Value::Three),
    (Value::Four, Value::Four),
    (Value::Five, Value::Five),
    (Value::Six, Value::Six),
    (Value::Seven, Value::Seven),
    (Value::Eight, Value::Eight),
    (Value::Nine, Value::Nine),
    (Value::One, Value::Nine),
    (Value::Two, Value::Eight),
    (Value::Three, Value::Seven),
    (Value::Four, Value::Six),
];

/// Neighbor offsets `(row, col)` realizing the four line relations.
const PAIR_RELATIONS: [(usize, isize); 4] = [
    (0, 1),  // row neighbor
    (1, 0),  // column neighbor
    (1, 1),  // main diagonal neighbor
    (1, -1), // anti diagonal neighbor
];

/// Retry-and-repair generator: seed exactly the required matchable pairs on
/// random neighbor relations, fill the rest without creating further pairs,
/// then verify the whole board with a full pairwise scan. Deterministic for a
/// fixed seed.
#[derive(Clone, Debug)]
pub struct RetryRepairGenerator {
    rng: SmallRng,
}

impl RetryRepairGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn try_attempt(&mut self, config: &GenerateConfig) -> Option<Vec<Value>> {
        let mut values: Vec<Option<Value>> = vec![None; config.cells];
        let mut usage = [0usize; 9];

        for _ in 0..config.required_pairs {
            if !self.seed_pair(&mut values, &mut usage, config) {
                return None;
            }
        }

        if !self.fill(&mut values, &mut usage, config) {
            return None;
        }

        // Full pairwise verification over the finished board, not just the
        // seeded pairs.
        let view = SliceView::new(&values, config.columns);
        let realized = matchable_pairs(&view).len();
        if realized > config.required_pairs {
            log::debug!(
                "discarding attempt: {realized} matchable pairs exceed target {}",
                config.required_pairs
            );
            return None;
        }

        Some(values.into_iter().map(|value| value.unwrap()).collect())
    }

    /// Places one matchable pair on a random neighbor relation without
    /// creating any additional pair against the cells already placed.
    fn seed_pair(
        &mut self,
        values: &mut [Option<Value>],
        usage: &mut [usize; 9],
        config: &GenerateConfig,
    ) -> bool {
        for _ in 0..MAX_PAIR_ATTEMPTS {
            let (value_a, value_b) = PAIR_TEMPLATES[self.rng.random_range(0..PAIR_TEMPLATES.len())];
            let (delta_row, delta_col) =
                PAIR_RELATIONS[self.rng.random_range(0..PAIR_RELATIONS.len())];

            let a = self.rng.random_range(0..config.cells);
            let (row, col) = crate::types::index_to_rc(a, config.columns);
            let partner_row = row + delta_row;
            let partner_col = col as isize + delta_col;
            if partner_col < 0 || partner_col as usize >= config.columns {
                continue;
            }
            let b = rc_to_index((partner_row, partner_col as usize), config.columns);
            if b >= config.cells || values[a].is_some() || values[b].is_some() {
                continue;
            }

            if creates_extra_match(values, config.columns, a, value_a, None) {
                continue;
            }
            values[a] = Some(value_a);
            if creates_extra_match(values, config.columns, b, value_b, Some(a)) {
                values[a] = None;
                continue;
            }
            values[b] = Some(value_b);
            usage[value_a as usize] += 1;
            usage[value_b as usize] += 1;
            return true;
        }
        false
    }

    /// Fills every remaining slot with the least-used value that creates no
    /// additional matchable pair, ties broken by enumeration order.
    fn fill(
        &mut self,
        values: &mut [Option<Value>],
        usage: &mut [usize; 9],
        config: &GenerateConfig,
    ) -> bool {
        for index in 0..values.len() {
            if values[index].is_some() {
                continue;
            }

            let mut candidates = Value::ALL;
            candidates.sort_by_key(|value| usage[*value as usize]);

            let chosen = candidates
                .into_iter()
                .find(|&value| !creates_extra_match(values, config.columns, index, value, None));

            let value = match chosen {
                Some(value) => value,
                None => match config.over_match_policy {
                    // Fallback takes the first value in enumeration order,
                    // not the least-used one.
                    OverMatchPolicy::Lenient => {
                        let fallback = Value::ALL[0];
                        log::warn!(
                            "no value avoids an extra match at index {index}, accepting {:?}",
                            fallback
                        );
                        fallback
                    }
                    OverMatchPolicy::Strict => return false,
                },
            };

            values[index] = Some(value);
            usage[value as usize] += 1;
        }
        true
    }
}

impl BoardGenerator for RetryRepairGenerator {
    fn generate(&mut self, config: &GenerateConfig) -> Result<Vec<Value>> {
        for _ in 0..MAX_BOARD_ATTEMPTS {
            if let Some(values) = self.try_attempt(config) {
                return Ok(values);
            }
        }
        Err(GameError::GenerationExhausted {
            attempts: MAX_BOARD_ATTEMPTS,
        })
    }
}

/// True when putting `value` at `index` would form a matchable pair with any
/// already-placed value other than `partner`.
fn creates_extra_match(
    values: &mut [Option<Value>],
    columns: usize,
    index: usize,
    value: Value,
    partner: Option<usize>,
) -> bool {
    debug_assert!(values[index].is_none());
    values[index] = Some(value);

    let found = {
        let view = SliceView::new(values, columns);
        (0..values.len()).any(|other| {
            other != index
                && Some(other) != partner
                && values[other].is_some()
                && match_kind(&view, index, other).is_some()
        })
    };

    values[index] = None;
    found
}
