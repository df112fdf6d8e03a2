use serde::{Deserialize, Serialize};

use crate::cell::Value;
use crate::error::Result;

pub use retry::*;

mod retry;

/// Strategy producing the value layout of a fresh board.
pub trait BoardGenerator {
    fn generate(&mut self, config: &GenerateConfig) -> Result<Vec<Value>>;
}

/// What to do when the fill phase finds a slot where every value would create
/// an extra matchable pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverMatchPolicy {
    /// Accept the first enumerated value despite the extra match and log a
    /// diagnostic. Verification still discards boards that end up over the
    /// target count.
    Lenient,
    /// Abandon the attempt and retry from scratch.
    Strict,
}

impl Default for OverMatchPolicy {
    fn default() -> Self {
        Self::Lenient
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Target occupied length, `rows * columns` for a fresh board.
    pub cells: usize,
    pub columns: usize,
    /// Exact number of matchable pairs the finished board must expose.
    pub required_pairs: usize,
    pub over_match_policy: OverMatchPolicy,
}

impl GenerateConfig {
    pub fn new(cells: usize, columns: usize, required_pairs: usize) -> Self {
        Self {
            cells,
            columns,
            required_pairs,
            over_match_policy: OverMatchPolicy::default(),
        }
    }
}

/// Required initial pair count for a stage: 3 on stage 1, 2 on stage 2, then
/// 1 from stage 3 onward. The generator itself is stage-agnostic.
pub const fn required_pairs_for_stage(stage: u32) -> usize {
    match stage {
        0 | 1 => 3,
        2 => 2,
        _ => 1,
    }
}
