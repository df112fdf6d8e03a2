pub use board::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use generator::*;
pub use matching::*;
pub use solver::*;
pub use types::*;

mod board;
mod cell;
mod engine;
mod error;
mod events;
mod generator;
mod matching;
mod solver;
mod types;
