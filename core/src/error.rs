use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Cell index {index} is outside the active board")]
    InvalidIndex { index: usize },
    #[error("Board generation exhausted after {attempts} attempts")]
    GenerationExhausted { attempts: usize },
    #[error("Game has not been started")]
    NotStarted,
    #[error("Game already over, no new moves are accepted")]
    GameOver,
    #[error("Board is settling, input rejected")]
    Settling,
    #[error("No add-number attempts left")]
    NoAttemptsLeft,
    #[error("No cell value has face '{digit}'")]
    InvalidDigit { digit: char },
    #[error("Board of {len} cells does not divide into rows of {columns}")]
    InvalidBoardShape { len: usize, columns: usize },
}

pub type Result<T> = core::result::Result<T, GameError>;
