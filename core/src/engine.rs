use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::cell::CellState;
use crate::error::{GameError, Result};
use crate::events::{Notification, Notifications};
use crate::generator::{BoardGenerator, GenerateConfig, OverMatchPolicy, required_pairs_for_stage};
use crate::matching::{MatchKind, match_kind, matchable_pairs};

pub const NUM_COLUMNS: usize = 9;
pub const INITIAL_ROWS: usize = 5;
pub const GRID_ROWS: usize = 15;

const MATCH_SETTLE_DELAY: Duration = Duration::from_millis(350);
const ROW_CLEAR_BONUS: u32 = 50;
const ADD_NUMBER_ATTEMPTS: u32 = 6;

/// Time source injected into the game so the settle delays are testable
/// without a scheduler.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Copy, Clone, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Uninitialized,
    Idle,
    MatchingUnits,
    GameOver,
}

impl Default for GameState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

/// What happens to a selection arriving while the board is settling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputPolicy {
    /// Drop it silently.
    Ignore,
    /// Buffer it and replay once the board is idle again.
    Queue,
    /// Surface `GameError::Settling` to the caller.
    Reject,
}

impl Default for InputPolicy {
    fn default() -> Self {
        Self::Ignore
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    pub columns: usize,
    pub initial_rows: usize,
    pub grid_rows: usize,
    pub settle_delay: Duration,
    pub input_policy: InputPolicy,
    pub over_match_policy: OverMatchPolicy,
    pub add_number_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            columns: NUM_COLUMNS,
            initial_rows: INITIAL_ROWS,
            grid_rows: GRID_ROWS,
            settle_delay: MATCH_SETTLE_DELAY,
            input_policy: InputPolicy::default(),
            over_match_policy: OverMatchPolicy::default(),
            add_number_attempts: ADD_NUMBER_ATTEMPTS,
        }
    }
}

/// Where the clearing cycle currently stands. The only suspension points are
/// the two settle waits; `tick` drives the transitions.
#[derive(Clone, Debug)]
enum Phase {
    Idle,
    /// A matched pair is settling before the clear scan runs.
    MatchSettling { pair: (usize, usize), until: Instant },
    /// Cleared rows are settling before compaction shifts rows up.
    ClearSettling { rows: Vec<usize>, until: Instant },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Cell is now the first held selection.
    Selected,
    /// The selection was dropped (reselect, or third click).
    SelectionCleared,
    /// Two cells were held but no line connects them.
    NoMatch,
    /// A valid pair; the kind of line that connected it.
    Matched(MatchKind),
    /// Input arrived during a settle window and was dropped.
    Ignored,
    /// Input arrived during a settle window and was buffered.
    Queued,
}

/// One live game: an owned board plus score, stage and attempt counters.
///
/// Every operation returns the notifications it emitted; nothing inside the
/// core calls subscribers. The embedder owns the game and decides its
/// lifecycle, there is no global instance.
#[derive(Debug)]
pub struct Game<G, C> {
    config: GameConfig,
    generator: G,
    clock: C,
    board: Board,
    selected: Vec<usize>,
    queued: Vec<usize>,
    phase: Phase,
    state: GameState,
    score: u32,
    stage: u32,
    attempts_left: u32,
}

impl<G: BoardGenerator, C: Clock> Game<G, C> {
    pub fn new(config: GameConfig, generator: G, clock: C) -> Self {
        Self {
            board: Board::new(config.columns, config.grid_rows),
            config,
            generator,
            clock,
            selected: Vec::new(),
            queued: Vec::new(),
            phase: Phase::Idle,
            state: GameState::Uninitialized,
            score: 0,
            stage: 1,
            attempts_left: 0,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    /// Current stage number, never below 1.
    pub fn stage(&self) -> u32 {
        self.stage
    }

    pub fn attempts_left(&self) -> u32 {
        self.attempts_left
    }

    pub fn is_settling(&self) -> bool {
        !matches!(self.phase, Phase::Idle)
    }

    /// Generates the stage-1 board and opens play.
    pub fn start(&mut self) -> Result<Notifications> {
        let mut notifications = Notifications::new();
        self.score = 0;
        self.stage = 1;
        self.selected.clear();
        self.queued.clear();
        self.phase = Phase::Idle;
        notifications.push(Notification::ScoreChanged(self.score));
        notifications.push(Notification::StageChanged(self.stage));
        self.deal_board(&mut notifications)?;
        self.set_game_state(GameState::Idle, &mut notifications);
        Ok(notifications)
    }

    /// Back to stage 1 with a fresh board.
    pub fn restart(&mut self) -> Result<Notifications> {
        self.start()
    }

    /// Routes one player selection.
    ///
    /// Mirrors the click handling of the live game: a third selection or a
    /// reselect drops the held pair; two compatible, connected cells become a
    /// pending match and start the settle cycle.
    pub fn select(&mut self, index: usize) -> Result<(SelectOutcome, Notifications)> {
        match self.state {
            GameState::Uninitialized => return Err(GameError::NotStarted),
            GameState::GameOver => return Err(GameError::GameOver),
            GameState::Idle | GameState::MatchingUnits => {}
        }

        if self.is_settling() {
            return match self.config.input_policy {
                InputPolicy::Ignore => Ok((SelectOutcome::Ignored, Notifications::new())),
                InputPolicy::Queue => {
                    self.queued.push(index);
                    Ok((SelectOutcome::Queued, Notifications::new()))
                }
                InputPolicy::Reject => Err(GameError::Settling),
            };
        }

        if index >= self.board.occupied_len() {
            return Err(GameError::InvalidIndex { index });
        }

        let mut notifications = Notifications::new();

        if !self.board.is_occupied(index) {
            return Ok((SelectOutcome::Ignored, notifications));
        }

        if self.selected.len() >= 2 || self.selected.contains(&index) {
            self.drop_selection(&mut notifications);
            return Ok((SelectOutcome::SelectionCleared, notifications));
        }

        self.selected.push(index);
        if let Some(change) = self.board.set_state(index, CellState::Selected) {
            notifications.push(change.into());
        }
        notifications.push(Notification::UnitSelected);

        if self.selected.len() < 2 {
            return Ok((SelectOutcome::Selected, notifications));
        }

        let (a, b) = (self.selected[0], self.selected[1]);
        match match_kind(&self.board, a, b) {
            None => {
                self.drop_selection(&mut notifications);
                Ok((SelectOutcome::NoMatch, notifications))
            }
            Some(kind) => {
                self.begin_match(a, b, &mut notifications);
                Ok((SelectOutcome::Matched(kind), notifications))
            }
        }
    }

    /// Appends a copy of every still-occupied value to the board, consuming
    /// one add-number attempt.
    pub fn add_numbers(&mut self) -> Result<Notifications> {
        match self.state {
            GameState::Uninitialized => return Err(GameError::NotStarted),
            GameState::GameOver => return Err(GameError::GameOver),
            GameState::Idle | GameState::MatchingUnits => {}
        }
        if self.is_settling() {
            return Err(GameError::Settling);
        }
        if self.attempts_left == 0 {
            return Err(GameError::NoAttemptsLeft);
        }

        let mut notifications = Notifications::new();
        self.drop_selection(&mut notifications);

        let values = self.board.occupied_values();
        self.board.extend_occupied(&values, &mut notifications);

        self.attempts_left -= 1;
        notifications.push(Notification::AttemptsChanged(self.attempts_left));
        self.check_game_over(&mut notifications);
        Ok(notifications)
    }

    /// Advances the settle state machine. Call whenever time passes; does
    /// nothing while idle or before the current wait elapses.
    pub fn tick(&mut self) -> Notifications {
        let mut notifications = Notifications::new();
        let now = self.clock.now();

        loop {
            match self.phase.clone() {
                Phase::Idle => break,
                Phase::MatchSettling { pair: (a, b), until } => {
                    if now < until {
                        break;
                    }
                    self.finish_match(a, b, now, &mut notifications);
                }
                Phase::ClearSettling { rows, until } => {
                    if now < until {
                        break;
                    }
                    self.board.compact(&rows, &mut notifications);
                    self.phase = Phase::Idle;
                    self.finish_cycle(&mut notifications);
                }
            }
        }

        notifications
    }

    fn begin_match(&mut self, a: usize, b: usize, notifications: &mut Notifications) {
        self.selected.clear();
        for index in [a, b] {
            if let Some(change) = self.board.set_state(index, CellState::MatchPending) {
                notifications.push(change.into());
            }
        }
        notifications.push(Notification::PairMatched);

        let face_a = self.board.value(a).map_or(0, |value| value.face() as u32);
        let face_b = self.board.value(b).map_or(0, |value| value.face() as u32);
        self.add_score(face_a + face_b, notifications);

        self.set_game_state(GameState::MatchingUnits, notifications);
        self.phase = Phase::MatchSettling {
            pair: (a, b),
            until: self.clock.now() + self.config.settle_delay,
        };
    }

    fn finish_match(&mut self, a: usize, b: usize, now: Instant, notifications: &mut Notifications) {
        for index in [a, b] {
            if let Some(change) = self.board.set_state(index, CellState::Matched) {
                notifications.push(change.into());
            }
        }

        let rows = self.board.clearable_rows();
        if rows.is_empty() {
            self.phase = Phase::Idle;
            self.finish_cycle(notifications);
            return;
        }

        for &row in &rows {
            self.board.mark_row_cleared(row, notifications);
            notifications.push(Notification::RowCleared);
            self.add_score(ROW_CLEAR_BONUS, notifications);
        }
        self.phase = Phase::ClearSettling {
            rows,
            until: now + self.config.settle_delay,
        };
    }

    /// Runs once the board settles back down: advance the stage when the
    /// board is exhausted, otherwise check for game over and replay any
    /// queued input.
    fn finish_cycle(&mut self, notifications: &mut Notifications) {
        if self.board.occupied_count() == 0 {
            self.stage += 1;
            notifications.push(Notification::StageChanged(self.stage));
            if let Err(error) = self.deal_board(notifications) {
                log::warn!("stage {} board generation failed: {error}", self.stage);
                self.set_game_state(GameState::GameOver, notifications);
                return;
            }
        }

        self.set_game_state(GameState::Idle, notifications);
        self.check_game_over(notifications);

        if self.state == GameState::Idle && !self.queued.is_empty() {
            let queued = core::mem::take(&mut self.queued);
            for index in queued {
                if let Ok((_, replayed)) = self.select(index) {
                    notifications.extend(replayed);
                }
            }
        }
    }

    fn deal_board(&mut self, notifications: &mut Notifications) -> Result<()> {
        let mut config = GenerateConfig::new(
            self.config.initial_rows * self.config.columns,
            self.config.columns,
            required_pairs_for_stage(self.stage),
        );
        config.over_match_policy = self.config.over_match_policy;

        let values = self.generator.generate(&config)?;
        self.board = Board::from_values(&values, self.config.columns, self.config.grid_rows);
        self.attempts_left = self.config.add_number_attempts;
        notifications.push(Notification::AttemptsChanged(self.attempts_left));
        Ok(())
    }

    fn drop_selection(&mut self, notifications: &mut Notifications) {
        for index in core::mem::take(&mut self.selected) {
            if let Some(change) = self.board.set_state(index, CellState::Filled) {
                notifications.push(change.into());
            }
        }
    }

    fn add_score(&mut self, points: u32, notifications: &mut Notifications) {
        if points == 0 {
            return;
        }
        self.score += points;
        notifications.push(Notification::ScoreChanged(self.score));
    }

    fn set_game_state(&mut self, new: GameState, notifications: &mut Notifications) {
        if self.state != new {
            self.state = new;
            notifications.push(Notification::GameStateChanged(new));
        }
    }

    /// The game ends when no matchable pair remains and no add-number
    /// attempt is left to create one.
    fn check_game_over(&mut self, notifications: &mut Notifications) {
        if self.attempts_left == 0 && matchable_pairs(&self.board).is_empty() {
            self.set_game_state(GameState::GameOver, notifications);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::Value;
    use crate::error::GameError;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    /// Hands out a scripted board instead of a random one.
    struct FixedGenerator {
        values: Vec<Value>,
    }

    impl BoardGenerator for FixedGenerator {
        fn generate(&mut self, _config: &GenerateConfig) -> Result<Vec<Value>> {
            Ok(self.values.clone())
        }
    }

    /// Manually advanced clock shared with the test body.
    #[derive(Clone)]
    struct ManualClock {
        now: Rc<StdCell<Instant>>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                now: Rc::new(StdCell::new(Instant::now())),
            }
        }

        fn advance(&self, delta: Duration) {
            self.now.set(self.now.get() + delta);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.now.get()
        }
    }

    fn digits(text: &str) -> Vec<Value> {
        text.chars().map(|ch| Value::from_digit(ch).unwrap()).collect()
    }

    fn game_with(
        board: &str,
        policy: InputPolicy,
    ) -> (Game<FixedGenerator, ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let config = GameConfig {
            input_policy: policy,
            ..GameConfig::default()
        };
        let mut game = Game::new(
            config,
            FixedGenerator {
                values: digits(board),
            },
            clock.clone(),
        );
        game.start().unwrap();
        (game, clock)
    }

    const SETTLE: Duration = MATCH_SETTLE_DELAY;

    #[test]
    fn selecting_before_start_is_an_error() {
        let clock = ManualClock::new();
        let mut game = Game::new(
            GameConfig::default(),
            FixedGenerator { values: digits("55") },
            clock,
        );
        assert_eq!(game.select(0), Err(GameError::NotStarted));
    }

    #[test]
    fn matching_adjacent_pair_goes_pending_then_matched() {
        let (mut game, clock) = game_with("553456789", InputPolicy::Ignore);

        let (outcome, _) = game.select(0).unwrap();
        assert_eq!(outcome, SelectOutcome::Selected);
        assert_eq!(game.board().state(0), CellState::Selected);

        let (outcome, notifications) = game.select(1).unwrap();
        assert_eq!(outcome, SelectOutcome::Matched(MatchKind::Row));
        assert_eq!(game.board().state(0), CellState::MatchPending);
        assert_eq!(game.board().state(1), CellState::MatchPending);
        assert!(notifications.contains(&Notification::PairMatched));
        assert_eq!(game.state(), GameState::MatchingUnits);
        assert_eq!(game.score(), 10);

        clock.advance(SETTLE);
        game.tick();
        assert_eq!(game.board().state(0), CellState::Matched);
        assert_eq!(game.board().state(1), CellState::Matched);
        assert_eq!(game.state(), GameState::Idle);
    }

    #[test]
    fn reselecting_held_cell_clears_selection() {
        let (mut game, _clock) = game_with("553456789", InputPolicy::Ignore);

        game.select(0).unwrap();
        let (outcome, _) = game.select(0).unwrap();
        assert_eq!(outcome, SelectOutcome::SelectionCleared);
        assert_eq!(game.board().state(0), CellState::Filled);
    }

    #[test]
    fn incompatible_pair_drops_selection() {
        let (mut game, _clock) = game_with("513456789", InputPolicy::Ignore);

        game.select(0).unwrap();
        let (outcome, _) = game.select(1).unwrap();
        assert_eq!(outcome, SelectOutcome::NoMatch);
        assert_eq!(game.board().state(0), CellState::Filled);
        assert_eq!(game.board().state(1), CellState::Filled);
    }

    #[test]
    fn full_matched_row_is_cleared_and_compacted() {
        // row 0 pairs off completely; its last cell pairs with the 9 directly
        // below, and the row of 8s keeps the stage alive
        let (mut game, clock) = game_with("555546371888888889", InputPolicy::Ignore);

        for (a, b) in [(0, 1), (2, 3), (4, 5), (6, 7)] {
            let (outcome, _) = game.select(a).unwrap();
            assert_eq!(outcome, SelectOutcome::Selected);
            let (outcome, _) = game.select(b).unwrap();
            assert!(matches!(outcome, SelectOutcome::Matched(_)), "{a},{b}");
            clock.advance(SETTLE);
            game.tick();
        }

        // 1 above, 9 below: the column pair completes the row
        let (outcome, _) = game.select(8).unwrap();
        assert_eq!(outcome, SelectOutcome::Selected);
        let (outcome, _) = game.select(17).unwrap();
        assert_eq!(outcome, SelectOutcome::Matched(MatchKind::Column));

        clock.advance(SETTLE);
        let notifications = game.tick();
        assert!(notifications.contains(&Notification::RowCleared));
        assert!(game.is_settling());

        let before = game.board().occupied_count();
        clock.advance(SETTLE);
        game.tick();
        assert!(!game.is_settling());
        // conservation: compaction only moved the survivors up
        assert_eq!(game.board().occupied_count(), before);
        assert_eq!(game.board().occupied_len(), 9);
        assert_eq!(game.board().value(0), Some(Value::Eight));
    }

    #[test]
    fn ignore_policy_drops_input_during_settle() {
        let (mut game, _clock) = game_with("553456789", InputPolicy::Ignore);

        game.select(0).unwrap();
        game.select(1).unwrap();
        let (outcome, _) = game.select(2).unwrap();
        assert_eq!(outcome, SelectOutcome::Ignored);
    }

    #[test]
    fn reject_policy_surfaces_error_during_settle() {
        let (mut game, _clock) = game_with("553456789", InputPolicy::Reject);

        game.select(0).unwrap();
        game.select(1).unwrap();
        assert_eq!(game.select(2), Err(GameError::Settling));
    }

    #[test]
    fn queue_policy_replays_input_after_settle() {
        let (mut game, clock) = game_with("553456789", InputPolicy::Queue);

        game.select(0).unwrap();
        game.select(1).unwrap();
        let (outcome, _) = game.select(2).unwrap();
        assert_eq!(outcome, SelectOutcome::Queued);

        clock.advance(SETTLE);
        game.tick();
        // the queued selection was replayed once idle
        assert_eq!(game.board().state(2), CellState::Selected);
    }

    #[test]
    fn add_numbers_appends_remaining_values() {
        let (mut game, _clock) = game_with("512", InputPolicy::Ignore);

        let notifications = game.add_numbers().unwrap();
        assert_eq!(game.board().occupied_len(), 6);
        assert_eq!(game.board().value(3), Some(Value::Five));
        assert_eq!(game.board().value(4), Some(Value::One));
        assert_eq!(game.board().value(5), Some(Value::Two));
        assert_eq!(game.attempts_left(), ADD_NUMBER_ATTEMPTS - 1);
        assert!(
            notifications.contains(&Notification::AttemptsChanged(ADD_NUMBER_ATTEMPTS - 1))
        );
    }

    #[test]
    fn add_numbers_fails_when_attempts_run_out() {
        let (mut game, _clock) = game_with("512", InputPolicy::Ignore);

        for _ in 0..ADD_NUMBER_ATTEMPTS {
            game.add_numbers().unwrap();
        }
        assert_eq!(game.add_numbers(), Err(GameError::NoAttemptsLeft));
    }

    #[test]
    fn exhausted_board_advances_stage() {
        let (mut game, clock) = game_with("55", InputPolicy::Ignore);
        assert_eq!(game.stage(), 1);

        game.select(0).unwrap();
        game.select(1).unwrap();
        clock.advance(SETTLE);
        let notifications = game.tick();

        // both cells matched, nothing occupied: new stage, fresh board
        assert_eq!(game.stage(), 2);
        assert!(notifications.contains(&Notification::StageChanged(2)));
        assert_eq!(game.state(), GameState::Idle);
        assert_eq!(game.board().occupied_len(), 2);
        assert_eq!(game.attempts_left(), ADD_NUMBER_ATTEMPTS);
    }

    #[test]
    fn stuck_board_without_attempts_is_game_over() {
        let clock = ManualClock::new();
        let config = GameConfig {
            add_number_attempts: 1,
            ..GameConfig::default()
        };
        let mut game = Game::new(
            config,
            FixedGenerator { values: digits("12") },
            clock,
        );
        game.start().unwrap();

        // appending 1,2 creates no matchable pair; the last attempt is gone
        game.add_numbers().unwrap();
        assert_eq!(game.state(), GameState::GameOver);
        assert_eq!(game.select(0), Err(GameError::GameOver));
    }

    #[test]
    fn restart_resets_counters() {
        let (mut game, clock) = game_with("553456789", InputPolicy::Ignore);

        game.select(0).unwrap();
        game.select(1).unwrap();
        clock.advance(SETTLE);
        game.tick();
        assert!(game.score() > 0);

        game.restart().unwrap();
        assert_eq!(game.score(), 0);
        assert_eq!(game.stage(), 1);
        assert_eq!(game.state(), GameState::Idle);
        assert_eq!(game.board().state(0), CellState::Filled);
    }
}
