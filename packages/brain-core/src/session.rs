//! Session controller
//!
//! Walks the player through the three games in fixed order and turns the
//! total score into a brain age:
//!
//! ```text
//! Home -> Intro(0) -> Playing(0) -> Intro(1) -> Playing(1) -> Intro(2) -> Playing(2) -> Result
//! ```
//!
//! `reset()` returns to `Home` from anywhere.

use serde::Serialize;
use tracing::{debug, info};

use crate::types::{GameId, GameResult, GAME_COUNT};

// ==================== Constants ====================

/// Total score that maps to the youngest age
const TOP_TOTAL_SCORE: u64 = 3500;
const AGE_SPAN: u64 = 60;
pub const YOUNGEST_AGE: u32 = 20;
pub const OLDEST_AGE: u32 = 80;

/// `clamp(80 - floor(total / 3500 * 60), 20, 80)`
pub fn brain_age(total_score: u32) -> u32 {
    // Integer division floors for non-negative totals
    let drop = (total_score as u64 * AGE_SPAN) / TOP_TOTAL_SCORE;
    let age = (OLDEST_AGE as u64).saturating_sub(drop);
    age.clamp(YOUNGEST_AGE as u64, OLDEST_AGE as u64) as u32
}

// ==================== Data Structures ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "index", rename_all = "camelCase")]
pub enum Screen {
    Home,
    Intro(usize),
    Playing(usize),
    Result,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub results: [GameResult; GAME_COUNT],
    pub current_index: usize,
    pub brain_age: Option<u32>,
    pub screen: Screen,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            results: GameId::ORDER.map(|id| GameResult::new(id, 0)),
            current_index: 0,
            brain_age: None,
            screen: Screen::Home,
        }
    }
}

impl SessionState {
    pub fn total_score(&self) -> u32 {
        self.results.iter().map(|r| r.score).sum()
    }

    pub fn current_game(&self) -> Option<GameId> {
        match self.screen {
            Screen::Intro(i) | Screen::Playing(i) => GameId::from_index(i),
            Screen::Home | Screen::Result => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} on the {screen:?} screen")]
    InvalidTransition { action: &'static str, screen: Screen },
}

// ==================== Controller ====================

#[derive(Debug, Clone, Default)]
pub struct SessionController {
    state: SessionState,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn screen(&self) -> Screen {
        self.state.screen
    }

    /// Home -> intro of the first game
    pub fn begin_sequence(&mut self) -> Result<GameId, SessionError> {
        if self.state.screen != Screen::Home {
            return Err(self.invalid("begin the sequence"));
        }
        self.show_intro(0);
        Ok(GameId::Memory)
    }

    /// Intro(i) -> Playing(i); returns the game the host must start
    pub fn start_game(&mut self) -> Result<GameId, SessionError> {
        let Screen::Intro(index) = self.state.screen else {
            return Err(self.invalid("start a game"));
        };
        let game = GameId::ORDER[index];
        self.state.screen = Screen::Playing(index);
        info!(game = %game, index, "game started");
        Ok(game)
    }

    /// Record the running game's score and move on
    pub fn handle_game_finished(&mut self, score: u32) -> Result<Screen, SessionError> {
        let Screen::Playing(index) = self.state.screen else {
            return Err(self.invalid("record a score"));
        };

        let game = GameId::ORDER[index];
        self.state.results[index] = GameResult::new(game, score);
        info!(game = %game, score, "game finished");

        let next = index + 1;
        if next < GAME_COUNT {
            self.show_intro(next);
        } else {
            self.show_result();
        }
        Ok(self.state.screen)
    }

    pub fn reset(&mut self) {
        self.state = SessionState::default();
        debug!("session reset");
    }

    fn show_intro(&mut self, index: usize) {
        self.state.current_index = index;
        self.state.screen = Screen::Intro(index);
    }

    fn show_result(&mut self) {
        let total = self.state.total_score();
        let age = brain_age(total);
        self.state.brain_age = Some(age);
        self.state.screen = Screen::Result;
        info!(
            total,
            brain_age = age,
            memory = self.state.results[0].score,
            math = self.state.results[1].score,
            matrix = self.state.results[2].score,
            "session complete"
        );
    }

    fn invalid(&self, action: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            action,
            screen: self.state.screen,
        }
    }
}
