use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Number of games in one session
pub const GAME_COUNT: usize = 3;

// ==================== Game identity ====================

/// The three mini-games, in the order a session plays them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameId {
    Memory,
    Math,
    Matrix,
}

impl GameId {
    /// Fixed play order
    pub const ORDER: [GameId; GAME_COUNT] = [GameId::Memory, GameId::Math, GameId::Matrix];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ORDER.get(index).copied()
    }

    pub fn index(&self) -> usize {
        match self {
            GameId::Memory => 0,
            GameId::Math => 1,
            GameId::Matrix => 2,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameId::Memory => "memory",
            GameId::Math => "math",
            GameId::Matrix => "matrix",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameId::Memory => "Instant Memory",
            GameId::Math => "Math Challenge",
            GameId::Matrix => "Speed Matrix",
        }
    }

    /// Instructions shown on the intro screen
    pub fn description(&self) -> &'static str {
        match self {
            GameId::Memory => {
                "Numbers flash on the board for a moment. Once they are hidden, tap the cards in order starting from the smallest number."
            }
            GameId::Math => {
                "Answer each arithmetic problem as it appears. Speed matters: later problems are worth more."
            }
            GameId::Matrix => "Tap the numbers from 1 to 25 in ascending order as fast as you can.",
        }
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final score of one game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameResult {
    pub game_id: GameId,
    pub score: u32,
}

impl GameResult {
    pub fn new(game_id: GameId, score: u32) -> Self {
        Self { game_id, score }
    }
}

// ==================== Board geometry ====================

/// A point on the memory board, in whole percentages of the board size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &Position) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }
}

// ==================== Input ====================

/// What an input event did to an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputOutcome {
    /// Rejected without touching state (wrong phase, unknown id, repeat tap, empty submit)
    Ignored,
    /// Buffer edit accepted
    Accepted,
    /// Right answer or right tap
    Correct,
    /// Wrong answer or wrong tap
    Incorrect,
    /// The tap finished the level or the game
    Completed,
}
