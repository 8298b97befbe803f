//! Instant Memory engine
//!
//! Chimp-test style recall game:
//! - Level `n` flashes `n + 2` numbered cards at random board positions
//! - After a level-dependent delay the faces are hidden
//! - The player taps the cards back in ascending order
//! - A wrong tap costs a life and replays the level; three lives in total
//!
//! Scoring: each cleared level is worth `level * 100`; clearing level 5
//! adds `lives * 50` on top.

use std::collections::BTreeSet;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::finish::{finish_channel, FinishHandle, FinishNotifier};
use crate::rng::{random_int, GameRng};
use crate::timer::Scheduler;
use crate::types::{InputOutcome, Position};

// ==================== Constants ====================

pub const MAX_LEVEL: u32 = 5;
pub const START_LIVES: u32 = 3;

/// Cards on level 1; one more per level
const BASE_TARGET_COUNT: u32 = 2;

const BASE_HIDE_MS: u64 = 2000;
const HIDE_STEP_MS: u64 = 200;
const MIN_HIDE_MS: u64 = 500;
/// Extra viewing time from level 5 on
const LATE_LEVEL_EXTRA_MS: u64 = 600;
const LATE_LEVEL: u32 = 5;

/// Pause before replaying a level or starting the next one
pub const LEVEL_PAUSE_MS: u64 = 500;
pub const CLEAR_FINISH_DELAY_MS: u64 = 1500;
pub const GAME_OVER_FINISH_DELAY_MS: u64 = 2000;

const LEVEL_BONUS: u32 = 100;
const LIFE_BONUS: u32 = 50;

// Board placement, in percent of board size
const X_MIN: u32 = 15;
const X_MAX: u32 = 85;
/// Top of the board is covered by the HUD
const Y_MIN: u32 = 20;
const Y_MAX: u32 = 85;
const EXCLUSION_X: (u32, u32) = (35, 65);
const EXCLUSION_Y: (u32, u32) = (40, 60);
const MIN_CARD_DISTANCE: f64 = 18.0;
const MAX_PLACEMENT_ATTEMPTS: u32 = 100;

// ==================== Level rules ====================

pub fn target_count(level: u32) -> u32 {
    level + BASE_TARGET_COUNT
}

/// How long the numbers stay visible on `level`
pub fn hide_delay_ms(level: u32) -> u64 {
    let base = BASE_HIDE_MS
        .saturating_sub(level as u64 * HIDE_STEP_MS)
        .max(MIN_HIDE_MS);
    if level >= LATE_LEVEL {
        base + LATE_LEVEL_EXTRA_MS
    } else {
        base
    }
}

/// Central box kept clear for overlay messages (bounds exclusive)
pub fn in_exclusion_zone(p: &Position) -> bool {
    p.x > EXCLUSION_X.0 && p.x < EXCLUSION_X.1 && p.y > EXCLUSION_Y.0 && p.y < EXCLUSION_Y.1
}

fn collides(candidate: &Position, accepted: &[Position]) -> bool {
    in_exclusion_zone(candidate)
        || accepted
            .iter()
            .any(|p| p.distance(candidate) < MIN_CARD_DISTANCE)
}

/// Outcome of placing one card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Placement {
    pub position: Position,
    /// Accepted only because the attempt budget ran out
    pub forced: bool,
}

/// Scatter `count` cards over the board.
///
/// Each card is redrawn up to 100 times while it lands in the exclusion
/// zone or too close to an earlier card; the last draw is kept regardless.
pub fn generate_placements<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<Placement> {
    let mut placements: Vec<Placement> = Vec::with_capacity(count as usize);
    let mut accepted: Vec<Position> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let mut attempts = 0;
        let placement = loop {
            let candidate = Position::new(
                random_int(rng, X_MIN, X_MAX),
                random_int(rng, Y_MIN, Y_MAX),
            );
            attempts += 1;
            if !collides(&candidate, &accepted) {
                break Placement {
                    position: candidate,
                    forced: false,
                };
            }
            if attempts >= MAX_PLACEMENT_ATTEMPTS {
                break Placement {
                    position: candidate,
                    forced: true,
                };
            }
        };
        accepted.push(placement.position);
        placements.push(placement);
    }

    placements
}

pub fn generate_positions<R: Rng + ?Sized>(rng: &mut R, count: u32) -> Vec<Position> {
    generate_placements(rng, count)
        .into_iter()
        .map(|p| p.position)
        .collect()
}

// ==================== Data Structures ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MemoryPhase {
    /// Not started, or stopped by the host
    Idle,
    /// Numbers visible, hide pending
    Memorize,
    /// Faces hidden, taps accepted
    Recall,
    /// Short break before a level starts again
    Paused,
    /// All levels cleared, finish pending or sent
    Cleared,
    /// Out of lives, finish pending or sent
    GameOver,
}

impl MemoryPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, MemoryPhase::Cleared | MemoryPhase::GameOver)
    }
}

/// A card on the board. Cards are identified by their number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub number: u32,
    pub position: Position,
    pub face_up: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MemoryEvent {
    LevelStarted { level: u32, cards: Vec<Card> },
    CardsHidden,
    CardRevealed { number: u32 },
    Mistake { number: u32, lives: u32 },
    #[serde(rename_all = "camelCase")]
    LevelComplete { level: u32, bonus: u32, score: u32 },
    AllRevealed,
    Cleared { score: u32 },
    GameOver { score: u32 },
    Finished { score: u32 },
}

/// Snapshot for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryState {
    pub level: u32,
    pub lives: u32,
    pub score: u32,
    pub target_count: u32,
    pub next_expected: u32,
    pub phase: MemoryPhase,
    pub cards: Vec<Card>,
    pub revealed: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MemoryTask {
    HideCards,
    StartLevel,
    Finish(u32),
}

// ==================== Engine ====================

pub struct MemoryEngine {
    rng: GameRng,
    timers: Scheduler<MemoryTask>,
    notifier: FinishNotifier,
    level: u32,
    lives: u32,
    score: u32,
    next_expected: u32,
    cards: Vec<Card>,
    revealed: BTreeSet<u32>,
    phase: MemoryPhase,
    events: Vec<MemoryEvent>,
}

impl MemoryEngine {
    pub fn new(rng: GameRng) -> (Self, FinishHandle) {
        let (notifier, handle) = finish_channel();
        let engine = Self {
            rng,
            timers: Scheduler::new(),
            notifier,
            level: 1,
            lives: START_LIVES,
            score: 0,
            next_expected: 1,
            cards: Vec::new(),
            revealed: BTreeSet::new(),
            phase: MemoryPhase::Idle,
            events: Vec::new(),
        };
        (engine, handle)
    }

    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.level = 1;
        self.lives = START_LIVES;
        self.score = 0;
        info!("memory game started");
        self.start_level();
    }

    /// Lay out the current level and schedule the hide
    pub fn start_level(&mut self) {
        self.timers.cancel_all();
        let count = target_count(self.level);
        let positions = generate_positions(&mut self.rng, count);

        self.cards = positions
            .into_iter()
            .zip(1..=count)
            .map(|(position, number)| Card {
                number,
                position,
                face_up: true,
            })
            .collect();
        self.revealed.clear();
        self.next_expected = 1;
        self.phase = MemoryPhase::Memorize;

        let delay = hide_delay_ms(self.level);
        self.timers.schedule_once(delay, MemoryTask::HideCards);
        debug!(level = self.level, cards = count, hide_ms = delay, "memory level laid out");

        self.events.push(MemoryEvent::LevelStarted {
            level: self.level,
            cards: self.cards.clone(),
        });
    }

    /// Tap the card showing `number`
    pub fn tap(&mut self, number: u32) -> InputOutcome {
        if self.phase != MemoryPhase::Recall {
            return InputOutcome::Ignored;
        }
        if number == 0 || number > self.cards.len() as u32 || self.revealed.contains(&number) {
            return InputOutcome::Ignored;
        }

        if number == self.next_expected {
            self.reveal(number);
            self.next_expected += 1;
            if self.next_expected > self.target_count() {
                self.complete_level();
                return InputOutcome::Completed;
            }
            InputOutcome::Correct
        } else {
            self.mistake(number);
            InputOutcome::Incorrect
        }
    }

    /// Run every timer due at or before `now_ms`
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(task) = self.timers.pop_due(now_ms) {
            self.run_task(task);
        }
        self.timers.settle(now_ms);
    }

    /// Tear down without reporting a score
    pub fn stop(&mut self) {
        let dropped = self.timers.cancel_all();
        self.notifier.abort();
        self.phase = MemoryPhase::Idle;
        debug!(dropped, "memory game stopped");
    }

    pub fn drain_events(&mut self) -> Vec<MemoryEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> MemoryState {
        MemoryState {
            level: self.level,
            lives: self.lives,
            score: self.score,
            target_count: self.target_count(),
            next_expected: self.next_expected,
            phase: self.phase,
            cards: self.cards.clone(),
            revealed: self.revealed.iter().copied().collect(),
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn phase(&self) -> MemoryPhase {
        self.phase
    }

    pub fn next_expected(&self) -> u32 {
        self.next_expected
    }

    pub fn target_count(&self) -> u32 {
        self.cards.len() as u32
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_idle()
    }

    fn run_task(&mut self, task: MemoryTask) {
        match task {
            MemoryTask::HideCards => {
                if self.phase != MemoryPhase::Memorize {
                    return;
                }
                for card in &mut self.cards {
                    card.face_up = false;
                }
                self.phase = MemoryPhase::Recall;
                self.events.push(MemoryEvent::CardsHidden);
            }
            MemoryTask::StartLevel => {
                if self.phase == MemoryPhase::Paused {
                    self.start_level();
                }
            }
            MemoryTask::Finish(score) => {
                self.timers.cancel_all();
                if self.notifier.notify(score) {
                    info!(score, "memory game finished");
                    self.events.push(MemoryEvent::Finished { score });
                }
            }
        }
    }

    fn reveal(&mut self, number: u32) {
        self.revealed.insert(number);
        if let Some(card) = self.cards.iter_mut().find(|c| c.number == number) {
            card.face_up = true;
        }
        self.events.push(MemoryEvent::CardRevealed { number });
    }

    fn complete_level(&mut self) {
        let bonus = self.level * LEVEL_BONUS;
        self.score += bonus;
        self.events.push(MemoryEvent::LevelComplete {
            level: self.level,
            bonus,
            score: self.score,
        });
        debug!(level = self.level, bonus, score = self.score, "memory level cleared");

        if self.level >= MAX_LEVEL {
            let final_score = self.score + self.lives * LIFE_BONUS;
            self.phase = MemoryPhase::Cleared;
            self.events.push(MemoryEvent::Cleared { score: final_score });
            self.schedule_finish(final_score, CLEAR_FINISH_DELAY_MS);
        } else {
            self.level += 1;
            self.pause_then_start_level();
        }
    }

    fn mistake(&mut self, number: u32) {
        self.lives = self.lives.saturating_sub(1);
        self.events.push(MemoryEvent::Mistake {
            number,
            lives: self.lives,
        });
        debug!(number, expected = self.next_expected, lives = self.lives, "memory mistake");

        if self.lives == 0 {
            for card in &mut self.cards {
                card.face_up = true;
            }
            self.phase = MemoryPhase::GameOver;
            self.events.push(MemoryEvent::AllRevealed);
            self.events.push(MemoryEvent::GameOver { score: self.score });
            self.schedule_finish(self.score, GAME_OVER_FINISH_DELAY_MS);
        } else {
            self.pause_then_start_level();
        }
    }

    fn pause_then_start_level(&mut self) {
        self.phase = MemoryPhase::Paused;
        self.timers.cancel_all();
        self.timers
            .schedule_once(LEVEL_PAUSE_MS, MemoryTask::StartLevel);
    }

    fn schedule_finish(&mut self, score: u32, delay_ms: u64) {
        self.timers.cancel_all();
        self.timers.schedule_once(delay_ms, MemoryTask::Finish(score));
    }
}
