//! Automated player
//!
//! Plays whole sessions on virtual time so scoring constants can be checked
//! against a player of known accuracy and speed. Every action (a tap or a
//! keypress) takes `reaction_ms`; with probability `1 - accuracy` the action
//! is a mistake.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
#[cfg(feature = "cli")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::math::MathKey;
use crate::matrix::GRID_SIZE;
use crate::memory::MemoryPhase;
use crate::session::Screen;
use crate::suite::{ActiveGame, BrainAgeSuite, SuiteOptions};
use crate::types::GAME_COUNT;

// ==================== Constants ====================

/// Time spent reading each intro screen
const INTRO_READ_MS: u64 = 1500;

/// Keeps the matrix game finite for a bot that almost never hits
const MIN_ACCURACY: f64 = 0.05;

/// Upper bound on loop iterations for one session
const MAX_STEPS: usize = 200_000;

const BOT_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

// ==================== Data Structures ====================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotProfile {
    /// Probability that an action is correct
    pub accuracy: f64,
    /// Delay before every tap or keypress
    pub reaction_ms: u64,
}

impl Default for BotProfile {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            reaction_ms: 800,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub seed: u64,
    /// Memory, math, matrix
    pub scores: [u32; GAME_COUNT],
    pub total: u32,
    pub brain_age: u32,
    /// Virtual time the whole session took
    pub duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub sessions: usize,
    pub mean_age: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub mean_scores: [f64; GAME_COUNT],
    pub age_histogram: BTreeMap<u32, usize>,
}

enum BotAction {
    Tap(u32),
    Key(MathKey),
    Wait,
}

// ==================== Bot ====================

struct Bot {
    rng: ChaCha8Rng,
    accuracy: f64,
    /// Keys still to type for the current math problem
    typing: Vec<MathKey>,
}

impl Bot {
    fn new(seed: u64, profile: &BotProfile) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed ^ BOT_SEED_SALT),
            accuracy: profile.accuracy.clamp(MIN_ACCURACY, 1.0),
            typing: Vec::new(),
        }
    }

    fn hits(&mut self) -> bool {
        self.rng.gen_bool(self.accuracy)
    }

    fn choose(&mut self, game: Option<&ActiveGame>) -> BotAction {
        match game {
            Some(ActiveGame::Memory(engine)) if engine.phase() == MemoryPhase::Recall => {
                self.typing.clear();
                let next = engine.next_expected();
                let last = engine.target_count();
                if next < last && !self.hits() {
                    BotAction::Tap(self.rng.gen_range(next + 1..=last))
                } else {
                    BotAction::Tap(next)
                }
            }
            Some(ActiveGame::Math(engine)) if engine.is_active() => {
                if self.typing.is_empty() {
                    let Some(problem) = engine.problem() else {
                        return BotAction::Wait;
                    };
                    let answer = if self.hits() {
                        problem.answer
                    } else {
                        problem.answer + 1
                    };
                    self.typing.push(MathKey::Submit);
                    for c in answer.to_string().chars().rev() {
                        self.typing.push(MathKey::Digit(c as u8 - b'0'));
                    }
                }
                self.typing.pop().map_or(BotAction::Wait, BotAction::Key)
            }
            Some(ActiveGame::Matrix(engine)) if engine.is_active() => {
                self.typing.clear();
                let next = engine.next_expected();
                if self.hits() {
                    BotAction::Tap(next)
                } else {
                    let wrong = self.rng.gen_range(1..GRID_SIZE);
                    BotAction::Tap(if wrong >= next { wrong + 1 } else { wrong })
                }
            }
            _ => BotAction::Wait,
        }
    }
}

/// Play one full session
pub fn play_session(seed: u64, profile: &BotProfile) -> SessionReport {
    let mut suite = BrainAgeSuite::new(SuiteOptions { seed: Some(seed) });
    let mut bot = Bot::new(seed, profile);
    let step_ms = profile.reaction_ms.max(1);
    let mut now: u64 = 0;

    if let Err(err) = suite.begin() {
        warn!(error = %err, "could not begin session");
    }

    for _ in 0..MAX_STEPS {
        match suite.advance(now) {
            Screen::Result | Screen::Home => break,
            Screen::Intro(_) => {
                now += INTRO_READ_MS;
                if let Err(err) = suite.start_game(now) {
                    warn!(error = %err, "could not start game");
                    break;
                }
                continue;
            }
            Screen::Playing(_) => {}
        }

        now += step_ms;
        suite.advance(now);
        match bot.choose(suite.active()) {
            BotAction::Tap(id) => {
                suite.tap(id, now);
            }
            BotAction::Key(key) => {
                suite.input(key, now);
            }
            BotAction::Wait => {}
        }
        // Events are only for rendering
        suite.drain_events();
    }

    let state = suite.state();
    let scores = state.results.map(|r| r.score);
    let report = SessionReport {
        seed,
        scores,
        total: state.total_score(),
        brain_age: state.brain_age.unwrap_or(crate::session::OLDEST_AGE),
        duration_ms: now,
    };
    debug!(seed, total = report.total, brain_age = report.brain_age, "simulated session");
    report
}

/// Play `sessions` sessions with consecutive seeds, in parallel
#[cfg(feature = "cli")]
pub fn simulate_batch(sessions: usize, base_seed: u64, profile: &BotProfile) -> Vec<SessionReport> {
    (0..sessions)
        .into_par_iter()
        .map(|i| play_session(base_seed.wrapping_add(i as u64), profile))
        .collect()
}

pub fn summarize(reports: &[SessionReport]) -> BatchSummary {
    let sessions = reports.len();
    let mut age_histogram = BTreeMap::new();
    let mut score_sums = [0u64; GAME_COUNT];
    let mut age_sum = 0u64;

    for report in reports {
        *age_histogram.entry(report.brain_age).or_insert(0) += 1;
        age_sum += report.brain_age as u64;
        for (sum, score) in score_sums.iter_mut().zip(report.scores) {
            *sum += score as u64;
        }
    }

    let denom = sessions.max(1) as f64;
    BatchSummary {
        sessions,
        mean_age: age_sum as f64 / denom,
        min_age: reports.iter().map(|r| r.brain_age).min().unwrap_or(0),
        max_age: reports.iter().map(|r| r.brain_age).max().unwrap_or(0),
        mean_scores: score_sums.map(|s| s as f64 / denom),
        age_histogram,
    }
}
