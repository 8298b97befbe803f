//! Speed Matrix engine
//!
//! The numbers 1..=25 are shuffled onto a 5x5 grid and tapped in ascending
//! order. Wrong taps cost nothing but time. The score falls by 15 points per
//! second from 1200 and bottoms out at zero after 80 seconds.

use serde::Serialize;
use tracing::{debug, info};

use crate::finish::{finish_channel, FinishHandle, FinishNotifier};
use crate::rng::{shuffled, GameRng};
use crate::timer::Scheduler;
use crate::types::InputOutcome;

// ==================== Constants ====================

pub const GRID_SIZE: u32 = 25;
/// Refresh rate of the elapsed-time display
const CLOCK_PERIOD_MS: u64 = 50;
pub const FINISH_DELAY_MS: u64 = 2000;

const BASE_SCORE: f64 = 1200.0;
const PENALTY_PER_SEC: f64 = 15.0;

/// `max(0, floor(1200 - 15 * seconds))`
pub fn completion_score(elapsed_ms: u64) -> u32 {
    let seconds = elapsed_ms as f64 / 1000.0;
    (BASE_SCORE - seconds * PENALTY_PER_SEC).floor().max(0.0) as u32
}

// ==================== Data Structures ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatrixEvent {
    GridReady { order: Vec<u32> },
    #[serde(rename_all = "camelCase")]
    Elapsed { elapsed_ms: u64 },
    Hit { number: u32 },
    Miss { number: u32 },
    #[serde(rename_all = "camelCase")]
    Cleared { elapsed_ms: u64, score: u32 },
    Finished { score: u32 },
}

/// Snapshot for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixState {
    pub order: Vec<u32>,
    pub next_expected: u32,
    /// How many numbers are done, for the `n / 25` counter
    pub progress: u32,
    pub elapsed_ms: u64,
    pub score: Option<u32>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatrixTask {
    ClockTick,
    Finish(u32),
}

// ==================== Engine ====================

pub struct MatrixEngine {
    rng: GameRng,
    timers: Scheduler<MatrixTask>,
    notifier: FinishNotifier,
    order: Vec<u32>,
    next_expected: u32,
    started_at_ms: u64,
    elapsed_ms: u64,
    score: Option<u32>,
    active: bool,
    events: Vec<MatrixEvent>,
}

impl MatrixEngine {
    pub fn new(rng: GameRng) -> (Self, FinishHandle) {
        let (notifier, handle) = finish_channel();
        let engine = Self {
            rng,
            timers: Scheduler::new(),
            notifier,
            order: Vec::new(),
            next_expected: 1,
            started_at_ms: 0,
            elapsed_ms: 0,
            score: None,
            active: false,
            events: Vec::new(),
        };
        (engine, handle)
    }

    pub fn start(&mut self) {
        self.timers.cancel_all();
        let numbers: Vec<u32> = (1..=GRID_SIZE).collect();
        self.order = shuffled(&mut self.rng, &numbers);
        self.next_expected = 1;
        self.score = None;
        self.active = true;
        self.started_at_ms = self.timers.now_ms();
        self.elapsed_ms = 0;
        self.timers
            .schedule_coalescing(CLOCK_PERIOD_MS, MatrixTask::ClockTick);
        self.events.push(MatrixEvent::GridReady {
            order: self.order.clone(),
        });
        info!("matrix game started");
    }

    pub fn tap(&mut self, number: u32) -> InputOutcome {
        if !self.active || number == 0 || number > GRID_SIZE {
            return InputOutcome::Ignored;
        }

        if number != self.next_expected {
            self.events.push(MatrixEvent::Miss { number });
            return InputOutcome::Incorrect;
        }

        self.next_expected += 1;
        self.events.push(MatrixEvent::Hit { number });

        if self.next_expected > GRID_SIZE {
            self.clear();
            InputOutcome::Completed
        } else {
            InputOutcome::Correct
        }
    }

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
        self.active = false;
        debug!(dropped, "matrix game stopped");
    }

    pub fn drain_events(&mut self) -> Vec<MatrixEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> MatrixState {
        MatrixState {
            order: self.order.clone(),
            next_expected: self.next_expected,
            progress: self.next_expected - 1,
            elapsed_ms: self.elapsed_ms,
            score: self.score,
            active: self.active,
        }
    }

    pub fn order(&self) -> &[u32] {
        &self.order
    }

    pub fn next_expected(&self) -> u32 {
        self.next_expected
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn now_ms(&self) -> u64 {
        self.timers.now_ms()
    }

    pub fn has_pending_timers(&self) -> bool {
        !self.timers.is_idle()
    }

    fn clear(&mut self) {
        self.active = false;
        self.timers.cancel_all();
        self.elapsed_ms = self.timers.now_ms() - self.started_at_ms;
        let score = completion_score(self.elapsed_ms);
        self.score = Some(score);
        debug!(elapsed_ms = self.elapsed_ms, score, "matrix cleared");
        self.events.push(MatrixEvent::Cleared {
            elapsed_ms: self.elapsed_ms,
            score,
        });
        self.timers
            .schedule_once(FINISH_DELAY_MS, MatrixTask::Finish(score));
    }

    fn run_task(&mut self, task: MatrixTask) {
        match task {
            MatrixTask::ClockTick => {
                if !self.active {
                    return;
                }
                self.elapsed_ms = self.timers.now_ms() - self.started_at_ms;
                self.events.push(MatrixEvent::Elapsed {
                    elapsed_ms: self.elapsed_ms,
                });
            }
            MatrixTask::Finish(score) => {
                self.timers.cancel_all();
                if self.notifier.notify(score) {
                    info!(score, "matrix game finished");
                    self.events.push(MatrixEvent::Finished { score });
                }
            }
        }
    }
}
