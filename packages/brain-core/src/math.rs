//! Math Challenge engine
//!
//! A 60 second arithmetic sprint. Problems get harder as the clock runs
//! down and later answers are worth more:
//!
//! | time left | problems                                   | points |
//! |-----------|--------------------------------------------|--------|
//! | > 45 s    | single-digit addition                      | 10     |
//! | > 30 s    | addition or non-negative subtraction       | 10     |
//! | ≤ 30 s    | multiplication, two-digit `-` and `+`      | 20     |
//! | ≤ 15 s    | same as above                              | 30     |

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::finish::{finish_channel, FinishHandle, FinishNotifier};
use crate::rng::{random_int, GameRng};
use crate::timer::Scheduler;
use crate::types::InputOutcome;

// ==================== Constants ====================

pub const TIME_LIMIT_SECS: u32 = 60;
const COUNTDOWN_PERIOD_MS: u64 = 1000;
pub const MAX_INPUT_DIGITS: usize = 3;
pub const FINISH_DELAY_MS: u64 = 2000;

/// The timer display turns urgent at this point
const URGENT_SECS: u32 = 10;

const EASY_PHASE_ABOVE: u32 = 45;
const MEDIUM_PHASE_ABOVE: u32 = 30;
const TOP_TIER_AT_OR_BELOW: u32 = 15;

// Hard phase operator split: [0, 0.3) multiply, [0.3, 0.6) subtract, rest add
const HARD_MUL_CUTOFF: f64 = 0.3;
const HARD_SUB_CUTOFF: f64 = 0.6;

// ==================== Problems ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Add,
    Sub,
    Mul,
}

impl Operator {
    pub fn apply(&self, a: u32, b: u32) -> u32 {
        match self {
            Operator::Add => a + b,
            Operator::Sub => a.saturating_sub(b),
            Operator::Mul => a * b,
        }
    }

    /// Symbol as shown to the player
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '×',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Problem {
    pub a: u32,
    pub b: u32,
    pub op: Operator,
    pub answer: u32,
}

impl Problem {
    pub fn new(a: u32, op: Operator, b: u32) -> Self {
        Self {
            a,
            b,
            op,
            answer: op.apply(a, b),
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.a, self.op.symbol(), self.b)
    }
}

/// Draw a problem for the difficulty phase implied by `time_left`
pub fn generate_problem<R: Rng + ?Sized>(rng: &mut R, time_left: u32) -> Problem {
    if time_left > EASY_PHASE_ABOVE {
        let a = random_int(rng, 1, 9);
        let b = random_int(rng, 1, 9);
        Problem::new(a, Operator::Add, b)
    } else if time_left > MEDIUM_PHASE_ABOVE {
        if rng.gen_bool(0.5) {
            let a = random_int(rng, 5, 19);
            let b = random_int(rng, 1, a - 1);
            Problem::new(a, Operator::Sub, b)
        } else {
            let a = random_int(rng, 1, 20);
            let b = random_int(rng, 1, 20);
            Problem::new(a, Operator::Add, b)
        }
    } else {
        let r: f64 = rng.gen();
        if r < HARD_MUL_CUTOFF {
            let a = random_int(rng, 2, 10);
            let b = random_int(rng, 2, 10);
            Problem::new(a, Operator::Mul, b)
        } else if r < HARD_SUB_CUTOFF {
            let a = random_int(rng, 10, 49);
            let b = random_int(rng, 1, a - 1);
            Problem::new(a, Operator::Sub, b)
        } else {
            let a = random_int(rng, 10, 49);
            let b = random_int(rng, 10, 49);
            Problem::new(a, Operator::Add, b)
        }
    }
}

/// Points for a correct answer given with `time_left` seconds remaining
pub fn points_for(time_left: u32) -> u32 {
    if time_left <= TOP_TIER_AT_OR_BELOW {
        30
    } else if time_left <= MEDIUM_PHASE_ABOVE {
        20
    } else {
        10
    }
}

// ==================== Input ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MathKey {
    Digit(u8),
    Delete,
    Submit,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown math key: {0:?}")]
pub struct KeyParseError(pub String);

/// Accepts the on-screen keypad values (`"0"`-`"9"`, `"del"`, `"enter"`)
/// and keyboard key names (`"Backspace"`, `"Enter"`).
impl FromStr for MathKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "del" | "Backspace" | "Delete" => Ok(MathKey::Delete),
            "enter" | "Enter" => Ok(MathKey::Submit),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_digit() => Ok(MathKey::Digit(c as u8 - b'0')),
                    _ => Err(KeyParseError(s.to_string())),
                }
            }
        }
    }
}

// ==================== Data Structures ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MathEvent {
    ProblemChanged { problem: Problem, text: String },
    BufferChanged { buffer: String },
    Correct { points: u32, score: u32 },
    Incorrect,
    #[serde(rename_all = "camelCase")]
    Tick { time_left: u32, urgent: bool },
    TimeUp { score: u32 },
    Finished { score: u32 },
}

/// Snapshot for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MathState {
    pub time_left: u32,
    pub score: u32,
    pub buffer: String,
    pub problem: Option<Problem>,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MathTask {
    Countdown,
    Finish(u32),
}

// ==================== Engine ====================

pub struct MathEngine {
    rng: GameRng,
    timers: Scheduler<MathTask>,
    notifier: FinishNotifier,
    time_left: u32,
    score: u32,
    buffer: String,
    problem: Option<Problem>,
    active: bool,
    events: Vec<MathEvent>,
}

impl MathEngine {
    pub fn new(rng: GameRng) -> (Self, FinishHandle) {
        let (notifier, handle) = finish_channel();
        let engine = Self {
            rng,
            timers: Scheduler::new(),
            notifier,
            time_left: TIME_LIMIT_SECS,
            score: 0,
            buffer: String::with_capacity(MAX_INPUT_DIGITS),
            problem: None,
            active: false,
            events: Vec::new(),
        };
        (engine, handle)
    }

    pub fn start(&mut self) {
        self.timers.cancel_all();
        self.score = 0;
        self.time_left = TIME_LIMIT_SECS;
        self.active = true;
        self.next_problem();
        self.timers
            .schedule_repeating(COUNTDOWN_PERIOD_MS, MathTask::Countdown);
        info!(seconds = TIME_LIMIT_SECS, "math game started");
    }

    pub fn input(&mut self, key: MathKey) -> InputOutcome {
        if !self.active {
            return InputOutcome::Ignored;
        }

        match key {
            MathKey::Digit(d) if d <= 9 => {
                if self.buffer.len() >= MAX_INPUT_DIGITS {
                    return InputOutcome::Ignored;
                }
                self.buffer.push(char::from(b'0' + d));
                self.buffer_changed();
                InputOutcome::Accepted
            }
            MathKey::Digit(_) => InputOutcome::Ignored,
            MathKey::Delete => {
                if self.buffer.pop().is_none() {
                    return InputOutcome::Ignored;
                }
                self.buffer_changed();
                InputOutcome::Accepted
            }
            MathKey::Submit => self.submit(),
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
        debug!(dropped, "math game stopped");
    }

    pub fn drain_events(&mut self) -> Vec<MathEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn state(&self) -> MathState {
        MathState {
            time_left: self.time_left,
            score: self.score,
            buffer: self.buffer.clone(),
            problem: self.problem,
            active: self.active,
        }
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn problem(&self) -> Option<Problem> {
        self.problem
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

    fn submit(&mut self) -> InputOutcome {
        if self.buffer.is_empty() {
            return InputOutcome::Ignored;
        }
        let Some(problem) = self.problem else {
            return InputOutcome::Ignored;
        };

        let correct = self
            .buffer
            .parse::<u32>()
            .map(|v| v == problem.answer)
            .unwrap_or(false);

        if correct {
            let points = points_for(self.time_left);
            self.score += points;
            debug!(%problem, points, score = self.score, "math answer correct");
            self.events.push(MathEvent::Correct {
                points,
                score: self.score,
            });
            self.next_problem();
            InputOutcome::Correct
        } else {
            debug!(%problem, input = %self.buffer, "math answer wrong");
            self.events.push(MathEvent::Incorrect);
            self.buffer.clear();
            self.buffer_changed();
            InputOutcome::Incorrect
        }
    }

    fn next_problem(&mut self) {
        let problem = generate_problem(&mut self.rng, self.time_left);
        self.problem = Some(problem);
        self.events.push(MathEvent::ProblemChanged {
            problem,
            text: problem.to_string(),
        });
        self.buffer.clear();
        self.buffer_changed();
    }

    fn buffer_changed(&mut self) {
        self.events.push(MathEvent::BufferChanged {
            buffer: self.buffer.clone(),
        });
    }

    fn run_task(&mut self, task: MathTask) {
        match task {
            MathTask::Countdown => {
                if !self.active {
                    return;
                }
                self.time_left = self.time_left.saturating_sub(1);
                self.events.push(MathEvent::Tick {
                    time_left: self.time_left,
                    urgent: self.time_left <= URGENT_SECS,
                });
                if self.time_left == 0 {
                    self.time_up();
                }
            }
            MathTask::Finish(score) => {
                self.timers.cancel_all();
                if self.notifier.notify(score) {
                    info!(score, "math game finished");
                    self.events.push(MathEvent::Finished { score });
                }
            }
        }
    }

    fn time_up(&mut self) {
        self.active = false;
        self.timers.cancel_all();
        self.events.push(MathEvent::TimeUp { score: self.score });
        self.timers
            .schedule_once(FINISH_DELAY_MS, MathTask::Finish(self.score));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finish::FinishPoll;
    use crate::rng::seeded_rng;

    fn started(seed: u64) -> (MathEngine, FinishHandle) {
        let (mut engine, handle) = MathEngine::new(seeded_rng(Some(seed)));
        engine.start();
        (engine, handle)
    }

    fn type_answer(engine: &mut MathEngine, answer: u32) {
        for c in answer.to_string().chars() {
            engine.input(MathKey::Digit(c as u8 - b'0'));
        }
    }

    #[test]
    fn test_problem_answers_are_consistent_in_every_phase() {
        let mut rng = seeded_rng(Some(42));
        for time_left in (0..=TIME_LIMIT_SECS).rev() {
            for _ in 0..200 {
                let p = generate_problem(&mut rng, time_left);
                let expected = match p.op {
                    Operator::Add => p.a + p.b,
                    Operator::Sub => {
                        assert!(p.b < p.a, "{} must stay positive", p);
                        p.a - p.b
                    }
                    Operator::Mul => p.a * p.b,
                };
                assert_eq!(p.answer, expected);
                assert!(p.answer > 0);
            }
        }
    }

    #[test]
    fn test_operand_ranges_per_phase() {
        let mut rng = seeded_rng(Some(5));
        for _ in 0..500 {
            let easy = generate_problem(&mut rng, 50);
            assert_eq!(easy.op, Operator::Add);
            assert!((1..=9).contains(&easy.a) && (1..=9).contains(&easy.b));

            let medium = generate_problem(&mut rng, 40);
            match medium.op {
                Operator::Sub => assert!((5..=19).contains(&medium.a) && medium.b >= 1),
                Operator::Add => assert!((1..=20).contains(&medium.a) && (1..=20).contains(&medium.b)),
                Operator::Mul => panic!("no multiplication before the hard phase"),
            }

            let hard = generate_problem(&mut rng, 20);
            match hard.op {
                Operator::Mul => assert!((2..=10).contains(&hard.a) && (2..=10).contains(&hard.b)),
                Operator::Sub => assert!((10..=49).contains(&hard.a) && hard.b >= 1),
                Operator::Add => assert!((10..=49).contains(&hard.a) && (10..=49).contains(&hard.b)),
            }
        }
    }

    #[test]
    fn test_phase_boundaries() {
        let mut rng = seeded_rng(Some(11));
        let mut hard_ops = Vec::new();
        for _ in 0..500 {
            let p = generate_problem(&mut rng, 46);
            assert_eq!(p.op, Operator::Add);
            assert!((1..=9).contains(&p.a) && (1..=9).contains(&p.b));

            assert_ne!(generate_problem(&mut rng, 45).op, Operator::Mul);

            let medium = generate_problem(&mut rng, 31);
            assert_ne!(medium.op, Operator::Mul);
            if medium.op == Operator::Sub {
                assert!(medium.a <= 19);
            }

            let hard = generate_problem(&mut rng, 30);
            if hard.op != Operator::Mul {
                assert!(hard.a >= 10);
            }
            hard_ops.push(hard.op);
        }
        assert!(hard_ops.contains(&Operator::Mul));
    }

    #[test]
    fn test_hard_phase_uses_all_operators() {
        let mut rng = seeded_rng(Some(9));
        let mut seen = [false; 3];
        for _ in 0..300 {
            match generate_problem(&mut rng, 10).op {
                Operator::Add => seen[0] = true,
                Operator::Sub => seen[1] = true,
                Operator::Mul => seen[2] = true,
            }
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn test_points_by_tier() {
        assert_eq!(points_for(60), 10);
        assert_eq!(points_for(31), 10);
        assert_eq!(points_for(30), 20);
        assert_eq!(points_for(16), 20);
        assert_eq!(points_for(15), 30);
        assert_eq!(points_for(1), 30);
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("7".parse::<MathKey>(), Ok(MathKey::Digit(7)));
        assert_eq!("0".parse::<MathKey>(), Ok(MathKey::Digit(0)));
        assert_eq!("del".parse::<MathKey>(), Ok(MathKey::Delete));
        assert_eq!("Backspace".parse::<MathKey>(), Ok(MathKey::Delete));
        assert_eq!("enter".parse::<MathKey>(), Ok(MathKey::Submit));
        assert_eq!("Enter".parse::<MathKey>(), Ok(MathKey::Submit));
        assert!("12".parse::<MathKey>().is_err());
        assert!("x".parse::<MathKey>().is_err());
        assert!("".parse::<MathKey>().is_err());
    }

    #[test]
    fn test_start_state() {
        let (engine, _handle) = started(1);
        assert_eq!(engine.time_left(), 60);
        assert_eq!(engine.score(), 0);
        assert!(engine.is_active());
        assert_eq!(engine.problem().map(|p| p.op), Some(Operator::Add));
        assert!(engine.buffer().is_empty());
    }

    #[test]
    fn test_correct_answer_at_fifty_seconds() {
        let (mut engine, _handle) = started(2);
        engine.time_left = 50;
        engine.problem = Some(Problem::new(4, Operator::Add, 3));
        assert_eq!(engine.problem().map(|p| p.answer), Some(7));

        assert_eq!(engine.input(MathKey::Digit(7)), InputOutcome::Accepted);
        assert_eq!(engine.input(MathKey::Submit), InputOutcome::Correct);

        assert_eq!(engine.score(), 10);
        assert!(engine.buffer().is_empty());
        let next = engine.problem().expect("a new problem");
        assert_eq!(next.answer, next.op.apply(next.a, next.b));
    }

    #[test]
    fn test_wrong_answer_clears_buffer_only() {
        let (mut engine, _handle) = started(3);
        let problem = engine.problem().unwrap();
        type_answer(&mut engine, problem.answer + 1);
        assert_eq!(engine.input(MathKey::Submit), InputOutcome::Incorrect);
        assert_eq!(engine.score(), 0);
        assert!(engine.buffer().is_empty());
        assert_eq!(engine.problem(), Some(problem));
        assert_eq!(engine.time_left(), 60);
    }

    #[test]
    fn test_buffer_editing() {
        let (mut engine, _handle) = started(4);
        assert_eq!(engine.input(MathKey::Submit), InputOutcome::Ignored);
        assert_eq!(engine.input(MathKey::Delete), InputOutcome::Ignored);

        for d in [1, 2, 3] {
            assert_eq!(engine.input(MathKey::Digit(d)), InputOutcome::Accepted);
        }
        assert_eq!(engine.input(MathKey::Digit(4)), InputOutcome::Ignored);
        assert_eq!(engine.buffer(), "123");

        assert_eq!(engine.input(MathKey::Delete), InputOutcome::Accepted);
        assert_eq!(engine.buffer(), "12");
        assert_eq!(engine.input(MathKey::Digit(12)), InputOutcome::Ignored);
        assert_eq!(engine.buffer(), "12");
    }

    #[test]
    fn test_points_follow_remaining_time() {
        let (mut engine, _handle) = started(5);
        engine.advance(45_000);
        assert_eq!(engine.time_left(), 15);

        let answer = engine.problem().unwrap().answer;
        type_answer(&mut engine, answer);
        engine.input(MathKey::Submit);
        assert_eq!(engine.score(), 30);
    }

    #[test]
    fn test_countdown_ends_game_and_reports_once() {
        let (mut engine, mut handle) = started(6);
        engine.advance(59_999);
        assert_eq!(engine.time_left(), 1);
        assert!(engine.is_active());

        engine.advance(60_000);
        assert_eq!(engine.time_left(), 0);
        assert!(!engine.is_active());
        assert_eq!(engine.input(MathKey::Digit(1)), InputOutcome::Ignored);
        assert_eq!(handle.poll_score(), FinishPoll::Pending);

        engine.advance(62_000);
        assert_eq!(handle.poll_score(), FinishPoll::Finished(0));
        assert!(!engine.has_pending_timers());

        let events = engine.drain_events();
        let finishes = events
            .iter()
            .filter(|e| matches!(e, MathEvent::Finished { .. }))
            .count();
        assert_eq!(finishes, 1);
        let ticks = events
            .iter()
            .filter(|e| matches!(e, MathEvent::Tick { .. }))
            .count();
        assert_eq!(ticks, 60);
    }

    #[test]
    fn test_urgent_flag_in_last_ten_seconds() {
        let (mut engine, _handle) = started(7);
        engine.advance(50_000);
        let urgent: Vec<bool> = engine
            .drain_events()
            .into_iter()
            .filter_map(|e| match e {
                MathEvent::Tick { urgent, .. } => Some(urgent),
                _ => None,
            })
            .collect();
        assert_eq!(urgent.len(), 50);
        assert!(!urgent[48]);
        assert!(urgent[49]);
    }

    #[test]
    fn test_stop_cancels_countdown() {
        let (mut engine, mut handle) = started(8);
        engine.stop();
        engine.advance(120_000);
        assert_eq!(engine.time_left(), 60);
        assert_eq!(handle.poll_score(), FinishPoll::Aborted);
    }
}
