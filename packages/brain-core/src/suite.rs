//! Suite driver
//!
//! Couples the [`SessionController`] with the engine currently being
//! played. The host calls `start_game` when the player leaves an intro
//! screen, forwards taps and keys, and calls `advance` with the current time;
//! finished scores flow to the controller on their own.

use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::finish::{FinishHandle, FinishPoll};
use crate::math::{MathEngine, MathEvent, MathKey};
use crate::matrix::{MatrixEngine, MatrixEvent};
use crate::memory::{MemoryEngine, MemoryEvent};
use crate::rng::{seeded_rng, GameRng};
use crate::session::{Screen, SessionController, SessionError, SessionState};
use crate::types::{GameId, InputOutcome};

/// Options for a suite instance
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuiteOptions {
    /// Seed for reproducible boards and problems; entropy when absent
    pub seed: Option<u64>,
}

/// The engine being played right now
pub enum ActiveGame {
    Memory(MemoryEngine),
    Math(MathEngine),
    Matrix(MatrixEngine),
}

/// Engine notification tagged with its game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "game", content = "event", rename_all = "camelCase")]
pub enum GameEvent {
    Memory(MemoryEvent),
    Math(MathEvent),
    Matrix(MatrixEvent),
}

impl ActiveGame {
    fn create(game: GameId, rng: GameRng) -> (Self, FinishHandle) {
        match game {
            GameId::Memory => {
                let (engine, handle) = MemoryEngine::new(rng);
                (ActiveGame::Memory(engine), handle)
            }
            GameId::Math => {
                let (engine, handle) = MathEngine::new(rng);
                (ActiveGame::Math(engine), handle)
            }
            GameId::Matrix => {
                let (engine, handle) = MatrixEngine::new(rng);
                (ActiveGame::Matrix(engine), handle)
            }
        }
    }

    pub fn game_id(&self) -> GameId {
        match self {
            ActiveGame::Memory(_) => GameId::Memory,
            ActiveGame::Math(_) => GameId::Math,
            ActiveGame::Matrix(_) => GameId::Matrix,
        }
    }

    fn start(&mut self) {
        match self {
            ActiveGame::Memory(e) => e.start(),
            ActiveGame::Math(e) => e.start(),
            ActiveGame::Matrix(e) => e.start(),
        }
    }

    fn advance(&mut self, now_ms: u64) {
        match self {
            ActiveGame::Memory(e) => e.advance(now_ms),
            ActiveGame::Math(e) => e.advance(now_ms),
            ActiveGame::Matrix(e) => e.advance(now_ms),
        }
    }

    fn stop(&mut self) {
        match self {
            ActiveGame::Memory(e) => e.stop(),
            ActiveGame::Math(e) => e.stop(),
            ActiveGame::Matrix(e) => e.stop(),
        }
    }

    fn drain_into(&mut self, out: &mut Vec<GameEvent>) {
        match self {
            ActiveGame::Memory(e) => out.extend(e.drain_events().into_iter().map(GameEvent::Memory)),
            ActiveGame::Math(e) => out.extend(e.drain_events().into_iter().map(GameEvent::Math)),
            ActiveGame::Matrix(e) => out.extend(e.drain_events().into_iter().map(GameEvent::Matrix)),
        }
    }
}

pub struct BrainAgeSuite {
    controller: SessionController,
    seeder: GameRng,
    active: Option<(ActiveGame, FinishHandle)>,
    /// Events of engines that already finished, not yet drained
    backlog: Vec<GameEvent>,
    now_ms: u64,
}

impl BrainAgeSuite {
    pub fn new(options: SuiteOptions) -> Self {
        Self {
            controller: SessionController::new(),
            seeder: seeded_rng(options.seed),
            active: None,
            backlog: Vec::new(),
            now_ms: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        self.controller.state()
    }

    pub fn active(&self) -> Option<&ActiveGame> {
        self.active.as_ref().map(|(game, _)| game)
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Home -> first intro
    pub fn begin(&mut self) -> Result<GameId, SessionError> {
        self.controller.begin_sequence()
    }

    /// Leave the intro screen and start its game at `now_ms`
    pub fn start_game(&mut self, now_ms: u64) -> Result<GameId, SessionError> {
        let game = self.controller.start_game()?;
        self.now_ms = self.now_ms.max(now_ms);

        let rng = GameRng::seed_from_u64(self.seeder.gen());
        let (mut engine, handle) = ActiveGame::create(game, rng);
        // Align the engine clock with the host before scheduling anything
        engine.advance(self.now_ms);
        engine.start();
        self.active = Some((engine, handle));
        Ok(game)
    }

    /// Run due timers; a finished game is recorded and dropped
    pub fn advance(&mut self, now_ms: u64) -> Screen {
        self.now_ms = self.now_ms.max(now_ms);

        let finished = match self.active.as_mut() {
            Some((engine, handle)) => {
                engine.advance(self.now_ms);
                handle.poll_score()
            }
            None => return self.controller.screen(),
        };

        match finished {
            FinishPoll::Pending => {}
            FinishPoll::Finished(score) => {
                self.retire_active();
                if let Err(err) = self.controller.handle_game_finished(score) {
                    warn!(error = %err, score, "finished score not recorded");
                }
            }
            FinishPoll::Aborted => {
                self.retire_active();
            }
        }
        self.controller.screen()
    }

    /// Tap on the memory board or the matrix grid at `now_ms`.
    /// Timers due by then run first, so the matrix clock reads the tap time.
    pub fn tap(&mut self, id: u32, now_ms: u64) -> InputOutcome {
        self.advance(now_ms);
        match self.active.as_mut() {
            Some((ActiveGame::Memory(e), _)) => e.tap(id),
            Some((ActiveGame::Matrix(e), _)) => e.tap(id),
            _ => InputOutcome::Ignored,
        }
    }

    /// Keypad or keyboard input for the math game at `now_ms`
    pub fn input(&mut self, key: MathKey, now_ms: u64) -> InputOutcome {
        self.advance(now_ms);
        match self.active.as_mut() {
            Some((ActiveGame::Math(e), _)) => e.input(key),
            _ => InputOutcome::Ignored,
        }
    }

    /// Stop the running engine, then clear the session
    pub fn reset(&mut self) {
        if let Some((mut engine, _)) = self.active.take() {
            debug!(game = %engine.game_id(), "stopping engine for reset");
            engine.stop();
        }
        self.backlog.clear();
        self.controller.reset();
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.backlog);
        if let Some((engine, _)) = self.active.as_mut() {
            engine.drain_into(&mut events);
        }
        events
    }

    fn retire_active(&mut self) {
        if let Some((mut engine, _)) = self.active.take() {
            engine.drain_into(&mut self.backlog);
        }
    }
}
