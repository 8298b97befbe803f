//! # brain-age-core - brain age mini-game rules
//!
//! Pure Rust rules for the three timed cognitive mini-games and the session
//! controller that turns their scores into a "brain age":
//!
//! - **Memory** - numbers flash on a board, then are tapped back in order
//! - **Math** - a 60 second arithmetic sprint with a difficulty ramp
//! - **Matrix** - tap 1 to 25 on a shuffled grid as fast as possible
//!
//! ## Design
//!
//! - **No display** - engines emit events and snapshots, never touch a DOM
//! - **Owned timers** - every interval and deferred step lives in an
//!   engine-owned [`Scheduler`] and is cancelled on finish or stop
//! - **Single-fire finish** - final scores travel through a oneshot channel
//! - **Injected randomness** - each engine owns a seeded `ChaCha8Rng`
//!
//! ## Modules
//!
//! - [`rng`] - uniform draws and Fisher-Yates shuffle
//! - [`timer`] - virtual clock with cancellable tasks
//! - [`finish`] - completion channel
//! - [`memory`], [`math`], [`matrix`] - the engines
//! - [`session`] - screen sequencing and brain age aggregate
//! - [`suite`] - controller plus the running engine
//! - [`simulation`] - automated player for balancing runs
//! - [`config`] - environment configuration for the simulation binary
//! - `logging` - tracing subscriber setup (`cli` feature)
//! - [`types`] - shared ids and results
//!
//! ## Example
//!
//! ```rust
//! use brain_age_core::{BrainAgeSuite, Screen, SuiteOptions};
//!
//! let mut suite = BrainAgeSuite::new(SuiteOptions { seed: Some(7) });
//! suite.begin().unwrap();
//! suite.start_game(0).unwrap();
//! assert_eq!(suite.state().screen, Screen::Playing(0));
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod finish;
#[cfg(feature = "cli")]
pub mod logging;
pub mod math;
pub mod matrix;
pub mod memory;
pub mod rng;
pub mod session;
pub mod simulation;
pub mod suite;
pub mod timer;
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use types::*;

pub use finish::{finish_channel, FinishHandle, FinishNotifier, FinishPoll};
pub use math::{MathEngine, MathEvent, MathKey, MathState, Operator, Problem};
pub use matrix::{MatrixEngine, MatrixEvent, MatrixState};
pub use memory::{Card, MemoryEngine, MemoryEvent, MemoryPhase, MemoryState};
pub use session::{brain_age, Screen, SessionController, SessionError, SessionState};
pub use suite::{ActiveGame, BrainAgeSuite, GameEvent, SuiteOptions};
pub use timer::{Scheduler, TaskId};
