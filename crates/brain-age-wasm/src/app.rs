use brain_age_core::{
    ActiveGame, BrainAgeSuite, GameId, MathKey, SessionState, SuiteOptions,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::convert::{outcome_name, to_js, to_ms, to_seed};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IntroText {
    game_id: GameId,
    index: usize,
    title: &'static str,
    description: &'static str,
}

/// The whole test: intro screens, three games and the result
///
/// Every method that depends on time takes `now`, a `performance.now()`
/// timestamp. Call `tick` from `requestAnimationFrame` and render the
/// returned events.
#[wasm_bindgen]
pub struct BrainAgeApp {
    suite: BrainAgeSuite,
}

#[wasm_bindgen]
impl BrainAgeApp {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Self {
        Self {
            suite: BrainAgeSuite::new(SuiteOptions { seed: to_seed(seed) }),
        }
    }

    /// Build from a `{ seed }` options object
    #[wasm_bindgen]
    pub fn with_options(options_js: JsValue) -> Self {
        let options: SuiteOptions = serde_wasm_bindgen::from_value(options_js).unwrap_or_default();
        Self {
            suite: BrainAgeSuite::new(options),
        }
    }

    /// Home -> first intro. Returns the game id, or `undefined` when not on Home.
    #[wasm_bindgen]
    pub fn begin(&mut self) -> Option<String> {
        self.suite.begin().ok().map(|g| g.as_str().to_string())
    }

    /// Start the game whose intro is showing
    #[wasm_bindgen]
    pub fn start_game(&mut self, now: f64) -> Option<String> {
        self.suite
            .start_game(to_ms(now))
            .ok()
            .map(|g| g.as_str().to_string())
    }

    /// Advance timers and return pending events (`GameEvent[]`)
    #[wasm_bindgen]
    pub fn tick(&mut self, now: f64) -> JsValue {
        self.suite.advance(to_ms(now));
        to_js(&self.suite.drain_events())
    }

    #[wasm_bindgen]
    pub fn tap(&mut self, id: u32, now: f64) -> String {
        outcome_name(self.suite.tap(id, to_ms(now)))
    }

    /// Keypad value (`"0"`-`"9"`, `"del"`, `"enter"`) or keyboard key name
    #[wasm_bindgen]
    pub fn input(&mut self, key: &str, now: f64) -> String {
        let now_ms = to_ms(now);
        match key.parse::<MathKey>() {
            Ok(key) => outcome_name(self.suite.input(key, now_ms)),
            Err(_) => {
                self.suite.advance(now_ms);
                outcome_name(brain_age_core::InputOutcome::Ignored)
            }
        }
    }

    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.suite.reset();
    }

    /// `SessionState` snapshot
    #[wasm_bindgen]
    pub fn state(&self) -> JsValue {
        to_js::<SessionState>(self.suite.state())
    }

    /// Snapshot of the running game, or `null`
    #[wasm_bindgen]
    pub fn game_state(&self) -> JsValue {
        match self.suite.active() {
            Some(ActiveGame::Memory(e)) => to_js(&e.state()),
            Some(ActiveGame::Math(e)) => to_js(&e.state()),
            Some(ActiveGame::Matrix(e)) => to_js(&e.state()),
            None => JsValue::NULL,
        }
    }

    #[wasm_bindgen]
    pub fn brain_age(&self) -> Option<u32> {
        self.suite.state().brain_age
    }

    #[wasm_bindgen]
    pub fn total_score(&self) -> u32 {
        self.suite.state().total_score()
    }

    /// Title and instructions for the intro screen of game `index`
    #[wasm_bindgen]
    pub fn intro(&self, index: usize) -> JsValue {
        match GameId::from_index(index) {
            Some(game_id) => to_js(&IntroText {
                game_id,
                index,
                title: game_id.title(),
                description: game_id.description(),
            }),
            None => JsValue::NULL,
        }
    }
}
