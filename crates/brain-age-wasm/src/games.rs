//! Single-game wrappers for standalone practice

use brain_age_core::{FinishHandle, MathEngine, MathKey, MatrixEngine, MemoryEngine};
use wasm_bindgen::prelude::*;

use crate::convert::{engine_rng, outcome_name, to_js, to_ms};

#[wasm_bindgen]
pub struct MemoryGame {
    engine: MemoryEngine,
    finish: FinishHandle,
}

#[wasm_bindgen]
impl MemoryGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Self {
        let (engine, finish) = MemoryEngine::new(engine_rng(seed));
        Self { engine, finish }
    }

    #[wasm_bindgen]
    pub fn start(&mut self, now: f64) {
        self.engine.advance(to_ms(now));
        self.engine.start();
    }

    /// Advance timers and return pending `MemoryEvent[]`
    #[wasm_bindgen]
    pub fn tick(&mut self, now: f64) -> JsValue {
        self.engine.advance(to_ms(now));
        to_js(&self.engine.drain_events())
    }

    #[wasm_bindgen]
    pub fn tap(&mut self, number: u32, now: f64) -> String {
        self.engine.advance(to_ms(now));
        outcome_name(self.engine.tap(number))
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    #[wasm_bindgen]
    pub fn state(&self) -> JsValue {
        to_js(&self.engine.state())
    }

    /// Final score once the game has reported it
    #[wasm_bindgen]
    pub fn finished_score(&mut self) -> Option<u32> {
        self.finish.score()
    }
}

#[wasm_bindgen]
pub struct MathGame {
    engine: MathEngine,
    finish: FinishHandle,
}

#[wasm_bindgen]
impl MathGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Self {
        let (engine, finish) = MathEngine::new(engine_rng(seed));
        Self { engine, finish }
    }

    #[wasm_bindgen]
    pub fn start(&mut self, now: f64) {
        self.engine.advance(to_ms(now));
        self.engine.start();
    }

    /// Advance timers and return pending `MathEvent[]`
    #[wasm_bindgen]
    pub fn tick(&mut self, now: f64) -> JsValue {
        self.engine.advance(to_ms(now));
        to_js(&self.engine.drain_events())
    }

    #[wasm_bindgen]
    pub fn input(&mut self, key: &str, now: f64) -> String {
        self.engine.advance(to_ms(now));
        match key.parse::<MathKey>() {
            Ok(key) => outcome_name(self.engine.input(key)),
            Err(_) => outcome_name(brain_age_core::InputOutcome::Ignored),
        }
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    #[wasm_bindgen]
    pub fn state(&self) -> JsValue {
        to_js(&self.engine.state())
    }

    #[wasm_bindgen]
    pub fn finished_score(&mut self) -> Option<u32> {
        self.finish.score()
    }
}

#[wasm_bindgen]
pub struct MatrixGame {
    engine: MatrixEngine,
    finish: FinishHandle,
}

#[wasm_bindgen]
impl MatrixGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: Option<f64>) -> Self {
        let (engine, finish) = MatrixEngine::new(engine_rng(seed));
        Self { engine, finish }
    }

    #[wasm_bindgen]
    pub fn start(&mut self, now: f64) {
        self.engine.advance(to_ms(now));
        self.engine.start();
    }

    /// Advance timers and return pending `MatrixEvent[]`
    #[wasm_bindgen]
    pub fn tick(&mut self, now: f64) -> JsValue {
        self.engine.advance(to_ms(now));
        to_js(&self.engine.drain_events())
    }

    #[wasm_bindgen]
    pub fn tap(&mut self, number: u32, now: f64) -> String {
        self.engine.advance(to_ms(now));
        outcome_name(self.engine.tap(number))
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    #[wasm_bindgen]
    pub fn state(&self) -> JsValue {
        to_js(&self.engine.state())
    }

    #[wasm_bindgen]
    pub fn finished_score(&mut self) -> Option<u32> {
        self.finish.score()
    }
}
