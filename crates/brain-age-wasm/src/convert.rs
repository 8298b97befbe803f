use brain_age_core::rng::{seeded_rng, GameRng};
use brain_age_core::InputOutcome;
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Largest integer a JS number holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// `performance.now()` style timestamp to whole milliseconds
pub(crate) fn to_ms(now: f64) -> u64 {
    if now.is_finite() && now > 0.0 {
        now.min(MAX_SAFE_INTEGER) as u64
    } else {
        0
    }
}

pub(crate) fn to_seed(seed: Option<f64>) -> Option<u64> {
    seed.filter(|s| s.is_finite() && *s >= 0.0)
        .map(|s| s.min(MAX_SAFE_INTEGER) as u64)
}

pub(crate) fn engine_rng(seed: Option<f64>) -> GameRng {
    seeded_rng(to_seed(seed))
}

pub(crate) fn outcome_name(outcome: InputOutcome) -> String {
    match outcome {
        InputOutcome::Ignored => "ignored",
        InputOutcome::Accepted => "accepted",
        InputOutcome::Correct => "correct",
        InputOutcome::Incorrect => "incorrect",
        InputOutcome::Completed => "completed",
    }
    .to_string()
}

pub(crate) fn to_js<T: Serialize + ?Sized>(value: &T) -> JsValue {
    serde_wasm_bindgen::to_value(value).unwrap_or(JsValue::NULL)
}
