mod app;
mod games;
mod convert;

pub use app::*;
pub use games::*;

use wasm_bindgen::prelude::*;

#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Brain age for a total score, clamped to [20, 80]
#[wasm_bindgen]
pub fn brain_age_for_total(total_score: u32) -> u32 {
    brain_age_core::brain_age(total_score)
}
