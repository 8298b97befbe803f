//! Batch simulation of brain age sessions.
//!
//! Configured through the environment:
//! `BRAIN_AGE_SESSIONS`, `BRAIN_AGE_SEED`, `BRAIN_AGE_ACCURACY`,
//! `BRAIN_AGE_REACTION_MS`, `RUST_LOG`.
//!
//! Prints a JSON summary on stdout.

use std::time::Instant;

use brain_age_core::config::Config;
use brain_age_core::logging::init_tracing;
use brain_age_core::simulation::{simulate_batch, summarize};

fn main() {
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("invalid configuration: {err}");
            std::process::exit(2);
        }
    };
    init_tracing(&config.log_level);

    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    tracing::info!(
        sessions = config.sessions,
        seed,
        accuracy = config.profile.accuracy,
        reaction_ms = config.profile.reaction_ms,
        "starting simulation"
    );

    let started = Instant::now();
    let reports = simulate_batch(config.sessions, seed, &config.profile);
    let summary = summarize(&reports);
    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        mean_age = summary.mean_age,
        "simulation finished"
    );

    match serde_json::to_string_pretty(&summary) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialize summary");
            std::process::exit(1);
        }
    }
}
