use brain_age_core::math::MathKey;
use brain_age_core::memory::{hide_delay_ms, MemoryPhase, LEVEL_PAUSE_MS};
use brain_age_core::{
    ActiveGame, BrainAgeSuite, GameEvent, GameId, InputOutcome, MathEvent, MatrixEvent, MemoryEvent,
    Screen, SessionState, SuiteOptions,
};

fn suite(seed: u64) -> BrainAgeSuite {
    BrainAgeSuite::new(SuiteOptions { seed: Some(seed) })
}

fn memory(suite: &BrainAgeSuite) -> (MemoryPhase, u32, u32) {
    match suite.active() {
        Some(ActiveGame::Memory(e)) => (e.phase(), e.level(), e.target_count()),
        _ => panic!("memory game should be running"),
    }
}

/// Clear every memory level without a mistake, returning the clock
fn clear_memory(suite: &mut BrainAgeSuite, mut now: u64) -> u64 {
    for level in 1..=5 {
        now += hide_delay_ms(level);
        suite.advance(now);
        let (phase, current, count) = memory(suite);
        assert_eq!(phase, MemoryPhase::Recall);
        assert_eq!(current, level);
        for n in 1..=count {
            suite.tap(n, now);
        }
        if level < 5 {
            now += LEVEL_PAUSE_MS;
            suite.advance(now);
        }
    }
    now
}

#[test]
fn full_session_produces_brain_age() {
    let mut s = suite(31);
    assert_eq!(s.begin(), Ok(GameId::Memory));
    s.start_game(0).unwrap();

    let mut now = clear_memory(&mut s, 0);
    now += 1500;
    assert_eq!(s.advance(now), Screen::Intro(1));
    assert_eq!(s.state().results[0].score, 1650);

    // Math: answer three problems right away, then let the clock run out
    s.start_game(now).unwrap();
    for _ in 0..3 {
        let answer = match s.active() {
            Some(ActiveGame::Math(e)) => e.problem().unwrap().answer,
            _ => panic!("math game should be running"),
        };
        for c in answer.to_string().chars() {
            assert_eq!(s.input(c.to_string().parse::<MathKey>().unwrap(), now), InputOutcome::Accepted);
        }
        assert_eq!(s.input(MathKey::Submit, now), InputOutcome::Correct);
    }
    now += 62_000;
    assert_eq!(s.advance(now), Screen::Intro(2));
    assert_eq!(s.state().results[1].score, 30);

    // Matrix: one number per second
    s.start_game(now).unwrap();
    for n in 1..=25 {
        now += 1000;
        s.tap(n, now);
    }
    now += 2000;
    assert_eq!(s.advance(now), Screen::Result);

    let state = s.state();
    assert_eq!(state.results[2].score, 1200 - 25 * 15);
    let total = 1650 + 30 + 825;
    assert_eq!(state.total_score(), total);
    assert_eq!(state.brain_age, Some(80 - (total * 60 / 3500)));
}

#[test]
fn events_arrive_in_order_and_finish_once() {
    let mut s = suite(8);
    s.begin().unwrap();
    s.start_game(0).unwrap();
    let now = clear_memory(&mut s, 0);
    s.advance(now + 1500);

    let events = s.drain_events();
    assert!(matches!(
        events.first(),
        Some(GameEvent::Memory(MemoryEvent::LevelStarted { level: 1, .. }))
    ));
    let finished: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, GameEvent::Memory(MemoryEvent::Finished { .. })))
        .collect();
    assert_eq!(finished.len(), 1);
    assert!(matches!(events.last(), Some(GameEvent::Memory(MemoryEvent::Finished { score: 1650 }))));
    assert!(s.drain_events().is_empty());
}

#[test]
fn reset_during_math_leaves_no_running_timers() {
    let mut s = suite(12);
    s.begin().unwrap();
    s.start_game(0).unwrap();
    let now = clear_memory(&mut s, 0);
    s.advance(now + 1500);
    s.start_game(now + 1500).unwrap();
    s.advance(now + 10_000);

    s.reset();
    assert_eq!(s.state(), &SessionState::default());
    s.advance(now + 500_000);
    assert_eq!(s.state(), &SessionState::default());
    assert!(s.drain_events().is_empty());

    // A fresh run starts cleanly afterwards
    assert_eq!(s.begin(), Ok(GameId::Memory));
    s.start_game(now + 500_000).unwrap();
    assert_eq!(memory(&s).1, 1);
}

#[test]
fn matrix_misses_are_reported_but_harmless() {
    let mut s = suite(77);
    s.begin().unwrap();
    s.start_game(0).unwrap();
    let mut now = clear_memory(&mut s, 0) + 1500;
    s.advance(now);
    s.start_game(now).unwrap();
    now += 62_000;
    s.advance(now);
    s.start_game(now).unwrap();
    s.drain_events();

    assert_eq!(s.tap(2, now), InputOutcome::Incorrect);
    assert_eq!(s.tap(1, now), InputOutcome::Correct);
    let events = s.drain_events();
    assert!(events.contains(&GameEvent::Matrix(MatrixEvent::Miss { number: 2 })));
    assert!(events.contains(&GameEvent::Matrix(MatrixEvent::Hit { number: 1 })));
    assert!(!events.iter().any(|e| matches!(e, GameEvent::Math(MathEvent::Finished { .. }))));
}

#[test]
fn same_seed_same_session() {
    let mut a = suite(5);
    let mut b = suite(5);
    for s in [&mut a, &mut b] {
        s.begin().unwrap();
        s.start_game(0).unwrap();
    }
    let cards = |s: &BrainAgeSuite| match s.active() {
        Some(ActiveGame::Memory(e)) => e.cards().to_vec(),
        _ => Vec::new(),
    };
    assert_eq!(cards(&a), cards(&b));
    assert!(!cards(&a).is_empty());
}
