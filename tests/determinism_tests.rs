//! End-to-end determinism tests: recorded sessions must reproduce
//! bit-for-bit regardless of how callers slice logical time.

use catalyst_core::{Command, GameRng, Moment, Recorder, Replay};

/// Drive a recorder through a pseudo-random session of steering, drops,
/// bursts and cancels. The driver RNG is separate from the game seed.
fn random_session(game_seed: u32, driver_seed: u32, drops: u32) -> Recorder {
    let mut recorder = Recorder::start(GameRng::seeded(game_seed).state(), 4);
    let mut driver = GameRng::seeded(driver_seed);
    let mut at = 0u64;

    for _ in 0..drops {
        if recorder.is_game_over() {
            break;
        }
        for _ in 0..driver.next_int32(5) {
            at += 20 + driver.next_int32(100) as u64;
            let steer = match driver.next_int32(4) {
                0 => Command::Left,
                1 => Command::Right,
                2 => Command::RotateCw,
                _ => Command::RotateCcw,
            };
            recorder.handle_command(steer, Moment(at));
        }
        at += 30;
        if driver.next_int32(4) == 0 {
            recorder.handle_command(Command::BurstBegin, Moment(at));
            if driver.next_int32(2) == 0 {
                at += driver.next_int32(700) as u64;
                recorder.handle_command(Command::BurstCancel, Moment(at));
            }
        } else {
            recorder.handle_command(Command::Plummet, Moment(at));
        }
        at += 500 + driver.next_int32(4_000) as u64;
        recorder.elapse(Moment(at));
    }
    recorder
}

#[test]
fn test_random_sessions_replay_identically() {
    for (game_seed, driver_seed) in [(1, 2), (33, 44), (500, 501)] {
        let recorder = random_session(game_seed, driver_seed, 40);
        let outcome = recorder
            .replay()
            .verify()
            .unwrap_or_else(|m| panic!("seed pair ({game_seed},{driver_seed}): {m}"));
        // The replay reproduces the live session's scoring.
        assert_eq!(outcome.score, recorder.state().score());
        assert_eq!(outcome.spawn_count, recorder.state().spawn_count());
    }
}

#[test]
fn test_same_seed_same_session_twice() {
    let a = random_session(7, 9, 25);
    let b = random_session(7, 9, 25);
    assert_eq!(a.state().grid().checksum(), b.state().grid().checksum());
    assert_eq!(a.state().score(), b.state().score());
    assert_eq!(a.replay(), b.replay());
}

#[test]
fn test_different_seeds_diverge() {
    let a = random_session(7, 9, 25);
    let b = random_session(8, 9, 25);
    // Same commands, different deck and board: the fields must differ.
    assert_ne!(a.state().grid().checksum(), b.state().grid().checksum());
}

#[test]
fn test_replay_survives_serialization() {
    let recorder = random_session(21, 5, 30);
    let json = serde_json::to_string_pretty(recorder.replay()).unwrap();
    let restored: Replay = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.run(250), recorder.replay().run(250));
}

#[test]
fn test_ineffective_commands_do_not_affect_the_outcome_timing() {
    // Commands rejected live (steering mid-cascade) are still in the log;
    // replaying them must elapse the same moments and land identically.
    let mut recorder = Recorder::start(GameRng::seeded(64).state(), 3);
    recorder.handle_command(Command::Plummet, Moment(100));
    // These hit the resolution phase and report no effect.
    assert!(!recorder.handle_command(Command::Left, Moment(110)));
    assert!(!recorder.handle_command(Command::RotateCw, Moment(120)));
    recorder.elapse(Moment(20_000));

    let outcome = recorder.replay().verify().unwrap();
    assert_eq!(outcome.checksum, recorder.state().grid().checksum());
}
