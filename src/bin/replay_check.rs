//! Replay determinism checker.
//!
//! Reads a replay JSON file, runs it at a fine and a coarse elapse
//! granularity and reports whether the outcomes agree. Exits nonzero on
//! divergence, so it slots into CI over a corpus of recorded sessions.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use catalyst_core::Replay;

fn check(path: &str) -> Result<bool> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let replay: Replay =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    match replay.verify() {
        Ok(outcome) => {
            println!(
                "{path}: ok  checksum {:016x}  score {}  spawns {}  {}ms{}",
                outcome.checksum,
                outcome.score,
                outcome.spawn_count,
                outcome.moment.millis(),
                if outcome.game_over { "  (game over)" } else { "" },
            );
            Ok(true)
        }
        Err(mismatch) => {
            eprintln!("{path}: DIVERGED");
            eprintln!("  fine:   {:?}", mismatch.fine);
            eprintln!("  coarse: {:?}", mismatch.coarse);
            Ok(false)
        }
    }
}

fn main() -> Result<ExitCode> {
    let paths: Vec<String> = std::env::args().skip(1).collect();
    if paths.is_empty() {
        eprintln!("usage: replay-check <replay.json> [more.json ...]");
        return Ok(ExitCode::from(2));
    }

    let mut all_ok = true;
    for path in &paths {
        all_ok &= check(path)?;
    }
    Ok(if all_ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
