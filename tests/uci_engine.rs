//! Integration tests for the UCI process adapter
//!
//! A small shell script plays the engine: it answers the handshake, takes half
//! a second over its first search and answers later searches immediately. That
//! is enough to reproduce a reply arriving after the game it was meant for.

#![cfg(unix)]

use chess_practice::game::ai::{AiConfig, EngineProfile, UciEngine};
use chess_practice::surface::PlaySurface;
use chess_practice::{ShakmatyRules, Side, Square};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

const TICK: Duration = Duration::from_millis(10);
const PATIENCE: Duration = Duration::from_secs(5);

const SLOW_FIRST_SEARCH: &str = r#"#!/bin/sh
searches=0
while read -r line; do
    case "$line" in
        uci) echo "id name Fake"; echo "uciok" ;;
        isready) echo "readyok" ;;
        go*)
            searches=$((searches + 1))
            if [ "$searches" -eq 1 ]; then
                sleep 0.5
                echo "bestmove e7e5"
            else
                echo "bestmove g8f6"
            fi
            ;;
        quit) exit 0 ;;
    esac
done
"#;

fn sq(name: &str) -> Square {
    name.parse().unwrap()
}

fn fake_engine(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "chess-practice-uci-{}-{}",
        std::process::id(),
        name
    ));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("engine.sh");
    fs::write(&path, SLOW_FIRST_SEARCH).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn play_surface(path: &PathBuf) -> PlaySurface<ShakmatyRules, UciEngine> {
    let config = AiConfig {
        humanize_delay: Duration::ZERO,
        ..AiConfig::default()
    };
    PlaySurface::new(
        ShakmatyRules::new(),
        UciEngine::spawn(path).unwrap(),
        config,
        EngineProfile::default(),
        Side::White,
    )
}

// ============================================================================
// Abandoned searches
// ============================================================================

#[test]
fn test_new_game_discards_answer_to_previous_search() {
    //! The first game's bestmove must not be played into the second game
    //!
    //! `e7e5` is legal after both 1.e4 and 1.d4, so only the search bookkeeping
    //! can tell that it answers the abandoned request.

    let path = fake_engine("stale");
    let mut game = play_surface(&path);

    game.drag_move(sq("e2"), sq("e4"));
    game.complete_animation();

    let started = Instant::now();
    while game.opponent().requests_issued() < 1 {
        assert!(started.elapsed() < PATIENCE, "engine never searched");
        game.update(TICK);
        thread::sleep(TICK);
    }

    game.new_game(None).unwrap();
    game.drag_move(sq("d2"), sq("d4"));
    game.complete_animation();

    let started = Instant::now();
    let record = loop {
        assert!(started.elapsed() < PATIENCE, "engine never answered");
        if let Some(record) = game.update(TICK) {
            break record;
        }
        thread::sleep(TICK);
    };

    assert_eq!(record.san, "Nf6");
    assert_eq!(game.opponent().requests_issued(), 2);
    assert_eq!(game.pipeline().history().len(), 2);

    game.shutdown();
    let _ = fs::remove_dir_all(path.parent().unwrap());
}
