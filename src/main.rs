//! `chess-practice` command-line host
//!
//! A text presentation layer over the library surfaces: the board is printed
//! after each move and every animation request is acknowledged immediately.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::info;

use chess_practice::core::{self as practice_core, PracticeSettings};
use chess_practice::game::ai::{EngineProfile, UciEngine};
use chess_practice::game::rules::BoardGrid;
use chess_practice::game::{Interaction, SurfaceEvent};
use chess_practice::puzzle::{load_puzzles, PuzzleStatus, PuzzleTrainer};
use chess_practice::surface::{BlindfoldSurface, PlaySurface, SurfaceStatus};
use chess_practice::{MoveInput, PieceKind, RulesEngine, ShakmatyRules, Side};

/// Host loop granularity
const TICK: Duration = Duration::from_millis(50);
/// Give up waiting for the engine after this long
const ENGINE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Parser, Debug)]
#[command(name = "chess-practice", version, about = "Chess practice: free play, blindfold, puzzles")]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Debug-level logging unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play against a UCI engine on a printed board
    Play(GameArgs),
    /// Play against a UCI engine by notation only
    Blindfold(GameArgs),
    /// Solve puzzles from a JSON file
    Puzzles {
        file: PathBuf,
        /// Category key: mate, fork, pin, skewer, discovered, sacrifice,
        /// endgame, opening, middlegame, short, long, all
        #[arg(long)]
        filter: Option<String>,
    },
    /// List the built-in opponent profiles
    Profiles,
    /// Write the effective settings back to the settings file
    SaveSettings,
}

#[derive(clap::Args, Debug)]
struct GameArgs {
    /// UCI engine binary (overrides engine_path from settings)
    #[arg(long)]
    engine: Option<PathBuf>,
    /// Built-in profile id
    #[arg(long)]
    profile: Option<String>,
    /// Play the black pieces
    #[arg(long)]
    black: bool,
    /// Start from this position instead of the initial one
    #[arg(long)]
    fen: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    practice_core::init_tracing(cli.verbose);

    let settings_path = cli.settings.clone().unwrap_or_else(practice_core::settings_path);
    let settings = practice_core::load_settings(&settings_path);

    match cli.command {
        Command::Play(args) => run_play(&settings, &args),
        Command::Blindfold(args) => run_blindfold(&settings, &args),
        Command::Puzzles { file, filter } => run_puzzles(&settings, &file, filter.as_deref()),
        Command::Profiles => {
            for profile in EngineProfile::builtin() {
                println!("{:<10} {:<12} {}", profile.id, profile.name, profile.elo);
            }
            Ok(())
        }
        Command::SaveSettings => practice_core::save_settings(&settings_path, &settings)
            .with_context(|| format!("saving settings to {}", settings_path.display())),
    }
}

// ============================================================================
// Shared setup
// ============================================================================

struct GameSetup {
    rules: ShakmatyRules,
    engine: UciEngine,
    profile: EngineProfile,
    human_side: Side,
}

fn prepare_game(settings: &PracticeSettings, args: &GameArgs) -> Result<GameSetup> {
    let Some(engine_path) = args.engine.clone().or_else(|| settings.engine_path.clone()) else {
        bail!("no UCI engine configured: pass --engine or set engine_path in the settings file");
    };
    let profile = match &args.profile {
        Some(id) => EngineProfile::by_id(id)
            .with_context(|| format!("unknown profile '{id}' (see `chess-practice profiles`)"))?,
        None => settings.profile.clone(),
    };
    let rules = match &args.fen {
        Some(fen) => ShakmatyRules::from_fen(fen).context("loading --fen")?,
        None => ShakmatyRules::new(),
    };
    let engine = UciEngine::spawn(&engine_path)?;
    let human_side = if args.black {
        Side::Black
    } else {
        settings.human_side
    };
    Ok(GameSetup {
        rules,
        engine,
        profile,
        human_side,
    })
}

fn prompt(text: &str) -> Result<Option<String>> {
    print!("{text}");
    io::stdout().flush()?;
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn parse_promotion(text: &str) -> Option<PieceKind> {
    text.chars()
        .next()
        .and_then(PieceKind::from_char)
        .filter(|kind| kind.is_promotion_choice())
}

/// Print events; returns `true` if an animation must be acknowledged
fn report(events: Vec<SurfaceEvent>) -> bool {
    let mut animate = false;
    for event in events {
        match event {
            SurfaceEvent::MoveMade { record, .. } => {
                println!("{} {}", record.piece.side, record.san)
            }
            SurfaceEvent::Animate(_) => animate = true,
            SurfaceEvent::GameEnded(outcome) => println!("*** {} ***", outcome.message()),
            SurfaceEvent::EngineThinking => println!("(opponent is thinking)"),
            SurfaceEvent::EngineReady => println!("(engine ready)"),
            SurfaceEvent::PuzzleLoaded { id, rating } => {
                println!("Puzzle {id} (rating {rating})")
            }
            SurfaceEvent::PuzzleStatusChanged(status) => println!("[{status}]"),
            SurfaceEvent::HintChanged(Some(hint)) => match hint.arrow {
                Some((from, to)) => println!("Hint: {from} -> {to}"),
                None => println!("Hint: move the piece on {}", hint.origin),
            },
            SurfaceEvent::PromotionRequested(request) => {
                println!("Promote on {}: choose q, r, b or n", request.to)
            }
            SurfaceEvent::HintChanged(None) | SurfaceEvent::PromotionCancelled => {}
        }
    }
    animate
}

fn render_board(grid: &BoardGrid, perspective: Side) -> String {
    let mut out = String::new();
    let rows: Vec<usize> = match perspective {
        Side::White => (0..8).collect(),
        Side::Black => (0..8).rev().collect(),
    };
    for row in rows {
        out.push_str(&format!("{} ", 8 - row));
        let files: Vec<usize> = match perspective {
            Side::White => (0..8).collect(),
            Side::Black => (0..8).rev().collect(),
        };
        for file in files {
            let c = match grid[row][file] {
                Some(piece) if piece.side == Side::White => piece.kind.char().to_ascii_uppercase(),
                Some(piece) => piece.kind.char(),
                None => '.',
            };
            out.push(c);
            out.push(' ');
        }
        out.push('\n');
    }
    out.push_str(match perspective {
        Side::White => "  a b c d e f g h",
        Side::Black => "  h g f e d c b a",
    });
    out
}

// ============================================================================
// Free play
// ============================================================================

fn run_play(settings: &PracticeSettings, args: &GameArgs) -> Result<()> {
    let setup = prepare_game(settings, args)?;
    let mut surface = PlaySurface::new(
        setup.rules,
        setup.engine,
        settings.ai_config(),
        setup.profile,
        setup.human_side,
    );

    loop {
        wait_for_opponent(&mut surface)?;
        println!("{}", render_board(&surface.pipeline().rules().board(), surface.human_side()));
        match surface.status() {
            SurfaceStatus::GameOver(outcome) => {
                println!("{}", outcome.message());
                break;
            }
            SurfaceStatus::EngineNotReady => bail!("engine did not become ready"),
            _ => {}
        }

        let Some(line) = prompt("move (e2e4, new, quit)> ")? else {
            break;
        };
        match line.as_str() {
            "quit" | "exit" => break,
            "new" => {
                surface.new_game(None)?;
                continue;
            }
            "" => continue,
            _ => {}
        }
        let Ok(mv) = line.parse::<MoveInput>() else {
            println!("Enter moves as origin and destination, e.g. e2e4");
            continue;
        };
        match surface.drag_move(mv.from, mv.to) {
            Interaction::Moved(_) => {}
            Interaction::PromotionRequested(_) => {
                let choice = match mv.promotion {
                    Some(kind) => Some(kind),
                    None => {
                        report(surface.drain_events());
                        prompt("piece> ")?.as_deref().and_then(parse_promotion)
                    }
                };
                if !matches!(choice.map(|kind| surface.choose_promotion(kind)), Some(Ok(_))) {
                    surface.cancel_promotion();
                    println!("Promotion cancelled");
                }
            }
            _ => println!("Illegal move"),
        }
        if report(surface.drain_events()) {
            surface.complete_animation();
        }
    }
    info!("[GAME] Session ended");
    surface.shutdown();
    Ok(())
}

/// Tick the surface until it is the human's turn again (or the game ended)
fn wait_for_opponent<E>(surface: &mut PlaySurface<ShakmatyRules, E>) -> Result<()>
where
    E: chess_practice::game::ai::SearchEngine,
{
    let started = Instant::now();
    loop {
        surface.update(TICK);
        if report(surface.drain_events()) {
            surface.complete_animation();
        }
        match surface.status() {
            SurfaceStatus::YourTurn | SurfaceStatus::GameOver(_) => return Ok(()),
            SurfaceStatus::EngineNotReady if started.elapsed() > ENGINE_TIMEOUT => return Ok(()),
            _ => {}
        }
        if started.elapsed() > ENGINE_TIMEOUT * 2 {
            bail!("engine did not answer in time");
        }
        thread::sleep(TICK);
    }
}

// ============================================================================
// Blindfold
// ============================================================================

fn run_blindfold(settings: &PracticeSettings, args: &GameArgs) -> Result<()> {
    let setup = prepare_game(settings, args)?;
    let mut surface = BlindfoldSurface::new(
        setup.rules,
        setup.engine,
        settings.ai_config(),
        setup.profile,
        setup.human_side,
    );
    println!("Blindfold game. Enter SAN (Nf3) or coordinates (g1f3); 'moves' reads back the game.");

    loop {
        let started = Instant::now();
        loop {
            surface.update(TICK);
            if report(surface.drain_events()) {
                surface.complete_animation();
            }
            match surface.status() {
                SurfaceStatus::YourTurn | SurfaceStatus::GameOver(_) => break,
                SurfaceStatus::EngineNotReady if started.elapsed() > ENGINE_TIMEOUT => {
                    bail!("engine did not become ready")
                }
                _ => thread::sleep(TICK),
            }
        }
        if let SurfaceStatus::GameOver(outcome) = surface.status() {
            println!("{}", outcome.message());
            println!("{}", surface.move_list());
            break;
        }

        let Some(line) = prompt("> ")? else {
            break;
        };
        match line.as_str() {
            "quit" | "exit" => break,
            "moves" => println!("{}", surface.move_list()),
            "" => {}
            notation => match surface.submit(notation) {
                Ok(_) => {
                    report(surface.drain_events());
                }
                Err(e) => println!("{e}"),
            },
        }
    }
    surface.shutdown();
    Ok(())
}

// ============================================================================
// Puzzles
// ============================================================================

fn run_puzzles(settings: &PracticeSettings, file: &Path, filter: Option<&str>) -> Result<()> {
    let puzzles = load_puzzles(file).with_context(|| format!("loading {}", file.display()))?;
    let mut config = settings.puzzle_config();
    if let Some(key) = filter {
        config.category = chess_practice::puzzle::PuzzleCategory::from_key(key);
    }
    let mut trainer = PuzzleTrainer::new(ShakmatyRules::new(), puzzles, config);
    if trainer.is_empty() {
        bail!("no puzzles match filter '{}'", trainer.category());
    }
    println!("Commands: e2e4, hint, next, prev, restart, filter <key>, quit");

    loop {
        settle_puzzle(&mut trainer);
        if let Some(session) = trainer.session() {
            let rules = session.pipeline().rules();
            println!("{}", render_board(&rules.board(), session.player_side()));
            println!(
                "Puzzle {}/{} | {} to move | solved {}",
                trainer.index() + 1,
                trainer.len(),
                rules.turn(),
                trainer.solved_count()
            );
        }

        let Some(line) = prompt("puzzle> ")? else {
            break;
        };
        let mut words = line.split_whitespace();
        match (words.next(), words.next()) {
            (Some("quit" | "exit"), _) => break,
            (Some("hint"), _) => {
                if trainer.request_hint().is_none() {
                    println!("No hint available right now");
                }
            }
            (Some("next"), _) => trainer.next(),
            (Some("prev"), _) => trainer.previous(),
            (Some("restart"), _) => trainer.restart(),
            (Some("filter"), Some(key)) => trainer.set_filter(key),
            (Some(text), _) => match text.parse::<MoveInput>() {
                Ok(mv) => {
                    let interaction = trainer.drag_move(mv.from, mv.to);
                    if let (Interaction::PromotionRequested(_), Some(kind)) =
                        (&interaction, mv.promotion)
                    {
                        if trainer.choose_promotion(kind).is_err() {
                            trainer.cancel_promotion();
                        }
                    } else if matches!(interaction, Interaction::PromotionRequested(_)) {
                        trainer.cancel_promotion();
                        println!("Add the promotion piece, e.g. e7e8q");
                    } else if interaction == Interaction::Ignored {
                        println!("Illegal move");
                    }
                }
                Err(_) => println!("Unknown command"),
            },
            (None, _) => {}
        }
    }
    Ok(())
}

/// Acknowledge animations and wait out automatic replies
fn settle_puzzle(trainer: &mut PuzzleTrainer<ShakmatyRules>) {
    loop {
        let animate = report(trainer.drain_events());
        if animate {
            trainer.complete_animation();
            continue;
        }
        match trainer.session() {
            Some(session) if session.is_reply_scheduled() => {
                thread::sleep(TICK);
                trainer.update(TICK);
            }
            _ => break,
        }
    }
    if trainer.status() == Some(PuzzleStatus::Solved) {
        println!("Solved! Type 'next' for another puzzle.");
    }
}
