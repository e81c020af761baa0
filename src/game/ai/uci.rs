//! UCI engine process adapter
//!
//! Runs an external engine (Stockfish or anything else speaking UCI) as a child
//! process and exposes it as a [`SearchEngine`].
//!
//! # Threads
//!
//! - The owning surface writes commands to the engine's stdin directly.
//! - A reader thread consumes stdout: `readyok` flips the readiness flag and
//!   `bestmove` is forwarded to the outstanding request.
//!
//! UCI answers every `go` with exactly one `bestmove`, in order. The shared
//! [`SearchSlot`] counts searches the engine still owes an answer for and how
//! many of those were abandoned, so the answer to a cancelled search is
//! dropped instead of reaching the request that replaced it.
//!
//! # Protocol subset
//!
//! ```text
//! > uci              < uciok
//! > isready          < readyok
//! > setoption name UCI_LimitStrength value true
//! > setoption name UCI_Elo value <elo>
//! > position fen <fen>
//! > go movetime <ms> < bestmove e2e4 [ponder ...]
//! > stop             < bestmove ...   (abandoned search)
//! > quit
//! ```

use crossbeam_channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::search::{SearchEngine, SearchError, SearchResult};
use crate::game::types::MoveInput;

#[derive(Debug, Default)]
struct SearchSlot {
    reply: Option<Sender<MoveInput>>,
    /// `go` commands still waiting for their `bestmove`
    in_flight: u32,
    /// Leading share of `in_flight` whose answers are discarded
    abandoned: u32,
}

impl SearchSlot {
    /// Forget the current request; every search still running is abandoned
    fn abandon_all(&mut self) -> bool {
        self.reply = None;
        self.abandoned = self.in_flight;
        self.in_flight > 0
    }

    /// Consume one `bestmove`, returning the sender it belongs to
    fn answer(&mut self) -> Option<Sender<MoveInput>> {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.abandoned > 0 {
            self.abandoned -= 1;
            return None;
        }
        self.reply.take()
    }
}

type PendingReply = Arc<Mutex<SearchSlot>>;

/// Search engine backed by a UCI child process
pub struct UciEngine {
    path: PathBuf,
    child: Option<Child>,
    stdin: Option<ChildStdin>,
    ready: Arc<AtomicBool>,
    pending: PendingReply,
    reader: Option<JoinHandle<()>>,
}

impl UciEngine {
    /// Start the engine at `path` and begin the UCI handshake
    ///
    /// Returns as soon as the process is running; readiness is reported later
    /// through [`SearchEngine::poll_ready`].
    pub fn spawn(path: impl AsRef<Path>) -> SearchResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut child = Command::new(&path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|source| SearchError::Spawn {
                path: path.display().to_string(),
                source,
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SearchError::Io(std::io::Error::other("engine stdout unavailable"))
        })?;
        let stdin = child.stdin.take().ok_or_else(|| {
            SearchError::Io(std::io::Error::other("engine stdin unavailable"))
        })?;

        let ready = Arc::new(AtomicBool::new(false));
        let pending: PendingReply = Arc::new(Mutex::new(SearchSlot::default()));

        let reader = {
            let ready = Arc::clone(&ready);
            let pending = Arc::clone(&pending);
            std::thread::Builder::new()
                .name("uci-reader".to_string())
                .spawn(move || read_engine_output(stdout, ready, pending))?
        };

        let mut engine = Self {
            path,
            child: Some(child),
            stdin: Some(stdin),
            ready,
            pending,
            reader: Some(reader),
        };
        engine.send("uci")?;
        engine.send("isready")?;
        info!("[UCI] Started engine {}", engine.path.display());
        Ok(engine)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn send(&mut self, command: &str) -> SearchResult<()> {
        let stdin = self.stdin.as_mut().ok_or(SearchError::Terminated)?;
        debug!("[UCI] > {}", command);
        writeln!(stdin, "{command}")?;
        stdin.flush()?;
        Ok(())
    }
}

impl SearchEngine for UciEngine {
    fn poll_ready(&mut self) -> bool {
        self.stdin.is_some() && self.ready.load(Ordering::Acquire)
    }

    fn set_elo(&mut self, elo: u32) -> SearchResult<()> {
        self.send("setoption name UCI_LimitStrength value true")?;
        self.send(&format!("setoption name UCI_Elo value {elo}"))
    }

    fn set_position(&mut self, fen: &str) -> SearchResult<()> {
        self.send(&format!("position fen {fen}"))
    }

    fn request_best_move(&mut self, budget: Duration) -> SearchResult<Receiver<MoveInput>> {
        if !self.ready.load(Ordering::Acquire) {
            return Err(SearchError::NotReady);
        }
        let (sender, receiver) = bounded(1);
        {
            // A newer request supersedes whatever was outstanding
            let mut slot = self.pending.lock();
            slot.abandon_all();
            slot.reply = Some(sender);
            slot.in_flight += 1;
        }
        if let Err(e) = self.send(&format!("go movetime {}", budget.as_millis().max(1))) {
            let mut slot = self.pending.lock();
            slot.reply = None;
            slot.in_flight = slot.in_flight.saturating_sub(1);
            slot.abandoned = slot.abandoned.min(slot.in_flight);
            return Err(e);
        }
        Ok(receiver)
    }

    fn cancel(&mut self) {
        let searching = self.pending.lock().abandon_all();
        if searching {
            debug!("[UCI] Abandoning search in progress");
            if let Err(e) = self.send("stop") {
                debug!("[UCI] stop not delivered: {}", e);
            }
        }
    }

    fn terminate(&mut self) {
        self.pending.lock().abandon_all();
        if self.stdin.is_some() {
            if let Err(e) = self.send("quit") {
                debug!("[UCI] quit not delivered: {}", e);
            }
        }
        self.stdin = None;
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill() {
                debug!("[UCI] kill: {}", e);
            }
            if let Err(e) = child.wait() {
                warn!("[UCI] Failed to reap engine process: {}", e);
            }
            info!("[UCI] Engine {} terminated", self.path.display());
        }
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                warn!("[UCI] Reader thread panicked");
            }
        }
        self.ready.store(false, Ordering::Release);
    }
}

impl Drop for UciEngine {
    fn drop(&mut self) {
        self.terminate();
    }
}

impl std::fmt::Debug for UciEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UciEngine")
            .field("path", &self.path)
            .field("running", &self.child.is_some())
            .field("ready", &self.ready.load(Ordering::Relaxed))
            .finish()
    }
}

fn read_engine_output(
    stdout: impl std::io::Read,
    ready: Arc<AtomicBool>,
    pending: PendingReply,
) {
    for line in BufReader::new(stdout).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("[UCI] Read error: {}", e);
                break;
            }
        };
        match parse_engine_line(&line) {
            EngineLine::Ready => {
                ready.store(true, Ordering::Release);
            }
            EngineLine::BestMove(best) => {
                let Some(sender) = pending.lock().answer() else {
                    debug!("[UCI] Dropping bestmove of an abandoned search");
                    continue;
                };
                match best {
                    Some(mv) => {
                        if sender.send(mv).is_err() {
                            debug!("[UCI] bestmove {} arrived after its request was dropped", mv);
                        }
                    }
                    None => warn!("[UCI] Engine reported no legal move"),
                }
            }
            EngineLine::Other => {}
        }
    }
    debug!("[UCI] Engine output closed");
    pending.lock().abandon_all();
}

#[derive(Debug, PartialEq, Eq)]
enum EngineLine {
    Ready,
    /// `None` for `bestmove (none)` or unparseable output
    BestMove(Option<MoveInput>),
    Other,
}

fn parse_engine_line(line: &str) -> EngineLine {
    let mut tokens = line.split_whitespace();
    match tokens.next() {
        Some("readyok") => EngineLine::Ready,
        Some("bestmove") => {
            EngineLine::BestMove(tokens.next().and_then(|text| text.parse().ok()))
        }
        _ => EngineLine::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bestmove() {
        assert_eq!(
            parse_engine_line("bestmove e2e4 ponder e7e5"),
            EngineLine::BestMove(Some("e2e4".parse().unwrap()))
        );
        assert_eq!(
            parse_engine_line("bestmove a7a8q"),
            EngineLine::BestMove(Some("a7a8q".parse().unwrap()))
        );
        assert_eq!(
            parse_engine_line("bestmove (none)"),
            EngineLine::BestMove(None)
        );
    }

    #[test]
    fn test_parse_other_lines() {
        assert_eq!(parse_engine_line("readyok"), EngineLine::Ready);
        assert_eq!(parse_engine_line("uciok"), EngineLine::Other);
        assert_eq!(
            parse_engine_line("info depth 12 score cp 31"),
            EngineLine::Other
        );
    }

    #[test]
    fn test_spawn_missing_binary_fails() {
        let err = UciEngine::spawn("/nonexistent/engine-binary").unwrap_err();
        assert!(matches!(err, SearchError::Spawn { .. }));
    }

    fn slot_with_request() -> (PendingReply, Receiver<MoveInput>) {
        let pending: PendingReply = Arc::new(Mutex::new(SearchSlot::default()));
        let (sender, receiver) = bounded(1);
        {
            let mut slot = pending.lock();
            slot.reply = Some(sender);
            slot.in_flight = 1;
        }
        (pending, receiver)
    }

    #[test]
    fn test_reader_routes_bestmove_to_pending_request() {
        let ready = Arc::new(AtomicBool::new(false));
        let (pending, receiver) = slot_with_request();

        let output = "id name Fake\nuciok\nreadyok\ninfo depth 1\nbestmove g1f3\n";
        read_engine_output(output.as_bytes(), Arc::clone(&ready), Arc::clone(&pending));

        assert!(ready.load(Ordering::Acquire));
        assert_eq!(receiver.try_recv().ok(), "g1f3".parse::<MoveInput>().ok());
        assert!(pending.lock().reply.is_none());
        assert_eq!(pending.lock().in_flight, 0);
    }

    #[test]
    fn test_reader_drops_answer_of_abandoned_search() {
        //! The first bestmove answers the cancelled `go`, not the new one
        let ready = Arc::new(AtomicBool::new(true));
        let (pending, stale) = slot_with_request();
        assert!(pending.lock().abandon_all());

        let (sender, fresh) = bounded(1);
        {
            let mut slot = pending.lock();
            slot.reply = Some(sender);
            slot.in_flight += 1;
        }

        let output = "bestmove e7e5\nbestmove g8f6\n";
        read_engine_output(output.as_bytes(), ready, Arc::clone(&pending));

        assert!(stale.try_recv().is_err());
        assert_eq!(fresh.try_recv().ok(), "g8f6".parse::<MoveInput>().ok());
        assert_eq!(pending.lock().abandoned, 0);
    }

    #[test]
    fn test_abandon_without_search_is_quiet() {
        let mut slot = SearchSlot::default();
        assert!(!slot.abandon_all());
        assert_eq!(slot.abandoned, 0);
    }
}
