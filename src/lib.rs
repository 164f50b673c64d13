// Library surface for headless/integration tests and reuse.
// The binary adds the terminal plumbing in main.rs; everything that can
// run without a tty lives here.
pub mod app_dirs;
pub mod clock;
pub mod config;
pub mod engine;
pub mod render;
pub mod runtime;
pub mod score;
pub mod sequence;
pub mod ui;

use chrono::{DateTime, Local};

use crate::clock::{Clock, SystemClock};
use crate::config::GameConfig;
use crate::engine::{Engine, SessionPhase};
use crate::render::Playfield;
use crate::score::{FileScoreStore, ScoreLedger, SessionLog};

pub const TICK_RATE_MS: u64 = 100;

/// One running instance of the game: the session engine plus the board the
/// UI draws from.
#[derive(Debug)]
pub struct App<C: Clock = SystemClock> {
    pub engine: Engine<C>,
    pub playfield: Playfield,
    pub last_played: Option<DateTime<Local>>,
}

impl App {
    /// Production wiring: file-backed cumulative score and session log.
    pub fn new(config: GameConfig) -> Self {
        let store = FileScoreStore::new();
        let last_played = store.last_played();
        let ledger = ScoreLedger::new(Box::new(store));
        let engine = Engine::new(config, ledger).with_session_log(SessionLog::new());
        Self {
            engine,
            playfield: Playfield::new(),
            last_played,
        }
    }
}

impl<C: Clock> App<C> {
    /// Wrap a prebuilt engine; used by tests to inject stores and clocks.
    pub fn with_engine(engine: Engine<C>) -> Self {
        Self {
            engine,
            playfield: Playfield::new(),
            last_played: None,
        }
    }

    pub fn start(&mut self) {
        self.engine.start(&mut self.playfield);
    }

    pub fn handle_key(&mut self, c: char) {
        self.engine.handle_key(c, &mut self.playfield);
    }

    pub fn on_tick(&mut self) {
        self.engine.on_tick(&mut self.playfield);
        self.playfield.decay();
    }

    /// Abandon the session and clear the board.
    pub fn reset(&mut self) {
        self.engine.reset();
        self.playfield = Playfield::new();
    }

    pub fn phase(&self) -> SessionPhase {
        self.engine.phase()
    }
}
