use crate::app_dirs::AppDirs;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Durable home of the cumulative score. Absent or unreadable state loads
/// as 0; saves are best-effort.
pub trait ScoreStore {
    fn load_cumulative(&self) -> u64;
    fn save_cumulative(&self, total: u64) -> io::Result<()>;
}

/// On-disk format of the scores file.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SavedScores {
    cumulative: u64,
    last_played: Option<DateTime<Local>>,
}

/// JSON-file score store under the state directory.
#[derive(Debug, Clone)]
pub struct FileScoreStore {
    path: PathBuf,
}

impl FileScoreStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::scores_path().unwrap_or_else(|| PathBuf::from("blixt_scores.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    /// When the scores file was last written, if it ever was.
    pub fn last_played(&self) -> Option<DateTime<Local>> {
        self.read_file().and_then(|saved| saved.last_played)
    }

    fn read_file(&self) -> Option<SavedScores> {
        let bytes = fs::read(&self.path).ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

impl ScoreStore for FileScoreStore {
    fn load_cumulative(&self) -> u64 {
        self.read_file().map(|saved| saved.cumulative).unwrap_or(0)
    }

    fn save_cumulative(&self, total: u64) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let saved = SavedScores {
            cumulative: total,
            last_played: Some(Local::now()),
        };
        let data = serde_json::to_vec_pretty(&saved).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// In-memory score store for unit tests. Starts "absent" and counts saves.
/// Clones share state, so a test can keep a handle on the store it hands
/// to a ledger.
#[derive(Debug, Default, Clone)]
pub struct MemoryScoreStore {
    inner: Rc<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    value: Cell<Option<u64>>,
    saves: Cell<usize>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(total: u64) -> Self {
        let store = Self::default();
        store.inner.value.set(Some(total));
        store
    }

    pub fn save_count(&self) -> usize {
        self.inner.saves.get()
    }
}

impl ScoreStore for MemoryScoreStore {
    fn load_cumulative(&self) -> u64 {
        self.inner.value.get().unwrap_or(0)
    }

    fn save_cumulative(&self, total: u64) -> io::Result<()> {
        self.inner.value.set(Some(total));
        self.inner.saves.set(self.inner.saves.get() + 1);
        Ok(())
    }
}

/// Owns the session and cumulative counters. The engine funnels every
/// mutation through `award`/`reset_session`; nothing else writes them.
pub struct ScoreLedger {
    session: u32,
    cumulative: u64,
    store: Box<dyn ScoreStore>,
}

impl ScoreLedger {
    /// Loads the cumulative counter from `store`; a fresh or broken store
    /// starts the counter at 0.
    pub fn new(store: Box<dyn ScoreStore>) -> Self {
        let cumulative = store.load_cumulative();
        Self {
            session: 0,
            cumulative,
            store,
        }
    }

    /// Adds `points` to both counters and persists the cumulative one.
    pub fn award(&mut self, points: u32) {
        self.session += points;
        self.cumulative += u64::from(points);
        let _ = self.store.save_cumulative(self.cumulative);
    }

    /// Zeroes the session counter; the cumulative counter is untouched.
    pub fn reset_session(&mut self) {
        self.session = 0;
    }

    pub fn session_score(&self) -> u32 {
        self.session
    }

    pub fn cumulative_score(&self) -> u64 {
        self.cumulative
    }
}

impl fmt::Debug for ScoreLedger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScoreLedger")
            .field("session", &self.session)
            .field("cumulative", &self.cumulative)
            .finish()
    }
}

/// One finished session, as logged to the history file.
#[derive(Debug, Clone, Copy)]
pub struct SessionEntry {
    pub score: u32,
    pub hits: u32,
    pub misses: u32,
}

/// Append-only CSV history of finished sessions.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::session_log_path().unwrap_or_else(|| PathBuf::from("blixt_sessions.csv"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn append(&self, entry: &SessionEntry) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !self.path.exists();

        let mut log_file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)?;

        if needs_header {
            writeln!(log_file, "date,score,hits,misses")?;
        }

        writeln!(
            log_file,
            "{},{},{},{}",
            Local::now().format("%c"),
            entry.score,
            entry.hits,
            entry.misses,
        )
    }
}
