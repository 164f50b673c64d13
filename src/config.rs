use crate::app_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Tunables for one play session, with the stock defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameConfig {
    /// Symbols generated per session
    pub sequence_length: usize,
    /// Cursor position at which the session ends (at most `sequence_length`)
    pub advance_limit: usize,
    /// Delay before the active symbol starts its warning blink
    pub warning_ms: u64,
    /// Delay before the active symbol counts as missed
    pub expiry_ms: u64,
    /// Points awarded per matched symbol
    pub points_per_match: u32,
    /// Characters the sequence is drawn from
    pub alphabet: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            sequence_length: 7,
            advance_limit: 7,
            warning_ms: 7_000,
            expiry_ms: 10_000,
            points_per_match: 10,
            alphabet: "asdfjkl;".to_string(),
        }
    }
}

impl GameConfig {
    /// Clamp degenerate values into a playable range. Saved configs and CLI
    /// input both pass through here before reaching the engine.
    pub fn normalized(mut self) -> Self {
        if self.alphabet.is_empty() {
            self.alphabet = GameConfig::default().alphabet;
        }
        self.sequence_length = self.sequence_length.max(1);
        self.advance_limit = self.advance_limit.clamp(1, self.sequence_length);
        self.expiry_ms = self.expiry_ms.max(1);
        self.warning_ms = self.warning_ms.min(self.expiry_ms);
        self
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("blixt_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<GameConfig>(&bytes) {
                return cfg;
            }
        }
        GameConfig::default()
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
