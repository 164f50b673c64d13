use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Saved scores live under $HOME/.local/state/blixt
    pub fn scores_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("scores.json"))
    }

    /// Per-session history log, appended on every game over
    pub fn session_log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("sessions.csv"))
    }

    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "blixt").map(|pd| pd.config_dir().join("config.json"))
    }

    fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("blixt"),
            )
        } else {
            ProjectDirs::from("", "", "blixt").map(|pd| pd.data_local_dir().to_path_buf())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_paths_share_a_directory() {
        if let (Some(scores), Some(log)) = (AppDirs::scores_path(), AppDirs::session_log_path()) {
            assert_eq!(scores.parent(), log.parent());
            assert_eq!(scores.file_name().unwrap(), "scores.json");
            assert_eq!(log.file_name().unwrap(), "sessions.csv");
        }
    }
}
