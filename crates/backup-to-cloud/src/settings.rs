//! Process wide paths
//!

use std::path::PathBuf;

use thiserror::Error;

const CONFIG_FILE: &str = "backup.toml";
const CREDENTIALS_FILE: &str = "credentials.json";
const TOKEN_FILE: &str = "token.json";
const LOG_DIRECTORY: &str = "logs";

/// The paths the tool reads and writes, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// The directory holding the config, token and logs.
    pub root_path: PathBuf,

    /// The OAuth client secrets file.
    pub credentials_path: PathBuf,
}

impl Settings {
    /// Create the settings, the credentials default to `<root>/credentials.json`.
    pub fn new(root_path: PathBuf, credentials_path: Option<PathBuf>) -> Result<Self, SettingsError> {
        if !root_path.is_dir() {
            return Err(SettingsError::RootNotDirectory(root_path));
        }

        let credentials_path = credentials_path.unwrap_or_else(|| root_path.join(CREDENTIALS_FILE));

        Ok(Self {
            root_path,
            credentials_path,
        })
    }

    /// The backup entries file.
    pub fn config_path(&self) -> PathBuf {
        self.root_path.join(CONFIG_FILE)
    }

    /// The persisted OAuth token.
    pub fn token_path(&self) -> PathBuf {
        self.root_path.join(TOKEN_FILE)
    }

    /// The directory the rolling log files are written to.
    pub fn log_directory(&self) -> PathBuf {
        self.root_path.join(LOG_DIRECTORY)
    }
}

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("The root path {0:?} is not a directory")]
    RootNotDirectory(PathBuf),
}
