use std::{env, fmt, path::PathBuf};

use tracing::Level;

use common::maze::{Seed, SeedError};

const APP_DIRECTORY: &str = "procedural-maze";
const SAVE_FILE_NAME: &str = "session.bin";
const LOG_FILE_NAME: &str = "procedural-maze.log";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub seed: Option<Seed>, // Forces a fresh maze instead of resuming the save file.
    pub save_path: PathBuf,
    pub log_path: PathBuf,
    pub log_level: Level,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidSeed(SeedError),
    InvalidLogLevel(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidSeed(e) => write!(f, "MAZE_SEED is invalid: {}", e),
            ConfigError::InvalidLogLevel(level) => write!(
                f,
                "MAZE_LOG must be one of error, warn, info, debug or trace, got '{}'",
                level
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Reads the configuration from the environment, after loading `.env`
    /// from the working directory if there is one.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seed = match lookup("MAZE_SEED") {
            Some(value) if !value.trim().is_empty() => {
                Some(value.parse().map_err(ConfigError::InvalidSeed)?)
            }
            _ => None,
        };

        let save_path = lookup("MAZE_SAVE_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_save_path);

        let log_path = lookup("MAZE_LOG_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| save_path.with_file_name(LOG_FILE_NAME));

        let log_level = match lookup("MAZE_LOG") {
            Some(value) => value
                .trim()
                .parse::<Level>()
                .map_err(|_| ConfigError::InvalidLogLevel(value))?,
            None => Level::INFO,
        };

        Ok(Self {
            seed,
            save_path,
            log_path,
            log_level,
        })
    }
}

fn default_save_path() -> PathBuf {
    match dirs::data_dir() {
        Some(directory) => directory.join(APP_DIRECTORY).join(SAVE_FILE_NAME),
        None => PathBuf::from(SAVE_FILE_NAME),
    }
}
