use std::{collections::VecDeque, env, path::PathBuf, process};

use tracing::Level;

use crate::config::Config;
use crate::ui::{ClientUi, UiInputError};

#[derive(Default)]
pub struct MockUi {
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub boards: Vec<String>,
    pub inputs: VecDeque<Result<Option<String>, UiInputError>>,
}

impl MockUi {
    pub fn with_inputs<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = Result<Option<String>, UiInputError>>,
    {
        Self {
            inputs: inputs.into_iter().collect(),
            ..Default::default()
        }
    }
}

impl ClientUi for MockUi {
    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }

    fn show_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn show_board(&mut self, board: &str) {
        self.boards.push(board.to_string());
    }

    // Running out of scripted input counts as the player leaving, so that
    // loops under test always end.
    fn poll_input(&mut self, limit: usize) -> Result<Option<String>, UiInputError> {
        self.inputs
            .pop_front()
            .unwrap_or(Err(UiInputError::Disconnected))
            .map(|line| line.map(|s| s.chars().take(limit).collect()))
    }
}

/// A path unique to this test process, for save files.
pub fn temp_path(name: &str) -> PathBuf {
    env::temp_dir().join(format!("procedural-maze-{}-{}", process::id(), name))
}

pub fn test_config(name: &str) -> Config {
    let directory = temp_path(name);
    Config {
        seed: None,
        save_path: directory.join("session.bin"),
        log_path: directory.join("procedural-maze.log"),
        log_level: Level::INFO,
    }
}
