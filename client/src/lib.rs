pub mod command;
pub mod config;
pub mod render;
pub mod run;
pub mod session;
pub mod ui;

#[cfg(test)]
mod test_helpers;

use std::{
    fs::{self, OpenOptions},
    sync::Mutex,
};

use crate::{
    command::HELP,
    config::Config,
    render::render_board,
    ui::{ClientUi, TerminalUi},
};

pub fn run_client() -> Result<(), String> {
    let config = Config::load().map_err(|e| format!("invalid configuration: {}", e))?;
    init_logging(&config)?;

    let mut ui =
        TerminalUi::new().map_err(|e| format!("failed to initialize terminal UI: {}", e))?;

    let mut handler = run::initial_handler(&config, &mut ui);
    ui.show_board(&render_board(&handler));
    ui.show_message(HELP);

    run::main_loop(&mut handler, &mut ui, &config);

    ui.show_message("Goodbye.");
    Ok(())
}

// The terminal is in raw mode while playing, so events go to a file instead.
fn init_logging(config: &Config) -> Result<(), String> {
    if let Some(parent) = config.log_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("failed to create {}: {}", parent.display(), e))?;
        }
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_path)
        .map_err(|e| format!("failed to open {}: {}", config.log_path.display(), e))?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(config.log_level)
        .try_init()
        .map_err(|e| format!("failed to start logging: {}", e))
}
