use std::{thread, time::Duration};

use tracing::{info, warn};

use crate::{
    command::{Command, CommandError, HELP, parse_command},
    config::Config,
    render::render_board,
    session,
    ui::{ClientUi, MAX_INPUT_LENGTH, UiInputError},
};
use common::handler::{MazeHandler, MoveOutcome};

const IDLE_SLEEP: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Picks the maze to start with: a configured seed wins, then the save file,
/// then a fresh random maze.
pub fn initial_handler(config: &Config, ui: &mut dyn ClientUi) -> MazeHandler {
    if let Some(seed) = config.seed {
        info!(%seed, "starting from configured seed");
        return MazeHandler::from_seed(seed);
    }

    match session::load_if_present(&config.save_path) {
        Ok(Some(handler)) => {
            ui.show_message("Resumed your last maze.");
            handler
        }
        Ok(None) => MazeHandler::new(),
        Err(e) => {
            warn!(path = %config.save_path.display(), "could not resume session: {}", e);
            ui.show_error(&format!("Could not resume your last maze: {}.", e));
            MazeHandler::new()
        }
    }
}

pub fn main_loop(handler: &mut MazeHandler, ui: &mut dyn ClientUi, config: &Config) {
    loop {
        match ui.poll_input(MAX_INPUT_LENGTH) {
            Ok(Some(line)) => match parse_command(&line) {
                Ok(command) => {
                    if apply_command(handler, ui, config, command) == Flow::Quit {
                        break;
                    }
                }
                Err(CommandError::Empty) => {}
                Err(e) => ui.show_error(&format!("{}.", e)),
            },
            Ok(None) => thread::sleep(IDLE_SLEEP),
            Err(UiInputError::Disconnected) => {
                save_session(handler, ui, config);
                break;
            }
        }
    }
}

pub fn apply_command(
    handler: &mut MazeHandler,
    ui: &mut dyn ClientUi,
    config: &Config,
    command: Command,
) -> Flow {
    match command {
        Command::Move(direction) => match handler.move_in(direction) {
            MoveOutcome::Blocked => {
                ui.show_error(&format!("A wall blocks the way {}.", direction));
                return Flow::Continue;
            }
            MoveOutcome::Moved { .. } => ui.show_board(&render_board(handler)),
            MoveOutcome::ReachedGoal { .. } => {
                ui.show_board(&render_board(handler));
                ui.show_message(&format!(
                    "You reached the goal in {} moves!",
                    handler.moves_made()
                ));
            }
        },
        Command::Undo => match handler.undo() {
            Ok(_) => ui.show_board(&render_board(handler)),
            Err(e) => ui.show_error(&format!("Cannot undo: {}.", e)),
        },
        Command::Reset => {
            let undone = handler.reset();
            ui.show_board(&render_board(handler));
            ui.show_message(&format!("Undid {} moves.", undone));
        }
        Command::Teleport(target) => match handler.teleport(target) {
            Ok(()) => ui.show_board(&render_board(handler)),
            Err(e) => ui.show_error(&format!("Cannot teleport: {}.", e)),
        },
        Command::Save => save_session(handler, ui, config),
        Command::Load => match session::load(&config.save_path) {
            Ok(loaded) => {
                *handler = loaded;
                ui.show_board(&render_board(handler));
                ui.show_message("Loaded your saved maze.");
            }
            Err(e) => ui.show_error(&format!("Cannot load: {}.", e)),
        },
        Command::New(seed) => {
            *handler = match seed {
                Some(seed) => MazeHandler::from_seed(seed),
                None => MazeHandler::new(),
            };
            ui.show_board(&render_board(handler));
            ui.show_message(&format!("New maze {}.", handler.maze().origin()));
        }
        Command::ShowSeed => ui.show_message(&format!(
            "Maze {}, generator at {}.",
            handler.maze().origin(),
            handler.seed()
        )),
        Command::Help => ui.show_message(HELP),
        Command::Quit => {
            save_session(handler, ui, config);
            return Flow::Quit;
        }
    }

    Flow::Continue
}

fn save_session(handler: &MazeHandler, ui: &mut dyn ClientUi, config: &Config) {
    match session::save(&config.save_path, handler) {
        Ok(()) => ui.show_message(&format!("Saved to {}.", config.save_path.display())),
        Err(e) => {
            warn!(path = %config.save_path.display(), "could not save session: {}", e);
            ui.show_error(&format!("Cannot save: {}.", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use glam::ivec2;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::test_helpers::{MockUi, test_config, temp_path};
    use common::maze::{MazeDirection, Seed};

    fn handler() -> MazeHandler {
        MazeHandler::from_seed(Seed::new(0x1234))
    }

    fn passable(handler: &MazeHandler) -> MazeDirection {
        MazeDirection::iter()
            .find(|&d| handler.maze().is_passable(handler.current(), d))
            .expect("start should have an open side")
    }

    #[test]
    fn moving_redraws_the_board() {
        let mut handler = handler();
        let mut ui = MockUi::default();
        let config = test_config("moving");
        let direction = passable(&handler);

        let flow = apply_command(&mut handler, &mut ui, &config, Command::Move(direction));

        assert_eq!(flow, Flow::Continue);
        assert_eq!(ui.boards.len(), 1);
        assert!(ui.errors.is_empty());
    }

    #[test]
    fn blocked_moves_report_an_error() {
        for state in 0..32 {
            let mut handler = MazeHandler::from_seed(Seed::new(state));
            let Some(direction) = MazeDirection::iter()
                .find(|&d| !handler.maze().is_passable(handler.current(), d))
            else {
                continue;
            };
            let mut ui = MockUi::default();
            let config = test_config("blocked");

            apply_command(&mut handler, &mut ui, &config, Command::Move(direction));

            assert_eq!(
                ui.errors,
                vec![format!("A wall blocks the way {}.", direction)]
            );
            assert!(ui.boards.is_empty());
            return;
        }
        panic!("no seed produced a blocked start");
    }

    #[test]
    fn undo_without_history_reports_an_error() {
        let mut handler = handler();
        let mut ui = MockUi::default();
        let config = test_config("undo");

        apply_command(&mut handler, &mut ui, &config, Command::Undo);

        assert_eq!(ui.errors, vec!["Cannot undo: there is nothing to undo.".to_string()]);
    }

    #[test]
    fn teleport_to_an_unvisited_cell_is_refused() {
        let mut handler = handler();
        let mut ui = MockUi::default();
        let config = test_config("teleport");
        let target = if handler.current() == ivec2(0, 0) {
            ivec2(5, 5)
        } else {
            ivec2(0, 0)
        };

        apply_command(&mut handler, &mut ui, &config, Command::Teleport(target));

        assert_eq!(ui.errors.len(), 1);
        assert!(ui.errors[0].starts_with("Cannot teleport"));
    }

    #[test]
    fn new_with_a_seed_replaces_the_maze() {
        let mut handler = handler();
        let mut ui = MockUi::default();
        let config = test_config("new");
        let seed = Seed::new(0xfeed);

        apply_command(&mut handler, &mut ui, &config, Command::New(Some(seed)));

        assert_eq!(handler, MazeHandler::from_seed(seed));
        assert_eq!(ui.messages, vec!["New maze 000000000000FEED.".to_string()]);
    }

    #[test]
    fn quit_saves_and_stops() {
        let mut handler = handler();
        let mut ui = MockUi::default();
        let config = test_config("quit");

        let flow = apply_command(&mut handler, &mut ui, &config, Command::Quit);

        assert_eq!(flow, Flow::Quit);
        assert_eq!(
            session::load(&config.save_path).expect("quit should save"),
            handler
        );
        fs::remove_dir_all(temp_path("quit")).ok();
    }

    #[test]
    fn main_loop_runs_commands_until_input_ends() {
        let mut handler = handler();
        let direction = passable(&handler);
        let config = test_config("main-loop");
        let mut ui = MockUi::with_inputs([
            Ok(Some(direction.to_string())),
            Ok(None),
            Ok(Some("  ".to_string())),
            Ok(Some("fly".to_string())),
            Ok(Some("undo".to_string())),
        ]);

        main_loop(&mut handler, &mut ui, &config);

        assert_eq!(handler, MazeHandler::from_seed(Seed::new(0x1234)));
        assert_eq!(ui.boards.len(), 2);
        assert_eq!(
            ui.errors,
            vec!["unknown command 'fly', type 'help' for a list.".to_string()]
        );
        assert!(config.save_path.exists());
        fs::remove_dir_all(temp_path("main-loop")).ok();
    }

    #[test]
    fn configured_seed_wins_over_the_save_file() {
        let mut config = test_config("initial");
        let mut ui = MockUi::default();
        session::save(&config.save_path, &handler()).expect("save should succeed");
        config.seed = Some(Seed::new(77));

        let initial = initial_handler(&config, &mut ui);
        assert_eq!(initial, MazeHandler::from_seed(Seed::new(77)));

        config.seed = None;
        let resumed = initial_handler(&config, &mut ui);
        assert_eq!(resumed, handler());
        assert_eq!(ui.messages, vec!["Resumed your last maze.".to_string()]);
        fs::remove_dir_all(temp_path("initial")).ok();
    }
}
