use std::fmt;

use glam::{IVec2, ivec2};

use common::maze::{MazeDirection, Seed, SeedError};

pub const HELP: &str = "Commands: up/down/left/right (or u/d/l/r) to move, undo (z), \
tp <column> <row> to return to a visited cell, reset, new [seed], seed, save, load, quit (q).";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(MazeDirection),
    Undo,
    Reset,
    Teleport(IVec2),
    Save,
    Load,
    New(Option<Seed>),
    ShowSeed,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    Empty,
    Unknown(String),
    MissingArgument(&'static str),
    BadCoordinate(String),
    BadSeed(SeedError),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Empty => write!(f, "no command given"),
            CommandError::Unknown(word) => {
                write!(f, "unknown command '{}', type 'help' for a list", word)
            }
            CommandError::MissingArgument(name) => write!(f, "missing {}", name),
            CommandError::BadCoordinate(value) => {
                write!(f, "'{}' is not a valid coordinate", value)
            }
            CommandError::BadSeed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CommandError {}

pub fn parse_command(input: &str) -> Result<Command, CommandError> {
    let mut words = input.split_whitespace();
    let Some(first) = words.next() else {
        return Err(CommandError::Empty);
    };

    let command = match first.to_lowercase().as_str() {
        "undo" | "z" => Command::Undo,
        "reset" => Command::Reset,
        "tp" | "teleport" => {
            let column = parse_coordinate(words.next(), "column")?;
            let row = parse_coordinate(words.next(), "row")?;
            Command::Teleport(ivec2(column, row))
        }
        "save" => Command::Save,
        "load" => Command::Load,
        "new" => match words.next() {
            Some(seed) => Command::New(Some(seed.parse().map_err(CommandError::BadSeed)?)),
            None => Command::New(None),
        },
        "seed" => Command::ShowSeed,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => match first.parse::<MazeDirection>() {
            Ok(direction) => Command::Move(direction),
            Err(_) => return Err(CommandError::Unknown(first.to_string())),
        },
    };

    Ok(command)
}

fn parse_coordinate(word: Option<&str>, name: &'static str) -> Result<i32, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(name))?;
    word.parse()
        .map_err(|_| CommandError::BadCoordinate(word.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions_parse_as_moves() {
        assert_eq!(parse_command("up"), Ok(Command::Move(MazeDirection::Up)));
        assert_eq!(parse_command(" D "), Ok(Command::Move(MazeDirection::Down)));
        assert_eq!(parse_command("Left"), Ok(Command::Move(MazeDirection::Left)));
        assert_eq!(parse_command("r"), Ok(Command::Move(MazeDirection::Right)));
    }

    #[test]
    fn simple_commands_parse() {
        assert_eq!(parse_command("undo"), Ok(Command::Undo));
        assert_eq!(parse_command("Z"), Ok(Command::Undo));
        assert_eq!(parse_command("reset"), Ok(Command::Reset));
        assert_eq!(parse_command("save"), Ok(Command::Save));
        assert_eq!(parse_command("load"), Ok(Command::Load));
        assert_eq!(parse_command("seed"), Ok(Command::ShowSeed));
        assert_eq!(parse_command("?"), Ok(Command::Help));
        assert_eq!(parse_command("exit"), Ok(Command::Quit));
    }

    #[test]
    fn teleport_takes_a_column_and_a_row() {
        assert_eq!(parse_command("tp 2 4"), Ok(Command::Teleport(ivec2(2, 4))));
        assert_eq!(
            parse_command("teleport 0 5"),
            Ok(Command::Teleport(ivec2(0, 5)))
        );
        assert_eq!(
            parse_command("tp 2"),
            Err(CommandError::MissingArgument("row"))
        );
        assert_eq!(
            parse_command("tp"),
            Err(CommandError::MissingArgument("column"))
        );
        assert_eq!(
            parse_command("tp two 4"),
            Err(CommandError::BadCoordinate("two".to_string()))
        );
    }

    #[test]
    fn new_takes_an_optional_seed() {
        assert_eq!(parse_command("new"), Ok(Command::New(None)));
        assert_eq!(
            parse_command("new 1f"),
            Ok(Command::New(Some(Seed::new(0x1f))))
        );
        assert_eq!(
            parse_command("new zz"),
            Err(CommandError::BadSeed(SeedError::InvalidCharacter('z')))
        );
    }

    #[test]
    fn blank_and_unknown_input_are_errors() {
        assert_eq!(parse_command("   "), Err(CommandError::Empty));
        assert_eq!(
            parse_command("jump"),
            Err(CommandError::Unknown("jump".to_string()))
        );
    }
}
