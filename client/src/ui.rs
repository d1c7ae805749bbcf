use std::fmt;
use std::io::{self, Stdout, Write, stdout};
use std::time::Duration;

use crossterm::{
    cursor::{MoveTo, MoveToColumn},
    event::{self, Event, KeyCode, KeyModifiers},
    execute, queue,
    style::Print,
    terminal::{self, Clear, ClearType},
};

pub const MAX_INPUT_LENGTH: usize = 32;
const PROMPT: &str = "> ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiInputError {
    Disconnected,
}

impl fmt::Display for UiInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiInputError::Disconnected => write!(f, "Input source disconnected"),
        }
    }
}

impl std::error::Error for UiInputError {}

pub trait ClientUi {
    fn show_message(&mut self, message: &str);
    fn show_error(&mut self, message: &str);
    fn show_board(&mut self, board: &str);
    fn poll_input(&mut self, limit: usize) -> Result<Option<String>, UiInputError>;
}

pub struct TerminalUi<W: Write> {
    stdout: W,
    buffer: String,
    prompt_lines: u16,
    cols: u16,
    is_raw_mode_owner: bool, // True except in tests.
}

impl TerminalUi<Stdout> {
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = stdout();
        let (cols, _) = terminal::size().unwrap_or((80, 24));
        execute!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(PROMPT)
        )?;
        Ok(Self {
            stdout,
            buffer: String::new(),
            prompt_lines: 1,
            cols,
            is_raw_mode_owner: true,
        })
    }
}

impl<W: Write> TerminalUi<W> {
    fn clear_prompt(&mut self) -> io::Result<()> {
        if self.prompt_lines > 1 {
            queue!(self.stdout, crossterm::cursor::MoveUp(self.prompt_lines - 1))?;
        }

        for i in 0..self.prompt_lines {
            queue!(self.stdout, MoveToColumn(0), Clear(ClearType::CurrentLine))?;
            if i + 1 < self.prompt_lines {
                queue!(self.stdout, crossterm::cursor::MoveDown(1))?;
            }
        }

        if self.prompt_lines > 1 {
            queue!(self.stdout, crossterm::cursor::MoveUp(self.prompt_lines - 1))?;
        }
        queue!(self.stdout, MoveToColumn(0))
    }

    fn redraw_prompt(&mut self) -> io::Result<()> {
        self.clear_prompt()?;

        let cols = self.cols.max(1) as usize;
        let full_length = PROMPT.len() + self.buffer.chars().count();
        self.prompt_lines = full_length.max(1).div_ceil(cols) as u16;

        queue!(self.stdout, Print(PROMPT), Print(&self.buffer))?;
        self.stdout.flush()
    }

    fn print_above_prompt(&mut self, prefix: &str, message: &str) -> io::Result<()> {
        self.clear_prompt()?;
        for line in message.lines() {
            queue!(self.stdout, Print(prefix), Print(line), Print("\r\n"))?;
        }
        self.prompt_lines = 1;
        self.redraw_prompt()
    }

    fn draw_board(&mut self, board: &str) -> io::Result<()> {
        queue!(self.stdout, Clear(ClearType::All), MoveTo(0, 0))?;
        for line in board.lines() {
            queue!(self.stdout, Print(line), Print("\r\n"))?;
        }
        self.prompt_lines = 1;
        self.redraw_prompt()
    }

    fn handle_event(&mut self, event: Event, limit: usize) -> Result<Option<String>, UiInputError> {
        match event {
            Event::Key(key_event) => {
                if key_event.modifiers == KeyModifiers::CONTROL {
                    return match key_event.code {
                        KeyCode::Char('c') | KeyCode::Char('d') => Err(UiInputError::Disconnected),
                        _ => Ok(None),
                    };
                }

                let result = match key_event.code {
                    KeyCode::Enter => {
                        let line: String = self.buffer.drain(..).collect();
                        queue!(self.stdout, Print("\r\n"))
                            .and_then(|_| {
                                self.prompt_lines = 1;
                                self.redraw_prompt()
                            })
                            .map(|_| Some(line))
                    }
                    KeyCode::Backspace => {
                        if self.buffer.pop().is_some() {
                            self.redraw_prompt().map(|_| None)
                        } else {
                            Ok(None)
                        }
                    }
                    KeyCode::Esc => {
                        if self.buffer.is_empty() {
                            Ok(None)
                        } else {
                            self.buffer.clear();
                            self.redraw_prompt().map(|_| None)
                        }
                    }
                    // Arrow keys move straight away, without waiting for Enter.
                    KeyCode::Up => Ok(Some("up".to_string())),
                    KeyCode::Down => Ok(Some("down".to_string())),
                    KeyCode::Left => Ok(Some("left".to_string())),
                    KeyCode::Right => Ok(Some("right".to_string())),
                    KeyCode::Char(c) => {
                        if self.buffer.chars().count() >= limit {
                            Ok(None)
                        } else {
                            self.buffer.push(c);
                            self.redraw_prompt().map(|_| None)
                        }
                    }
                    _ => Ok(None),
                };

                result.map_err(|_| UiInputError::Disconnected)
            }
            Event::Resize(cols, _) => {
                self.cols = cols;
                self.redraw_prompt()
                    .map(|_| None)
                    .map_err(|_| UiInputError::Disconnected)
            }
            _ => Ok(None),
        }
    }
}

// Drawing errors are not fatal: the next redraw starts from a clean prompt.
impl<W: Write> ClientUi for TerminalUi<W> {
    fn show_message(&mut self, message: &str) {
        self.print_above_prompt("", message).ok();
    }

    fn show_error(&mut self, message: &str) {
        self.print_above_prompt("[ERROR] ", message).ok();
    }

    fn show_board(&mut self, board: &str) {
        self.draw_board(board).ok();
    }

    fn poll_input(&mut self, limit: usize) -> Result<Option<String>, UiInputError> {
        if !event::poll(Duration::from_millis(50)).unwrap_or(false) {
            return Ok(None);
        }

        match event::read() {
            Ok(event) => self.handle_event(event, limit),
            Err(_) => Err(UiInputError::Disconnected),
        }
    }
}

impl<W: Write> Drop for TerminalUi<W> {
    fn drop(&mut self) {
        if self.is_raw_mode_owner {
            // Only disable raw mode if this instance was the one to enable it.
            // This prevents tests from disabling raw mode for the test runner.
            execute!(self.stdout, Print("\r\n")).ok();
            terminal::disable_raw_mode().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

    use super::*;

    // Create a new `TerminalUi` for testing with a fake width
    // and a `Vec<u8>` as the `stdout` buffer.
    fn setup_test_ui(cols: u16) -> TerminalUi<Vec<u8>> {
        TerminalUi {
            stdout: Vec::new(),
            buffer: String::new(),
            prompt_lines: 1,
            cols,
            is_raw_mode_owner: false,
        }
    }

    fn key_event(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(ui: &mut TerminalUi<Vec<u8>>, text: &str) {
        for c in text.chars() {
            ui.handle_event(key_event(KeyCode::Char(c)), MAX_INPUT_LENGTH)
                .expect("failed to handle char");
        }
    }

    #[test]
    fn test_simple_char_input() {
        let mut ui = setup_test_ui(80);

        type_text(&mut ui, "u");
        assert_eq!(ui.buffer, "u");
        assert_eq!(ui.prompt_lines, 1);

        type_text(&mut ui, "p");
        assert_eq!(ui.buffer, "up");
        assert_eq!(ui.prompt_lines, 1);
    }

    #[test]
    fn test_enter_key_returns_and_clears_buffer() {
        let mut ui = setup_test_ui(80);
        type_text(&mut ui, "tp 1 2");

        let result = ui
            .handle_event(key_event(KeyCode::Enter), MAX_INPUT_LENGTH)
            .expect("failed to handle Enter key");

        assert_eq!(result, Some("tp 1 2".to_string()));
        assert_eq!(ui.buffer, "");
        assert_eq!(ui.prompt_lines, 1);
    }

    #[test]
    fn test_backspace_and_escape_edit_the_buffer() {
        let mut ui = setup_test_ui(80);
        type_text(&mut ui, "undo");

        ui.handle_event(key_event(KeyCode::Backspace), MAX_INPUT_LENGTH)
            .expect("failed to handle backspace");
        assert_eq!(ui.buffer, "und");

        ui.handle_event(key_event(KeyCode::Esc), MAX_INPUT_LENGTH)
            .expect("failed to handle escape");
        assert_eq!(ui.buffer, "");

        // Backspace on empty buffer should do nothing.
        ui.handle_event(key_event(KeyCode::Backspace), MAX_INPUT_LENGTH)
            .expect("backspace on empty buffer failed");
        assert_eq!(ui.buffer, "");
    }

    #[test]
    fn test_input_stops_at_the_limit() {
        let mut ui = setup_test_ui(80);
        for _ in 0..4 {
            ui.handle_event(key_event(KeyCode::Char('x')), 3)
                .expect("failed to handle char");
        }
        assert_eq!(ui.buffer, "xxx");
    }

    #[test]
    fn test_arrow_keys_submit_moves_immediately() {
        let mut ui = setup_test_ui(80);
        type_text(&mut ui, "re");

        let result = ui
            .handle_event(key_event(KeyCode::Left), MAX_INPUT_LENGTH)
            .expect("failed to handle arrow key");

        assert_eq!(result, Some("left".to_string()));
        assert_eq!(ui.buffer, "re");
    }

    #[test]
    fn test_control_c_disconnects() {
        let mut ui = setup_test_ui(80);
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(
            ui.handle_event(event, MAX_INPUT_LENGTH),
            Err(UiInputError::Disconnected)
        );
    }

    #[test]
    fn test_multiline_backspace_unwraps_correctly() {
        // Prompt is "> ", which leaves 8 columns for the buffer on the first
        // line of a 10 column terminal.
        let mut ui = setup_test_ui(10);

        type_text(&mut ui, "12345678");
        assert_eq!(ui.prompt_lines, 1);

        type_text(&mut ui, "9");
        assert_eq!(ui.prompt_lines, 2);

        ui.handle_event(key_event(KeyCode::Backspace), MAX_INPUT_LENGTH)
            .expect("failed to handle backspace");
        assert_eq!(ui.buffer, "12345678");
        assert_eq!(ui.prompt_lines, 1);
    }

    #[test]
    fn test_board_is_written_line_by_line() {
        let mut ui = setup_test_ui(80);
        ui.show_board("+---+\n| @ |\n+---+");

        let output = String::from_utf8_lossy(&ui.stdout).to_string();
        assert!(output.contains("+---+\r\n| @ |\r\n+---+\r\n"));
    }

    #[test]
    fn test_errors_are_prefixed() {
        let mut ui = setup_test_ui(80);
        ui.show_error("a wall blocks the way");

        let output = String::from_utf8_lossy(&ui.stdout).to_string();
        assert!(output.contains("[ERROR] a wall blocks the way\r\n"));
    }
}
