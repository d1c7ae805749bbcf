use common::handler::MazeHandler;
use common::maze::{MazeCell, SIZE};

pub const CURRENT: char = '@';
pub const GOAL: char = 'G';
pub const RING: char = 'o';
pub const VISITED: char = '·';

pub fn render_board(handler: &MazeHandler) -> String {
    let board = handler.maze().draw(|cell| glyph(handler, cell));
    format!("{}\n{}", board, status_line(handler))
}

fn glyph(handler: &MazeHandler, cell: &MazeCell) -> char {
    if cell.position == handler.current() {
        CURRENT
    } else if cell.position == handler.maze().goal() {
        GOAL
    } else if cell.has_ring() {
        RING
    } else if handler.is_visited(cell.position) {
        VISITED
    } else {
        ' '
    }
}

pub fn status_line(handler: &MazeHandler) -> String {
    let mut status = format!(
        "Maze {} | moves {} | explored {}/{}",
        handler.maze().origin(),
        handler.moves_made(),
        handler.visited().len(),
        SIZE * SIZE
    );

    if handler.is_solved() {
        status.push_str(" | solved!");
    }

    status
}
