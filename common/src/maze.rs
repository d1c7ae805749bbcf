pub mod generator;
pub mod seed;

use std::fmt;

use glam::{IVec2, ivec2};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

pub use generator::MazeGenerator;
pub use seed::{Seed, SeedError};

pub const SIZE: usize = 6;
pub const WALLS_PER_LINE: usize = SIZE + 1; // Both boundaries plus the five walls between cells.

// Rows grow downwards, so `Up` decreases `y`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum MazeDirection {
    #[strum(to_string = "up", serialize = "u")]
    Up,
    #[strum(to_string = "right", serialize = "r")]
    Right,
    #[strum(to_string = "down", serialize = "d")]
    Down,
    #[strum(to_string = "left", serialize = "l")]
    Left,
}

impl MazeDirection {
    pub fn offset(self) -> IVec2 {
        match self {
            MazeDirection::Up => ivec2(0, -1),
            MazeDirection::Right => ivec2(1, 0),
            MazeDirection::Down => ivec2(0, 1),
            MazeDirection::Left => ivec2(-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            MazeDirection::Up => MazeDirection::Down,
            MazeDirection::Right => MazeDirection::Left,
            MazeDirection::Down => MazeDirection::Up,
            MazeDirection::Left => MazeDirection::Right,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallState {
    #[default]
    Undecided,
    Absent,
    Present,
}

impl WallState {
    pub fn is_decided(self) -> bool {
        self != WallState::Undecided
    }

    // Undecided walls never block: they get decided when a cell beside them is entered.
    pub fn is_present(self) -> bool {
        self == WallState::Present
    }
}

/// Which wall array a wall lives in.
///
/// `Column` walls run across a column, separating vertically adjacent cells.
/// `Row` walls run across a row, separating horizontally adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WallAxis {
    Column,
    Row,
}

/// Address of one wall: `line` is the column (or row) it belongs to and
/// `index` counts walls along that line, 0 being the top (or left) boundary
/// and `SIZE` the bottom (or right) boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WallId {
    pub axis: WallAxis,
    pub line: usize,
    pub index: usize,
}

impl WallId {
    pub fn column(column: usize, index: usize) -> Self {
        Self {
            axis: WallAxis::Column,
            line: column,
            index,
        }
    }

    pub fn row(row: usize, index: usize) -> Self {
        Self {
            axis: WallAxis::Row,
            line: row,
            index,
        }
    }

    /// Whether the id addresses one of the walls of a 6x6 grid.
    pub fn is_in_range(&self) -> bool {
        self.line < SIZE && self.index < WALLS_PER_LINE
    }

    pub fn is_boundary(&self) -> bool {
        self.index == 0 || self.index == SIZE
    }

    /// The cells on either side of the wall. Boundary walls have only one.
    pub fn flanking_cells(&self) -> [Option<IVec2>; 2] {
        let line = self.line as i32;
        let index = self.index as i32;
        let (before, after) = match self.axis {
            WallAxis::Column => (ivec2(line, index - 1), ivec2(line, index)),
            WallAxis::Row => (ivec2(index - 1, line), ivec2(index, line)),
        };

        [
            is_in_bounds(before).then_some(before),
            is_in_bounds(after).then_some(after),
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeCell {
    pub position: IVec2,
    pub bit: u8, // 1 if the cell shows a ring.
}

impl MazeCell {
    pub fn has_ring(&self) -> bool {
        self.bit == 1
    }
}

pub fn is_in_bounds(position: IVec2) -> bool {
    position.x >= 0 && position.y >= 0 && position.x < SIZE as i32 && position.y < SIZE as i32
}

pub fn positions() -> impl Iterator<Item = IVec2> {
    (0..SIZE as i32).flat_map(|x| (0..SIZE as i32).map(move |y| ivec2(x, y)))
}

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMaze6x6 {
    cells: [[MazeCell; SIZE]; SIZE],                      // [column][row].
    column_walls: [[WallState; WALLS_PER_LINE]; SIZE], // [column][wall].
    row_walls: [[WallState; WALLS_PER_LINE]; SIZE],    // [row][wall].
    start: IVec2,
    goal: IVec2,
    origin: Seed, // The seed the maze was generated from.
    seed: Seed,
}

impl BitMaze6x6 {
    /// A maze with every boundary wall present and every interior wall undecided.
    pub fn new(bits: [[u8; SIZE]; SIZE], start: IVec2, goal: IVec2, origin: Seed) -> Self {
        debug_assert!(
            is_in_bounds(start) && is_in_bounds(goal),
            "start and goal must be inside the grid"
        );

        let cells = std::array::from_fn(|x| {
            std::array::from_fn(|y| MazeCell {
                position: ivec2(x as i32, y as i32),
                bit: bits[x][y] & 1,
            })
        });

        let mut column_walls = [[WallState::Undecided; WALLS_PER_LINE]; SIZE];
        let mut row_walls = [[WallState::Undecided; WALLS_PER_LINE]; SIZE];
        for line in 0..SIZE {
            for walls in [&mut column_walls[line], &mut row_walls[line]] {
                walls[0] = WallState::Present;
                walls[SIZE] = WallState::Present;
            }
        }

        Self {
            cells,
            column_walls,
            row_walls,
            start,
            goal,
            origin,
            seed: origin,
        }
    }

    pub fn cells(&self) -> &[[MazeCell; SIZE]; SIZE] {
        &self.cells
    }

    pub fn cell(&self, position: IVec2) -> Option<&MazeCell> {
        if is_in_bounds(position) {
            Some(&self.cells[position.x as usize][position.y as usize])
        } else {
            None
        }
    }

    pub fn column_walls(&self) -> &[[WallState; WALLS_PER_LINE]; SIZE] {
        &self.column_walls
    }

    pub fn row_walls(&self) -> &[[WallState; WALLS_PER_LINE]; SIZE] {
        &self.row_walls
    }

    pub fn start(&self) -> IVec2 {
        self.start
    }

    pub fn goal(&self) -> IVec2 {
        self.goal
    }

    pub fn origin(&self) -> Seed {
        self.origin
    }

    pub fn seed(&self) -> Seed {
        self.seed
    }

    pub(crate) fn set_seed(&mut self, seed: Seed) {
        self.seed = seed;
    }

    /// The state of a wall, or `None` if the id lies outside the grid.
    pub fn wall(&self, id: WallId) -> Option<WallState> {
        let walls = match id.axis {
            WallAxis::Column => &self.column_walls,
            WallAxis::Row => &self.row_walls,
        };
        walls.get(id.line)?.get(id.index).copied()
    }

    pub(crate) fn set_wall(&mut self, id: WallId, state: WallState) {
        debug_assert!(id.is_in_range(), "wall id is outside the grid");
        debug_assert!(
            !id.is_boundary() || state == WallState::Present,
            "boundary walls are always present"
        );

        match id.axis {
            WallAxis::Column => self.column_walls[id.line][id.index] = state,
            WallAxis::Row => self.row_walls[id.line][id.index] = state,
        }
    }

    pub fn wall_id_in_direction(&self, position: IVec2, direction: MazeDirection) -> Option<WallId> {
        if !is_in_bounds(position) {
            return None;
        }

        let x = position.x as usize;
        let y = position.y as usize;
        Some(match direction {
            MazeDirection::Up => WallId::column(x, y),
            MazeDirection::Down => WallId::column(x, y + 1),
            MazeDirection::Left => WallId::row(y, x),
            MazeDirection::Right => WallId::row(y, x + 1),
        })
    }

    pub fn adjacent_wall_in_direction(
        &self,
        position: IVec2,
        direction: MazeDirection,
    ) -> Option<WallState> {
        self.wall(self.wall_id_in_direction(position, direction)?)
    }

    pub fn neighbour(&self, position: IVec2, direction: MazeDirection) -> Option<IVec2> {
        let neighbour = position + direction.offset();
        is_in_bounds(neighbour).then_some(neighbour)
    }

    pub fn is_passable(&self, position: IVec2, direction: MazeDirection) -> bool {
        self.neighbour(position, direction).is_some()
            && self
                .adjacent_wall_in_direction(position, direction)
                .is_some_and(|wall| !wall.is_present())
    }

    /// The four walls of a cell. Empty for positions off the grid.
    pub fn walls_around(&self, position: IVec2) -> impl Iterator<Item = (MazeDirection, WallId)> {
        MazeDirection::iter().filter_map(move |direction| {
            Some((direction, self.wall_id_in_direction(position, direction)?))
        })
    }

    pub fn decided_wall_count(&self) -> usize {
        self.column_walls
            .iter()
            .chain(self.row_walls.iter())
            .flatten()
            .filter(|wall| wall.is_decided())
            .count()
    }

    pub fn check_invariants(&self) -> Result<(), &'static str> {
        if !is_in_bounds(self.start) || !is_in_bounds(self.goal) {
            return Err("start or goal is outside the grid");
        }

        if self.start == self.goal {
            return Err("start and goal coincide");
        }

        for position in positions() {
            let cell = &self.cells[position.x as usize][position.y as usize];
            if cell.position != position {
                return Err("cell position does not match its index");
            }
            if cell.bit > 1 {
                return Err("cell bit is neither 0 nor 1");
            }
        }

        for line in 0..SIZE {
            for walls in [&self.column_walls[line], &self.row_walls[line]] {
                if walls[0] != WallState::Present || walls[SIZE] != WallState::Present {
                    return Err("boundary wall is not present");
                }
            }
        }

        Ok(())
    }

    /// Draws the maze as text, asking `glyph` what to print in each cell.
    ///
    /// Only walls that are decided and present are drawn.
    pub fn draw(&self, glyph: impl Fn(&MazeCell) -> char) -> String {
        let mut lines = Vec::with_capacity(2 * SIZE + 1);

        for y in 0..=SIZE {
            let mut edge = String::from("+");
            for x in 0..SIZE {
                edge.push_str(if self.column_walls[x][y].is_present() {
                    "---"
                } else {
                    "   "
                });
                edge.push('+');
            }
            lines.push(edge);

            if y == SIZE {
                break;
            }

            let mut middle = String::new();
            for x in 0..=SIZE {
                middle.push(if self.row_walls[y][x].is_present() {
                    '|'
                } else {
                    ' '
                });
                if x < SIZE {
                    middle.push(' ');
                    middle.push(glyph(&self.cells[x][y]));
                    middle.push(' ');
                }
            }
            lines.push(middle);
        }

        lines.join("\n")
    }

    pub fn log(&self) -> String {
        self.draw(|cell| {
            if cell.position == self.goal {
                'G'
            } else if cell.position == self.start {
                'S'
            } else if cell.has_ring() {
                'o'
            } else {
                ' '
            }
        })
    }
}

#[cfg(test)]
impl BitMaze6x6 {
    pub(crate) fn column_walls_mut(&mut self) -> &mut [[WallState; WALLS_PER_LINE]; SIZE] {
        &mut self.column_walls
    }
}

impl fmt::Debug for BitMaze6x6 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "seed {} (from {})", self.seed, self.origin)?;
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for BitMaze6x6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.log())
    }
}
