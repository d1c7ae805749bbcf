use std::fmt;

use glam::IVec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::maze::{
    BitMaze6x6, MazeDirection, MazeGenerator, SIZE, Seed, WallId, WallState, is_in_bounds,
    positions,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    Step(MazeDirection),
    Teleport,
}

/// One undoable navigation step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub kind: MovementKind,
    pub from: IVec2,
    pub revealed: Vec<WallId>, // Walls decided because of this step.
    pub previous_seed: Seed,
    pub discovered: bool, // True if the step entered a cell for the first time.
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved { revealed: usize },
    ReachedGoal { revealed: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    NothingToUndo,
    OutOfBounds(IVec2),
    NotVisited(IVec2),
    AlreadyThere,
}

impl fmt::Display for NavigationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigationError::NothingToUndo => write!(f, "there is nothing to undo"),
            NavigationError::OutOfBounds(position) => write!(
                f,
                "cell ({}, {}) is outside the {}x{} grid",
                position.x, position.y, SIZE, SIZE
            ),
            NavigationError::NotVisited(position) => {
                write!(f, "cell ({}, {}) has not been visited yet", position.x, position.y)
            }
            NavigationError::AlreadyThere => write!(f, "already in that cell"),
        }
    }
}

impl std::error::Error for NavigationError {}

/// Tracks the player's position in a maze along with enough history to undo
/// every step, including the walls each step revealed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeHandler {
    maze: BitMaze6x6,
    current: IVec2,
    visited: Vec<IVec2>, // Stack, in order of discovery.
    history: Vec<Movement>,
}

impl MazeHandler {
    pub fn new() -> Self {
        Self::from_maze(MazeGenerator::generate_new_maze())
    }

    pub fn from_seed(seed: Seed) -> Self {
        Self::from_maze(MazeGenerator::generate_from_seed(seed))
    }

    pub fn from_maze(mut maze: BitMaze6x6) -> Self {
        let current = maze.start();
        let is_start_decided = maze
            .walls_around(current)
            .all(|(_, id)| maze.wall(id).is_some_and(WallState::is_decided));
        if !is_start_decided {
            MazeGenerator::decide_walls_around_cell(&mut maze, current, &[]);
        }
        debug!(seed = %maze.seed(), "new maze handler");

        Self {
            maze,
            current,
            visited: vec![current],
            history: Vec::new(),
        }
    }

    pub fn maze(&self) -> &BitMaze6x6 {
        &self.maze
    }

    pub fn current(&self) -> IVec2 {
        self.current
    }

    pub fn visited(&self) -> &[IVec2] {
        &self.visited
    }

    pub fn is_visited(&self, position: IVec2) -> bool {
        self.visited.contains(&position)
    }

    pub fn history(&self) -> &[Movement] {
        &self.history
    }

    pub fn moves_made(&self) -> usize {
        self.history.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn is_solved(&self) -> bool {
        self.current == self.maze.goal()
    }

    pub fn seed(&self) -> Seed {
        self.maze.seed()
    }

    pub fn move_in(&mut self, direction: MazeDirection) -> MoveOutcome {
        let next = match self.maze.neighbour(self.current, direction) {
            Some(next) if self.maze.is_passable(self.current, direction) => next,
            _ => {
                debug!(cell = ?self.current, %direction, "bumped into a wall");
                return MoveOutcome::Blocked;
            }
        };

        let from = self.current;
        let previous_seed = self.maze.seed();
        let discovered = !self.is_visited(next);

        self.current = next;

        let revealed = if discovered {
            let revealed =
                MazeGenerator::decide_walls_around_cell(&mut self.maze, next, &self.visited);
            self.visited.push(next);
            revealed
        } else {
            Vec::new()
        };

        let count = revealed.len();
        self.history.push(Movement {
            kind: MovementKind::Step(direction),
            from,
            revealed,
            previous_seed,
            discovered,
        });

        debug!(
            from = ?from,
            to = ?next,
            seed = %self.maze.seed(),
            "moved"
        );

        if self.is_solved() {
            info!(moves = self.history.len(), "goal reached");
            MoveOutcome::ReachedGoal { revealed: count }
        } else {
            MoveOutcome::Moved { revealed: count }
        }
    }

    pub fn undo(&mut self) -> Result<Movement, NavigationError> {
        let movement = self.history.pop().ok_or(NavigationError::NothingToUndo)?;

        for &id in &movement.revealed {
            self.maze.set_wall(id, WallState::Undecided);
        }
        self.maze.set_seed(movement.previous_seed);

        if movement.discovered {
            self.visited.pop();
        }
        self.current = movement.from;

        debug!(to = ?self.current, seed = %self.maze.seed(), "undid movement");
        Ok(movement)
    }

    /// Jumps straight to a cell that has already been visited.
    pub fn teleport(&mut self, target: IVec2) -> Result<(), NavigationError> {
        if !is_in_bounds(target) {
            return Err(NavigationError::OutOfBounds(target));
        }
        if target == self.current {
            return Err(NavigationError::AlreadyThere);
        }
        if !self.is_visited(target) {
            return Err(NavigationError::NotVisited(target));
        }

        self.history.push(Movement {
            kind: MovementKind::Teleport,
            from: self.current,
            revealed: Vec::new(),
            previous_seed: self.maze.seed(),
            discovered: false,
        });
        self.current = target;

        debug!(to = ?target, "teleported");
        Ok(())
    }

    /// Undoes every movement, returning how many there were.
    pub fn reset(&mut self) -> usize {
        let mut undone = 0;
        while self.undo().is_ok() {
            undone += 1;
        }

        info!(undone, "maze reset");
        undone
    }

    /// Checks the relationships between the maze, the visited stack and the
    /// history that every sequence of moves preserves.
    pub fn check_invariants(&self) -> Result<(), &'static str> {
        self.maze.check_invariants()?;

        if self.visited.first() != Some(&self.maze.start()) {
            return Err("visited cells do not start at the start cell");
        }
        if self.visited.iter().any(|position| !is_in_bounds(*position)) {
            return Err("visited cell is outside the grid");
        }
        for (i, position) in self.visited.iter().enumerate() {
            if self.visited[..i].contains(position) {
                return Err("cell visited twice");
            }
        }
        if !self.is_visited(self.current) {
            return Err("current cell has not been visited");
        }

        let discovered = self.history.iter().filter(|m| m.discovered).count();
        if discovered + 1 != self.visited.len() {
            return Err("history does not account for the visited cells");
        }
        for movement in &self.history {
            if !is_in_bounds(movement.from) {
                return Err("movement starts outside the grid");
            }
            if !self.is_visited(movement.from) {
                return Err("movement starts from a cell that has not been visited");
            }
            if movement
                .revealed
                .iter()
                .any(|id| !id.is_in_range() || id.is_boundary())
            {
                return Err("movement reveals a wall that cannot be undecided");
            }
            if !movement.discovered && !movement.revealed.is_empty() {
                return Err("movement reveals walls without entering a new cell");
            }
        }
        if self.history.first().is_some_and(|m| m.from != self.maze.start()) {
            return Err("history does not begin at the start cell");
        }

        for position in positions().filter(|p| self.is_visited(*p)) {
            for (_, id) in self.maze.walls_around(position) {
                if !self.maze.wall(id).is_some_and(WallState::is_decided) {
                    return Err("visited cell has an undecided wall");
                }
            }
        }
        for line in 0..SIZE {
            for index in 1..SIZE {
                for id in [WallId::column(line, index), WallId::row(line, index)] {
                    let touches_visited = id
                        .flanking_cells()
                        .iter()
                        .flatten()
                        .any(|position| self.is_visited(*position));
                    if self.maze.wall(id).is_some_and(WallState::is_decided) && !touches_visited {
                        return Err("wall decided between unvisited cells");
                    }
                }
            }
        }

        Ok(())
    }

    /// Undoes the whole history on a copy and plays it forward again, which
    /// must land on exactly this handler. Assumes `check_invariants` passed.
    pub fn check_history(&self) -> Result<(), &'static str> {
        let mut replay = self.clone();
        while replay.undo().is_ok() {}

        if replay.current != replay.maze.start() || replay.visited.len() != 1 {
            return Err("history does not lead back to the start cell");
        }

        // A teleport's target is where the next movement starts.
        let targets = self
            .history
            .iter()
            .skip(1)
            .map(|m| m.from)
            .chain(std::iter::once(self.current));
        for (movement, target) in self.history.iter().zip(targets) {
            match movement.kind {
                MovementKind::Step(direction) => {
                    if replay.move_in(direction) == MoveOutcome::Blocked {
                        return Err("recorded step crosses a wall");
                    }
                }
                MovementKind::Teleport => replay
                    .teleport(target)
                    .map_err(|_| "recorded teleport is not allowed")?,
            }
        }

        if replay != *self {
            return Err("history does not replay to the recorded state");
        }
        Ok(())
    }
}

#[cfg(test)]
impl MazeHandler {
    pub(crate) fn maze_mut(&mut self) -> &mut BitMaze6x6 {
        &mut self.maze
    }

    pub(crate) fn set_current(&mut self, position: IVec2) {
        self.current = position;
    }

    pub(crate) fn history_mut(&mut self) -> &mut Vec<Movement> {
        &mut self.history
    }
}

impl Default for MazeHandler {
    fn default() -> Self {
        Self::new()
    }
}
