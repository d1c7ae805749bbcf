use std::collections::VecDeque;

use glam::{IVec2, ivec2};
use rand::{Rng, prelude::IndexedRandom, seq::SliceRandom};
use strum::IntoEnumIterator;
use tracing::debug;

use super::{BitMaze6x6, MazeDirection, SIZE, Seed, WallId, WallState, is_in_bounds, positions};

pub const WALL_PROBABILITY: f64 = 0.5;
pub const MIN_GOAL_DISTANCE: i32 = 4; // Manhattan distance between start and goal.

/// Builds mazes whose interior walls are only decided once a cell beside them
/// is entered.
pub struct MazeGenerator;

impl MazeGenerator {
    pub fn generate_new_maze() -> BitMaze6x6 {
        Self::generate_from_seed(Seed::random())
    }

    pub fn generate_from_seed(seed: Seed) -> BitMaze6x6 {
        let mut rng = seed.rng();

        let mut bits = [[0u8; SIZE]; SIZE];
        for column in bits.iter_mut() {
            for bit in column.iter_mut() {
                *bit = rng.random_range(0..2);
            }
        }

        let start = ivec2(
            rng.random_range(0..SIZE as i32),
            rng.random_range(0..SIZE as i32),
        );
        let candidates: Vec<IVec2> = positions()
            .filter(|position| manhattan_distance(*position, start) >= MIN_GOAL_DISTANCE)
            .collect();
        // Every cell of a 6x6 grid has a cell at least 5 steps away, so the
        // fallback to the opposite corner is never taken.
        let goal = candidates
            .choose(&mut rng)
            .copied()
            .unwrap_or(ivec2(SIZE as i32 - 1 - start.x, SIZE as i32 - 1 - start.y));

        let mut maze = BitMaze6x6::new(bits, start, goal, seed);
        maze.set_seed(Seed::new(rng.random()));

        Self::decide_walls_around_cell(&mut maze, start, &[]);

        debug!(%seed, ?start, ?goal, "generated maze");
        maze
    }

    /// Decides every undecided wall around `position`, which is being
    /// entered for the first time, and advances the maze's seed.
    ///
    /// Walls shared with a visited cell are opened. The rest are raised at
    /// random, then reopened in random order until every cell can still be
    /// reached. Returns the walls decided, in the order they were decided.
    pub fn decide_walls_around_cell(
        maze: &mut BitMaze6x6,
        position: IVec2,
        visited: &[IVec2],
    ) -> Vec<WallId> {
        let mut rng = maze.seed().rng();
        let mut revealed = Vec::new();
        let mut raised = Vec::new();

        for (direction, id) in maze.walls_around(position).collect::<Vec<_>>() {
            if maze.wall(id).is_some_and(WallState::is_decided) {
                continue;
            }

            // Cells entered through a handler already have every shared wall
            // decided, so this only fires for direct callers.
            let is_neighbour_visited = maze
                .neighbour(position, direction)
                .is_some_and(|neighbour| visited.contains(&neighbour));

            let state = if is_neighbour_visited || !rng.random_bool(WALL_PROBABILITY) {
                WallState::Absent
            } else {
                raised.push(id);
                WallState::Present
            };

            maze.set_wall(id, state);
            revealed.push(id);
        }

        if !raised.is_empty() && !Self::is_fully_reachable(maze, position) {
            // Reopening every raised wall restores the connectivity the maze
            // had before this cell was entered.
            raised.shuffle(&mut rng);
            for id in raised {
                maze.set_wall(id, WallState::Absent);
                if Self::is_fully_reachable(maze, position) {
                    break;
                }
            }
        }

        let next = Seed::new(rng.random());
        maze.set_seed(next);

        debug!(
            cell = ?position,
            revealed = revealed.len(),
            seed = %next,
            "decided walls around cell"
        );

        revealed
    }

    /// Whether every cell can be reached from `from` without crossing a
    /// present wall. Undecided walls count as open. False when `from` is off
    /// the grid.
    pub fn is_fully_reachable(maze: &BitMaze6x6, from: IVec2) -> bool {
        if !is_in_bounds(from) {
            return false;
        }

        let mut seen = [[false; SIZE]; SIZE];
        let mut queue = VecDeque::new();
        let mut reached = 0;

        seen[from.x as usize][from.y as usize] = true;
        queue.push_back(from);

        while let Some(position) = queue.pop_front() {
            reached += 1;

            for direction in MazeDirection::iter() {
                if !maze.is_passable(position, direction) {
                    continue;
                }
                let Some(next) = maze.neighbour(position, direction) else {
                    continue;
                };
                if seen[next.x as usize][next.y as usize] {
                    continue;
                }
                seen[next.x as usize][next.y as usize] = true;
                queue.push_back(next);
            }
        }

        reached == SIZE * SIZE
    }
}

fn manhattan_distance(a: IVec2, b: IVec2) -> i32 {
    (a - b).abs().element_sum()
}
