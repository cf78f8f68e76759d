//! Autopilot: breadth-first shortest path from head to food
//!
//! Re-derived from scratch every logical step; there is no cached path, so
//! the search always sees the current occupancy. The tail cell counts as
//! walkable because it vacates on the same step the head would enter it
//! (a one-ply lookahead, not a simulation).

use std::collections::VecDeque;

use super::grid::{Cell, Direction, GridBounds, DIRECTIONS};
use super::obstacle::ObstacleManager;
use super::snake::Snake;

/// Pick the next move toward `food`. Falls back to any immediately safe
/// neighbor when no path exists, and to `Up` when nothing is safe (accepting
/// that the next step is fatal). `None` only for a degenerate empty snake.
pub fn next_move(
    snake: &Snake,
    food: Cell,
    obstacles: &ObstacleManager,
    bounds: GridBounds,
) -> Option<Direction> {
    if snake.is_empty() {
        return None;
    }
    let head = snake.head();
    let tail = snake.tail();
    let walkable = |cell: Cell| {
        bounds.contains(cell)
            && !obstacles.contains(cell)
            && (cell == tail || !snake.contains(cell))
    };

    if let Some(dir) = bfs_first_step(head, food, bounds, &walkable) {
        return Some(dir);
    }

    // No route to the food: take the first safe neighbor in canonical order.
    for dir in DIRECTIONS {
        if walkable(head + dir.vector()) {
            return Some(dir);
        }
    }

    // Boxed in; the default keeps the contract total.
    Some(Direction::Up)
}

/// BFS over the grid; returns the first step of the shortest path, ties
/// broken by the fixed {up, down, left, right} neighbor order.
fn bfs_first_step<F>(head: Cell, goal: Cell, bounds: GridBounds, walkable: &F) -> Option<Direction>
where
    F: Fn(Cell) -> bool,
{
    if head == goal {
        return None;
    }
    let index = |c: Cell| (c.y * bounds.width + c.x) as usize;
    let mut came_from: Vec<Option<(Cell, Direction)>> = vec![None; bounds.cell_count() as usize];
    let mut visited = vec![false; bounds.cell_count() as usize];
    visited[index(head)] = true;

    let mut frontier = VecDeque::new();
    frontier.push_back(head);

    while let Some(cell) = frontier.pop_front() {
        for dir in DIRECTIONS {
            let next = cell + dir.vector();
            if !walkable(next) || (next != goal && visited[index(next)]) {
                continue;
            }
            if next == goal {
                // Walk back to the step taken out of the head cell
                let mut step = dir;
                let mut at = cell;
                while at != head {
                    let (prev, prev_dir) = came_from[index(at)]?;
                    step = prev_dir;
                    at = prev;
                }
                return Some(step);
            }
            visited[index(next)] = true;
            came_from[index(next)] = Some((cell, dir));
            frontier.push_back(next);
        }
    }
    None
}

/// Shortest-path length from `head` to `goal` under the same walkability
/// rules.
pub fn path_len<F>(head: Cell, goal: Cell, bounds: GridBounds, walkable: &F) -> Option<usize>
where
    F: Fn(Cell) -> bool,
{
    if head == goal {
        return Some(0);
    }
    let index = |c: Cell| (c.y * bounds.width + c.x) as usize;
    let mut dist: Vec<u32> = vec![u32::MAX; bounds.cell_count() as usize];
    dist[index(head)] = 0;
    let mut frontier = VecDeque::new();
    frontier.push_back(head);
    while let Some(cell) = frontier.pop_front() {
        let d = dist[index(cell)];
        for dir in DIRECTIONS {
            let next = cell + dir.vector();
            if next == goal {
                return Some(d as usize + 1);
            }
            if walkable(next) && dist[index(next)] == u32::MAX {
                dist[index(next)] = d + 1;
                frontier.push_back(next);
            }
        }
    }
    None
}
