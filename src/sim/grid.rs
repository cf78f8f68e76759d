//! Grid coordinates and the four cardinal directions

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// One grid cell. `x` grows rightward, `y` grows downward (canvas order).
pub type Cell = IVec2;

/// Fixed-per-session board dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridBounds {
    pub width: i32,
    pub height: i32,
}

impl GridBounds {
    pub fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.x >= 0 && cell.x < self.width && cell.y >= 0 && cell.y < self.height
    }

    pub fn cell_count(&self) -> u32 {
        (self.width * self.height) as u32
    }
}

/// The single closed direction type used end-to-end: input handling,
/// recording, playback and simulation. Vector and name mappings happen
/// only at the boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    /// Sessions start moving right
    #[default]
    Right,
}

/// BFS neighbor enumeration order; also the canonical tie-break order.
pub const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Down,
    Direction::Left,
    Direction::Right,
];

impl Direction {
    /// Unit vector in canvas coordinates (y grows downward, so Up is -y).
    pub fn vector(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    /// Map a raw vector back to a direction. Anything that is not one of the
    /// four unit vectors is `None` and gets dropped at the boundary.
    pub fn from_vector(v: IVec2) -> Option<Self> {
        match (v.x, v.y) {
            (0, -1) => Some(Direction::Up),
            (0, 1) => Some(Direction::Down),
            (-1, 0) => Some(Direction::Left),
            (1, 0) => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let b = GridBounds::new(30, 20);
        assert!(b.contains(Cell::new(0, 0)));
        assert!(b.contains(Cell::new(29, 19)));
        assert!(!b.contains(Cell::new(30, 0)));
        assert!(!b.contains(Cell::new(0, 20)));
        assert!(!b.contains(Cell::new(-1, 5)));
    }

    #[test]
    fn test_vector_round_trip() {
        for dir in DIRECTIONS {
            assert_eq!(Direction::from_vector(dir.vector()), Some(dir));
        }
        assert_eq!(Direction::from_vector(IVec2::new(1, 1)), None);
        assert_eq!(Direction::from_vector(IVec2::new(0, 0)), None);
        assert_eq!(Direction::from_vector(IVec2::new(2, 0)), None);
    }

    #[test]
    fn test_opposites() {
        for dir in DIRECTIONS {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_eq!(dir.vector() + dir.opposite().vector(), IVec2::ZERO);
        }
    }

    #[test]
    fn test_name_round_trip() {
        for dir in DIRECTIONS {
            assert_eq!(Direction::from_str(dir.as_str()), Some(dir));
        }
        assert_eq!(Direction::from_str("diagonal"), None);
    }
}
