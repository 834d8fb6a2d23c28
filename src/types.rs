//! # Drone Fleet Types Module
//!
//! This module defines the core value types shared by every layer of the fleet
//! service: the four cardinal facings, the two axes of motion, grid positions and
//! the `(position, facing)` pair that describes a drone.
//!
//! ## Key Components
//!
//! - **Direction**: The four facings and their turn relationships (opposite, perpendicular)
//! - **Axis**: The X (EAST/WEST) or Y (NORTH/SOUTH) dimension of motion
//! - **Position**: An `(x, y)` cell on the field
//! - **DroneState**: The position and facing of one drone
//! - **FIELD_SIZE**: Global constant defining the dimensions of the field
//!
//! All types are serializable so they can travel over the wire and into history files.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DroneError;

/// NOTE - Global constant for field size (square grid, cells 0..=9)
pub const FIELD_SIZE: i32 = 10;

/// NOTE - Enum for the two axes of motion
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X, // NOTE - EAST/WEST
    Y, // NOTE - NORTH/SOUTH
}

/// NOTE - Enum for the four cardinal facings
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    North, // NOTE - towards increasing y
    East,  // NOTE - towards increasing x
    South, // NOTE - towards decreasing y
    West,  // NOTE - towards decreasing x
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// The 180-degree reversed facing.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    pub fn is_opposite(self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// True when `other` is a quarter turn away from `self`.
    pub fn is_perpendicular(self, other: Direction) -> bool {
        self.axis() != other.axis()
    }

    pub fn axis(self) -> Axis {
        match self {
            Direction::North | Direction::South => Axis::Y,
            Direction::East | Direction::West => Axis::X,
        }
    }

    /// Facing required to travel `delta` cells along `axis`.
    ///
    /// Only meaningful for a non-zero delta; zero resolves to the negative
    /// facing of the axis and callers skip it before asking.
    pub fn toward(axis: Axis, delta: i32) -> Direction {
        match (axis, delta > 0) {
            (Axis::X, true) => Direction::East,
            (Axis::X, false) => Direction::West,
            (Axis::Y, true) => Direction::North,
            (Axis::Y, false) => Direction::South,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::North => "NORTH",
            Direction::East => "EAST",
            Direction::South => "SOUTH",
            Direction::West => "WEST",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = DroneError;

    // Case-insensitive, so "North", "north" and "NORTH" are all accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DroneError::InvalidDirection(s.to_string()))
    }
}

/// A cell on the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn coord(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
        }
    }

    /// Copy of `self` with the coordinate on `axis` replaced.
    pub fn with_coord(self, axis: Axis, value: i32) -> Self {
        match axis {
            Axis::X => Self { x: value, ..self },
            Axis::Y => Self { y: value, ..self },
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Position and facing of a single drone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DroneState {
    pub position: Position,
    pub facing: Direction,
}

impl DroneState {
    pub fn new(x: i32, y: i32, facing: Direction) -> Self {
        Self {
            position: Position::new(x, y),
            facing,
        }
    }
}
