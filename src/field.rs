use crate::error::OutOfBoundsError;
use crate::registry::DroneRecord;
use crate::types::{Direction, FIELD_SIZE, Position};
use crossterm::{
    ExecutableCommand,
    style::{Color, Print, ResetColor, SetForegroundColor},
};
use std::io::{self, Write};

/// Checks that `(x, y)` lies on the 10x10 field.
pub fn validate_bounds(x: i32, y: i32) -> Result<(), OutOfBoundsError> {
    if !(0..FIELD_SIZE).contains(&x) || !(0..FIELD_SIZE).contains(&y) {
        return Err(OutOfBoundsError { x, y });
    }
    Ok(())
}

pub fn validate_position(position: Position) -> Result<(), OutOfBoundsError> {
    validate_bounds(position.x, position.y)
}

/// Snapshot of which cells hold a drone, and which way it faces.
pub struct Field {
    pub cells: Vec<Vec<Option<Direction>>>,
}

impl Field {
    pub fn new() -> Self {
        Self {
            cells: vec![vec![None; FIELD_SIZE as usize]; FIELD_SIZE as usize],
        }
    }

    pub fn from_records(records: &[DroneRecord]) -> Self {
        let mut field = Self::new();
        for record in records {
            let Position { x, y } = record.state.position;
            if validate_bounds(x, y).is_ok() {
                field.cells[y as usize][x as usize] = Some(record.state.facing);
            }
        }
        field
    }

    pub fn get(&self, x: i32, y: i32) -> Option<Direction> {
        validate_bounds(x, y).ok()?;
        self.cells[y as usize][x as usize]
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|c| c.is_some()).count()
    }

    pub fn glyph(facing: Direction) -> char {
        match facing {
            Direction::North => '^',
            Direction::East => '>',
            Direction::South => 'v',
            Direction::West => '<',
        }
    }

    /// Plain-text rows, top row is y = 9 so NORTH points up.
    pub fn rows(&self) -> Vec<String> {
        (0..FIELD_SIZE)
            .rev()
            .map(|y| {
                (0..FIELD_SIZE)
                    .map(|x| self.get(x, y).map(Self::glyph).unwrap_or('.'))
                    .collect()
            })
            .collect()
    }

    pub fn display(&self) -> io::Result<()> {
        let mut stdout = io::stdout();

        stdout.execute(Print("\n=== Terrain ===\n"))?;
        stdout.execute(Print(format!("Drones: {}\n", self.occupied_count())))?;
        stdout.execute(Print("Légende: [.]Vide | [^]Nord | [>]Est | [v]Sud | [<]Ouest\n\n"))?;

        for y in (0..FIELD_SIZE).rev() {
            stdout.execute(SetForegroundColor(Color::DarkGrey))?;
            stdout.execute(Print(format!("{} ", y)))?;
            for x in 0..FIELD_SIZE {
                match self.get(x, y) {
                    Some(facing) => {
                        stdout.execute(SetForegroundColor(Color::Yellow))?;
                        stdout.execute(Print(format!("{} ", Self::glyph(facing))))?;
                    }
                    None => {
                        stdout.execute(SetForegroundColor(Color::DarkGrey))?;
                        stdout.execute(Print(". "))?;
                    }
                }
            }
            stdout.execute(ResetColor)?;
            stdout.execute(Print("\n"))?;
        }

        stdout.execute(SetForegroundColor(Color::DarkGrey))?;
        stdout.execute(Print("  "))?;
        for x in 0..FIELD_SIZE {
            stdout.execute(Print(format!("{} ", x)))?;
        }
        stdout.execute(ResetColor)?;
        stdout.execute(Print("\n\n"))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}
