//! ASCII level layouts.
//!
//! Legend: `#` hard obstacle, `%` soft obstacle, `.` free ground, `1`-`9` spawn points,
//! `+` extra-device power-up, `^` blast-radius power-up. Surrounding whitespace on each
//! line and blank lines are ignored.

use std::collections::BTreeMap;

use crate::error::LevelError;
use crate::grid::Grid;
use crate::types::{Cell, PowerUp, TileKind};

#[derive(Clone, Debug, PartialEq)]
pub struct Level {
    pub grid: Grid,
    /// Spawn cells ordered by their digit.
    pub spawns: Vec<Cell>,
    pub power_ups: BTreeMap<Cell, PowerUp>,
}

impl Level {
    pub fn parse(layout: &str) -> Result<Self, LevelError> {
        let rows: Vec<&str> =
            layout.lines().map(str::trim).filter(|line| !line.is_empty()).collect();
        let Some(first) = rows.first() else {
            return Err(LevelError::Empty);
        };
        let width = first.chars().count();

        let mut grid = Grid::new(width, rows.len());
        let mut spawns = BTreeMap::new();
        let mut power_ups = BTreeMap::new();

        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != width {
                return Err(LevelError::RaggedRow { row, expected: width, found });
            }
            for (column, glyph) in line.chars().enumerate() {
                let cell = Cell::new(column as i32, row as i32);
                let tile = match glyph {
                    '#' => TileKind::HardObstacle,
                    '%' => TileKind::SoftObstacle,
                    '.' => TileKind::Free,
                    '+' => {
                        power_ups.insert(cell, PowerUp::ExtraDevice);
                        TileKind::Free
                    }
                    '^' => {
                        power_ups.insert(cell, PowerUp::BlastRadius);
                        TileKind::Free
                    }
                    '1'..='9' => {
                        spawns.insert(glyph, cell);
                        TileKind::Free
                    }
                    _ => return Err(LevelError::UnknownGlyph { glyph, row, column }),
                };
                grid.set_tile(cell, tile);
            }
        }

        Ok(Self { grid, spawns: spawns.into_values().collect(), power_ups })
    }
}
