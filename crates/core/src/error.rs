//! Error types surfaced by the arena core.

use std::io;

use thiserror::Error;

use crate::types::{AgentId, Cell};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("agent {0:?} is not registered")]
    UnknownAgent(AgentId),

    #[error("agent {0:?} has been eliminated")]
    AgentEliminated(AgentId),

    #[error("agent {0:?} has no devices remaining")]
    NoDevicesRemaining(AgentId),

    #[error("cell {0:?} already holds a live device")]
    CellOccupiedByDevice(Cell),

    #[error("spawn cell {0:?} is not free ground")]
    InvalidSpawn(Cell),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] io::Error),

    #[error("failed to parse config TOML")]
    Toml(#[from] toml::de::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    #[error("level layout is empty")]
    Empty,

    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },

    #[error("unknown glyph {glyph:?} at row {row}, column {column}")]
    UnknownGlyph { glyph: char, row: usize, column: usize },
}
