//! Grid adapter. This module exists to map continuous world positions onto discrete
//! cells and answer O(1) terrain queries.
//! It does not own devices or agents; device-occupied cells are reported by the hazard set.

use serde::{Deserialize, Serialize};

use crate::types::{Cell, TileKind};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldPos {
    pub x: f32,
    pub y: f32,
}

impl WorldPos {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
    origin: WorldPos,
    cell_size: f32,
}

impl Grid {
    /// All-free grid with a unit transform at the world origin.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            tiles: vec![TileKind::Free; width * height],
            origin: WorldPos::default(),
            cell_size: 1.0,
        }
    }

    /// Free interior ringed by hard obstacles.
    pub fn with_border(width: usize, height: usize) -> Self {
        let mut grid = Self::new(width, height);
        for x in 0..width {
            grid.tiles[x] = TileKind::HardObstacle;
            grid.tiles[(height.saturating_sub(1)) * width + x] = TileKind::HardObstacle;
        }
        for y in 0..height {
            grid.tiles[y * width] = TileKind::HardObstacle;
            grid.tiles[y * width + width.saturating_sub(1)] = TileKind::HardObstacle;
        }
        grid
    }

    pub fn with_transform(mut self, origin: WorldPos, cell_size: f32) -> Self {
        self.origin = origin;
        self.cell_size = cell_size;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        self.index(cell).is_some()
    }

    /// Out-of-bounds cells read as hard obstacles, which keeps every search finite.
    pub fn classify(&self, cell: Cell) -> TileKind {
        self.index(cell).map_or(TileKind::HardObstacle, |idx| self.tiles[idx])
    }

    pub fn is_free(&self, cell: Cell) -> bool {
        self.classify(cell) == TileKind::Free
    }

    /// Returns `false` when the cell is out of bounds.
    pub fn set_tile(&mut self, cell: Cell, kind: TileKind) -> bool {
        match self.index(cell) {
            Some(idx) => {
                self.tiles[idx] = kind;
                true
            }
            None => false,
        }
    }

    /// Turns a soft obstacle into free ground. Other tiles are left untouched.
    pub fn destroy_soft_obstacle(&mut self, cell: Cell) -> bool {
        match self.index(cell) {
            Some(idx) if self.tiles[idx] == TileKind::SoftObstacle => {
                self.tiles[idx] = TileKind::Free;
                true
            }
            _ => false,
        }
    }

    pub fn to_cell(&self, world: WorldPos) -> Cell {
        let x = ((world.x - self.origin.x) / self.cell_size).floor();
        let y = ((world.y - self.origin.y) / self.cell_size).floor();
        Cell::new(x as i32, y as i32)
    }

    pub fn cell_center(&self, cell: Cell) -> WorldPos {
        WorldPos {
            x: self.origin.x + (cell.x as f32 + 0.5) * self.cell_size,
            y: self.origin.y + (cell.y as f32 + 0.5) * self.cell_size,
        }
    }

    /// Every in-bounds cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| Cell::new(x as i32, y as i32)))
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| **tile == kind).count()
    }

    fn index(&self, cell: Cell) -> Option<usize> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let (x, y) = (cell.x as usize, cell.y as usize);
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y * self.width + x)
    }
}
