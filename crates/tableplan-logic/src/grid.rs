//! Room grid — cell state and bounds-checked accessors.
//!
//! The grid is a fixed-size row-major array of [`Cell`]. Walls survive a
//! [`Grid::resize`] within the overlapping region; everything else is
//! cleared, since a resize invalidates the prior furniture layout.

use serde::{Deserialize, Serialize};

/// One semantic role per grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    TableBody,
    Seat,
    Entrance,
    Wall,
}

impl Cell {
    /// Single-character symbol used in template patterns and text dumps.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::TableBody => 'S',
            Cell::Seat => 'h',
            Cell::Entrance => 'E',
            Cell::Wall => 'W',
        }
    }

    /// Inverse of [`Cell::symbol`]. Returns `None` for unknown characters.
    pub fn from_symbol(c: char) -> Option<Cell> {
        match c {
            '.' => Some(Cell::Empty),
            'S' => Some(Cell::TableBody),
            'h' => Some(Cell::Seat),
            'E' => Some(Cell::Entrance),
            'W' => Some(Cell::Wall),
            _ => None,
        }
    }
}

/// Errors from grid construction and access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridError {
    /// Width or height is not positive.
    InvalidDimension { width: i32, height: i32 },
    /// Coordinate access outside the grid.
    OutOfBounds { x: i32, y: i32 },
}

impl std::fmt::Display for GridError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GridError::InvalidDimension { width, height } => {
                write!(f, "invalid room dimensions: {}x{}", width, height)
            }
            GridError::OutOfBounds { x, y } => {
                write!(f, "cell ({}, {}) is outside the room", x, y)
            }
        }
    }
}

impl std::error::Error for GridError {}

/// Fixed-size room grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Allocate a grid of Empty cells.
    pub fn new(width: i32, height: i32) -> Result<Grid, GridError> {
        if width <= 0 || height <= 0 {
            return Err(GridError::InvalidDimension { width, height });
        }
        Ok(Grid {
            width,
            height,
            cells: vec![Cell::Empty; (width * height) as usize],
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    pub fn get(&self, x: i32, y: i32) -> Result<Cell, GridError> {
        if !self.in_bounds(x, y) {
            return Err(GridError::OutOfBounds { x, y });
        }
        Ok(self.cells[(y * self.width + x) as usize])
    }

    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> Result<(), GridError> {
        if !self.in_bounds(x, y) {
            return Err(GridError::OutOfBounds { x, y });
        }
        self.cells[(y * self.width + x) as usize] = cell;
        Ok(())
    }

    /// Resize the room, preserving Wall cells in the overlapping top-left
    /// region. All other cells become Empty — furniture and entrance
    /// markings are intentionally discarded.
    pub fn resize(&mut self, new_width: i32, new_height: i32) -> Result<(), GridError> {
        if new_width <= 0 || new_height <= 0 {
            return Err(GridError::InvalidDimension {
                width: new_width,
                height: new_height,
            });
        }
        let mut cells = vec![Cell::Empty; (new_width * new_height) as usize];
        for y in 0..self.height.min(new_height) {
            for x in 0..self.width.min(new_width) {
                if self.cells[(y * self.width + x) as usize] == Cell::Wall {
                    cells[(y * new_width + x) as usize] = Cell::Wall;
                }
            }
        }
        self.width = new_width;
        self.height = new_height;
        self.cells = cells;
        Ok(())
    }

    /// Reset every non-Wall cell to Empty. Used when a new placement run
    /// starts on an existing room.
    pub fn clear_furnishings(&mut self) {
        for cell in &mut self.cells {
            if *cell != Cell::Wall {
                *cell = Cell::Empty;
            }
        }
    }

    /// Count of Empty cells.
    pub fn free_cells(&self) -> usize {
        self.cells.iter().filter(|&&c| c == Cell::Empty).count()
    }

    /// Multi-line text dump of the room, one symbol per cell.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity((self.width as usize + 1) * self.height as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                out.push(self.cells[(y * self.width + x) as usize].symbol());
            }
            if y < self.height - 1 {
                out.push('\n');
            }
        }
        out
    }
}
