//! Furniture templates and orientation variants.
//!
//! A [`Template`] is an immutable rectangular pattern over
//! {Empty, TableBody, Seat}. The variant set of a base pattern is the
//! deduplicated result of rotating it 90/180/270 degrees and mirroring it
//! horizontally and vertically. Enumeration order is stable (original,
//! rot90, rot180, rot270, mirror-H, mirror-V) so that variant selection is
//! reproducible under a fixed random seed.
//!
//! All functions here are pure — no shared mutable state, safe to call
//! concurrently.

use crate::grid::Cell;
use serde::{Deserialize, Serialize};

/// Errors from parsing a textual template pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// The pattern has no rows, or a row has no columns.
    EmptyPattern,
    /// Rows have differing lengths.
    RaggedPattern,
    /// A character that is not `.`, `S`, or `h`.
    UnknownSymbol(char),
}

impl std::fmt::Display for ShapeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShapeError::EmptyPattern => write!(f, "template pattern is empty"),
            ShapeError::RaggedPattern => write!(f, "template rows have differing lengths"),
            ShapeError::UnknownSymbol(c) => write!(f, "unknown template symbol '{}'", c),
        }
    }
}

impl std::error::Error for ShapeError {}

/// Rectangular furniture pattern. Cells are restricted to Empty,
/// TableBody, and Seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    rows: Vec<Vec<Cell>>,
}

impl Template {
    /// Parse a pattern from symbol rows (`.` empty, `S` table body,
    /// `h` seat).
    pub fn parse<S: AsRef<str>>(pattern: &[S]) -> Result<Template, ShapeError> {
        if pattern.is_empty() {
            return Err(ShapeError::EmptyPattern);
        }
        let mut rows = Vec::with_capacity(pattern.len());
        for line in pattern {
            let line = line.as_ref();
            let mut row = Vec::with_capacity(line.len());
            for c in line.chars() {
                match Cell::from_symbol(c) {
                    Some(cell @ (Cell::Empty | Cell::TableBody | Cell::Seat)) => row.push(cell),
                    _ => return Err(ShapeError::UnknownSymbol(c)),
                }
            }
            rows.push(row);
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(ShapeError::EmptyPattern);
        }
        if rows.iter().any(|r| r.len() != width) {
            return Err(ShapeError::RaggedPattern);
        }
        Ok(Template { rows })
    }

    /// Columns of the bounding rectangle.
    pub fn width(&self) -> i32 {
        self.rows[0].len() as i32
    }

    /// Rows of the bounding rectangle.
    pub fn height(&self) -> i32 {
        self.rows.len() as i32
    }

    /// Cell at template-local coordinates. Callers stay within
    /// `width()`/`height()`.
    pub fn cell(&self, dx: i32, dy: i32) -> Cell {
        self.rows[dy as usize][dx as usize]
    }

    /// Iterate all template-local positions with their cells.
    pub fn cells(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.rows.iter().enumerate().flat_map(|(dy, row)| {
            row.iter()
                .enumerate()
                .map(move |(dx, &cell)| (dx as i32, dy as i32, cell))
        })
    }

    /// Template-local offsets of all Seat cells.
    pub fn seat_offsets(&self) -> Vec<(i32, i32)> {
        self.cells()
            .filter(|&(_, _, c)| c == Cell::Seat)
            .map(|(dx, dy, _)| (dx, dy))
            .collect()
    }

    /// 90-degree clockwise rotation (transpose with row reversal).
    pub fn rotate90(&self) -> Template {
        let h = self.rows.len();
        let w = self.rows[0].len();
        let mut rows = vec![vec![Cell::Empty; h]; w];
        for (r, row) in self.rows.iter().enumerate() {
            for (c, &cell) in row.iter().enumerate() {
                rows[c][h - 1 - r] = cell;
            }
        }
        Template { rows }
    }

    /// 180-degree rotation, composed from the two mirrors.
    pub fn rotate180(&self) -> Template {
        self.mirror_v().mirror_h()
    }

    /// 270-degree rotation, composed from rot90 and rot180.
    pub fn rotate270(&self) -> Template {
        self.rotate180().rotate90()
    }

    /// Mirror horizontally (reverse each row).
    pub fn mirror_h(&self) -> Template {
        Template {
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().rev().copied().collect())
                .collect(),
        }
    }

    /// Mirror vertically (reverse row order).
    pub fn mirror_v(&self) -> Template {
        Template {
            rows: self.rows.iter().rev().cloned().collect(),
        }
    }

    /// All distinct orientations of this template, in stable order:
    /// original, rot90, rot180, rot270, mirror-H, mirror-V. Identical
    /// patterns collapse, so symmetric shapes yield fewer than six.
    pub fn variants(&self) -> Vec<Template> {
        let candidates = [
            self.clone(),
            self.rotate90(),
            self.rotate180(),
            self.rotate270(),
            self.mirror_h(),
            self.mirror_v(),
        ];
        let mut variants: Vec<Template> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !variants.contains(&candidate) {
                variants.push(candidate);
            }
        }
        variants
    }

    /// Pattern as symbol rows, the inverse of [`Template::parse`].
    pub fn pattern(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.iter().map(|c| c.symbol()).collect())
            .collect()
    }
}
