//! The puzzle grid and its text form.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use crate::{
    cell::Cell,
    position::{CELL_COUNT, GRID_SIDE, Position},
};

/// The 10×10 puzzle grid.
///
/// # Text form
///
/// [`FromStr`] accepts ten whitespace-separated rows of ten tokens each:
///
/// - `.` — an empty cell
/// - an integer — a solvable cell holding that value
/// - any token containing a letter — a clue cell, stored raw
///
/// Clue tokens must not contain whitespace; [`Display`] writes the same
/// format back.
///
/// # Examples
///
/// ```
/// use sumlace_core::{Cell, Grid, Position};
///
/// let mut grid = Grid::new();
/// grid.set_cell(Position::new(0, 0), Cell::Clue("R5".into()));
/// grid.set_cell(Position::new(1, 0), Cell::Value(2));
/// assert_eq!(grid.cell(Position::new(1, 0)).value(), Some(2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Grid {
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self {
            cells: vec![Cell::Empty; CELL_COUNT],
        }
    }

    /// Returns the cell at a position.
    #[must_use]
    pub fn cell(&self, pos: Position) -> &Cell {
        &self.cells[pos.index()]
    }

    /// Replaces the cell at a position.
    pub fn set_cell(&mut self, pos: Position, cell: Cell) {
        self.cells[pos.index()] = cell;
    }

    /// Returns an iterator over all cells with their positions, in row-major
    /// order.
    pub fn cells(&self) -> impl Iterator<Item = (Position, &Cell)> {
        self.cells
            .iter()
            .enumerate()
            .map(|(i, cell)| (Position::from_index(i), cell))
    }
}

/// Errors produced when parsing a grid from text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    /// The text does not contain exactly ten rows.
    #[display("expected {GRID_SIDE} rows, found {found}")]
    RowCount {
        /// Number of rows found.
        found: usize,
    },
    /// A row does not contain exactly ten cell tokens.
    #[display("row {y} has {found} cells, expected {GRID_SIDE}")]
    CellCount {
        /// Row index.
        y: usize,
        /// Number of tokens found in the row.
        found: usize,
    },
    /// A token is neither `.`, an integer, nor a clue.
    #[display("cell ({x}, {y}) has unrecognized token {token:?}")]
    Token {
        /// Column index.
        x: usize,
        /// Row index.
        y: usize,
        /// The offending token.
        token: String,
    },
}

impl FromStr for Grid {
    type Err = GridParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let rows: Vec<&str> = s.lines().filter(|l| !l.trim().is_empty()).collect();
        if rows.len() != GRID_SIDE {
            return Err(GridParseError::RowCount { found: rows.len() });
        }

        let mut cells = Vec::with_capacity(CELL_COUNT);
        for (y, row) in rows.iter().enumerate() {
            let tokens: Vec<&str> = row.split_whitespace().collect();
            if tokens.len() != GRID_SIDE {
                return Err(GridParseError::CellCount {
                    y,
                    found: tokens.len(),
                });
            }
            for (x, token) in tokens.iter().enumerate() {
                cells.push(parse_token(token).ok_or_else(|| GridParseError::Token {
                    x,
                    y,
                    token: (*token).to_owned(),
                })?);
            }
        }

        Ok(Self { cells })
    }
}

fn parse_token(token: &str) -> Option<Cell> {
    if token == "." {
        return Some(Cell::Empty);
    }
    if token.chars().any(char::is_alphabetic) {
        return Some(Cell::Clue(token.to_owned()));
    }
    token.parse().ok().map(Cell::Value)
}

impl Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..GRID_SIDE {
            for x in 0..GRID_SIDE {
                if x > 0 {
                    write!(f, " ")?;
                }
                #[expect(clippy::cast_possible_truncation)]
                let pos = Position::new(x as u8, y as u8);
                match self.cell(pos) {
                    Cell::Empty => write!(f, ".")?,
                    Cell::Value(v) => write!(f, "{v}")?,
                    Cell::Clue(text) => write!(f, "{text}")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
