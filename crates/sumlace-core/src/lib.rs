//! Core data structures for the sum-vector puzzle engine.
//!
//! This crate provides the grid model shared by the solver and any surrounding
//! editor: cells, positions, the value pool, and the extraction scan that
//! turns a grid into the sum vectors the solver operates on.
//!
//! # Overview
//!
//! - [`position`]: [`Position`] and the grid dimension constants
//! - [`cell`]: [`Cell`], a single grid cell as entered in the editor
//! - [`grid`]: [`Grid`], the 10×10 board with a whitespace-token text form
//! - [`pool`]: [`ValuePool`], the multiset of values available for placement
//! - [`vector`]: [`SumVector`], [`Extraction`], and [`extract`], the
//!   row/column scan producing the solver's input
//!
//! # Examples
//!
//! ```
//! use sumlace_core::{Grid, extract};
//!
//! let grid: Grid = "
//!     R6 1 5 . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//!     .  . . . . . . . . .
//! "
//! .parse()?;
//!
//! let extraction = extract(&grid)?;
//! assert_eq!(extraction.vectors().len(), 1);
//! assert_eq!(extraction.vectors()[0].target(), 6);
//! assert_eq!(extraction.pool().len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cell;
pub mod grid;
pub mod pool;
pub mod position;
pub mod vector;

pub use self::{
    cell::Cell,
    grid::{Grid, GridParseError},
    pool::ValuePool,
    position::{CELL_COUNT, GRID_SIDE, Position},
    vector::{ExtractError, Extraction, SumVector, extract},
};
