//! Sum vectors and the extraction scan that produces them.

use crate::{
    cell::Cell,
    grid::Grid,
    pool::ValuePool,
    position::{GRID_SIDE, Position},
};

/// An ordered run of grid cells constrained to a target sum.
///
/// The cells are row-major grid indices in scan order (left-to-right for row
/// vectors, top-to-bottom for column vectors). Any accepted assignment must
/// make the values at these cells sum to the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumVector {
    cells: Vec<usize>,
    target: i32,
}

impl SumVector {
    /// Creates a vector from grid cell indices and a target sum.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is empty; extraction never commits an empty run,
    /// and the solver relies on that.
    #[must_use]
    pub fn new(cells: Vec<usize>, target: i32) -> Self {
        assert!(!cells.is_empty(), "a sum vector must cover at least one cell");
        Self { cells, target }
    }

    /// Returns the grid cell indices in scan order.
    #[must_use]
    pub fn cells(&self) -> &[usize] {
        &self.cells
    }

    /// Returns the number of cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; kept for API symmetry with collection types.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the target sum.
    #[must_use]
    pub fn target(&self) -> i32 {
        self.target
    }

    /// Returns the grid index of the first cell.
    #[must_use]
    pub fn start(&self) -> usize {
        self.cells[0]
    }
}

/// The solver's input: extracted vectors plus the value pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    vectors: Vec<SumVector>,
    pool: ValuePool,
}

impl Extraction {
    /// Returns the extracted vectors, rows first, then columns.
    #[must_use]
    pub fn vectors(&self) -> &[SumVector] {
        &self.vectors
    }

    /// Returns the pool of every entered value.
    #[must_use]
    pub fn pool(&self) -> &ValuePool {
        &self.pool
    }

    /// Consumes the extraction, returning vectors and pool.
    #[must_use]
    pub fn into_parts(self) -> (Vec<SumVector>, ValuePool) {
        (self.vectors, self.pool)
    }
}

/// Errors detected while extracting vectors from a grid.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ExtractError {
    /// A clue cell's text has no parsable numeric target once its direction
    /// glyphs are stripped.
    #[display("clue at {position} has no numeric target: {text:?}")]
    InvalidClue {
        /// The clue cell's position.
        position: Position,
        /// The clue text as entered.
        text: String,
    },
}

/// Scans the grid and produces the solver's input.
///
/// Rows are scanned left-to-right, then columns top-to-bottom. Within a scan
/// line, value cells accumulate into the current run; a clue cell of the
/// matching orientation sets the run's target (a later clue overwrites it),
/// while a clue of the orthogonal orientation discards the run accumulated so
/// far. An empty cell, or the end of the line, commits the run when it has
/// both a target and at least one cell.
///
/// Clue text is uppercased and trimmed; `U`/`D` mark column clues and
/// `L`/`R` mark row clues, and the matching glyphs are stripped before the
/// target is parsed.
///
/// The pool collects every [`Cell::Value`] in the grid, including cells that
/// end up outside every vector.
///
/// # Errors
///
/// Returns [`ExtractError::InvalidClue`] when a clue of the scanned
/// orientation has no parsable target. The whole extraction fails; nothing
/// partial is returned.
///
/// # Examples
///
/// ```
/// use sumlace_core::{Grid, extract};
///
/// let grid: Grid = "
///     R6 1 5 . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
///     .  . . . . . . . . .
/// "
/// .parse()?;
///
/// let extraction = extract(&grid)?;
/// let vector = &extraction.vectors()[0];
/// assert_eq!(vector.cells(), &[1, 2]);
/// assert_eq!(vector.target(), 6);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn extract(grid: &Grid) -> Result<Extraction, ExtractError> {
    let mut vectors = Vec::new();

    #[expect(clippy::cast_possible_truncation)]
    for line in 0..GRID_SIDE as u8 {
        scan_line(
            grid,
            (0..GRID_SIDE as u8).map(|x| Position::new(x, line)),
            Orientation::Row,
            &mut vectors,
        )?;
    }
    #[expect(clippy::cast_possible_truncation)]
    for line in 0..GRID_SIDE as u8 {
        scan_line(
            grid,
            (0..GRID_SIDE as u8).map(|y| Position::new(line, y)),
            Orientation::Column,
            &mut vectors,
        )?;
    }

    let pool = grid.cells().filter_map(|(_, cell)| cell.value()).collect();

    Ok(Extraction { vectors, pool })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Orientation {
    Row,
    Column,
}

impl Orientation {
    /// Glyphs that mark a clue as belonging to the orthogonal orientation.
    fn mismatch(self) -> [char; 2] {
        match self {
            Orientation::Row => ['U', 'D'],
            Orientation::Column => ['L', 'R'],
        }
    }

    /// Glyphs stripped from a matching clue before parsing the target.
    fn strip(self) -> [char; 2] {
        match self {
            Orientation::Row => ['L', 'R'],
            Orientation::Column => ['U', 'D'],
        }
    }
}

#[derive(Debug, Default)]
struct Run {
    cells: Vec<usize>,
    target: Option<i32>,
}

impl Run {
    fn commit(&mut self, vectors: &mut Vec<SumVector>) {
        if let Some(target) = self.target
            && !self.cells.is_empty()
        {
            vectors.push(SumVector::new(std::mem::take(&mut self.cells), target));
        }
        self.cells.clear();
        self.target = None;
    }

    fn discard(&mut self) {
        self.cells.clear();
        self.target = None;
    }
}

fn scan_line(
    grid: &Grid,
    line: impl Iterator<Item = Position>,
    orientation: Orientation,
    vectors: &mut Vec<SumVector>,
) -> Result<(), ExtractError> {
    let mut run = Run::default();

    for pos in line {
        match grid.cell(pos) {
            Cell::Value(_) => run.cells.push(pos.index()),
            Cell::Clue(text) => {
                let upper = text.trim().to_uppercase();
                if upper.contains(orientation.mismatch()) {
                    // The clue belongs to the orthogonal scan.
                    run.discard();
                } else {
                    let stripped: String =
                        upper.chars().filter(|c| !orientation.strip().contains(c)).collect();
                    let target = stripped.parse().map_err(|_| ExtractError::InvalidClue {
                        position: pos,
                        text: text.clone(),
                    })?;
                    run.target = Some(target);
                }
            }
            Cell::Empty => run.commit(vectors),
        }
    }
    run.commit(vectors);

    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::position::CELL_COUNT;

    fn grid_from(text: &str) -> Grid {
        text.parse().expect("test grid must parse")
    }

    fn pad_rows(rows: &[&str]) -> String {
        let mut lines: Vec<String> = rows.iter().map(|r| (*r).to_owned()).collect();
        while lines.len() < GRID_SIDE {
            lines.push(". . . . . . . . . .".to_owned());
        }
        lines.join("\n")
    }

    #[test]
    fn test_row_vector_after_leading_clue() {
        let grid = grid_from(&pad_rows(&["R6 1 5 . . . . . . ."]));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[SumVector::new(vec![1, 2], 6)],
        );
    }

    #[test]
    fn test_column_vector_with_mid_run_clue() {
        // The clue sits between the two cells of its own column run.
        let grid = grid_from(&pad_rows(&[
            ". . 3 . . . . . . .",
            ". . D7 . . . . . . .",
            ". . 4 . . . . . . .",
        ]));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[SumVector::new(vec![2, 22], 7)],
        );
    }

    #[test]
    fn test_orientation_mismatch_discards_run() {
        // A column clue seen during the row scan drops the cells before it;
        // the cell after it has no target, so no row vector is committed.
        let grid = grid_from(&pad_rows(&["R9 2 U4 3 . . . . . ."]));
        let extraction = extract(&grid).unwrap();
        assert!(extraction.vectors().is_empty());
        assert_eq!(extraction.pool().len(), 2);
    }

    #[test]
    fn test_later_clue_overwrites_target() {
        let grid = grid_from(&pad_rows(&["R9 2 R5 3 . . . . . ."]));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[SumVector::new(vec![1, 3], 5)],
        );
    }

    #[test]
    fn test_run_without_target_is_discarded() {
        let grid = grid_from(&pad_rows(&[". 1 2 3 . . . . . ."]));
        let extraction = extract(&grid).unwrap();
        assert!(extraction.vectors().is_empty());
        // The values still join the pool.
        assert_eq!(extraction.pool().len(), 3);
    }

    #[test]
    fn test_run_reaching_line_end_commits() {
        let grid = grid_from(&pad_rows(&[". . . . . . . R7 3 4"]));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[SumVector::new(vec![8, 9], 7)],
        );
    }

    #[test]
    fn test_invalid_clue_fails_extraction() {
        let grid = grid_from(&pad_rows(&["RX 1 2 . . . . . . ."]));
        let err = extract(&grid).unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidClue {
                position: Position::new(0, 0),
                text: "RX".into(),
            }
        );
    }

    #[test]
    fn test_mismatched_clue_is_never_parsed() {
        // A malformed column clue is invisible to the row scan but fails the
        // column scan.
        let grid = grid_from(&pad_rows(&[". . . . UX . . . . ."]));
        let err = extract(&grid).unwrap_err();
        assert_eq!(
            err,
            ExtractError::InvalidClue {
                position: Position::new(4, 0),
                text: "UX".into(),
            }
        );
    }

    #[test]
    fn test_undirected_clue_serves_both_scans() {
        // A clue with no direction glyphs targets the runs of both scans.
        let mut grid = Grid::new();
        grid.set_cell(Position::new(1, 0), Cell::Clue("7".into()));
        grid.set_cell(Position::new(2, 0), Cell::Value(3));
        grid.set_cell(Position::new(1, 1), Cell::Value(4));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[SumVector::new(vec![2], 7), SumVector::new(vec![11], 7)],
        );
    }

    #[test]
    fn test_crossing_vectors_share_a_cell() {
        let grid = grid_from(&pad_rows(&[
            "R5 2 3 . . . . . . .",
            ".  . D7 . . . . . . .",
            ".  . 4 . . . . . . .",
        ]));
        let extraction = extract(&grid).unwrap();
        assert_eq!(
            extraction.vectors(),
            &[
                SumVector::new(vec![1, 2], 5),
                SumVector::new(vec![2, 22], 7),
            ],
        );
        assert_eq!(extraction.pool().iter().collect::<Vec<_>>(), vec![2, 3, 4]);
    }

    proptest! {
        #[test]
        fn test_extraction_never_panics_on_value_grids(values in prop::collection::vec(-9i32..=9, 0..30)) {
            let mut grid = Grid::new();
            for (i, value) in values.iter().enumerate() {
                grid.set_cell(Position::from_index(i * 3 % CELL_COUNT), Cell::Value(*value));
            }
            let extraction = extract(&grid).unwrap();
            for vector in extraction.vectors() {
                for &cell in vector.cells() {
                    prop_assert!(cell < CELL_COUNT);
                }
            }
        }

        #[test]
        fn test_extracted_vectors_cover_value_cells_only(target in 1i32..50) {
            let mut grid = Grid::new();
            grid.set_cell(Position::new(0, 3), Cell::Clue(format!("R{target}")));
            grid.set_cell(Position::new(1, 3), Cell::Value(1));
            grid.set_cell(Position::new(2, 3), Cell::Value(2));
            let extraction = extract(&grid).unwrap();
            let vector = &extraction.vectors()[0];
            prop_assert_eq!(vector.target(), target);
            prop_assert_eq!(vector.cells(), &[31, 32]);
        }
    }
}
