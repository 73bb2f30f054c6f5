use std::{fmt, str::FromStr};

/// Smallest grid that still has one room surrounded by walls.
pub const MIN_GRID_SIZE: usize = 3;

/// A single square of the logical maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Cell {
    Wall,
    Passage,
}

impl Cell {
    /// Numeric value used by the maze file format (wall = 0, passage = 1).
    #[must_use]
    pub const fn as_digit(self) -> char {
        match self {
            Cell::Wall => '0',
            Cell::Passage => '1',
        }
    }
}

/// Row/column coordinate of a cell in a [`CellGrid`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ParseMazeError {
    #[display("maze data is empty")]
    Empty,
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[display("invalid cell value {token:?} at row {row}, column {col}")]
    InvalidToken {
        row: usize,
        col: usize,
        token: String,
    },
    #[display("maze must be at least 3x3, got {rows}x{cols}")]
    TooSmall { rows: usize, cols: usize },
}

/// The logical maze: a dense row-major grid of walls and passages.
///
/// The outer ring is the boundary of the game. The entrance is the top-left
/// interior cell `(1, 1)` and the exit is the bottom-right interior cell
/// `(rows - 2, cols - 2)`.
///
/// # File format
///
/// The text form (see [`fmt::Display`] and [`FromStr`]) is one line per row,
/// cells separated by whitespace, `0` for walls and `1` for passages.
/// Legacy files written with float tokens (`0.0`, `1.0`) are accepted.
///
/// ```
/// use mazemouse_engine::{Cell, CellGrid, CellPos};
///
/// let grid: CellGrid = "0 0 0\n0 1 0\n0 0 0\n".parse().unwrap();
/// assert_eq!(grid.get(CellPos::new(1, 1)), Some(Cell::Passage));
/// assert_eq!(grid.to_string(), "0 0 0\n0 1 0\n0 0 0\n");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl CellGrid {
    /// Creates a grid with every cell set to `cell`.
    #[must_use]
    pub fn filled(rows: usize, cols: usize, cell: Cell) -> Self {
        Self {
            rows,
            cols,
            cells: vec![cell; rows * cols],
        }
    }

    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub const fn entrance(&self) -> CellPos {
        CellPos::new(1, 1)
    }

    #[must_use]
    pub const fn exit(&self) -> CellPos {
        CellPos::new(self.rows.saturating_sub(2), self.cols.saturating_sub(2))
    }

    /// Returns the cell at `pos`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> Option<Cell> {
        (pos.row < self.rows && pos.col < self.cols).then(|| self.cells[self.index(pos)])
    }

    /// Returns `true` if `pos` is inside the grid and a passage.
    #[must_use]
    pub fn is_passage(&self, pos: CellPos) -> bool {
        self.get(pos).is_some_and(|c| c.is_passage())
    }

    pub fn set(&mut self, pos: CellPos, cell: Cell) {
        assert!(
            pos.row < self.rows && pos.col < self.cols,
            "cell {pos:?} outside {}x{} grid",
            self.rows,
            self.cols
        );
        let index = self.index(pos);
        self.cells[index] = cell;
    }

    /// Iterates over the rows of the grid, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[Cell]> + '_ {
        self.cells.chunks_exact(self.cols.max(1))
    }

    /// Iterates over every passage cell position in row-major order.
    pub fn passages(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.rows)
            .flat_map(move |row| (0..self.cols).map(move |col| CellPos::new(row, col)))
            .filter(|pos| self.is_passage(*pos))
    }

    /// Returns the four orthogonal neighbours of `pos` that lie inside the grid.
    pub fn neighbours(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + use<> {
        let CellPos { row, col } = pos;
        let (rows, cols) = (self.rows, self.cols);
        [
            row.checked_sub(1).map(|r| CellPos::new(r, col)),
            (row + 1 < rows).then(|| CellPos::new(row + 1, col)),
            col.checked_sub(1).map(|c| CellPos::new(row, c)),
            (col + 1 < cols).then(|| CellPos::new(row, col + 1)),
        ]
        .into_iter()
        .flatten()
    }

    const fn index(&self, pos: CellPos) -> usize {
        pos.row * self.cols + pos.col
    }
}

impl fmt::Display for CellGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            for (i, cell) in row.iter().enumerate() {
                if i > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "{}", cell.as_digit())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn parse_cell(token: &str) -> Option<Cell> {
    match token {
        "0" => Some(Cell::Wall),
        "1" => Some(Cell::Passage),
        _ => match token.parse::<f64>().ok()? {
            v if v == 0.0 => Some(Cell::Wall),
            v if v == 1.0 => Some(Cell::Passage),
            _ => None,
        },
    }
}

impl FromStr for CellGrid {
    type Err = ParseMazeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cells = vec![];
        let mut rows = 0;
        let mut cols = None;

        for (row, line) in s.lines().filter(|l| !l.trim().is_empty()).enumerate() {
            let start = cells.len();
            for (col, token) in line.split_whitespace().enumerate() {
                let cell = parse_cell(token).ok_or_else(|| ParseMazeError::InvalidToken {
                    row,
                    col,
                    token: token.to_owned(),
                })?;
                cells.push(cell);
            }
            let found = cells.len() - start;
            match cols {
                None => cols = Some(found),
                Some(expected) if expected != found => {
                    return Err(ParseMazeError::RaggedRow {
                        row,
                        expected,
                        found,
                    });
                }
                Some(_) => {}
            }
            rows += 1;
        }

        let cols = cols.ok_or(ParseMazeError::Empty)?;
        if rows < MIN_GRID_SIZE || cols < MIN_GRID_SIZE {
            return Err(ParseMazeError::TooSmall { rows, cols });
        }
        Ok(Self { rows, cols, cells })
    }
}
