use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
    seq::SliceRandom as _,
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Cell, CellGrid, CellPos};

/// Smallest dimension the generator will carve. Smaller requests are rounded up.
pub const MIN_MAZE_DIMENSION: usize = 5;

/// Forces a requested maze dimension to an odd value of at least
/// [`MIN_MAZE_DIMENSION`].
///
/// Rooms sit on odd coordinates and walls on even ones, so an even size would
/// leave a double wall along one edge.
///
/// ```
/// use mazemouse_engine::normalize_dimension;
///
/// assert_eq!(normalize_dimension(13), 13);
/// assert_eq!(normalize_dimension(20), 21);
/// assert_eq!(normalize_dimension(1), 5);
/// ```
#[must_use]
pub fn normalize_dimension(n: usize) -> usize {
    let n = if n % 2 == 0 { n + 1 } else { n };
    n.max(MIN_MAZE_DIMENSION)
}

/// Seed for deterministic maze generation.
///
/// A 128-bit seed, written as 32 hex digits in its text and serialized forms,
/// so that a maze can be regenerated from a log line or a stats record.
///
/// ```
/// use mazemouse_engine::{MazeGenerator, MazeSeed};
/// use rand::Rng as _;
///
/// let seed: MazeSeed = rand::rng().random();
/// let a = MazeGenerator::with_seed(seed).generate(9, 9);
/// let b = MazeGenerator::with_seed(seed).generate(9, 9);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MazeSeed([u8; 16]);

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid maze seed {input:?}: expected 32 hex digits")]
pub struct ParseSeedError {
    input: String,
}

impl fmt::Display for MazeSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

impl FromStr for MazeSeed {
    type Err = ParseSeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSeedError {
            input: s.to_owned(),
        };
        if s.len() != 32 {
            return Err(err());
        }
        let num = u128::from_str_radix(s, 16).map_err(|_| err())?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for MazeSeed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MazeSeed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

impl Distribution<MazeSeed> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MazeSeed {
        let mut seed = [0; 16];
        rng.fill(&mut seed);
        MazeSeed(seed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Cell `distance` steps away in this direction, if it is inside `rows` x `cols`.
    fn offset(self, pos: CellPos, distance: usize, rows: usize, cols: usize) -> Option<CellPos> {
        let CellPos { row, col } = pos;
        let next = match self {
            Direction::Up => CellPos::new(row.checked_sub(distance)?, col),
            Direction::Down => CellPos::new(row + distance, col),
            Direction::Left => CellPos::new(row, col.checked_sub(distance)?),
            Direction::Right => CellPos::new(row, col + distance),
        };
        (next.row < rows && next.col < cols).then_some(next)
    }
}

/// Carving state of a cell on the padded working grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Carve {
    Wall,
    Room,
    Open,
}

/// Explicit stack frame replacing one level of recursive carving.
#[derive(Debug)]
struct Frame {
    pos: CellPos,
    directions: [Direction; 4],
    next: usize,
}

struct WorkGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Carve>,
}

impl WorkGrid {
    /// Interior cells with both coordinates even are rooms, the rest walls.
    /// The outer ring is pre-opened so it is never carved into.
    fn new(rows: usize, cols: usize) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                let border = row == 0 || col == 0 || row == rows - 1 || col == cols - 1;
                cells.push(if border {
                    Carve::Open
                } else if row % 2 == 1 || col % 2 == 1 {
                    Carve::Wall
                } else {
                    Carve::Room
                });
            }
        }
        Self { rows, cols, cells }
    }

    fn get(&self, pos: CellPos) -> Carve {
        self.cells[pos.row * self.cols + pos.col]
    }

    fn open(&mut self, pos: CellPos) {
        self.cells[pos.row * self.cols + pos.col] = Carve::Open;
    }

    fn neighbour(&self, pos: CellPos, direction: Direction, distance: usize) -> Option<CellPos> {
        direction.offset(pos, distance, self.rows, self.cols)
    }

    /// Rooms two cells away count as open when they fall outside the grid.
    fn all_neighbours_open(&self, pos: CellPos) -> bool {
        Direction::ALL.iter().all(|&d| {
            self.neighbour(pos, d, 2)
                .is_none_or(|n| self.get(n) == Carve::Open)
        })
    }
}

/// Perfect maze generator using randomized recursive backtracking.
///
/// The carving walks a spanning tree over the lattice of rooms, so every pair
/// of passage cells is joined by exactly one simple path. The recursion is
/// run on an explicit stack, so maze size is not limited by the call stack.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    rng: Pcg32,
}

impl Default for MazeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl MazeGenerator {
    /// Creates a generator with a random seed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for reproducible mazes.
    #[must_use]
    pub fn with_seed(seed: MazeSeed) -> Self {
        Self {
            rng: Pcg32::from_seed(seed.0),
        }
    }

    /// Generates a perfect maze of `height` rows by `width` columns.
    ///
    /// Both dimensions go through [`normalize_dimension`] first. The returned
    /// grid has a wall ring on its outside, its entrance at `(1, 1)` and its
    /// exit at `(height - 2, width - 2)`.
    #[must_use]
    pub fn generate(&mut self, height: usize, width: usize) -> CellGrid {
        self.carve(normalize_dimension(height), normalize_dimension(width))
    }

    fn carve(&mut self, height: usize, width: usize) -> CellGrid {
        // A one-cell ring around the maze simplifies the neighbour checks and
        // is stripped again at the end.
        let mut grid = WorkGrid::new(height + 2, width + 2);

        let start = CellPos::new(
            2 * self.rng.random_range(1..=(height - 1) / 2),
            2 * self.rng.random_range(1..=(width - 1) / 2),
        );
        let mut stack = vec![];
        self.enter(&mut grid, &mut stack, start);

        while let Some(frame) = stack.last_mut() {
            let Some(&direction) = frame.directions.get(frame.next) else {
                stack.pop();
                continue;
            };
            frame.next += 1;
            let pos = frame.pos;

            let (Some(room), Some(wall)) = (
                grid.neighbour(pos, direction, 2),
                grid.neighbour(pos, direction, 1),
            ) else {
                continue;
            };
            if grid.get(room) != Carve::Open {
                grid.open(wall);
                self.enter(&mut grid, &mut stack, room);
            }
        }

        let mut cells = CellGrid::filled(height, width, Cell::Wall);
        for row in 0..height {
            for col in 0..width {
                if grid.get(CellPos::new(row + 1, col + 1)) == Carve::Open {
                    cells.set(CellPos::new(row, col), Cell::Passage);
                }
            }
        }
        cells
    }

    fn enter(&mut self, grid: &mut WorkGrid, stack: &mut Vec<Frame>, pos: CellPos) {
        grid.open(pos);
        if grid.all_neighbours_open(pos) {
            return;
        }
        let mut directions = Direction::ALL;
        directions.shuffle(&mut self.rng);
        stack.push(Frame {
            pos,
            directions,
            next: 0,
        });
    }
}
