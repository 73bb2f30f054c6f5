use super::{CellGrid, CellPos};

/// Lowest normalized value of an on-path cell.
pub const PROGRESS_FLOOR: u8 = 100;

/// Per-cell distance from the entrance along the entrance-to-exit path.
///
/// Cells on the path hold their distance, starting at 1 on the entrance and
/// increasing by exactly 1 per step up to `path_length + 1` on the exit.
/// Walls, dead ends and cells off the path hold 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressField {
    rows: usize,
    cols: usize,
    distances: Vec<u32>,
}

impl ProgressField {
    fn zeroed(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            distances: vec![0; rows * cols],
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

    /// Distance value at `pos`, 0 outside the grid.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> u32 {
        if pos.row < self.rows && pos.col < self.cols {
            self.distances[pos.row * self.cols + pos.col]
        } else {
            0
        }
    }

    /// Returns `true` if every cell is 0.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.distances.iter().all(|&d| d == 0)
    }

    /// Rescales the field into `0..=255` for display.
    ///
    /// On-path cells map linearly onto `PROGRESS_FLOOR..=255` relative to
    /// `path_length`, so fields of mazes with different path lengths look
    /// alike. Off-path cells stay 0. Rows are returned top to bottom.
    #[must_use]
    pub fn normalized(&self, path_length: u32) -> Vec<Vec<u8>> {
        let span = u32::from(u8::MAX - PROGRESS_FLOOR);
        self.distances
            .chunks_exact(self.cols.max(1))
            .map(|row| {
                row.iter()
                    .map(|&d| match d {
                        0 => 0,
                        _ if path_length == 0 => u8::MAX,
                        d => {
                            let scaled = u32::from(PROGRESS_FLOOR) + d * span / path_length;
                            u8::try_from(scaled).unwrap_or(u8::MAX)
                        }
                    })
                    .collect()
            })
            .collect()
    }
}

/// Result of [`solve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    solved: bool,
    path_length: u32,
    progress: ProgressField,
}

impl Solution {
    /// The degenerate result for mazes whose exit cannot be reached.
    #[must_use]
    pub fn unsolved(rows: usize, cols: usize) -> Self {
        Self {
            solved: false,
            path_length: 0,
            progress: ProgressField::zeroed(rows, cols),
        }
    }

    #[must_use]
    pub const fn is_solved(&self) -> bool {
        self.solved
    }

    /// Number of steps from the entrance to the exit, 0 when unsolved.
    #[must_use]
    pub const fn path_length(&self) -> u32 {
        self.path_length
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressField {
        &self.progress
    }
}

/// Search state of a cell while solving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Wall,
    Unvisited,
    Exit,
    Distance(u32),
    /// Fully explored without reaching the exit. Never entered again.
    Dead,
}

/// Depth-first exploration order: down, up, right, left.
const EXPLORE_ORDER: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Debug)]
struct Frame {
    pos: CellPos,
    distance: u32,
    next: usize,
}

/// Finds the path from the entrance to the exit of `cells`.
///
/// Runs an exhaustive depth-first search with backtracking from the entrance,
/// numbering cells with their distance as it goes and marking exhausted
/// branches dead. Because a perfect maze is a tree the first path found is
/// the only one, and therefore the shortest.
///
/// A maze whose exit is unreachable (for example a corrupted file) yields
/// [`Solution::unsolved`]: not solved, path length 0 and an all-zero field.
///
/// ```
/// use mazemouse_engine::{CellGrid, CellPos, solve};
///
/// let cells: CellGrid = "0 0 0 0 0\n0 1 1 1 0\n0 0 0 1 0\n0 1 1 1 0\n0 0 0 0 0\n"
///     .parse()
///     .unwrap();
/// let solution = solve(&cells);
/// assert!(solution.is_solved());
/// assert_eq!(solution.path_length(), 4);
/// assert_eq!(solution.progress().get(CellPos::new(2, 3)), 4);
/// ```
#[must_use]
pub fn solve(cells: &CellGrid) -> Solution {
    let (rows, cols) = (cells.rows(), cells.cols());
    let entrance = cells.entrance();
    let exit = cells.exit();
    if !cells.is_passage(entrance) || !cells.is_passage(exit) {
        return Solution::unsolved(rows, cols);
    }

    let mut marks = cells
        .iter_rows()
        .flatten()
        .map(|cell| {
            if cell.is_passage() {
                Mark::Unvisited
            } else {
                Mark::Wall
            }
        })
        .collect::<Vec<_>>();
    let index = |pos: CellPos| pos.row * cols + pos.col;
    marks[index(exit)] = Mark::Exit;

    let solved = if entrance == exit {
        true
    } else {
        marks[index(entrance)] = Mark::Distance(1);
        let mut stack = vec![Frame {
            pos: entrance,
            distance: 1,
            next: 0,
        }];
        let mut found = false;

        while let Some(frame) = stack.last_mut() {
            let Some(&(dr, dc)) = EXPLORE_ORDER.get(frame.next) else {
                marks[index(frame.pos)] = Mark::Dead;
                stack.pop();
                continue;
            };
            frame.next += 1;
            let (pos, distance) = (frame.pos, frame.distance);

            let Some(next) = pos
                .row
                .checked_add_signed(dr)
                .zip(pos.col.checked_add_signed(dc))
                .map(|(row, col)| CellPos::new(row, col))
                .filter(|n| n.row < rows && n.col < cols)
            else {
                continue;
            };
            match marks[index(next)] {
                Mark::Exit => {
                    found = true;
                    break;
                }
                Mark::Unvisited => {
                    marks[index(next)] = Mark::Distance(distance + 1);
                    stack.push(Frame {
                        pos: next,
                        distance: distance + 1,
                        next: 0,
                    });
                }
                Mark::Wall | Mark::Distance(_) | Mark::Dead => {}
            }
        }
        found
    };

    if !solved {
        return Solution::unsolved(rows, cols);
    }

    let mut progress = ProgressField::zeroed(rows, cols);
    let mut path_length = 0;
    for (slot, mark) in progress.distances.iter_mut().zip(&marks) {
        if let Mark::Distance(d) = *mark {
            *slot = d;
            path_length = path_length.max(d);
        }
    }
    progress.distances[index(exit)] = path_length + 1;

    Solution {
        solved: true,
        path_length,
        progress,
    }
}
