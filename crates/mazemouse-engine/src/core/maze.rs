use super::{CellGrid, CellPos, PixelGrid, Position};

/// A maze in both of its representations.
///
/// The [`CellGrid`] is what the generator and solver work on, and the
/// [`PixelGrid`] is the same grid scaled by `square_size`, used for the
/// continuous-space collision and sensing of agents. The pixel grid is
/// derived once on construction and never changes.
#[derive(Debug, Clone)]
pub struct Maze {
    cells: CellGrid,
    pixels: PixelGrid,
    square_size: u32,
}

impl Maze {
    #[must_use]
    pub fn new(cells: CellGrid, square_size: u32) -> Self {
        assert!(square_size > 0, "square size must be positive");
        let pixels = PixelGrid::from_cells(&cells, square_size as usize);
        Self {
            cells,
            pixels,
            square_size,
        }
    }

    #[must_use]
    pub fn cells(&self) -> &CellGrid {
        &self.cells
    }

    #[must_use]
    pub fn pixels(&self) -> &PixelGrid {
        &self.pixels
    }

    #[must_use]
    pub const fn square_size(&self) -> u32 {
        self.square_size
    }

    /// Pixel-space centre of the entrance cell, where agents start.
    #[must_use]
    pub fn start_position(&self) -> Position {
        self.cell_center(self.cells.entrance())
    }

    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn cell_center(&self, pos: CellPos) -> Position {
        let size = f64::from(self.square_size);
        Position::new(
            (pos.col as f64 + 0.5) * size,
            (pos.row as f64 + 0.5) * size,
        )
    }

    /// Returns `true` if the pixel nearest to `pos` is a passage.
    #[must_use]
    pub fn is_passable_at(&self, pos: Position) -> bool {
        let (x, y) = pos.rounded();
        self.pixels.is_passable(x, y)
    }

    /// Returns the cell containing `pos`, or `None` outside the maze.
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn cell_at(&self, pos: Position) -> Option<CellPos> {
        let size = f64::from(self.square_size);
        let (col, row) = ((pos.x / size).floor(), (pos.y / size).floor());
        if col < 0.0 || row < 0.0 {
            return None;
        }
        let cell = CellPos::new(row as usize, col as usize);
        self.cells.get(cell).map(|_| cell)
    }

    /// Returns `true` once `pos` is strictly inside the exit cell.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn is_at_exit(&self, pos: Position) -> bool {
        let size = f64::from(self.square_size);
        let dx = pos.x / size - self.cells.cols() as f64;
        let dy = pos.y / size - self.cells.rows() as f64;
        (-2.0 < dx && dx < -1.0) && (-2.0 < dy && dy < -1.0)
    }
}
