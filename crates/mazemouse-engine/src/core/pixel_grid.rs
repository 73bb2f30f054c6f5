use super::{Cell, CellGrid};

/// The cell grid scaled up by the square size, one `bool` per pixel.
///
/// Continuous agent positions are tested against this grid. Samples outside
/// the grid are reported as impassable so that rays and agents never read out
/// of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    passable: Vec<bool>,
}

impl PixelGrid {
    /// Stretches every cell into a `scale` x `scale` block of pixels.
    #[must_use]
    pub fn from_cells(cells: &CellGrid, scale: usize) -> Self {
        let width = cells.cols() * scale;
        let height = cells.rows() * scale;
        let mut passable = Vec::with_capacity(width * height);
        for row in cells.iter_rows() {
            let mut line = Vec::with_capacity(width);
            for cell in row {
                line.extend(std::iter::repeat_n(*cell == Cell::Passage, scale));
            }
            for _ in 0..scale {
                passable.extend_from_slice(&line);
            }
        }
        Self {
            width,
            height,
            passable,
        }
    }

    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    #[must_use]
    pub fn is_passable(&self, x: i64, y: i64) -> bool {
        self.index(x, y).is_some_and(|i| self.passable[i])
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }
}
