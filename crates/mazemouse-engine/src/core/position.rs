use serde::{Deserialize, Serialize};

/// Continuous position in pixel space. `x` grows rightwards, `y` downwards.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest integer pixel.
    #[expect(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn rounded(self) -> (i64, i64) {
        (self.x.round() as i64, self.y.round() as i64)
    }

    /// Moves `distance` pixels along `heading` (radians, clockwise on screen).
    #[must_use]
    pub fn advanced(self, heading: f64, distance: f64) -> Self {
        Self {
            x: self.x + distance * heading.cos(),
            y: self.y + distance * heading.sin(),
        }
    }
}
