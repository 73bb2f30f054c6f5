use super::Position;

/// Ring widths of the footprint, in pixels, from the outside in.
const RING_WIDTH: u32 = 4;

/// Circular intensity stamp laid down behind an agent every frame.
///
/// The stamp is a `2r` x `2r` square holding three concentric rings: full
/// intensity in the centre (radius `r - 8`), two thirds in the middle ring
/// (radius `r - 4`) and one third in the outer ring (radius `r`). Rings whose
/// radius would drop below zero are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footprint {
    radius: u32,
    weights: Vec<u8>,
}

impl Footprint {
    #[must_use]
    pub fn new(radius: u32, intensity: u8) -> Self {
        let size = 2 * radius as usize;
        let outer = i64::from(radius).pow(2);
        let middle = i64::from(radius.saturating_sub(RING_WIDTH)).pow(2);
        let inner = i64::from(radius.saturating_sub(2 * RING_WIDTH)).pow(2);
        let third = |n: u16| u8::try_from(n * u16::from(intensity) / 3).unwrap_or(u8::MAX);

        let mut weights = Vec::with_capacity(size * size);
        for y in -i64::from(radius)..i64::from(radius) {
            for x in -i64::from(radius)..i64::from(radius) {
                let d2 = x * x + y * y;
                weights.push(if d2 < inner {
                    intensity
                } else if d2 < middle {
                    third(2)
                } else if d2 < outer {
                    third(1)
                } else {
                    0
                });
            }
        }
        Self { radius, weights }
    }

    #[must_use]
    pub const fn radius(&self) -> u32 {
        self.radius
    }

    fn size(&self) -> usize {
        2 * self.radius as usize
    }

    /// Largest single-cell weight in the stamp.
    #[must_use]
    pub fn peak(&self) -> u8 {
        self.weights.iter().copied().max().unwrap_or(0)
    }
}

/// Per-agent "scent trail": a decaying intensity in `0..=255` per pixel.
///
/// The agent [stamps](Self::stamp) a [`Footprint`] every frame and the whole
/// field [fades](Self::fade) by one step at a fixed frame cadence, so recently
/// travelled ground reads as brighter than ground visited long ago.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitedMemory {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl VisitedMemory {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
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

    /// Intensity at pixel `(x, y)`, 0 outside the field.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> u8 {
        self.index(x, y).map_or(0, |i| self.cells[i])
    }

    /// Sum of every pixel's intensity.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.cells.iter().map(|&v| u64::from(v)).sum()
    }

    #[must_use]
    pub fn is_clear(&self) -> bool {
        self.cells.iter().all(|&v| v == 0)
    }

    /// Iterates over pixel rows, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        self.cells.chunks_exact(self.width.max(1))
    }

    /// Adds `footprint` centred `radius` pixels behind `position`, opposite
    /// to `heading`.
    ///
    /// Intensities saturate at 255. Parts of the footprint falling outside
    /// the field are dropped.
    #[expect(clippy::cast_possible_truncation)]
    pub fn stamp(&mut self, footprint: &Footprint, position: Position, heading: f64) {
        let radius = f64::from(footprint.radius());
        let left = (position.x - radius * heading.cos() - radius).round() as i64;
        let top = (position.y - radius * heading.sin() - radius).round() as i64;

        let size = footprint.size();
        for (dy, row) in footprint.weights.chunks_exact(size.max(1)).enumerate() {
            for (dx, &weight) in row.iter().enumerate() {
                if weight == 0 {
                    continue;
                }
                #[expect(clippy::cast_possible_wrap)]
                let (x, y) = (left + dx as i64, top + dy as i64);
                if let Some(i) = self.index(x, y) {
                    self.cells[i] = self.cells[i].saturating_add(weight);
                }
            }
        }
    }

    /// Lowers every non-zero pixel by one.
    pub fn fade(&mut self) {
        for v in &mut self.cells {
            *v = v.saturating_sub(1);
        }
    }

    fn index(&self, x: i64, y: i64) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        (x < self.width && y < self.height).then_some(y * self.width + x)
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use super::*;

    #[test]
    fn test_footprint_rings() {
        let footprint = Footprint::new(20, 10);
        assert_eq!(footprint.size(), 40);
        assert_eq!(footprint.peak(), 10);

        let at = |x: usize, y: usize| footprint.weights[y * 40 + x];
        // centre is (20, 20) in stamp coordinates
        assert_eq!(at(20, 20), 10);
        assert_eq!(at(20 + 11, 20), 10);
        assert_eq!(at(20 + 12, 20), 6);
        assert_eq!(at(20 + 15, 20), 6);
        assert_eq!(at(20 + 16, 20), 3);
        assert_eq!(at(20 + 19, 20), 3);
        assert_eq!(at(0, 0), 0);
    }

    #[test]
    fn test_small_footprint_has_no_inner_ring() {
        let footprint = Footprint::new(5, 9);
        assert_eq!(footprint.peak(), 6);
    }

    #[test]
    fn test_stamp_lands_behind_agent() {
        let mut memory = VisitedMemory::new(200, 200);
        let footprint = Footprint::new(20, 10);
        // heading right: the stamp centre is 20 px to the left
        memory.stamp(&footprint, Position::new(100.0, 100.0), 0.0);
        assert_eq!(memory.get(80, 100), 10);
        assert_eq!(memory.get(100, 100), 3);
        assert_eq!(memory.get(101, 100), 0);
        assert_eq!(memory.get(80, 80), 3);

        let mut memory = VisitedMemory::new(200, 200);
        // heading down: the stamp centre is 20 px above
        memory.stamp(&footprint, Position::new(100.0, 100.0), PI / 2.0);
        assert_eq!(memory.get(100, 80), 10);
        assert_eq!(memory.get(100, 101), 0);
    }

    #[test]
    fn test_stamp_saturates() {
        let mut memory = VisitedMemory::new(100, 100);
        let footprint = Footprint::new(20, 100);
        for _ in 0..5 {
            memory.stamp(&footprint, Position::new(50.0, 50.0), 0.0);
        }
        assert_eq!(memory.get(30, 50), 255);
    }

    #[test]
    fn test_stamp_clips_at_edges() {
        let mut memory = VisitedMemory::new(30, 30);
        let footprint = Footprint::new(20, 10);
        memory.stamp(&footprint, Position::new(2.0, 2.0), 0.0);
        memory.stamp(&footprint, Position::new(60.0, 2.0), PI);
        assert_eq!(memory.get(0, 0), 10);
        assert!(memory.get(29, 2) > 0);
    }

    #[test]
    fn test_fade_returns_to_zero() {
        let mut memory = VisitedMemory::new(120, 120);
        let footprint = Footprint::new(20, 10);
        memory.stamp(&footprint, Position::new(60.0, 60.0), 1.0);
        assert!(!memory.is_clear());
        for _ in 0..9 {
            memory.fade();
        }
        assert!(!memory.is_clear());
        memory.fade();
        assert!(memory.is_clear());
        memory.fade();
        assert_eq!(memory.total(), 0);
    }
}
