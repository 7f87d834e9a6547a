use serde::{Deserialize, Serialize};

/// Extent of a 3D region along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimension3D {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

impl Dimension3D {
    pub fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Length of the diagonal of a box with these dimensions.
    pub fn diagonal_length(&self) -> f64 {
        (self.width * self.width + self.height * self.height + self.depth * self.depth).sqrt()
    }
}

/// A translation applied to rendered output, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Offset2D {
    pub dx: f64,
    pub dy: f64,
}

impl Offset2D {
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Size of the drawing surface, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size2D {
    pub width: f64,
    pub height: f64,
}

impl Size2D {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Shrinks the size by `margin` (a fraction of each side, 0.25 = 25%).
    pub fn shrink(&self, margin: f64) -> Self {
        Self::new(self.width * (1.0 - margin), self.height * (1.0 - margin))
    }
}
