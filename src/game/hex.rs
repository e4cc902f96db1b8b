//! Hexagonal coordinate system using offset coordinates (odd-r).
//!
//! Based on Red Blob Games' excellent guide:
//! https://www.redblobgames.com/grids/hexagons/
//!
//! Cells are addressed by (row, col). Odd rows are shifted right by one
//! bubble radius (half a cell), which gives the classic bubble shooter
//! brick layout. Screen space grows downward: row 0 hangs from the ceiling.

use bevy::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<HexCoord>();
}

/// Square root of 3, used frequently in hex math.
pub const SQRT_3: f32 = 1.732_050_8;

/// Neighbor offsets `(d_row, d_col)` for cells on an even row.
const EVEN_ROW_DIRECTIONS: [(i32, i32); 6] = [(0, -1), (0, 1), (-1, -1), (-1, 0), (1, -1), (1, 0)];

/// Neighbor offsets `(d_row, d_col)` for cells on an odd (shifted) row.
const ODD_ROW_DIRECTIONS: [(i32, i32); 6] = [(0, -1), (0, 1), (-1, 0), (-1, 1), (1, 0), (1, 1)];

/// Offset hex coordinate (odd-r system).
///
/// Signed so that neighbor arithmetic can step off the grid; bounds are
/// checked by the grid, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct HexCoord {
    /// Row (y-axis, grows downward)
    pub row: i32,
    /// Column (x-axis)
    pub col: i32,
}

impl HexCoord {
    /// Create a new hex coordinate.
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Whether this cell sits on a shifted row.
    #[inline]
    pub const fn is_odd_row(&self) -> bool {
        self.row % 2 != 0
    }

    /// The six neighbor offsets for this cell's row parity.
    pub const fn directions(&self) -> [(i32, i32); 6] {
        if self.is_odd_row() {
            ODD_ROW_DIRECTIONS
        } else {
            EVEN_ROW_DIRECTIONS
        }
    }

    /// Get all 6 neighboring hex coordinates, in or out of bounds.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        self.directions()
            .map(|(d_row, d_col)| HexCoord::new(self.row + d_row, self.col + d_col))
    }

    /// Convert to a pixel position with the given bubble radius and grid origin.
    pub fn to_pixel(&self, radius: f32, origin: Vec2) -> Vec2 {
        hex_position(self.row, self.col, radius, origin)
    }
}

impl std::fmt::Display for HexCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Project a grid cell to the pixel center of its bubble.
///
/// Columns are `2 * radius` apart, odd rows shift right by `radius`, and rows
/// are `sqrt(3) * radius` apart (hex row pitch, so bubbles nest).
pub fn hex_position(row: i32, col: i32, radius: f32, origin: Vec2) -> Vec2 {
    let x_offset = if row % 2 != 0 { radius } else { 0.0 };
    let x = origin.x + col as f32 * radius * 2.0 + x_offset;
    let y = origin.y + row as f32 * SQRT_3 * radius;
    Vec2::new(x, y)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    a.distance(b)
}

/// Whether two circles overlap. Touching circles do not.
#[inline]
pub fn circles_intersect(c1: Vec2, r1: f32, c2: Vec2, r2: f32) -> bool {
    distance(c1, c2) < r1 + r2
}
