//! The hexagonal grid that holds all bubbles.
//!
//! Uses a fixed-size row-major array for storage: one optional color per
//! cell. The grid is rebuilt wholesale for every level, never resized.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, BubbleColor},
    hex::{HexCoord, distance},
    levels::LevelTemplate,
};

/// The bounds of the playable grid area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridBounds {
    pub rows: i32,
    pub cols: i32,
}

impl GridBounds {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows as i32,
            cols: cols as i32,
        }
    }

    /// Check if a hex coordinate is within bounds.
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.row >= 0 && coord.row < self.rows && coord.col >= 0 && coord.col < self.cols
    }

    /// Packed row-major index of an in-bounds coordinate.
    pub fn index(&self, coord: HexCoord) -> Option<usize> {
        self.contains(coord)
            .then(|| (coord.row * self.cols + coord.col) as usize)
    }

    /// Number of cells in the grid.
    pub fn area(&self) -> usize {
        (self.rows * self.cols) as usize
    }

    /// Iterate over all valid hex coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = HexCoord> + use<> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |row| (0..cols).map(move |col| HexCoord::new(row, col)))
    }

    /// The last column of a shifted row is addressable but hangs past the
    /// right edge, so projectiles never snap there.
    pub fn is_snap_target(&self, coord: HexCoord) -> bool {
        self.contains(coord) && !(coord.is_odd_row() && coord.col == self.cols - 1)
    }
}

/// The grid of resident bubbles.
#[derive(Debug, Clone, PartialEq)]
pub struct HexGrid {
    cells: Vec<Option<BubbleColor>>,
    pub bounds: GridBounds,
    /// Pixel center of cell (0, 0).
    pub origin: Vec2,
    pub bubble_radius: f32,
}

impl HexGrid {
    /// Create a new empty grid.
    pub fn new(bounds: GridBounds, origin: Vec2, bubble_radius: f32) -> Self {
        Self {
            cells: vec![None; bounds.area()],
            bounds,
            origin,
            bubble_radius,
        }
    }

    /// Place a bubble for every non-empty template cell that fits the grid.
    ///
    /// Template values are 1-based palette indices that wrap around; cells
    /// outside the grid are ignored.
    pub fn load_level(&mut self, template: &LevelTemplate, palette: &[BubbleColor]) {
        let mut count = 0;
        for (row, values) in template.layout.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                let Some(color) = BubbleColor::from_template(value, palette) else {
                    continue;
                };
                let coord = HexCoord::new(row as i32, col as i32);
                if self.place(coord, color).is_some() {
                    count += 1;
                }
            }
        }
        debug!("Loaded level {} with {} bubbles", template.id, count);
    }

    /// Check if a cell is occupied.
    pub fn is_occupied(&self, coord: HexCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Get the bubble at a position, if any.
    pub fn get(&self, coord: HexCoord) -> Option<Bubble> {
        let index = self.bounds.index(coord)?;
        self.cells[index].map(|color| Bubble::new(coord, color))
    }

    /// Put a bubble in a cell, replacing whatever was there.
    ///
    /// Returns the placed bubble, or `None` if the cell is out of bounds.
    pub fn place(&mut self, coord: HexCoord, color: BubbleColor) -> Option<Bubble> {
        let index = self.bounds.index(coord)?;
        self.cells[index] = Some(color);
        Some(Bubble::new(coord, color))
    }

    /// Empty every listed cell. Already-empty cells stay empty.
    pub fn remove_bubbles(&mut self, bubbles: &[Bubble]) {
        for bubble in bubbles {
            if let Some(index) = self.bounds.index(bubble.coord) {
                self.cells[index] = None;
            }
        }
    }

    /// Occupied neighbors of a cell, using odd-r offset adjacency.
    pub fn neighbors(&self, coord: HexCoord) -> Vec<Bubble> {
        coord
            .neighbors()
            .into_iter()
            .filter_map(|n| self.get(n))
            .collect()
    }

    /// Get the number of bubbles in the grid.
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }

    /// Check if the grid is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Iterate over all resident bubbles, row by row.
    pub fn iter(&self) -> impl Iterator<Item = Bubble> + '_ {
        self.bounds.iter().filter_map(|coord| self.get(coord))
    }

    /// Pixel center of a cell.
    pub fn cell_center(&self, coord: HexCoord) -> Vec2 {
        coord.to_pixel(self.bubble_radius, self.origin)
    }

    /// Win condition: nothing left on the board.
    pub fn is_level_cleared(&self) -> bool {
        self.is_empty()
    }

    /// Lose condition: a bubble has reached the bottom row.
    pub fn is_game_over(&self) -> bool {
        let last = self.bounds.rows - 1;
        (0..self.bounds.cols).any(|col| self.is_occupied(HexCoord::new(last, col)))
    }

    /// Find the closest empty snap target to a pixel position.
    ///
    /// Checks every cell instead of inverting the hex projection; the grid is
    /// small and this only runs when a projectile lands. Ties go to the first
    /// cell in row-major order.
    pub fn nearest_empty_slot(&self, position: Vec2, max_distance: f32) -> Option<HexCoord> {
        let mut best: Option<(HexCoord, f32)> = None;

        for coord in self.bounds.iter() {
            if !self.bounds.is_snap_target(coord) || self.is_occupied(coord) {
                continue;
            }
            let d = distance(position, self.cell_center(coord));
            if d >= max_distance {
                continue;
            }
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((coord, d));
            }
        }

        best.map(|(coord, _)| coord)
    }
}
