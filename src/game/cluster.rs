//! Cluster detection - finding matching and floating bubbles.
//!
//! Both searches are flood fills (BFS) over hex adjacency. Visited cells
//! are tracked in a boolean grid parallel to the occupancy array.

use std::collections::VecDeque;

use bevy::prelude::*;

use super::{
    bubble::{Bubble, BubbleColor},
    grid::HexGrid,
    hex::HexCoord,
};

pub(super) fn plugin(app: &mut App) {
    app.add_message::<ClusterPopped>();
    app.add_message::<FloatingBubblesRemoved>();
}

/// Message sent when a cluster is popped.
#[derive(Message, Debug, Clone)]
pub struct ClusterPopped {
    pub coords: Vec<HexCoord>,
    pub color: BubbleColor,
    pub count: usize,
}

/// Message sent when floating bubbles are removed.
#[derive(Message, Debug, Clone)]
pub struct FloatingBubblesRemoved {
    pub coords: Vec<HexCoord>,
    pub count: usize,
}

/// Boolean mask over the grid, indexed the same way as its cells.
struct Visited<'a> {
    grid: &'a HexGrid,
    seen: Vec<bool>,
}

impl<'a> Visited<'a> {
    fn new(grid: &'a HexGrid) -> Self {
        Self {
            grid,
            seen: vec![false; grid.bounds.area()],
        }
    }

    /// Mark a cell as seen. Returns false if it was already seen or is off the grid.
    fn insert(&mut self, coord: HexCoord) -> bool {
        let Some(index) = self.grid.bounds.index(coord) else {
            return false;
        };
        !std::mem::replace(&mut self.seen[index], true)
    }

    fn contains(&self, coord: HexCoord) -> bool {
        self.grid
            .bounds
            .index(coord)
            .is_some_and(|index| self.seen[index])
    }
}

impl HexGrid {
    /// Find all connected bubbles of the same color as `start` (BFS).
    ///
    /// The start bubble is always part of its own cluster.
    pub fn find_cluster(&self, start: Bubble) -> Vec<Bubble> {
        let mut cluster = Vec::new();
        let mut visited = Visited::new(self);
        let mut queue = VecDeque::new();

        visited.insert(start.coord);
        queue.push_back(start);

        while let Some(bubble) = queue.pop_front() {
            cluster.push(bubble);

            for neighbor in self.neighbors(bubble.coord) {
                if neighbor.color == start.color && visited.insert(neighbor.coord) {
                    queue.push_back(neighbor);
                }
            }
        }

        cluster
    }

    /// Find every bubble with no path to the ceiling.
    ///
    /// Row 0 is always attached, whatever its colors. Connectivity changes
    /// with every removal, so this recomputes from scratch each call.
    pub fn find_floating(&self) -> Vec<Bubble> {
        let anchored = self.find_anchored();
        self.iter()
            .filter(|bubble| !anchored.contains(bubble.coord))
            .collect()
    }

    /// Mark all bubbles connected to the top row, ignoring color.
    fn find_anchored(&self) -> Visited<'_> {
        let mut anchored = Visited::new(self);
        let mut queue = VecDeque::new();

        for col in 0..self.bounds.cols {
            let coord = HexCoord::new(0, col);
            if self.is_occupied(coord) && anchored.insert(coord) {
                queue.push_back(coord);
            }
        }

        while let Some(coord) = queue.pop_front() {
            for neighbor in self.neighbors(coord) {
                if anchored.insert(neighbor.coord) {
                    queue.push_back(neighbor.coord);
                }
            }
        }

        anchored
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{grid::GridBounds, levels::LevelTemplate};

    fn grid_with(layout: Vec<Vec<u32>>) -> HexGrid {
        let mut grid = HexGrid::new(GridBounds::new(14, 10), Vec2::new(40.0, 40.0), 20.0);
        grid.load_level(&LevelTemplate { id: 1, layout }, &BubbleColor::ALL);
        grid
    }

    fn coords(bubbles: &[Bubble]) -> Vec<HexCoord> {
        let mut coords: Vec<HexCoord> = bubbles.iter().map(|b| b.coord).collect();
        coords.sort_by_key(|c| (c.row, c.col));
        coords
    }

    #[test]
    fn test_isolated_bubble_is_its_own_cluster() {
        let grid = grid_with(vec![vec![0, 0, 0], vec![0, 3]]);
        let start = grid.get(HexCoord::new(1, 1)).unwrap();
        assert_eq!(grid.find_cluster(start), vec![start]);
    }

    #[test]
    fn test_single_color_grid_is_one_cluster() {
        let grid = grid_with(vec![vec![2; 10], vec![2; 9], vec![2; 10]]);
        let start = grid.get(HexCoord::new(1, 4)).unwrap();
        let cluster = grid.find_cluster(start);
        assert_eq!(cluster.len(), grid.len());
        assert_eq!(coords(&cluster), coords(&grid.iter().collect::<Vec<_>>()));
    }

    #[test]
    fn test_cluster_stops_at_other_colors() {
        let grid = grid_with(vec![vec![1, 1, 2, 1, 1]]);
        let start = grid.get(HexCoord::new(0, 0)).unwrap();
        assert_eq!(
            coords(&grid.find_cluster(start)),
            vec![HexCoord::new(0, 0), HexCoord::new(0, 1)]
        );
    }

    #[test]
    fn test_cluster_never_repeats_a_bubble() {
        let grid = grid_with(vec![vec![4; 10]; 6]);
        let start = grid.get(HexCoord::new(3, 3)).unwrap();
        let cluster = grid.find_cluster(start);
        let mut unique = coords(&cluster);
        unique.dedup();
        assert_eq!(unique.len(), cluster.len());
        assert_eq!(cluster.len(), 60);
    }

    #[test]
    fn test_cluster_follows_diagonal_adjacency() {
        // (1, 0) on a shifted row touches (0, 0) and (0, 1); (2, 0) touches (1, 0).
        let grid = grid_with(vec![vec![5, 0], vec![5], vec![5]]);
        let start = grid.get(HexCoord::new(0, 0)).unwrap();
        assert_eq!(grid.find_cluster(start).len(), 3);
    }

    #[test]
    fn test_no_floating_when_everything_hangs_from_ceiling() {
        let grid = grid_with(vec![vec![1, 2, 3, 4], vec![5, 6, 1], vec![2, 3]]);
        assert!(grid.find_floating().is_empty());
    }

    #[test]
    fn test_ceiling_row_is_attached_regardless_of_pattern() {
        let grid = grid_with(vec![vec![1, 0, 2, 0, 3, 0, 4]]);
        assert!(grid.find_floating().is_empty());
    }

    #[test]
    fn test_removing_connector_drops_dangling_cluster() {
        // A chain hanging from (0, 0): (1, 0) -> (2, 0) -> (3, 0).
        let mut grid = grid_with(vec![vec![1], vec![2], vec![3], vec![4]]);
        assert!(grid.find_floating().is_empty());

        let connector = grid.get(HexCoord::new(1, 0)).unwrap();
        grid.remove_bubbles(&[connector]);

        assert_eq!(
            coords(&grid.find_floating()),
            vec![HexCoord::new(2, 0), HexCoord::new(3, 0)]
        );
    }

    #[test]
    fn test_empty_top_row_means_everything_floats() {
        let grid = grid_with(vec![vec![0; 10], vec![1, 1], vec![2]]);
        assert_eq!(grid.find_floating().len(), 3);
    }
}
