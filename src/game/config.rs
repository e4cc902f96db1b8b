//! Tunable game parameters.
//!
//! Every field has a default, so a JSON config only needs the values it
//! changes. Pixel distances are per tick, not per second.

use std::{fs, path::Path};

use bevy::prelude::*;
use serde::Deserialize;

use super::bubble::BubbleColor;

/// Number of grid rows. The last row is the game-over line.
pub const GRID_ROWS: usize = 14;

/// Number of grid columns.
pub const GRID_COLS: usize = 10;

/// Radius of every bubble, resident or in flight.
pub const BUBBLE_RADIUS: f32 = 20.0;

/// Default playfield size in pixels.
pub const PLAYFIELD_WIDTH: f32 = 440.0;
pub const PLAYFIELD_HEIGHT: f32 = 700.0;

/// Projectile speed in pixels per tick.
pub const PROJECTILE_SPEED: f32 = 15.0;

/// Points awarded per bubble popped in a cluster.
pub const POINTS_PER_BUBBLE: u32 = 10;

/// Points awarded per floating bubble dropped.
pub const POINTS_PER_FLOATING: u32 = 20;

/// Minimum cluster size to pop (match-3).
pub const MIN_CLUSTER_SIZE: usize = 3;

/// A landing projectile snaps to empty cells within this many radii.
pub const SNAP_RADIUS_FACTOR: f32 = 1.5;

/// Distance of the shooter above the bottom of the playfield.
const SHOOTER_MARGIN: f32 = 50.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub rows: usize,
    pub cols: usize,
    pub bubble_radius: f32,
    pub playfield_width: f32,
    pub playfield_height: f32,
    pub projectile_speed: f32,
    pub pop_points: u32,
    pub floating_points: u32,
    pub min_cluster_size: usize,
    pub snap_radius_factor: f32,
    pub palette: Vec<BubbleColor>,
    /// Seed for the shooter's color queue. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: GRID_ROWS,
            cols: GRID_COLS,
            bubble_radius: BUBBLE_RADIUS,
            playfield_width: PLAYFIELD_WIDTH,
            playfield_height: PLAYFIELD_HEIGHT,
            projectile_speed: PROJECTILE_SPEED,
            pop_points: POINTS_PER_BUBBLE,
            floating_points: POINTS_PER_FLOATING,
            min_cluster_size: MIN_CLUSTER_SIZE,
            snap_radius_factor: SNAP_RADIUS_FACTOR,
            palette: BubbleColor::ALL.to_vec(),
            seed: None,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a config file, falling back to defaults if it is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read config {:?}: {}, using defaults", path, e);
                return Self::default();
            }
        };

        match Self::from_json(&contents) {
            Ok(config) => {
                info!("Loaded config from {:?}", path);
                config.sanitized()
            }
            Err(e) => {
                warn!("Failed to parse config {:?}: {}, using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Replace values that would make the grid or the palette degenerate.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if self.palette.is_empty() {
            warn!("Config palette is empty, using the default palette");
            self.palette = defaults.palette;
        }
        if self.rows == 0 || self.cols == 0 {
            warn!(
                "Config grid {}x{} is empty, using {}x{}",
                self.rows, self.cols, defaults.rows, defaults.cols
            );
            self.rows = defaults.rows;
            self.cols = defaults.cols;
        }
        if self.bubble_radius <= 0.0 {
            warn!("Config bubble radius {} is not positive", self.bubble_radius);
            self.bubble_radius = defaults.bubble_radius;
        }
        if !(self.projectile_speed.is_finite() && self.projectile_speed > 0.0) {
            warn!(
                "Config projectile speed {} is not positive, using {}",
                self.projectile_speed, defaults.projectile_speed
            );
            self.projectile_speed = defaults.projectile_speed;
        }
        if self.min_cluster_size == 0 {
            warn!("Config minimum cluster size is zero, using {}", defaults.min_cluster_size);
            self.min_cluster_size = defaults.min_cluster_size;
        }
        self
    }

    /// Pixel center of cell (0, 0): the grid is centered horizontally and
    /// hangs one bubble diameter below the ceiling.
    pub fn grid_origin(&self) -> Vec2 {
        let grid_width = self.cols as f32 * self.bubble_radius * 2.0;
        Vec2::new(
            (self.playfield_width - grid_width) / 2.0 + self.bubble_radius,
            self.bubble_radius * 2.0,
        )
    }

    /// Where projectiles are launched from.
    pub fn shooter_origin(&self) -> Vec2 {
        Vec2::new(
            self.playfield_width / 2.0,
            self.playfield_height - SHOOTER_MARGIN,
        )
    }

    /// Empty cells closer than this to a landing projectile are snap targets.
    pub fn snap_radius(&self) -> f32 {
        self.bubble_radius * self.snap_radius_factor
    }
}
