//! The bubble shooter core.
//!
//! This module contains all the gameplay logic including:
//! - Hexagonal grid geometry (odd-r offset coordinates)
//! - The bubble grid, cluster and floating detection
//! - Projectile flight, wall bounces and snapping
//! - The shooter and its color queue
//! - Game session state: score, levels, game over
//!
//! Everything runs on plain data. [`plugin`] hosts a [`GameSession`] as a
//! resource and advances it once per fixed step; rendering and input live
//! elsewhere and talk to it through messages.

pub mod bubble;
pub mod cluster;
pub mod config;
pub mod grid;
pub mod hex;
pub mod levels;
pub mod projectile;
pub mod shooter;
pub mod state;

use bevy::prelude::*;

pub use bubble::{Bubble, BubbleColor};
pub use config::GameConfig;
pub use grid::{GridBounds, HexGrid};
pub use hex::HexCoord;
pub use levels::{LevelSet, LevelTemplate};
pub use projectile::Projectile;
pub use shooter::Shooter;
pub use state::{GameSession, Phase, SessionView, TickEvent};

pub fn plugin(app: &mut App) {
    app.add_plugins((
        hex::plugin,
        bubble::plugin,
        shooter::plugin,
        projectile::plugin,
        cluster::plugin,
        state::plugin,
    ));
}
