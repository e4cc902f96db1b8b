//! Hexpop - the simulation core of a hex-grid bubble shooter.
//!
//! Fire a bubble into a hexagonally packed ceiling of colored bubbles:
//! clusters of three or more pop, and anything left hanging falls.

pub mod game;

use bevy::prelude::*;

pub use game::{GameConfig, GameSession, LevelSet, Phase, SessionView, TickEvent};

/// Adds the game session and its fixed-step driver to an app.
pub struct GamePlugin;

impl Plugin for GamePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(game::plugin);
    }
}
