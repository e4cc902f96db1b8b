//! Projectile - the bubble being shot.
//!
//! The projectile travels in a straight line at constant speed, bouncing
//! off the side walls, until it touches the ceiling or a grid bubble. It
//! then snaps to the nearest empty cell.

use bevy::prelude::*;

use super::{
    bubble::{Bubble, BubbleColor},
    grid::HexGrid,
    hex::{HexCoord, circles_intersect},
};

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Projectile>();
    app.add_message::<FireShooter>();
    app.add_message::<BubbleLanded>();
}

/// Message to fire the shooter's loaded bubble.
#[derive(Message, Debug, Clone)]
pub struct FireShooter;

/// Message sent when a projectile lands on the grid.
#[derive(Message, Debug, Clone)]
pub struct BubbleLanded {
    pub coord: HexCoord,
    pub color: BubbleColor,
}

/// The playfield walls: `x = 0`, `x = width` and the ceiling at `y = 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

/// A bubble in free flight. Not part of the grid until it snaps.
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Projectile {
    pub position: Vec2,
    /// Pixels per tick.
    pub velocity: Vec2,
    pub color: BubbleColor,
    pub radius: f32,
}

/// What stopped the projectile this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    Ceiling,
    Bubble(Bubble),
}

/// Result of advancing the projectile by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Step {
    pub bounced: bool,
    /// Fell past the bottom edge. The projectile can never land.
    pub out_of_play: bool,
    pub contact: Option<Contact>,
}

/// Where a landing projectile ended up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SnapOutcome {
    Placed(Bubble),
    /// No empty cell was close enough; the projectile is gone.
    Discarded,
}

impl Projectile {
    /// Launch from `origin` along `angle` (radians, screen space with y down).
    pub fn launch(color: BubbleColor, origin: Vec2, angle: f32, speed: f32, radius: f32) -> Self {
        Self {
            position: origin,
            velocity: Vec2::new(angle.cos(), angle.sin()) * speed,
            color,
            radius,
        }
    }

    /// Move, bounce, then look for contact with the ceiling or the grid.
    pub fn step(&mut self, playfield: &Playfield, grid: &HexGrid) -> Step {
        self.position += self.velocity;
        let bounced = self.bounce_off_walls(playfield);

        if self.is_below(playfield) {
            return Step {
                bounced,
                out_of_play: true,
                contact: None,
            };
        }

        let contact = if self.hits_ceiling() {
            Some(Contact::Ceiling)
        } else {
            self.first_grid_hit(grid).map(Contact::Bubble)
        };

        Step {
            bounced,
            out_of_play: false,
            contact,
        }
    }

    /// Reflect off the side walls and clamp back inside.
    ///
    /// Touching a wall exactly is not a bounce.
    pub fn bounce_off_walls(&mut self, playfield: &Playfield) -> bool {
        if self.position.x - self.radius < 0.0 {
            self.position.x = self.radius;
            self.velocity.x = self.velocity.x.abs();
            return true;
        }
        if self.position.x + self.radius > playfield.width {
            self.position.x = playfield.width - self.radius;
            self.velocity.x = -self.velocity.x.abs();
            return true;
        }
        false
    }

    /// The top edge has crossed the ceiling.
    pub fn hits_ceiling(&self) -> bool {
        self.position.y - self.radius < 0.0
    }

    /// The top edge has left through the bottom of the playfield.
    pub fn is_below(&self, playfield: &Playfield) -> bool {
        self.position.y - self.radius > playfield.height
    }

    /// First resident bubble (row-major) overlapping the projectile.
    pub fn first_grid_hit(&self, grid: &HexGrid) -> Option<Bubble> {
        grid.iter().find(|bubble| {
            circles_intersect(
                self.position,
                self.radius,
                grid.cell_center(bubble.coord),
                grid.bubble_radius,
            )
        })
    }

    /// Turn the projectile into a resident bubble at the nearest empty cell.
    pub fn snap(self, grid: &mut HexGrid, snap_radius: f32) -> SnapOutcome {
        let Some(coord) = grid.nearest_empty_slot(self.position, snap_radius) else {
            warn!(
                "No empty cell near {:?}, discarding {:?} projectile",
                self.position, self.color
            );
            return SnapOutcome::Discarded;
        };

        match grid.place(coord, self.color) {
            Some(bubble) => {
                debug!("Bubble landed at {} with color {:?}", coord, self.color);
                SnapOutcome::Placed(bubble)
            }
            None => SnapOutcome::Discarded,
        }
    }
}
