//! The shooter/launcher at the bottom of the playfield.
//!
//! The shooter always has a "loaded" bubble ready to fire and a "next"
//! bubble preview. Aim is an angle in screen space (y grows downward), so
//! straight up is `-PI / 2`.

use std::f32::consts::FRAC_PI_2;

use bevy::prelude::*;
use rand::Rng;

use super::bubble::BubbleColor;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Shooter>();
    app.add_message::<AimShooter>();
}

/// Message to point the shooter somewhere.
#[derive(Message, Debug, Clone, Copy)]
pub enum AimShooter {
    /// Radians, screen space.
    Angle(f32),
    /// A point on the playfield, e.g. under the cursor.
    At(Vec2),
}

/// Flattest allowed aim toward the left wall (about -170 degrees).
const MIN_AIM_ANGLE: f32 = -2.96;

/// Flattest allowed aim toward the right wall (about -10 degrees).
const MAX_AIM_ANGLE: f32 = -0.17;

#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Shooter {
    pub position: Vec2,
    pub angle: f32,
    pub loaded: BubbleColor,
    pub next: BubbleColor,
}

impl Shooter {
    /// Spawn a shooter aiming straight up with two random colors queued.
    pub fn new(position: Vec2, palette: &[BubbleColor], rng: &mut impl Rng) -> Self {
        let loaded = BubbleColor::random_from(palette, rng);
        let next = BubbleColor::random_from(palette, rng);
        Self {
            position,
            angle: -FRAC_PI_2,
            loaded,
            next,
        }
    }

    /// Set the aim angle, clamped so shots are never too flat or downward.
    pub fn aim(&mut self, angle: f32) {
        self.angle = clamp_aim(angle);
    }

    /// Aim at a point on the playfield.
    pub fn aim_at(&mut self, target: Vec2) {
        let delta = target - self.position;
        self.aim(delta.y.atan2(delta.x));
    }

    /// Move the preview into the chamber and queue a fresh color.
    pub fn reload(&mut self, palette: &[BubbleColor], rng: &mut impl Rng) {
        self.loaded = self.next;
        self.next = BubbleColor::random_from(palette, rng);
        debug!("Reloaded with {:?}, next is {:?}", self.loaded, self.next);
    }
}

/// Downward angles land on the flattest right-hand aim.
fn clamp_aim(angle: f32) -> f32 {
    if angle.is_nan() {
        return -FRAC_PI_2;
    }
    angle.clamp(MIN_AIM_ANGLE, MAX_AIM_ANGLE)
}
