//! Bubbles - the colored spheres that live on the hex grid.
//!
//! When 3+ of the same color are connected, they pop!

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::hex::HexCoord;

pub(super) fn plugin(app: &mut App) {
    app.register_type::<Bubble>();
    app.register_type::<BubbleColor>();
}

/// The different bubble colors.
/// Six colors, like classic Snood.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect, Default, Serialize, Deserialize,
)]
pub enum BubbleColor {
    #[default]
    Red,
    Amber,
    Lime,
    Cyan,
    Indigo,
    Fuchsia,
}

impl BubbleColor {
    /// Get all possible bubble colors, in level-template order.
    pub const ALL: [BubbleColor; 6] = [
        BubbleColor::Red,
        BubbleColor::Amber,
        BubbleColor::Lime,
        BubbleColor::Cyan,
        BubbleColor::Indigo,
        BubbleColor::Fuchsia,
    ];

    /// Pick a random color from the palette.
    ///
    /// Falls back to the default color when the palette is empty.
    pub fn random_from(palette: &[BubbleColor], rng: &mut impl Rng) -> Self {
        if palette.is_empty() {
            return Self::default();
        }
        palette[rng.random_range(0..palette.len())]
    }

    /// Resolve a 1-based level-template color index against the palette.
    ///
    /// `0` means empty. Indices past the end wrap around, so level authors
    /// can reuse color slots: `7` on a six-color palette is `palette[0]`.
    pub fn from_template(value: u32, palette: &[BubbleColor]) -> Option<Self> {
        if value == 0 || palette.is_empty() {
            return None;
        }
        let index = (value as usize - 1) % palette.len();
        Some(palette[index])
    }
}

/// A bubble resting on the grid.
///
/// The grid only stores colors, so the coordinate here always matches the
/// cell the bubble was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub struct Bubble {
    /// The hex coordinate where this bubble is placed
    pub coord: HexCoord,
    /// The bubble's color
    pub color: BubbleColor,
}

impl Bubble {
    pub const fn new(coord: HexCoord, color: BubbleColor) -> Self {
        Self { coord, color }
    }
}
