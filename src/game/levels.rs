//! Level templates.
//!
//! A layout is a list of rows of 1-based palette indices, `0` meaning an
//! empty cell. Odd rows are usually one shorter since they are shifted
//! right by half a bubble.

use std::{fs, path::Path};

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTemplate {
    #[serde(default)]
    pub id: u32,
    pub layout: Vec<Vec<u32>>,
}

/// The ordered, non-empty list of levels. Play cycles through it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LevelSet {
    levels: Vec<LevelTemplate>,
}

impl<'de> Deserialize<'de> for LevelSet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let levels = Vec::<LevelTemplate>::deserialize(deserializer)?;
        Self::new(levels).ok_or_else(|| serde::de::Error::custom("level set is empty"))
    }
}

impl Default for LevelSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LevelSet {
    /// Returns `None` for an empty list.
    pub fn new(levels: Vec<LevelTemplate>) -> Option<Self> {
        (!levels.is_empty()).then_some(Self { levels })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load levels from a JSON file, falling back to the built-in set.
    pub fn load_or_default(path: &Path) -> Self {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                warn!("Failed to read levels {:?}: {}, using built-in levels", path, e);
                return Self::builtin();
            }
        };

        match Self::from_json(&contents) {
            Ok(levels) => {
                info!("Loaded {} levels from {:?}", levels.len(), path);
                levels
            }
            Err(e) => {
                warn!("Failed to parse levels {:?}: {}, using built-in levels", path, e);
                Self::builtin()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Template for a 1-based level number, wrapping past the last level.
    pub fn for_level(&self, level: u32) -> &LevelTemplate {
        let index = (level.max(1) as usize - 1) % self.levels.len();
        &self.levels[index]
    }

    /// The three stock levels.
    pub fn builtin() -> Self {
        fn level(id: u32, layout: &[&[u32]]) -> LevelTemplate {
            LevelTemplate {
                id,
                layout: layout.iter().map(|row| row.to_vec()).collect(),
            }
        }

        Self {
            levels: vec![
                level(
                    1,
                    &[
                        &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                        &[2, 2, 2, 2, 2, 2, 2, 2, 2],
                        &[3, 3, 3, 3, 3, 3, 3, 3, 3, 3],
                        &[4, 4, 4, 4, 4, 4, 4, 4, 4],
                    ],
                ),
                level(
                    2,
                    &[
                        &[5, 0, 5, 0, 5, 0, 5, 0, 5, 0],
                        &[0, 6, 0, 6, 0, 6, 0, 6, 0],
                        &[5, 0, 5, 0, 5, 0, 5, 0, 5, 0],
                        &[0, 6, 0, 6, 0, 6, 0, 6, 0],
                        &[1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
                    ],
                ),
                level(
                    3,
                    &[
                        &[1, 2, 3, 4, 5, 6, 1, 2, 3, 4],
                        &[4, 3, 2, 1, 6, 5, 4, 3, 2],
                        &[1, 2, 3, 4, 5, 6, 1, 2, 3, 4],
                        &[4, 3, 2, 1, 6, 5, 4, 3, 2],
                        &[1, 1, 0, 0, 0, 0, 0, 0, 1, 1],
                        &[0, 2, 2, 0, 0, 0, 0, 2, 2],
                    ],
                ),
            ],
        }
    }
}
