//! # Encounter Generation
//!
//! How many enemies and potions a level gets, and which kind each enemy is.
//!
//! Placement itself belongs to the turn engine, which knows where the player, door and
//! hazard are; this module only decides the counts and kinds, drawing from the shared
//! [`RandomStream`].

use crate::game::EnemyKind;
use crate::RandomStream;
use serde::{Deserialize, Serialize};

/// Spawn counts per level.
///
/// Enemies scale linearly with depth; potions scale with depth plus a coin flip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncounterTable {
    /// Enemies on every level regardless of depth
    pub base_enemies: usize,
    /// Extra enemies per level of depth
    pub enemies_per_level: usize,
    /// Potions on every level regardless of depth
    pub base_potions: usize,
    /// Extra potions per level of depth
    pub potions_per_level: usize,
    /// A float draw above this threshold spawns a bug, otherwise a scope creep
    pub bug_threshold: f32,
}

impl EncounterTable {
    /// Creates the standard spawn table.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::EncounterTable;
    ///
    /// let table = EncounterTable::new();
    /// assert_eq!(table.enemy_count(1), 5);
    /// assert_eq!(table.enemy_count(5), 13);
    /// ```
    pub fn new() -> Self {
        Self {
            base_enemies: 3,
            enemies_per_level: 2,
            base_potions: 2,
            potions_per_level: 1,
            bug_threshold: 0.4,
        }
    }

    /// Number of enemies spawned on a level. Draws nothing.
    pub fn enemy_count(&self, level: u32) -> usize {
        self.base_enemies + self.enemies_per_level * level as usize
    }

    /// Number of potions spawned on a level. Draws one integer.
    pub fn potion_count(&self, level: u32, rng: &mut RandomStream) -> usize {
        self.base_potions + self.potions_per_level * level as usize + rng.below(2)
    }

    /// Picks the kind of the next enemy. Draws one float.
    pub fn roll_enemy_kind(&self, rng: &mut RandomStream) -> EnemyKind {
        if rng.float() > self.bug_threshold {
            EnemyKind::Bug
        } else {
            EnemyKind::ScopeCreep
        }
    }
}

impl Default for EncounterTable {
    fn default() -> Self {
        Self::new()
    }
}
