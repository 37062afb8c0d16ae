//! # Entity Pool
//!
//! The player, enemies and potions of a level.
//!
//! Entities are plain values: a kind, a position and combat stats. They never reference
//! each other; the [`GameState`](crate::GameState) owns them and decides who hits whom.

use crate::Position;
use serde::{Deserialize, Serialize};

/// Player hit points at the start of a run.
pub const PLAYER_HP: u32 = 20;

/// Damage dealt by each player attack.
pub const PLAYER_DAMAGE: u32 = 2;

/// The kinds of hostile creature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Fragile and common
    Bug,
    /// Tougher and hits harder
    ScopeCreep,
}

/// Fixed behaviour of an enemy kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyProfile {
    /// Display name
    pub name: &'static str,
    /// Character drawn on the map
    pub glyph: char,
    /// Starting and maximum hit points
    pub hp: u32,
    /// Damage dealt per attack
    pub damage: u32,
    /// Message shown when the player kills one
    pub kill_message: &'static str,
    /// Subject of the attack message, e.g. "A bug"
    pub attacker: &'static str,
}

const BUG_PROFILE: EnemyProfile = EnemyProfile {
    name: "bug",
    glyph: 'b',
    hp: 1,
    damage: 1,
    kill_message: "You squashed a bug!",
    attacker: "A bug",
};

const SCOPE_CREEP_PROFILE: EnemyProfile = EnemyProfile {
    name: "scope creep",
    glyph: 's',
    hp: 3,
    damage: 2,
    kill_message: "You eliminated a scope creep!",
    attacker: "A scope creep",
};

impl EnemyKind {
    /// Looks up the fixed profile of this kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::EnemyKind;
    ///
    /// assert_eq!(EnemyKind::Bug.profile().glyph, 'b');
    /// assert_eq!(EnemyKind::ScopeCreep.profile().hp, 3);
    /// ```
    pub fn profile(self) -> &'static EnemyProfile {
        match self {
            EnemyKind::Bug => &BUG_PROFILE,
            EnemyKind::ScopeCreep => &SCOPE_CREEP_PROFILE,
        }
    }

    /// Message shown when an enemy of this kind hits the player.
    pub fn attack_message(self, damage: u32) -> String {
        format!("{} attacked - {} HP damage", self.profile().attacker, damage)
    }
}

impl std::fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.profile().name)
    }
}

/// What an entity is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    Enemy(EnemyKind),
    Potion,
}

/// A creature or item on the map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub kind: EntityKind,
    pub position: Position,
    pub hp: u32,
    pub max_hp: u32,
    pub damage: u32,
    pub glyph: char,
}

impl Entity {
    /// Creates the player at full health.
    pub fn player(position: Position) -> Self {
        Self {
            kind: EntityKind::Player,
            position,
            hp: PLAYER_HP,
            max_hp: PLAYER_HP,
            damage: PLAYER_DAMAGE,
            glyph: '@',
        }
    }

    /// Creates an enemy with the stats of its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{EnemyKind, Entity, Position};
    ///
    /// let creep = Entity::enemy(EnemyKind::ScopeCreep, Position::new(3, 4));
    /// assert_eq!(creep.hp, 3);
    /// assert_eq!(creep.damage, 2);
    /// assert!(creep.is_enemy());
    /// ```
    pub fn enemy(kind: EnemyKind, position: Position) -> Self {
        let profile = kind.profile();
        Self {
            kind: EntityKind::Enemy(kind),
            position,
            hp: profile.hp,
            max_hp: profile.hp,
            damage: profile.damage,
            glyph: profile.glyph,
        }
    }

    /// Creates a health potion.
    pub fn potion(position: Position) -> Self {
        Self {
            kind: EntityKind::Potion,
            position,
            hp: 0,
            max_hp: 0,
            damage: 0,
            glyph: '+',
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, EntityKind::Enemy(_))
    }

    /// The enemy kind, if this is an enemy.
    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match self.kind {
            EntityKind::Enemy(kind) => Some(kind),
            _ => None,
        }
    }

    /// Reduces hit points, stopping at zero.
    pub fn take_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Restores hit points, stopping at the maximum.
    pub fn heal(&mut self, amount: u32) {
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
    }

    /// Chebyshev distance between the two entities.
    pub fn distance_to(&self, other: &Entity) -> u32 {
        self.position.chebyshev_distance(other.position)
    }

    /// True if `other` stands on one of the 8 surrounding tiles.
    pub fn is_adjacent(&self, other: &Entity) -> bool {
        self.position.is_adjacent(other.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fixed_stats() {
        let player = Entity::player(Position::new(1, 1));
        assert_eq!((player.hp, player.max_hp, player.damage), (20, 20, 2));
        assert_eq!(player.glyph, '@');

        let bug = Entity::enemy(EnemyKind::Bug, Position::new(1, 1));
        assert_eq!((bug.hp, bug.damage, bug.glyph), (1, 1, 'b'));

        let potion = Entity::potion(Position::new(1, 1));
        assert_eq!(potion.glyph, '+');
        assert!(!potion.is_enemy());
        assert_eq!(potion.enemy_kind(), None);
    }

    #[test]
    fn test_damage_and_heal_clamp() {
        let mut player = Entity::player(Position::origin());
        player.take_damage(25);
        assert_eq!(player.hp, 0);
        assert!(!player.is_alive());

        player.hp = 18;
        player.heal(3);
        assert_eq!(player.hp, 20);
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            EnemyKind::Bug.attack_message(1),
            "A bug attacked - 1 HP damage"
        );
        assert_eq!(
            EnemyKind::ScopeCreep.attack_message(2),
            "A scope creep attacked - 2 HP damage"
        );
        assert_eq!(EnemyKind::ScopeCreep.to_string(), "scope creep");
    }

    #[test]
    fn test_adjacency_excludes_same_tile() {
        let a = Entity::player(Position::new(5, 5));
        let b = Entity::enemy(EnemyKind::Bug, Position::new(5, 5));
        assert!(!a.is_adjacent(&b));
        assert_eq!(a.distance_to(&b), 0);
    }

    proptest! {
        #[test]
        fn hp_stays_within_bounds(ops in prop::collection::vec((any::<bool>(), 0u32..30), 0..50)) {
            let mut player = Entity::player(Position::origin());
            for (is_heal, amount) in ops {
                if is_heal {
                    player.heal(amount);
                } else {
                    player.take_damage(amount);
                }
                prop_assert!(player.hp <= player.max_hp);
            }
        }

        #[test]
        fn adjacency_is_symmetric(
            ax in -50i32..50,
            ay in -50i32..50,
            bx in -50i32..50,
            by in -50i32..50,
        ) {
            let a = Entity::player(Position::new(ax, ay));
            let b = Entity::enemy(EnemyKind::Bug, Position::new(bx, by));
            prop_assert_eq!(a.is_adjacent(&b), b.is_adjacent(&a));
            prop_assert_eq!(a.is_adjacent(&b), a.distance_to(&b) == 1);
        }
    }
}
