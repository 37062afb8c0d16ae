//! # Game State Module
//!
//! The turn engine: one session of play from the first level to death or escape.
//!
//! [`GameState`] owns the dungeon, every entity and the session's [`RandomStream`]. A call to
//! [`GameState::move_player`] runs one complete turn (player action, enemy phase, visibility,
//! win and loss checks) and returns what happened. Play never fails: impossible moves are
//! rejected without touching the state, and generation degrades gracefully instead of
//! erroring.

use crate::generation::utils;
use crate::{
    config, BspGenerator, CrawlError, CrawlResult, Dungeon, EncounterTable, EnemyKind, Entity,
    FieldOfView, GenerationConfig, Generator, HazardTrap, Position, RandomStream, Room,
    SourceFile, Tile,
};
use crate::game::visibility::has_line_of_sight;
use log::{debug, info, trace, warn};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

/// Shown when the player walks close to an untriggered or burning trap.
pub const HAZARD_WARNING: &str = "WARNING: MERGE CONFLICT DETECTED. TREAD CAREFULLY.";

const HAZARD_TRIGGERED: &str = "MERGE CONFLICT! The code tears apart around you!";
const HAZARD_DEATH: &str = "You died in a merge conflict!";
const HAZARD_SHIELDED: &str =
    "The merge conflict burns around you, but your invulnerability protects you!";
const ENEMY_DEATH: &str = "You died!";
const DESCEND: &str = "You descend deeper into the dungeon...";
const ESCAPE: &str = "You've escaped the dungeon! Victory!";
const BUMP_ATTACK: &str = "You attack!";
const CHEAT_ACTIVATED: &str = "KONAMI CODE ACTIVATED! You are now invulnerable!";

/// Keys that take part in the cheat code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheatKey {
    Up,
    Down,
    Left,
    Right,
    B,
    A,
    /// Any other key; breaks a sequence in progress
    Other,
}

/// up up down down left right left right b a
const CHEAT_SEQUENCE: [CheatKey; 10] = [
    CheatKey::Up,
    CheatKey::Up,
    CheatKey::Down,
    CheatKey::Down,
    CheatKey::Left,
    CheatKey::Right,
    CheatKey::Left,
    CheatKey::Right,
    CheatKey::B,
    CheatKey::A,
];

/// Runtime tunables of a session.
///
/// Defaults reproduce the standard game. Can be loaded from JSON, where missing fields fall
/// back to their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Dungeon generation bounds
    pub generation: GenerationConfig,
    /// Enemy and potion counts
    pub encounters: EncounterTable,
    /// Reaching the door on this level wins the game
    pub max_level: u32,
    /// Vision radius in tiles
    pub vision_radius: i32,
    /// Hit points restored by a potion
    pub potion_heal: u32,
    /// Damage of the first contact with the hazard trap
    pub trap_damage: u32,
    /// Damage of every later contact with a triggered trap
    pub burn_damage: u32,
    /// Start the session invulnerable
    pub invulnerable: bool,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            generation: GenerationConfig::new(),
            encounters: EncounterTable::new(),
            max_level: config::MAX_LEVEL,
            vision_radius: config::VISION_RADIUS,
            potion_heal: config::POTION_HEAL,
            trap_damage: config::TRAP_DAMAGE,
            burn_damage: config::BURN_DAMAGE,
            invulnerable: false,
        }
    }

    /// Loads and validates a configuration file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CrawlResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!("Loaded session config from {}", path.as_ref().display());
        Ok(config)
    }

    /// Rejects values no game can be played with.
    pub fn validate(&self) -> CrawlResult<()> {
        self.generation.validate()?;
        if self.max_level == 0 {
            return Err(CrawlError::InvalidConfig(
                "max_level must be at least 1".to_string(),
            ));
        }
        if self.vision_radius < 1 {
            return Err(CrawlError::InvalidConfig(format!(
                "vision_radius must be positive, got {}",
                self.vision_radius
            )));
        }
        if !(0.0..=1.0).contains(&self.encounters.bug_threshold) {
            return Err(CrawlError::InvalidConfig(format!(
                "bug_threshold must lie in [0, 1], got {}",
                self.encounters.bug_threshold
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Game completion state for handling endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionState {
    /// Game is still in progress
    Playing,
    /// Player died
    PlayerDied,
    /// Player walked through the door of the last level
    Victory,
}

/// What killed the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    Enemy(EnemyKind),
    Hazard,
}

/// How a message should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MessageTone {
    #[default]
    Normal,
    /// The player was hurt
    Damage,
}

/// The one-line message shown under the status bar.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Message {
    text: String,
    tone: MessageTone,
}

impl Message {
    pub fn normal(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: MessageTone::Normal,
        }
    }

    pub fn damage(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: MessageTone::Damage,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tone(&self) -> MessageTone {
        self.tone
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Result of one call to [`GameState::move_player`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing happened: the game is over or the target is blocked
    Rejected,
    /// The player hit an enemy instead of moving
    Attacked,
    /// The player moved and a full turn was played
    Moved,
    /// The player took the door to the next level
    Descended,
    /// The player took the door of the last level
    Escaped,
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of enemies killed by the player
    pub enemies_killed: u32,
    /// Number of successful moves
    pub moves: u64,
    /// Total damage taken
    pub damage_taken: u64,
    /// Number of potions drunk
    pub potions_drunk: u32,
}

impl GameStatistics {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A hand-made level to start a session from.
///
/// Used by scripted scenarios and tests that need exact positions rather than a
/// generated level.
#[derive(Debug, Clone)]
pub struct LevelLayout {
    pub dungeon: Dungeon,
    pub player: Position,
    /// Without a door the level cannot be left
    pub door: Option<Position>,
    /// Without a trap there is no hazard on the level
    pub hazard: Option<Position>,
    pub enemies: Vec<(EnemyKind, Position)>,
    pub potions: Vec<Position>,
    pub level: u32,
}

impl LevelLayout {
    /// A first-level layout with only the player.
    pub fn new(dungeon: Dungeon, player: Position) -> Self {
        Self {
            dungeon,
            player,
            door: None,
            hazard: None,
            enemies: Vec::new(),
            potions: Vec::new(),
            level: 1,
        }
    }

    pub fn with_door(mut self, door: Position) -> Self {
        self.door = Some(door);
        self
    }

    pub fn with_hazard(mut self, hazard: Position) -> Self {
        self.hazard = Some(hazard);
        self
    }

    pub fn with_enemy(mut self, kind: EnemyKind, position: Position) -> Self {
        self.enemies.push((kind, position));
        self
    }

    pub fn with_potion(mut self, position: Position) -> Self {
        self.potions.push(position);
        self
    }

    pub fn at_level(mut self, level: u32) -> Self {
        self.level = level.max(1);
        self
    }
}

/// Central game state for one session.
///
/// Owns the dungeon, the player, enemies, potions and the only random stream of the
/// session. All mutation goes through [`GameState::move_player`], [`GameState::register_key`]
/// and [`GameState::resize`].
#[derive(Debug, Clone)]
pub struct GameState {
    config: SessionConfig,
    level: u32,
    player: Entity,
    enemies: Vec<Entity>,
    potions: Vec<Entity>,
    dungeon: Dungeon,
    fov: FieldOfView,
    rng: RandomStream,
    door: Position,
    hazard: HazardTrap,
    statistics: GameStatistics,
    completion_state: CompletionState,
    death_cause: Option<DeathCause>,
    message: Message,
    invulnerable: bool,
    key_history: VecDeque<CheatKey>,
    view_width: i32,
    view_height: i32,
    backgrounds: Vec<SourceFile>,
}

impl GameState {
    /// Starts a session with the standard configuration.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{CompletionState, GameState};
    ///
    /// let state = GameState::new(Vec::new(), 42, 80, 43);
    /// assert_eq!(state.level(), 1);
    /// assert_eq!(state.player().hp, 20);
    /// assert_eq!(state.completion_state(), CompletionState::Playing);
    /// ```
    pub fn new(
        backgrounds: Vec<SourceFile>,
        seed: u64,
        view_width: i32,
        view_height: i32,
    ) -> Self {
        Self::with_config(
            backgrounds,
            seed,
            view_width,
            view_height,
            SessionConfig::default(),
        )
    }

    /// Starts a session and generates its first level.
    pub fn with_config(
        backgrounds: Vec<SourceFile>,
        seed: u64,
        view_width: i32,
        view_height: i32,
        config: SessionConfig,
    ) -> Self {
        info!(
            "Starting session with seed {} ({} background files)",
            seed,
            backgrounds.len()
        );
        let mut state = Self::empty(config, seed, view_width, view_height);
        state.backgrounds = backgrounds;
        state.generate_level();
        state
    }

    /// Starts a session on a hand-made level.
    ///
    /// The door tile is written into the dungeon. The random stream is still seeded, so the
    /// hazard spread and any later level are generated as usual.
    pub fn from_layout(layout: LevelLayout, seed: u64, config: SessionConfig) -> Self {
        let mut state = Self::empty(config, seed, layout.dungeon.width, layout.dungeon.height);
        state.level = layout.level;
        state.dungeon = layout.dungeon;
        state.fov = FieldOfView::new(&state.dungeon);
        state.player.position = layout.player;

        state.door = match layout.door {
            Some(door) => {
                state.dungeon.set_tile(door, Tile::Door);
                door
            }
            None => Position::new(-1, -1),
        };
        state.hazard = layout
            .hazard
            .map_or_else(HazardTrap::unplaced, HazardTrap::new);
        state.enemies = layout
            .enemies
            .into_iter()
            .map(|(kind, position)| Entity::enemy(kind, position))
            .collect();
        state.potions = layout.potions.into_iter().map(Entity::potion).collect();

        state.update_visibility();
        state
    }

    fn empty(config: SessionConfig, seed: u64, view_width: i32, view_height: i32) -> Self {
        let dungeon = Dungeon::new(0, 0, None);
        let invulnerable = config.invulnerable;
        Self {
            config,
            level: 1,
            player: Entity::player(Position::origin()),
            enemies: Vec::new(),
            potions: Vec::new(),
            fov: FieldOfView::new(&dungeon),
            dungeon,
            rng: utils::create_rng(seed),
            door: Position::new(-1, -1),
            hazard: HazardTrap::unplaced(),
            statistics: GameStatistics::new(),
            completion_state: CompletionState::Playing,
            death_cause: None,
            message: Message::default(),
            invulnerable,
            key_history: VecDeque::with_capacity(CHEAT_SEQUENCE.len()),
            view_width,
            view_height,
            backgrounds: Vec::new(),
        }
    }

    /// Builds the current level: layout, player, door, trap, enemies, potions.
    fn generate_level(&mut self) {
        let generator = BspGenerator::with_config(self.config.generation.clone());
        let (width, height) =
            utils::dungeon_dimensions(&self.config.generation, self.view_width, self.view_height);
        let background = (!self.backgrounds.is_empty())
            .then(|| (self.level as usize - 1) % self.backgrounds.len());

        self.dungeon = generator.generate(width, height, &mut self.rng, background);
        self.fov = FieldOfView::new(&self.dungeon);

        self.player.position = self
            .dungeon
            .rooms
            .first()
            .map(Room::center)
            .unwrap_or_else(|| self.dungeon.center());
        self.door = self.dungeon.place_door(&mut self.rng);

        if let Err(e) = generator.validate(&self.dungeon) {
            warn!("Level {} failed validation: {}", self.level, e);
        }

        self.hazard = HazardTrap::unplaced();
        let trap = self.spawn_tile();
        self.hazard = HazardTrap::new(trap);

        self.enemies.clear();
        for _ in 0..self.config.encounters.enemy_count(self.level) {
            let position = self.spawn_tile();
            let kind = self.config.encounters.roll_enemy_kind(&mut self.rng);
            self.enemies.push(Entity::enemy(kind, position));
        }

        self.potions.clear();
        let potions = self
            .config
            .encounters
            .potion_count(self.level, &mut self.rng);
        for _ in 0..potions {
            let position = self.spawn_tile();
            self.potions.push(Entity::potion(position));
        }

        self.update_visibility();
        self.message.clear();

        debug!(
            "Level {}: {}x{}, {} rooms, player at {:?}, door at {:?}, trap at {:?}, \
             {} enemies, {} potions",
            self.level,
            self.dungeon.width,
            self.dungeon.height,
            self.dungeon.rooms.len(),
            self.player.position,
            self.door,
            self.hazard.position,
            self.enemies.len(),
            self.potions.len()
        );
    }

    /// Picks a random free tile inside a random room.
    ///
    /// Free means walkable and not the player, the door or the trap. Falls back to the grid
    /// center when no room exists or every attempt fails.
    fn spawn_tile(&mut self) -> Position {
        let room_count = self.dungeon.rooms.len();
        if room_count > 0 {
            for _ in 0..config::SPAWN_ATTEMPTS {
                let room = self.dungeon.rooms[self.rng.below(room_count)];
                let x = room.top_left.x + self.rng.below_i32(room.width);
                let y = room.top_left.y + self.rng.below_i32(room.height);
                let pos = Position::new(x, y);

                if self.dungeon.is_walkable(pos)
                    && pos != self.player.position
                    && pos != self.door
                    && !self.hazard.is_at(pos)
                {
                    return pos;
                }
            }
        }

        let fallback = self.dungeon.center();
        warn!(
            "No free spawn tile found on level {}, using {:?}",
            self.level, fallback
        );
        fallback
    }

    /// Runs one turn with the player trying to step by `(dx, dy)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use codecrawl::{Dungeon, GameState, LevelLayout, MoveOutcome, Position, SessionConfig};
    ///
    /// let layout = LevelLayout::new(Dungeon::open_floor(40, 20), Position::new(5, 5));
    /// let mut state = GameState::from_layout(layout, 1, SessionConfig::default());
    ///
    /// assert_eq!(state.move_player(1, 0), MoveOutcome::Moved);
    /// assert_eq!(state.player().position, Position::new(6, 5));
    /// assert_eq!(state.move_player(0, -6), MoveOutcome::Rejected);
    /// ```
    pub fn move_player(&mut self, dx: i32, dy: i32) -> MoveOutcome {
        if self.is_finished() {
            return MoveOutcome::Rejected;
        }

        let target = self.player.position + Position::new(dx, dy);
        if !self.dungeon.is_walkable(target) {
            trace!("Move to {:?} blocked", target);
            return MoveOutcome::Rejected;
        }

        if let Some(index) = self.living_enemy_at(target) {
            self.message.clear();
            if !self.strike(index) {
                self.message = Message::normal(BUMP_ATTACK);
            }
            let lethal = self.enemy_phase();
            self.update_visibility();
            self.check_enemy_death(lethal);
            return MoveOutcome::Attacked;
        }

        self.message.clear();
        self.player.position = target;
        self.statistics.moves += 1;
        self.hazard.advance_animation();
        trace!("Player moved to {:?}", target);

        self.pick_up_potion();

        if self.hazard.is_at(target) {
            self.step_on_hazard();
            if !self.player.is_alive() {
                self.finish_dead(DeathCause::Hazard, HAZARD_DEATH);
                return MoveOutcome::Moved;
            }
        }

        if target == self.door {
            return self.take_door();
        }

        self.player_auto_attack();
        let lethal = self.enemy_phase();
        self.update_visibility();
        if self.check_enemy_death(lethal) {
            return MoveOutcome::Moved;
        }

        if self.message.is_empty() && self.dungeon.is_valid_position(self.hazard.position) {
            let distance = self.player.position.chebyshev_distance(self.hazard.position);
            if (1..=2).contains(&distance) {
                self.message = Message::normal(HAZARD_WARNING);
            }
        }

        MoveOutcome::Moved
    }

    fn living_enemy_at(&self, pos: Position) -> Option<usize> {
        self.enemies
            .iter()
            .position(|enemy| enemy.is_alive() && enemy.position == pos)
    }

    /// Hits an enemy with the player's damage. Returns true if it died.
    fn strike(&mut self, index: usize) -> bool {
        let damage = self.player.damage;
        let enemy = &mut self.enemies[index];
        enemy.take_damage(damage);
        if enemy.is_alive() {
            return false;
        }

        let kind = enemy.enemy_kind();
        let position = enemy.position;
        self.statistics.enemies_killed += 1;
        if let Some(kind) = kind {
            debug!("Player killed a {} at {:?}", kind, position);
            self.message = Message::normal(kind.profile().kill_message);
        }
        true
    }

    fn player_auto_attack(&mut self) {
        for index in 0..self.enemies.len() {
            let enemy = &self.enemies[index];
            if enemy.is_alive() && self.player.is_adjacent(enemy) {
                self.strike(index);
            }
        }
    }

    /// Enemy movement followed by enemy attacks.
    ///
    /// Returns the kind of the enemy that landed the killing blow, if any.
    fn enemy_phase(&mut self) -> Option<EnemyKind> {
        self.move_enemies();
        self.enemy_attacks()
    }

    fn move_enemies(&mut self) {
        let target = self.player.position;

        for index in 0..self.enemies.len() {
            if !self.enemies[index].is_alive() {
                continue;
            }

            let from = self.enemies[index].position;
            if !has_line_of_sight(&self.dungeon, from, target) {
                continue;
            }

            let dx = (target.x - from.x).signum();
            let dy = (target.y - from.y).signum();

            // Diagonal first, then each axis on its own
            let mut steps = vec![from + Position::new(dx, dy)];
            if dx != 0 {
                steps.push(from + Position::new(dx, 0));
            }
            if dy != 0 {
                steps.push(from + Position::new(0, dy));
            }

            if let Some(next) = steps.into_iter().find(|&pos| self.is_free_for(index, pos)) {
                self.enemies[index].position = next;
            }

            let burn = self.config.burn_damage;
            let enemy = &mut self.enemies[index];
            if self.hazard.is_burning(enemy.position) {
                enemy.take_damage(burn);
                trace!("Enemy at {:?} burns for {}", enemy.position, burn);
            }
        }
    }

    /// A tile an enemy may step onto: walkable, not the player, not another living enemy.
    fn is_free_for(&self, index: usize, pos: Position) -> bool {
        self.dungeon.is_walkable(pos)
            && pos != self.player.position
            && !self
                .enemies
                .iter()
                .enumerate()
                .any(|(other, enemy)| other != index && enemy.is_alive() && enemy.position == pos)
    }

    /// Every living adjacent enemy hits the player, in spawn order.
    ///
    /// Stops at the first lethal hit; later enemies do not attack and the killer is the
    /// recorded death cause.
    fn enemy_attacks(&mut self) -> Option<EnemyKind> {
        if self.invulnerable {
            return None;
        }

        for index in 0..self.enemies.len() {
            let enemy = &self.enemies[index];
            if !enemy.is_alive() || !self.player.is_adjacent(enemy) {
                continue;
            }
            let Some(kind) = enemy.enemy_kind() else {
                continue;
            };
            let damage = enemy.damage;

            self.hurt_player(damage);
            self.message = Message::damage(kind.attack_message(damage));
            if !self.player.is_alive() {
                return Some(kind);
            }
        }
        None
    }

    /// Applies damage to the player unless invulnerable.
    fn hurt_player(&mut self, amount: u32) {
        if self.invulnerable {
            return;
        }
        let before = self.player.hp;
        self.player.take_damage(amount);
        self.statistics.damage_taken += u64::from(before - self.player.hp);
    }

    fn pick_up_potion(&mut self) {
        let here = self.player.position;
        let Some(index) = self.potions.iter().position(|potion| potion.position == here) else {
            return;
        };

        self.potions.remove(index);
        let heal = self.config.potion_heal;
        self.player.heal(heal);
        self.statistics.potions_drunk += 1;
        self.message = Message::normal(format!("You drink a health potion! (+{} HP)", heal));
    }

    fn step_on_hazard(&mut self) {
        if self.hazard.trigger(&self.dungeon, &mut self.rng) {
            info!(
                "Hazard triggered at {:?} on level {}",
                self.hazard.position, self.level
            );
            self.hurt_player(self.config.trap_damage);
            self.message = Message::normal(HAZARD_TRIGGERED);
        } else if self.invulnerable {
            self.message = Message::normal(HAZARD_SHIELDED);
        } else {
            let burn = self.config.burn_damage;
            self.hurt_player(burn);
            self.message = Message::damage(format!("- {} HP damage", burn));
        }
    }

    fn take_door(&mut self) -> MoveOutcome {
        if self.level >= self.config.max_level {
            self.completion_state = CompletionState::Victory;
            self.message = Message::normal(ESCAPE);
            info!(
                "Player escaped on level {} with {} kills",
                self.level, self.statistics.enemies_killed
            );
            return MoveOutcome::Escaped;
        }

        info!(
            "Descending to level {} ({} tiles explored)",
            self.level + 1,
            self.fov.explored_count()
        );
        self.level += 1;
        self.generate_level();
        self.message = Message::normal(DESCEND);
        MoveOutcome::Descended
    }

    /// Ends the game if the enemy phase killed the player. Returns true if it did.
    fn check_enemy_death(&mut self, lethal: Option<EnemyKind>) -> bool {
        if self.player.is_alive() {
            return false;
        }
        match lethal {
            Some(kind) => self.finish_dead(DeathCause::Enemy(kind), ENEMY_DEATH),
            None => {
                self.completion_state = CompletionState::PlayerDied;
                self.message = Message::normal(ENEMY_DEATH);
            }
        }
        true
    }

    fn finish_dead(&mut self, cause: DeathCause, message: &str) {
        self.completion_state = CompletionState::PlayerDied;
        self.death_cause = Some(cause);
        self.message = Message::normal(message);
        info!("Player died on level {}: {:?}", self.level, cause);
    }

    fn update_visibility(&mut self) {
        self.fov
            .compute(&self.dungeon, self.player.position, self.config.vision_radius);
    }

    /// Feeds one key to the cheat-code detector.
    ///
    /// The last ten keys are kept; when they spell the code the player becomes
    /// invulnerable for the rest of the session.
    pub fn register_key(&mut self, key: CheatKey) {
        if self.key_history.len() == CHEAT_SEQUENCE.len() {
            self.key_history.pop_front();
        }
        self.key_history.push_back(key);

        if !self.invulnerable && self.key_history.iter().eq(CHEAT_SEQUENCE.iter()) {
            self.invulnerable = true;
            self.message = Message::normal(CHEAT_ACTIVATED);
            info!("Cheat code entered, player is invulnerable");
        }
    }

    /// Stores a new view size. Only the next generated level uses it.
    pub fn resize(&mut self, view_width: i32, view_height: i32) {
        self.view_width = view_width;
        self.view_height = view_height;
    }

    pub fn player(&self) -> &Entity {
        &self.player
    }

    /// Mutable access to the player, for scripted scenarios.
    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Entity] {
        &self.enemies
    }

    pub fn potions(&self) -> &[Entity] {
        &self.potions
    }

    pub fn dungeon(&self) -> &Dungeon {
        &self.dungeon
    }

    pub fn field_of_view(&self) -> &FieldOfView {
        &self.fov
    }

    pub fn door(&self) -> Position {
        self.door
    }

    pub fn hazard(&self) -> &HazardTrap {
        &self.hazard
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn max_level(&self) -> u32 {
        self.config.max_level
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    pub fn completion_state(&self) -> CompletionState {
        self.completion_state
    }

    pub fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable
    }

    /// True once the player has died or escaped.
    pub fn is_finished(&self) -> bool {
        self.completion_state != CompletionState::Playing
    }

    /// Source file drawn under the current dungeon, if any.
    pub fn background(&self) -> Option<&SourceFile> {
        self.dungeon
            .background
            .and_then(|index| self.backgrounds.get(index))
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Number of random values drawn so far this session.
    pub fn rng_draws(&self) -> u64 {
        self.rng.draws()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn view_size(&self) -> (i32, i32) {
        (self.view_width, self.view_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_layout() -> LevelLayout {
        LevelLayout::new(Dungeon::open_floor(40, 20), Position::new(10, 10))
    }

    fn state_from(layout: LevelLayout) -> GameState {
        GameState::from_layout(layout, 7, SessionConfig::default())
    }

    #[test]
    fn test_new_session() {
        let state = GameState::new(Vec::new(), 12345, 80, 43);
        assert_eq!(state.level(), 1);
        assert_eq!(state.max_level(), 5);
        assert_eq!(state.dungeon().width, 80);
        assert_eq!(state.dungeon().height, 40);
        assert_eq!(state.enemies().len(), 5);
        assert!((3..=4).contains(&state.potions().len()));
        assert_eq!(state.player().position, state.dungeon().rooms[0].center());
        assert!(state.message().is_empty());
        assert!(state.background().is_none());
        assert!(state.field_of_view().is_visible(state.player().position));
    }

    #[test]
    fn test_spawns_avoid_player_door_and_trap() {
        for seed in 0..10 {
            let state = GameState::new(Vec::new(), seed, 80, 43);
            let player = state.player().position;
            let door = state.door();
            let trap = state.hazard().position;
            assert_ne!(trap, player);
            assert_ne!(trap, door);
            for entity in state.enemies().iter().chain(state.potions()) {
                assert!(state.dungeon().is_walkable(entity.position));
                assert_ne!(entity.position, player);
                assert_ne!(entity.position, door);
                assert_ne!(entity.position, trap);
            }
        }
    }

    #[test]
    fn test_rejected_move_changes_nothing() {
        let mut dungeon = Dungeon::open_floor(40, 20);
        dungeon.set_tile(Position::new(11, 10), Tile::Wall);
        let layout = LevelLayout::new(dungeon, Position::new(10, 10))
            .with_enemy(EnemyKind::ScopeCreep, Position::new(14, 10))
            .with_potion(Position::new(8, 12))
            .with_hazard(Position::new(10, 13));
        let mut state = state_from(layout);
        state.message = Message::normal("keep me");

        let draws = state.rng_draws();
        let enemies = state.enemies().to_vec();
        let potions = state.potions().to_vec();
        let fov = state.field_of_view().clone();
        let statistics = state.statistics().clone();
        let hazard = state.hazard().clone();

        assert_eq!(state.move_player(1, 0), MoveOutcome::Rejected);
        assert_eq!(state.move_player(-11, 0), MoveOutcome::Rejected);

        assert_eq!(state.player().position, Position::new(10, 10));
        assert_eq!(state.player().hp, state.player().max_hp);
        assert_eq!(state.message().text(), "keep me");
        assert_eq!(state.rng_draws(), draws);
        assert_eq!(state.enemies(), enemies.as_slice());
        assert_eq!(state.potions(), potions.as_slice());
        assert_eq!(state.field_of_view(), &fov);
        assert_eq!(state.statistics(), &statistics);
        assert_eq!(state.hazard(), &hazard);
    }

    #[test]
    fn test_first_lethal_hit_is_the_death_cause() {
        let layout = open_layout()
            .with_enemy(EnemyKind::Bug, Position::new(12, 13))
            .with_enemy(EnemyKind::ScopeCreep, Position::new(8, 13));
        let mut state = state_from(layout);
        state.player.hp = 1;

        assert_eq!(state.move_player(0, 1), MoveOutcome::Moved);
        assert_eq!(state.enemies()[0].position, Position::new(11, 12));
        assert_eq!(state.enemies()[1].position, Position::new(9, 12));
        assert_eq!(state.completion_state(), CompletionState::PlayerDied);
        assert_eq!(state.death_cause(), Some(DeathCause::Enemy(EnemyKind::Bug)));
        assert_eq!(state.statistics().damage_taken, 1);
    }

    #[test]
    fn test_move_counts_and_clears_message() {
        let mut state = state_from(open_layout());
        state.message = Message::normal("old news");
        assert_eq!(state.move_player(0, 1), MoveOutcome::Moved);
        assert_eq!(state.statistics().moves, 1);
        assert!(state.message().is_empty());
    }

    #[test]
    fn test_bump_attack_does_not_move() {
        let layout = open_layout().with_enemy(EnemyKind::ScopeCreep, Position::new(11, 10));
        let mut state = state_from(layout);

        assert_eq!(state.move_player(1, 0), MoveOutcome::Attacked);
        assert_eq!(state.player().position, Position::new(10, 10));
        assert_eq!(state.statistics().moves, 0);
        assert_eq!(state.enemies()[0].hp, 1);
        // The creep survives and hits back
        assert_eq!(state.player().hp, 18);
        assert_eq!(state.message().text(), "A scope creep attacked - 2 HP damage");
        assert_eq!(state.message().tone(), MessageTone::Damage);
    }

    #[test]
    fn test_bump_kill_sets_kill_message() {
        let layout = open_layout().with_enemy(EnemyKind::Bug, Position::new(11, 10));
        let mut state = state_from(layout);

        assert_eq!(state.move_player(1, 0), MoveOutcome::Attacked);
        assert!(!state.enemies()[0].is_alive());
        assert_eq!(state.statistics().enemies_killed, 1);
        assert_eq!(state.message().text(), "You squashed a bug!");
    }

    #[test]
    fn test_auto_attack_after_move() {
        let layout = open_layout().with_enemy(EnemyKind::Bug, Position::new(12, 11));
        let mut state = state_from(layout);

        assert_eq!(state.move_player(1, 0), MoveOutcome::Moved);
        assert!(!state.enemies()[0].is_alive());
        assert_eq!(state.player().hp, 20);
        assert_eq!(state.message().text(), "You squashed a bug!");
    }

    #[test]
    fn test_enemy_chases_diagonally() {
        let layout = open_layout().with_enemy(EnemyKind::ScopeCreep, Position::new(16, 14));
        let mut state = state_from(layout);

        state.move_player(-1, 0);
        assert_eq!(state.enemies()[0].position, Position::new(15, 13));
    }

    #[test]
    fn test_enemy_without_line_of_sight_stays() {
        let mut dungeon = Dungeon::open_floor(40, 20);
        for y in 0..20 {
            dungeon.set_tile(Position::new(20, y), Tile::Wall);
        }
        let layout = LevelLayout::new(dungeon, Position::new(10, 10))
            .with_enemy(EnemyKind::Bug, Position::new(25, 10));
        let mut state = state_from(layout);

        state.move_player(1, 0);
        assert_eq!(state.enemies()[0].position, Position::new(25, 10));
    }

    #[test]
    fn test_enemies_do_not_stack() {
        let layout = open_layout()
            .with_enemy(EnemyKind::ScopeCreep, Position::new(16, 10))
            .with_enemy(EnemyKind::ScopeCreep, Position::new(17, 10));
        let mut state = state_from(layout);

        state.move_player(0, -1);
        let a = state.enemies()[0].position;
        let b = state.enemies()[1].position;
        assert_ne!(a, b);
    }

    #[test]
    fn test_potion_heals_and_is_removed() {
        let layout = open_layout().with_potion(Position::new(11, 10));
        let mut state = state_from(layout);
        state.player_mut().hp = 19;

        assert_eq!(state.move_player(1, 0), MoveOutcome::Moved);
        assert!(state.potions().is_empty());
        assert_eq!(state.player().hp, 20);
        assert_eq!(state.statistics().potions_drunk, 1);
        assert_eq!(state.message().text(), "You drink a health potion! (+3 HP)");
    }

    #[test]
    fn test_hazard_first_contact_then_burn() {
        let layout = open_layout().with_hazard(Position::new(11, 10));
        let mut state = state_from(layout);

        state.move_player(1, 0);
        assert!(state.hazard().triggered);
        assert_eq!(state.player().hp, 18);
        assert_eq!(state.message().text(), HAZARD_TRIGGERED);
        assert!(state.hazard().is_burning(Position::new(10, 10)));

        state.move_player(-1, 0);
        state.move_player(1, 0);
        assert_eq!(state.player().hp, 17);
        assert_eq!(state.message().text(), "- 1 HP damage");
        assert_eq!(state.message().tone(), MessageTone::Damage);
    }

    #[test]
    fn test_hazard_warning_nearby() {
        let layout = open_layout().with_hazard(Position::new(13, 10));
        let mut state = state_from(layout);

        state.move_player(1, 0);
        assert_eq!(state.message().text(), HAZARD_WARNING);
    }

    #[test]
    fn test_hazard_death() {
        let layout = open_layout().with_hazard(Position::new(11, 10));
        let mut state = state_from(layout);
        state.player_mut().hp = 2;

        state.move_player(1, 0);
        assert_eq!(state.completion_state(), CompletionState::PlayerDied);
        assert_eq!(state.death_cause(), Some(DeathCause::Hazard));
        assert_eq!(state.message().text(), HAZARD_DEATH);
    }

    #[test]
    fn test_burning_tiles_hurt_enemies() {
        let layout = open_layout()
            .with_hazard(Position::new(11, 10))
            .with_enemy(EnemyKind::ScopeCreep, Position::new(13, 12));
        let mut state = state_from(layout);

        // Stepping on the trap sets (12, 11) on fire; the creep walks into it
        state.move_player(1, 0);
        let creep = &state.enemies()[0];
        assert_eq!(creep.position, Position::new(12, 11));
        assert!(creep.hp < 3);
    }

    #[test]
    fn test_cheat_code() {
        let mut state = state_from(open_layout());
        state.register_key(CheatKey::Other);
        for key in CHEAT_SEQUENCE {
            assert!(!state.is_invulnerable());
            state.register_key(key);
        }
        assert!(state.is_invulnerable());
        assert_eq!(state.message().text(), CHEAT_ACTIVATED);
    }

    #[test]
    fn test_wrong_sequence_does_nothing() {
        let mut state = state_from(open_layout());
        for key in CHEAT_SEQUENCE.iter().rev() {
            state.register_key(*key);
        }
        assert!(!state.is_invulnerable());
    }

    #[test]
    fn test_invulnerable_player_takes_no_damage() {
        let config = SessionConfig {
            invulnerable: true,
            ..SessionConfig::default()
        };
        let layout = open_layout()
            .with_hazard(Position::new(11, 10))
            .with_enemy(EnemyKind::ScopeCreep, Position::new(13, 10));
        let mut state = GameState::from_layout(layout, 7, config);

        state.move_player(1, 0);
        state.move_player(0, 1);
        assert_eq!(state.player().hp, 20);
        assert_eq!(state.statistics().damage_taken, 0);
    }

    #[test]
    fn test_config_validation() {
        assert!(SessionConfig::default().validate().is_ok());

        let config = SessionConfig {
            max_level: 0,
            ..SessionConfig::default()
        };
        assert!(matches!(config.validate(), Err(CrawlError::InvalidConfig(_))));
    }

    #[test]
    fn test_config_json_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{"max_level": 2}"#).unwrap();
        assert_eq!(config.max_level, 2);
        assert_eq!(config.vision_radius, 7);
        assert_eq!(config.generation, GenerationConfig::default());
    }

    #[test]
    fn test_resize_applies_to_next_level() {
        let layout = open_layout().with_door(Position::new(11, 10));
        let mut state = state_from(layout);
        state.resize(100, 53);
        assert_eq!(state.dungeon().width, 40);

        assert_eq!(state.move_player(1, 0), MoveOutcome::Descended);
        assert_eq!(state.level(), 2);
        assert_eq!(state.dungeon().width, 100);
        assert_eq!(state.dungeon().height, 50);
        assert_eq!(state.message().text(), DESCEND);
    }
}
