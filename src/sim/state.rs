//! Game state and core simulation types
//!
//! `GameState` owns every entity collection plus the `RunState` singleton.
//! Subsystems receive it by `&mut` reference; nothing holds ambient state.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::beam::Laser;
use super::catalog::{BossTier, EnemyArchetype, GemKind, UpgradeKind};
use super::clock::{GameClock, Millis, TimerQueue};
use super::combat::ChainLightning;
use super::events::Effect;
use super::progression::UpgradeOffer;
use crate::consts::*;
use crate::settings::RunSettings;

/// Stable entity identifier (never reused within a run)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Destruction guard. Handlers act only on `Alive` entities, so a second
/// kill in the same tick is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Lifecycle {
    #[default]
    Alive,
    /// Destruction side effects in progress
    Dying,
    /// Awaiting the end-of-tick purge
    Removed,
}

impl Lifecycle {
    #[inline]
    pub fn is_alive(&self) -> bool {
        *self == Lifecycle::Alive
    }
}

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Explicit pause (toggle key)
    Paused,
    /// Waiting for an upgrade card to be picked
    LevelUp,
    GameOver,
}

/// Collections of damageable hostiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Group {
    Enemies,
    Asteroids,
    Bosses,
}

/// Handle to a hostile in one of the groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostileRef {
    pub group: Group,
    pub id: EntityId,
}

/// Elite burst-fire bookkeeping
#[derive(Debug, Clone, Default)]
pub struct BurstFire {
    pub firing: bool,
    pub shots_fired: u32,
    /// Next time a new burst may start
    pub next_burst_at: Millis,
    /// Next shot within the current burst
    pub next_shot_at: Millis,
}

#[derive(Debug, Clone)]
pub struct EnemyState {
    pub archetype: EnemyArchetype,
    pub elite: bool,
    pub pulsing: bool,
    pub bullet_damage: f32,
    pub shots_per_burst: u32,
    pub burst: BurstFire,
}

#[derive(Debug, Clone)]
pub struct BossState {
    pub tier: BossTier,
    pub pulsing: bool,
    pub last_shot_at: Option<Millis>,
    /// Accumulated movement time driving the side-to-side sway
    pub sway_ms: f64,
}

#[derive(Debug, Clone)]
pub enum HostileKind {
    Enemy(EnemyState),
    Asteroid,
    Boss(BossState),
}

/// Enemy, asteroid or boss
#[derive(Debug, Clone)]
pub struct Hostile {
    pub id: EntityId,
    pub kind: HostileKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub score_value: u64,
    pub gem: GemKind,
    /// XP carried by the dropped gem (`None` = gem default)
    pub gem_xp: Option<u32>,
    pub lifecycle: Lifecycle,
}

impl Hostile {
    pub fn group(&self) -> Group {
        match self.kind {
            HostileKind::Enemy(_) => Group::Enemies,
            HostileKind::Asteroid => Group::Asteroids,
            HostileKind::Boss(_) => Group::Bosses,
        }
    }

    pub fn handle(&self) -> HostileRef {
        HostileRef {
            group: self.group(),
            id: self.id,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifecycle.is_alive()
    }

    /// Subtract damage; true if this hit leaves the hostile at or below zero
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        self.health -= amount;
        self.health <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExplosivePayload {
    pub radius: f32,
    pub damage: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightningPayload {
    pub jumps: u32,
    pub range: f32,
}

/// Sine sway applied to a hostile bullet's x position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveMotion {
    pub start_x: f32,
    pub phase: f32,
}

/// Pooled projectile. Payload values are snapshotted at creation.
#[derive(Debug, Clone, Default)]
pub struct Bullet {
    pub active: bool,
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: f32,
    /// Remaining targets this bullet may pass through
    pub pierce: u32,
    pub explosive: Option<ExplosivePayload>,
    pub lightning: Option<LightningPayload>,
    pub max_range: Option<f32>,
    pub spawn_y: f32,
    /// Targets already damaged by this bullet
    pub hits: Vec<HostileRef>,
    pub wave: Option<WaveMotion>,
}

/// Fixed-capacity bullet pool; bullets are recycled, never freed
#[derive(Debug, Clone)]
pub struct BulletPool {
    slots: Vec<Bullet>,
    capacity: usize,
}

impl BulletPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Reset and hand out a free slot; `None` when all slots are in flight
    pub fn acquire(&mut self) -> Option<(usize, &mut Bullet)> {
        let slot = match self.slots.iter().position(|b| !b.active) {
            Some(i) => i,
            None if self.slots.len() < self.capacity => {
                self.slots.push(Bullet::default());
                self.slots.len() - 1
            }
            None => return None,
        };
        let bullet = &mut self.slots[slot];
        *bullet = Bullet {
            active: true,
            hits: std::mem::take(&mut bullet.hits),
            ..Bullet::default()
        };
        bullet.hits.clear();
        Some((slot, bullet))
    }

    pub fn release(&mut self, slot: usize) {
        if let Some(bullet) = self.slots.get_mut(slot) {
            bullet.active = false;
        }
    }

    pub fn get(&self, slot: usize) -> Option<&Bullet> {
        self.slots.get(slot).filter(|b| b.active)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut Bullet> {
        self.slots.get_mut(slot).filter(|b| b.active)
    }

    /// Active bullets with their slot index
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Bullet)> {
        self.slots.iter().enumerate().filter(|(_, b)| b.active)
    }

    pub fn iter_active_mut(&mut self) -> impl Iterator<Item = (usize, &mut Bullet)> {
        self.slots.iter_mut().enumerate().filter(|(_, b)| b.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|b| b.active).count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Pull toward the player once inside the magnet radius
#[derive(Debug, Clone, Copy)]
pub struct Magnetism {
    pub magnetized: bool,
    pub speed: f32,
}

impl Default for Magnetism {
    fn default() -> Self {
        Self {
            magnetized: false,
            speed: 400.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Gem {
    pub id: EntityId,
    pub kind: GemKind,
    pub xp: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub magnet: Magnetism,
    pub lifecycle: Lifecycle,
}

/// Temporary power-ups and the health pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerupKind {
    Shield,
    RapidFire,
    MultiShot,
    Lasers,
    Health,
}

#[derive(Debug, Clone)]
pub struct Pickup {
    pub id: EntityId,
    pub kind: PowerupKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub magnet: Magnetism,
    pub lifecycle: Lifecycle,
}

#[derive(Debug, Clone)]
pub struct Drone {
    pub orbit_angle: f32,
    pub pos: Vec2,
    pub next_shot_at: Millis,
}

/// Mirror ship that copies the player's shots
#[derive(Debug, Clone)]
pub struct CloneShip {
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    /// Render scale (giant mode)
    pub scale: f32,
    pub speed: f32,
    /// Post-hit flashing window end
    pub invincible_until: Millis,
    pub alive: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius: PLAYER_RADIUS,
            scale: 1.0,
            speed: 300.0,
            invincible_until: 0.0,
            alive: true,
        }
    }

    pub fn is_invincible(&self, now: Millis) -> bool {
        now < self.invincible_until
    }
}

/// Upgrade levels plus acquisition order
#[derive(Debug, Clone, Default)]
pub struct UpgradeState {
    levels: [u32; UpgradeKind::COUNT],
    /// First-acquisition order
    acquired: Vec<UpgradeKind>,
    /// Hard-mode slots consumed by distinct upgrades
    pub slots_used: u32,
}

impl UpgradeState {
    pub fn level(&self, kind: UpgradeKind) -> u32 {
        self.levels[kind.index()]
    }

    pub fn has(&self, kind: UpgradeKind) -> bool {
        self.level(kind) > 0
    }

    pub fn is_maxed(&self, kind: UpgradeKind) -> bool {
        self.level(kind) >= kind.def().max_level
    }

    /// Prerequisite (if any) is owned
    pub fn prerequisite_met(&self, kind: UpgradeKind) -> bool {
        kind.def().requires.is_none_or(|req| self.has(req))
    }

    pub fn is_acquired(&self, kind: UpgradeKind) -> bool {
        self.acquired.contains(&kind)
    }

    pub fn acquired(&self) -> &[UpgradeKind] {
        &self.acquired
    }

    /// Raise a level by one, capped at the catalog maximum.
    /// Returns the new level, or `None` if already maxed.
    pub fn increment(&mut self, kind: UpgradeKind) -> Option<u32> {
        if self.is_maxed(kind) {
            return None;
        }
        self.levels[kind.index()] += 1;
        if !self.is_acquired(kind) {
            self.acquired.push(kind);
        }
        Some(self.level(kind))
    }
}

/// Expiry times for temporary power-ups
#[derive(Debug, Clone, Default)]
pub struct PowerupTimers {
    pub rapid_fire_until: Option<Millis>,
    pub multi_shot_until: Option<Millis>,
    pub lasers_until: Option<Millis>,
}

impl PowerupTimers {
    pub fn rapid_fire(&self) -> bool {
        self.rapid_fire_until.is_some()
    }

    pub fn multi_shot(&self) -> bool {
        self.multi_shot_until.is_some()
    }

    pub fn lasers(&self) -> bool {
        self.lasers_until.is_some()
    }
}

/// Per-run scalars
#[derive(Debug, Clone)]
pub struct RunState {
    pub score: u64,
    /// Hostiles destroyed (any cause that awards score)
    pub kills: u32,
    pub health: f32,
    pub max_health: f32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    pub player_level: u32,
    /// Bosses spawned so far (0-3)
    pub boss_count: u32,
    pub god_mode: bool,

    pub flood_mode: bool,
    pub flood_started_at: Millis,
    pub flood_health_multiplier: f32,
    pub last_flood_double: Millis,

    pub shield_stacks: u32,
    pub max_shield_stacks: u32,
    pub last_shield_hit: Option<Millis>,
    pub last_shield_regen: Millis,
    pub last_vampiric_heal: Option<Millis>,
    pub nuke_ready_at: Millis,

    pub enemy_spawn_interval: Millis,
    pub asteroid_spawn_interval: Millis,
    pub base_asteroid_hp: f32,
    pub last_spawn_increase: Millis,
    pub last_asteroid_hp_increase: u64,
    pub last_enemy_spawn: Millis,
    pub last_asteroid_spawn: Millis,

    pub last_shot: Option<Millis>,
    pub last_rear_shot: Millis,
    pub last_side_shot: Millis,
    pub last_garlic_pulse: Millis,
    pub lasers_last_fire: Millis,
    pub powerups: PowerupTimers,
}

impl RunState {
    pub fn new(god_mode: bool) -> Self {
        Self {
            score: 0,
            kills: 0,
            health: PLAYER_START_HEALTH,
            max_health: PLAYER_START_HEALTH,
            xp: 0,
            xp_to_next_level: 100,
            player_level: 1,
            boss_count: 0,
            god_mode,
            flood_mode: false,
            flood_started_at: 0.0,
            flood_health_multiplier: 1.0,
            last_flood_double: 0.0,
            shield_stacks: 1,
            max_shield_stacks: 1,
            last_shield_hit: None,
            last_shield_regen: 0.0,
            last_vampiric_heal: None,
            nuke_ready_at: 0.0,
            enemy_spawn_interval: 2000.0,
            asteroid_spawn_interval: 1500.0,
            base_asteroid_hp: 2.0,
            last_spawn_increase: 0.0,
            last_asteroid_hp_increase: 0,
            last_enemy_spawn: 0.0,
            last_asteroid_spawn: 0.0,
            last_shot: None,
            last_rear_shot: 0.0,
            last_side_shot: 0.0,
            last_garlic_pulse: 0.0,
            lasers_last_fire: 0.0,
            powerups: PowerupTimers::default(),
        }
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health <= 0.0 {
            0.0
        } else {
            self.health / self.max_health
        }
    }

    pub fn heal(&mut self, amount: f32) {
        self.health = (self.health + amount).min(self.max_health);
    }
}

/// Delayed effects drained from the timer queue
#[derive(Debug, Clone)]
pub enum TimedEffect {
    ChainJump(ChainLightning),
    PowerupExpired(PowerupKind),
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub settings: RunSettings,
    pub rng: Pcg32,
    pub clock: GameClock,
    pub phase: GamePhase,
    pub run: RunState,
    pub upgrades: UpgradeState,
    pub player: Player,
    pub enemies: Vec<Hostile>,
    pub asteroids: Vec<Hostile>,
    pub bosses: Vec<Hostile>,
    pub bullets: BulletPool,
    pub enemy_bullets: BulletPool,
    pub lasers: Vec<Laser>,
    pub gems: Vec<Gem>,
    pub pickups: Vec<Pickup>,
    pub drones: Vec<Drone>,
    pub clones: Vec<CloneShip>,
    pub timers: TimerQueue<TimedEffect>,
    /// Upgrade cards awaiting a pick (only in `GamePhase::LevelUp`)
    pub pending_offer: Option<UpgradeOffer>,
    /// Effects emitted since the last drain
    pub effects: Vec<Effect>,
    next_id: u32,
}

impl GameState {
    pub fn new(settings: RunSettings) -> Self {
        let player_start = Vec2::new(
            settings.arena_width / 2.0,
            settings.arena_height - PLAYER_START_OFFSET_Y,
        );
        log::info!(
            "New run: mode={} weapon={} seed={}",
            settings.mode.as_str(),
            settings.weapon.def().name,
            settings.seed
        );
        Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            clock: GameClock::new(),
            phase: GamePhase::Playing,
            run: RunState::new(settings.god_mode),
            upgrades: UpgradeState::default(),
            player: Player::new(player_start),
            enemies: Vec::new(),
            asteroids: Vec::new(),
            bosses: Vec::new(),
            bullets: BulletPool::new(BULLET_POOL_CAPACITY),
            enemy_bullets: BulletPool::new(BULLET_POOL_CAPACITY),
            lasers: Vec::new(),
            gems: Vec::new(),
            pickups: Vec::new(),
            drones: Vec::new(),
            clones: Vec::new(),
            timers: TimerQueue::new(),
            pending_offer: None,
            effects: Vec::new(),
            next_id: 1,
            settings,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        EntityId(id)
    }

    #[inline]
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.settings.arena_width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.settings.arena_height
    }

    pub fn emit(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    /// Take all effects emitted since the last call
    pub fn drain_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    pub fn group(&self, group: Group) -> &Vec<Hostile> {
        match group {
            Group::Enemies => &self.enemies,
            Group::Asteroids => &self.asteroids,
            Group::Bosses => &self.bosses,
        }
    }

    pub fn group_mut(&mut self, group: Group) -> &mut Vec<Hostile> {
        match group {
            Group::Enemies => &mut self.enemies,
            Group::Asteroids => &mut self.asteroids,
            Group::Bosses => &mut self.bosses,
        }
    }

    pub fn hostile(&self, handle: HostileRef) -> Option<&Hostile> {
        self.group(handle.group).iter().find(|h| h.id == handle.id)
    }

    pub fn hostile_mut(&mut self, handle: HostileRef) -> Option<&mut Hostile> {
        self.group_mut(handle.group)
            .iter_mut()
            .find(|h| h.id == handle.id)
    }

    /// Handles of every live hostile in a group (snapshot, safe to mutate after)
    pub fn live_handles(&self, group: Group) -> Vec<HostileRef> {
        self.group(group)
            .iter()
            .filter(|h| h.is_alive())
            .map(Hostile::handle)
            .collect()
    }

    pub fn active_boss_count(&self) -> usize {
        self.bosses.iter().filter(|b| b.is_alive()).count()
    }

    /// Drop entities whose destruction finished this tick
    pub fn purge_removed(&mut self) {
        self.enemies.retain(|h| h.lifecycle != Lifecycle::Removed);
        self.asteroids.retain(|h| h.lifecycle != Lifecycle::Removed);
        self.bosses.retain(|h| h.lifecycle != Lifecycle::Removed);
        self.gems.retain(|g| g.lifecycle != Lifecycle::Removed);
        self.pickups.retain(|p| p.lifecycle != Lifecycle::Removed);
        self.lasers.retain(|l| l.active);
    }

    /// Ensure collections are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.enemies.sort_by_key(|h| h.id);
        self.asteroids.sort_by_key(|h| h.id);
        self.bosses.sort_by_key(|h| h.id);
        self.gems.sort_by_key(|g| g.id);
        self.pickups.sort_by_key(|p| p.id);
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Builders shared by the simulation tests

    use super::*;
    use crate::settings::GameMode;

    pub fn state() -> GameState {
        GameState::new(RunSettings::default())
    }

    pub fn hard_state() -> GameState {
        GameState::new(RunSettings::for_mode(GameMode::Hard))
    }

    pub fn add_enemy(state: &mut GameState, pos: Vec2, health: f32) -> HostileRef {
        let archetype = EnemyArchetype::LightRed;
        let stats = archetype.stats();
        let id = state.next_entity_id();
        state.enemies.push(Hostile {
            id,
            kind: HostileKind::Enemy(EnemyState {
                archetype,
                elite: false,
                pulsing: false,
                bullet_damage: stats.bullet_damage,
                shots_per_burst: stats.shots_per_burst,
                burst: BurstFire::default(),
            }),
            pos,
            vel: Vec2::ZERO,
            radius: stats.radius,
            health,
            max_health: health,
            score_value: stats.score,
            gem: stats.gem,
            gem_xp: Some(stats.gem_xp),
            lifecycle: Lifecycle::Alive,
        });
        HostileRef { group: Group::Enemies, id }
    }

    pub fn add_asteroid(state: &mut GameState, pos: Vec2, health: f32) -> HostileRef {
        let id = state.next_entity_id();
        state.asteroids.push(Hostile {
            id,
            kind: HostileKind::Asteroid,
            pos,
            vel: Vec2::ZERO,
            radius: ASTEROID_RADIUS,
            health,
            max_health: health,
            score_value: 5,
            gem: GemKind::Small,
            gem_xp: None,
            lifecycle: Lifecycle::Alive,
        });
        HostileRef { group: Group::Asteroids, id }
    }

    pub fn add_boss(state: &mut GameState, tier: BossTier, pos: Vec2, health: f32) -> HostileRef {
        let id = state.next_entity_id();
        state.bosses.push(Hostile {
            id,
            kind: HostileKind::Boss(BossState {
                tier,
                pulsing: false,
                last_shot_at: None,
                sway_ms: 0.0,
            }),
            pos,
            vel: Vec2::ZERO,
            radius: BOSS_RADIUS,
            health,
            max_health: health,
            score_value: tier.stats(state.settings.mode).score,
            gem: GemKind::Large,
            gem_xp: None,
            lifecycle: Lifecycle::Alive,
        });
        HostileRef { group: Group::Bosses, id }
    }
}
