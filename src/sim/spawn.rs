//! Spawn scheduling: enemies, asteroids, bosses and flood mode
//!
//! Everything here is driven by game time (`GameClock::now`) and score.

use std::fmt;

use glam::Vec2;
use rand::Rng;

use super::catalog::{BOSS_THRESHOLDS, BossTier, EnemyArchetype, GemKind, pick_archetype, spawn_tier};
use super::clock::Millis;
use super::events::{Effect, colors};
use super::state::{
    BossState, BurstFire, EnemyState, EntityId, GameState, Group, Hostile, HostileKind, Lifecycle,
};
use crate::consts::*;

/// Bosses that may exist in the boss group at once
pub const BOSS_CAPACITY: usize = 1;
/// Enemy spawn interval once flood mode starts
pub const FLOOD_SPAWN_INTERVAL_MS: Millis = 10.0;
/// Flood-mode enemy health doubles this often
pub const FLOOD_DOUBLE_INTERVAL_MS: Millis = 12_000.0;

const SPAWN_RATE_STEP_MS: Millis = 200.0;
const ASTEROID_HP_SCORE_STEP: u64 = 1000;
const ELITE_FIRST_BURST_DELAY_MS: Millis = 2000.0;
const SPAWN_MARGIN_X: i32 = 20;
const BOSS_ENTRY_Y: f32 = -150.0;
const BOSS_ENTRY_SPEED: f32 = 50.0;

/// Recoverable spawn failures; the trigger simply retries next tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnError {
    /// Group still holds an entity awaiting removal
    GroupFull { group: Group, capacity: usize },
    /// All boss tiers already spawned
    NoTierLeft { boss_count: u32 },
}

impl fmt::Display for SpawnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnError::GroupFull { group, capacity } => {
                write!(f, "{:?} group is full (capacity {})", group, capacity)
            }
            SpawnError::NoTierLeft { boss_count } => {
                write!(f, "no boss tier left after {} bosses", boss_count)
            }
        }
    }
}

impl std::error::Error for SpawnError {}

/// Roll an enemy archetype for the current score
pub fn roll_archetype<R: Rng>(rng: &mut R, score: u64) -> EnemyArchetype {
    let roll = rng.random_range(1..=100);
    pick_archetype(spawn_tier(score), roll)
}

/// Time- and score-driven difficulty adjustments
pub fn update_scaling(state: &mut GameState) {
    let now = state.now();
    let mode = state.settings.mode;
    let run = &mut state.run;

    if run.flood_mode && now - run.last_flood_double >= FLOOD_DOUBLE_INTERVAL_MS {
        run.flood_health_multiplier *= 2.0;
        run.last_flood_double = now;
        log::info!(
            "Flood health multiplier now x{}",
            run.flood_health_multiplier
        );
    }

    if !run.flood_mode && now - run.last_spawn_increase >= mode.spawn_increase_interval_ms() {
        run.enemy_spawn_interval =
            (run.enemy_spawn_interval - SPAWN_RATE_STEP_MS).max(mode.min_spawn_interval_ms());
        run.last_spawn_increase = now;
        log::debug!("Enemy spawn interval eased to {}ms", run.enemy_spawn_interval);
        state.emit(Effect::text("Enemy Spawn Rate +", colors::ORANGE));
    }

    let run = &mut state.run;
    if run.score >= run.last_asteroid_hp_increase + ASTEROID_HP_SCORE_STEP {
        run.base_asteroid_hp += 1.0;
        run.last_asteroid_hp_increase = run.score;
    }
}

/// Spawn whatever is due this tick
pub fn update_spawns(state: &mut GameState) {
    let now = state.now();

    if now > state.run.last_enemy_spawn + state.run.enemy_spawn_interval {
        spawn_enemy(state);
        state.run.last_enemy_spawn = now;
    }

    if now > state.run.last_asteroid_spawn + state.run.asteroid_spawn_interval {
        spawn_asteroid(state);
        state.run.last_asteroid_spawn = now;
    }

    if boss_due(state) {
        if let Err(err) = spawn_boss(state) {
            log::warn!("Boss spawn failed, retrying next tick: {}", err);
        }
    }
}

/// Score crossed the next threshold and no boss is alive
pub fn boss_due(state: &GameState) -> bool {
    let Some(&threshold) = BOSS_THRESHOLDS.get(state.run.boss_count as usize) else {
        return false;
    };
    state.run.score >= threshold && state.active_boss_count() == 0
}

pub fn spawn_enemy(state: &mut GameState) -> EntityId {
    let archetype = roll_archetype(&mut state.rng, state.run.score);
    let stats = archetype.stats();
    let width = state.width();
    let now = state.now();

    let x = state.rng.random_range(SPAWN_MARGIN_X..=width as i32 - SPAWN_MARGIN_X) as f32;
    let y = if stats.elite { -40.0 } else { -20.0 };

    let mut health = archetype.health_for(state.settings.mode);
    if state.run.flood_mode {
        health *= state.run.flood_health_multiplier;
    }

    let vel = if stats.elite {
        let toward = if state.player.pos.x > x { 1.0 } else { -1.0 };
        Vec2::new(
            toward * state.rng.random_range(30..=50) as f32,
            state.rng.random_range(100..=150) as f32,
        )
    } else {
        let vy = state.rng.random_range(80..=120) as f32;
        Vec2::new(state.rng.random_range(-20..=20) as f32, vy)
    };

    let id = state.next_entity_id();
    state.enemies.push(Hostile {
        id,
        kind: HostileKind::Enemy(EnemyState {
            archetype,
            elite: stats.elite,
            pulsing: stats.pulsing,
            bullet_damage: stats.bullet_damage,
            shots_per_burst: stats.shots_per_burst,
            burst: BurstFire {
                next_burst_at: now + ELITE_FIRST_BURST_DELAY_MS,
                ..BurstFire::default()
            },
        }),
        pos: Vec2::new(x, y),
        vel,
        radius: stats.radius,
        health,
        max_health: health,
        score_value: stats.score,
        gem: stats.gem,
        gem_xp: Some(stats.gem_xp),
        lifecycle: Lifecycle::Alive,
    });
    log::debug!("Spawned {:?} (hp {})", archetype, health);
    id
}

pub fn spawn_asteroid(state: &mut GameState) -> EntityId {
    let width = state.width();
    let x = state.rng.random_range(SPAWN_MARGIN_X..=width as i32 - SPAWN_MARGIN_X) as f32;
    let vy = state.rng.random_range(50..=100) as f32;
    let vx = state.rng.random_range(-20..=20) as f32;
    let health = state.run.base_asteroid_hp;

    let id = state.next_entity_id();
    state.asteroids.push(Hostile {
        id,
        kind: HostileKind::Asteroid,
        pos: Vec2::new(x, -20.0),
        vel: Vec2::new(vx, vy),
        radius: ASTEROID_RADIUS,
        health,
        max_health: health,
        score_value: 5,
        gem: GemKind::Small,
        gem_xp: None,
        lifecycle: Lifecycle::Alive,
    });
    id
}

/// Create the next boss tier. `boss_count` only advances on success.
pub fn spawn_boss(state: &mut GameState) -> Result<EntityId, SpawnError> {
    let tier = BossTier::from_index(state.run.boss_count).ok_or(SpawnError::NoTierLeft {
        boss_count: state.run.boss_count,
    })?;
    if state.bosses.len() >= BOSS_CAPACITY {
        return Err(SpawnError::GroupFull {
            group: Group::Bosses,
            capacity: BOSS_CAPACITY,
        });
    }

    let stats = tier.stats(state.settings.mode);
    let id = state.next_entity_id();
    state.bosses.push(Hostile {
        id,
        kind: HostileKind::Boss(BossState {
            tier,
            pulsing: stats.pulsing,
            last_shot_at: None,
            sway_ms: 0.0,
        }),
        pos: Vec2::new(state.width() / 2.0, BOSS_ENTRY_Y),
        vel: Vec2::new(0.0, BOSS_ENTRY_SPEED),
        radius: BOSS_RADIUS,
        health: stats.health,
        max_health: stats.health,
        score_value: stats.score,
        gem: GemKind::Large,
        gem_xp: None,
        lifecycle: Lifecycle::Alive,
    });
    state.run.boss_count += 1;

    log::info!(
        "Boss {} spawned at score {} (hp {})",
        tier.number(),
        state.run.score,
        stats.health
    );
    state.emit(Effect::BossSpawned { tier });
    Ok(id)
}

/// Enter flood mode once the final boss is down (irreversible)
pub fn check_flood_mode(state: &mut GameState) {
    if state.run.flood_mode || state.run.boss_count < BOSS_THRESHOLDS.len() as u32 {
        return;
    }
    let now = state.now();
    let run = &mut state.run;
    run.flood_mode = true;
    run.flood_started_at = now;
    run.last_flood_double = now;
    run.enemy_spawn_interval = FLOOD_SPAWN_INTERVAL_MS;
    log::info!("Flood mode started at {:.0}ms", now);
    state.emit(Effect::FloodModeStarted);
}
