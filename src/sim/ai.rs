//! Hostile behaviour: elite burst fire, boss movement and volleys
//!
//! Hostile bullets come from the `enemy_bullets` pool and carry the damage
//! of whoever fired them.

use glam::Vec2;

use super::catalog::EnemyArchetype;
use super::clock::Millis;
use super::state::{GameState, HostileKind, WaveMotion};

const BURST_SHOT_GAP_MS: Millis = 200.0;
const PULSING_BURST_SHOT_GAP_MS: Millis = 300.0;
const BURST_REST_MS: Millis = 1500.0;
const ELITE_BULLET_SPEED: f32 = 300.0;
const WAVE_BULLET_SPEED: f32 = 250.0;
const SPREAD_VX: f32 = 80.0;
const WAVE_AMPLITUDE: f32 = 120.0;
/// Wave phase advance per millisecond
const WAVE_RATE: f32 = 0.008;

const BOSS_SHOT_INTERVAL_MS: Millis = 1000.0;
const BOSS_BULLET_SPEED: f32 = 400.0;
const BOSS_BULLET_SPACING: f32 = 20.0;
const BOSS_BULLET_FAN_VX: f32 = 50.0;
const BOSS_MUZZLE_Y: f32 = 40.0;
const BOSS_HOLD_Y: f32 = 120.0;
const BOSS_VERTICAL_SPEED: f32 = 50.0;
const BOSS_SWAY_BASE: f32 = 150.0;
const BOSS_SWAY_STEP: f32 = 75.0;
const BOSS_SWAY_PERIOD_MS: f64 = 500.0;
const BOSS_FOLLOW_GAIN: f32 = 5.0;

/// What an elite fires per shot
#[derive(Debug, Clone, Copy)]
struct EliteShot {
    pos: Vec2,
    vx: f32,
    archetype: EnemyArchetype,
    damage: f32,
}

/// Advance every elite's burst cycle and fire due shots
pub fn update_elites(state: &mut GameState) {
    let now = state.now();
    let mut shots = Vec::new();

    for enemy in state.enemies.iter_mut().filter(|h| h.is_alive()) {
        let HostileKind::Enemy(elite) = &mut enemy.kind else {
            continue;
        };
        if !elite.elite {
            continue;
        }
        let shot = EliteShot {
            pos: enemy.pos,
            vx: enemy.vel.x,
            archetype: elite.archetype,
            damage: elite.bullet_damage,
        };
        let burst = &mut elite.burst;

        if burst.firing {
            if burst.shots_fired < elite.shots_per_burst && now >= burst.next_shot_at {
                shots.push(shot);
                burst.shots_fired += 1;
                burst.next_shot_at = now
                    + if elite.archetype == EnemyArchetype::PulsingPurple {
                        PULSING_BURST_SHOT_GAP_MS
                    } else {
                        BURST_SHOT_GAP_MS
                    };
            } else if burst.shots_fired >= elite.shots_per_burst {
                burst.firing = false;
                burst.next_burst_at = now + BURST_REST_MS;
            }
        } else if now >= burst.next_burst_at {
            shots.push(shot);
            burst.firing = true;
            burst.shots_fired = 1;
            burst.next_shot_at = now + BURST_SHOT_GAP_MS;
        }
    }

    for shot in shots {
        elite_shoot(state, shot);
    }
}

fn elite_shoot(state: &mut GameState, shot: EliteShot) {
    let muzzle = shot.pos + Vec2::new(0.0, 20.0);
    match shot.archetype {
        EnemyArchetype::DarkPurple => {
            for side in [-1.0, 1.0] {
                fire_hostile_bullet(
                    state,
                    muzzle,
                    Vec2::new(shot.vx + side * SPREAD_VX, ELITE_BULLET_SPEED),
                    shot.damage,
                    None,
                );
            }
        }
        EnemyArchetype::PulsingPurple => fire_hostile_bullet(
            state,
            muzzle,
            Vec2::new(0.0, WAVE_BULLET_SPEED),
            shot.damage,
            Some(WaveMotion {
                start_x: muzzle.x,
                phase: 0.0,
            }),
        ),
        _ => fire_hostile_bullet(
            state,
            muzzle,
            Vec2::new(0.0, ELITE_BULLET_SPEED),
            shot.damage,
            None,
        ),
    }
}

/// Pull a hostile bullet from the pool; dropped silently when exhausted
pub fn fire_hostile_bullet(
    state: &mut GameState,
    pos: Vec2,
    vel: Vec2,
    damage: f32,
    wave: Option<WaveMotion>,
) {
    let Some((_, bullet)) = state.enemy_bullets.acquire() else {
        return;
    };
    bullet.pos = pos;
    bullet.vel = vel;
    bullet.damage = damage;
    bullet.spawn_y = pos.y;
    bullet.wave = wave;
}

/// Sway amplitude for a boss tier, kept on screen
pub fn boss_sway_amplitude(tier_number: u32, width: f32) -> f32 {
    (BOSS_SWAY_BASE + (tier_number.saturating_sub(1)) as f32 * BOSS_SWAY_STEP).min(width / 2.0 - 40.0)
}

/// Boss steering and volleys
pub fn update_bosses(state: &mut GameState, dt: f32) {
    let now = state.now();
    let width = state.width();
    let mode = state.settings.mode;
    let mut volleys = Vec::new();

    for boss in state.bosses.iter_mut().filter(|h| h.is_alive()) {
        let HostileKind::Boss(ai) = &mut boss.kind else {
            continue;
        };

        let last = *ai.last_shot_at.get_or_insert(now);
        if now >= last + BOSS_SHOT_INTERVAL_MS {
            let stats = ai.tier.stats(mode);
            volleys.push((boss.pos, stats.bullets_per_volley, stats.bullet_damage));
            ai.last_shot_at = Some(now);
        }

        ai.sway_ms += dt as f64 * 1000.0;
        let amplitude = boss_sway_amplitude(ai.tier.number(), width);
        let target_x = width / 2.0 + (ai.sway_ms / BOSS_SWAY_PERIOD_MS).sin() as f32 * amplitude;
        boss.vel.x = (target_x - boss.pos.x) * BOSS_FOLLOW_GAIN;
        boss.vel.y = if boss.pos.y < BOSS_HOLD_Y {
            BOSS_VERTICAL_SPEED
        } else if boss.pos.y > BOSS_HOLD_Y {
            -BOSS_VERTICAL_SPEED
        } else {
            0.0
        };
    }

    for (pos, count, damage) in volleys {
        boss_volley(state, pos, count, damage);
    }
}

/// Fan of `count` bullets centred under the boss
fn boss_volley(state: &mut GameState, pos: Vec2, count: u32, damage: f32) {
    let centre = (count as f32 - 1.0) / 2.0;
    for i in 0..count {
        let offset = i as f32 - centre;
        fire_hostile_bullet(
            state,
            pos + Vec2::new(offset * BOSS_BULLET_SPACING, BOSS_MUZZLE_Y),
            Vec2::new(offset * BOSS_BULLET_FAN_VX, BOSS_BULLET_SPEED),
            damage,
            None,
        );
    }
}

/// Sine sway for wave bullets (x is driven directly, not by velocity)
pub fn update_wave_bullets(state: &mut GameState, dt: f32) {
    let dt_ms = dt * 1000.0;
    for (_, bullet) in state.enemy_bullets.iter_active_mut() {
        if let Some(wave) = bullet.wave.as_mut() {
            wave.phase += dt_ms * WAVE_RATE;
            bullet.pos.x = wave.start_x + wave.phase.sin() * WAVE_AMPLITUDE;
            bullet.vel.x = 0.0;
        }
    }
}
