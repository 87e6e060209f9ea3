//! Player weapons and auto-firing kit
//!
//! Main gun patterns, rear turret, side cannons, orbital drones and clone
//! ships. Every bullet snapshots the current damage multiplier and upgrade
//! payloads when it leaves the pool.

use std::f32::consts::TAU;

use glam::Vec2;

use super::catalog::UpgradeKind;
use super::clock::Millis;
use super::damage::damage_multiplier;
use super::state::{CloneShip, Drone, ExplosivePayload, GameState, LightningPayload};
use crate::direction;
use crate::settings::WeaponDef;

/// Main gun muzzle offset above the ship
const MUZZLE_OFFSET_Y: f32 = 20.0;
/// Horizontal offset and velocity bias of the multi-shot side guns
const MULTI_SHOT_OFFSET: f32 = 25.0;
const MULTI_SHOT_VX_BIAS: f32 = 100.0;

const TURRET_BASE_COOLDOWN_MS: Millis = 1000.0;
const TURRET_SPEED: f32 = 500.0;
const SIDE_CANNON_OFFSET: f32 = 20.0;

pub const DRONE_ORBIT_RADIUS: f32 = 60.0;
/// Orbit advance per tick (radians)
const DRONE_ORBIT_STEP: f32 = 0.02;
const DRONE_SHOT_SPEED: f32 = 300.0;
const DRONE_COOLDOWN_MS: Millis = 500.0;

/// Current main-gun cooldown (rapid fire halves it or better)
pub fn shot_cooldown(state: &GameState) -> Millis {
    let weapon = state.settings.weapon.def();
    if state.run.powerups.rapid_fire() {
        weapon.rapid_fire_cooldown_ms
    } else {
        weapon.base_cooldown_ms
    }
}

/// Fire the main gun if held and off cooldown
pub fn update_main_gun(state: &mut GameState, fire_held: bool) {
    if !fire_held {
        return;
    }
    let now = state.now();
    if state
        .run
        .last_shot
        .is_some_and(|last| now <= last + shot_cooldown(state))
    {
        return;
    }
    shoot(state);
    state.run.last_shot = Some(now);
}

/// Fire the weapon pattern from the player and every clone
pub fn shoot(state: &mut GameState) {
    let weapon = state.settings.weapon.def();
    let mut muzzles = vec![state.player.pos];
    muzzles.extend(state.clones.iter().map(|c| c.pos));
    for muzzle in muzzles {
        fire_pattern(state, muzzle - Vec2::new(0.0, MUZZLE_OFFSET_Y), &weapon);
    }
}

fn fire_pattern(state: &mut GameState, origin: Vec2, weapon: &WeaponDef) {
    let positions: &[(f32, f32)] = if state.run.powerups.multi_shot() {
        &[
            (-MULTI_SHOT_OFFSET, -MULTI_SHOT_VX_BIAS),
            (0.0, 0.0),
            (MULTI_SHOT_OFFSET, MULTI_SHOT_VX_BIAS),
        ]
    } else {
        &[(0.0, 0.0)]
    };

    for &(dx, vx_bias) in positions {
        let x = origin.x + dx;
        if weapon.spread.is_empty() {
            create_bullet(
                state,
                Vec2::new(x, origin.y),
                Vec2::new(vx_bias, -weapon.bullet_speed),
                weapon.max_range,
            );
        } else {
            for pellet in weapon.spread {
                create_bullet(
                    state,
                    Vec2::new(x + pellet.x_offset, origin.y),
                    Vec2::new(vx_bias + pellet.vx, -weapon.bullet_speed),
                    weapon.max_range,
                );
            }
        }
    }
}

/// Pull a bullet from the pool and load the current upgrade payloads.
/// Returns false when the pool is exhausted (the shot is dropped).
pub fn create_bullet(state: &mut GameState, pos: Vec2, vel: Vec2, max_range: Option<f32>) -> bool {
    let damage = damage_multiplier(&state.upgrades, &state.run);
    let piercing = state.upgrades.level(UpgradeKind::Piercing);
    let explosive = state.upgrades.level(UpgradeKind::Explosive);
    let lightning = state.upgrades.level(UpgradeKind::Lightning);

    let Some((_, bullet)) = state.bullets.acquire() else {
        log::debug!("Bullet pool exhausted");
        return false;
    };
    bullet.pos = pos;
    bullet.vel = vel;
    bullet.damage = damage;
    bullet.pierce = piercing * 2;
    bullet.explosive = (explosive > 0).then(|| ExplosivePayload {
        radius: 40.0 + 30.0 * explosive as f32,
        damage: 3.0 * explosive as f32,
    });
    bullet.lightning = (lightning > 0).then(|| LightningPayload {
        jumps: 1 + 2 * lightning,
        range: 150.0 + 50.0 * lightning as f32,
    });
    bullet.max_range = max_range;
    bullet.spawn_y = pos.y;
    true
}

fn turret_cooldown(rear_level: u32) -> Millis {
    TURRET_BASE_COOLDOWN_MS / rear_level as f64
}

/// Rear turret and side cannons (side cannons share the turret cadence)
pub fn update_turrets(state: &mut GameState) {
    let rear = state.upgrades.level(UpgradeKind::Rear);
    if rear == 0 {
        return;
    }
    let now = state.now();
    let cooldown = turret_cooldown(rear);
    let player = state.player.pos;

    if now > state.run.last_rear_shot + cooldown {
        create_bullet(
            state,
            player + Vec2::new(0.0, MUZZLE_OFFSET_Y),
            Vec2::new(0.0, TURRET_SPEED),
            None,
        );
        state.run.last_rear_shot = now;
    }

    let side = state.upgrades.level(UpgradeKind::SideCannon);
    if side > 0 && now > state.run.last_side_shot + cooldown {
        create_bullet(
            state,
            player - Vec2::new(SIDE_CANNON_OFFSET, 0.0),
            Vec2::new(-TURRET_SPEED, 0.0),
            None,
        );
        if side >= 2 {
            create_bullet(
                state,
                player + Vec2::new(SIDE_CANNON_OFFSET, 0.0),
                Vec2::new(TURRET_SPEED, 0.0),
                None,
            );
        }
        state.run.last_side_shot = now;
    }
}

/// Keep one drone per level, orbit the player, fire outward
pub fn update_drones(state: &mut GameState) {
    let count = state.upgrades.level(UpgradeKind::Drones) as usize;
    if count == 0 {
        return;
    }
    let player = state.player.pos;
    let now = state.now();

    if state.drones.len() < count {
        while state.drones.len() < count {
            state.drones.push(Drone {
                orbit_angle: 0.0,
                pos: player,
                next_shot_at: now,
            });
        }
        // respace evenly around the ship
        for (i, drone) in state.drones.iter_mut().enumerate() {
            drone.orbit_angle = i as f32 / count as f32 * TAU;
        }
    }

    let mut shots = Vec::new();
    for drone in &mut state.drones {
        drone.orbit_angle += DRONE_ORBIT_STEP;
        let dir = direction(drone.orbit_angle);
        drone.pos = player + dir * DRONE_ORBIT_RADIUS;
        if now >= drone.next_shot_at {
            shots.push((drone.pos, dir * DRONE_SHOT_SPEED));
            drone.next_shot_at = now + DRONE_COOLDOWN_MS;
        }
    }
    for (pos, vel) in shots {
        create_bullet(state, pos, vel, None);
    }
}

/// One mirrored clone per level, reflected across the vertical centre line
pub fn update_clones(state: &mut GameState) {
    let count = state.upgrades.level(UpgradeKind::Clone) as usize;
    let mirrored = Vec2::new(state.width() - state.player.pos.x, state.player.pos.y);
    state.clones.resize(count, CloneShip { pos: mirrored });
    for clone in &mut state.clones {
        clone.pos = mirrored;
    }
}
