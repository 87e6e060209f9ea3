//! Gems, power-ups and shield regeneration

use glam::Vec2;

use super::beam::fire_lasers;
use super::catalog::UpgradeKind;
use super::clock::Millis;
use super::events::{Effect, colors};
use super::progression::add_xp;
use super::state::{EntityId, GameState, Lifecycle, Magnetism, PowerupKind, TimedEffect};

pub const POWERUP_DURATION_MS: Millis = 10_000.0;
pub const HEALTH_PICKUP_AMOUNT: f32 = 25.0;
pub const BASE_MAGNET_RADIUS: f32 = 100.0;
const MAGNET_ACCELERATION: f32 = 1.001;
const MAGNET_MAX_SPEED: f32 = 600.0;

/// Shield regen interval by shield level (level 0 never regenerates)
const SHIELD_REGEN_MS: [Millis; 6] = [0.0, 10_000.0, 5_000.0, 4_000.0, 3_000.0, 2_000.0];

pub fn magnet_radius(magnet_level: u32) -> f32 {
    BASE_MAGNET_RADIUS * (1.0 + 0.25 * magnet_level as f32)
}

pub fn shield_regen_interval(shield_level: u32) -> Millis {
    SHIELD_REGEN_MS
        .get(shield_level as usize)
        .copied()
        .unwrap_or(SHIELD_REGEN_MS[SHIELD_REGEN_MS.len() - 1])
}

fn pull(magnet: &mut Magnetism, pos: Vec2, vel: &mut Vec2, target: Vec2, radius: f32) {
    let offset = target - pos;
    let dist = offset.length();
    if dist < radius {
        magnet.magnetized = true;
    }
    if magnet.magnetized && dist > 0.0 {
        magnet.speed = (magnet.speed * MAGNET_ACCELERATION).min(MAGNET_MAX_SPEED);
        *vel = offset / dist * magnet.speed;
    }
}

/// Gems and pickups inside the magnet radius home in on the player
pub fn update_magnetism(state: &mut GameState) {
    if !state.player.alive {
        return;
    }
    let target = state.player.pos;
    let radius = magnet_radius(state.upgrades.level(UpgradeKind::Magnet));

    for gem in state.gems.iter_mut().filter(|g| g.lifecycle.is_alive()) {
        pull(&mut gem.magnet, gem.pos, &mut gem.vel, target, radius);
    }
    for pickup in state.pickups.iter_mut().filter(|p| p.lifecycle.is_alive()) {
        pull(&mut pickup.magnet, pickup.pos, &mut pickup.vel, target, radius);
    }
}

pub fn collect_gem(state: &mut GameState, id: EntityId) {
    let Some(gem) = state
        .gems
        .iter_mut()
        .find(|g| g.id == id && g.lifecycle.is_alive())
    else {
        return;
    };
    gem.lifecycle = Lifecycle::Removed;
    let xp = gem.xp;
    add_xp(state, xp);
}

pub fn collect_pickup(state: &mut GameState, id: EntityId) {
    let Some(pickup) = state
        .pickups
        .iter_mut()
        .find(|p| p.id == id && p.lifecycle.is_alive())
    else {
        return;
    };
    pickup.lifecycle = Lifecycle::Removed;
    let kind = pickup.kind;
    let now = state.now();
    let until = now + POWERUP_DURATION_MS;
    log::debug!("Collected {:?}", kind);

    match kind {
        PowerupKind::Shield => {
            let cap = state.run.max_shield_stacks.max(1);
            state.run.shield_stacks = (state.run.shield_stacks + 1).min(cap);
        }
        PowerupKind::RapidFire => {
            state.run.powerups.rapid_fire_until = Some(until);
            state.emit(Effect::text("RAPID FIRE", colors::YELLOW));
        }
        PowerupKind::MultiShot => {
            state.run.powerups.multi_shot_until = Some(until);
            state.emit(Effect::text("MULTI SHOT", colors::GREEN));
        }
        PowerupKind::Lasers => {
            state.run.powerups.lasers_until = Some(until);
            state.emit(Effect::text("LASERS", colors::GREEN));
            fire_lasers(state);
            state.run.lasers_last_fire = now;
        }
        PowerupKind::Health => {
            state.run.heal(HEALTH_PICKUP_AMOUNT);
            state.emit(Effect::text(
                format!("+{} HP", HEALTH_PICKUP_AMOUNT),
                colors::GREEN,
            ));
        }
    }

    if matches!(
        kind,
        PowerupKind::RapidFire | PowerupKind::MultiShot | PowerupKind::Lasers
    ) {
        state.timers.schedule(until, TimedEffect::PowerupExpired(kind));
    }
}

/// Scheduled expiry; ignored if a later pickup pushed the deadline out
pub fn expire_powerup(state: &mut GameState, kind: PowerupKind) {
    let now = state.now();
    let powerups = &mut state.run.powerups;
    let slot = match kind {
        PowerupKind::RapidFire => &mut powerups.rapid_fire_until,
        PowerupKind::MultiShot => &mut powerups.multi_shot_until,
        PowerupKind::Lasers => &mut powerups.lasers_until,
        PowerupKind::Shield | PowerupKind::Health => return,
    };
    if slot.is_some_and(|until| until <= now) {
        *slot = None;
        log::debug!("{:?} expired", kind);
    }
}

/// Re-fire the lasers every two seconds while the power-up lasts
pub fn update_laser_powerup(state: &mut GameState) {
    const REFIRE_MS: Millis = 2000.0;
    if !state.run.powerups.lasers() {
        return;
    }
    let now = state.now();
    if now > state.run.lasers_last_fire + REFIRE_MS {
        fire_lasers(state);
        state.run.lasers_last_fire = now;
    }
}

/// Regain one shield stack per interval while below the cap
pub fn update_shield_regen(state: &mut GameState) {
    let level = state.upgrades.level(UpgradeKind::Shield);
    if level == 0 || state.run.shield_stacks >= state.run.max_shield_stacks {
        return;
    }
    let now = state.now();
    if now - state.run.last_shield_regen >= shield_regen_interval(level) {
        state.run.shield_stacks += 1;
        state.run.last_shield_regen = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::lifecycle::{spawn_gem, spawn_pickup};
    use crate::sim::catalog::GemKind;
    use crate::sim::state::test_support::*;

    #[test]
    fn test_gem_feeds_xp_once() {
        let mut state = state();
        spawn_gem(&mut state, Vec2::new(10.0, 10.0), GemKind::MediumBlue, Some(30));
        let id = state.gems[0].id;
        collect_gem(&mut state, id);
        collect_gem(&mut state, id);
        assert_eq!(state.run.xp, 30);
    }

    #[test]
    fn test_powerup_expires_on_schedule() {
        let mut state = state();
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::RapidFire);
        let id = state.pickups[0].id;
        collect_pickup(&mut state, id);
        assert!(state.run.powerups.rapid_fire());
        assert_eq!(state.timers.len(), 1);

        state.clock.advance(10.0);
        let now = state.now();
        for effect in state.timers.drain_due(now) {
            if let TimedEffect::PowerupExpired(kind) = effect {
                expire_powerup(&mut state, kind);
            }
        }
        assert!(!state.run.powerups.rapid_fire());
    }

    #[test]
    fn test_repeat_pickup_extends() {
        let mut state = state();
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::MultiShot);
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::MultiShot);
        let first = state.pickups[0].id;
        let second = state.pickups[1].id;

        collect_pickup(&mut state, first);
        state.clock.advance(5.0);
        collect_pickup(&mut state, second);

        state.clock.advance(5.0);
        expire_powerup(&mut state, PowerupKind::MultiShot);
        assert!(state.run.powerups.multi_shot());

        state.clock.advance(5.0);
        expire_powerup(&mut state, PowerupKind::MultiShot);
        assert!(!state.run.powerups.multi_shot());
    }

    #[test]
    fn test_lasers_fire_on_pickup() {
        let mut state = state();
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::Lasers);
        let id = state.pickups[0].id;
        collect_pickup(&mut state, id);
        assert_eq!(state.lasers.len(), 2);

        state.clock.advance(1.0);
        update_laser_powerup(&mut state);
        assert_eq!(state.lasers.len(), 2);
        state.clock.advance(1.5);
        update_laser_powerup(&mut state);
        assert_eq!(state.lasers.len(), 4);
    }

    #[test]
    fn test_shield_and_health_pickups() {
        let mut state = state();
        state.run.shield_stacks = 0;
        state.run.health = 90.0;
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::Shield);
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::Shield);
        spawn_pickup(&mut state, Vec2::ZERO, PowerupKind::Health);
        let ids: Vec<EntityId> = state.pickups.iter().map(|p| p.id).collect();
        for id in ids {
            collect_pickup(&mut state, id);
        }
        assert_eq!(state.run.shield_stacks, 1);
        assert_eq!(state.run.health, 100.0);
    }

    #[test]
    fn test_magnet_pulls_and_accelerates() {
        let mut state = state();
        let player = state.player.pos;
        spawn_gem(&mut state, player + Vec2::new(50.0, 0.0), GemKind::Small, None);
        spawn_gem(&mut state, player + Vec2::new(300.0, 0.0), GemKind::Small, None);
        update_magnetism(&mut state);

        assert!(state.gems[0].magnet.magnetized);
        assert!(state.gems[0].vel.x < 0.0);
        assert!(state.gems[0].magnet.speed > 400.0);
        assert!(!state.gems[1].magnet.magnetized);
        assert_eq!(magnet_radius(2), 150.0);
    }

    #[test]
    fn test_shield_regen_interval() {
        let mut state = state();
        state.upgrades.increment(UpgradeKind::Shield);
        state.run.max_shield_stacks = 2;
        state.run.shield_stacks = 0;

        state.clock.advance(9.0);
        update_shield_regen(&mut state);
        assert_eq!(state.run.shield_stacks, 0);
        state.clock.advance(1.0);
        update_shield_regen(&mut state);
        assert_eq!(state.run.shield_stacks, 1);
        assert_eq!(shield_regen_interval(9), 2000.0);
    }
}
