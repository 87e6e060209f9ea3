//! Guarded creation and destruction of hostiles and drops
//!
//! `destroy_hostile` is the only path that awards score and drops. It is
//! idempotent: the hostile moves Alive -> Dying -> Removed and any later call
//! for the same handle is a no-op. Removed entities are purged at the end of
//! the tick so handles stay valid while a tick resolves.

use glam::Vec2;
use rand::Rng;

use super::catalog::{BossTier, GemKind};
use super::combat;
use super::events::Effect;
use super::spawn;
use super::state::{
    Gem, GameState, HostileKind, HostileRef, Lifecycle, Magnetism, Pickup, PowerupKind,
};

/// Powerups an enemy kill can drop
const ENEMY_DROPS: [PowerupKind; 4] = [
    PowerupKind::Shield,
    PowerupKind::RapidFire,
    PowerupKind::MultiShot,
    PowerupKind::Lasers,
];

/// Percent chance of a powerup on enemy kill
const POWERUP_DROP_PERCENT: u32 = 15;
/// 1-in-N chance of a health pickup from an asteroid
const HEALTH_DROP_ONE_IN: u32 = 20;
const PICKUP_FALL_SPEED: f32 = 100.0;

/// Kill a hostile: explosion, gem, drop roll, score, kill side effects.
///
/// Returns false (and does nothing) if the hostile is gone or already dying.
pub fn destroy_hostile(state: &mut GameState, handle: HostileRef) -> bool {
    let Some(hostile) = state.hostile_mut(handle) else {
        return false;
    };
    if !hostile.is_alive() {
        return false;
    }
    hostile.lifecycle = Lifecycle::Dying;

    let pos = hostile.pos;
    let score = hostile.score_value;
    let gem = hostile.gem;
    let gem_xp = hostile.gem_xp;
    let boss_tier = match &hostile.kind {
        HostileKind::Boss(boss) => Some(boss.tier),
        _ => None,
    };
    let kind = match hostile.kind {
        HostileKind::Enemy(_) => KillKind::Enemy,
        HostileKind::Asteroid => KillKind::Asteroid,
        HostileKind::Boss(_) => KillKind::Boss,
    };

    let particles = match kind {
        KillKind::Enemy => 5,
        KillKind::Asteroid => 6,
        KillKind::Boss => 20,
    };
    state.emit(Effect::explosion(pos, particles));
    spawn_gem(state, pos, gem, gem_xp);

    match kind {
        KillKind::Enemy => roll_powerup_drop(state, pos),
        KillKind::Asteroid => roll_health_drop(state, pos),
        KillKind::Boss => {}
    }

    state.run.score += score;
    state.run.kills += 1;

    if kind == KillKind::Enemy {
        combat::try_vampiric_heal(state);
    }

    if let Some(tier) = boss_tier {
        on_boss_defeated(state, tier);
    }

    if let Some(hostile) = state.hostile_mut(handle) {
        hostile.lifecycle = Lifecycle::Removed;
    }
    true
}

/// Remove a hostile without rewards (rammed the player, left the arena)
pub fn despawn_hostile(state: &mut GameState, handle: HostileRef) -> bool {
    match state.hostile_mut(handle) {
        Some(hostile) if hostile.is_alive() => {
            hostile.lifecycle = Lifecycle::Removed;
            true
        }
        _ => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KillKind {
    Enemy,
    Asteroid,
    Boss,
}

fn on_boss_defeated(state: &mut GameState, tier: BossTier) {
    log::info!(
        "Boss {} defeated at {:.0}ms (score {})",
        tier.number(),
        state.now(),
        state.run.score
    );
    state.emit(Effect::BossDefeated { tier });
    spawn::check_flood_mode(state);
}

/// Drop an XP gem with a small random scatter velocity
pub fn spawn_gem(state: &mut GameState, pos: Vec2, kind: GemKind, xp: Option<u32>) {
    let vel = Vec2::new(
        state.rng.random_range(-20..=20) as f32,
        state.rng.random_range(50..=100) as f32,
    );
    let id = state.next_entity_id();
    state.gems.push(Gem {
        id,
        kind,
        xp: xp.unwrap_or_else(|| kind.default_xp()),
        pos,
        vel,
        magnet: Magnetism::default(),
        lifecycle: Lifecycle::Alive,
    });
}

pub fn spawn_pickup(state: &mut GameState, pos: Vec2, kind: PowerupKind) {
    let id = state.next_entity_id();
    state.pickups.push(Pickup {
        id,
        kind,
        pos,
        vel: Vec2::new(0.0, PICKUP_FALL_SPEED),
        magnet: Magnetism::default(),
        lifecycle: Lifecycle::Alive,
    });
}

fn roll_powerup_drop(state: &mut GameState, pos: Vec2) {
    if state.rng.random_range(1..=100) <= POWERUP_DROP_PERCENT {
        let kind = ENEMY_DROPS[state.rng.random_range(0..ENEMY_DROPS.len())];
        log::debug!("Powerup drop: {:?}", kind);
        spawn_pickup(state, pos, kind);
    }
}

fn roll_health_drop(state: &mut GameState, pos: Vec2) {
    if state.rng.random_range(0..HEALTH_DROP_ONE_IN) == 0 {
        spawn_pickup(state, pos, PowerupKind::Health);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::test_support::*;

    #[test]
    fn test_destroy_awards_once() {
        let mut state = state();
        let enemy = add_enemy(&mut state, Vec2::new(100.0, 100.0), 1.0);

        assert!(destroy_hostile(&mut state, enemy));
        assert!(!destroy_hostile(&mut state, enemy));

        assert_eq!(state.run.score, 10);
        assert_eq!(state.run.kills, 1);
        assert_eq!(state.gems.len(), 1);
        assert_eq!(state.gems[0].xp, 5);
        assert_eq!(
            state.hostile(enemy).map(|h| h.lifecycle),
            Some(Lifecycle::Removed)
        );
    }

    #[test]
    fn test_despawn_gives_no_rewards() {
        let mut state = state();
        let asteroid = add_asteroid(&mut state, Vec2::new(50.0, 50.0), 2.0);
        assert!(despawn_hostile(&mut state, asteroid));
        assert!(!destroy_hostile(&mut state, asteroid));
        assert_eq!(state.run.score, 0);
        assert!(state.gems.is_empty());
    }

    #[test]
    fn test_asteroid_drops_small_gem() {
        let mut state = state();
        let asteroid = add_asteroid(&mut state, Vec2::new(50.0, 50.0), 2.0);
        destroy_hostile(&mut state, asteroid);
        assert_eq!(state.gems[0].kind, GemKind::Small);
        assert_eq!(state.gems[0].xp, 5);
        assert_eq!(state.run.score, 5);
    }

    #[test]
    fn test_boss_kill_emits_defeat() {
        let mut state = state();
        let boss = add_boss(&mut state, BossTier::First, Vec2::new(500.0, 120.0), 1.0);
        state.run.boss_count = 1;
        destroy_hostile(&mut state, boss);
        let effects = state.drain_effects();
        assert!(effects.contains(&Effect::BossDefeated {
            tier: BossTier::First
        }));
        assert_eq!(state.gems[0].xp, 100);
        assert!(!state.run.flood_mode);
    }

    #[test]
    fn test_gem_scatter_is_bounded() {
        let mut state = state();
        for _ in 0..50 {
            spawn_gem(&mut state, Vec2::ZERO, GemKind::Medium, None);
        }
        for gem in &state.gems {
            assert!((-20.0..=20.0).contains(&gem.vel.x));
            assert!((50.0..=100.0).contains(&gem.vel.y));
            assert_eq!(gem.xp, 25);
        }
    }
}
