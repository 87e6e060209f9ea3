//! Collision outcomes and damage side effects
//!
//! Consumes one overlap at a time. Every kill goes through
//! `lifecycle::destroy_hostile`, so overlapping damage sources in the same
//! tick never double-award.

use glam::Vec2;

use super::catalog::UpgradeKind;
use super::clock::Millis;
use super::damage::giant_multiplier;
use super::events::{Effect, colors};
use super::lifecycle::{despawn_hostile, destroy_hostile};
use super::state::{
    ExplosivePayload, GamePhase, GameState, Group, HostileRef, TimedEffect,
};

/// A shield hit absorbs everything else for this long
pub const SHIELD_GRACE_MS: Millis = 500.0;
/// Flashing window after taking damage
pub const INVINCIBILITY_MS: Millis = 2000.0;
pub const VAMPIRIC_COOLDOWN_MS: Millis = 750.0;
pub const CHAIN_JUMP_DELAY_MS: Millis = 150.0;
pub const GARLIC_INTERVAL_MS: Millis = 500.0;
pub const NUKE_BASE_COOLDOWN_MS: Millis = 60_000.0;
/// Nuke damage to bosses (before giant scaling)
pub const NUKE_BOSS_DAMAGE: f32 = 25.0;

/// Contact damage by collider
pub const ENEMY_RAM_DAMAGE: f32 = 20.0;
pub const ASTEROID_RAM_DAMAGE: f32 = 15.0;
pub const BOSS_RAM_DAMAGE: f32 = 30.0;

/// Pending chain-lightning jumps
#[derive(Debug, Clone, PartialEq)]
pub struct ChainLightning {
    /// Where the next jump starts
    pub origin: Vec2,
    pub jumps: u32,
    pub range: f32,
    /// Targets already struck by this chain
    pub hit: Vec<HostileRef>,
}

/// Something that touched the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerCollider {
    Hostile(HostileRef),
    /// Slot in the hostile bullet pool
    EnemyBullet(usize),
}

/// How a player collision is resolved
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerHit {
    pub damage: f32,
    pub destroy_collider: bool,
    pub shield_explosion: bool,
}

impl PlayerHit {
    pub fn ram(group: Group) -> Self {
        match group {
            Group::Enemies => Self::new(ENEMY_RAM_DAMAGE, true, true),
            Group::Asteroids => Self::new(ASTEROID_RAM_DAMAGE, true, true),
            Group::Bosses => Self::new(BOSS_RAM_DAMAGE, false, true),
        }
    }

    pub fn bullet(damage: f32) -> Self {
        Self::new(damage, true, false)
    }

    fn new(damage: f32, destroy_collider: bool, shield_explosion: bool) -> Self {
        Self {
            damage,
            destroy_collider,
            shield_explosion,
        }
    }
}

/// Player bullet overlapping a hostile
pub fn bullet_hit(state: &mut GameState, slot: usize, target: HostileRef) {
    let Some(bullet) = state.bullets.get(slot) else {
        return;
    };
    if bullet.hits.contains(&target) {
        return;
    }
    let damage = bullet.damage;
    let pierce = bullet.pierce;
    let explosive = bullet.explosive;
    let lightning = bullet.lightning;

    let Some(hostile) = state.hostile_mut(target) else {
        return;
    };
    if !hostile.is_alive() {
        return;
    }
    let impact = hostile.pos;
    let killed = hostile.apply_damage(damage);
    let is_boss = target.group == Group::Bosses;

    if let Some(payload) = lightning {
        chain_lightning(
            state,
            ChainLightning {
                origin: impact,
                jumps: payload.jumps,
                range: payload.range,
                hit: if is_boss { Vec::new() } else { vec![target] },
            },
        );
    }

    // bosses always stop the bullet
    if let Some(bullet) = state.bullets.get_mut(slot) {
        bullet.hits.push(target);
        if !is_boss && pierce > 0 {
            bullet.pierce -= 1;
        } else {
            state.bullets.release(slot);
        }
    }

    if let Some(payload) = explosive {
        let exclude = (target.group == Group::Enemies).then_some(target);
        explosive_splash(state, impact, payload, exclude);
    }

    if killed {
        destroy_hostile(state, target);
    }
}

/// Splash damage to enemies around an impact point
pub fn explosive_splash(
    state: &mut GameState,
    origin: Vec2,
    payload: ExplosivePayload,
    exclude: Option<HostileRef>,
) {
    let damage = payload.damage * giant_multiplier(state.upgrades.level(UpgradeKind::Giant));
    state.emit(Effect::Explosion {
        pos: origin,
        particles: (15.0 + damage * 2.0) as u32,
        radius: payload.radius,
        explosive: true,
    });

    for handle in state.live_handles(Group::Enemies) {
        if Some(handle) == exclude {
            continue;
        }
        let Some(enemy) = state.hostile_mut(handle) else {
            continue;
        };
        if !enemy.is_alive() || enemy.pos.distance(origin) >= payload.radius {
            continue;
        }
        if enemy.apply_damage(damage) {
            destroy_hostile(state, handle);
        }
    }
}

/// One chain-lightning jump; schedules the next on the timer queue
pub fn chain_lightning(state: &mut GameState, mut chain: ChainLightning) {
    if chain.jumps == 0 {
        return;
    }

    let mut nearest: Option<(HostileRef, Vec2)> = None;
    let mut nearest_dist = chain.range;
    for group in [Group::Enemies, Group::Asteroids] {
        for hostile in state.group(group) {
            if !hostile.is_alive() || chain.hit.contains(&hostile.handle()) {
                continue;
            }
            let dist = hostile.pos.distance(chain.origin);
            if dist < nearest_dist {
                nearest_dist = dist;
                nearest = Some((hostile.handle(), hostile.pos));
            }
        }
    }
    let Some((target, pos)) = nearest else {
        return;
    };

    chain.hit.push(target);
    state.emit(Effect::LightningArc {
        from: chain.origin,
        to: pos,
    });

    let damage = giant_multiplier(state.upgrades.level(UpgradeKind::Giant));
    let killed = state
        .hostile_mut(target)
        .is_some_and(|h| h.apply_damage(damage));
    if killed {
        destroy_hostile(state, target);
    }

    chain.origin = pos;
    chain.jumps -= 1;
    if chain.jumps > 0 {
        let due = state.now() + CHAIN_JUMP_DELAY_MS;
        state.timers.schedule(due, TimedEffect::ChainJump(chain));
    }
}

/// Single entry point for anything damaging the player
pub fn player_collision(state: &mut GameState, collider: PlayerCollider, hit: PlayerHit) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    let now = state.now();

    if state.run.god_mode {
        remove_collider(state, collider, hit);
        return;
    }

    if state
        .run
        .last_shield_hit
        .is_some_and(|last| now - last < SHIELD_GRACE_MS)
    {
        remove_collider(state, collider, hit);
        return;
    }

    if state.run.shield_stacks > 0 {
        state.run.last_shield_hit = Some(now);
        state.run.shield_stacks -= 1;
        state.emit(Effect::ShieldAbsorbed {
            stacks_left: state.run.shield_stacks,
        });
        if hit.shield_explosion {
            state.emit(Effect::explosion(state.player.pos, 8));
        }
        remove_collider(state, collider, hit);
        return;
    }

    if state.player.is_invincible(now) {
        return;
    }
    take_damage(state, hit.damage);
    remove_collider(state, collider, hit);
}

fn remove_collider(state: &mut GameState, collider: PlayerCollider, hit: PlayerHit) {
    if !hit.destroy_collider {
        return;
    }
    match collider {
        PlayerCollider::Hostile(handle) => {
            despawn_hostile(state, handle);
        }
        PlayerCollider::EnemyBullet(slot) => state.enemy_bullets.release(slot),
    }
}

/// Reduce health, start the invincibility window, end the run at zero
pub fn take_damage(state: &mut GameState, amount: f32) {
    state.run.health -= amount;
    state.player.invincible_until = state.now() + INVINCIBILITY_MS;
    state.emit(Effect::PlayerDamaged {
        amount,
        health: state.run.health.max(0.0),
    });
    log::debug!("Player took {} damage ({} left)", amount, state.run.health);

    if state.run.health <= 0.0 {
        state.run.health = 0.0;
        game_over(state);
    }
}

pub fn game_over(state: &mut GameState) {
    if state.phase == GamePhase::GameOver {
        return;
    }
    state.phase = GamePhase::GameOver;
    state.player.alive = false;
    state.emit(Effect::explosion(state.player.pos, 20));
    state.emit(Effect::GameOver {
        score: state.run.score,
    });
    log::info!(
        "Game over: score {} level {} at {:.0}ms",
        state.run.score,
        state.run.player_level,
        state.now()
    );
}

/// Heal on kill, rate limited
pub fn try_vampiric_heal(state: &mut GameState) {
    let level = state.upgrades.level(UpgradeKind::Vampiric);
    if level == 0 {
        return;
    }
    let now = state.now();
    if state
        .run
        .last_vampiric_heal
        .is_some_and(|last| now - last < VAMPIRIC_COOLDOWN_MS)
    {
        return;
    }
    state.run.heal(level as f32);
    state.run.last_vampiric_heal = Some(now);
}

/// Aura radius for a garlic level
pub fn garlic_radius(level: u32) -> f32 {
    40.0 + 25.0 * level as f32
}

/// Periodic aura damage around the player
pub fn garlic_pulse(state: &mut GameState) {
    let level = state.upgrades.level(UpgradeKind::Garlic);
    if level == 0 || !state.player.alive {
        return;
    }
    let now = state.now();
    if now - state.run.last_garlic_pulse <= GARLIC_INTERVAL_MS {
        return;
    }

    let radius = garlic_radius(level);
    let damage = (1 + level) as f32 * giant_multiplier(state.upgrades.level(UpgradeKind::Giant));
    let center = state.player.pos;

    for group in [Group::Enemies, Group::Asteroids, Group::Bosses] {
        for handle in state.live_handles(group) {
            let Some(target) = state.hostile_mut(handle) else {
                continue;
            };
            if target.pos.distance(center) < radius && target.apply_damage(damage) {
                destroy_hostile(state, handle);
            }
        }
    }
    state.run.last_garlic_pulse = now;
}

/// Clear the screen: kill every enemy and asteroid, hurt bosses
pub fn activate_nuke(state: &mut GameState) {
    let level = state.upgrades.level(UpgradeKind::Nuke);
    if level == 0 {
        return;
    }
    let now = state.now();
    if now < state.run.nuke_ready_at {
        let secs = ((state.run.nuke_ready_at - now) / 1000.0).ceil();
        state.emit(Effect::text(format!("Nuke on cooldown: {}s", secs), colors::RED));
        return;
    }

    let mut targets = state.live_handles(Group::Enemies);
    targets.extend(state.live_handles(Group::Asteroids));
    for handle in targets {
        destroy_hostile(state, handle);
    }

    let boss_damage =
        NUKE_BOSS_DAMAGE * giant_multiplier(state.upgrades.level(UpgradeKind::Giant));
    for handle in state.live_handles(Group::Bosses) {
        let killed = state
            .hostile_mut(handle)
            .is_some_and(|b| b.apply_damage(boss_damage));
        if killed {
            destroy_hostile(state, handle);
        }
    }

    state.emit(Effect::ScreenFlash {
        alpha: 0.8,
        duration_ms: 500.0,
    });
    state.emit(Effect::text("NUKE ACTIVATED!", colors::YELLOW));
    state.run.nuke_ready_at = now + NUKE_BASE_COOLDOWN_MS / level as f64;
    log::info!("Nuke fired; ready again at {:.0}ms", state.run.nuke_ready_at);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::catalog::BossTier;
    use crate::sim::state::test_support::*;
    use crate::sim::state::{LightningPayload, Lifecycle};
    use proptest::prelude::*;

    fn fire(state: &mut GameState, pierce: u32) -> usize {
        let (slot, bullet) = state.bullets.acquire().unwrap();
        bullet.damage = 1.0;
        bullet.pierce = pierce;
        slot
    }

    #[test]
    fn test_bullet_kills_and_returns_to_pool() {
        let mut state = state();
        let enemy = add_enemy(&mut state, Vec2::new(100.0, 100.0), 1.0);
        let slot = fire(&mut state, 0);
        bullet_hit(&mut state, slot, enemy);
        assert_eq!(state.bullets.active_count(), 0);
        assert_eq!(state.run.score, 10);

        // a second overlap report in the same tick is ignored
        bullet_hit(&mut state, slot, enemy);
        assert_eq!(state.run.score, 10);
    }

    #[test]
    fn test_pierce_never_rehits() {
        let mut state = state();
        let a = add_enemy(&mut state, Vec2::new(100.0, 100.0), 10.0);
        let b = add_enemy(&mut state, Vec2::new(100.0, 80.0), 10.0);
        let slot = fire(&mut state, 2);

        bullet_hit(&mut state, slot, a);
        bullet_hit(&mut state, slot, a);
        bullet_hit(&mut state, slot, b);
        bullet_hit(&mut state, slot, b);

        assert_eq!(state.hostile(a).unwrap().health, 9.0);
        assert_eq!(state.hostile(b).unwrap().health, 9.0);
        assert_eq!(state.bullets.get(slot).unwrap().pierce, 0);
    }

    #[test]
    fn test_boss_stops_piercing_bullet() {
        let mut state = state();
        let boss = add_boss(&mut state, BossTier::First, Vec2::new(500.0, 120.0), 100.0);
        let slot = fire(&mut state, 6);
        bullet_hit(&mut state, slot, boss);
        assert!(state.bullets.get(slot).is_none());
        assert_eq!(state.hostile(boss).unwrap().health, 99.0);
    }

    #[test]
    fn test_explosive_excludes_primary() {
        let mut state = state();
        let primary = add_enemy(&mut state, Vec2::new(100.0, 100.0), 100.0);
        let near = add_enemy(&mut state, Vec2::new(130.0, 100.0), 100.0);
        let far = add_enemy(&mut state, Vec2::new(400.0, 100.0), 100.0);
        let slot = fire(&mut state, 0);
        state.bullets.get_mut(slot).unwrap().explosive = Some(ExplosivePayload {
            radius: 70.0,
            damage: 3.0,
        });

        bullet_hit(&mut state, slot, primary);
        assert_eq!(state.hostile(primary).unwrap().health, 99.0);
        assert_eq!(state.hostile(near).unwrap().health, 97.0);
        assert_eq!(state.hostile(far).unwrap().health, 100.0);
    }

    #[test]
    fn test_chain_lightning_jumps_are_delayed() {
        let mut state = state();
        let a = add_enemy(&mut state, Vec2::new(100.0, 100.0), 10.0);
        let b = add_enemy(&mut state, Vec2::new(150.0, 100.0), 10.0);
        let c = add_enemy(&mut state, Vec2::new(200.0, 100.0), 10.0);
        let slot = fire(&mut state, 0);
        state.bullets.get_mut(slot).unwrap().lightning = Some(LightningPayload {
            jumps: 3,
            range: 200.0,
        });

        bullet_hit(&mut state, slot, a);
        assert_eq!(state.hostile(a).unwrap().health, 9.0);
        assert_eq!(state.hostile(b).unwrap().health, 9.0);
        assert_eq!(state.hostile(c).unwrap().health, 10.0);
        assert_eq!(state.timers.len(), 1);

        state.clock.advance(0.15);
        for due in state.timers.drain_due(state.now()) {
            if let TimedEffect::ChainJump(chain) = due {
                chain_lightning(&mut state, chain);
            }
        }
        assert_eq!(state.hostile(c).unwrap().health, 9.0);
        // a is already struck, nothing else is in range
        state.clock.advance(0.15);
        for due in state.timers.drain_due(state.now()) {
            if let TimedEffect::ChainJump(chain) = due {
                chain_lightning(&mut state, chain);
            }
        }
        assert_eq!(state.hostile(a).unwrap().health, 9.0);
        assert!(state.timers.is_empty());
    }

    #[test]
    fn test_shield_grace_window() {
        let mut state = state();
        state.clock.advance(1.0);
        let pos = state.player.pos;
        let e1 = add_enemy(&mut state, pos, 1.0);
        let e2 = add_enemy(&mut state, pos, 1.0);

        player_collision(&mut state, PlayerCollider::Hostile(e1), PlayerHit::ram(Group::Enemies));
        assert_eq!(state.run.shield_stacks, 0);
        assert_eq!(state.run.health, 100.0);

        state.clock.advance(0.3);
        player_collision(&mut state, PlayerCollider::Hostile(e2), PlayerHit::ram(Group::Enemies));
        assert_eq!(state.run.shield_stacks, 0);
        assert_eq!(state.run.health, 100.0);
        assert_eq!(state.hostile(e2).unwrap().lifecycle, Lifecycle::Removed);

        state.clock.advance(0.3);
        let e3 = add_enemy(&mut state, pos, 1.0);
        player_collision(&mut state, PlayerCollider::Hostile(e3), PlayerHit::ram(Group::Enemies));
        assert_eq!(state.run.health, 80.0);
        assert!(state.player.is_invincible(state.now()));
    }

    #[test]
    fn test_invincible_player_keeps_collider() {
        let mut state = state();
        state.run.shield_stacks = 0;
        state.run.health = 50.0;
        let pos = state.player.pos;
        let boss = add_boss(&mut state, BossTier::First, pos, 100.0);
        player_collision(&mut state, PlayerCollider::Hostile(boss), PlayerHit::ram(Group::Bosses));
        assert_eq!(state.run.health, 20.0);
        player_collision(&mut state, PlayerCollider::Hostile(boss), PlayerHit::ram(Group::Bosses));
        assert_eq!(state.run.health, 20.0);
        assert!(state.hostile(boss).unwrap().is_alive());
    }

    #[test]
    fn test_god_mode_negates() {
        let mut state = state();
        state.run.god_mode = true;
        state.run.shield_stacks = 0;
        let (slot, _) = state.enemy_bullets.acquire().unwrap();
        player_collision(&mut state, PlayerCollider::EnemyBullet(slot), PlayerHit::bullet(45.0));
        assert_eq!(state.run.health, 100.0);
        assert_eq!(state.enemy_bullets.active_count(), 0);
    }

    #[test]
    fn test_lethal_hit_ends_run() {
        let mut state = state();
        state.run.shield_stacks = 0;
        state.run.health = 10.0;
        take_damage(&mut state, 15.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.run.health, 0.0);
        assert!(!state.player.alive);
    }

    #[test]
    fn test_vampiric_rate_limited() {
        let mut state = state();
        state.upgrades.increment(UpgradeKind::Vampiric);
        state.upgrades.increment(UpgradeKind::Vampiric);
        state.run.health = 50.0;
        try_vampiric_heal(&mut state);
        try_vampiric_heal(&mut state);
        assert_eq!(state.run.health, 52.0);
        state.clock.advance(0.75);
        try_vampiric_heal(&mut state);
        assert_eq!(state.run.health, 54.0);
    }

    #[test]
    fn test_garlic_pulse_cadence() {
        let mut state = state();
        state.upgrades.increment(UpgradeKind::Garlic);
        let pos = state.player.pos;
        let near = add_enemy(&mut state, pos + Vec2::new(30.0, 0.0), 10.0);
        let far = add_enemy(&mut state, pos + Vec2::new(90.0, 0.0), 10.0);

        state.clock.advance(0.6);
        garlic_pulse(&mut state);
        garlic_pulse(&mut state);
        assert_eq!(state.hostile(near).unwrap().health, 8.0);
        assert_eq!(state.hostile(far).unwrap().health, 10.0);
    }

    #[test]
    fn test_nuke_clears_and_cools_down() {
        let mut state = state();
        state.upgrades.increment(UpgradeKind::Nuke);
        state.upgrades.increment(UpgradeKind::Nuke);
        add_enemy(&mut state, Vec2::new(100.0, 100.0), 50.0);
        add_asteroid(&mut state, Vec2::new(200.0, 100.0), 50.0);
        let boss = add_boss(&mut state, BossTier::Second, Vec2::new(500.0, 120.0), 500.0);

        activate_nuke(&mut state);
        assert_eq!(state.live_handles(Group::Enemies).len(), 0);
        assert_eq!(state.live_handles(Group::Asteroids).len(), 0);
        assert_eq!(state.hostile(boss).unwrap().health, 475.0);
        assert_eq!(state.run.nuke_ready_at, 30_000.0);

        add_enemy(&mut state, Vec2::new(100.0, 100.0), 50.0);
        activate_nuke(&mut state);
        assert_eq!(state.live_handles(Group::Enemies).len(), 1);
    }

    proptest! {
        #[test]
        fn prop_pierce_bounds_distinct_targets(pierce in 0u32..7, reports in prop::collection::vec(0usize..10, 1..60)) {
            let mut state = state();
            let targets: Vec<HostileRef> = (0..10)
                .map(|i| add_enemy(&mut state, Vec2::new(50.0 * i as f32, 100.0), 1000.0))
                .collect();
            let slot = fire(&mut state, pierce);
            for i in reports {
                bullet_hit(&mut state, slot, targets[i]);
            }
            let damaged: Vec<f32> = targets
                .iter()
                .map(|t| state.hostile(*t).unwrap().health)
                .filter(|h| *h < 1000.0)
                .collect();
            prop_assert!(damaged.len() as u32 <= pierce + 1);
            prop_assert!(damaged.iter().all(|h| *h == 999.0));
        }

        #[test]
        fn prop_chain_respects_jumps_and_range(jumps in 1u32..8, range in 20.0f32..300.0, xs in prop::collection::vec(0.0f32..800.0, 1..12)) {
            let mut state = state();
            let targets: Vec<HostileRef> = xs
                .iter()
                .map(|x| add_enemy(&mut state, Vec2::new(*x, 200.0), 1000.0))
                .collect();
            chain_lightning(&mut state, ChainLightning {
                origin: Vec2::new(400.0, 200.0),
                jumps,
                range,
                hit: Vec::new(),
            });
            while !state.timers.is_empty() {
                state.clock.advance(0.2);
                for due in state.timers.drain_due(state.now()) {
                    if let TimedEffect::ChainJump(chain) = due {
                        chain_lightning(&mut state, chain);
                    }
                }
            }
            let struck = targets
                .iter()
                .map(|t| state.hostile(*t).unwrap().health)
                .filter(|h| *h < 1000.0)
                .count() as u32;
            prop_assert!(struck <= jumps);
            for t in &targets {
                let h = state.hostile(*t).unwrap().health;
                prop_assert!(h == 1000.0 || h == 999.0);
            }
            let arcs: Vec<Effect> = state.drain_effects();
            for arc in arcs {
                if let Effect::LightningArc { from, to } = arc {
                    prop_assert!(from.distance(to) < range);
                }
            }
        }
    }
}
