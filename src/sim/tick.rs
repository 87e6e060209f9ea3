//! Per-frame simulation tick
//!
//! Core game loop that advances the simulation by one rendered frame.

use glam::Vec2;

use super::ai;
use super::beam::{fire_lasers, update_lasers};
use super::collision::Overlap;
use super::combat::{self, PlayerCollider, PlayerHit};
use super::lifecycle::despawn_hostile;
use super::pickups;
use super::progression::{UpgradeChoice, select_upgrade};
use super::spawn;
use super::state::{GamePhase, GameState, Group, Lifecycle, TimedEffect};
use super::weapons;
use crate::outside_arena;

/// Bullets are recycled this far past the arena edge
const BULLET_CLEANUP_MARGIN: f32 = 10.0;
/// Hostiles and drops below the arena by this much are discarded
const DESPAWN_MARGIN_Y: f32 = 50.0;

/// Input commands and physics reports for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Movement axes in [-1, 1] (screen space, +y is down)
    pub move_axis: Vec2,
    /// Fire held
    pub fire: bool,
    /// Special ability (nuke) just pressed
    pub special: bool,
    /// Pause toggle just pressed
    pub pause: bool,
    /// Answer to a pending upgrade offer
    pub upgrade_choice: Option<UpgradeChoice>,
    /// Debug: toggle god mode
    pub toggle_god_mode: bool,
    /// Debug: fire a laser pair now
    pub fire_lasers: bool,
    /// Overlaps reported by the physics collaborator for this frame
    pub overlaps: Vec<Overlap>,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.clock.advance(dt);

    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                state.clock.pause();
                log::debug!("Paused at {:.0}ms", state.now());
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Playing;
                state.clock.resume();
            }
            GamePhase::LevelUp | GamePhase::GameOver => {}
        }
    }

    if state.phase == GamePhase::LevelUp {
        if let Some(choice) = input.upgrade_choice {
            if let Err(err) = select_upgrade(state, choice) {
                log::warn!("Upgrade choice rejected: {}", err);
            }
        }
    }

    if state.phase != GamePhase::Playing {
        return;
    }

    if input.toggle_god_mode {
        state.run.god_mode = !state.run.god_mode;
        log::info!("God mode {}", if state.run.god_mode { "on" } else { "off" });
    }
    if input.fire_lasers {
        fire_lasers(state);
    }

    dispatch_overlaps(state, &input.overlaps);
    run_due_timers(state);
    // a gem may have opened an upgrade offer
    if state.phase != GamePhase::Playing {
        finish_tick(state);
        return;
    }

    spawn::update_scaling(state);
    pickups::update_shield_regen(state);

    move_player(state, input.move_axis, dt);

    weapons::update_clones(state);
    weapons::update_main_gun(state, input.fire);
    if input.special {
        combat::activate_nuke(state);
    }
    pickups::update_laser_powerup(state);
    weapons::update_turrets(state);
    weapons::update_drones(state);
    combat::garlic_pulse(state);

    spawn::update_spawns(state);
    ai::update_elites(state);
    ai::update_bosses(state, dt);

    pickups::update_magnetism(state);
    update_lasers(state, dt);

    integrate(state, dt);
    ai::update_wave_bullets(state, dt);
    cleanup_offscreen(state);

    finish_tick(state);
}

fn finish_tick(state: &mut GameState) {
    state.purge_removed();
    state.normalize_order();

    if state.run.health <= 0.0 && state.phase != GamePhase::GameOver {
        combat::game_over(state);
    }
}

/// Resolve this frame's overlaps in report order
fn dispatch_overlaps(state: &mut GameState, overlaps: &[Overlap]) {
    for &overlap in overlaps {
        if state.phase != GamePhase::Playing {
            break;
        }
        match overlap {
            Overlap::BulletHostile { slot, target } => combat::bullet_hit(state, slot, target),
            Overlap::PlayerHostile(handle) => {
                if state.hostile(handle).is_some_and(|h| h.is_alive()) {
                    combat::player_collision(
                        state,
                        PlayerCollider::Hostile(handle),
                        PlayerHit::ram(handle.group),
                    );
                }
            }
            Overlap::PlayerEnemyBullet(slot) => {
                if let Some(damage) = state.enemy_bullets.get(slot).map(|b| b.damage) {
                    combat::player_collision(
                        state,
                        PlayerCollider::EnemyBullet(slot),
                        PlayerHit::bullet(damage),
                    );
                }
            }
            Overlap::PlayerGem(id) => pickups::collect_gem(state, id),
            Overlap::PlayerPickup(id) => pickups::collect_pickup(state, id),
        }
    }
}

/// Fire every scheduled effect whose time has come
fn run_due_timers(state: &mut GameState) {
    let now = state.now();
    for effect in state.timers.drain_due(now) {
        match effect {
            TimedEffect::ChainJump(chain) => combat::chain_lightning(state, chain),
            TimedEffect::PowerupExpired(kind) => pickups::expire_powerup(state, kind),
        }
    }
}

fn move_player(state: &mut GameState, axis: Vec2, dt: f32) {
    if !state.player.alive {
        return;
    }
    let (width, height) = (state.width(), state.height());
    let player = &mut state.player;
    let axis = axis.clamp(Vec2::NEG_ONE, Vec2::ONE);
    player.vel = axis * player.speed;
    player.pos = (player.pos + player.vel * dt).clamp(Vec2::ZERO, Vec2::new(width, height));
}

fn integrate(state: &mut GameState, dt: f32) {
    for hostile in state
        .enemies
        .iter_mut()
        .chain(state.asteroids.iter_mut())
        .chain(state.bosses.iter_mut())
        .filter(|h| h.is_alive())
    {
        hostile.pos += hostile.vel * dt;
    }
    for (_, bullet) in state.bullets.iter_active_mut() {
        bullet.pos += bullet.vel * dt;
    }
    for (_, bullet) in state.enemy_bullets.iter_active_mut() {
        bullet.pos += bullet.vel * dt;
    }
    for gem in state.gems.iter_mut() {
        gem.pos += gem.vel * dt;
    }
    for pickup in state.pickups.iter_mut() {
        pickup.pos += pickup.vel * dt;
    }
}

fn cleanup_offscreen(state: &mut GameState) {
    let (width, height) = (state.width(), state.height());

    let spent: Vec<usize> = state
        .bullets
        .iter_active()
        .filter(|(_, b)| {
            outside_arena(b.pos, width, height, BULLET_CLEANUP_MARGIN)
                || b.max_range
                    .is_some_and(|range| (b.pos.y - b.spawn_y).abs() > range)
        })
        .map(|(slot, _)| slot)
        .collect();
    for slot in spent {
        state.bullets.release(slot);
    }

    let spent: Vec<usize> = state
        .enemy_bullets
        .iter_active()
        .filter(|(_, b)| outside_arena(b.pos, width, height, BULLET_CLEANUP_MARGIN))
        .map(|(slot, _)| slot)
        .collect();
    for slot in spent {
        state.enemy_bullets.release(slot);
    }

    let floor = height + DESPAWN_MARGIN_Y;
    for group in [Group::Enemies, Group::Asteroids] {
        let fallen: Vec<_> = state
            .group(group)
            .iter()
            .filter(|h| h.is_alive() && h.pos.y > floor)
            .map(|h| h.handle())
            .collect();
        for handle in fallen {
            despawn_hostile(state, handle);
        }
    }

    for gem in state.gems.iter_mut().filter(|g| g.pos.y > floor) {
        gem.lifecycle = Lifecycle::Removed;
    }
    for pickup in state.pickups.iter_mut().filter(|p| p.pos.y > floor) {
        pickup.lifecycle = Lifecycle::Removed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::RunSettings;
    use crate::sim::catalog::GemKind;
    use crate::sim::collision::detect_overlaps;
    use crate::sim::events::Effect;
    use crate::sim::lifecycle::spawn_gem;
    use crate::sim::state::test_support::*;

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_tick_pause() {
        let mut state = state();
        tick(&mut state, &idle(), SIM_DT);
        let before = state.now();

        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Paused);

        for _ in 0..60 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert!((state.now() - before - SIM_DT as f64 * 1000.0).abs() < 1e-6);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.clock.pause_offset() > 900.0);
    }

    #[test]
    fn test_player_moves_and_stays_in_arena() {
        let mut state = state();
        let input = TickInput {
            move_axis: Vec2::new(1.0, 0.0),
            ..Default::default()
        };
        tick(&mut state, &input, 0.1);
        assert!((state.player.pos.x - 530.0).abs() < 1e-3);

        for _ in 0..100 {
            tick(&mut state, &input, 0.1);
        }
        assert_eq!(state.player.pos.x, state.width());
    }

    #[test]
    fn test_boss_spawns_on_next_tick_at_threshold() {
        let mut state = state();
        state.run.score = 999;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.run.boss_count, 0);

        state.run.score = 1000;
        tick(&mut state, &idle(), SIM_DT);
        assert_eq!(state.run.boss_count, 1);
        assert_eq!(state.bosses.len(), 1);
        assert!(
            state
                .drain_effects()
                .iter()
                .any(|e| matches!(e, Effect::BossSpawned { .. }))
        );
    }

    #[test]
    fn test_gem_overlap_opens_offer_and_choice_resumes() {
        let mut state = state();
        let pos = state.player.pos;
        spawn_gem(&mut state, pos, GemKind::Large, Some(100));
        let gem = state.gems[0].id;

        let input = TickInput {
            overlaps: vec![Overlap::PlayerGem(gem)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelUp);
        assert_eq!(state.run.player_level, 2);
        assert!(state.pending_offer.is_some());
        assert!(state.gems.is_empty());

        // time is frozen while the cards are up
        let frozen = state.now();
        for _ in 0..30 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.now(), frozen);

        let pick = TickInput {
            upgrade_choice: Some(UpgradeChoice::Pick(0)),
            ..Default::default()
        };
        tick(&mut state, &pick, SIM_DT);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.pending_offer.is_none());
        assert_eq!(state.upgrades.acquired().len(), 1);
    }

    #[test]
    fn test_bad_choice_keeps_offer() {
        let mut state = state();
        state.run.xp = 100;
        crate::sim::progression::check_level_up(&mut state);
        assert_eq!(state.phase, GamePhase::LevelUp);

        let pick = TickInput {
            upgrade_choice: Some(UpgradeChoice::Pick(7)),
            ..Default::default()
        };
        tick(&mut state, &pick, SIM_DT);
        assert_eq!(state.phase, GamePhase::LevelUp);
        assert!(state.pending_offer.is_some());
    }

    #[test]
    fn test_enemy_bullet_overlap_damages_after_shield() {
        let mut state = state();
        let pos = state.player.pos;
        ai::fire_hostile_bullet(&mut state, pos, Vec2::ZERO, 10.0, None);
        let input = TickInput {
            overlaps: vec![Overlap::PlayerEnemyBullet(0)],
            ..Default::default()
        };
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.run.shield_stacks, 0);
        assert_eq!(state.run.health, 100.0);
        assert_eq!(state.enemy_bullets.active_count(), 0);

        // past the shield grace window the next bullet lands
        for _ in 0..40 {
            tick(&mut state, &idle(), SIM_DT);
        }
        let pos = state.player.pos;
        ai::fire_hostile_bullet(&mut state, pos, Vec2::ZERO, 10.0, None);
        tick(&mut state, &input, SIM_DT);
        assert_eq!(state.run.health, 90.0);
    }

    #[test]
    fn test_fallen_enemies_are_despawned_without_score() {
        let mut state = state();
        let h = state.height();
        let enemy = add_enemy(&mut state, Vec2::new(100.0, h + 49.0), 1.0);
        state.hostile_mut(enemy).unwrap().vel = Vec2::new(0.0, 120.0);
        tick(&mut state, &idle(), 0.1);
        assert!(state.hostile(enemy).is_none());
        assert_eq!(state.run.score, 0);
    }

    #[test]
    fn test_shotgun_pellets_expire_at_max_range() {
        let mut state = GameState::new(RunSettings {
            weapon: crate::settings::WeaponKind::Shotgun,
            ..RunSettings::default()
        });
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        tick(&mut state, &fire, SIM_DT);
        assert_eq!(state.bullets.active_count(), 4);
        // 600 px/s: 250 px of travel takes well under half a second
        for _ in 0..30 {
            tick(&mut state, &idle(), SIM_DT);
        }
        assert_eq!(state.bullets.active_count(), 0);
    }

    fn autopilot_run(seed: u64, ticks: u32) -> GameState {
        let mut state = GameState::new(RunSettings::default().with_seed(seed));
        for i in 0..ticks {
            let input = TickInput {
                move_axis: Vec2::new(((i / 90) % 2) as f32 * 2.0 - 1.0, 0.0),
                fire: true,
                upgrade_choice: Some(UpgradeChoice::Pick(0)),
                overlaps: detect_overlaps(&state),
                ..Default::default()
            };
            tick(&mut state, &input, SIM_DT);
            state.drain_effects();
        }
        state
    }

    #[test]
    fn test_determinism() {
        let a = autopilot_run(42, 1800);
        let b = autopilot_run(42, 1800);
        assert_eq!(a.run.score, b.run.score);
        assert_eq!(a.run.kills, b.run.kills);
        assert_eq!(a.run.xp, b.run.xp);
        assert_eq!(a.run.player_level, b.run.player_level);
        assert_eq!(a.enemies.len(), b.enemies.len());
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.upgrades.acquired(), b.upgrades.acquired());
        assert!(a.run.kills > 0);
    }
}
