//! Overlap events and intersection primitives
//!
//! The broad phase belongs to the host's physics engine; it reports overlaps
//! as a flat `Overlap` list that the tick consumes in one dispatch pass.
//! `detect_overlaps` is a circle-vs-circle stand-in used by headless runs and
//! tests. The beam's line-vs-circle test is the only intersection the core
//! solves for itself.

use glam::Vec2;

use super::state::{EntityId, GameState, Group, HostileRef};
use crate::consts::*;

/// One overlap reported for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlap {
    /// Player bullet (pool slot) touching a hostile
    BulletHostile { slot: usize, target: HostileRef },
    /// Player body touching a hostile
    PlayerHostile(HostileRef),
    /// Hostile bullet (pool slot) touching the player
    PlayerEnemyBullet(usize),
    PlayerGem(EntityId),
    PlayerPickup(EntityId),
}

#[inline]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance_squared(b) < (ra + rb) * (ra + rb)
}

/// Segment `tail -> head` against a circle.
///
/// Solves |tail + t·(head − tail) − center|² = r² and reports a hit only if a
/// root falls in [0, 1]. A segment entirely inside the circle has no root in
/// range and does not count.
pub fn line_intersects_circle(tail: Vec2, head: Vec2, center: Vec2, radius: f32) -> bool {
    let d = head - tail;
    let f = tail - center;

    let a = d.dot(d);
    if a <= f32::EPSILON {
        return false;
    }
    let b = 2.0 * f.dot(d);
    let c = f.dot(f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let root = discriminant.sqrt();
    let t1 = (-b - root) / (2.0 * a);
    let t2 = (-b + root) / (2.0 * a);
    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Circle-vs-circle overlap pass over the current state
pub fn detect_overlaps(state: &GameState) -> Vec<Overlap> {
    let mut overlaps = Vec::new();
    let groups = [Group::Enemies, Group::Asteroids, Group::Bosses];

    for (slot, bullet) in state.bullets.iter_active() {
        for group in groups {
            for hostile in state.group(group).iter().filter(|h| h.is_alive()) {
                if circles_overlap(bullet.pos, BULLET_RADIUS, hostile.pos, hostile.radius) {
                    overlaps.push(Overlap::BulletHostile {
                        slot,
                        target: hostile.handle(),
                    });
                }
            }
        }
    }

    if !state.player.alive {
        return overlaps;
    }
    let player = &state.player;
    let player_radius = player.radius * player.scale;

    for group in groups {
        for hostile in state.group(group).iter().filter(|h| h.is_alive()) {
            if circles_overlap(player.pos, player_radius, hostile.pos, hostile.radius) {
                overlaps.push(Overlap::PlayerHostile(hostile.handle()));
            }
        }
    }

    for (slot, bullet) in state.enemy_bullets.iter_active() {
        if circles_overlap(player.pos, player_radius, bullet.pos, BULLET_RADIUS) {
            overlaps.push(Overlap::PlayerEnemyBullet(slot));
        }
    }

    for gem in state.gems.iter().filter(|g| g.lifecycle.is_alive()) {
        if circles_overlap(player.pos, player_radius, gem.pos, PICKUP_RADIUS) {
            overlaps.push(Overlap::PlayerGem(gem.id));
        }
    }

    for pickup in state.pickups.iter().filter(|p| p.lifecycle.is_alive()) {
        if circles_overlap(player.pos, player_radius, pickup.pos, PICKUP_RADIUS) {
            overlaps.push(Overlap::PlayerPickup(pickup.id));
        }
    }

    overlaps
}
