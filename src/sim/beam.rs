//! Reflecting laser beams
//!
//! Each laser precomputes its bounce path once, then slides a fixed-length
//! window along it. Phases follow from `path_distance`:
//! - growing: the window is shorter than `length`
//! - full: `length <= path_distance < total_length`
//! - retracting: past the end, until the tail leaves the arena
//!
//! Hits are de-duplicated per bounce segment; crossing into a new segment
//! clears the hit set.

use std::f32::consts::{FRAC_PI_4, PI};

use glam::Vec2;

use super::catalog::UpgradeKind;
use super::collision::line_intersects_circle;
use super::damage::giant_multiplier;
use super::events::Effect;
use super::lifecycle::destroy_hostile;
use super::state::{GameState, Group, HostileRef};
use crate::{direction, outside_arena};

pub const LASER_SPEED: f32 = 450.0;
pub const LASER_LENGTH: f32 = 120.0;
pub const LASER_BASE_DAMAGE: f32 = 3.0;
pub const MAX_BOUNCES: usize = 5;
/// Up-right and up-left
pub const LASER_ANGLES: [f32; 2] = [-FRAC_PI_4, -3.0 * FRAC_PI_4];

/// Walls sit this far inside the arena edge
const WALL_MARGIN: f32 = 5.0;
/// Final leg length past the last bounce
const EXTENSION_LENGTH: f32 = 2000.0;
/// Tail must be this far outside the arena before the laser ends
const OFFSCREEN_MARGIN: f32 = 50.0;

/// Beam hit radius per target group
pub fn hit_radius(group: Group) -> f32 {
    match group {
        Group::Enemies | Group::Asteroids => 16.0,
        Group::Bosses => 40.0,
    }
}

/// Path vertex tagged with the bounce segment it starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathVertex {
    pub pos: Vec2,
    pub segment: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamPhase {
    Growing,
    Full,
    Retracting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wall {
    Left,
    Right,
    Top,
    Bottom,
}

/// Bounce path from `start` at `angle` inside a `width` × `height` arena.
///
/// Returns the start, one vertex per bounce, then a long extension vertex
/// (`bounces + 2` points when every bounce finds a wall).
pub fn compute_path(start: Vec2, angle: f32, bounces: usize, width: f32, height: f32) -> Vec<PathVertex> {
    let mut path = Vec::with_capacity(bounces + 2);
    path.push(PathVertex {
        pos: start,
        segment: 0,
    });

    let mut pos = start;
    let mut angle = angle;
    for bounce in 0..bounces {
        let dir = direction(angle);

        let mut nearest: Option<(f32, Wall)> = None;
        let mut consider = |dist: f32, wall: Wall| {
            if dist > 0.0 && nearest.is_none_or(|(best, _)| dist < best) {
                nearest = Some((dist, wall));
            }
        };
        if dir.x < 0.0 {
            consider((WALL_MARGIN - pos.x) / dir.x, Wall::Left);
        }
        if dir.x > 0.0 {
            consider((width - WALL_MARGIN - pos.x) / dir.x, Wall::Right);
        }
        if dir.y < 0.0 {
            consider((WALL_MARGIN - pos.y) / dir.y, Wall::Top);
        }
        if dir.y > 0.0 {
            consider((height - WALL_MARGIN - pos.y) / dir.y, Wall::Bottom);
        }

        let Some((dist, wall)) = nearest else {
            break;
        };
        pos += dir * dist;
        path.push(PathVertex {
            pos,
            segment: bounce + 1,
        });

        angle = match wall {
            Wall::Left | Wall::Right => PI - angle,
            Wall::Top | Wall::Bottom => -angle,
        };
    }

    pos += direction(angle) * EXTENSION_LENGTH;
    path.push(PathVertex {
        pos,
        segment: bounces + 1,
    });
    path
}

pub fn path_length(path: &[PathVertex]) -> f32 {
    path.windows(2).map(|w| w[0].pos.distance(w[1].pos)).sum()
}

/// Position `distance` along the path, tagged with its segment.
/// Clamps to the final vertex past the end.
pub fn point_on_path(path: &[PathVertex], distance: f32) -> PathVertex {
    let mut traveled = 0.0;
    for w in path.windows(2) {
        let seg_len = w[0].pos.distance(w[1].pos);
        if traveled + seg_len >= distance {
            let t = if seg_len > 0.0 {
                ((distance - traveled) / seg_len).max(0.0)
            } else {
                0.0
            };
            return PathVertex {
                pos: w[0].pos.lerp(w[1].pos, t),
                segment: w[0].segment,
            };
        }
        traveled += seg_len;
    }
    path.last().copied().unwrap_or(PathVertex {
        pos: Vec2::ZERO,
        segment: 0,
    })
}

/// Polyline of the path between two distances, including any bounce
/// vertices inside the window
pub fn path_window(path: &[PathVertex], start: f32, end: f32) -> Vec<Vec2> {
    if end <= start || path.is_empty() {
        return Vec::new();
    }
    let mut points = vec![point_on_path(path, start).pos];
    let mut traveled = 0.0;
    for w in path.windows(2) {
        traveled += w[0].pos.distance(w[1].pos);
        if traveled > start && traveled < end {
            points.push(w[1].pos);
        }
    }
    points.push(point_on_path(path, end).pos);
    points
}

/// A bouncing beam sliding along its precomputed path
#[derive(Debug, Clone)]
pub struct Laser {
    pub id: u32,
    /// Fixed at creation
    pub path: Vec<PathVertex>,
    pub total_length: f32,
    /// Head distance along the path
    pub path_distance: f32,
    pub speed: f32,
    /// Visible window length
    pub length: f32,
    pub damage: f32,
    /// Targets struck in the current bounce segment
    pub hits: Vec<HostileRef>,
    pub bounces_completed: usize,
    pub head: Vec2,
    pub tail: Vec2,
    pub active: bool,
}

impl Laser {
    pub fn new(id: u32, start: Vec2, angle: f32, damage: f32, width: f32, height: f32) -> Self {
        let path = compute_path(start, angle, MAX_BOUNCES, width, height);
        let total_length = path_length(&path);
        Self {
            id,
            path,
            total_length,
            path_distance: 0.0,
            speed: LASER_SPEED,
            length: LASER_LENGTH,
            damage,
            hits: Vec::new(),
            bounces_completed: 0,
            head: start,
            tail: start,
            active: true,
        }
    }

    pub fn phase(&self) -> BeamPhase {
        if self.path_distance < self.length {
            BeamPhase::Growing
        } else if self.path_distance < self.total_length {
            BeamPhase::Full
        } else {
            BeamPhase::Retracting
        }
    }

    fn tail_distance(&self) -> f32 {
        (self.path_distance - self.length).max(0.0)
    }

    /// Move the window forward; clears the hit set on entering a new segment
    pub fn advance(&mut self, dt: f32) {
        self.path_distance += self.speed * dt;
        let head = point_on_path(&self.path, self.path_distance);
        if head.segment > self.bounces_completed {
            self.bounces_completed = head.segment;
            self.hits.clear();
        }
        self.head = head.pos;
        self.tail = point_on_path(&self.path, self.tail_distance()).pos;
    }

    /// Finished bouncing, travelled the whole path and the tail left the arena
    pub fn is_spent(&self, width: f32, height: f32) -> bool {
        self.bounces_completed >= MAX_BOUNCES
            && self.path_distance >= self.total_length
            && outside_arena(self.tail, width, height, OFFSCREEN_MARGIN)
    }

    /// Visible polyline (tail to head)
    pub fn visible_points(&self) -> Vec<Vec2> {
        path_window(&self.path, self.tail_distance(), self.path_distance)
    }
}

/// Fire the symmetric laser pair from the player
pub fn fire_lasers(state: &mut GameState) {
    let damage = LASER_BASE_DAMAGE * giant_multiplier(state.upgrades.level(UpgradeKind::Giant));
    let start = state.player.pos;
    let (width, height) = (state.width(), state.height());
    for angle in LASER_ANGLES {
        let id = state.next_entity_id().0;
        state
            .lasers
            .push(Laser::new(id, start, angle, damage, width, height));
    }
    log::debug!("Lasers fired ({} in flight)", state.lasers.len());
}

/// Advance every laser, apply beam hits, emit draw requests
pub fn update_lasers(state: &mut GameState, dt: f32) {
    let mut lasers = std::mem::take(&mut state.lasers);
    let (width, height) = (state.width(), state.height());

    for laser in lasers.iter_mut().filter(|l| l.active) {
        laser.advance(dt);
        if laser.is_spent(width, height) {
            laser.active = false;
            continue;
        }
        apply_beam_hits(state, laser);

        let points = laser.visible_points();
        if points.len() >= 2 {
            state.emit(Effect::Beam {
                laser_id: laser.id,
                points,
            });
        }
    }

    lasers.retain(|l| l.active);
    // keep any laser fired while this pass ran
    lasers.append(&mut state.lasers);
    state.lasers = lasers;
}

fn apply_beam_hits(state: &mut GameState, laser: &mut Laser) {
    for group in [Group::Enemies, Group::Asteroids, Group::Bosses] {
        let radius = hit_radius(group);
        for handle in state.live_handles(group) {
            if laser.hits.contains(&handle) {
                continue;
            }
            let Some(target) = state.hostile_mut(handle) else {
                continue;
            };
            if !line_intersects_circle(laser.tail, laser.head, target.pos, radius) {
                continue;
            }
            let pos = target.pos;
            let killed = target.apply_damage(laser.damage);
            laser.hits.push(handle);
            state.emit(Effect::LaserHit { pos });
            if killed {
                destroy_hostile(state, handle);
            }
        }
    }
}
