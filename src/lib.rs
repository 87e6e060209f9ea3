//! Nova Rogue - combat and progression core for a roguelike arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, combat, progression, beams)
//! - `settings`: Run configuration (game mode, weapon, seed, arena)
//!
//! Rendering, audio, input mapping and broad-phase physics live outside this
//! crate. The simulation consumes overlap events and emits effect requests.

pub mod settings;
pub mod sim;

pub use settings::{GameMode, RunSettings, WeaponKind};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time (one logical tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Arena dimensions (screen space, y grows downward)
    pub const ARENA_WIDTH: f32 = 1000.0;
    pub const ARENA_HEIGHT: f32 = 700.0;

    /// Player spawn offset from the bottom edge
    pub const PLAYER_START_OFFSET_Y: f32 = 100.0;
    /// Player hit radius
    pub const PLAYER_RADIUS: f32 = 5.0;
    pub const PLAYER_START_HEALTH: f32 = 100.0;

    /// Bullet pool capacity (player and hostile pools each)
    pub const BULLET_POOL_CAPACITY: usize = 100;
    pub const BULLET_RADIUS: f32 = 6.0;

    /// Hit radii used by the reference overlap pass and the beam
    pub const ASTEROID_RADIUS: f32 = 15.0;
    pub const BOSS_RADIUS: f32 = 37.5;
    pub const PICKUP_RADIUS: f32 = 14.0;

    /// Level cap for the player
    pub const MAX_PLAYER_LEVEL: u32 = 20;
}

/// Unit direction for an angle in radians (screen space)
#[inline]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// True when `p` lies outside the arena expanded by `margin` on every side
#[inline]
pub fn outside_arena(p: Vec2, width: f32, height: f32, margin: f32) -> bool {
    p.x < -margin || p.x > width + margin || p.y < -margin || p.y > height + margin
}
