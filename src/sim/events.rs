//! Effect requests and notifications emitted during a tick
//!
//! Fire-and-forget data for the renderer, VFX and UI collaborators. The core
//! queues them on the game state; the caller drains them once per frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::catalog::BossTier;

/// One stroke of the layered beam rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeamStroke {
    pub width: f32,
    pub color: u32,
    pub alpha: f32,
}

/// Outer glow, middle layer, core
pub const BEAM_STROKES: [BeamStroke; 3] = [
    BeamStroke { width: 12.0, color: 0x006600, alpha: 0.4 },
    BeamStroke { width: 8.0, color: 0x009900, alpha: 0.6 },
    BeamStroke { width: 4.0, color: 0x88cc88, alpha: 0.8 },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// Particle burst; `radius > 0` draws a blast ring
    Explosion {
        pos: Vec2,
        particles: u32,
        radius: f32,
        explosive: bool,
    },
    LightningArc { from: Vec2, to: Vec2 },
    /// Visible beam window as a polyline, drawn with `BEAM_STROKES`
    Beam { laser_id: u32, points: Vec<Vec2> },
    LaserHit { pos: Vec2 },
    ScreenFlash { alpha: f32, duration_ms: f32 },
    FloatingText { text: String, color: u32 },
    /// Upgrade choices are ready on `GameState::pending_offer`
    LevelUp { level: u32 },
    BossSpawned { tier: BossTier },
    BossDefeated { tier: BossTier },
    FloodModeStarted,
    PlayerDamaged { amount: f32, health: f32 },
    ShieldAbsorbed { stacks_left: u32 },
    GameOver { score: u64 },
}

impl Effect {
    pub fn text(text: impl Into<String>, color: u32) -> Self {
        Effect::FloatingText {
            text: text.into(),
            color,
        }
    }

    pub fn explosion(pos: Vec2, particles: u32) -> Self {
        Effect::Explosion {
            pos,
            particles,
            radius: 0.0,
            explosive: false,
        }
    }
}

/// Common text colors
pub mod colors {
    pub const YELLOW: u32 = 0xffff00;
    pub const GREEN: u32 = 0x00ff00;
    pub const RED: u32 = 0xff0000;
    pub const ORANGE: u32 = 0xff8800;
    pub const WHITE: u32 = 0xffffff;
}
