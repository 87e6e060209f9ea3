//! Run configuration
//!
//! Chosen before a run starts (mode, weapon, seed) and immutable afterwards.
//! Loadable from JSON so headless drivers can replay a configuration.

use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// Difficulty mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Normal,
    Hard,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Normal => "Normal",
            GameMode::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "normal" => Some(GameMode::Normal),
            "hard" => Some(GameMode::Hard),
            _ => None,
        }
    }

    /// How often the enemy spawn interval is tightened (ms)
    pub fn spawn_increase_interval_ms(&self) -> f64 {
        match self {
            GameMode::Normal => 60_000.0,
            GameMode::Hard => 45_000.0,
        }
    }

    /// Floor for the enemy spawn interval (ms)
    pub fn min_spawn_interval_ms(&self) -> f64 {
        match self {
            GameMode::Normal => 200.0,
            GameMode::Hard => 50.0,
        }
    }

    /// Upgrade slots available for distinct upgrades (`None` = unlimited)
    pub fn upgrade_slots(&self) -> Option<u32> {
        match self {
            GameMode::Normal => None,
            GameMode::Hard => Some(5),
        }
    }

    pub fn is_hard(&self) -> bool {
        *self == GameMode::Hard
    }
}

/// Primary weapon selected for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeaponKind {
    #[default]
    Default,
    Shotgun,
}

/// Horizontal pellet of a spread weapon
#[derive(Debug, Clone, Copy)]
pub struct Pellet {
    pub x_offset: f32,
    pub vx: f32,
}

/// Static weapon definition
#[derive(Debug, Clone, Copy)]
pub struct WeaponDef {
    pub name: &'static str,
    pub base_cooldown_ms: f64,
    pub rapid_fire_cooldown_ms: f64,
    pub bullet_speed: f32,
    /// Maximum vertical travel before the bullet returns to the pool
    pub max_range: Option<f32>,
    /// Empty for single-shot weapons
    pub spread: &'static [Pellet],
}

const SHOTGUN_SPREAD: [Pellet; 4] = [
    Pellet { x_offset: 0.0, vx: -220.0 },
    Pellet { x_offset: 0.0, vx: -75.0 },
    Pellet { x_offset: 0.0, vx: 75.0 },
    Pellet { x_offset: 0.0, vx: 220.0 },
];

impl WeaponKind {
    pub fn def(&self) -> WeaponDef {
        match self {
            WeaponKind::Default => WeaponDef {
                name: "Default",
                base_cooldown_ms: 300.0,
                rapid_fire_cooldown_ms: 150.0,
                bullet_speed: 500.0,
                max_range: None,
                spread: &[],
            },
            WeaponKind::Shotgun => WeaponDef {
                name: "Shotgun",
                base_cooldown_ms: 750.0,
                rapid_fire_cooldown_ms: 300.0,
                bullet_speed: 600.0,
                max_range: Some(250.0),
                spread: &SHOTGUN_SPREAD,
            },
        }
    }
}

/// Settings for a single run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub mode: GameMode,
    pub weapon: WeaponKind,
    /// Seed for every random roll in the run
    pub seed: u64,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Start with damage negation enabled (debug)
    pub god_mode: bool,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            mode: GameMode::Normal,
            weapon: WeaponKind::Default,
            seed: 0x5eed,
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            god_mode: false,
        }
    }
}

impl RunSettings {
    /// Default settings for a mode
    pub fn for_mode(mode: GameMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Parse settings from JSON; missing fields fall back to defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        log::info!(
            "Loaded run settings: mode={} weapon={} seed={}",
            settings.mode.as_str(),
            settings.weapon.def().name,
            settings.seed
        );
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
