//! Static game data: enemy archetypes, spawn weights, bosses, upgrades
//!
//! Everything here is compile-time configuration. Variants map to stats
//! through explicit `match` tables.

use serde::{Deserialize, Serialize};

use crate::settings::GameMode;

/// Gem variants dropped by hostiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GemKind {
    Small,
    SmallGreen,
    SmallGold,
    MediumBlue,
    Medium,
    MediumGold,
    Large,
}

impl GemKind {
    /// Default XP when no override is supplied
    pub fn default_xp(&self) -> u32 {
        match self {
            GemKind::Small | GemKind::SmallGreen | GemKind::SmallGold => 5,
            GemKind::MediumBlue | GemKind::Medium | GemKind::MediumGold => 25,
            GemKind::Large => 100,
        }
    }
}

/// The six regular enemy archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyArchetype {
    LightRed,
    DarkRed,
    PulsingRed,
    LightPurple,
    DarkPurple,
    PulsingPurple,
}

/// Per-archetype stats
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub health: f32,
    pub hard_health: f32,
    pub score: u64,
    pub gem: GemKind,
    pub gem_xp: u32,
    pub elite: bool,
    /// Damage carried by this enemy's bullets
    pub bullet_damage: f32,
    pub radius: f32,
    pub shots_per_burst: u32,
    pub pulsing: bool,
}

impl EnemyArchetype {
    pub const ALL: [EnemyArchetype; 6] = [
        EnemyArchetype::LightRed,
        EnemyArchetype::DarkRed,
        EnemyArchetype::PulsingRed,
        EnemyArchetype::LightPurple,
        EnemyArchetype::DarkPurple,
        EnemyArchetype::PulsingPurple,
    ];

    pub fn stats(&self) -> EnemyStats {
        use EnemyArchetype::*;
        match self {
            LightRed => EnemyStats {
                health: 1.0,
                hard_health: 1.0,
                score: 10,
                gem: GemKind::Small,
                gem_xp: 5,
                elite: false,
                bullet_damage: 10.0,
                radius: 15.0,
                shots_per_burst: 3,
                pulsing: false,
            },
            DarkRed => EnemyStats {
                health: 5.0,
                hard_health: 8.0,
                score: 20,
                gem: GemKind::SmallGreen,
                gem_xp: 7,
                elite: false,
                bullet_damage: 10.0,
                radius: 15.0,
                shots_per_burst: 3,
                pulsing: false,
            },
            PulsingRed => EnemyStats {
                health: 10.0,
                hard_health: 15.0,
                score: 30,
                gem: GemKind::SmallGold,
                gem_xp: 10,
                elite: false,
                bullet_damage: 10.0,
                radius: 15.0,
                shots_per_burst: 3,
                pulsing: true,
            },
            LightPurple => EnemyStats {
                health: 5.0,
                hard_health: 8.0,
                score: 50,
                gem: GemKind::MediumBlue,
                gem_xp: 25,
                elite: true,
                bullet_damage: 8.0,
                radius: 19.0,
                shots_per_burst: 3,
                pulsing: false,
            },
            DarkPurple => EnemyStats {
                health: 15.0,
                hard_health: 20.0,
                score: 75,
                gem: GemKind::Medium,
                gem_xp: 30,
                elite: true,
                bullet_damage: 10.0,
                radius: 19.0,
                shots_per_burst: 3,
                pulsing: false,
            },
            PulsingPurple => EnemyStats {
                health: 25.0,
                hard_health: 30.0,
                score: 100,
                gem: GemKind::MediumGold,
                gem_xp: 35,
                elite: true,
                bullet_damage: 15.0,
                radius: 19.0,
                shots_per_burst: 7,
                pulsing: true,
            },
        }
    }

    /// Starting health for the mode (before flood scaling)
    pub fn health_for(&self, mode: GameMode) -> f32 {
        let stats = self.stats();
        if mode.is_hard() {
            stats.hard_health
        } else {
            stats.health
        }
    }
}

/// One score tier: used while `score < threshold`; weights are cumulative
/// percentages ending at 100
pub struct SpawnTier {
    pub threshold: u64,
    pub weights: &'static [(u32, EnemyArchetype)],
}

use EnemyArchetype::{DarkPurple, DarkRed, LightPurple, LightRed, PulsingPurple, PulsingRed};

/// Score-tiered spawn weights, ascending thresholds; the last tier is unbounded
pub const SPAWN_TABLE: &[SpawnTier] = &[
    SpawnTier { threshold: 1000, weights: &[(95, LightRed), (100, LightPurple)] },
    SpawnTier {
        threshold: 2000,
        weights: &[(50, LightRed), (70, DarkRed), (90, LightPurple), (100, DarkPurple)],
    },
    SpawnTier {
        threshold: 3000,
        weights: &[(35, LightRed), (65, DarkRed), (85, LightPurple), (100, DarkPurple)],
    },
    SpawnTier {
        threshold: 4000,
        weights: &[
            (20, LightRed),
            (50, DarkRed),
            (55, PulsingRed),
            (75, LightPurple),
            (95, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: 5000,
        weights: &[
            (15, LightRed),
            (40, DarkRed),
            (50, PulsingRed),
            (65, LightPurple),
            (90, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: 6000,
        weights: &[
            (10, LightRed),
            (30, DarkRed),
            (45, PulsingRed),
            (60, LightPurple),
            (90, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: 7000,
        weights: &[
            (5, LightRed),
            (20, DarkRed),
            (40, PulsingRed),
            (55, LightPurple),
            (85, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: 8000,
        weights: &[
            (5, LightRed),
            (17, DarkRed),
            (37, PulsingRed),
            (52, LightPurple),
            (80, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: 9000,
        weights: &[
            (5, LightRed),
            (15, DarkRed),
            (35, PulsingRed),
            (50, LightPurple),
            (75, DarkPurple),
            (100, PulsingPurple),
        ],
    },
    SpawnTier {
        threshold: u64::MAX,
        weights: &[
            (5, LightRed),
            (15, DarkRed),
            (35, PulsingRed),
            (50, LightPurple),
            (70, DarkPurple),
            (100, PulsingPurple),
        ],
    },
];

/// Tier whose threshold first exceeds `score` (last tier as fallback)
pub fn spawn_tier(score: u64) -> &'static SpawnTier {
    SPAWN_TABLE
        .iter()
        .find(|tier| score < tier.threshold)
        .unwrap_or(&SPAWN_TABLE[SPAWN_TABLE.len() - 1])
}

/// Map a roll in [1, 100] onto a tier's cumulative weights
pub fn pick_archetype(tier: &SpawnTier, roll: u32) -> EnemyArchetype {
    tier.weights
        .iter()
        .find(|(cumulative, _)| roll <= *cumulative)
        .or(tier.weights.last())
        .map(|(_, archetype)| *archetype)
        .unwrap_or(EnemyArchetype::LightRed)
}

/// Boss tiers, in spawn order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BossTier {
    First,
    Second,
    Third,
}

#[derive(Debug, Clone, Copy)]
pub struct BossStats {
    pub health: f32,
    pub score: u64,
    pub bullets_per_volley: u32,
    pub bullet_damage: f32,
    pub pulsing: bool,
}

/// Score needed to trigger each boss, indexed by bosses already spawned
pub const BOSS_THRESHOLDS: [u64; 3] = [1000, 5000, 10000];

impl BossTier {
    pub const ALL: [BossTier; 3] = [BossTier::First, BossTier::Second, BossTier::Third];

    /// Tier for the n-th boss (0-based); `None` past the last tier
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// 1-based tier number
    pub fn number(&self) -> u32 {
        match self {
            BossTier::First => 1,
            BossTier::Second => 2,
            BossTier::Third => 3,
        }
    }

    pub fn stats(&self, mode: GameMode) -> BossStats {
        let hard = mode.is_hard();
        match self {
            BossTier::First => BossStats {
                health: if hard { 150.0 } else { 100.0 },
                score: 500,
                bullets_per_volley: 3,
                bullet_damage: 15.0,
                pulsing: false,
            },
            BossTier::Second => BossStats {
                health: if hard { 600.0 } else { 500.0 },
                score: 2000,
                bullets_per_volley: 4,
                bullet_damage: 30.0,
                pulsing: false,
            },
            BossTier::Third => BossStats {
                health: if hard { 1200.0 } else { 1000.0 },
                score: 5000,
                bullets_per_volley: 5,
                bullet_damage: 45.0,
                pulsing: true,
            },
        }
    }
}

/// The fourteen permanent upgrades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeKind {
    Piercing,
    Drones,
    Rear,
    Explosive,
    Lightning,
    Vampiric,
    Shield,
    Magnet,
    Garlic,
    Nuke,
    Clone,
    Giant,
    Berserker,
    SideCannon,
}

/// Catalog entry for an upgrade
#[derive(Debug, Clone, Copy)]
pub struct UpgradeDef {
    pub kind: UpgradeKind,
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub max_level: u32,
    pub requires: Option<UpgradeKind>,
}

/// Levels at or above this are shown without a cap
pub const UNCAPPED_LEVEL: u32 = 99;

const fn def(
    kind: UpgradeKind,
    name: &'static str,
    display_name: &'static str,
    description: &'static str,
    max_level: u32,
) -> UpgradeDef {
    UpgradeDef {
        kind,
        name,
        display_name,
        description,
        max_level,
        requires: None,
    }
}

pub const UPGRADE_CATALOG: [UpgradeDef; 14] = [
    def(UpgradeKind::Piercing, "Piercing Rounds", "Piercing", "Bullets pass through enemies", 3),
    def(UpgradeKind::Drones, "Orbital Drones", "Drones", "Drones orbit and fire at enemies", 5),
    def(UpgradeKind::Rear, "Rear Turret", "Rear Turret", "Auto-fires behind you", 5),
    def(UpgradeKind::Explosive, "Explosive Rounds", "Explosive", "Bullets explode on impact", 5),
    def(UpgradeKind::Lightning, "Chain Lightning", "Lightning", "Lightning arcs to nearby enemies", 5),
    def(UpgradeKind::Vampiric, "Vampiric", "Vampiric", "Heal on kills", 3),
    def(UpgradeKind::Shield, "Shield Battery", "Shield", "+1 Max Shield", UNCAPPED_LEVEL),
    def(UpgradeKind::Magnet, "Magnetic Field", "Magnet", "Increased pickup range", UNCAPPED_LEVEL),
    def(UpgradeKind::Garlic, "Garlic", "Garlic", "Damages enemies in aura", 5),
    def(UpgradeKind::Nuke, "Screen Nuke", "Nuke", "Press Z to clear screen", 5),
    def(UpgradeKind::Clone, "Clone Mirror", "Clone", "Clone copies your shots", 1),
    def(UpgradeKind::Giant, "Giant Mode", "Giant", "Bigger, stronger, slower", 5),
    def(UpgradeKind::Berserker, "Berserker", "Berserker", "More damage at low health", 3),
    UpgradeDef {
        requires: Some(UpgradeKind::Rear),
        ..def(UpgradeKind::SideCannon, "Side Turret", "Side Turret", "Auto-fires to the side", 2)
    },
];

impl UpgradeKind {
    pub const COUNT: usize = 14;

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn def(&self) -> &'static UpgradeDef {
        &UPGRADE_CATALOG[self.index()]
    }
}
