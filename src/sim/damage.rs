//! Damage and speed modifiers derived from upgrades and player health
//!
//! Pure functions. Values are computed fresh at fire/tick time; only bullets
//! snapshot them at creation.

use super::catalog::UpgradeKind;
use super::state::{RunState, UpgradeState};

/// Health-ratio thresholds for berserker tiers
pub const BERSERKER_THRESHOLDS: [f32; 4] = [0.8, 0.6, 0.4, 0.2];

/// Player speed by giant level
const GIANT_SPEEDS: [f32; 6] = [300.0, 275.0, 245.0, 215.0, 185.0, 155.0];

/// `1 + 0.25 × giant level`
pub fn giant_multiplier(giant_level: u32) -> f32 {
    1.0 + 0.25 * giant_level as f32
}

/// Number of berserker thresholds crossed at this health ratio
pub fn berserker_tiers(health_ratio: f32) -> u32 {
    BERSERKER_THRESHOLDS
        .iter()
        .filter(|&&t| health_ratio <= t)
        .count() as u32
}

/// Additive berserker bonus: 0.25 per crossed threshold, times level
pub fn berserker_bonus(berserker_level: u32, health_ratio: f32) -> f32 {
    if berserker_level == 0 {
        return 0.0;
    }
    0.25 * berserker_tiers(health_ratio) as f32 * berserker_level as f32
}

/// Composed multiplier applied to all player damage
pub fn damage_multiplier(upgrades: &UpgradeState, run: &RunState) -> f32 {
    giant_multiplier(upgrades.level(UpgradeKind::Giant))
        + berserker_bonus(upgrades.level(UpgradeKind::Berserker), run.health_ratio())
}

/// Player movement speed for a giant level
pub fn giant_speed(giant_level: u32) -> f32 {
    let idx = (giant_level as usize).min(GIANT_SPEEDS.len() - 1);
    GIANT_SPEEDS[idx]
}

/// Render scale for a giant level
pub fn giant_scale(giant_level: u32) -> f32 {
    1.0 + 0.25 * giant_level as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_berserker_at_twenty_percent() {
        let mut upgrades = UpgradeState::default();
        for _ in 0..3 {
            upgrades.increment(UpgradeKind::Berserker);
        }
        let mut run = RunState::new(false);
        run.health = 20.0;
        assert_eq!(damage_multiplier(&upgrades, &run), 4.0);
    }

    #[test]
    fn test_berserker_is_stepped() {
        assert_eq!(berserker_tiers(1.0), 0);
        assert_eq!(berserker_tiers(0.81), 0);
        assert_eq!(berserker_tiers(0.8), 1);
        assert_eq!(berserker_tiers(0.59), 2);
        assert_eq!(berserker_tiers(0.0), 4);
        assert_eq!(berserker_bonus(0, 0.1), 0.0);
        assert_eq!(berserker_bonus(2, 0.5), 1.0);
    }

    #[test]
    fn test_giant_combines_with_berserker() {
        let mut upgrades = UpgradeState::default();
        upgrades.increment(UpgradeKind::Giant);
        upgrades.increment(UpgradeKind::Berserker);
        let mut run = RunState::new(false);
        run.health = 70.0;
        assert_eq!(damage_multiplier(&upgrades, &run), 1.5);
    }

    #[test]
    fn test_giant_speed_table() {
        assert_eq!(giant_speed(0), 300.0);
        assert_eq!(giant_speed(5), 155.0);
        assert_eq!(giant_speed(9), 155.0);
        assert_eq!(giant_scale(2), 1.5);
    }
}
