//! XP, leveling and upgrade-card offers
//!
//! Crossing `xp_to_next_level` pauses the clock and parks an `UpgradeOffer` on
//! the state. The run resumes only after `select_upgrade` consumes it.

use std::fmt;

use rand::seq::SliceRandom;

use super::catalog::{UPGRADE_CATALOG, UpgradeKind};
use super::damage::{giant_scale, giant_speed};
use super::events::{Effect, colors};
use super::state::{GamePhase, GameState};
use crate::consts::MAX_PLAYER_LEVEL;

/// Cards shown per level-up
pub const OFFER_SIZE: usize = 3;
/// Filler card heal amount (hard mode)
pub const HEAL_CARD_AMOUNT: f32 = 50.0;
/// Max health lost per vampiric level
pub const VAMPIRIC_HEALTH_COST: f32 = 10.0;

const XP_GROWTH: f32 = 1.2;

/// One selectable card
#[derive(Debug, Clone, PartialEq)]
pub enum OfferCard {
    Upgrade {
        kind: UpgradeKind,
        display_name: &'static str,
        description: &'static str,
        /// Level before picking
        level: u32,
        max_level: u32,
        /// Picking consumes a hard-mode slot
        is_new: bool,
    },
    /// Repeatable "+50 HP" filler
    Heal { amount: f32 },
}

/// Choices presented for one level-up
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UpgradeOffer {
    pub level: u32,
    pub cards: Vec<OfferCard>,
}

/// Answer from the card UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpgradeChoice {
    Pick(usize),
    /// Nothing selectable; just resume
    NoneAvailable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChoiceError {
    NoPendingOffer,
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for ChoiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChoiceError::NoPendingOffer => write!(f, "no upgrade offer is pending"),
            ChoiceError::OutOfRange { index, len } => {
                write!(f, "card index {} out of range (offer has {})", index, len)
            }
        }
    }
}

impl std::error::Error for ChoiceError {}

/// Bank XP from a gem and level up if the threshold is crossed
pub fn add_xp(state: &mut GameState, xp: u32) {
    state.run.xp = state.run.xp.saturating_add(xp);
    check_level_up(state);
}

/// Trigger a level-up if enough XP is banked and no offer is pending
pub fn check_level_up(state: &mut GameState) {
    if state.pending_offer.is_some() || state.phase != GamePhase::Playing {
        return;
    }
    if state.run.xp < state.run.xp_to_next_level {
        return;
    }

    if state.run.player_level >= MAX_PLAYER_LEVEL {
        state.run.xp = state.run.xp_to_next_level.saturating_sub(1);
        return;
    }

    state.run.xp -= state.run.xp_to_next_level;
    state.run.player_level += 1;
    state.run.xp_to_next_level = (state.run.xp_to_next_level as f32 * XP_GROWTH).floor() as u32;
    log::info!(
        "Level up: {} (next at {} xp)",
        state.run.player_level,
        state.run.xp_to_next_level
    );

    let offer = generate_offer(state);
    if offer.cards.is_empty() {
        state.emit(Effect::text("All upgrades maxed!", colors::YELLOW));
        return;
    }

    state.clock.pause();
    state.phase = GamePhase::LevelUp;
    state.pending_offer = Some(offer);
    state.emit(Effect::LevelUp {
        level: state.run.player_level,
    });
}

/// Upgrades currently eligible for an offer
pub fn eligible_upgrades(state: &GameState) -> Vec<UpgradeKind> {
    let upgrades = &state.upgrades;
    let slots_full = state
        .settings
        .mode
        .upgrade_slots()
        .is_some_and(|slots| upgrades.slots_used >= slots);

    UPGRADE_CATALOG
        .iter()
        .map(|def| def.kind)
        .filter(|&kind| !upgrades.is_maxed(kind) && upgrades.prerequisite_met(kind))
        .filter(|&kind| !slots_full || upgrades.is_acquired(kind))
        .collect()
}

/// Shuffle the eligible upgrades and take up to three cards
pub fn generate_offer(state: &mut GameState) -> UpgradeOffer {
    let mut pool = eligible_upgrades(state);
    pool.shuffle(&mut state.rng);

    let hard = state.settings.mode.is_hard();
    let can_pick_new = state
        .settings
        .mode
        .upgrade_slots()
        .is_none_or(|slots| state.upgrades.slots_used < slots);

    let mut cards: Vec<OfferCard> = pool
        .into_iter()
        .take(OFFER_SIZE)
        .map(|kind| {
            let def = kind.def();
            OfferCard::Upgrade {
                kind,
                display_name: def.display_name,
                description: def.description,
                level: state.upgrades.level(kind),
                max_level: def.max_level,
                is_new: hard && can_pick_new && !state.upgrades.is_acquired(kind),
            }
        })
        .collect();

    if hard && !cards.is_empty() {
        while cards.len() < OFFER_SIZE {
            cards.push(OfferCard::Heal {
                amount: HEAL_CARD_AMOUNT,
            });
        }
    }

    UpgradeOffer {
        level: state.run.player_level,
        cards,
    }
}

/// Apply the chosen card and resume the run
pub fn select_upgrade(state: &mut GameState, choice: UpgradeChoice) -> Result<(), ChoiceError> {
    let Some(offer) = state.pending_offer.as_ref() else {
        return Err(ChoiceError::NoPendingOffer);
    };

    let card = match choice {
        UpgradeChoice::Pick(index) => match offer.cards.get(index) {
            Some(card) => Some(card.clone()),
            None => {
                return Err(ChoiceError::OutOfRange {
                    index,
                    len: offer.cards.len(),
                });
            }
        },
        UpgradeChoice::NoneAvailable => None,
    };

    state.pending_offer = None;
    match card {
        Some(OfferCard::Heal { amount }) => {
            state.run.heal(amount);
            state.emit(Effect::text(format!("+{} HP", amount), colors::GREEN));
        }
        Some(OfferCard::Upgrade { kind, is_new, .. }) => apply_upgrade(state, kind, is_new),
        None => {}
    }

    state.clock.resume();
    state.phase = GamePhase::Playing;

    // banked XP may already cover the next level
    check_level_up(state);
    Ok(())
}

/// Raise an upgrade one level and apply its immediate effects
pub fn apply_upgrade(state: &mut GameState, kind: UpgradeKind, is_new: bool) {
    let first_pick = !state.upgrades.is_acquired(kind);
    let Some(level) = state.upgrades.increment(kind) else {
        log::warn!("{} is already at max level", kind.def().name);
        return;
    };
    if first_pick && is_new && state.settings.mode.is_hard() {
        state.upgrades.slots_used += 1;
    }
    log::info!("Upgrade {} -> level {}", kind.def().name, level);

    match kind {
        UpgradeKind::Giant => {
            state.player.scale = giant_scale(level);
            state.player.speed = giant_speed(level);
        }
        UpgradeKind::Vampiric => {
            state.run.max_health -= VAMPIRIC_HEALTH_COST;
            state.run.health = state.run.health.min(state.run.max_health);
        }
        UpgradeKind::Shield => {
            state.run.max_shield_stacks = 1 + level;
            state.run.shield_stacks = (state.run.shield_stacks + 1).min(state.run.max_shield_stacks);
            state.run.last_shield_regen = state.now();
        }
        _ => {}
    }
}
