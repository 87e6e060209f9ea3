//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Game time only (`GameClock`, pause time excluded)
//! - Seeded RNG only
//! - Stable iteration order (by entity ID)
//! - No rendering, audio or platform dependencies

pub mod ai;
pub mod beam;
pub mod catalog;
pub mod clock;
pub mod collision;
pub mod combat;
pub mod damage;
pub mod events;
pub mod lifecycle;
pub mod pickups;
pub mod progression;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod weapons;

pub use beam::{BeamPhase, Laser, PathVertex, compute_path, path_window};
pub use catalog::{BossTier, EnemyArchetype, GemKind, UpgradeKind};
pub use clock::{GameClock, Millis, TimerQueue};
pub use collision::{Overlap, detect_overlaps, line_intersects_circle};
pub use combat::{ChainLightning, PlayerCollider, PlayerHit};
pub use damage::damage_multiplier;
pub use events::{BEAM_STROKES, Effect};
pub use lifecycle::{despawn_hostile, destroy_hostile};
pub use progression::{ChoiceError, OfferCard, UpgradeChoice, UpgradeOffer, select_upgrade};
pub use spawn::SpawnError;
pub use state::{
    EntityId, GamePhase, GameState, Group, Hostile, HostileKind, HostileRef, Lifecycle,
    PowerupKind,
};
pub use tick::{TickInput, tick};
