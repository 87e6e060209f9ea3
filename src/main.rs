//! Nova Rogue headless driver
//!
//! Runs a seeded autopilot session against the simulation core and prints a
//! run summary. Usage: `nova-rogue [settings.json] [ticks]`

use std::process::ExitCode;

use glam::Vec2;

use nova_rogue::RunSettings;
use nova_rogue::consts::SIM_DT;
use nova_rogue::sim::{
    Effect, GamePhase, GameState, TickInput, UpgradeChoice, detect_overlaps, tick,
};

/// Ten minutes at the nominal frame rate
const DEFAULT_TICKS: u32 = 36_000;
/// Frames per sweep direction
const SWEEP_FRAMES: u32 = 120;

fn load_settings(path: Option<&str>) -> Result<RunSettings, String> {
    let Some(path) = path else {
        return Ok(RunSettings::default());
    };
    let json =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path, e))?;
    RunSettings::from_json(&json).map_err(|e| format!("invalid settings in {}: {}", path, e))
}

/// Weave side to side and hold fire; take the first card offered
fn autopilot(state: &GameState, frame: u32) -> TickInput {
    let heading = if (frame / SWEEP_FRAMES) % 2 == 0 { -1.0 } else { 1.0 };
    let upgrade_choice = state.pending_offer.as_ref().map(|offer| {
        if offer.cards.is_empty() {
            UpgradeChoice::NoneAvailable
        } else {
            UpgradeChoice::Pick(0)
        }
    });
    TickInput {
        move_axis: Vec2::new(heading, 0.0),
        fire: true,
        special: frame % 600 == 0,
        upgrade_choice,
        overlaps: detect_overlaps(state),
        ..Default::default()
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let settings = match load_settings(args.first().map(String::as_str)) {
        Ok(settings) => settings,
        Err(err) => {
            log::error!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    let ticks = args
        .get(1)
        .and_then(|t| t.parse().ok())
        .unwrap_or(DEFAULT_TICKS);

    let mut state = GameState::new(settings);
    let mut frame = 0;
    let mut bosses_defeated = 0;
    while frame < ticks && state.phase != GamePhase::GameOver {
        let input = autopilot(&state, frame);
        tick(&mut state, &input, SIM_DT);
        for effect in state.drain_effects() {
            if let Effect::BossDefeated { .. } = effect {
                bosses_defeated += 1;
            }
        }
        frame += 1;
    }

    let run = &state.run;
    println!("frames:          {}", frame);
    println!("game time:       {:.1}s", state.now() / 1000.0);
    println!("score:           {}", run.score);
    println!("kills:           {}", run.kills);
    println!("level:           {}", run.player_level);
    println!("health:          {:.0}/{:.0}", run.health, run.max_health);
    println!("bosses defeated: {}", bosses_defeated);
    println!("flood mode:      {}", run.flood_mode);
    let upgrades: Vec<String> = state
        .upgrades
        .acquired()
        .iter()
        .map(|&kind| format!("{} {}", kind.def().display_name, state.upgrades.level(kind)))
        .collect();
    println!("upgrades:        {}", upgrades.join(", "));

    ExitCode::SUCCESS
}
