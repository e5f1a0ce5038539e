//! Lane War - headless AI-vs-AI runner.
//!
//! Plays one scripted match to completion and logs the result. Useful
//! for balance experiments and for smoke-testing the engine without a
//! renderer. The seed comes from the first CLI argument (default 1), so
//! any run can be reproduced exactly.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lane_core::prelude::*;

/// Hard stop for stalemates: ten minutes of simulated time.
const MAX_TICKS: u64 = 12_000;

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(1);

    tracing::info!(seed, "starting headless match");

    let mut engine = MatchEngine::with_defaults(seed);
    let mut controllers = [
        AiController::new(Faction::West, seed ^ 0x57),
        AiController::new(Faction::East, seed ^ 0xEA),
    ];
    for ai in &mut controllers {
        ai.activate(&mut engine);
    }

    while !engine.is_over() && engine.current_tick() < MAX_TICKS {
        let events = engine.tick();
        for faction in events.ai_wakeups {
            for ai in &mut controllers {
                if ai.faction() == faction {
                    ai.on_wake(&mut engine);
                }
            }
        }
        for death in &events.deaths {
            tracing::debug!(unit = death.id, faction = ?death.faction, "unit destroyed");
        }
        for breach in &events.breaches {
            tracing::info!(unit = breach.unit, base = ?breach.base, "baseline breached");
        }
    }

    match engine.winner() {
        Some(winner) => {
            let duration = engine
                .report(winner, true)
                .map_or(0, |report| report.duration_seconds);
            tracing::info!(
                winner = winner.display_name(),
                duration_secs = duration,
                west_deaths = engine.state().death_count[Faction::West.index()],
                east_deaths = engine.state().death_count[Faction::East.index()],
                "match over"
            );
        }
        None => {
            tracing::warn!(ticks = engine.current_tick(), "stalemate, giving up");
        }
    }
}
