//! Ordered rule cascade mapping metrics onto a single archetype.

use snake_overseer_core::{Archetype, MetricsSnapshot};

const MIN_COMPLETED_SESSIONS: u32 = 2;
const WALL_HUGGER_FREQUENCY: f32 = 0.6;
const IMPROVING_TREND: f32 = 0.3;
const IMPROVING_AVERAGE_SCORE: f32 = 20.0;
const GREEDY_RATIO: f32 = 0.5;
const GREEDY_DEATH_RATE: f32 = 0.7;
const ERRATIC_LATENCY_MS: f32 = 800.0;
const ERRATIC_COMFORT: f32 = 0.3;
const PREDICTABLE_REPETITION: f32 = 0.4;
const PREDICTABLE_BIAS: f32 = 0.4;

/// Classifies the player into exactly one archetype.
///
/// Rules are evaluated in a fixed order and the first match wins, so a
/// player satisfying several rules receives the earliest one.
#[must_use]
pub fn classify(metrics: &MetricsSnapshot) -> Archetype {
    if metrics.completed_sessions < MIN_COMPLETED_SESSIONS {
        return Archetype::Cautious;
    }
    if metrics.boundary_hugging_frequency > WALL_HUGGER_FREQUENCY {
        return Archetype::WallHugger;
    }
    if metrics.spiral_habit {
        return Archetype::SpiralAddict;
    }
    if metrics.score_trend > IMPROVING_TREND && metrics.average_score > IMPROVING_AVERAGE_SCORE {
        return Archetype::Improving;
    }
    if metrics.greed_ratio > GREEDY_RATIO && metrics.death_rate > GREEDY_DEATH_RATE {
        return Archetype::Greedy;
    }
    if metrics.average_reaction_latency_ms > ERRATIC_LATENCY_MS
        && metrics.comfort_zone < ERRATIC_COMFORT
    {
        return Archetype::Erratic;
    }
    if metrics.pattern_repetition > PREDICTABLE_REPETITION
        && metrics.max_directional_bias() > PREDICTABLE_BIAS
    {
        return Archetype::Predictable;
    }
    Archetype::Cautious
}
