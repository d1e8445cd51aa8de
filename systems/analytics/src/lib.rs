#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Metrics engine and behaviour classifier.
//!
//! [`compute_metrics`] is a pure function of a borrowed
//! [`TelemetryView`]: it never caches, never mutates and runs in time linear
//! in the rolling window, so callers may recompute it on every tick.

use serde::Deserialize;
use snake_overseer_core::{MetricsSnapshot, MoveRecord};
use snake_overseer_system_telemetry::TelemetryView;

mod classifier;
pub mod metrics;

pub use classifier::classify;
pub use metrics::detect_cycle;

/// Tuning knobs for metric derivation.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MetricsTuning {
    /// Number of most recent moves feeding comfort, risk and latency signals.
    pub recent_move_window: usize,
    /// Boundary distance treated as complete comfort when normalising the comfort zone.
    pub comfort_reference_distance: f32,
    /// Boundary distance at or below which a move counts as risky.
    pub risk_boundary_distance: u32,
    /// Number of recent completed sessions averaged by the greed ratio.
    pub greed_session_count: usize,
    /// Number of recent completed sessions whose moves feed pattern repetition.
    pub repetition_session_count: usize,
    /// Number of sessions in each block compared by the score trend.
    pub trend_span: usize,
    /// Share of sessions with cyclic detections above which the spiral habit is flagged.
    pub spiral_habit_share: f32,
}

impl Default for MetricsTuning {
    fn default() -> Self {
        Self {
            recent_move_window: 50,
            comfort_reference_distance: 10.0,
            risk_boundary_distance: 2,
            greed_session_count: 5,
            repetition_session_count: 5,
            trend_span: 3,
            spiral_habit_share: 0.3,
        }
    }
}

/// Derives every play-style signal from the provided telemetry.
#[must_use]
pub fn compute_metrics(view: &TelemetryView<'_>, tuning: &MetricsTuning) -> MetricsSnapshot {
    let completed = view.completed();
    let counters = view.counters();

    let mut recent: Vec<&MoveRecord> = view.moves().rev().take(tuning.recent_move_window).collect();
    recent.reverse();

    let directions: Vec<_> = view.recent_directions().iter().copied().collect();

    MetricsSnapshot {
        boundary_hugging_frequency: metrics::boundary_hugging_frequency(counters),
        directional_bias: metrics::directional_bias(counters),
        cyclic_pattern: metrics::detect_cycle(&directions),
        spiral_habit: metrics::spiral_habit(
            view.cyclic_detections(),
            view.sessions_started(),
            tuning.spiral_habit_share,
        ),
        greed_ratio: metrics::greed_ratio(completed, tuning.greed_session_count),
        pattern_repetition: metrics::pattern_repetition(
            completed,
            tuning.repetition_session_count,
        ),
        comfort_zone: metrics::comfort_zone(&recent, tuning.comfort_reference_distance),
        risk_tolerance: metrics::risk_tolerance(&recent, tuning.risk_boundary_distance),
        score_trend: metrics::score_trend(completed, tuning.trend_span),
        completed_sessions: u32::try_from(completed.len()).unwrap_or(u32::MAX),
        average_score: metrics::average_score(completed),
        death_rate: metrics::death_rate(completed),
        average_reaction_latency_ms: metrics::average_reaction_latency_ms(&recent),
    }
}
